//! State Store: the single source of truth for book data, filters and UI
//! flags.

mod app_state;
mod store;

pub use app_state::{AppState, StateKey, StateUpdate, STATE_VERSION};
pub use store::{HistoryEntry, StateStats, StateStore, StateSubscription, ViewFilter};
