//! UI controller for the catalog page.
//!
//! - [`UiController`]: maps page interactions to bus events and renders
//!   state changes
//! - [`DomEvent`]: raw page interactions
//! - [`ModalState`]: book details modal state machine
//! - [`ToastQueue`]: bounded, expiring notifications
//! - [`SearchDebouncer`]: realtime search with a quiet-period debounce
//! - [`MyLibrary`] and [`Settings`]: reader data kept in local storage

mod controller;
mod debounce;
mod dom_event;
mod library;
mod modal;
pub mod render;
mod toast;

pub use controller::{UiController, UiFlags, HOME_SECTION, LIBRARY_SECTION};
pub use debounce::SearchDebouncer;
pub use dom_event::{to_app_event, DomEvent};
pub use library::{MyLibrary, Settings};
pub use modal::ModalState;
pub use toast::{Toast, ToastQueue};
