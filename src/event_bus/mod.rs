//! In-process publish/subscribe hub that decouples producers and consumers
//! of application events.
//!
//! # Example
//!
//! ```ignore
//! use libris::event_bus::{AppEvent, EventBus, EventName};
//!
//! let bus = EventBus::default();
//! let sub = bus.subscribe(EventName::BooksLoaded, |event| {
//!     if let AppEvent::BooksLoaded { count } = event {
//!         tracing::info!("{} books loaded", count);
//!     }
//!     Ok(())
//! });
//! bus.publish(AppEvent::BooksLoaded { count: 12 });
//! sub.unsubscribe();
//! ```

mod bus;
mod events;
mod types;

pub use bus::{EventBus, Subscription};
pub use events::{AppEvent, CloseReason, CustomName, EventName, ToastKind};
pub use types::{
    BusStats, HandlerError, HandlerFailure, HandlerOutcome, HandlerResult, ListenerInfo,
    PublishOptions, PublishResult, SubscribeOptions,
};
