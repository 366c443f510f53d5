//! Book details modal state machine.
//!
//! ```text
//! Closed --select(book)--> Open(book)
//! Open   --close(button | overlay | escape)--> Closed
//! any    --unload--> Unloaded
//! ```

use crate::event_bus::CloseReason;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open {
        book_id: i64,
    },
    /// The page is gone; no further transitions.
    Unloaded,
}

impl ModalState {
    pub fn is_open(&self) -> bool {
        matches!(self, ModalState::Open { .. })
    }

    pub fn book_id(&self) -> Option<i64> {
        match self {
            ModalState::Open { book_id } => Some(*book_id),
            _ => None,
        }
    }

    /// Open on `book_id`. Selecting another book while open switches to it.
    /// Returns false once unloaded.
    pub fn open(&mut self, book_id: i64) -> bool {
        if *self == ModalState::Unloaded {
            return false;
        }
        *self = ModalState::Open { book_id };
        true
    }

    /// Close for `reason`. Returns false when the modal was not open.
    pub fn close(&mut self, reason: CloseReason) -> bool {
        if !self.is_open() {
            return false;
        }
        tracing::debug!("Closing modal ({:?})", reason);
        *self = ModalState::Closed;
        true
    }

    pub fn unload(&mut self) {
        *self = ModalState::Unloaded;
    }
}
