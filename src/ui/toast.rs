//! Toast notifications: a bounded queue with per-toast expiry.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::event_bus::ToastKind;

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub shown_at: Instant,
}

impl Toast {
    pub fn icon(&self) -> &'static str {
        match self.kind {
            ToastKind::Success => "✓",
            ToastKind::Error => "✕",
            ToastKind::Warning => "⚠",
            ToastKind::Info => "ℹ",
        }
    }
}

/// Visible toasts, oldest first. Pushing past `max` drops the oldest.
#[derive(Debug)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
    max: usize,
    duration: Duration,
    next_id: u64,
}

impl ToastQueue {
    pub fn new(max: usize, duration: Duration) -> Self {
        Self {
            toasts: VecDeque::new(),
            max: max.max(1),
            duration,
            next_id: 1,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Show a toast and return its id.
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.toasts.push_back(Toast {
            id,
            kind,
            message: message.into(),
            shown_at: Instant::now(),
        });
        while self.toasts.len() > self.max {
            self.toasts.pop_front();
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop toasts shown at least `duration` before `now`. Returns how many
    /// were removed.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.toasts.len();
        let duration = self.duration;
        self.toasts
            .retain(|t| now.saturating_duration_since(t.shown_at) < duration);
        before - self.toasts.len()
    }

    pub fn toasts(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}
