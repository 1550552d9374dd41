//! Feature controllers
//!
//! One controller per dashboard page. A controller owns the page's result
//! state and error banner, and allows at most one request in flight per
//! action group: the busy flag is raised before dispatch and lowered by a
//! guard on every exit path, including unwinding.
//!
//! State sits behind a `std::sync::Mutex` that is only ever locked between
//! awaits, never across one.

mod biodiversity;
mod chat;
mod fisheries;
mod ocean;

pub use biodiversity::{BiodiversityController, BiodiversityState};
pub use chat::ChatController;
pub use fisheries::{FisheriesController, FisheriesState};
pub use ocean::{OceanController, OceanState};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

/// Outcome of invoking a controller action
#[derive(Debug)]
pub enum Dispatch<T> {
    /// The request ran to completion
    Completed(T),
    /// Another request of the same group is pending; nothing was sent
    Busy,
    /// Nothing selected to send; nothing was sent
    NoInput,
}

impl<T> Dispatch<T> {
    pub fn completed(self) -> Option<T> {
        match self {
            Dispatch::Completed(value) => Some(value),
            Dispatch::Busy | Dispatch::NoInput => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Dispatch::Busy)
    }
}

/// At-most-one-in-flight marker
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Raise the flag, or `None` if it is already raised
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(self.0.clone()))
    }
}

/// Lowers the busy flag when dropped
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Dismissable error banner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Banner {
    message: Option<String>,
}

impl Banner {
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    pub fn dismiss(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.message.is_some()
    }
}

/// Lock controller state, recovering from a poisoned lock
pub(crate) fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}
