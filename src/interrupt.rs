//! Cooperative cancellation of long running operations.
//!
//! Long loops poll [`check`]; once [`request`] has been called, the next poll fails with
//! [`GeometryError::Interrupted`] and the request is consumed.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{GeometryError, Result};

static REQUESTED: AtomicBool = AtomicBool::new(false);

/// Requests the operation currently running to abort at its next poll.
pub fn request() {
    REQUESTED.store(true, Ordering::SeqCst);
}

/// Withdraws any pending request.
pub fn clear() {
    REQUESTED.store(false, Ordering::SeqCst);
}

/// Fails if an interrupt has been requested, consuming the request.
pub fn check() -> Result<()> {
    if REQUESTED.swap(false, Ordering::SeqCst) {
        tracing::debug!("interrupt request honoured");
        return Err(GeometryError::Interrupted);
    }

    Ok(())
}
