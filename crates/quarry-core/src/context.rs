//! Per-render context.
//!
//! A [`RenderContext`] is threaded through every expression. It carries the ambient
//! cancellation handle and deadline, and the switches that turn hooks and contextual mods off.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};

/// A cancellation token shared between the renderer and whoever may abort it.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Context passed to every expression while rendering.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
    skip_hooks: bool,
    skip_contextual_mods: bool,
}

impl RenderContext {
    /// Creates a context with no cancellation, no deadline and everything enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Sets a deadline after which rendering fails.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Prevents query hooks from running.
    #[must_use]
    pub const fn skip_hooks(mut self) -> Self {
        self.skip_hooks = true;
        self
    }

    /// Prevents contextual mods from running.
    #[must_use]
    pub const fn skip_contextual_mods(mut self) -> Self {
        self.skip_contextual_mods = true;
        self
    }

    /// Whether hooks should be skipped.
    #[must_use]
    pub const fn hooks_skipped(&self) -> bool {
        self.skip_hooks
    }

    /// Whether contextual mods should be skipped.
    #[must_use]
    pub const fn contextual_mods_skipped(&self) -> bool {
        self.skip_contextual_mods
    }

    /// Fails if the render was cancelled or its deadline elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] or [`Error::DeadlineExceeded`].
    pub fn check(&self) -> Result<()> {
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            tracing::debug!("render cancelled");
            return Err(Error::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::debug!("render deadline exceeded");
            return Err(Error::DeadlineExceeded);
        }
        Ok(())
    }
}
