//! Request-scoped context passed to every provider call
//!
//! Carries cancellation, an optional deadline and the name of the Terraform
//! operation being served, which resources use to label their log lines.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time;

/// Pass this as first parameter to ALL async trait methods
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    operation: Option<String>,
    deadline: Option<Instant>,
    done: watch::Receiver<bool>,
    done_tx: watch::Sender<bool>,
}

impl Context {
    pub fn new() -> Self {
        let (done_tx, done) = watch::channel(false);
        Self {
            inner: Arc::new(ContextInner {
                operation: None,
                deadline: None,
                done,
                done_tx,
            }),
        }
    }

    // Derived contexts share the cancellation channel of their parent
    fn derive(&self, operation: Option<String>, deadline: Option<Instant>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                operation,
                deadline,
                done: self.inner.done.clone(),
                done_tx: self.inner.done_tx.clone(),
            }),
        }
    }

    /// Name of the operation this context serves, e.g. "ReadResource"
    pub fn with_operation(self, operation: impl Into<String>) -> Self {
        self.derive(Some(operation.into()), self.inner.deadline)
    }

    pub fn operation(&self) -> &str {
        self.inner.operation.as_deref().unwrap_or("unknown")
    }

    /// Must be called inside a tokio runtime; the deadline is enforced by a
    /// background task that cancels the context. An earlier deadline
    /// already on the context is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let requested = Instant::now() + timeout;
        let deadline = match self.inner.deadline {
            Some(existing) if existing < requested => existing,
            _ => requested,
        };
        let ctx = self.derive(self.inner.operation.clone(), Some(deadline));

        let done_tx = ctx.inner.done_tx.clone();
        tokio::spawn(async move {
            time::sleep_until(deadline.into()).await;
            let _ = done_tx.send(true);
        });

        ctx
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.done.borrow()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.inner.deadline
    }

    /// Returns a receiver that flips to true when work should stop
    pub fn done(&self) -> watch::Receiver<bool> {
        self.inner.done.clone()
    }

    pub fn cancel(&self) {
        let _ = self.inner.done_tx.send(true);
    }

    /// Drives `work` until it finishes or the context is cancelled
    ///
    /// Returns `None` on cancellation; `work` is dropped at its next await
    /// point, so an in-flight HTTP request is abandoned.
    pub async fn run<F: Future>(&self, work: F) -> Option<F::Output> {
        let mut done = self.done();
        tokio::select! {
            biased;
            _ = done.wait_for(|cancelled| *cancelled) => None,
            output = work => Some(output),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
