use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::StudioResult;
use crate::request::{GenerationRequest, ImageHandle};

/// Hosted image model. One call per invocation, no retries.
pub trait ImageGenerator {
    fn name(&self) -> &str;
    fn generate(&self, request: &GenerationRequest) -> StudioResult<ImageHandle>;
}

/// Hosted text model used for prompt drafting.
pub trait TextModel {
    fn name(&self) -> &str;
    fn complete(&self, prompt: &str) -> StudioResult<String>;
}

/// Cooperative cancellation shared between a host and a client.
///
/// A blocking HTTP call cannot be interrupted mid-flight; cancellation is
/// checked before sending and again before a result is handed back, so a
/// cancelled call never surfaces its output. The flag is sticky until
/// `reset`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::CancelToken;

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let host_side = token.clone();
        assert!(!token.is_cancelled());
        host_side.cancel();
        assert!(token.is_cancelled());
        token.reset();
        assert!(!host_side.is_cancelled());
    }
}
