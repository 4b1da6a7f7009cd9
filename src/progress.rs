//! Progress-callback trait for per-step chain events.
//!
//! Inject an [`Arc<dyn ChainProgressCallback>`] via
//! [`crate::config::PipelineConfigBuilder::progress_callback`] to receive
//! events as the chain runs. The callback observes; it cannot alter prompts
//! or artifacts.
//!
//! # Example
//!
//! ```rust
//! use edgequake_idea2app::{ChainProgressCallback, ChainStep, PipelineConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     completed: Arc<AtomicUsize>,
//! }
//!
//! impl ChainProgressCallback for CountingCallback {
//!     fn on_step_complete(&self, step: ChainStep, artifact_len: usize) {
//!         self.completed.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{} done ({} chars)", step.label(), artifact_len);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback {
//!     completed: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = PipelineConfig::builder()
//!     .progress_callback(counter as Arc<dyn ChainProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::chain::ChainStep;
use std::sync::Arc;

/// Called by the orchestrator as it runs each step.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// With `concurrent_branches = true` the image and code steps run at the
/// same time, so `on_step_*` may interleave for those steps.
pub trait ChainProgressCallback: Send + Sync {
    /// Called once before the first step.
    fn on_chain_start(&self, total_steps: usize) {
        let _ = total_steps;
    }

    /// Called just before a step's gateway call.
    fn on_step_start(&self, step: ChainStep) {
        let _ = step;
    }

    /// Called when a step produced its artifact.
    ///
    /// `artifact_len` is the byte length of the text (or URL) produced.
    fn on_step_complete(&self, step: ChainStep, artifact_len: usize) {
        let _ = (step, artifact_len);
    }

    /// Called when a step fails. No further steps start afterwards.
    fn on_step_error(&self, step: ChainStep, error: &str) {
        let _ = (step, error);
    }

    /// Called once after every step succeeded.
    fn on_chain_complete(&self, total_steps: usize) {
        let _ = total_steps;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ChainProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressCallback = Arc<dyn ChainProgressCallback>;
