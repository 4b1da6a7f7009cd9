//! # edgequake-idea2app
//!
//! Turn a short document describing a mobile-app idea into a marketing
//! description, a UI design narrative, a mockup image and two client-app
//! code skeletons (Flutter and React Native) by chaining LLM calls.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF / TXT
//!  │
//!  ├─ 1. Input    decode UTF-8 or extract PDF page text (pdfium)
//!  ├─ 2. Fields   parse "Key: value" lines into the nine known fields
//!  ├─ 3. Describe OpenAI: feature/audience description by screen
//!  ├─ 4. Refine   Anthropic: concise, marketable, image-prompt ready
//!  ├─ 5. Design   Anthropic: visual UI narrative
//!  └─ 6. Branch   summary → mockup image │ Flutter code │ React Native code
//! ```
//!
//! Every step consumes the artifact of the step before it. The request is
//! all-or-nothing: the first failure aborts the chain and is reported with
//! the step that caused it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_idea2app::{generate, PipelineConfig, RawDocument};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Keys read from OPENAI_API_KEY / ANTHROPIC_API_KEY
//!     let config = PipelineConfig::default();
//!     let doc = RawDocument::from_mime(
//!         "Project name: Foo\nDescription: A simple app\nfor tracking tasks.",
//!         "text/plain",
//!     )?;
//!     let output = generate(&doc, &config).await?;
//!     println!("{}", output.artifacts.refined_description);
//!     println!("mockup: {}", output.artifacts.image_url);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `idea2app` binary (clap, indicatif, anyhow, tracing-subscriber, dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chain;
pub mod config;
pub mod error;
pub mod gateway;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chain::{run_chain, ChainStep};
pub use config::{ChainModels, Credentials, PipelineConfig, PipelineConfigBuilder};
pub use error::{GatewayError, Idea2AppError};
pub use gateway::{ImageQuality, ImageSize, ModelGateway, Provider, RemoteGateway};
pub use generate::{generate, generate_from_file, generate_sync, generate_to_dir, inspect};
pub use output::{
    ChainArtifacts, ChainOutput, ChainStats, Download, GenerationOutput, StepTiming,
};
pub use pipeline::fields::{extract_fields, FieldName, FieldSet};
pub use pipeline::input::{MediaKind, RawDocument};
pub use progress::{ChainProgressCallback, NoopProgressCallback, ProgressCallback};
