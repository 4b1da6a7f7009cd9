//! Top-level entry points: document in, every artifact out.
//!
//! Each request runs read → extract → chain. Any error aborts the rest of
//! the request; callers never receive a partially filled output.

use crate::chain::run_chain;
use crate::config::PipelineConfig;
use crate::error::Idea2AppError;
use crate::gateway::{ModelGateway, RemoteGateway};
use crate::output::GenerationOutput;
use crate::pipeline::fields::{extract_fields, FieldSet};
use crate::pipeline::input::{self, RawDocument};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Generate every artifact for an uploaded document.
///
/// # Errors
/// - [`Idea2AppError::UnsupportedFormat`] / [`Idea2AppError::DecodeError`] /
///   PDF errors before any model call is made
/// - [`Idea2AppError::StepFailed`] naming the first chain step that failed
pub async fn generate(
    document: &RawDocument,
    config: &PipelineConfig,
) -> Result<GenerationOutput, Idea2AppError> {
    info!("Starting generation ({} bytes, {:?})", document.bytes.len(), document.kind);

    // ── Step 1: Read text ────────────────────────────────────────────────
    let text = input::read_text(document).await?;
    debug!("Document text: {} chars", text.len());

    // ── Step 2: Extract fields ───────────────────────────────────────────
    let fields = extract_fields(&text);
    let missing = fields.missing();
    if !missing.is_empty() {
        debug!("{} fields empty; the model is asked to fill the gaps", missing.len());
    }

    // ── Step 3: Resolve gateway and run the chain ────────────────────────
    let gateway = resolve_gateway(config)?;
    let chain = run_chain(gateway.as_ref(), &fields, config).await?;

    Ok(GenerationOutput {
        fields,
        artifacts: chain.artifacts,
        stats: chain.stats,
    })
}

/// Generate from a local file. The media kind comes from `mime` when given,
/// otherwise from the file extension.
pub async fn generate_from_file(
    path: impl AsRef<Path>,
    mime: Option<&str>,
    config: &PipelineConfig,
) -> Result<GenerationOutput, Idea2AppError> {
    let document = RawDocument::from_file(path.as_ref(), mime).await?;
    generate(&document, config).await
}

/// Generate from a local file and write the downloads into `output_dir`.
pub async fn generate_to_dir(
    path: impl AsRef<Path>,
    mime: Option<&str>,
    output_dir: impl AsRef<Path>,
    config: &PipelineConfig,
) -> Result<(GenerationOutput, Vec<PathBuf>), Idea2AppError> {
    let output = generate_from_file(path, mime, config).await?;
    let dir = output_dir.as_ref().to_path_buf();
    let artifacts = output.artifacts.clone();
    let written = tokio::task::spawn_blocking(move || artifacts.write_downloads(&dir))
        .await
        .map_err(|e| Idea2AppError::Internal(format!("Write task panicked: {}", e)))??;
    Ok((output, written))
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    document: &RawDocument,
    config: &PipelineConfig,
) -> Result<GenerationOutput, Idea2AppError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Idea2AppError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(document, config))
}

/// Read and extract fields without calling any model.
///
/// Does not require API keys.
pub async fn inspect(document: &RawDocument) -> Result<FieldSet, Idea2AppError> {
    let text = input::read_text(document).await?;
    Ok(extract_fields(&text))
}

/// Use the injected gateway, or build the remote one from the credentials.
fn resolve_gateway(config: &PipelineConfig) -> Result<Arc<dyn ModelGateway>, Idea2AppError> {
    if let Some(ref gateway) = config.gateway {
        return Ok(Arc::clone(gateway));
    }

    let gateway = RemoteGateway::new(
        config.credentials.clone(),
        Duration::from_secs(config.api_timeout_secs),
    )
    .map_err(|e| Idea2AppError::Internal(format!("Failed to build HTTP client: {}", e)))?
    .with_image_model(config.models.image.clone());

    Ok(Arc::new(gateway))
}
