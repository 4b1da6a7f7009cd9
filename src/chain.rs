//! The prompt chain: five dependent generation steps.
//!
//! ```text
//! FieldSet ─▶ 1 description ─▶ 2 refinement ─▶ 3 UI narrative ─┬─▶ 4 summary ─▶ image
//!  (OpenAI)      (Anthropic)      (Anthropic)                   ├─▶ 5a Flutter
//!                                                               └─▶ 5b React Native
//! ```
//!
//! Steps 1–3 are strictly sequential: each prompt embeds the artifact of the
//! step immediately before it. The three branches after step 3 only read the
//! UI narrative, so they may run concurrently (`concurrent_branches`).
//!
//! The chain is all-or-nothing. The first gateway failure aborts every step
//! that has not started yet, drops in-flight branches, and is returned as
//! [`Idea2AppError::StepFailed`] naming the step.

use crate::config::PipelineConfig;
use crate::error::{GatewayError, Idea2AppError};
use crate::gateway::{ModelGateway, Provider};
use crate::output::{ChainArtifacts, ChainOutput, ChainStats, StepTiming};
use crate::pipeline::fields::FieldSet;
use crate::prompts;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info};

/// One remote call in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainStep {
    InitialDescription,
    Refinement,
    UiDesign,
    ImageSummary,
    ImageGeneration,
    FlutterCode,
    ReactNativeCode,
}

impl ChainStep {
    /// Every step in dependency order.
    pub const ALL: [ChainStep; 7] = [
        ChainStep::InitialDescription,
        ChainStep::Refinement,
        ChainStep::UiDesign,
        ChainStep::ImageSummary,
        ChainStep::ImageGeneration,
        ChainStep::FlutterCode,
        ChainStep::ReactNativeCode,
    ];

    /// Position in the chain. The two halves of the image step share "4".
    pub fn number(self) -> &'static str {
        match self {
            ChainStep::InitialDescription => "1",
            ChainStep::Refinement => "2",
            ChainStep::UiDesign => "3",
            ChainStep::ImageSummary | ChainStep::ImageGeneration => "4",
            ChainStep::FlutterCode => "5a",
            ChainStep::ReactNativeCode => "5b",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ChainStep::InitialDescription => "initial description",
            ChainStep::Refinement => "refinement",
            ChainStep::UiDesign => "UI design narrative",
            ChainStep::ImageSummary => "image summary",
            ChainStep::ImageGeneration => "mockup image",
            ChainStep::FlutterCode => "Flutter code",
            ChainStep::ReactNativeCode => "React Native code",
        }
    }

    /// Text provider for this step; `None` for the image call.
    pub fn provider(self) -> Option<Provider> {
        match self {
            ChainStep::InitialDescription | ChainStep::ImageSummary => Some(Provider::OpenAi),
            ChainStep::Refinement
            | ChainStep::UiDesign
            | ChainStep::FlutterCode
            | ChainStep::ReactNativeCode => Some(Provider::Anthropic),
            ChainStep::ImageGeneration => None,
        }
    }
}

/// Run the whole chain against `gateway`.
///
/// Returns every artifact, or the first failure. No artifact escapes a
/// failed run.
pub async fn run_chain(
    gateway: &dyn ModelGateway,
    fields: &FieldSet,
    config: &PipelineConfig,
) -> Result<ChainOutput, Idea2AppError> {
    let total_start = Instant::now();
    let run = ChainRun {
        gateway,
        config,
        timings: Mutex::new(Vec::with_capacity(ChainStep::ALL.len())),
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_chain_start(ChainStep::ALL.len());
    }
    info!("Starting chain for '{}'", fields.project_name());

    // ── Steps 1–3: strictly sequential ──────────────────────────────────
    let initial_description = run
        .text_step(ChainStep::InitialDescription, prompts::initial_description(fields))
        .await?;
    let refined_description = run
        .text_step(ChainStep::Refinement, prompts::refine_description(&initial_description))
        .await?;
    let ui_design = run
        .text_step(ChainStep::UiDesign, prompts::ui_design(&refined_description))
        .await?;

    // ── Steps 4 / 5a / 5b: independent readers of the UI narrative ──────
    let image_branch = async {
        let summary = run
            .text_step(ChainStep::ImageSummary, prompts::summarize_ui(&ui_design))
            .await?;
        let url = run.image_step(prompts::ui_image(&summary)).await?;
        Ok::<_, Idea2AppError>((summary, url))
    };
    let flutter = run.text_step(ChainStep::FlutterCode, prompts::flutter_code(&ui_design));
    let react_native = run.text_step(
        ChainStep::ReactNativeCode,
        prompts::react_native_code(&ui_design),
    );

    let ((image_summary, image_url), flutter_code, react_native_code) =
        if config.concurrent_branches {
            debug!("Running image and code branches concurrently");
            tokio::try_join!(image_branch, flutter, react_native)?
        } else {
            (image_branch.await?, flutter.await?, react_native.await?)
        };

    let stats = ChainStats {
        steps: run.into_timings(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_chain_complete(ChainStep::ALL.len());
    }
    info!("Chain complete in {}ms", stats.total_duration_ms);

    Ok(ChainOutput {
        artifacts: ChainArtifacts {
            initial_description,
            refined_description,
            ui_design,
            image_summary,
            image_url,
            flutter_code,
            react_native_code,
        },
        stats,
    })
}

/// Per-run state shared by the step helpers.
struct ChainRun<'a> {
    gateway: &'a dyn ModelGateway,
    config: &'a PipelineConfig,
    timings: Mutex<Vec<StepTiming>>,
}

impl ChainRun<'_> {
    async fn text_step(&self, step: ChainStep, prompt: String) -> Result<String, Idea2AppError> {
        let (provider, model, max_tokens) = match step.provider() {
            Some(Provider::OpenAi) => {
                let model = match step {
                    ChainStep::ImageSummary => &self.config.models.summary,
                    _ => &self.config.models.description,
                };
                (Provider::OpenAi, model.as_str(), None)
            }
            Some(Provider::Anthropic) => (
                Provider::Anthropic,
                self.config.models.anthropic.as_str(),
                Some(self.config.max_tokens),
            ),
            None => {
                return Err(Idea2AppError::Internal(format!(
                    "step {} has no text provider",
                    step.label()
                )))
            }
        };

        debug!(
            "Step {} ({}): {} chars → {}/{}",
            step.number(),
            step.label(),
            prompt.len(),
            provider,
            model
        );
        self.observe(
            step,
            self.gateway.generate_text(provider, model, &prompt, max_tokens),
        )
        .await
    }

    async fn image_step(&self, prompt: String) -> Result<String, Idea2AppError> {
        let step = ChainStep::ImageGeneration;
        debug!(
            "Step {} ({}): {} chars → {}",
            step.number(),
            step.label(),
            prompt.len(),
            self.config.models.image
        );
        self.observe(
            step,
            self.gateway.generate_image(
                &prompt,
                self.config.image_size,
                self.config.image_quality,
            ),
        )
        .await
    }

    /// Wrap one gateway call with progress events, timing and error tagging.
    async fn observe<F>(&self, step: ChainStep, call: F) -> Result<String, Idea2AppError>
    where
        F: Future<Output = Result<String, GatewayError>>,
    {
        let cb = self.config.progress_callback.as_ref();
        if let Some(cb) = cb {
            cb.on_step_start(step);
        }
        info!("Step {}: {}", step.number(), step.label());

        let start = Instant::now();
        match call.await {
            Ok(artifact) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                debug!(
                    "Step {} ({}) produced {} chars in {}ms",
                    step.number(),
                    step.label(),
                    artifact.len(),
                    duration_ms
                );
                if let Ok(mut timings) = self.timings.lock() {
                    timings.push(StepTiming { step, duration_ms });
                }
                if let Some(cb) = cb {
                    cb.on_step_complete(step, artifact.len());
                }
                Ok(artifact)
            }
            Err(source) => {
                if let Some(cb) = cb {
                    cb.on_step_error(step, &source.to_string());
                }
                Err(Idea2AppError::StepFailed { step, source })
            }
        }
    }

    fn into_timings(self) -> Vec<StepTiming> {
        self.timings.into_inner().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_routing_is_fixed() {
        assert_eq!(ChainStep::InitialDescription.provider(), Some(Provider::OpenAi));
        assert_eq!(ChainStep::ImageSummary.provider(), Some(Provider::OpenAi));
        for step in [
            ChainStep::Refinement,
            ChainStep::UiDesign,
            ChainStep::FlutterCode,
            ChainStep::ReactNativeCode,
        ] {
            assert_eq!(step.provider(), Some(Provider::Anthropic), "{step:?}");
        }
        assert_eq!(ChainStep::ImageGeneration.provider(), None);
    }

    #[test]
    fn step_numbers() {
        let numbers: Vec<_> = ChainStep::ALL.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec!["1", "2", "3", "4", "4", "5a", "5b"]);
    }
}
