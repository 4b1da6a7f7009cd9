//! CLI binary for edgequake-idea2app.
//!
//! A thin shim over the library crate: maps CLI flags to `PipelineConfig`,
//! shows the extracted fields, runs the chain and writes the downloads.
//! It never builds prompts itself.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_idea2app::{
    generate, inspect, ChainProgressCallback, ChainStep, Credentials, FieldSet,
    GenerationOutput, Idea2AppError, ImageQuality, ImageSize, PipelineConfig, ProgressCallback,
    RawDocument,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner plus one log line per finished step.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<ChainStep, Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:30.green/238}] {pos}/{len}  {msg}  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Generating");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
        })
    }

    fn elapsed(&self, step: ChainStep) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut t| t.remove(&step))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ChainProgressCallback for CliProgressCallback {
    fn on_chain_start(&self, total_steps: usize) {
        self.bar.set_length(total_steps as u64);
    }

    fn on_step_start(&self, step: ChainStep) {
        if let Ok(mut t) = self.start_times.lock() {
            t.insert(step, Instant::now());
        }
        self.bar.set_message(step.label());
    }

    fn on_step_complete(&self, step: ChainStep, artifact_len: usize) {
        let secs = self.elapsed(step);
        self.bar.println(format!(
            "  {} Step {:<2} {:<22} {}  {}",
            green("✓"),
            step.number(),
            step.label(),
            dim(&format!("{artifact_len:>6} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_step_error(&self, step: ChainStep, error: &str) {
        let secs = self.elapsed(step);
        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar.println(format!(
            "  {} Step {:<2} {:<22} {}  {}",
            red("✗"),
            step.number(),
            step.label(),
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.abandon();
    }

    fn on_chain_complete(&self, total_steps: usize) {
        self.bar.finish_and_clear();
        eprintln!("{} {} steps completed", green("✔"), bold(&total_steps.to_string()));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Generate everything and write the downloads to ./out
  idea2app idea.txt -o out

  # PDF input, concurrent image/code branches
  idea2app --concurrent idea.pdf -o out

  # Show the extracted fields only (no API keys needed)
  idea2app --fields-only idea.pdf

  # Force the media type when the extension is unhelpful
  idea2app --media-type text/plain idea.md -o out

  # JSON output
  idea2app --json idea.txt > result.json

INPUT FORMAT:
  One "Key: value" per line; lines without ':' continue the previous value.
  Known keys: Project name, Organization, Bundle Name, Platforms, Description,
  Primary functionality, Design Preferences, Color Scheme, Target Audience

OUTPUT FILES (-o DIR):
  refined_app_description.txt  ui_design_description.txt
  app_ui.dart                  AppComponent.jsx

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI key (description, summary, image)
  ANTHROPIC_API_KEY       Anthropic key (refinement, UI design, code)
  CLAUDE_API_KEY          Used when ANTHROPIC_API_KEY is not set
  PDFIUM_LIB_PATH         Path to an existing libpdfium; skips auto-download
  Variables may also be set in a .env file in the working directory.
"#;

/// Turn an app-idea document into descriptions, a mockup and code skeletons.
#[derive(Parser, Debug)]
#[command(
    name = "idea2app",
    version,
    about = "Turn an app-idea document into descriptions, a UI mockup and code skeletons",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// App-idea document (.pdf or .txt).
    input: PathBuf,

    /// Declared media type (application/pdf or text/plain). Default: from extension.
    #[arg(long, env = "IDEA2APP_MEDIA_TYPE")]
    media_type: Option<String>,

    /// Write the four download files into this directory.
    #[arg(short, long, env = "IDEA2APP_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// OpenAI model for the initial description.
    #[arg(long, env = "IDEA2APP_DESCRIPTION_MODEL")]
    description_model: Option<String>,

    /// Anthropic model for refinement, UI design and code.
    #[arg(long, env = "IDEA2APP_ANTHROPIC_MODEL")]
    anthropic_model: Option<String>,

    /// OpenAI model for the image summary.
    #[arg(long, env = "IDEA2APP_SUMMARY_MODEL")]
    summary_model: Option<String>,

    /// Image model.
    #[arg(long, env = "IDEA2APP_IMAGE_MODEL")]
    image_model: Option<String>,

    /// Per-call timeout in seconds.
    #[arg(long, env = "IDEA2APP_TIMEOUT", default_value_t = 180)]
    timeout: u64,

    /// Max output tokens for the Anthropic steps.
    #[arg(long, env = "IDEA2APP_MAX_TOKENS", default_value_t = 2000)]
    max_tokens: usize,

    /// Mockup size.
    #[arg(long, env = "IDEA2APP_IMAGE_SIZE", value_enum, default_value = "square")]
    image_size: ImageSizeArg,

    /// Mockup quality.
    #[arg(long, env = "IDEA2APP_IMAGE_QUALITY", value_enum, default_value = "standard")]
    image_quality: ImageQualityArg,

    /// Run the image and code branches concurrently.
    #[arg(long, env = "IDEA2APP_CONCURRENT")]
    concurrent: bool,

    /// Print the extracted fields and exit, no model calls.
    #[arg(long)]
    fields_only: bool,

    /// Output structured JSON instead of text.
    #[arg(long, env = "IDEA2APP_JSON")]
    json: bool,

    /// Disable progress spinner.
    #[arg(long, env = "IDEA2APP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "IDEA2APP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "IDEA2APP_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ImageSizeArg {
    Square,
    Portrait,
    Landscape,
}

impl From<ImageSizeArg> for ImageSize {
    fn from(v: ImageSizeArg) -> Self {
        match v {
            ImageSizeArg::Square => ImageSize::Square1024,
            ImageSizeArg::Portrait => ImageSize::Portrait1024x1792,
            ImageSizeArg::Landscape => ImageSize::Landscape1792x1024,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ImageQualityArg {
    Standard,
    Hd,
}

impl From<ImageQualityArg> for ImageQuality {
    fn from(v: ImageQualityArg) -> Self {
        match v {
            ImageQualityArg::Standard => ImageQuality::Standard,
            ImageQualityArg::Hd => ImageQuality::Hd,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so clap's env fallbacks and the credentials both see it.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.fields_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let document = RawDocument::from_file(&cli.input, cli.media_type.as_deref())
        .await
        .map_err(report)?;

    // ── Fields-only mode ─────────────────────────────────────────────────
    if cli.fields_only {
        let fields = inspect(&document).await.map_err(report)?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&fields).context("Failed to serialise fields")?
            );
        } else {
            print_fields(&fields);
        }
        return Ok(());
    }

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ChainProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    if !cli.quiet && !cli.json {
        let fields = inspect(&document).await.map_err(report)?;
        eprintln!("{} {}", cyan("◆"), bold("Application Details"));
        print_fields_to_stderr(&fields);
    }

    // ── Run the chain ────────────────────────────────────────────────────
    let output = generate(&document, &config).await.map_err(report)?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?
        );
    } else if !cli.quiet {
        print_output(&output);
    }

    if let Some(ref dir) = cli.output_dir {
        let written = output
            .artifacts
            .write_downloads(dir)
            .context("Failed to write downloads")?;
        if !cli.quiet {
            for path in written {
                eprintln!("  {} {}", green("↓"), path.display());
            }
        }
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "   {}",
            dim(&format!("{}ms total", output.stats.total_duration_ms))
        );
    }

    Ok(())
}

/// Attach the error kind so the user sees which class of failure occurred.
fn report(e: Idea2AppError) -> anyhow::Error {
    let kind = e.kind();
    anyhow::Error::new(e).context(format!("Generation failed [{kind}]"))
}

/// Map CLI args to `PipelineConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .credentials(Credentials::from_env())
        .api_timeout_secs(cli.timeout)
        .max_tokens(cli.max_tokens)
        .image_size(cli.image_size.clone().into())
        .image_quality(cli.image_quality.clone().into())
        .concurrent_branches(cli.concurrent);

    if let Some(ref m) = cli.description_model {
        builder = builder.description_model(m);
    }
    if let Some(ref m) = cli.anthropic_model {
        builder = builder.anthropic_model(m);
    }
    if let Some(ref m) = cli.summary_model {
        builder = builder.summary_model(m);
    }
    if let Some(ref m) = cli.image_model {
        builder = builder.image_model(m);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_fields(fields: &FieldSet) {
    for (field, value) in fields.iter() {
        println!("{:<22} {}", format!("{field}:"), value);
    }
    for (key, value) in fields.extras() {
        println!("{:<22} {}", format!("{key}:"), dim(value));
    }
}

fn print_fields_to_stderr(fields: &FieldSet) {
    for (field, value) in fields.iter() {
        let shown = if value.is_empty() { dim("(empty)") } else { value.to_string() };
        eprintln!("  {:<22} {}", format!("{field}:"), shown);
    }
}

fn print_output(output: &GenerationOutput) {
    let a = &output.artifacts;
    let section = |title: &str, body: &str| {
        println!("{}\n{}\n", bold(&format!("## {title}")), body.trim_end());
    };
    section("Refined App Description", &a.refined_description);
    section("UI Design Description", &a.ui_design);
    section("UI Design", &a.image_url);
    section("Flutter Code", &a.flutter_code);
    section("React Native Code", &a.react_native_code);
}
