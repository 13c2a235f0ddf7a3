//! CLI binary for pdf-form-filler.
//!
//! A thin shim over the library crate: `serve` runs the upload server,
//! `fill` answers one pair of local PDFs.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_form_filler::config::{API_TOKEN_ENV, DEFAULT_ENDPOINT};
use pdf_form_filler::server::{self, AppState};
use pdf_form_filler::{FillConfig, FillProgressCallback, FormFiller, ProgressCallback};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers ──────────────────────────────────────────────────────

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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the questions, one log line per
/// answer.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Preparing");
        bar.set_message("Reading PDFs…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl FillProgressCallback for CliProgressCallback {
    fn on_fill_start(&self, total_questions: usize) {
        self.bar.set_length(total_questions as u64);
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} questions  \
                 ⏱ {elapsed_precise}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
        );
        self.bar.set_prefix("Answering");
    }

    fn on_question_start(&self, _index: usize, _total: usize, question: &str) {
        self.bar.set_message(question.to_string());
    }

    fn on_question_answered(&self, index: usize, total: usize, answer: &str) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            index,
            total,
            dim(answer)
        ));
        self.bar.inc(1);
    }

    fn on_question_unanswered(&self, index: usize, total: usize, reason: &str) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            red("✗"),
            index,
            total,
            red(reason)
        ));
        self.bar.inc(1);
    }

    fn on_fill_complete(&self, _total_questions: usize, _answered: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the upload form on port 8000
  form-filler serve

  # Fill a form locally
  form-filler fill questions.pdf data.pdf -o filled_form.pdf

  # Print the Q/A pairs as JSON as well
  form-filler fill questions.pdf data.pdf -o out.pdf --json

ENVIRONMENT VARIABLES:
  HF_API_TOKEN          Bearer token for the inference endpoint
  FORM_FILLER_ENDPOINT  QA endpoint URL
  FORM_FILLER_BIND      Server address for `serve`
  PDFIUM_LIB_PATH       Path to an existing libpdfium
  RUST_LOG              Log filter (overrides -v / -q)
"#;

/// Answer the questions of one PDF from the text of another.
#[derive(Parser, Debug)]
#[command(
    name = "form-filler",
    version,
    about = "Answer the questions of one PDF from the text of another",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    inference: InferenceArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "FORM_FILLER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "FORM_FILLER_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the upload form and the fill endpoint.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "FORM_FILLER_BIND", default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
    },
    /// Fill a form from two local PDFs.
    Fill {
        /// PDF whose question lines are answered.
        questions: PathBuf,
        /// PDF whose text the answers are taken from.
        data: PathBuf,
        /// Where to write the answers PDF.
        #[arg(short, long, default_value = "filled_form.pdf")]
        output: PathBuf,
        /// Print the Q/A pairs and stats as JSON on stdout.
        #[arg(long)]
        json: bool,
        /// Disable progress bar.
        #[arg(long, env = "FORM_FILLER_NO_PROGRESS")]
        no_progress: bool,
    },
}

#[derive(Args, Debug)]
struct InferenceArgs {
    /// QA endpoint the questions are POSTed to.
    #[arg(long, global = true, env = "FORM_FILLER_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Bearer token for the endpoint.
    #[arg(long, global = true, env = "HF_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Attempts per question before giving up.
    #[arg(long, global = true, env = "FORM_FILLER_MAX_ATTEMPTS", default_value_t = 3)]
    max_attempts: u32,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, env = "FORM_FILLER_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Characters of data-document text sent as context.
    #[arg(long, global = true, env = "FORM_FILLER_MAX_CONTEXT", default_value_t = 4000)]
    max_context_chars: usize,

    /// Minimum trimmed length (exclusive) for a line to count as a question.
    #[arg(long, global = true, env = "FORM_FILLER_MIN_QUESTION_LEN", default_value_t = 3)]
    min_question_len: usize,
}

fn build_config(args: &InferenceArgs) -> Result<FillConfig> {
    let mut builder = FillConfig::builder()
        .endpoint(&args.endpoint)
        .max_attempts(args.max_attempts)
        .request_timeout(Duration::from_secs(args.timeout))
        .max_context_chars(args.max_context_chars)
        .min_question_len(args.min_question_len);
    if let Some(ref token) = args.token {
        builder = builder.api_token(token);
    }
    builder.build().context("Invalid configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs during a local fill.
    let show_progress = matches!(
        cli.command,
        Command::Fill { json: false, no_progress: false, .. }
    ) && !cli.quiet;
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

    let config = build_config(&cli.inference)?;
    if config.api_token.is_none() && !cli.quiet {
        eprintln!(
            "{} {} is not set; requests are sent without credentials",
            red("!"),
            API_TOKEN_ENV
        );
    }

    match cli.command {
        Command::Serve { bind } => {
            let filler = FormFiller::new(config).context("Failed to create form filler")?;
            if !cli.quiet {
                eprintln!("{} Serving on {}", green("◆"), bold(&format!("http://{bind}")));
            }
            server::serve(bind, AppState::new(filler))
                .await
                .context("Server error")?;
        }
        Command::Fill {
            questions,
            data,
            output,
            json,
            ..
        } => {
            let mut filler = FormFiller::new(config).context("Failed to create form filler")?;
            if show_progress {
                let cb: ProgressCallback = CliProgressCallback::new();
                filler = filler.with_progress(cb);
            }

            let result = filler
                .fill_to_file(&questions, &data, &output)
                .await
                .context("Fill failed")?;

            if json {
                let report = serde_json::json!({
                    "output": output.display().to_string(),
                    "pairs": pdf_form_filler::fill::summarize(&result.pairs),
                    "stats": result.stats,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialise output")?
                );
            }

            if !cli.quiet {
                let stats = &result.stats;
                eprintln!(
                    "{}  {}/{} answered  {} page(s)  {}ms  →  {}",
                    if stats.unanswered == 0 { green("✔") } else { red("⚠") },
                    stats.answered,
                    stats.total_questions,
                    stats.pages_rendered,
                    stats.total_duration_ms,
                    bold(&output.display().to_string()),
                );
            }
        }
    }

    Ok(())
}
