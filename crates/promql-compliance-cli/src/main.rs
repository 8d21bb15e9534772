// crates/promql-compliance-cli/src/main.rs
// ============================================================================
// Module: PromQL Compliance Tester Entry Point
// Description: Loads a suite, compares two query endpoints, and reports.
// Purpose: Provide a localized CLI that always emits a report once a run starts.
// Dependencies: clap, promql-compliance-*, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The tester loads its configuration, expands the test suite over a window
//! ending shortly before now, and runs every case against the reference and
//! test targets. Results go to stdout in the selected format; progress,
//! run events, and errors go to stderr. Ctrl-C stops new comparisons and the
//! report for the completed cases is still written.
//!
//! All blocking HTTP work (targets and telemetry delivery) happens on a
//! blocking worker thread so the async runtime only watches for interrupts.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use promql_compliance_cli::i18n::Locale;
use promql_compliance_cli::i18n::set_locale;
use promql_compliance_cli::progress::ProgressPrinter;
use promql_compliance_cli::t;
use promql_compliance_config::ComplianceConfig;
use promql_compliance_config::TelemetryConfig;
use promql_compliance_core::CancellationFlag;
use promql_compliance_core::Comparer;
use promql_compliance_core::RunEventSink;
use promql_compliance_core::RunOptions;
use promql_compliance_core::Runner;
use promql_compliance_core::expand_test_cases;
use promql_compliance_http::HttpQueryTarget;
use promql_compliance_output::EventReporter;
use promql_compliance_output::HtmlReporter;
use promql_compliance_output::JsonReporter;
use promql_compliance_output::Reporter;
use promql_compliance_output::RunReport;
use promql_compliance_output::TextReporter;
use promql_compliance_output::TsvReporter;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable selecting the CLI language.
const LANG_ENV: &str = "PROMQL_COMPLIANCE_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "promql-compliance-tester",
    about = "Compare a PromQL implementation against a reference Prometheus.",
    disable_version_flag = true
)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// Preferred output language (overrides `PROMQL_COMPLIANCE_LANG`).
    #[arg(long, value_enum, value_name = "LANG")]
    lang: Option<LangArg>,
    /// Configuration file (defaults to `PROMQL_COMPLIANCE_CONFIG`, then
    /// `promql-compliance-tester.toml`).
    #[arg(long = "config-file", value_name = "PATH")]
    config_file: Option<PathBuf>,
    /// Report format written to stdout.
    #[arg(long = "output-format", value_enum, default_value = "text", value_name = "FORMAT")]
    output_format: OutputFormat,
    /// HTML template with `{{summary}}` and `{{results}}` markers.
    #[arg(long = "output-html-template", value_name = "PATH")]
    output_html_template: Option<PathBuf>,
    /// Include passing cases in the report.
    #[arg(long = "output-passing", action = ArgAction::SetTrue)]
    output_passing: bool,
    /// Concurrent comparisons (overrides `run.concurrency`).
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,
}

/// Supported report formats.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable text.
    Text,
    /// One JSON document.
    Json,
    /// Tab-separated rows.
    Tsv,
    /// Self-contained HTML page.
    Html,
    /// Telemetry events posted to a collector.
    Event,
}

impl OutputFormat {
    /// Returns the format label used in messages.
    const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Tsv => "tsv",
            Self::Html => "html",
            Self::Event => "event",
        }
    }
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

/// Run settings taken from the command line.
#[derive(Debug, Clone)]
struct RunSettings {
    /// Report format.
    output_format: OutputFormat,
    /// Optional HTML template.
    output_html_template: Option<PathBuf>,
    /// Include passing cases in the report.
    output_passing: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments, loads configuration, and executes the run.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = ComplianceConfig::load(cli.config_file.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    if let Some(concurrency) = cli.concurrency {
        config.run.concurrency = concurrency;
    }
    let settings = RunSettings {
        output_format: cli.output_format,
        output_html_template: cli.output_html_template,
        output_passing: cli.output_passing,
    };

    let cancellation = CancellationFlag::new();
    let watcher = tokio::spawn(watch_interrupt(cancellation.clone()));
    let joined =
        tokio::task::spawn_blocking(move || execute(&config, &settings, cancellation)).await;
    watcher.abort();
    joined.map_err(|err| CliError::new(t!("run.worker_failed", error = err)))?
}

/// Cancels the run on the first interrupt.
async fn watch_interrupt(cancellation: CancellationFlag) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            cancellation.cancel();
            let _ = write_stderr_line(&t!("run.cancel_requested"));
        }
        Err(err) => {
            let _ = write_stderr_line(&t!("run.signal_failed", error = err));
        }
    }
}

// ============================================================================
// SECTION: Run
// ============================================================================

/// Builds the suite, runs it, and writes the report. Blocking.
fn execute(
    config: &ComplianceConfig,
    settings: &RunSettings,
    cancellation: CancellationFlag,
) -> CliResult<ExitCode> {
    let events = config
        .logging
        .build_sink()
        .map_err(|err| CliError::new(t!("logging.init_failed", error = err)))?;
    let telemetry = config.telemetry.clone().with_process_env();
    let reporter = build_reporter(
        settings.output_format,
        settings.output_html_template.as_deref(),
        &telemetry,
        &events,
    )?;

    let suite = config
        .suite()
        .map_err(|err| CliError::new(t!("config.suite_invalid", error = err)))?;
    let window = config
        .query_window(now_ms()?)
        .map_err(|err| CliError::new(t!("config.window_invalid", error = err)))?;
    let cases = expand_test_cases(&suite.templates, &suite.catalog, &suite.tweaker, window)
        .map_err(|err| CliError::new(t!("suite.expand_failed", error = err)))?;
    let tweak_notes: Vec<String> =
        suite.tweaker.notes().into_iter().map(str::to_string).collect();

    let reference_url = config.reference_target.query_url.as_str();
    let test_url = config.test_target.query_url.as_str();
    let target_failed = |role: &str, err: &dyn Display| {
        CliError::new(t!("target.init_failed", role = role, error = err))
    };
    let reference = HttpQueryTarget::new(config.reference_target.clone())
        .map_err(|err| target_failed("reference", &err))?;
    let test = HttpQueryTarget::new(config.test_target.clone())
        .map_err(|err| target_failed("test", &err))?;
    let comparer = Comparer::new(reference, test, suite.tweaker, config.comparer_config())
        .with_events(Arc::clone(&events));

    write_stderr_line(&t!(
        "run.started",
        count = cases.len(),
        test = test_url,
        reference = reference_url
    ))
    .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    let options = RunOptions {
        concurrency: config.run.concurrency,
    };
    let outcome = Runner::new(&comparer, options)
        .with_cancellation(cancellation)
        .with_progress(Arc::new(ProgressPrinter::new(std::io::stderr())))
        .run(&cases)
        .map_err(|err| CliError::new(t!("run.failed", error = err)))?;
    if outcome.cancelled {
        write_stderr_line(&t!("run.cancelled", completed = outcome.summary.total))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    let report = RunReport {
        summary: outcome.summary,
        fingerprint: &outcome.fingerprint,
        reference_url,
        test_url,
        tweak_notes,
        cancelled: outcome.cancelled,
        include_passing: settings.output_passing,
        results: &outcome.results,
    };
    let mut stdout = std::io::stdout().lock();
    reporter
        .report(&report, &mut stdout)
        .and_then(|()| stdout.flush().map_err(Into::into))
        .map_err(|err| {
            let format = settings.output_format.as_str();
            CliError::new(t!("report.failed", format = format, error = err))
        })?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the reporter for `format`.
fn build_reporter(
    format: OutputFormat,
    html_template: Option<&Path>,
    telemetry: &TelemetryConfig,
    events: &Arc<dyn RunEventSink>,
) -> CliResult<Box<dyn Reporter>> {
    let init_failed = |err: &dyn Display| {
        CliError::new(t!("reporter.init_failed", format = format.as_str(), error = err))
    };
    match format {
        OutputFormat::Text => Ok(Box::new(TextReporter)),
        OutputFormat::Json => Ok(Box::new(JsonReporter)),
        OutputFormat::Tsv => Ok(Box::new(TsvReporter)),
        OutputFormat::Html => match html_template {
            Some(path) => {
                let reporter =
                    HtmlReporter::from_template_file(path).map_err(|err| init_failed(&err))?;
                Ok(Box::new(reporter))
            }
            None => Ok(Box::new(HtmlReporter::default())),
        },
        OutputFormat::Event => {
            telemetry.validate().map_err(|err| init_failed(&err))?;
            let reporter = EventReporter::new(
                telemetry.collector_url.as_deref(),
                telemetry.insert_key.as_deref(),
                &telemetry.event_type,
            )
            .map_err(|err| init_failed(&err))?
            .with_events(Arc::clone(events));
            Ok(Box::new(reporter))
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the CLI locale from the flag, then the environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Returns the current time in Unix milliseconds.
fn now_ms() -> CliResult<i64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|_| CliError::new(t!("config.clock_invalid")))?;
    i64::try_from(elapsed.as_millis()).map_err(|_| CliError::new(t!("config.clock_invalid")))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
