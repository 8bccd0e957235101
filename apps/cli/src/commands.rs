//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use unsloppable_core::{BuildReport, ProgressReporter, SitePipeline};
use unsloppable_shared::{
    AppConfig, BuildConfig, INPUT_DIR_ENV, OUTPUT_DIR_ENV, config_file_path, init_config,
    load_config, load_config_from,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Unsloppable: publish AI/robotics disruption-risk analyses as a static site.
#[derive(Parser)]
#[command(
    name = "unsloppable",
    version,
    about = "Generate a static HTML site from per-company disruption-risk analyses.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Directory containing the analysis files.
    #[arg(long, value_name = "DIR", env = INPUT_DIR_ENV, global = true)]
    pub input: Option<PathBuf>,

    /// Directory to write the site into.
    #[arg(long, value_name = "DIR", env = OUTPUT_DIR_ENV, global = true)]
    pub output: Option<PathBuf>,

    /// Config file (defaults to ~/.unsloppable/unsloppable.toml).
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `build`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Log output format.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Debug, PartialEq, Eq, Subcommand)]
pub(crate) enum Command {
    /// Generate index.html and one page per company.
    Build,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Debug, PartialEq, Eq, Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "unsloppable=info",
        1 => "unsloppable=debug",
        _ => "unsloppable=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        None | Some(Command::Build) => cmd_build(&cli),
        Some(Command::Config { ref action }) => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&cli),
        },
    }
}

/// Load the config file named by `--config`, or the default one.
fn load_app_config(explicit: Option<&Path>) -> Result<AppConfig> {
    match explicit {
        Some(path) => load_config_from(path)
            .wrap_err_with(|| format!("could not load config {}", path.display())),
        None => Ok(load_config()?),
    }
}

/// Merge flags and env vars over the config file.
fn resolve_build_config(cli: &Cli) -> Result<BuildConfig> {
    let app = load_app_config(cli.config.as_deref())?;
    Ok(BuildConfig::resolve(
        &app,
        cli.input.as_deref(),
        cli.output.as_deref(),
    )?)
}

fn cmd_build(cli: &Cli) -> Result<()> {
    let config = resolve_build_config(cli)?;
    info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        "building site"
    );

    let reporter = CliProgress::new();
    let mut pipeline = SitePipeline::new(config);
    let result = pipeline.run(&reporter);
    if result.is_err() {
        reporter.spinner.finish_and_clear();
    }
    let report = result?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &BuildReport) {
    println!();
    println!("  Site generated!");
    println!("  Records:  {}", report.records_loaded);
    println!("  Pages:    {}", report.pages_written);
    println!("  Skipped:  {}", report.skipped.len());
    println!("  Output:   {}", report.output_dir.display());
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());

    for skipped in &report.skipped {
        println!("    - [{}] {}: {}", skipped.stage, skipped.source, skipped.reason);
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn record_loaded(&self, path: &Path, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Loading [{current}/{total}] {}", path.display()));
    }

    fn page_rendered(&self, ticker: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Rendering [{current}/{total}] {ticker}"));
    }

    fn done(&self, _report: &BuildReport) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// Config commands
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = config_file_path()?;
    if path.exists() {
        println!("Config already exists at: {}", path.display());
        return Ok(());
    }
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> Result<()> {
    let resolved = resolve_build_config(cli)?;
    let mut effective = load_app_config(cli.config.as_deref())?;
    effective.paths.input_dir = resolved.input_dir.display().to_string();
    effective.paths.output_dir = resolved.output_dir.display().to_string();

    let source = match &cli.config {
        Some(path) => path.clone(),
        None => config_file_path()?,
    };
    println!("# config file: {}", source.display());
    println!("{}", toml::to_string_pretty(&effective)?);
    Ok(())
}
