//! corona-site - static HTML pages from a corona case database
//!
//! The main entry point, handling:
//! - Argument parsing and logging setup
//! - Configuration resolution and validation
//! - The generation run and its exit code

use clap::Parser;
use cs_config::{load_config, validate_config, SiteOverrides};
use cs_core::exit_codes::ExitCode;
use cs_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, LogLevel, Stage,
};
use cs_core::{log_event, GenerationSummary, SiteError, SiteGenerator, StepContext};
use std::path::PathBuf;

const SUCCESS_LINE: &str = "Generation of HTML files was successful.";
const FAILURE_LINE: &str = "Generation of HTML files failed!";

/// Generate static HTML pages with case graphs from a corona SQLite database
#[derive(Parser, Debug)]
#[command(name = "corona-site")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database with the country and covid19 tables
    db_path: PathBuf,

    /// Directory for the generated pages; must not exist yet
    output_dir: PathBuf,

    /// Site configuration file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Template file used instead of the built-in one
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Directory whose files are copied to <OUTPUT_DIR>/assets
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Load the chart library from the CDN instead of <OUTPUT_DIR>/assets
    #[arg(long)]
    chart_cdn: bool,

    /// Recalculate accumulated numbers even if they exist
    #[arg(long)]
    recompute_totals: bool,

    /// Do not generate one incidence page per group
    #[arg(long)]
    no_group_pages: bool,

    /// Minify generated pages
    #[arg(long)]
    minify: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log format on stderr: human or jsonl
    #[arg(long, value_name = "FORMAT")]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn overrides(&self) -> SiteOverrides {
        SiteOverrides {
            template_path: self.template.clone(),
            assets_dir: self.assets.clone(),
            recompute_totals: self.recompute_totals,
            no_group_pages: self.no_group_pages,
            minify: self.minify,
            chart_cdn: self.chart_cdn,
        }
    }

    fn log_level(&self) -> Option<LogLevel> {
        if self.quiet {
            return Some(LogLevel::Error);
        }
        match self.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version go to stdout with status 0
            if !err.use_stderr() {
                err.exit();
            }
            let _ = err.print();
            std::process::exit(ExitCode::ArgsError.as_i32());
        }
    };

    let log_config = LogConfig::from_env(cli.log_level(), cli.log_format);
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id());
    log_event!(
        ctx,
        INFO,
        event_names::RUN_STARTED,
        Stage::Init,
        "Starting generation",
        db = cli.db_path.display().to_string().as_str(),
        output = cli.output_dir.display().to_string().as_str()
    );

    let exit_code = match run(&cli, &ctx) {
        Ok(summary) => {
            log_event!(
                ctx,
                INFO,
                event_names::RUN_FINISHED,
                Stage::Index,
                "Generation finished",
                pages = summary.pages.len(),
                bytes = summary.bytes_written
            );
            println!("{}", SUCCESS_LINE);
            ExitCode::Clean
        }
        Err(err) => {
            let code = ExitCode::for_kind(err.kind());
            log_event!(
                ctx,
                ERROR,
                event_names::RUN_FAILED,
                Stage::Init,
                err.kind().headline(),
                code = code.as_i32()
            );
            println!("{}", FAILURE_LINE);
            eprintln!("error: {}", err);
            if log_config.format == LogFormat::Jsonl {
                eprintln!("{}", err.to_structured().to_json());
            }
            code
        }
    };

    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli, ctx: &LogContext) -> Result<GenerationSummary, SiteError> {
    let loaded = load_config(cli.config.as_deref()).step("config")?;
    let mut config = loaded.config;
    config.apply_overrides(&cli.overrides());
    validate_config(&config).step("config")?;
    log_event!(
        ctx,
        DEBUG,
        event_names::CONFIG_LOADED,
        Stage::Init,
        "Configuration loaded",
        source = loaded.source.to_string().as_str()
    );

    let generator = SiteGenerator::new(config, ctx.clone())?;
    generator.run(&cli.db_path, &cli.output_dir)
}
