use anyhow::{anyhow, Result};
use api_client::{ApiClient, ClientOptions, DEFAULT_API_URL};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use validate::{HttpValidator, LocalValidator};
use vapt_core::{AssessmentStatus, Assessor, IgnoreReason, PhaseDescriptor, PhaseKind, RunOutcome, VALIDATION_TIMEOUT};

mod config;
mod render;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat { Text, Json }

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum PhaseArg { Recon, Vuln }

impl From<PhaseArg> for PhaseKind {
    fn from(p: PhaseArg) -> Self {
        match p {
            PhaseArg::Recon => PhaseKind::Recon,
            PhaseArg::Vuln => PhaseKind::Vuln,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "vapt", version, about = "Drive a recon + vulnerability assessment against one target")]
struct Cli {
    /// Optional config file (YAML). If omitted, loads ./vapt.yaml if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Backend base URL (default: http://localhost:8000)
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print version information
    Version,
    /// Check that the backend is up
    Ping,
    /// Validate a target, then run recon and vulnerability phases in order
    Assess {
        /// Hostname, IP or URL
        target: String,
        /// Output format: text (live log + summary) or json (final state)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Validate the target format locally instead of asking the backend
        #[arg(long, default_value_t = false)]
        offline_validate: bool,
        /// Phases to leave out (repeatable)
        #[arg(long, value_enum)]
        skip: Vec<PhaseArg>,
        /// Validation timeout in seconds
        #[arg(long)]
        validate_timeout_secs: Option<u64>,
        /// Recon phase timeout in seconds
        #[arg(long)]
        recon_timeout_secs: Option<u64>,
        /// Vulnerability phase timeout in seconds
        #[arg(long)]
        vuln_timeout_secs: Option<u64>,
    },
}

struct Settings {
    api_url: String,
    connect_timeout_ms: u64,
    validate_timeout: Duration,
    recon_timeout: Duration,
    vuln_timeout: Duration,
    offline_validate: bool,
    format: OutputFormat,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn parse_format(s: &str) -> Result<OutputFormat> {
    OutputFormat::from_str(s, true).map_err(|_| anyhow!("unknown format in config: {}", s))
}

fn client(settings: &Settings) -> Result<ApiClient> {
    let opts = ClientOptions { connect_timeout_ms: settings.connect_timeout_ms, ..Default::default() };
    Ok(ApiClient::with_options(&settings.api_url, opts)?)
}

fn phase_list(api: &ApiClient, settings: &Settings, skip: &[PhaseKind]) -> Vec<PhaseDescriptor> {
    let mut phases = Vec::new();
    #[cfg(feature = "recon")]
    if !skip.contains(&PhaseKind::Recon) {
        phases.push(recon::ReconPhase::descriptor(api.clone()).with_timeout(settings.recon_timeout));
    }
    #[cfg(feature = "vuln")]
    if !skip.contains(&PhaseKind::Vuln) {
        phases.push(vuln_scan::VulnPhase::descriptor(api.clone()).with_timeout(settings.vuln_timeout));
    }
    #[cfg(not(all(feature = "recon", feature = "vuln")))]
    let _ = (api, settings, skip);
    phases
}

async fn assess(target: String, settings: Settings, skip: Vec<PhaseKind>) -> Result<()> {
    let api = client(&settings)?;
    let phases = phase_list(&api, &settings, &skip);
    info!(api = %api.base_url(), phases = phases.len(), offline = settings.offline_validate, "assessment configured");
    let assessor = if settings.offline_validate {
        Assessor::new(LocalValidator::new()?, phases)
    } else {
        Assessor::new(HttpValidator::new(api.clone()).with_budget(settings.validate_timeout), phases)
    }
    .with_validation_timeout(settings.validate_timeout);

    let live = settings.format == OutputFormat::Text;
    let mut rx = assessor.subscribe();
    let printer = tokio::spawn(async move {
        let mut printed = 0usize;
        while rx.changed().await.is_ok() {
            let snap = rx.borrow_and_update().clone();
            let entries = snap.log().entries();
            if live {
                for e in entries.iter().skip(printed) {
                    println!("{}", e);
                }
            }
            printed = entries.len();
        }
    });

    let outcome = assessor.run(target).await;
    drop(assessor);
    let _ = printer.await;

    let ctx = match outcome {
        RunOutcome::Finished(ctx) => ctx,
        RunOutcome::Ignored(IgnoreReason::EmptyTarget) => {
            eprintln!("nothing to assess: empty target");
            return Ok(());
        }
        RunOutcome::Ignored(IgnoreReason::AlreadyScanning) => return Err(anyhow!("an assessment is already running")),
    };
    match settings.format {
        OutputFormat::Text => print!("\n{}", render::summary(&ctx, &api)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ctx)?),
    }
    if ctx.status() == AssessmentStatus::Error {
        return Err(anyhow!("assessment ended in {}", ctx.status()));
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let cfg = config::load_config(cli.config.as_deref())?.unwrap_or_default();
    debug!(?cfg, "config loaded");
    let api_url = cli.api_url.or(cfg.api_url.clone()).unwrap_or_else(|| DEFAULT_API_URL.to_string());
    match cli.command {
        Commands::Version => {
            println!("vapt {} (core {})", env!("CARGO_PKG_VERSION"), vapt_core::version());
        }
        Commands::Ping => {
            let settings = Settings {
                api_url,
                connect_timeout_ms: cfg.connect_timeout_ms.unwrap_or(5_000),
                validate_timeout: VALIDATION_TIMEOUT,
                recon_timeout: PhaseKind::Recon.default_timeout(),
                vuln_timeout: PhaseKind::Vuln.default_timeout(),
                offline_validate: false,
                format: OutputFormat::Text,
            };
            let api = client(&settings)?;
            let rt = tokio::runtime::Runtime::new()?;
            let status = rt.block_on(api.ping())?;
            println!("{}: {}", api.base_url(), status);
        }
        Commands::Assess { target, format, offline_validate, skip, validate_timeout_secs, recon_timeout_secs, vuln_timeout_secs } => {
            let format = match (format, cfg.format.as_deref()) {
                (Some(f), _) => f,
                (None, Some(s)) => parse_format(s)?,
                (None, None) => OutputFormat::Text,
            };
            let secs = |flag: Option<u64>, file: Option<u64>, default: Duration| {
                flag.or(file).map(Duration::from_secs).unwrap_or(default)
            };
            let settings = Settings {
                api_url,
                connect_timeout_ms: cfg.connect_timeout_ms.unwrap_or(5_000),
                validate_timeout: secs(validate_timeout_secs, cfg.validate_timeout_secs, VALIDATION_TIMEOUT),
                recon_timeout: secs(recon_timeout_secs, cfg.recon_timeout_secs, PhaseKind::Recon.default_timeout()),
                vuln_timeout: secs(vuln_timeout_secs, cfg.vuln_timeout_secs, PhaseKind::Vuln.default_timeout()),
                offline_validate: offline_validate || cfg.offline_validate.unwrap_or(false),
                format,
            };
            let skip: Vec<PhaseKind> = skip.into_iter().map(PhaseKind::from).collect();
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(assess(target, settings, skip))?;
        }
    }
    Ok(())
}
