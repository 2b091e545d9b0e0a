use crate::{
    config::Config,
    mail::{Mailer, SmtpMailer},
    pipeline::Pipeline,
    platform::{AccountSelector, AdsPlatform, SnapshotPlatform},
    scanner,
    util::{ensure_dir, now_display},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "disapproval-report")]
#[command(about = "Policy-disapproval digest across labelled ad accounts, emailed per label")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./disapproval-report.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate config and show which accounts each label group selects.
    Doctor {},
    /// Run the per-account worker for one account and print its result.
    Scan {
        #[arg(long)]
        account: String,
    },
    /// Scan every label group and send (or preview) the reports.
    Run {
        /// Log the emails instead of sending them.
        #[arg(long)]
        preview: bool,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let mut cfg = Config::load(&cfg_path)?;

    let log_path = resolve_log_path(&cfg);
    let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
    info!("config loaded from {}", cfg_path.display());

    match &args.cmd {
        Command::Doctor {} => doctor(&cfg),
        Command::Scan { account } => scan(&cfg, account),
        Command::Run { preview } => {
            if *preview {
                cfg.mail.preview = true;
            }
            run(&cfg)
        }
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("disapproval-report.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("disapproval-report.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("open log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn load_platform(cfg: &Config) -> Result<SnapshotPlatform> {
    SnapshotPlatform::load(Path::new(&cfg.platform.snapshot_path))
}

fn doctor(cfg: &Config) -> Result<()> {
    cfg.validate()?;
    let platform = load_platform(cfg)?;

    let mut groups = Vec::new();
    for group in &cfg.label_recipients {
        let selector = AccountSelector::with_label(&group.label);
        let accounts = platform.select_accounts(&selector)?;
        groups.push(serde_json::json!({
            "label": group.label,
            "condition": selector.condition(),
            "recipient": crate::dispatch::resolve_recipient(&group.to, &cfg.report.default_to),
            "accounts": accounts.iter().map(|a| a.customer_id()).collect::<Vec<_>>(),
        }));
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "snapshot": cfg.platform.snapshot_path,
            "preview": cfg.mail.preview,
            "groups": groups,
        }))?
    );
    Ok(())
}

fn scan(cfg: &Config, customer_id: &str) -> Result<()> {
    let platform = load_platform(cfg)?;
    let account = platform.account(customer_id)?;
    let result = scanner::scan_account(cfg, account);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run(cfg: &Config) -> Result<()> {
    cfg.validate()?;
    let platform = load_platform(cfg)?;

    let mailer: Option<Box<dyn Mailer>> = if cfg.mail.preview {
        None
    } else {
        Some(Box::new(SmtpMailer::from_config(&cfg.mail)?))
    };

    let pipeline = Pipeline::new(cfg, platform, mailer);
    let summary = pipeline.run(&now_display())?;

    if cfg.output.print_summary {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if summary.has_failures() {
        let failed: Vec<&str> = summary
            .groups
            .iter()
            .filter(|g| matches!(g, crate::dispatch::GroupOutcome::Failed { .. }))
            .map(|g| g.label())
            .collect();
        return Err(anyhow!("report failed for label group(s): {}", failed.join(", ")));
    }

    Ok(())
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    Some(PathBuf::from("logs").join("disapproval-report.log"))
}
