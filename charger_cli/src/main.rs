mod cli;
mod cycle;
mod error_fmt;
mod inspect;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use charger_config::Config;
use charger_core::error::ChargerError;
use clap::Parser;
use eyre::WrapErr;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cli::{Cli, Commands, DEFAULT_CONFIG_PATH, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            println!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;
    let cfg = load_config(cli.config.as_deref())?;
    init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;

    match cli.cmd {
        Commands::Classify { codes } => inspect::classify(&cfg, &codes, cli.json),
        Commands::Rank { codes } => inspect::rank(&codes, cli.json),
        Commands::Health => inspect::health(&cfg),
        Commands::SelfCheck => {
            let report = cycle::self_check(&cfg, cli.frames.as_deref())?;
            if !report.classification.is_usable() {
                tracing::warn!(
                    cells = report.classification.cell_count,
                    fault = report.classification.fault,
                    "self-check cycle ran but the pack is not usable"
                );
            }
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "status": "ok", "report": cycle::report_json(&report) })
                );
            } else {
                println!("ok");
            }
            Ok(())
        }
        Commands::Run {
            cycles,
            stats,
            looping,
        } => {
            if looping && cli.frames.is_none() {
                eyre::bail!("run --loop replays a recording and needs --frames <FILE>");
            }
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
                tracing::warn!(error = %e, "failed to install Ctrl-C handler");
            }
            cycle::run_cycles(
                &cfg,
                cli.frames.as_deref(),
                cycles,
                stats,
                looping,
                cli.json,
                shutdown,
            )
            .map(|_| ())
        }
    }
}

/// Load and validate the config; an absent default file means built-in defaults.
fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(Config::default());
            }
            default
        }
    };
    let text = fs::read_to_string(&path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    let cfg: Config = toml::from_str(&text)
        .wrap_err_with(|| format!("failed to parse config {}", path.display()))?;
    cfg.validate()
        .map_err(|e| ChargerError::Config(e.to_string()))?;
    Ok(cfg)
}

fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &charger_config::Logging,
) -> eyre::Result<()> {
    let level = cli_level.or(logging.level.as_deref()).unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let pretty = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });
    let json_console = json.then(|| fmt::layer().json().with_writer(std::io::stderr));

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {file}"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json_console)
        .with(file_layer)
        .try_init()?;
    Ok(())
}
