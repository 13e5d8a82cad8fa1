mod cli;
mod commands;
mod config;
mod effects;
mod render;
mod session;

use std::io;

use anyhow::Context;
use clap::Parser;
use forge_engine::{ensure_output_dir, DownloadWriter, EngineHandle};
use forge_logging::{forge_info, forge_warn};

use crate::cli::Cli;
use crate::config::{load_config, AppConfig, Settings};
use crate::effects::EffectRunner;
use crate::session::{spawn_stdin_reader, Session};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = match load_config(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    let settings = Settings::resolve(&cli, config);

    forge_logging::initialize(
        settings.log_destination,
        forge_logging::level_for_verbosity(cli.verbose),
    );
    if let Some(err) = config_error {
        forge_warn!("{}; using defaults", err);
    }
    forge_info!(
        "selector_forge starting: backend={} output_dir={}",
        settings.backend_url,
        settings.output_dir.display()
    );

    ensure_output_dir(&settings.output_dir).with_context(|| {
        format!(
            "output directory {} is not usable",
            settings.output_dir.display()
        )
    })?;

    let engine = EngineHandle::new(settings.client_settings());
    let runner = EffectRunner::new(engine, DownloadWriter::new(settings.output_dir.clone()));
    let mut session = Session::new(&settings, runner, io::stdout());
    session
        .run(spawn_stdin_reader())
        .context("terminal output failed")?;

    forge_info!("selector_forge exiting");
    Ok(())
}
