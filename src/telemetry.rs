//! Tracing subscriber setup.
//!
//! Installed once by `main` before anything else runs. Output goes to stdout,
//! or to an append-only file when `LOG_FILE` is set.

use std::{fs::OpenOptions, sync::Mutex};

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

pub fn init_tracing(cfg: &LogConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_new(&cfg.filter).context("parse RUST_LOG filter")?;
    let registry = tracing_subscriber::registry().with(env_filter);

    match (&cfg.file, cfg.json) {
        (Some(path), json) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {path}"))?;
            let layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));
            if json {
                registry.with(layer.json()).try_init()?;
            } else {
                registry.with(layer).try_init()?;
            }
        }
        (None, true) => registry
            .with(fmt::layer().with_target(false).json())
            .try_init()?,
        (None, false) => registry.with(fmt::layer()).try_init()?,
    }
    Ok(())
}
