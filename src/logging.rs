// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tracing subscriber setup for the binary and embedding hosts

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// `RUST_LOG` wins when set; otherwise `debug` when verbose, `info` if not
fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }))
}

/// Log to stderr
pub fn init(verbose: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Log to a file, discarding whatever a previous session left in it
pub fn init_file(path: impl AsRef<Path>, verbose: bool) -> Result<()> {
    let file = File::create(path.as_ref())
        .with_context(|| format!("Failed to create log file: {:?}", path.as_ref()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
}
