// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Clashcheck CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clashcheck::{logging, CollisionEngine, DetectionConfig, DetectionMode, MemoryModel, Reporter};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "clashcheck")]
#[command(about = "Clashcheck - hard and soft collision detection between model categories", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect collisions between two groups of categories
    Detect {
        /// Scene JSON file
        #[arg(short, long, value_name = "FILE")]
        scene: PathBuf,

        /// Categories of the first group, comma separated
        #[arg(long, value_delimiter = ',')]
        group1: Vec<String>,

        /// Categories of the second group, comma separated
        #[arg(long, value_delimiter = ',')]
        group2: Vec<String>,

        /// Soft detection with this clearance in millimetres
        #[arg(long, value_name = "MM")]
        soft: Option<f64>,

        /// Level selection, e.g. "1F (0.0m)"
        #[arg(long)]
        level: Option<String>,

        /// Configuration file (defaults to clashcheck.toml when present)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads for cache population
        #[arg(long)]
        threads: Option<usize>,

        /// Report file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Log to this file instead of stderr; cleared on start
        #[arg(long, value_name = "FILE")]
        log: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write a configuration file with default settings
    InitConfig {
        /// Output TOML file
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            scene,
            group1,
            group2,
            soft,
            level,
            config,
            seed,
            threads,
            output,
            format,
            log,
            verbose,
        } => {
            match &log {
                Some(path) => logging::init_file(path, verbose)?,
                None => logging::init(verbose)?,
            }

            let mut config = DetectionConfig::load(config.as_deref())?;
            if !group1.is_empty() {
                config.group1 = group1;
            }
            if !group2.is_empty() {
                config.group2 = group2;
            }
            if let Some(clearance) = soft {
                config.mode = DetectionMode::Soft;
                config.clearance_mm = clearance;
            }
            if level.is_some() {
                config.level = level;
            }
            if seed.is_some() {
                config.sampling.seed = seed;
            }
            if threads.is_some() {
                config.parallelism = threads;
            }

            detect_command(scene, config, output, format)?;
        }

        Commands::InitConfig { path } => {
            DetectionConfig::default().save(&path)?;
            println!("{} {}", "Wrote".green(), path.display().to_string().cyan());
        }
    }

    Ok(())
}

fn detect_command(
    scene: PathBuf,
    config: DetectionConfig,
    output: Option<PathBuf>,
    format: ReportFormat,
) -> Result<()> {
    let model = MemoryModel::load_json(&scene)
        .with_context(|| format!("Failed to load scene: {:?}", scene))?;

    let mut engine = CollisionEngine::new(Arc::new(model), config);
    if let Err(err) = engine.run() {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), err);
        std::process::exit(1);
    }

    let report = engine.report();
    Reporter::print_summary(&report);

    if let Some(path) = output {
        match format {
            ReportFormat::Text => Reporter::write_text(&report.records, &path)?,
            ReportFormat::Json => Reporter::write_json(&report, &path)?,
        }
        println!("{} {}", "Report written to".green(), path.display().to_string().cyan());
    }

    Ok(())
}
