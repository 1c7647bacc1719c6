// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision report export and terminal summary

use crate::collision::{CollisionKind, CollisionRecord, DetectionMode, DetectionStats, Diagnostic};
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything worth keeping from one detection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    pub timestamp: DateTime<Local>,
    pub mode: DetectionMode,
    pub clearance_mm: f64,
    pub stats: DetectionStats,
    pub records: Vec<CollisionRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl DetectionReport {
    pub fn hard_count(&self) -> usize {
        self.count(CollisionKind::Hard)
    }

    pub fn soft_count(&self) -> usize {
        self.count(CollisionKind::Soft)
    }

    fn count(&self, kind: CollisionKind) -> usize {
        self.records.iter().filter(|r| r.kind() == kind).count()
    }
}

pub struct Reporter;

impl Reporter {
    /// Plain text report, one record summary per line
    pub fn render_text(records: &[CollisionRecord]) -> String {
        let title = "Collision Report";
        let mut text = String::new();
        text.push_str(title);
        text.push('\n');
        text.push_str(&"=".repeat(title.len()));
        text.push('\n');
        for record in records {
            text.push_str(&record.summary());
            text.push('\n');
        }
        text
    }

    /// Write the plain text report
    pub fn write_text(records: &[CollisionRecord], path: impl AsRef<Path>) -> Result<()> {
        fs::write(path.as_ref(), Self::render_text(records))
            .with_context(|| format!("Failed to write report: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Write the full report as JSON
    pub fn write_json(report: &DetectionReport, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write report: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Print a colored summary to stdout
    pub fn print_summary(report: &DetectionReport) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!(
            "{} {} {}",
            "Mode:".bold(),
            report.mode.as_str().cyan(),
            match report.mode {
                DetectionMode::Hard => String::new(),
                DetectionMode::Soft => format!("(clearance {} mm)", report.clearance_mm),
            }
            .bright_black()
        );
        println!("{}", "━".repeat(80).bright_black());

        if report.records.is_empty() {
            println!("{} {}", "✅".green(), "No collisions found".green().bold());
        } else {
            println!(
                "{} {} collisions ({} hard, {} soft)",
                "❌".red(),
                report.records.len().to_string().red().bold(),
                report.hard_count(),
                report.soft_count()
            );
            for record in &report.records {
                let line = record.summary();
                match record.kind() {
                    CollisionKind::Hard => println!("  {}", line.red()),
                    CollisionKind::Soft => println!("  {}", line.yellow()),
                }
            }
        }

        println!("\n{}", "Statistics:".bold());
        println!(
            "  {} {}",
            "Pairs considered:".bright_black(),
            report.stats.candidate_pairs.to_string().cyan()
        );
        println!(
            "  {} {}",
            "Broad phase hits:".bright_black(),
            report.stats.broad_phase_passed.to_string().cyan()
        );

        if !report.diagnostics.is_empty() {
            println!(
                "\n{} {} diagnostics recorded",
                "⚠️  Warning:".yellow().bold(),
                report.diagnostics.len()
            );
            for diagnostic in &report.diagnostics {
                println!("  {}", diagnostic.message.bright_black());
            }
        }
        println!("{}", "━".repeat(80).bright_black());
    }
}
