// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Detection configuration

use crate::collision::DetectionMode;
use crate::error::ClashError;
use crate::utils::mm_to_model;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up by [`DetectionConfig::load`]
pub const CONFIG_FILE: &str = "clashcheck.toml";

/// Placeholder shown by hosts when no level is selected
const NO_LEVEL: &str = "None";

/// Face sampling parameters of the distance estimator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Faces of a solid considered before giving up on the rest
    pub max_faces_per_solid: usize,
    /// Sampled points used per face
    pub points_per_face: usize,
    /// Cap on the UV grid size before it is scaled down
    pub max_grid_points: usize,
    /// Nominal UV spacing between grid points
    pub base_step: f64,
    /// Fraction of faces a point must touch to count as inside a solid
    pub inside_ratio: f64,
    /// Fixed seed for the sample shuffle; random when unset
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            max_faces_per_solid: 100,
            points_per_face: 40,
            max_grid_points: 50,
            base_step: 0.05,
            inside_ratio: 0.6,
            seed: None,
        }
    }
}

/// Everything a detection run needs besides the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Category labels of the first group
    pub group1: Vec<String>,
    /// Category labels of the second group
    pub group2: Vec<String>,
    pub mode: DetectionMode,
    /// Soft clearance in display millimetres
    pub clearance_mm: f64,
    /// Level selection as shown by the host, e.g. `"1F (0.0m)"`
    pub level: Option<String>,
    /// Cache population workers; rayon's default when unset
    pub parallelism: Option<usize>,
    pub sampling: SamplingConfig,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            group1: Vec::new(),
            group2: Vec::new(),
            mode: DetectionMode::Hard,
            clearance_mm: 0.0,
            level: None,
            parallelism: None,
            sampling: SamplingConfig::default(),
        }
    }
}

impl DetectionConfig {
    /// Hard-mode configuration for two groups
    pub fn hard(group1: &[&str], group2: &[&str]) -> Self {
        Self {
            group1: group1.iter().map(|label| label.to_string()).collect(),
            group2: group2.iter().map(|label| label.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Soft-mode configuration with a clearance in millimetres
    pub fn soft(group1: &[&str], group2: &[&str], clearance_mm: f64) -> Self {
        Self {
            mode: DetectionMode::Soft,
            clearance_mm,
            ..Self::hard(group1, group2)
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.sampling.seed = Some(seed);
        self
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: DetectionConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Reads `path` if given, otherwise `clashcheck.toml` when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if PathBuf::from(CONFIG_FILE).exists() => Self::from_file(CONFIG_FILE)?,
            None => Self::default(),
        };

        if let Ok(parallelism) = std::env::var("CLASHCHECK_PARALLELISM") {
            config.parallelism = parallelism.parse().ok();
        }

        if let Ok(seed) = std::env::var("CLASHCHECK_SEED") {
            config.sampling.seed = seed.parse().ok();
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Reject requests that cannot produce a meaningful run
    pub fn validate(&self) -> Result<(), ClashError> {
        self.sampling.validate()?;

        if self.group1.is_empty() || self.group2.is_empty() {
            return Err(ClashError::InvalidRequest(
                "select at least one category in each group".into(),
            ));
        }
        if self.mode == DetectionMode::Soft
            && !(self.clearance_mm.is_finite() && self.clearance_mm > 0.0)
        {
            return Err(ClashError::InvalidRequest(format!(
                "soft detection needs a positive clearance, got {} mm",
                self.clearance_mm
            )));
        }
        Ok(())
    }

    /// Clearance threshold in model units; zero in hard mode
    pub fn threshold(&self) -> f64 {
        match self.mode {
            DetectionMode::Hard => 0.0,
            DetectionMode::Soft => mm_to_model(self.clearance_mm),
        }
    }

    /// Elevation filter requested by the level selection, if any
    pub fn level_filter(&self) -> Option<LevelFilter> {
        self.level.as_deref().and_then(LevelFilter::parse)
    }
}

impl SamplingConfig {
    fn validate(&self) -> Result<(), ClashError> {
        if self.max_faces_per_solid == 0 || self.points_per_face == 0 {
            return Err(ClashError::Config(
                "sampling needs at least one face and one point per face".into(),
            ));
        }
        if self.max_grid_points < 4 {
            return Err(ClashError::Config(format!(
                "max_grid_points must allow a 2 x 2 grid, got {}",
                self.max_grid_points
            )));
        }
        if !(self.base_step.is_finite() && self.base_step > 0.0) {
            return Err(ClashError::Config(format!(
                "base_step must be positive, got {}",
                self.base_step
            )));
        }
        if !(0.0..=1.0).contains(&self.inside_ratio) {
            return Err(ClashError::Config(format!(
                "inside_ratio must be within [0, 1], got {}",
                self.inside_ratio
            )));
        }
        Ok(())
    }
}

/// Level whose elevation caps the candidate objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelFilter {
    name: String,
}

impl LevelFilter {
    /// Parse a host selection such as `"1F (0.0m)"`.
    ///
    /// Empty selections and the `None` placeholder mean no filter.
    pub fn parse(selection: &str) -> Option<Self> {
        let trimmed = selection.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_LEVEL) {
            return None;
        }
        let name = trimmed.split('(').next().unwrap_or(trimmed).trim();
        (!name.is_empty()).then(|| Self {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}
