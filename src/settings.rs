use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::fusion::FusionConfig;
use crate::segmentation::SegmentationConfig;

/// Tunable analysis constants. Any field missing from the settings file
/// keeps its default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub fusion: FusionConfig,
    pub segmentation: SegmentationConfig,
}

impl AnalysisSettings {
    /// Read settings from a JSON file. A missing or malformed file yields
    /// the defaults; only an unreadable existing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Ok(serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!(
                "Ignoring malformed settings in {}: {err}; using defaults",
                path.display()
            );
            Self::default()
        }))
    }
}
