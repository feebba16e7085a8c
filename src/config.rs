// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment override for the config file location.
pub const CONFIG_ENV: &str = "DASHBOARD_CONFIG";

/// Clamped node-size curve: `clamp(min, max, base + scale * sqrt(count))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeCurve {
    pub min: f64,
    pub max: f64,
    pub base: f64,
    pub scale: f64,
}

impl SizeCurve {
    pub fn size(&self, count: usize) -> f64 {
        (self.base + self.scale * (count as f64).sqrt()).clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub top_countries: usize,
    pub top_places: usize,
    pub countries_per_category: usize,

    /// Radius of the category ring.
    pub outer_radius: f64,
    /// Radius of each category's country ring.
    pub inner_radius: f64,
    pub category_size: SizeCurve,
    pub country_size: SizeCurve,

    pub density_geo_radius: u32,
    pub hist2d_geo_radius: u32,
    pub histogram_lon_bins: usize,
    pub histogram_lat_bins: usize,

    /// Try map modes first; off means go straight to the fallback view.
    pub prefer_maps: bool,
    /// Delay before the settle/resize pass once a cycle has been dispatched.
    pub settle_delay_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_countries: 40,
            top_places: 15,
            countries_per_category: 18,
            outer_radius: 1.65,
            inner_radius: 0.62,
            category_size: SizeCurve {
                min: 20.0,
                max: 70.0,
                base: 12.0,
                scale: 2.4,
            },
            country_size: SizeCurve {
                min: 8.0,
                max: 26.0,
                base: 6.0,
                scale: 1.8,
            },
            density_geo_radius: 18,
            hist2d_geo_radius: 28,
            histogram_lon_bins: 36,
            histogram_lat_bins: 18,
            prefer_maps: true,
            settle_delay_ms: 80,
        }
    }
}

impl DashboardConfig {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read dashboard config {}", path.display()))?;
        let cfg: DashboardConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("parse dashboard config {}", path.display()))?;
        debug!("Loaded dashboard config - path={}", path.display());
        Ok(cfg)
    }

    /// CLI path > `DASHBOARD_CONFIG` > built-in defaults.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        let path = cli_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(CONFIG_ENV).ok().map(PathBuf::from));
        match path {
            Some(p) => Self::from_yaml_file(&p),
            None => {
                debug!("No dashboard config given, using defaults");
                Ok(Self::default())
            }
        }
    }
}
