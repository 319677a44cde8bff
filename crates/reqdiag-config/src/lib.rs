use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Thresholds for the full inventory scan of every request body
    #[serde(default)]
    pub scan: Thresholds,

    /// Settings for the deep scan around upstream rejections
    #[serde(default)]
    pub rejection: RejectionScanConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Numeric limits used by the rule engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thresholds {
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: usize,
    #[serde(default = "default_large_payload_bytes")]
    pub large_payload_bytes: usize,
    #[serde(default = "default_huge_payload_bytes")]
    pub huge_payload_bytes: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_history_messages: default_max_history_messages(),
            large_payload_bytes: default_large_payload_bytes(),
            huge_payload_bytes: default_huge_payload_bytes(),
        }
    }
}

/// The rejection scan looks at requests right before a failure, so its
/// payload limits are lower than the inventory scan's.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RejectionScanConfig {
    #[serde(default = "default_max_history_messages")]
    pub max_history_messages: usize,
    #[serde(default = "default_rejection_large_payload_bytes")]
    pub large_payload_bytes: usize,
    #[serde(default = "default_rejection_huge_payload_bytes")]
    pub huge_payload_bytes: usize,
    /// How many lines above a rejection to search for its request body
    #[serde(default = "default_lookback_lines")]
    pub lookback_lines: usize,
}

impl RejectionScanConfig {
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            max_history_messages: self.max_history_messages,
            large_payload_bytes: self.large_payload_bytes,
            huge_payload_bytes: self.huge_payload_bytes,
        }
    }
}

impl Default for RejectionScanConfig {
    fn default() -> Self {
        Self {
            max_history_messages: default_max_history_messages(),
            large_payload_bytes: default_rejection_large_payload_bytes(),
            huge_payload_bytes: default_rejection_huge_payload_bytes(),
            lookback_lines: default_lookback_lines(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportConfig {
    /// Samples kept per issue code
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    /// Directory for per-record JSON dumps (disabled when unset)
    #[serde(default)]
    pub dump_dir: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_samples: default_max_samples(),
            dump_dir: None,
        }
    }
}

fn default_max_history_messages() -> usize {
    100
}

fn default_large_payload_bytes() -> usize {
    400_000
}

fn default_huge_payload_bytes() -> usize {
    800_000
}

fn default_rejection_large_payload_bytes() -> usize {
    80_000
}

fn default_rejection_huge_payload_bytes() -> usize {
    200_000
}

fn default_lookback_lines() -> usize {
    20
}

fn default_max_samples() -> usize {
    5
}

const DEFAULT_CONFIG_PATHS: [&str; 2] = ["./reqdiag.toml", "~/.config/reqdiag/config.toml"];

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub max_history_messages: Option<usize>,
    pub large_payload_bytes: Option<usize>,
    pub huge_payload_bytes: Option<usize>,
    pub max_samples: Option<usize>,
    pub dump_dir: Option<String>,
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config_path_to_load = if let Some(path) = config_path {
            if !Path::new(path).exists() {
                anyhow::bail!("Configuration file not found: {}", path);
            }
            Some(path.to_string())
        } else {
            DEFAULT_CONFIG_PATHS.iter().find_map(|path| {
                let expanded_path = shellexpand::tilde(path);
                if Path::new(expanded_path.as_ref()).exists() {
                    Some(expanded_path.to_string())
                } else {
                    None
                }
            })
        };

        let Some(path) = config_path_to_load else {
            return Ok(Self::default());
        };

        let config_content = std::fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&config_content)
            .map_err(|e| anyhow::anyhow!("Invalid configuration in {}: {}", path, e))?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the rejection lookback window is usable. Threshold pairs
    /// are not ordered: when `large > huge`, the huge check simply wins.
    pub fn validate(&self) -> Result<()> {
        if self.rejection.lookback_lines == 0 {
            anyhow::bail!("rejection.lookback_lines must be at least 1");
        }
        Ok(())
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load the configuration and apply command-line overrides. Only the
    /// inventory scan thresholds are overridable; the rejection scan keeps
    /// its own values.
    pub fn load_with_overrides(config_path: Option<&str>, overrides: CliOverrides) -> Result<Self> {
        let mut config = Self::load(config_path)?;

        if let Some(max_history) = overrides.max_history_messages {
            config.scan.max_history_messages = max_history;
        }
        if let Some(large) = overrides.large_payload_bytes {
            config.scan.large_payload_bytes = large;
        }
        if let Some(huge) = overrides.huge_payload_bytes {
            config.scan.huge_payload_bytes = huge;
        }
        if let Some(max_samples) = overrides.max_samples {
            config.report.max_samples = max_samples;
        }
        if overrides.dump_dir.is_some() {
            config.report.dump_dir = overrides.dump_dir;
        }

        config.validate()?;
        Ok(config)
    }
}
