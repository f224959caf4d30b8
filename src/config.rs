use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

/// Application configuration loaded from TOML config file.
/// All fields have sensible defaults — the config file is optional.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// Number of parallel workers. 0 = auto-detect (cores / 2, min 1).
    pub workers: usize,
    /// Per-file analysis timeout in seconds. 0 disables the timeout.
    pub timeout_secs: u64,
    /// STFT window parameters.
    pub stft: StftConfig,
    /// Frequency bands of interest.
    pub bands: BandConfig,
    /// VAD risk thresholds (dB).
    pub thresholds: ThresholdConfig,
    /// Output artifact locations.
    pub output: OutputConfig,
}

/// Short-time Fourier transform parameters.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct StftConfig {
    /// Samples per analysis window. 4096 gives ~10.8 Hz bins at 44.1 kHz.
    pub window_size: usize,
    /// Overlapping samples between consecutive windows. Must be < window_size.
    pub overlap: usize,
}

impl Default for StftConfig {
    fn default() -> Self {
        Self {
            window_size: 4096,
            overlap: 2048,
        }
    }
}

/// Frequency intervals (Hz) examined by the pipeline.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct BandConfig {
    /// Low-frequency-noise / infrasound band. The VAD model is defined
    /// on this band's peak energy.
    pub lfn: (f32, f32),
    /// Ultrasonic band, reported but not risk-classified.
    pub ultrasonic: (f32, f32),
    /// Frequency ceiling for the rendered spectrogram image.
    pub display_max_hz: f32,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            lfn: (1.0, 100.0),
            ultrasonic: (20_000.0, 24_000.0),
            display_max_hz: 500.0,
        }
    }
}

/// VAD risk threshold ladder (dB). These encode a published risk model
/// that may be revised, so they live in config rather than in code.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ThresholdConfig {
    pub critical: f32,
    pub high: f32,
    pub moderate: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            critical: 90.0,
            high: 75.0,
            moderate: 60.0,
        }
    }
}

/// Output artifact locations, relative to the input directory.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    /// Subdirectory receiving one PNG per analyzed file.
    pub spectrogram_dir: String,
    /// CSV report filename, written into the input directory.
    pub report_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            spectrogram_dir: "spectrograms".to_string(),
            report_name: "lfn_analysis_results.csv".to_string(),
        }
    }
}

impl AppConfig {
    /// Load config from `~/.config/lfnscan/config.toml` (or an explicit
    /// override path). Returns default config if the file doesn't exist.
    /// Logs a warning if the file exists but can't be parsed.
    pub fn load(override_path: Option<&Path>) -> Self {
        let config_path = match override_path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::config_path(),
        };
        match config_path {
            Some(path) if path.exists() => match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<AppConfig>(&contents) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", path.display());
                        config
                    }
                    Err(e) => {
                        log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                        Self::default()
                    }
                },
                Err(e) => {
                    log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e);
                    Self::default()
                }
            },
            _ => {
                log::debug!("No config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Resolve worker count: 0 → auto-detect (cores / 2, min 1).
    pub fn resolve_workers(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            let cores = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(2);
            (cores / 2).max(1)
        }
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            timeout_secs: 300,
            stft: StftConfig::default(),
            bands: BandConfig::default(),
            thresholds: ThresholdConfig::default(),
            output: OutputConfig::default(),
        }
    }
}
