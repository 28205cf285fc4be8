//! Configuration management for facegate
//!
//! Camera selection, capture settings and the verification endpoint. Read
//! from a TOML file, optionally overlaid with `FACEGATE__*` environment
//! variables. The lighting and face-size thresholds are fixed and have no
//! configuration entries.

use crate::errors::{FaceCaptureError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceGateConfig {
    pub camera: CameraConfig,
    pub capture: CaptureConfig,
    pub verification: VerificationConfig,
    pub detector: DetectorConfig,
}

/// Camera-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device index of the front-facing camera
    pub device_index: u32,
    /// Requested resolution [width, height]
    pub requested_resolution: [u32; 2],
    /// Requested frames per second
    pub fps: u32,
}

/// Capture pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Width of the raster the detector sees; height follows the camera aspect
    pub target_width: u32,
    /// Upper bound on the detection call in milliseconds. Unset means no limit.
    pub timeout_ms: Option<u64>,
}

/// Remote verification configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Face-login endpoint URL
    pub endpoint: String,
    /// HTTP request timeout in milliseconds. Unset means the client default.
    pub request_timeout_ms: Option<u64>,
}

/// External face detector program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Path of the detector helper program
    pub program: String,
    /// Extra arguments passed before the frame is piped in
    pub args: Vec<String>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            requested_resolution: [640, 480],
            fps: 30,
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            target_width: crate::raster::DEFAULT_TARGET_WIDTH,
            timeout_ms: None,
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/api/auth/face-login".to_string(),
            request_timeout_ms: None,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            program: "facegate-detector".to_string(),
            args: Vec::new(),
        }
    }
}

impl Default for FaceGateConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            capture: CaptureConfig::default(),
            verification: VerificationConfig::default(),
            detector: DetectorConfig::default(),
        }
    }
}

impl FaceGateConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| FaceCaptureError::Config(format!("Failed to read config file: {}", e)))?;

        let config: FaceGateConfig = toml::from_str(&contents)
            .map_err(|e| FaceCaptureError::Config(format!("Failed to parse config file: {}", e)))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load the file (if present) with `FACEGATE__SECTION__KEY` environment overrides on top.
    pub fn load_layered<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml).required(false))
            .add_source(
                config::Environment::with_prefix("FACEGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: FaceGateConfig = settings.try_deserialize()?;
        config.validate()?;
        log::debug!("Layered configuration resolved from {:?} and environment", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    FaceCaptureError::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| FaceCaptureError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| FaceCaptureError::Config(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("facegate.toml")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(FaceCaptureError::Config(msg.to_string()));

        if self.camera.requested_resolution[0] == 0 || self.camera.requested_resolution[1] == 0 {
            return invalid("Invalid requested resolution");
        }
        if self.camera.fps == 0 || self.camera.fps > 240 {
            return invalid("Invalid FPS (must be 1-240)");
        }

        if !(16..=4096).contains(&self.capture.target_width) {
            return invalid("Capture target width must be between 16 and 4096");
        }
        if self.capture.timeout_ms == Some(0) {
            return invalid("Capture timeout must be greater than zero when set");
        }

        if reqwest::Url::parse(&self.verification.endpoint).is_err() {
            return invalid("Verification endpoint is not a valid URL");
        }
        if self.verification.request_timeout_ms == Some(0) {
            return invalid("Request timeout must be greater than zero when set");
        }

        if self.detector.program.trim().is_empty() {
            return invalid("Detector program must not be empty");
        }

        Ok(())
    }
}
