//! Configuration loading and typed config structures for the animation.
//!
//! The configuration lives in `solderfail-config.yaml`. Every field has a
//! default equal to the reference tuning, so an empty file (or no file at
//! all) reproduces the stock animation. The kinematic constants were tuned
//! by eye to match the narrative; they are not material properties.

use std::path::Path;

use serde::Deserialize;
use solderfail_types::{ModeParseError, SimulationMode};

/// Environment variable overriding the animation speed.
pub const SPEED_ENV: &str = "SOLDERFAIL_SPEED";

/// Environment variable replacing the scenario list with a single mode.
pub const MODE_ENV: &str = "SOLDERFAIL_MODE";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A scenario name in the configuration is unknown.
    #[error("invalid scenario: {source}")]
    Mode {
        /// The underlying parse error.
        #[from]
        source: ModeParseError,
    },

    /// A value is outside its permitted range.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level animation configuration.
///
/// Mirrors the structure of `solderfail-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Scenario selection and host pacing.
    #[serde(default)]
    pub animation: AnimationConfig,

    /// Rates, thresholds, and deferred delays of the phase machine.
    #[serde(default)]
    pub kinematics: KinematicsConfig,

    /// Advisory speed range offered to users.
    #[serde(default)]
    pub speed: SpeedBounds,

    /// Logging and presenter output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `SOLDERFAIL_SPEED` overrides `animation.speed`
    /// - `SOLDERFAIL_MODE` replaces `animation.modes` with a single entry
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// Unlike [`from_file`](Self::from_file) this does not consult the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SOLDERFAIL_SPEED` and `SOLDERFAIL_MODE` if they are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the speed is not a number, or
    /// [`ConfigError::Mode`] if the mode name is unknown.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var(SPEED_ENV) {
            self.animation.speed = raw.trim().parse().map_err(|_err| ConfigError::Invalid {
                reason: format!("{SPEED_ENV} is not a number: {raw}"),
            })?;
        }
        if let Ok(raw) = std::env::var(MODE_ENV) {
            let mode: SimulationMode = raw.parse()?;
            self.animation.modes = vec![mode.name().to_owned()];
        }
        Ok(())
    }

    /// Check every section for out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.animation.validate()?;
        self.kinematics.validate()?;
        self.speed.validate()
    }
}

/// Scenario selection and host pacing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimationConfig {
    /// Scenario names to run in order (`imc`, `cratering`,
    /// `pull_cratering`, `pull_zipper`).
    #[serde(default = "default_modes")]
    pub modes: Vec<String>,

    /// Initial speed multiplier.
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// Milliseconds per frame. The host sleeps this long between ticks and
    /// pending deferred transitions count down by this much per tick.
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u32,

    /// Safety bound on frames per run (0 = unlimited).
    #[serde(default = "default_max_frames")]
    pub max_frames: u64,

    /// Whether to show the static force-analysis view after the runs.
    #[serde(default)]
    pub show_analysis: bool,
}

impl AnimationConfig {
    /// Parse the configured scenario names into typed modes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Mode`] for the first unknown name.
    pub fn parsed_modes(&self) -> Result<Vec<SimulationMode>, ConfigError> {
        self.modes
            .iter()
            .map(|name| name.parse::<SimulationMode>().map_err(ConfigError::from))
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.modes.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "animation.modes must list at least one scenario".to_owned(),
            });
        }
        self.parsed_modes()?;
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(ConfigError::Invalid {
                reason: format!("animation.speed must be positive, got {}", self.speed),
            });
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                reason: "animation.frame_interval_ms must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            modes: default_modes(),
            speed: default_speed(),
            frame_interval_ms: default_frame_interval_ms(),
            max_frames: default_max_frames(),
            show_analysis: false,
        }
    }
}

/// Rates, thresholds, and deferred delays of the phase machine.
///
/// Rates are per tick at speed 1.0; every rate is scaled by the speed
/// multiplier, thresholds never are. Deferred delays are divided by the
/// speed multiplier in effect when the fracture occurs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KinematicsConfig {
    /// Bend fraction added per tick while loading.
    #[serde(default = "default_bend_rate")]
    pub bend_rate: f64,

    /// Bend fraction at which the joint fractures. Deliberately past the
    /// nominal maximum of 1.0 to dramatize the peak strain.
    #[serde(default = "default_fracture_bend_threshold")]
    pub fracture_bend_threshold: f64,

    /// Rebound time added per tick.
    #[serde(default = "default_rebound_freq")]
    pub rebound_freq: f64,

    /// Exponential decay constant of the rebound envelope.
    #[serde(default = "default_rebound_decay")]
    pub rebound_decay: f64,

    /// Angular frequency of the rebound oscillation.
    #[serde(default = "default_rebound_angular_freq")]
    pub rebound_angular_freq: f64,

    /// Rebound amplitude below which the board counts as settled.
    #[serde(default = "default_settle_amplitude")]
    pub settle_amplitude: f64,

    /// Rebound time that must pass before the board may settle.
    #[serde(default = "default_settle_min_elapsed")]
    pub settle_min_elapsed: f64,

    /// Pause between bend fracture and rebound, in milliseconds at 1x.
    #[serde(default = "default_bend_fracture_delay_ms")]
    pub bend_fracture_delay_ms: f64,

    /// Pull displacement added per tick.
    #[serde(default = "default_pull_rate")]
    pub pull_rate: f64,

    /// Pull displacement at which the joint fractures.
    #[serde(default = "default_fracture_pull_threshold")]
    pub fracture_pull_threshold: f64,

    /// Pull displacement past which the component has fully detached.
    #[serde(default = "default_detach_complete_threshold")]
    pub detach_complete_threshold: f64,

    /// Pause between pull fracture and detachment, in milliseconds at 1x.
    #[serde(default = "default_pull_fracture_delay_ms")]
    pub pull_fracture_delay_ms: f64,
}

impl KinematicsConfig {
    /// Reject non-positive rates or thresholds and inconsistent pull
    /// thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("bend_rate", self.bend_rate),
            ("fracture_bend_threshold", self.fracture_bend_threshold),
            ("rebound_freq", self.rebound_freq),
            ("rebound_decay", self.rebound_decay),
            ("rebound_angular_freq", self.rebound_angular_freq),
            ("settle_amplitude", self.settle_amplitude),
            ("pull_rate", self.pull_rate),
            ("fracture_pull_threshold", self.fracture_pull_threshold),
            ("detach_complete_threshold", self.detach_complete_threshold),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    reason: format!("kinematics.{name} must be positive, got {value}"),
                });
            }
        }

        let non_negative = [
            ("settle_min_elapsed", self.settle_min_elapsed),
            ("bend_fracture_delay_ms", self.bend_fracture_delay_ms),
            ("pull_fracture_delay_ms", self.pull_fracture_delay_ms),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid {
                    reason: format!("kinematics.{name} must not be negative, got {value}"),
                });
            }
        }

        if self.detach_complete_threshold <= self.fracture_pull_threshold {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "kinematics.detach_complete_threshold ({}) must exceed \
                     fracture_pull_threshold ({})",
                    self.detach_complete_threshold, self.fracture_pull_threshold
                ),
            });
        }
        Ok(())
    }
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            bend_rate: default_bend_rate(),
            fracture_bend_threshold: default_fracture_bend_threshold(),
            rebound_freq: default_rebound_freq(),
            rebound_decay: default_rebound_decay(),
            rebound_angular_freq: default_rebound_angular_freq(),
            settle_amplitude: default_settle_amplitude(),
            settle_min_elapsed: default_settle_min_elapsed(),
            bend_fracture_delay_ms: default_bend_fracture_delay_ms(),
            pull_rate: default_pull_rate(),
            fracture_pull_threshold: default_fracture_pull_threshold(),
            detach_complete_threshold: default_detach_complete_threshold(),
            pull_fracture_delay_ms: default_pull_fracture_delay_ms(),
        }
    }
}

/// Advisory speed range, matching the speed slider of the browser demo.
///
/// The clock itself accepts any positive multiplier; hosts that take free
/// user input pass it through [`clamp`](Self::clamp) first.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpeedBounds {
    /// Slowest offered multiplier.
    #[serde(default = "default_speed_min")]
    pub min: f64,

    /// Fastest offered multiplier.
    #[serde(default = "default_speed_max")]
    pub max: f64,
}

impl SpeedBounds {
    /// Clamp a requested multiplier into the offered range.
    pub fn clamp(&self, requested: f64) -> f64 {
        requested.clamp(self.min, self.max)
    }

    /// Whether the multiplier lies inside the offered range.
    pub fn contains(&self, multiplier: f64) -> bool {
        (self.min..=self.max).contains(&multiplier)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.min > 0.0) {
            return Err(ConfigError::Invalid {
                reason: format!("speed.min must be positive, got {}", self.min),
            });
        }
        if !(self.max.is_finite() && self.max >= self.min) {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "speed.max ({}) must be at least speed.min ({})",
                    self.max, self.min
                ),
            });
        }
        Ok(())
    }
}

impl Default for SpeedBounds {
    fn default() -> Self {
        Self {
            min: default_speed_min(),
            max: default_speed_max(),
        }
    }
}

/// Where snapshots go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenterOutput {
    /// Human-readable captions through the tracing log.
    #[default]
    Log,
    /// One JSON snapshot per line on stdout.
    Jsonl,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit log lines as JSON.
    #[serde(default)]
    pub json: bool,

    /// Presenter used for frame output.
    #[serde(default)]
    pub output: PresenterOutput,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            output: PresenterOutput::Log,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_modes() -> Vec<String> {
    vec![SimulationMode::default().name().to_owned()]
}

const fn default_speed() -> f64 {
    1.0
}

const fn default_frame_interval_ms() -> u32 {
    16
}

const fn default_max_frames() -> u64 {
    10_000
}

const fn default_bend_rate() -> f64 {
    0.15
}

const fn default_fracture_bend_threshold() -> f64 {
    1.2
}

const fn default_rebound_freq() -> f64 {
    0.3
}

const fn default_rebound_decay() -> f64 {
    0.1
}

const fn default_rebound_angular_freq() -> f64 {
    5.0
}

const fn default_settle_amplitude() -> f64 {
    0.01
}

const fn default_settle_min_elapsed() -> f64 {
    5.0
}

const fn default_bend_fracture_delay_ms() -> f64 {
    100.0
}

const fn default_pull_rate() -> f64 {
    0.5
}

const fn default_fracture_pull_threshold() -> f64 {
    20.0
}

const fn default_detach_complete_threshold() -> f64 {
    100.0
}

const fn default_pull_fracture_delay_ms() -> f64 {
    500.0
}

const fn default_speed_min() -> f64 {
    0.1
}

const fn default_speed_max() -> f64 {
    3.0
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use solderfail_types::{BendFracture, PullFracture};

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.kinematics.bend_rate, 0.15);
        assert_eq!(config.kinematics.fracture_bend_threshold, 1.2);
        assert_eq!(config.kinematics.fracture_pull_threshold, 20.0);
        assert_eq!(config.animation.frame_interval_ms, 16);
        assert_eq!(config.logging.output, PresenterOutput::Log);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
animation:
  modes: [imc, pull_zipper]
  speed: 2.5
  frame_interval_ms: 8
  max_frames: 500
  show_analysis: true

kinematics:
  bend_rate: 0.2
  fracture_pull_threshold: 25
  detach_complete_threshold: 120

speed:
  min: 0.5
  max: 2.0

logging:
  level: debug
  json: true
  output: jsonl
";
        let config = SimulationConfig::parse(yaml).unwrap();

        assert_eq!(
            config.animation.parsed_modes().unwrap(),
            vec![
                SimulationMode::Bend(BendFracture::Imc),
                SimulationMode::Pull(PullFracture::ZipperTear),
            ]
        );
        assert_eq!(config.animation.speed, 2.5);
        assert_eq!(config.animation.frame_interval_ms, 8);
        assert!(config.animation.show_analysis);
        assert_eq!(config.kinematics.bend_rate, 0.2);
        // Unlisted kinematics keep their defaults.
        assert_eq!(config.kinematics.rebound_freq, 0.3);
        assert_eq!(config.speed.max, 2.0);
        assert!(config.logging.json);
        assert_eq!(config.logging.output, PresenterOutput::Jsonl);
    }

    #[test]
    fn parse_empty_yaml() {
        let config = SimulationConfig::parse("").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn rejects_unknown_mode() {
        let result = SimulationConfig::parse("animation:\n  modes: [shear]\n");
        assert!(matches!(result, Err(ConfigError::Mode { .. })));
    }

    #[test]
    fn rejects_non_positive_speed() {
        let result = SimulationConfig::parse("animation:\n  speed: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_inverted_pull_thresholds() {
        let yaml = "kinematics:\n  fracture_pull_threshold: 150\n";
        let result = SimulationConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_zero_frame_interval() {
        let result = SimulationConfig::parse("animation:\n  frame_interval_ms: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn speed_bounds_clamp() {
        let bounds = SpeedBounds::default();
        assert_eq!(bounds.clamp(0.01), 0.1);
        assert_eq!(bounds.clamp(9.0), 3.0);
        assert_eq!(bounds.clamp(1.5), 1.5);
        assert!(bounds.contains(3.0));
        assert!(!bounds.contains(3.1));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("solderfail-config.yaml");
        if path.exists() {
            let contents = std::fs::read_to_string(&path).unwrap();
            let config = SimulationConfig::parse(&contents);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
