//! Export configuration
//!
//! [`ExportConfig`] enumerates every option an export understands. It can be
//! built in code, parsed from keyword pairs, or loaded from a `.toml` or
//! `.json` file. Unknown keys are rejected in all three cases.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use fabkit_core::{ConfigError, ConfigResult, ExportError, ExportResult, OutputKind};
use serde::{Deserialize, Serialize};

use crate::source::ExportSource;

/// How the vector outline driver sizes its stroke width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrokeScaling {
    /// One width for every shape: 1% of the larger design extent
    #[default]
    Design,
    /// Each shape's width is 1% of its own flattened region
    PerShape,
}

impl StrokeScaling {
    /// Fraction of the reference extent used as stroke width
    pub const FRACTION: f64 = 0.01;
}

impl fmt::Display for StrokeScaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrokeScaling::Design => write!(f, "design"),
            StrokeScaling::PerShape => write!(f, "per_shape"),
        }
    }
}

impl FromStr for StrokeScaling {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "design" => Ok(StrokeScaling::Design),
            "per_shape" | "per-shape" | "shape" => Ok(StrokeScaling::PerShape),
            other => Err(ConfigError::InvalidValue {
                option: "stroke_scaling".to_string(),
                reason: format!("expected 'design' or 'per_shape', got '{}'", other),
            }),
        }
    }
}

/// Validated options for one export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Samples per millimetre
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<f64>,
    /// Render the combined shape as one height map instead of colored tiles
    pub make_heightmap: bool,
    /// Use the half-resolution triangulation (ignores the hard token)
    pub use_fast_triangulation: bool,
    /// Include per-node value arrays in graph dumps
    pub dot_arrays: bool,
    /// Stroke width rule for vector outlines
    pub stroke_scaling: StrokeScaling,
    /// Field render rotation about z, degrees
    pub alpha: f64,
    /// Field render rotation about x, degrees
    pub beta: f64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            resolution: None,
            make_heightmap: false,
            use_fast_triangulation: false,
            dot_arrays: false,
            stroke_scaling: StrokeScaling::Design,
            alpha: 0.0,
            beta: 0.0,
        }
    }
}

impl ExportConfig {
    /// Option names accepted by [`ExportConfig::from_options`]
    pub const OPTIONS: &'static [&'static str] = &[
        "resolution",
        "make_heightmap",
        "use_fast_triangulation",
        "dot_arrays",
        "stroke_scaling",
        "alpha",
        "beta",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = Some(resolution);
        self
    }

    pub fn with_heightmap(mut self, enabled: bool) -> Self {
        self.make_heightmap = enabled;
        self
    }

    pub fn with_fast_triangulation(mut self, enabled: bool) -> Self {
        self.use_fast_triangulation = enabled;
        self
    }

    pub fn with_dot_arrays(mut self, enabled: bool) -> Self {
        self.dot_arrays = enabled;
        self
    }

    pub fn with_stroke_scaling(mut self, scaling: StrokeScaling) -> Self {
        self.stroke_scaling = scaling;
        self
    }

    pub fn with_view(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    /// Build from keyword pairs such as `("resolution", "10")`
    pub fn from_options<I, K, V>(options: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (key, value) in options {
            config.set_option(key.as_ref(), value.as_ref())?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Set one option from its string form
    pub fn set_option(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        match key {
            "resolution" => self.resolution = Some(parse_number(key, value)?),
            "make_heightmap" => self.make_heightmap = parse_flag(key, value)?,
            "use_fast_triangulation" => self.use_fast_triangulation = parse_flag(key, value)?,
            "dot_arrays" => self.dot_arrays = parse_flag(key, value)?,
            "stroke_scaling" => self.stroke_scaling = value.parse()?,
            "alpha" => self.alpha = parse_number(key, value)?,
            "beta" => self.beta = parse_number(key, value)?,
            _ => return Err(ConfigError::UnknownOption(key.to_string())),
        }
        Ok(())
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config file: {}", e)))?;

        let config: Self = if has_extension(path, "json") {
            serde_json::from_str(&content)
                .map_err(|e| ConfigError::Parse(format!("Invalid JSON config: {}", e)))?
        } else if has_extension(path, "toml") {
            toml::from_str(&content)
                .map_err(|e| ConfigError::Parse(format!("Invalid TOML config: {}", e)))?
        } else {
            return Err(ConfigError::UnsupportedFormat(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;

        let content = if has_extension(path, "json") {
            serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?
        } else if has_extension(path, "toml") {
            toml::to_string_pretty(self)
                .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?
        } else {
            return Err(ConfigError::UnsupportedFormat(
                "Config file must be .json or .toml".to_string(),
            ));
        };

        std::fs::write(path, content)
            .map_err(|e| ConfigError::Parse(format!("Failed to write config file: {}", e)))
    }

    /// Checks that hold for every output kind
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(resolution) = self.resolution {
            if !(resolution.is_finite() && resolution > 0.0) {
                return Err(ConfigError::OutOfRange {
                    option: "resolution".to_string(),
                    value: resolution.to_string(),
                    reason: "must be finite and > 0".to_string(),
                });
            }
        }
        for (option, angle) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !angle.is_finite() {
                return Err(ConfigError::OutOfRange {
                    option: option.to_string(),
                    value: angle.to_string(),
                    reason: "must be finite".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Checks for one output kind and source, run before any worker starts
    pub fn validate_for(&self, kind: OutputKind, source: &ExportSource) -> ConfigResult<()> {
        self.validate()?;

        let needs_resolution = match source {
            ExportSource::Design(design) => {
                if design.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        option: "design".to_string(),
                        reason: "design has no shapes".to_string(),
                    });
                }
                let border = design.border();
                if !(border.is_finite() && border >= 0.0) {
                    return Err(ConfigError::OutOfRange {
                        option: "border".to_string(),
                        value: border.to_string(),
                        reason: "must be finite and >= 0".to_string(),
                    });
                }
                let units = design.units();
                if !units.is_valid() {
                    return Err(ConfigError::OutOfRange {
                        option: "units".to_string(),
                        value: units.mm_per_unit().to_string(),
                        reason: "mm per unit must be finite and > 0".to_string(),
                    });
                }
                kind != OutputKind::GraphDump
            }
            ExportSource::Field(_) => kind == OutputKind::RasterImage,
        };

        if needs_resolution && self.resolution.is_none() {
            return Err(ConfigError::MissingOption("resolution".to_string()));
        }
        Ok(())
    }

    /// The resolution, for drivers that were validated to need it
    pub fn require_resolution(&self) -> ExportResult<f64> {
        self.resolution
            .ok_or_else(|| ExportError::from(ConfigError::MissingOption("resolution".to_string())))
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

fn parse_number(option: &str, value: &str) -> ConfigResult<f64> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        option: option.to_string(),
        reason: format!("'{}' is not a number", value),
    })
}

fn parse_flag(option: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            option: option.to_string(),
            reason: format!("'{}' is not a boolean", value),
        }),
    }
}
