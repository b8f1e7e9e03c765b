//! Solve configuration.
//!
//! Everything a pipeline needs beyond its pixel inputs lives here; the core
//! never reads ambient or global settings.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::error::{Error, Result};

/// Which pixels become unknowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainVariant {
    /// Only the pixels selected by a mask.
    #[default]
    Masked,
    /// Every pixel of the grid.
    FullGrid,
}

/// How unknowns are split into constrained and stencil rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryRule {
    /// Image-edge pixels and pixels with a 4-neighbour outside the domain are
    /// Dirichlet rows; everything else gets the 5-point Laplacian.
    #[default]
    MaskEdge,
    /// The four image corners are Dirichlet rows, the remaining edge pixels use
    /// the 1-D second difference along their edge, the interior the 5-point
    /// Laplacian. Requires a full-grid domain.
    GridEdge,
}

/// Where reconstruction takes its four corner constraints from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerSource {
    /// Read the corners from the known image.
    #[default]
    Auto,
    /// Top-left, top-right, bottom-left, bottom-right.
    Fixed([f64; 4]),
}

/// Whether independent channels are solved one after another or fanned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelFanOut {
    #[default]
    Sequential,
    /// One rayon task per channel, sharing the factorised operator.
    Parallel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub domain: DomainVariant,
    pub boundary: BoundaryRule,
    pub corners: CornerSource,
    /// Number of colour planes the inputs carry.
    pub channels: usize,
    pub fan_out: ChannelFanOut,
    /// Reject solves whose residual exceeds this value. `None` only reports it.
    pub max_residual: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::blending(3)
    }
}

impl Config {
    /// Masked-domain seamless cloning over `channels` planes.
    pub fn blending(channels: usize) -> Self {
        Self {
            domain: DomainVariant::Masked,
            boundary: BoundaryRule::MaskEdge,
            corners: CornerSource::Auto,
            channels,
            fan_out: ChannelFanOut::Sequential,
            max_residual: None,
        }
    }

    /// Full-grid grayscale reconstruction with corners taken from the image.
    pub fn reconstruction() -> Self {
        Self {
            domain: DomainVariant::FullGrid,
            boundary: BoundaryRule::GridEdge,
            corners: CornerSource::Auto,
            channels: 1,
            fan_out: ChannelFanOut::Sequential,
            max_residual: None,
        }
    }

    pub fn with_corners(mut self, corners: CornerSource) -> Self {
        self.corners = corners;
        self
    }

    pub fn with_fan_out(mut self, fan_out: ChannelFanOut) -> Self {
        self.fan_out = fan_out;
        self
    }

    pub fn with_max_residual(mut self, max_residual: f64) -> Self {
        self.max_residual = Some(max_residual);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(Error::InvalidConfig("channels must be at least 1".into()));
        }
        if self.domain == DomainVariant::Masked && self.boundary == BoundaryRule::GridEdge {
            return Err(Error::InvalidConfig(
                "grid-edge boundary rule requires a full-grid domain".into(),
            ));
        }
        if let CornerSource::Fixed(values) = self.corners {
            if values.iter().any(|v| !v.is_finite()) {
                return Err(Error::InvalidConfig("corner values must be finite".into()));
            }
        }
        if let Some(threshold) = self.max_residual {
            if threshold.is_nan() || threshold < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "max_residual must be non-negative, got {threshold}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert!(Config::blending(3).validate().is_ok());
        assert!(Config::reconstruction().validate().is_ok());
        assert_eq!(Config::default(), Config::blending(3));
    }

    #[test]
    fn test_builder_setters() {
        let config = Config::reconstruction()
            .with_corners(CornerSource::Fixed([128.0; 4]))
            .with_fan_out(ChannelFanOut::Parallel)
            .with_max_residual(1e-6);
        assert_eq!(config.corners, CornerSource::Fixed([128.0; 4]));
        assert_eq!(config.fan_out, ChannelFanOut::Parallel);
        assert_eq!(config.max_residual, Some(1e-6));
    }

    #[test]
    fn test_rejects_zero_channels() {
        let err = Config::blending(0).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_grid_edge_on_masked_domain() {
        let config = Config {
            boundary: BoundaryRule::GridEdge,
            ..Config::blending(1)
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_thresholds_and_corners() {
        let config = Config::reconstruction().with_max_residual(-1.0);
        assert!(config.validate().is_err());

        let config = Config::reconstruction().with_max_residual(f64::NAN);
        assert!(config.validate().is_err());

        let config =
            Config::reconstruction().with_corners(CornerSource::Fixed([0.0, f64::NAN, 0.0, 0.0]));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_config_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "domain": "full_grid", "boundary": "grid_edge", "channels": 1,
                 "corners": { "fixed": [128.0, 128.0, 128.0, 128.0] } }"#,
        )
        .unwrap();
        assert_eq!(config.domain, DomainVariant::FullGrid);
        assert_eq!(config.boundary, BoundaryRule::GridEdge);
        assert_eq!(config.corners, CornerSource::Fixed([128.0; 4]));
        assert_eq!(config.fan_out, ChannelFanOut::Sequential);
        assert_eq!(config.max_residual, None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(DomainVariant::FullGrid.to_string(), "FullGrid");
        assert_eq!(BoundaryRule::MaskEdge.to_string(), "MaskEdge");
    }
}
