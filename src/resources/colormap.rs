//! Scalar to color mapping
//!
//! Turns a per-vertex scalar (cortical activity, a statistic...) into RGBA
//! colors. Values are normalized over a color limit, looked up in a piecewise
//! linear colormap, and optionally replaced by dedicated colors below `vmin`
//! or above `vmax`.

use crate::visual::{VisualError, VisualResult};
use glam::{Vec3, Vec4};

/// A piecewise linear colormap over `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    pub name: String,
    /// Evenly spaced color stops
    pub colors: Vec<Vec3>,
}

impl ColorMap {
    pub fn new(name: impl Into<String>, colors: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// One of the built-in maps: `viridis`, `gray`, `hot`, `coolwarm`
    pub fn by_name(name: &str) -> VisualResult<Self> {
        let colors = match name {
            "viridis" => vec![
                Vec3::new(0.267, 0.005, 0.329),
                Vec3::new(0.283, 0.141, 0.458),
                Vec3::new(0.254, 0.265, 0.530),
                Vec3::new(0.207, 0.372, 0.553),
                Vec3::new(0.164, 0.471, 0.558),
                Vec3::new(0.128, 0.567, 0.551),
                Vec3::new(0.135, 0.659, 0.518),
                Vec3::new(0.267, 0.749, 0.441),
                Vec3::new(0.478, 0.821, 0.318),
                Vec3::new(0.741, 0.873, 0.150),
                Vec3::new(0.993, 0.906, 0.144),
            ],
            "gray" | "grey" => vec![Vec3::ZERO, Vec3::ONE],
            "hot" => vec![
                Vec3::new(0.0416, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::ONE,
            ],
            "coolwarm" => vec![
                Vec3::new(0.230, 0.299, 0.754),
                Vec3::new(0.865, 0.865, 0.865),
                Vec3::new(0.706, 0.016, 0.150),
            ],
            _ => {
                return Err(VisualError::InvalidArgument(format!(
                    "unknown colormap {:?}",
                    name
                )))
            }
        };
        Ok(Self::new(name, colors))
    }

    /// Sample at `t`, clamped to `[0, 1]`
    pub fn sample(&self, t: f32) -> Vec3 {
        match self.colors.len() {
            0 => Vec3::ZERO,
            1 => self.colors[0],
            n => {
                let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
                let scaled = t * (n - 1) as f32;
                let i = (scaled.floor() as usize).min(n - 2);
                let frac = scaled - i as f32;
                self.colors[i].lerp(self.colors[i + 1], frac)
            }
        }
    }
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::new("gray", vec![Vec3::ZERO, Vec3::ONE])
    }
}

/// Colormap plus the limits it is applied with
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScalarColormap {
    pub colormap: ColorMap,
    /// Normalization range, the data range when `None`
    pub clim: Option<(f32, f32)>,
    /// Values below the bound get the color instead of a colormap sample
    pub under: Option<(f32, Vec4)>,
    /// Values above the bound get the color instead of a colormap sample
    pub over: Option<(f32, Vec4)>,
}

impl ScalarColormap {
    pub fn new(colormap: ColorMap) -> Self {
        Self {
            colormap,
            ..Default::default()
        }
    }

    pub fn with_clim(mut self, low: f32, high: f32) -> Self {
        self.clim = Some((low, high));
        self
    }

    pub fn with_under(mut self, vmin: f32, color: Vec4) -> Self {
        self.under = Some((vmin, color));
        self
    }

    pub fn with_over(mut self, vmax: f32, color: Vec4) -> Self {
        self.over = Some((vmax, color));
        self
    }

    fn limits(&self, data: &[f32]) -> VisualResult<(f32, f32)> {
        if let Some((low, high)) = self.clim {
            if !low.is_finite() || !high.is_finite() || low > high {
                return Err(VisualError::InvalidArgument(format!(
                    "invalid color limits ({}, {})",
                    low, high
                )));
            }
            return Ok((low, high));
        }

        let finite = data.iter().copied().filter(|v| v.is_finite());
        let (low, high) = finite.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if low > high {
            // No finite value at all
            Ok((0.0, 1.0))
        } else {
            Ok((low, high))
        }
    }

    /// Map every value to an opaque RGBA color
    pub fn apply(&self, data: &[f32]) -> VisualResult<Vec<Vec4>> {
        let (low, high) = self.limits(data)?;
        let span = high - low;

        Ok(data
            .iter()
            .map(|&value| {
                if let Some((vmin, color)) = self.under {
                    if value < vmin {
                        return color;
                    }
                }
                if let Some((vmax, color)) = self.over {
                    if value > vmax {
                        return color;
                    }
                }
                let t = if span > 0.0 { (value - low) / span } else { 0.0 };
                self.colormap.sample(t).extend(1.0)
            })
            .collect())
    }
}
