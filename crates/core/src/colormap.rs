use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    fn from_rgb8(rgb: [u8; 3]) -> Self {
        Self::new(
            rgb[0] as f32 / 255.0,
            rgb[1] as f32 / 255.0,
            rgb[2] as f32 / 255.0,
            1.0,
        )
    }

    /// Scale the colour channels up by `factor` (1.3 = 30% lighter).
    pub fn lighter(self, factor: f32) -> Self {
        Self {
            r: (self.r * factor).min(1.0),
            g: (self.g * factor).min(1.0),
            b: (self.b * factor).min(1.0),
            a: self.a,
        }
    }

    /// Scale the colour channels down by `factor` (2.0 = half as bright).
    pub fn darker(self, factor: f32) -> Self {
        let factor = factor.max(f32::EPSILON);
        Self {
            r: self.r / factor,
            g: self.g / factor,
            b: self.b / factor,
            a: self.a,
        }
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    fn lerp(self, other: Rgba, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }
}

pub trait ColorMap {
    fn map(&self, values: &[f64]) -> Vec<Rgba>;
}

/// ColorBrewer RdBu, 11 classes, red for low values through blue for high.
const RD_BU: [[u8; 3]; 11] = [
    [0x67, 0x00, 0x1f],
    [0xb2, 0x18, 0x2b],
    [0xd6, 0x60, 0x4d],
    [0xf4, 0xa5, 0x82],
    [0xfd, 0xdb, 0xc7],
    [0xf7, 0xf7, 0xf7],
    [0xd1, 0xe5, 0xf0],
    [0x92, 0xc5, 0xde],
    [0x43, 0x93, 0xc3],
    [0x21, 0x66, 0xac],
    [0x05, 0x30, 0x61],
];

/// Maps `[low, high]` onto a diverging palette. Values outside the range are
/// clamped; NaN maps to the neutral midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Diverging {
    pub low: f64,
    pub high: f64,
}

impl Default for Diverging {
    fn default() -> Self {
        Self {
            low: -0.1,
            high: 0.1,
        }
    }
}

impl Diverging {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn color(&self, value: f64) -> Rgba {
        let span = self.high - self.low;
        let t = if value.is_nan() || span <= 0.0 {
            0.5
        } else {
            ((value - self.low) / span).clamp(0.0, 1.0)
        };
        let pos = t * (RD_BU.len() - 1) as f64;
        let i = (pos.floor() as usize).min(RD_BU.len() - 2);
        let frac = (pos - i as f64) as f32;
        Rgba::from_rgb8(RD_BU[i]).lerp(Rgba::from_rgb8(RD_BU[i + 1]), frac)
    }
}

impl ColorMap for Diverging {
    fn map(&self, values: &[f64]) -> Vec<Rgba> {
        values.iter().map(|&v| self.color(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_ends_hit_palette_ends() {
        let cm = Diverging::default();
        assert_eq!(cm.color(-0.1).to_rgba8(), [0x67, 0x00, 0x1f, 255]);
        assert_eq!(cm.color(0.1).to_rgba8(), [0x05, 0x30, 0x61, 255]);
        assert_eq!(cm.color(5.0), cm.color(0.1));
        assert_eq!(cm.color(-5.0), cm.color(-0.1));
    }

    #[test]
    fn midpoint_and_nan_are_neutral() {
        let cm = Diverging::default();
        assert_eq!(cm.color(0.0).to_rgba8(), [0xf7, 0xf7, 0xf7, 255]);
        assert_eq!(cm.color(f64::NAN), cm.color(0.0));
        assert_eq!(Diverging::new(1.0, 1.0).color(3.0), cm.color(0.0));
    }

    #[test]
    fn map_keeps_order() {
        let cm = Diverging::default();
        let colors = cm.map(&[-0.1, 0.0, 0.1]);
        assert_eq!(colors.len(), 3);
        assert!(colors[0].r > colors[2].r);
        assert!(colors[2].b > colors[0].b);
    }

    #[test]
    fn lighter_and_darker_clamp() {
        let c = Rgba::new(0.5, 0.9, 0.2, 1.0);
        assert_eq!(c.lighter(2.0), Rgba::new(1.0, 1.0, 0.4, 1.0));
        assert_eq!(c.darker(2.0), Rgba::new(0.25, 0.45, 0.1, 1.0));
    }
}
