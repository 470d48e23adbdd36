//! Color decoding and index-based color interpolation.

use glam::Vec3;

/// Decode a `0xRRGGBB` color into linear RGB.
pub fn hex_to_linear(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec3::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
}

fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

/// Ordered list of color stops sampled by a ratio in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    stops: Vec<Vec3>,
}

impl ColorRamp {
    /// Build a ramp from hex colors. Returns `None` for fewer than two stops,
    /// in which case particles keep the material's base color.
    pub fn from_hex(colors: &[u32]) -> Option<Self> {
        if colors.len() < 2 {
            return None;
        }
        Some(Self {
            stops: colors.iter().map(|&c| hex_to_linear(c)).collect(),
        })
    }

    /// Color at `ratio`, clamped to the ramp, linearly blended between the
    /// two neighbouring stops.
    pub fn color_at(&self, ratio: f32) -> Vec3 {
        let last = self.stops.len() - 1;
        let scaled = ratio.clamp(0.0, 1.0) * last as f32;
        let idx = scaled.floor() as usize;
        if idx >= last {
            return self.stops[last];
        }
        let alpha = scaled - idx as f32;
        self.stops[idx].lerp(self.stops[idx + 1], alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_decoding_endpoints() {
        assert_eq!(hex_to_linear(0x000000), Vec3::ZERO);
        let white = hex_to_linear(0xffffff);
        assert!((white - Vec3::ONE).abs().max_element() < 1e-5);
        let red = hex_to_linear(0xff0000);
        assert!((red.x - 1.0).abs() < 1e-5);
        assert_eq!(red.y, 0.0);
    }

    #[test]
    fn test_srgb_midpoint_is_darker_in_linear() {
        let mid = hex_to_linear(0x808080);
        assert!(mid.x > 0.2 && mid.x < 0.23);
    }

    #[test]
    fn test_single_color_has_no_ramp() {
        assert!(ColorRamp::from_hex(&[0xff0000]).is_none());
        assert!(ColorRamp::from_hex(&[]).is_none());
    }

    #[test]
    fn test_ramp_interpolates_between_stops() {
        let ramp = ColorRamp::from_hex(&[0x000000, 0xffffff]).unwrap();
        assert_eq!(ramp.color_at(0.0), Vec3::ZERO);
        let half = ramp.color_at(0.5);
        assert!((half.x - 0.5).abs() < 1e-4);
        assert!((ramp.color_at(1.0).x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ramp_clamps_ratio() {
        let ramp = ColorRamp::from_hex(&[0xff0000, 0x0000ff, 0x00ff00]).unwrap();
        assert_eq!(ramp.color_at(-3.0), ramp.color_at(0.0));
        assert_eq!(ramp.color_at(7.0), ramp.color_at(1.0));
        assert!((ramp.color_at(0.5).z - 1.0).abs() < 1e-5);
    }
}
