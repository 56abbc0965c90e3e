//! LED colors and ring fill patterns

use serde::{Deserialize, Serialize};

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    /// Hue of the idle breathing animation.
    pub const IDLE_CYAN: Rgb = Rgb::new(0, 150, 150);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by `factor`, clamped to [0, 1], truncating.
    pub fn scaled(self, factor: f32) -> Self {
        let factor = if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 0.0 };
        let scale = |channel: u8| (channel as f32 * factor) as u8;
        Self { r: scale(self.r), g: scale(self.g), b: scale(self.b) }
    }

    pub fn is_off(&self) -> bool {
        *self == Rgb::BLACK
    }
}

/// Which ring positions a color applies to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RingFill {
    /// Every position shows the color
    Uniform,
    /// Level bar: the first `floor(pixels * level)` positions are lit, the rest off
    Bar { level: f32 },
}

impl RingFill {
    /// Number of lit positions on a ring of `pixel_count` pixels.
    pub fn lit_pixels(&self, pixel_count: usize) -> usize {
        match self {
            RingFill::Uniform => pixel_count,
            RingFill::Bar { level } => {
                let level = if level.is_finite() { level.clamp(0.0, 1.0) } else { 0.0 };
                ((pixel_count as f32 * level) as usize).min(pixel_count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_truncates_channels() {
        assert_eq!(Rgb::RED.scaled(0.5), Rgb::new(127, 0, 0));
        assert_eq!(Rgb::GREEN.scaled(0.0), Rgb::BLACK);
        assert_eq!(Rgb::YELLOW.scaled(2.0), Rgb::YELLOW);
        assert_eq!(Rgb::IDLE_CYAN.scaled(f32::NAN), Rgb::BLACK);
    }

    #[test]
    fn bar_lights_floor_of_level() {
        assert_eq!(RingFill::Bar { level: 0.5 }.lit_pixels(24), 12);
        assert_eq!(RingFill::Bar { level: 0.99 }.lit_pixels(24), 23);
        assert_eq!(RingFill::Bar { level: 1.0 }.lit_pixels(24), 24);
        assert_eq!(RingFill::Bar { level: -3.0 }.lit_pixels(24), 0);
        assert_eq!(RingFill::Uniform.lit_pixels(24), 24);
    }
}
