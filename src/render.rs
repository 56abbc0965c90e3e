//! Rendering seam between the gauge and the LED ring / display hardware.
//!
//! The gauge only ever expresses *intent* through [`GaugeRenderer`]; pushing
//! pixels to a NeoPixel strip or blitting a bitmap onto an OLED is the job
//! of whatever implements the trait.

use tracing::{debug, trace};

use crate::types::{GlyphKey, RingFill, Rgb};

/// Output capability the gauge drives.
pub trait GaugeRenderer {
    /// Show `color` scaled by `brightness` on the positions selected by `fill`.
    fn set_ring(&mut self, fill: RingFill, color: Rgb, brightness: f32);

    /// Draw the glyph for `glyph`, scaled to fill the display.
    fn render_glyph(&mut self, glyph: &GlyphKey);

    /// Blank the display.
    fn clear_display(&mut self);

    /// Switch every ring position off.
    fn clear_ring(&mut self) {
        self.set_ring(RingFill::Uniform, Rgb::BLACK, 0.0);
    }
}

/// In-memory LED ring frame buffer.
///
/// Applies a [`RingFill`] the way the physical ring shows it: lit positions
/// get the brightness-scaled color, the remaining positions go dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelRing {
    pixels: Vec<Rgb>,
}

impl PixelRing {
    pub fn new(pixel_count: usize) -> Self {
        Self { pixels: vec![Rgb::BLACK; pixel_count] }
    }

    pub fn apply(&mut self, fill: RingFill, color: Rgb, brightness: f32) {
        let lit = fill.lit_pixels(self.pixels.len());
        let scaled = color.scaled(brightness);
        for (index, pixel) in self.pixels.iter_mut().enumerate() {
            *pixel = if index < lit { scaled } else { Rgb::BLACK };
        }
    }

    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|pixel| !pixel.is_off()).count()
    }
}

/// Renderer that keeps a [`PixelRing`] and reports frames through `tracing`.
///
/// Used when no LED or display hardware is attached.
#[derive(Debug, Clone)]
pub struct TracingRenderer {
    ring: PixelRing,
    glyph: Option<GlyphKey>,
}

impl TracingRenderer {
    pub fn new(pixel_count: usize) -> Self {
        Self { ring: PixelRing::new(pixel_count), glyph: None }
    }

    pub fn ring(&self) -> &PixelRing {
        &self.ring
    }

    pub fn glyph(&self) -> Option<&GlyphKey> {
        self.glyph.as_ref()
    }
}

impl GaugeRenderer for TracingRenderer {
    fn set_ring(&mut self, fill: RingFill, color: Rgb, brightness: f32) {
        self.ring.apply(fill, color, brightness);
        trace!(
            lit = self.ring.lit_count(),
            r = color.r,
            g = color.g,
            b = color.b,
            brightness,
            "Ring frame"
        );
    }

    fn render_glyph(&mut self, glyph: &GlyphKey) {
        debug!(glyph = %glyph, "Display glyph");
        self.glyph = Some(glyph.clone());
    }

    fn clear_display(&mut self) {
        debug!("Display cleared");
        self.glyph = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fill_lights_prefix_only() {
        let mut ring = PixelRing::new(24);
        ring.apply(RingFill::Bar { level: 0.5 }, Rgb::GREEN, 1.0);

        assert_eq!(ring.lit_count(), 12);
        assert_eq!(ring.pixels()[11], Rgb::GREEN);
        assert_eq!(ring.pixels()[12], Rgb::BLACK);
    }

    #[test]
    fn brightness_scales_lit_pixels() {
        let mut ring = PixelRing::new(4);
        ring.apply(RingFill::Uniform, Rgb::RED, 0.3);
        assert!(ring.pixels().iter().all(|pixel| *pixel == Rgb::new(76, 0, 0)));
    }

    #[test]
    fn clear_ring_turns_everything_off() {
        let mut renderer = TracingRenderer::new(8);
        renderer.set_ring(RingFill::Uniform, Rgb::YELLOW, 1.0);
        assert_eq!(renderer.ring().lit_count(), 8);

        renderer.clear_ring();
        assert_eq!(renderer.ring().lit_count(), 0);
    }

    #[test]
    fn glyph_is_tracked_until_cleared() {
        let mut renderer = TracingRenderer::new(8);
        renderer.render_glyph(&GlyphKey::new("N"));
        assert_eq!(renderer.glyph().map(GlyphKey::as_str), Some("N"));
        renderer.clear_display();
        assert!(renderer.glyph().is_none());
    }
}
