//! Color-by-level bands and their default breakpoints.
//!
//! The ring shows one flat, fully saturated color chosen by the current
//! level: green below the green breakpoint, yellow up to the yellow
//! breakpoint, red above. Breakpoint ordering is checked at compile time for
//! the defaults and by `GaugeConfig::validate` for user values.

use serde::{Deserialize, Serialize};

use crate::types::Rgb;

/// Default upper bound of the green band.
pub const DEFAULT_GREEN_BREAKPOINT: f32 = 0.5;

/// Default upper bound of the yellow band.
pub const DEFAULT_YELLOW_BREAKPOINT: f32 = 0.8;

/// Default level at which the ring starts flashing.
pub const DEFAULT_REDLINE_FLASH_ABOVE: f32 = 0.95;

const _: () = assert!(DEFAULT_GREEN_BREAKPOINT < DEFAULT_YELLOW_BREAKPOINT);
const _: () = assert!(DEFAULT_YELLOW_BREAKPOINT < DEFAULT_REDLINE_FLASH_ABOVE);
const _: () = assert!(DEFAULT_REDLINE_FLASH_ABOVE <= 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColorBand {
    Green,
    Yellow,
    Red,
}

impl ColorBand {
    /// Band for `level` given the two breakpoints.
    pub fn select(level: f32, green_breakpoint: f32, yellow_breakpoint: f32) -> Self {
        if level < green_breakpoint {
            ColorBand::Green
        } else if level < yellow_breakpoint {
            ColorBand::Yellow
        } else {
            ColorBand::Red
        }
    }

    pub const fn color(&self) -> Rgb {
        match self {
            ColorBand::Green => Rgb::GREEN,
            ColorBand::Yellow => Rgb::YELLOW,
            ColorBand::Red => Rgb::RED,
        }
    }
}
