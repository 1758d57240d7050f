use crate::core::color::interpolate_hcl;
use crate::domain::model::{Color, FinanceRecord, ScaleDomain};
use serde::{Deserialize, Serialize};

/// Three color stops of a diverging scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub high: Color,
    pub mid: Color,
    pub low: Color,
}

impl Palette {
    pub const RED: Color = Color::new(0xd7, 0x30, 0x27);
    pub const AMBER: Color = Color::new(0xfe, 0xe0, 0x8b);
    pub const GREEN: Color = Color::new(0x1a, 0x98, 0x50);
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            high: Self::RED,
            mid: Self::AMBER,
            low: Self::GREEN,
        }
    }
}

/// Maps a signed delta onto `high <- mid -> low`, blended in LCh.
///
/// The domain always contains zero: `max` is floored at 0 and `min` capped at
/// 0, so a year with only positive deltas still has its midpoint at zero. An
/// empty year yields `max == min == 0` and every value renders `mid`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivergingColorScale {
    max: f64,
    min: f64,
    palette: Palette,
}

impl DivergingColorScale {
    pub fn build(records: &[FinanceRecord]) -> Self {
        Self::with_palette(records, Palette::default())
    }

    pub fn with_palette(records: &[FinanceRecord], palette: Palette) -> Self {
        let deltas = records.iter().map(|r| r.delta).filter(|d| d.is_finite());
        let (max, min) = deltas.fold((0.0_f64, 0.0_f64), |(max, min), d| {
            (max.max(d), min.min(d))
        });
        Self { max, min, palette }
    }

    pub fn domain(&self) -> ScaleDomain {
        ScaleDomain {
            max: self.max,
            zero: 0.0,
            min: self.min,
        }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Color for `value`. Values beyond the domain clamp to its ends; NaN is neutral.
    pub fn color(&self, value: f64) -> Color {
        if value > 0.0 && self.max > 0.0 {
            interpolate_hcl(self.palette.mid, self.palette.high, value / self.max)
        } else if value < 0.0 && self.min < 0.0 {
            interpolate_hcl(self.palette.mid, self.palette.low, value / self.min)
        } else {
            self.palette.mid
        }
    }
}
