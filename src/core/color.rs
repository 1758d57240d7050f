//! CIE Lab / LCh conversions and hue-aware interpolation.
//!
//! Conversions go through linear sRGB and D50 XYZ (Bradford adapted), the
//! convention used by common web charting libraries, so colors blended here
//! line up with maps drawn by those tools.

use crate::domain::model::Color;

const XN: f64 = 0.96422;
const YN: f64 = 1.0;
const ZN: f64 = 0.82521;
const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// Cylindrical Lab. `h` is in degrees and is NaN for achromatic colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hcl {
    pub h: f64,
    pub c: f64,
    pub l: f64,
}

fn srgb_to_linear(channel: u8) -> f64 {
    let x = f64::from(channel) / 255.0;
    if x <= 0.04045 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(x: f64) -> u8 {
    let v = 255.0
        * if x <= 0.0031308 {
            12.92 * x
        } else {
            1.055 * x.powf(1.0 / 2.4) - 0.055
        };
    if v.is_nan() {
        0
    } else {
        v.round().clamp(0.0, 255.0) as u8
    }
}

fn xyz_to_lab(t: f64) -> f64 {
    if t > T3 {
        t.cbrt()
    } else {
        t / T2 + T0
    }
}

fn lab_to_xyz(t: f64) -> f64 {
    if t > T1 {
        t * t * t
    } else {
        T2 * (t - T0)
    }
}

impl From<Color> for Lab {
    fn from(color: Color) -> Self {
        let r = srgb_to_linear(color.r);
        let g = srgb_to_linear(color.g);
        let b = srgb_to_linear(color.b);
        let y = xyz_to_lab((0.2225045 * r + 0.7168786 * g + 0.0606169 * b) / YN);
        let (x, z) = if color.r == color.g && color.g == color.b {
            (y, y)
        } else {
            (
                xyz_to_lab((0.4360747 * r + 0.3850649 * g + 0.1430804 * b) / XN),
                xyz_to_lab((0.0139322 * r + 0.0971045 * g + 0.7141733 * b) / ZN),
            )
        };
        Lab {
            l: 116.0 * y - 16.0,
            a: 500.0 * (x - y),
            b: 200.0 * (y - z),
        }
    }
}

impl From<Lab> for Color {
    fn from(lab: Lab) -> Self {
        let y = (lab.l + 16.0) / 116.0;
        let x = if lab.a.is_nan() { y } else { y + lab.a / 500.0 };
        let z = if lab.b.is_nan() { y } else { y - lab.b / 200.0 };
        let x = XN * lab_to_xyz(x);
        let y = YN * lab_to_xyz(y);
        let z = ZN * lab_to_xyz(z);
        Color::new(
            linear_to_srgb(3.1338561 * x - 1.6168667 * y - 0.4906146 * z),
            linear_to_srgb(-0.9787684 * x + 1.9161415 * y + 0.0334540 * z),
            linear_to_srgb(0.0719453 * x - 0.2289914 * y + 1.4052427 * z),
        )
    }
}

impl From<Lab> for Hcl {
    fn from(lab: Lab) -> Self {
        if lab.a == 0.0 && lab.b == 0.0 {
            return Hcl {
                h: f64::NAN,
                c: 0.0,
                l: lab.l,
            };
        }
        let mut h = lab.b.atan2(lab.a).to_degrees();
        if h < 0.0 {
            h += 360.0;
        }
        Hcl {
            h,
            c: lab.a.hypot(lab.b),
            l: lab.l,
        }
    }
}

impl From<Hcl> for Lab {
    fn from(hcl: Hcl) -> Self {
        if hcl.h.is_nan() {
            return Lab {
                l: hcl.l,
                a: 0.0,
                b: 0.0,
            };
        }
        let h = hcl.h.to_radians();
        Lab {
            l: hcl.l,
            a: h.cos() * hcl.c,
            b: h.sin() * hcl.c,
        }
    }
}

impl From<Color> for Hcl {
    fn from(color: Color) -> Self {
        Hcl::from(Lab::from(color))
    }
}

impl From<Hcl> for Color {
    fn from(hcl: Hcl) -> Self {
        Color::from(Lab::from(hcl))
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hue interpolation along the shorter arc; an undefined hue borrows the other.
fn lerp_hue(a: f64, b: f64, t: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => f64::NAN,
        (true, false) => b,
        (false, true) => a,
        (false, false) => {
            let mut d = b - a;
            if d > 180.0 {
                d -= 360.0;
            } else if d < -180.0 {
                d += 360.0;
            }
            a + d * t
        }
    }
}

/// Blends `from` toward `to` in LCh. `t` outside `0..=1` is clamped and the
/// endpoints come back unchanged.
pub fn interpolate_hcl(from: Color, to: Color, t: f64) -> Color {
    if t.is_nan() || t <= 0.0 {
        return from;
    }
    if t >= 1.0 {
        return to;
    }
    let a = Hcl::from(from);
    let b = Hcl::from(to);
    Color::from(Hcl {
        h: lerp_hue(a.h, b.h, t),
        c: lerp(a.c, b.c, t),
        l: lerp(a.l, b.l, t),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(0xd7, 0x30, 0x27);
    const AMBER: Color = Color::new(0xfe, 0xe0, 0x8b);
    const GREEN: Color = Color::new(0x1a, 0x98, 0x50);

    #[test]
    fn test_lab_round_trip_is_lossless_after_rounding() {
        for color in [RED, AMBER, GREEN, Color::new(0, 0, 0), Color::new(255, 255, 255)] {
            assert_eq!(Color::from(Lab::from(color)), color);
            assert_eq!(Color::from(Hcl::from(color)), color);
        }
    }

    #[test]
    fn test_white_is_achromatic_with_full_lightness() {
        let hcl = Hcl::from(Color::new(255, 255, 255));
        assert!(hcl.h.is_nan());
        assert_eq!(hcl.c, 0.0);
        assert!((hcl.l - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_interpolation_endpoints_are_exact() {
        assert_eq!(interpolate_hcl(AMBER, RED, 0.0), AMBER);
        assert_eq!(interpolate_hcl(AMBER, RED, 1.0), RED);
        assert_eq!(interpolate_hcl(AMBER, RED, -3.0), AMBER);
        assert_eq!(interpolate_hcl(AMBER, RED, 7.0), RED);
    }

    #[test]
    fn test_interpolation_lightness_moves_monotonically() {
        let mut previous = Hcl::from(AMBER).l;
        for step in 1..=4 {
            let l = Hcl::from(interpolate_hcl(AMBER, GREEN, step as f64 / 4.0)).l;
            assert!(l < previous, "lightness rose at step {}", step);
            previous = l;
        }
    }

    #[test]
    fn test_hue_takes_shorter_arc() {
        assert!((lerp_hue(350.0, 10.0, 0.5) - 360.0).abs() < 1e-9);
        assert!((lerp_hue(10.0, 350.0, 0.5) - 0.0).abs() < 1e-9);
        assert_eq!(lerp_hue(f64::NAN, 40.0, 0.3), 40.0);
    }

    #[test]
    fn test_blend_with_grey_keeps_colored_hue() {
        let grey = Color::new(128, 128, 128);
        let mid = Hcl::from(interpolate_hcl(grey, RED, 0.5));
        let red = Hcl::from(RED);
        assert!((mid.h - red.h).abs() < 3.0);
    }
}
