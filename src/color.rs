//! Sequential two-color scale used to shade parks by a numeric value.

use serde::{Deserialize, Serialize};

/// Default low end of the visitation gradient.
pub const DEFAULT_START: Rgb8 = Rgb8 {
    r: 0xef,
    g: 0x79,
    b: 0x8a,
};
/// Default high end of the visitation gradient.
pub const DEFAULT_END: Rgb8 = Rgb8 {
    r: 0x61,
    g: 0x3f,
    b: 0x75,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    /// Parse `#rrggbb` or `#rgb` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let h = s.strip_prefix('#').unwrap_or(s);
        let nibble = |i: usize| u8::from_str_radix(h.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(h.get(i..i + 2)?, 16).ok();
        match h.len() {
            6 => Some(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            }),
            3 => Some(Self {
                r: nibble(0)? * 17,
                g: nibble(1)? * 17,
                b: nibble(2)? * 17,
            }),
            _ => None,
        }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// CSS functional notation, e.g. `rgb(239, 121, 138)`.
    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

// Half-up rounding, NaN as 0, clamped to a channel.
fn channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    (v + 0.5).floor().clamp(0.0, 255.0) as u8
}

/// Maps a numeric domain `[d0, d1]` onto an RGB gradient between two colors.
///
/// Values outside the domain extrapolate (channels saturate at 0/255) unless
/// clamping is enabled; a degenerate domain maps everything to the midpoint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorScale {
    domain: [f64; 2],
    start: Rgb8,
    end: Rgb8,
    clamp: bool,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::new(DEFAULT_START, DEFAULT_END)
    }
}

impl ColorScale {
    /// Gradient from `start` to `end` over the domain `[0, 1]`.
    pub fn new(start: Rgb8, end: Rgb8) -> Self {
        Self {
            domain: [0.0, 1.0],
            start,
            end,
            clamp: false,
        }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn set_domain(&mut self, domain: [f64; 2]) {
        self.domain = domain;
    }

    pub fn range(&self) -> [Rgb8; 2] {
        [self.start, self.end]
    }

    pub fn is_clamped(&self) -> bool {
        self.clamp
    }

    pub fn set_clamp(&mut self, clamp: bool) {
        self.clamp = clamp;
    }

    /// Normalized position of `value` in the domain.
    fn t(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        if d0 == d1 {
            return 0.5;
        }
        let t = (value - d0) / (d1 - d0);
        if self.clamp { t.clamp(0.0, 1.0) } else { t }
    }

    /// Color for `value`; `None` for NaN.
    pub fn color(&self, value: f64) -> Option<Rgb8> {
        if value.is_nan() {
            return None;
        }
        let t = self.t(value);
        let lerp = |a: u8, b: u8| channel(a as f64 + t * (b as f64 - a as f64));
        Some(Rgb8 {
            r: lerp(self.start.r, self.end.r),
            g: lerp(self.start.g, self.end.g),
            b: lerp(self.start.b, self.end.b),
        })
    }

    /// Color for `value` in CSS `rgb(...)` notation.
    pub fn css(&self, value: f64) -> Option<String> {
        self.color(value).map(|c| c.css())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_and_midpoint() {
        let s = ColorScale::default();
        assert_eq!(s.color(0.0), Some(DEFAULT_START));
        assert_eq!(s.color(1.0), Some(DEFAULT_END));
        // (239+97)/2, (121+63)/2, (138+117)/2 = 168, 92, 127.5 -> 128
        assert_eq!(s.css(0.5).as_deref(), Some("rgb(168, 92, 128)"));
    }

    #[test]
    fn degenerate_domain_and_nan() {
        let mut s = ColorScale::default();
        s.set_domain([3.0, 3.0]);
        assert_eq!(s.color(100.0), s.color(-7.0));
        assert_eq!(s.color(f64::NAN), None);
    }

    #[test]
    fn extrapolation_saturates_unless_clamped() {
        let mut s = ColorScale::default();
        let far = s.color(10.0).unwrap();
        assert_eq!(far.r, 0);
        s.set_clamp(true);
        assert_eq!(s.color(10.0), Some(DEFAULT_END));
    }

    #[test]
    fn hex_round_trip() {
        assert_eq!(Rgb8::from_hex("#ef798a"), Some(DEFAULT_START));
        assert_eq!(Rgb8::from_hex("fff"), Some(Rgb8 { r: 255, g: 255, b: 255 }));
        assert_eq!(Rgb8::from_hex("#12"), None);
        assert_eq!(DEFAULT_END.hex(), "#613f75");
    }
}
