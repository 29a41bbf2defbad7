//! Sentiment-to-color mappings shared by the charts and both map styles.

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `rgb(r, g, b)`.
    #[must_use]
    pub fn css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// `#rrggbb`.
    #[must_use]
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// 24-bit ANSI foreground escape.
    #[must_use]
    pub fn ansi_fg(self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }
}

pub const ANSI_RESET: &str = "\x1b[0m";

/// Map legend swatches.
pub const LEGEND_NEGATIVE: Rgb = Rgb::new(0xdc, 0x26, 0x26);
pub const LEGEND_NEUTRAL: Rgb = Rgb::new(0x9c, 0xa3, 0xaf);
pub const LEGEND_POSITIVE: Rgb = Rgb::new(0x16, 0xa3, 0x4a);

/// Donut slice colors.
pub const DONUT_POSITIVE: Rgb = Rgb::new(0x16, 0xa3, 0x4a);
pub const DONUT_NEUTRAL: Rgb = Rgb::new(0x6b, 0x72, 0x80);
pub const DONUT_NEGATIVE: Rgb = Rgb::new(0xdc, 0x26, 0x26);

/// Fill for countries with no posts.
pub const NO_DATA: Rgb = Rgb::new(0xe5, 0xe7, 0xeb);

const HUE_SATURATION: f64 = 0.8;
const HUE_LIGHTNESS: f64 = 0.5;

/// Hue in degrees for an average in `[-1, 1]`: 0 red, 60 yellow, 120 green.
///
/// Out-of-range averages are clamped.
#[must_use]
pub fn hue_for_avg(avg: f64) -> f64 {
    let t = avg.clamp(-1.0, 1.0);
    120.0 * (t + 1.0) / 2.0
}

/// CSS `hsl()` color for an average sentiment.
#[must_use]
pub fn color_for_avg(avg: f64) -> String {
    format!("hsl({:.0} 80% 50%)", hue_for_avg(avg))
}

/// [`color_for_avg`] as RGB, for terminal output.
#[must_use]
pub fn rgb_for_avg(avg: f64) -> Rgb {
    hsl_to_rgb(hue_for_avg(avg), HUE_SATURATION, HUE_LIGHTNESS)
}

/// Red–gray–green fill for the choropleth; [`NO_DATA`] when `avg` is `None`.
#[must_use]
pub fn choropleth_color(avg: Option<f64>) -> Rgb {
    let Some(avg) = avg else {
        return NO_DATA;
    };
    let t = avg.clamp(-1.0, 1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let channel = |v: f64| v.round() as u8;
    let r = if t < 0.0 { 220 } else { channel(220.0 * (1.0 - t)) };
    let g = if t > 0.0 { 220 } else { channel(220.0 * (1.0 + t)) };
    Rgb::new(r, g, 140)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp {
        hp if hp < 1.0 => (c, x, 0.0),
        hp if hp < 2.0 => (x, c, 0.0),
        hp if hp < 3.0 => (0.0, c, x),
        hp if hp < 4.0 => (0.0, x, c),
        hp if hp < 5.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(to_u8(r1), to_u8(g1), to_u8(b1))
}
