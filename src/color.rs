//! Label color math
//!
//! Blending for overlapping label colors and WCAG-based contrast selection
//! for readable text over a highlight fill.

/// An sRGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse a `#rrggbb` (or `rrggbb`) hex string.
    pub fn parse(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Format as a lowercase `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Combine several label colors into one display color.
///
/// Takes the arithmetic mean of each channel across the inputs that parse as
/// hex colors. Unparseable entries are skipped. An empty input, or one where
/// nothing parses, yields `#000000`. A single color passes through unchanged.
pub fn blend(colors: &[&str]) -> String {
    let parsed: Vec<Rgb> = colors.iter().filter_map(|c| Rgb::parse(c)).collect();

    if parsed.is_empty() {
        return "#000000".to_string();
    }
    if colors.len() == 1 {
        return colors[0].to_string();
    }

    let n = parsed.len() as f64;
    let (mut r, mut g, mut b) = (0.0f64, 0.0f64, 0.0f64);
    for c in &parsed {
        r += f64::from(c.r);
        g += f64::from(c.g);
        b += f64::from(c.b);
    }

    let channel = |sum: f64| (sum / n).round().clamp(0.0, 255.0) as u8;
    Rgb {
        r: channel(r),
        g: channel(g),
        b: channel(b),
    }
    .to_hex()
}

/// Render a color as a CSS `rgba(...)` string with the given alpha.
///
/// Channels pass through untouched; an unparseable color falls back to black.
pub fn with_alpha(color: &str, alpha: f64) -> String {
    let c = Rgb::parse(color).unwrap_or(Rgb { r: 0, g: 0, b: 0 });
    format!("rgba({}, {}, {}, {})", c.r, c.g, c.b, alpha)
}

/// Pick a readable text color (`#ffffff` or `#000000`) over a highlight fill.
///
/// The fill is composited over a white page at the given alpha, then its WCAG
/// relative luminance decides the text color: below 0.5 the background is
/// dark enough for white text, otherwise black.
pub fn contrast_text_color(color: &str, alpha: f64) -> &'static str {
    let c = Rgb::parse(color).unwrap_or(Rgb { r: 0, g: 0, b: 0 });
    let alpha = alpha.clamp(0.0, 1.0);

    // Composite over white; identity at alpha = 1.
    let over_white = |ch: u8| f64::from(ch) * alpha + 255.0 * (1.0 - alpha);

    let linearize = |ch: f64| {
        let v = ch / 255.0;
        if v <= 0.03928 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    };

    let luminance = 0.2126 * linearize(over_white(c.r))
        + 0.7152 * linearize(over_white(c.g))
        + 0.0722 * linearize(over_white(c.b));

    if luminance < 0.5 {
        "#ffffff"
    } else {
        "#000000"
    }
}
