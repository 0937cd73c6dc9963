use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

use crate::error::ChartError;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Used for series the plan does not give an explicit colour.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.45);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            RGBColor(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color names: "blue", "#1f77b4", "1f77b4"
// ---------------------------------------------------------------------------

/// Parse a CSS colour name or a hex code into an RGB colour.
pub fn parse_color(name: &str) -> Result<RGBColor, ChartError> {
    let trimmed = name.trim();
    let rgb: Srgb<u8> = match palette::named::from_str(&trimmed.to_ascii_lowercase()) {
        Some(named) => named,
        None => trimmed.parse().map_err(|_| ChartError::UnknownColor {
            name: name.to_string(),
        })?,
    };
    Ok(RGBColor(rgb.red, rgb.green, rgb.blue))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_used_by_the_presets() {
        assert_eq!(parse_color("blue").unwrap(), RGBColor(0, 0, 255));
        assert_eq!(parse_color("green").unwrap(), RGBColor(0, 128, 0));
        assert_eq!(parse_color("Red").unwrap(), RGBColor(255, 0, 0));
        assert_eq!(parse_color("black").unwrap(), RGBColor(0, 0, 0));
    }

    #[test]
    fn hex_codes() {
        let tab_blue = RGBColor(0x1f, 0x77, 0xb4);
        assert_eq!(parse_color("#1f77b4").unwrap(), tab_blue);
        assert_eq!(parse_color("ff7f0e").unwrap(), RGBColor(0xff, 0x7f, 0x0e));
    }

    #[test]
    fn unknown_name_is_an_error() {
        assert!(matches!(
            parse_color("blurple"),
            Err(ChartError::UnknownColor { name }) if name == "blurple"
        ));
    }

    #[test]
    fn palette_colours_are_distinct() {
        let colours = generate_palette(4);
        assert_eq!(colours.len(), 4);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }
}
