//! Color utility functions shared by the renderer and the group palette.

use std::fmt;

/// An 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const RED: Rgba = Rgba::rgb(255, 0, 0);
    pub const BLUE: Rgba = Rgba::rgb(0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with the alpha channel replaced.
    ///
    /// # Arguments
    /// * `alpha` - Opacity in range 0.0-1.0 (clamped)
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Alpha channel as a fraction in range 0.0-1.0.
    pub fn alpha(&self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if !matches!(digits.len(), 6 | 8) || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        let a = if digits.len() == 8 { channel(6)? } else { 255 };
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }
}

impl fmt::Display for Rgba {
    /// Formats as a CSS `rgba()` string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rgba({}, {}, {}, {:.2})",
            self.r,
            self.g,
            self.b,
            self.alpha()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_rgb() {
        assert_eq!(Rgba::from_hex("#FF5733"), Some(Rgba::rgb(255, 87, 51)));
        assert_eq!(Rgba::from_hex("33a1ff"), Some(Rgba::rgb(51, 161, 255)));
    }

    #[test]
    fn test_from_hex_with_alpha() {
        let c = Rgba::from_hex("#00000080").unwrap();
        assert_eq!(c.a, 128);
    }

    #[test]
    fn test_from_hex_invalid() {
        assert_eq!(Rgba::from_hex("#FFF"), None);
        assert_eq!(Rgba::from_hex("#GG0000"), None);
        assert_eq!(Rgba::from_hex("#ÿÿÿ"), None);
    }

    #[test]
    fn test_with_alpha() {
        let c = Rgba::RED.with_alpha(0.3);
        assert_eq!(c.a, 77);
        assert_eq!(c.r, 255);
        assert_eq!(Rgba::RED.with_alpha(2.0).a, 255);
    }

    #[test]
    fn test_display_css() {
        assert_eq!(Rgba::RED.with_alpha(0.7).to_string(), "rgba(255, 0, 0, 0.70)");
    }
}
