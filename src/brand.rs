//! AIU Dance brand constants shared by the favicon and QR generators.

use image::{Rgb, Rgba};

/// Release APK linked from the download page.
pub const DOWNLOAD_URL: &str =
    "https://github.com/AdiVlop/aiu-dance-app/releases/download/v1.0.2-fixed/app-release.apk";

/// Default logo location, relative to the working directory.
pub const LOGO_PATH: &str = "assets/images/logo_aiu_dance.png";

/// Label drawn on the badge when no logo is available.
pub const BADGE_LABEL: &str = "AIU";

pub const QR_TITLE: &str = "AIU Dance";
pub const QR_SUBTITLE: &str = "Scan to Download";

/// #9C0033
pub const PRIMARY: Rgba<u8> = Rgba([156, 0, 51, 255]);
/// #C00055
pub const SECONDARY: Rgba<u8> = Rgba([192, 0, 85, 255]);
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const SHADOW: Rgba<u8> = Rgba([0, 0, 0, 128]);

pub const QR_BLUE: Rgb<u8> = Rgb([43, 132, 255]);
pub const QR_DARK_BLUE: Rgb<u8> = Rgb([30, 95, 204]);
pub const QR_SUBTITLE_GREY: Rgb<u8> = Rgb([102, 102, 102]);

pub const FAVICON_96_FILE: &str = "aiu_dance_gmail_favicon_96.png";
pub const FAVICON_ICO_FILE: &str = "aiu_dance_gmail_favicon.ico";
pub const QR_FILE: &str = "AIU_Dance_QR.png";

/// Sizes packed into the multi-resolution ICO.
pub const FAVICON_SIZES: [u32; 4] = [16, 32, 48, 64];

pub fn favicon_png_file(size: u32) -> String {
    format!("aiu_dance_gmail_favicon_{size}x{size}.png")
}

/// Badge gradient and outline colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Colour at the rim of the disc.
    pub primary: Rgba<u8>,
    /// Colour the disc approaches at its centre.
    pub secondary: Rgba<u8>,
    pub outline: Rgba<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: PRIMARY,
            secondary: SECONDARY,
            outline: WHITE,
        }
    }
}

/// Parse a CSS colour string, falling back to `default` when it is not valid.
pub fn parse_css_color(value: &str, default: Rgba<u8>) -> Rgba<u8> {
    use std::str::FromStr;

    match css_color::Srgb::from_str(value) {
        Ok(color) => Rgba([
            (color.red * 255.).round() as u8,
            (color.green * 255.).round() as u8,
            (color.blue * 255.).round() as u8,
            255,
        ]),
        Err(_) => {
            log::warn!("Invalid colour {value:?}, using #{:02X}{:02X}{:02X}", default[0], default[1], default[2]);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_brand_hex_colours() {
        assert_eq!(parse_css_color("#9C0033", WHITE), PRIMARY);
        assert_eq!(parse_css_color("#C00055", WHITE), SECONDARY);
    }

    #[test]
    fn invalid_colour_uses_default() {
        assert_eq!(parse_css_color("not-a-colour", PRIMARY), PRIMARY);
    }

    #[test]
    fn png_names_follow_size() {
        assert_eq!(favicon_png_file(32), "aiu_dance_gmail_favicon_32x32.png");
    }
}
