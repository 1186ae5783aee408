//! Static image assets for the AIU Dance download page: the Gmail favicon,
//! the multi-size favicon ICO and the download QR badge.

pub mod badge;
pub mod brand;
pub mod canvas;
pub mod error;
pub mod favicon;
pub mod glyphs;
pub mod qr;
pub mod text;

use brand::Palette;
use std::path::PathBuf;
use text::FontChain;

pub use error::AssetError;
pub use favicon::{generate_favicon_96, generate_favicon_set};
pub use qr::{generate_qr_badge, QrOutcome};

/// Inputs and output locations shared by all generators.
#[derive(Debug, Clone)]
pub struct Options {
    /// Optional logo placed in the middle of the favicons.
    pub logo: PathBuf,
    pub fonts: FontChain,
    /// Where the favicon PNGs and the ICO are written.
    pub downloads: PathBuf,
    /// Where the QR badge is written.
    pub public: PathBuf,
    pub palette: Palette,
    /// Payload of the QR code.
    pub url: String,
    /// Caption lines under the QR code.
    pub title: String,
    pub subtitle: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            logo: PathBuf::from(brand::LOGO_PATH),
            fonts: FontChain::new(None),
            downloads: default_downloads_dir(),
            public: PathBuf::from("public"),
            palette: Palette::default(),
            url: brand::DOWNLOAD_URL.to_string(),
            title: brand::QR_TITLE.to_string(),
            subtitle: brand::QR_SUBTITLE.to_string(),
        }
    }
}

/// `~/Downloads`, or `./Downloads` when no home directory is known.
pub fn default_downloads_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Downloads")
}
