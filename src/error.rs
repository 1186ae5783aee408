use std::path::PathBuf;

use thiserror::Error;

/// Failures that the generators recover from with a simpler rendering path.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load logo {path}: {source}")]
    Logo {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode QR payload: {0}")]
    QrEncode(#[from] qrcode::types::QrError),

    #[error("QR styling failed: {0}")]
    Style(String),

    #[error("QR caption does not fit: {0}")]
    Layout(String),
}
