use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OmrError {
    #[error("image is empty or has zero area")]
    InvalidImage,

    #[error("no answer regions found in image")]
    NoRegionsFound,

    #[error("storage unavailable at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed answers in {path}: {reason}")]
    MalformedAnswers { path: PathBuf, reason: String },

    /// Unreadable input: the file is missing or is not a decodable image. It
    /// is the on-disk counterpart of `InvalidImage`.
    #[error("failed to open image {path}: {source}")]
    ImageOpen {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl OmrError {
    /// Whether the input image itself is unusable, either because it has no
    /// area or because it could not be read.
    pub fn is_invalid_image(&self) -> bool {
        matches!(self, OmrError::InvalidImage | OmrError::ImageOpen { .. })
    }
}

pub type Result<T> = std::result::Result<T, OmrError>;
