use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::{debug, warn};

/// Creates a path for a debug image.
pub fn debug_image_path(base: &Path, label: &str) -> PathBuf {
    let mut result = PathBuf::from(base);
    result.set_file_name(format!(
        "{}_debug_{}.png",
        base.file_stem().unwrap_or_default().to_string_lossy(),
        label
    ));
    result
}

/// Writes intermediate images next to the capture they came from.
#[derive(Debug, Clone)]
pub struct ImageDebugWriter {
    input_path: Option<PathBuf>,
}

impl ImageDebugWriter {
    pub fn new(input_path: PathBuf) -> Self {
        Self {
            input_path: Some(input_path),
        }
    }

    pub fn disabled() -> Self {
        Self { input_path: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.input_path.is_some()
    }

    /// Saves the image built by `image` under `label`. Does nothing when
    /// disabled; failures are logged.
    pub fn write(&self, label: &str, image: impl FnOnce() -> DynamicImage) -> Option<PathBuf> {
        let input_path = self.input_path.as_ref()?;
        let path = debug_image_path(input_path, label);
        match image().save(&path) {
            Ok(()) => {
                debug!("wrote debug image {}", path.display());
                Some(path)
            }
            Err(e) => {
                warn!("failed to write debug image {}: {}", path.display(), e);
                None
            }
        }
    }
}
