//! Single-frame camera capture
//!
//! A [`Camera`] grabs one frame and writes it to disk; [`Capturer`] runs it on
//! the blocking pool and reads the encoded file back for delivery.

#[cfg(feature = "encode")]
mod encode;
#[cfg(feature = "native-camera")]
mod native;

#[cfg(feature = "native-camera")]
pub use native::NokhwaCamera;

use crate::config::CameraSettings;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Errors that can occur while capturing a frame
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The device could not be opened or its stream started
    #[error("Camera {device_id} failed to open: {reason}")]
    DeviceOpen {
        /// Device index.
        device_id: u32,
        /// Driver error text.
        reason: String,
    },
    /// The device returned no usable frame
    #[error("Failed to capture an image from camera {device_id}")]
    EmptyFrame {
        /// Device index.
        device_id: u32,
    },
    /// Encoding or writing the output file failed
    #[error("Failed to save image to {path}: {reason}")]
    Write {
        /// Output file.
        path: PathBuf,
        /// Encoder or I/O error text.
        reason: String,
    },
    /// The written file could not be read back
    #[error("Failed to reopen {path}: {source}")]
    Reopen {
        /// Output file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The blocking capture task panicked or was cancelled
    #[error("Capture task did not complete: {0}")]
    Interrupted(String),
}

/// A camera able to grab one frame into an image file.
///
/// Implementations block; the device must be released before returning,
/// whatever the outcome.
#[cfg_attr(test, mockall::automock)]
pub trait Camera: Send + Sync {
    /// Capture one frame from `device_id` and write it to `path`.
    ///
    /// # Errors
    ///
    /// Returns `DeviceOpen`, `EmptyFrame` or `Write` depending on the failing step.
    fn snapshot(&self, device_id: u32, path: &Path) -> Result<(), CaptureError>;
}

/// Encoded frame read back from the output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// File name used for the upload.
    pub file_name: String,
}

/// Runs captures against one configured device
///
/// Captures are serialised: the device and the output file are shared by
/// every request.
pub struct Capturer {
    camera: Arc<dyn Camera>,
    settings: CameraSettings,
    lock: Arc<Mutex<()>>,
}

impl Capturer {
    /// Create a capturer for the configured device and output file.
    #[must_use]
    pub fn new(camera: Arc<dyn Camera>, settings: CameraSettings) -> Self {
        Self {
            camera,
            settings,
            lock: Arc::new(Mutex::new(())),
        }
    }

    /// Grab a frame, persist it, and read the file back.
    ///
    /// # Errors
    ///
    /// Returns the camera's error, `Reopen` if the file cannot be read back,
    /// or `Interrupted` if the blocking task died.
    pub async fn capture(&self) -> Result<CapturedImage, CaptureError> {
        // The blocking task owns the guard, so dropping this future does not
        // let another capture start while the camera is still busy.
        let guard = Arc::clone(&self.lock).lock_owned().await;

        let device_id = self.settings.device_id;
        let path = self.settings.filename.clone();

        debug!(device_id, path = %path.display(), "Starting capture");

        let camera = Arc::clone(&self.camera);
        let target = path.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            camera.snapshot(device_id, &target)?;
            std::fs::read(&target).map_err(|source| CaptureError::Reopen {
                path: target.clone(),
                source,
            })
        })
        .await
        .map_err(|e| CaptureError::Interrupted(e.to_string()))??;

        info!(
            device_id,
            size = bytes.len(),
            "Captured frame from camera"
        );

        Ok(CapturedImage {
            bytes,
            file_name: upload_name(&path),
        })
    }
}

fn upload_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "snapshot.jpg".to_string())
}
