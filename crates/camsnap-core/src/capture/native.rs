//! Camera backend built on `nokhwa` (V4L2 / AVFoundation / Media Foundation).

use super::encode::save_frame;
use super::{Camera, CaptureError};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use std::path::Path;
use tracing::{debug, warn};

/// Local capture device addressed by index
#[derive(Debug, Default, Clone, Copy)]
pub struct NokhwaCamera;

impl NokhwaCamera {
    /// Create the native camera backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// A device with a running stream; stops the stream when dropped.
struct OpenStream {
    device: nokhwa::Camera,
    device_id: u32,
}

impl OpenStream {
    fn start(device_id: u32) -> Result<Self, CaptureError> {
        let open_err = |e: nokhwa::NokhwaError| CaptureError::DeviceOpen {
            device_id,
            reason: e.to_string(),
        };

        let format =
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution);
        let mut device =
            nokhwa::Camera::new(CameraIndex::Index(device_id), format).map_err(open_err)?;
        device.open_stream().map_err(open_err)?;

        debug!(device_id, "Camera stream opened");
        Ok(Self { device, device_id })
    }
}

impl Drop for OpenStream {
    fn drop(&mut self) {
        match self.device.stop_stream() {
            Ok(()) => debug!(device_id = self.device_id, "Camera stream closed"),
            Err(e) => warn!(
                device_id = self.device_id,
                error = %e,
                "Failed to stop camera stream"
            ),
        }
    }
}

impl Camera for NokhwaCamera {
    fn snapshot(&self, device_id: u32, path: &Path) -> Result<(), CaptureError> {
        let mut stream = OpenStream::start(device_id)?;

        let frame = stream.device.frame().map_err(|e| {
            warn!(device_id, error = %e, "Camera read failed");
            CaptureError::EmptyFrame { device_id }
        })?;
        if frame.buffer().is_empty() {
            return Err(CaptureError::EmptyFrame { device_id });
        }

        let image = frame.decode_image::<RgbFormat>().map_err(|e| {
            warn!(device_id, error = %e, "Failed to decode camera frame");
            CaptureError::EmptyFrame { device_id }
        })?;
        if image.width() == 0 || image.height() == 0 {
            return Err(CaptureError::EmptyFrame { device_id });
        }

        // Release the device before touching the file system
        drop(stream);

        save_frame(&image, path)
    }
}
