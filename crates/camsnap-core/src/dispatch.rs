//! Command handlers
//!
//! Each handler checks the requester against the allow-list and produces
//! exactly one [`Reply`]. Delivery is left to the transport.

use crate::capture::{CaptureError, CapturedImage, Capturer};
use crate::config::Settings;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Reply sent to anyone not on the allow-list.
pub const DENIAL_MESSAGE: &str = "🚫 У вас нет доступа к этому боту.";
/// Reply sent when the camera could not produce an image.
pub const CAPTURE_ERROR_MESSAGE: &str = "Ошибка захвата изображения с камеры.";
/// Reply sent when the captured file could not be read back.
pub const OPEN_ERROR_MESSAGE: &str = "Ошибка открытия изображения.";
/// Caption attached to every captured photo.
pub const PHOTO_CAPTION: &str = "📸 Вот ваш снимок с камеры";

/// Single outbound message produced by a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text message
    Text(String),
    /// Image attachment with caption
    Photo {
        /// Encoded image.
        image: CapturedImage,
        /// Caption shown under the image.
        caption: String,
    },
}

/// Access-gated handlers for `/start` and `/photo`
pub struct CommandDispatcher {
    settings: Arc<Settings>,
    capturer: Capturer,
}

impl CommandDispatcher {
    /// Create a dispatcher over read-only settings and a capturer.
    #[must_use]
    pub fn new(settings: Arc<Settings>, capturer: Capturer) -> Self {
        Self { settings, capturer }
    }

    fn deny(requester_id: i64) -> Reply {
        warn!("⛔️ Access denied for user {requester_id}");
        Reply::Text(DENIAL_MESSAGE.to_string())
    }

    /// `/start`: the configured welcome text, or the denial.
    pub fn start(&self, requester_id: i64) -> Reply {
        if !self.settings.is_allowed(requester_id) {
            return Self::deny(requester_id);
        }
        info!("Sending welcome message to user {requester_id}.");
        Reply::Text(self.settings.telegram.welcome_msg.clone())
    }

    /// `/photo`: capture a frame and return it, or report why it failed.
    ///
    /// The camera is never touched for denied requesters.
    pub async fn photo(&self, requester_id: i64) -> Reply {
        if !self.settings.is_allowed(requester_id) {
            return Self::deny(requester_id);
        }

        info!("User {requester_id} requested a photo.");
        match self.capturer.capture().await {
            Ok(image) => Reply::Photo {
                image,
                caption: PHOTO_CAPTION.to_string(),
            },
            Err(e @ CaptureError::Reopen { .. }) => {
                error!("Failed to open captured image for user {requester_id}: {e}");
                Reply::Text(OPEN_ERROR_MESSAGE.to_string())
            }
            Err(e) => {
                error!("Capture failed for user {requester_id}: {e}");
                Reply::Text(CAPTURE_ERROR_MESSAGE.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Reply {
        fn as_text(&self) -> Option<&str> {
            match self {
                Self::Text(text) => Some(text),
                Self::Photo { .. } => None,
            }
        }

        fn is_denial(&self) -> bool {
            self.as_text() == Some(DENIAL_MESSAGE)
        }
    }
    use crate::capture::MockCamera;
    use crate::config::{CameraSettings, TelegramSettings};

    fn settings(allowed: Vec<i64>) -> Arc<Settings> {
        Arc::new(Settings {
            telegram: TelegramSettings {
                bot_token: "dummy".to_string(),
                welcome_msg: "hello".to_string(),
                allowed_users: allowed,
            },
            camera: CameraSettings::default(),
        })
    }

    #[tokio::test]
    async fn test_denied_photo_never_touches_camera() {
        let mut camera = MockCamera::new();
        camera.expect_snapshot().times(0);

        let settings = settings(vec![1, 2]);
        let capturer = Capturer::new(Arc::new(camera), settings.camera.clone());
        let dispatcher = CommandDispatcher::new(settings, capturer);

        assert!(dispatcher.photo(3).await.is_denial());
        assert!(dispatcher.start(3).is_denial());
    }

    #[tokio::test]
    async fn test_device_open_failure_reports_capture_error() {
        let mut camera = MockCamera::new();
        camera.expect_snapshot().times(1).returning(|device_id, _| {
            Err(CaptureError::DeviceOpen {
                device_id,
                reason: "no such device".to_string(),
            })
        });

        let settings = settings(vec![1]);
        let capturer = Capturer::new(Arc::new(camera), settings.camera.clone());
        let dispatcher = CommandDispatcher::new(settings, capturer);

        assert_eq!(
            dispatcher.photo(1).await,
            Reply::Text(CAPTURE_ERROR_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_reply_helpers() {
        let text = Reply::Text(DENIAL_MESSAGE.to_string());
        assert!(text.is_denial());
        assert_eq!(text.as_text(), Some(DENIAL_MESSAGE));

        let photo = Reply::Photo {
            image: CapturedImage {
                bytes: vec![1, 2, 3],
                file_name: "a.jpg".to_string(),
            },
            caption: PHOTO_CAPTION.to_string(),
        };
        assert!(!photo.is_denial());
        assert_eq!(photo.as_text(), None);
    }
}
