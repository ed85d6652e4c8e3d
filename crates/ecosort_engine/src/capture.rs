use ecosort_core::{CaptureError, Facing, ImageArtifact};
use ecosort_logging::{eco_debug, eco_info, eco_warn};

/// A live camera stream. Dropping it must not be relied on; call [`CameraFeed::stop`].
pub trait CameraFeed: Send {
    /// Extracts one encoded still frame from the stream.
    fn grab_frame(&mut self) -> Result<ImageArtifact, CaptureError>;
    /// Stops every track of the stream. Must be idempotent.
    fn stop(&mut self);
}

/// Opens camera streams. Permission and hardware failures surface as
/// [`CaptureError::DeviceUnavailable`].
pub trait CaptureDevice: Send {
    fn open(&mut self, facing: Facing) -> Result<Box<dyn CameraFeed>, CaptureError>;
}

struct LiveSession {
    facing: Facing,
    feed: Box<dyn CameraFeed>,
}

/// Turns a camera session or an uploaded file into a single image artifact.
///
/// At most one session is live at a time and its tracks are stopped on every
/// exit path, including drop.
pub struct CaptureSource<D: CaptureDevice> {
    device: D,
    session: Option<LiveSession>,
}

impl<D: CaptureDevice> CaptureSource<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            session: None,
        }
    }

    /// Opens a session with `facing`, replacing any current one.
    pub fn start_session(&mut self, facing: Facing) -> Result<(), CaptureError> {
        self.end_session();
        match self.device.open(facing) {
            Ok(feed) => {
                eco_info!("camera session started ({:?})", facing);
                self.session = Some(LiveSession { facing, feed });
                Ok(())
            }
            Err(err) => {
                eco_warn!("camera unavailable: {}", err);
                Err(err)
            }
        }
    }

    pub fn capture(&mut self) -> Result<ImageArtifact, CaptureError> {
        let session = self.session.as_mut().ok_or(CaptureError::SessionNotReady)?;
        let image = session.feed.grab_frame()?;
        eco_debug!("captured {:?}", image);
        Ok(image)
    }

    /// Wraps uploaded bytes. Works with or without a live session.
    pub fn upload_file(&self, bytes: Vec<u8>) -> Result<ImageArtifact, CaptureError> {
        if bytes.is_empty() {
            return Err(CaptureError::EmptyUpload);
        }
        let mime_type = sniff_mime(&bytes);
        Ok(ImageArtifact::new(mime_type, bytes))
    }

    pub fn end_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.feed.stop();
            eco_info!("camera session ended ({:?})", session.facing);
        }
    }
}

impl<D: CaptureDevice> Drop for CaptureSource<D> {
    fn drop(&mut self) {
        self.end_session();
    }
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "image/png"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}
