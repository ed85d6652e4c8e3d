/// Failures of the capture path. The messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Cannot access the camera ({0}). Allow access or upload a photo instead.")]
    DeviceUnavailable(String),
    #[error("The camera is not ready yet. Try again in a moment.")]
    SessionNotReady,
    #[error("The selected file is empty.")]
    EmptyUpload,
    #[error("Open the scanner before taking or uploading a photo.")]
    ScannerClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Please fill in all fields.")]
    MissingFields,
}
