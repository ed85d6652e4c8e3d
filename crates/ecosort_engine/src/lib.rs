//! EcoSort engine: classification, capture, and storage IO.
mod capture;
mod classify;
mod engine;
mod gateway;
mod repository;
mod store;
mod types;

pub use capture::{CameraFeed, CaptureDevice, CaptureSource};
pub use classify::{validate, Classifier, ClassifierSettings, GeminiClassifier};
pub use engine::{EngineError, EngineEvents, EngineHandle};
pub use gateway::{ClassificationGateway, FAILURE_EXPLANATION};
pub use repository::{SessionRepository, DEFAULT_NAMESPACE};
pub use store::{ensure_store_dir, FileStore, KeyValueStore, MemoryStore, StoreError};
pub use types::{ClassifyError, EngineEvent, FailureKind};
