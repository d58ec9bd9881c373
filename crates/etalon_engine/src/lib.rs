//! Etalon engine: device API transport and effect execution.
mod api;
mod engine;
mod filename;
mod persist;
mod types;

pub use api::{DeviceApi, DeviceSettings, HttpDeviceClient, STATUS_OK};
pub use engine::{EngineConfig, EngineHandle};
pub use filename::artifact_filename;
pub use persist::{ensure_download_dir, AtomicArtifactWriter, PersistError};
pub use types::{ApiError, ArtifactEntry, DeviceEvent, FailureKind, RequestId};
