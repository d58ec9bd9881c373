use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use rig_logging::{rig_debug, rig_warn};

use crate::api::{DeviceApi, DeviceSettings, HttpDeviceClient};
use crate::filename::artifact_filename;
use crate::persist::AtomicArtifactWriter;
use crate::{ApiError, DeviceEvent, FailureKind, RequestId};

enum EngineCommand {
    FetchList,
    CreateReference { name: String },
    UploadArtifact { file_name: String, bytes: Vec<u8> },
    RunTest { name: String },
    Download { name: String },
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub settings: DeviceSettings,
    /// Where downloaded artifacts are saved.
    pub download_dir: PathBuf,
}

impl EngineConfig {
    pub fn default_with_download_dir(download_dir: PathBuf) -> Self {
        Self {
            settings: DeviceSettings::default(),
            download_dir,
        }
    }
}

/// Bridge between the synchronous shell and the async device client.
///
/// Commands fan out as independent tasks on a runtime owned by a dedicated
/// thread, so nothing blocks anything else and settlements arrive in
/// whatever order the device answers.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<DeviceEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ApiError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let api = Arc::new(HttpDeviceClient::new(&config.settings)?);
        let writer = Arc::new(AtomicArtifactWriter::new(config.download_dir));

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let mut next_request_id: RequestId = 0;
            while let Ok(command) = cmd_rx.recv() {
                next_request_id += 1;
                let request_id = next_request_id;
                let api = api.clone();
                let writer = writer.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(request_id, api.as_ref(), &writer, command, event_tx).await;
                });
            }
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn fetch_list(&self) {
        let _ = self.cmd_tx.send(EngineCommand::FetchList);
    }

    pub fn create_reference(&self, name: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::CreateReference { name: name.into() });
    }

    pub fn upload_artifact(&self, file_name: impl Into<String>, bytes: Vec<u8>) {
        let _ = self.cmd_tx.send(EngineCommand::UploadArtifact {
            file_name: file_name.into(),
            bytes,
        });
    }

    pub fn run_test(&self, name: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::RunTest { name: name.into() });
    }

    pub fn download(&self, name: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Download { name: name.into() });
    }

    pub fn try_recv(&self) -> Option<DeviceEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }
}

async fn handle_command(
    request_id: RequestId,
    api: &dyn DeviceApi,
    writer: &AtomicArtifactWriter,
    command: EngineCommand,
    event_tx: mpsc::Sender<DeviceEvent>,
) {
    let event = match command {
        EngineCommand::FetchList => {
            rig_debug!("request {request_id}: fetch list");
            DeviceEvent::ListFetched {
                request_id,
                result: api.fetch_list().await,
            }
        }
        EngineCommand::CreateReference { name } => {
            rig_debug!("request {request_id}: create reference {name:?}");
            DeviceEvent::CreateSettled {
                request_id,
                result: api.create_reference(&name).await,
            }
        }
        EngineCommand::UploadArtifact { file_name, bytes } => {
            rig_debug!(
                "request {request_id}: upload {file_name:?} ({} bytes)",
                bytes.len()
            );
            DeviceEvent::UploadSettled {
                request_id,
                result: api.upload_artifact(&file_name, bytes).await,
            }
        }
        EngineCommand::RunTest { name } => {
            rig_debug!("request {request_id}: run test against {name:?}");
            DeviceEvent::TestSettled {
                request_id,
                result: api.run_test(&name).await,
            }
        }
        EngineCommand::Download { name } => {
            rig_debug!("request {request_id}: download {name:?}");
            let result = match api.download_artifact(&name).await {
                Ok(bytes) => writer
                    .write(&artifact_filename(&name), &bytes)
                    .map_err(|err| ApiError::new(FailureKind::Io, err.to_string())),
                Err(err) => Err(err),
            };
            DeviceEvent::DownloadSettled { request_id, result }
        }
    };

    if event_tx.send(event).is_err() {
        rig_warn!("request {request_id}: settlement dropped, event channel closed");
    }
}
