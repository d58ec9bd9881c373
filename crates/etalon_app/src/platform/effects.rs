use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use etalon_core::{ArtifactDescriptor, Effect, Msg, OpOutcome};
use etalon_engine::{ApiError, DeviceEvent, EngineConfig, EngineHandle, RequestId};
use rig_logging::{rig_info, rig_warn};

use super::console;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> Result<Self, ApiError> {
        let engine = EngineHandle::new(config)?;
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        Ok(runner)
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchList => {
                    rig_info!("refreshing reference list");
                    self.engine.fetch_list();
                }
                Effect::CreateReference { name } => {
                    rig_info!("creating reference {name:?}");
                    self.engine.create_reference(name);
                }
                Effect::UploadArtifact { file } => {
                    rig_info!(
                        "uploading {:?} ({} bytes)",
                        file.file_name,
                        file.bytes.len()
                    );
                    self.engine.upload_artifact(file.file_name, file.bytes);
                }
                Effect::RunTest { name } => {
                    rig_info!("running test against {name:?}");
                    self.engine.run_test(name);
                }
                Effect::Download { name } => {
                    rig_info!("downloading {name:?}");
                    self.engine.download(name);
                }
                Effect::Notify(notice) => console::notify(&notice),
            }
        }
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || loop {
            if let Some(event) = engine.try_recv() {
                if msg_tx.send(map_event(event)).is_err() {
                    break;
                }
            } else {
                thread::sleep(Duration::from_millis(20));
            }
        });
    }
}

fn map_event(event: DeviceEvent) -> Msg {
    match event {
        DeviceEvent::ListFetched { request_id, result } => match result {
            Ok(entries) => Msg::ListFetched {
                list: entries
                    .into_iter()
                    .map(|entry| ArtifactDescriptor { file: entry.file })
                    .collect(),
            },
            Err(err) => {
                rig_warn!("request {request_id}: list fetch failed: {err}");
                Msg::ListFetchFailed
            }
        },
        DeviceEvent::CreateSettled { request_id, result } => Msg::CreateSettled {
            outcome: settle(request_id, "create", result),
        },
        DeviceEvent::UploadSettled { request_id, result } => Msg::UploadSettled {
            outcome: settle(request_id, "upload", result),
        },
        DeviceEvent::TestSettled { request_id, result } => Msg::TestSettled {
            outcome: settle(request_id, "test", result),
        },
        DeviceEvent::DownloadSettled { request_id, result } => match result {
            Ok(path) => Msg::DownloadSettled {
                saved_to: Some(path.display().to_string()),
            },
            Err(err) => {
                rig_warn!("request {request_id}: download failed: {err}");
                Msg::DownloadSettled { saved_to: None }
            }
        },
    }
}

fn settle(request_id: RequestId, op: &str, result: Result<(), ApiError>) -> OpOutcome {
    match result {
        Ok(()) => OpOutcome::Success,
        Err(err) => {
            rig_warn!("request {request_id}: {op} failed: {err}");
            OpOutcome::Failed
        }
    }
}
