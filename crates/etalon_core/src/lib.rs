//! Etalon console core: pure state machine and view-model helpers.
mod effect;
mod msg;
mod notice;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use notice::{Notice, Severity};
pub use state::{AppState, ArtifactDescriptor, OpOutcome, StagedFile};
pub use update::update;
pub use view_model::{download_target, AppViewModel, ListRowView, SelectOptionView};
