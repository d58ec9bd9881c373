use crate::{AppState, Effect, Msg, Notice, OpOutcome};

/// Pure update function: applies a message to state and returns any effects.
///
/// All collection mutation happens here, and only on a settled list fetch.
/// Mutating operations converge the views by emitting a fresh
/// `Effect::FetchList` on success; a test run does not change membership and
/// emits none.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started | Msg::ListViewShown => vec![Effect::FetchList],
        Msg::CreateSubmitted { name } => {
            let name = name.trim();
            if name.is_empty() {
                vec![Effect::Notify(Notice::NameRequired)]
            } else {
                vec![Effect::CreateReference {
                    name: name.to_owned(),
                }]
            }
        }
        Msg::UploadRequested { staged } => match staged {
            // Nothing staged: abort quietly, exactly zero requests.
            None => Vec::new(),
            Some(file) => vec![Effect::UploadArtifact { file }],
        },
        Msg::ArtifactSelected { index } => {
            state.select(index);
            Vec::new()
        }
        Msg::TestRequested => match state.selected_name() {
            None => vec![Effect::Notify(Notice::SelectionRequired)],
            Some(name) => vec![Effect::RunTest {
                name: name.to_owned(),
            }],
        },
        Msg::DownloadRequested { index } => match state.artifact_name(index) {
            None => Vec::new(),
            Some(name) => vec![Effect::Download {
                name: name.to_owned(),
            }],
        },
        Msg::ListFetched { list } => {
            state.replace_artifacts(list);
            Vec::new()
        }
        // A failed refresh keeps the previously rendered collection.
        Msg::ListFetchFailed => vec![Effect::Notify(Notice::ListUnavailable)],
        Msg::CreateSettled { outcome } => match outcome {
            OpOutcome::Success => vec![
                Effect::Notify(Notice::ReferenceCreated),
                Effect::FetchList,
            ],
            OpOutcome::Failed => vec![Effect::Notify(Notice::CreateFailed)],
        },
        Msg::UploadSettled { outcome } => match outcome {
            OpOutcome::Success => vec![Effect::Notify(Notice::UploadDone), Effect::FetchList],
            OpOutcome::Failed => vec![Effect::Notify(Notice::UploadFailed)],
        },
        Msg::TestSettled { outcome } => match outcome {
            OpOutcome::Success => vec![Effect::Notify(Notice::TestCompleted)],
            OpOutcome::Failed => vec![Effect::Notify(Notice::TestFailed)],
        },
        Msg::DownloadSettled { saved_to } => match saved_to {
            Some(path) => vec![Effect::Notify(Notice::DownloadSaved { path })],
            None => vec![Effect::Notify(Notice::DownloadFailed)],
        },
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
