#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Console started; kick off the initial list refresh.
    Started,
    /// The reference list view regained focus.
    ListViewShown,
    /// Operator submitted a name for a new reference capture.
    CreateSubmitted { name: String },
    /// Operator staged a file for upload (`None` when nothing was staged).
    UploadRequested { staged: Option<crate::StagedFile> },
    /// Operator picked an entry in the selection control.
    ArtifactSelected { index: usize },
    /// Operator asked to run a test against the current selection.
    TestRequested,
    /// Operator asked to download the artifact at `index` in the list view.
    DownloadRequested { index: usize },
    /// List query settled with the authoritative collection.
    ListFetched { list: Vec<crate::ArtifactDescriptor> },
    /// List query failed; the previously rendered collection stays intact.
    ListFetchFailed,
    /// Create request settled.
    CreateSettled { outcome: crate::OpOutcome },
    /// Upload request settled.
    UploadSettled { outcome: crate::OpOutcome },
    /// Test request settled; success means the device reported the "ok" status.
    TestSettled { outcome: crate::OpOutcome },
    /// Download settled; `Some` names the saved local file.
    DownloadSettled { saved_to: Option<String> },
    /// Fallback for placeholder wiring.
    NoOp,
}
