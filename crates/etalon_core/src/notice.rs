use std::fmt;

/// Operator-facing notifications raised by the update loop.
///
/// Wording lives here so the frontends and the tests agree on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The list query failed; the rendered collection is stale but intact.
    ListUnavailable,
    /// A create request needs a non-empty name.
    NameRequired,
    ReferenceCreated,
    CreateFailed,
    UploadDone,
    UploadFailed,
    /// A test run needs a selected reference.
    SelectionRequired,
    /// The test finished; results render on the device's own display.
    TestCompleted,
    TestFailed,
    DownloadSaved { path: String },
    DownloadFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Notice::ReferenceCreated
            | Notice::UploadDone
            | Notice::TestCompleted
            | Notice::DownloadSaved { .. } => Severity::Info,
            Notice::ListUnavailable
            | Notice::NameRequired
            | Notice::CreateFailed
            | Notice::UploadFailed
            | Notice::SelectionRequired
            | Notice::TestFailed
            | Notice::DownloadFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::ListUnavailable => {
                write!(f, "Could not fetch the reference list from the device")
            }
            Notice::NameRequired => write!(f, "Enter a name for the new reference"),
            Notice::ReferenceCreated => write!(f, "Reference created"),
            Notice::CreateFailed => write!(f, "The device could not create the reference"),
            Notice::UploadDone => write!(f, "Reference file uploaded"),
            Notice::UploadFailed => write!(f, "Could not upload the reference file"),
            Notice::SelectionRequired => write!(f, "Choose a reference first"),
            Notice::TestCompleted => {
                write!(f, "Test finished; see the results on the device display")
            }
            Notice::TestFailed => write!(f, "Test run failed"),
            Notice::DownloadSaved { path } => write!(f, "Saved {path}"),
            Notice::DownloadFailed => write!(f, "Could not download the reference artifact"),
        }
    }
}
