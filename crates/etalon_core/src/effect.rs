#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Query the device for the current reference list.
    FetchList,
    /// Ask the device to capture a new reference under `name`.
    CreateReference { name: String },
    /// Send the staged file's bytes and original name to the device store.
    UploadArtifact { file: crate::StagedFile },
    /// Run a comparison test against the named reference.
    RunTest { name: String },
    /// Fetch the named artifact's JSON content and save it locally.
    Download { name: String },
    /// Surface a notification to the operator.
    Notify(crate::Notice),
}
