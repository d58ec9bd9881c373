use crate::view_model::{download_target, AppViewModel, ListRowView, SelectOptionView};

/// One reference artifact as known to the client.
///
/// `file` is the unique, server-assigned name. The device also reports
/// per-entry metadata such as size; the client does not model it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub file: String,
}

/// A file staged by the operator for upload, consumed when the upload
/// request is dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Outcome of one settled device operation, as seen by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpOutcome {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    artifacts: Vec<ArtifactDescriptor>,
    selected: Option<usize>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders both dependent views from the current collection snapshot.
    ///
    /// The display rows and the selection options are built in the same
    /// iteration, so they can never diverge in count or order.
    pub fn view(&self) -> AppViewModel {
        let mut rows = Vec::with_capacity(self.artifacts.len());
        let mut options = Vec::with_capacity(self.artifacts.len());
        for descriptor in &self.artifacts {
            rows.push(ListRowView {
                name: descriptor.file.clone(),
                download_target: download_target(&descriptor.file),
            });
            options.push(SelectOptionView {
                value: descriptor.file.clone(),
                label: descriptor.file.clone(),
            });
        }
        AppViewModel {
            rows,
            options,
            selected: self.selected,
            dirty: self.dirty,
        }
    }

    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    /// Name of the currently selected artifact, if any.
    pub fn selected_name(&self) -> Option<&str> {
        self.selected
            .and_then(|index| self.artifacts.get(index))
            .map(|descriptor| descriptor.file.as_str())
    }

    pub(crate) fn artifact_name(&self, index: usize) -> Option<&str> {
        self.artifacts.get(index).map(|d| d.file.as_str())
    }

    /// Replaces the collection wholesale with a fresh snapshot.
    ///
    /// Selection is positional: rebuilding the selection control resets it
    /// to the first entry, or clears it when the collection is empty.
    pub(crate) fn replace_artifacts(&mut self, artifacts: Vec<ArtifactDescriptor>) {
        self.artifacts = artifacts;
        self.selected = if self.artifacts.is_empty() {
            None
        } else {
            Some(0)
        };
        self.dirty = true;
    }

    /// Moves the selection; out-of-range indices are ignored.
    pub(crate) fn select(&mut self, index: usize) {
        if index < self.artifacts.len() && self.selected != Some(index) {
            self.selected = Some(index);
            self.dirty = true;
        }
    }

    /// Returns whether a re-render is due, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
