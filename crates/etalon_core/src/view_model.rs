/// Snapshot of everything the frontends render, produced in one pass by
/// [`crate::AppState::view`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    /// Display list: one row per artifact, in server order.
    pub rows: Vec<ListRowView>,
    /// Selection control: one option per artifact, same order as `rows`.
    pub options: Vec<SelectOptionView>,
    pub selected: Option<usize>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRowView {
    pub name: String,
    /// Download affordance, relative to the device origin.
    pub download_target: String,
}

/// Value and label both equal the artifact name, by contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOptionView {
    pub value: String,
    pub label: String,
}

/// Builds the download target for an artifact name.
///
/// The name is escaped for safe inclusion in a query parameter; decoding the
/// `file` parameter recovers the name exactly.
pub fn download_target(name: &str) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("file", name);
    format!("/api/download?{}", query.finish())
}
