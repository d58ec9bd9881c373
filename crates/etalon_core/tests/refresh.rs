use std::sync::Once;

use etalon_core::{update, AppState, ArtifactDescriptor, Effect, Msg, Notice};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(rig_logging::initialize_for_tests);
}

fn descriptors(names: &[&str]) -> Vec<ArtifactDescriptor> {
    names
        .iter()
        .map(|name| ArtifactDescriptor {
            file: (*name).to_owned(),
        })
        .collect()
}

fn refreshed(state: AppState, names: &[&str]) -> AppState {
    let (state, effects) = update(
        state,
        Msg::ListFetched {
            list: descriptors(names),
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn startup_triggers_initial_fetch() {
    init_logging();
    let (_state, effects) = update(AppState::new(), Msg::Started);
    assert_eq!(effects, vec![Effect::FetchList]);
}

#[test]
fn list_view_shown_triggers_fetch() {
    init_logging();
    let state = refreshed(AppState::new(), &["a.bin"]);
    let (_state, effects) = update(state, Msg::ListViewShown);
    assert_eq!(effects, vec![Effect::FetchList]);
}

#[test]
fn refresh_with_unchanged_list_is_idempotent() {
    init_logging();
    let first = refreshed(AppState::new(), &["a.bin", "b.bin"]);
    let second = refreshed(first.clone(), &["a.bin", "b.bin"]);

    assert_eq!(first, second);
    assert_eq!(first.view(), second.view());
}

#[test]
fn refresh_replaces_collection_wholesale() {
    init_logging();
    let state = refreshed(AppState::new(), &["a", "b"]);
    assert_eq!(state.artifact_count(), 2);

    let state = refreshed(state, &["c"]);
    let view = state.view();

    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.options.len(), 1);
    assert_eq!(view.rows[0].name, "c");
    assert_eq!(view.options[0].value, "c");
    assert!(!view.rows.iter().any(|row| row.name == "a" || row.name == "b"));
}

#[test]
fn failed_refresh_leaves_previous_views_intact() {
    init_logging();
    let mut state = refreshed(AppState::new(), &["a.bin", "b.bin"]);
    assert!(state.consume_dirty());
    let before = state.view();

    let (state, effects) = update(state, Msg::ListFetchFailed);

    assert_eq!(effects, vec![Effect::Notify(Notice::ListUnavailable)]);
    assert_eq!(state.view(), before);
    assert_eq!(state.artifact_count(), 2);
}

#[test]
fn both_views_derive_from_one_snapshot() {
    init_logging();
    let state = refreshed(AppState::new(), &["x.bin", "y.bin", "z.bin"]);
    let view = state.view();

    assert_eq!(view.rows.len(), view.options.len());
    for (row, option) in view.rows.iter().zip(view.options.iter()) {
        assert_eq!(row.name, option.value);
        assert_eq!(option.value, option.label);
    }
}

#[test]
fn download_target_survives_decoding() {
    init_logging();
    let state = refreshed(AppState::new(), &["foo bar&baz"]);
    let view = state.view();

    let target = &view.rows[0].download_target;
    let query = target
        .strip_prefix("/api/download?")
        .expect("download target points at the download endpoint");
    let decoded: Vec<(String, String)> = url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    assert_eq!(decoded, vec![("file".to_owned(), "foo bar&baz".to_owned())]);
}

#[test]
fn refresh_resets_selection_to_first_entry() {
    init_logging();
    let state = refreshed(AppState::new(), &["a", "b", "c"]);
    let (state, _) = update(state, Msg::ArtifactSelected { index: 2 });
    assert_eq!(state.selected_name(), Some("c"));

    let state = refreshed(state, &["b", "c"]);
    assert_eq!(state.selected_name(), Some("b"));

    let state = refreshed(state, &[]);
    assert_eq!(state.selected_name(), None);
}

#[test]
fn selection_ignores_out_of_range_index() {
    init_logging();
    let state = refreshed(AppState::new(), &["a", "b"]);
    let (state, effects) = update(state, Msg::ArtifactSelected { index: 5 });

    assert!(effects.is_empty());
    assert_eq!(state.selected_name(), Some("a"));
}
