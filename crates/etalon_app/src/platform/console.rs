//! Interactive console shell: menu loop, table rendering, notifications.

use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use etalon_core::{AppViewModel, Msg, Notice, Severity, StagedFile};

use super::app::{dispatch_msg, SharedState};
use super::effects::EffectRunner;

const MENU: &[&str] = &[
    "Show references",
    "New reference",
    "Upload reference file",
    "Run test",
    "Download reference",
    "Quit",
];

/// How long to keep draining after an action so fast settlements print
/// before the next prompt.
const SETTLE_WINDOW: Duration = Duration::from_millis(400);

pub fn run_loop(
    device_url: &str,
    shared: &Arc<Mutex<SharedState>>,
    msg_rx: &mpsc::Receiver<Msg>,
    msg_tx: &mpsc::Sender<Msg>,
    effects: &EffectRunner,
) -> anyhow::Result<()> {
    let theme = ColorfulTheme::default();

    // Give the startup refresh a chance to settle before the first menu.
    pump_for(SETTLE_WINDOW, device_url, shared, msg_rx, effects);

    loop {
        pump_pending(device_url, shared, msg_rx, effects);

        let choice = Select::with_theme(&theme)
            .with_prompt("Action")
            .items(MENU)
            .default(0)
            .interact()?;

        match choice {
            0 => {
                let _ = msg_tx.send(Msg::ListViewShown);
            }
            1 => {
                let name: String = Input::with_theme(&theme)
                    .with_prompt("Reference name")
                    .allow_empty(true)
                    .interact_text()?;
                let _ = msg_tx.send(Msg::CreateSubmitted { name });
            }
            2 => {
                let path: String = Input::with_theme(&theme)
                    .with_prompt("File to upload (empty to cancel)")
                    .allow_empty(true)
                    .interact_text()?;
                let _ = msg_tx.send(Msg::UploadRequested {
                    staged: stage_file(path.trim()),
                });
            }
            3 => {
                if let Some(index) = prompt_selection(&theme, shared)? {
                    let _ = msg_tx.send(Msg::ArtifactSelected { index });
                }
                let _ = msg_tx.send(Msg::TestRequested);
            }
            4 => {
                if let Some(index) = prompt_selection(&theme, shared)? {
                    let _ = msg_tx.send(Msg::DownloadRequested { index });
                }
            }
            _ => break,
        }

        pump_for(SETTLE_WINDOW, device_url, shared, msg_rx, effects);
    }

    Ok(())
}

/// Offers the current reference options; `None` when there is nothing to pick.
fn prompt_selection(
    theme: &ColorfulTheme,
    shared: &Arc<Mutex<SharedState>>,
) -> anyhow::Result<Option<usize>> {
    let view = shared.lock().expect("lock shared state").state.view();
    if view.options.is_empty() {
        return Ok(None);
    }
    let labels: Vec<&str> = view.options.iter().map(|o| o.label.as_str()).collect();
    let index = Select::with_theme(theme)
        .with_prompt("Reference")
        .items(&labels)
        .default(view.selected.unwrap_or(0))
        .interact()?;
    Ok(Some(index))
}

fn pump_pending(
    device_url: &str,
    shared: &Arc<Mutex<SharedState>>,
    msg_rx: &mpsc::Receiver<Msg>,
    effects: &EffectRunner,
) {
    while let Ok(msg) = msg_rx.try_recv() {
        handle(device_url, shared, effects, msg);
    }
}

fn pump_for(
    window: Duration,
    device_url: &str,
    shared: &Arc<Mutex<SharedState>>,
    msg_rx: &mpsc::Receiver<Msg>,
    effects: &EffectRunner,
) {
    let deadline = Instant::now() + window;
    loop {
        let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
            break;
        };
        match msg_rx.recv_timeout(remaining) {
            Ok(msg) => handle(device_url, shared, effects, msg),
            Err(_) => break,
        }
    }
}

fn handle(
    device_url: &str,
    shared: &Arc<Mutex<SharedState>>,
    effects: &EffectRunner,
    msg: Msg,
) {
    if let Some(view) = dispatch_msg(shared, effects, msg) {
        print!("{}", format_artifact_table(&view, device_url));
    }
}

/// Prints one operator notification with a local timestamp.
pub fn notify(notice: &Notice) {
    let stamp = chrono::Local::now().format("%H:%M:%S");
    match notice.severity() {
        Severity::Info => println!("[{stamp}] {notice}"),
        Severity::Error => println!("[{stamp}] ! {notice}"),
    }
}

/// Renders the reference table with absolute download links.
///
/// Pure string building: the same snapshot always renders the same text.
pub fn format_artifact_table(view: &AppViewModel, device_url: &str) -> String {
    let origin = device_url.trim_end_matches('/');
    let mut out = format!("References ({}):\n", view.rows.len());
    if view.rows.is_empty() {
        out.push_str("  (none on the device)\n");
        return out;
    }
    let width = view
        .rows
        .iter()
        .map(|row| row.name.chars().count())
        .max()
        .unwrap_or(0);
    for (index, row) in view.rows.iter().enumerate() {
        let marker = if view.selected == Some(index) { '>' } else { ' ' };
        out.push_str(&format!(
            "{marker} {name:<width$}  {origin}{target}\n",
            name = row.name,
            target = row.download_target,
        ));
    }
    out
}

/// Reads the staged file into memory, keeping its original file name.
///
/// Returns `None` for an empty path or an unreadable file; read failures are
/// reported here since the update loop never sees local file errors.
fn stage_file(path: &str) -> Option<StagedFile> {
    if path.is_empty() {
        return None;
    }
    let path = Path::new(path);
    let file_name = path.file_name()?.to_string_lossy().into_owned();
    match std::fs::read(path) {
        Ok(bytes) => Some(StagedFile { file_name, bytes }),
        Err(err) => {
            println!("Cannot read {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use etalon_core::{update, AppState, ArtifactDescriptor};

    fn refreshed_view(names: &[&str]) -> AppViewModel {
        let list = names
            .iter()
            .map(|name| ArtifactDescriptor {
                file: name.to_string(),
            })
            .collect();
        let (state, _) = update(AppState::new(), Msg::ListFetched { list });
        state.view()
    }

    #[test]
    fn table_renders_rows_with_absolute_links() {
        let view = refreshed_view(&["cal-01", "cal-02"]);
        let table = format_artifact_table(&view, "http://192.168.4.1/");

        assert!(table.contains("References (2):"));
        assert!(table.contains("> cal-01"));
        assert!(table.contains("http://192.168.4.1/api/download?file=cal-01"));
        assert!(table.contains("  cal-02"));
        // The trailing slash in the device URL must not double up.
        assert!(!table.contains("1//api/download"));
    }

    #[test]
    fn table_rendering_is_deterministic() {
        let view = refreshed_view(&["cal-01", "cal-02"]);
        assert_eq!(
            format_artifact_table(&view, "http://192.168.4.1"),
            format_artifact_table(&view, "http://192.168.4.1")
        );
    }

    #[test]
    fn empty_table_names_the_absence() {
        let view = refreshed_view(&[]);
        let table = format_artifact_table(&view, "http://192.168.4.1");
        assert!(table.contains("(none on the device)"));
    }

    #[test]
    fn staged_file_keeps_original_name_and_bytes() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("ref-a.json");
        std::fs::write(&path, b"{\"points\":[]}").unwrap();

        let staged = stage_file(path.to_str().unwrap()).unwrap();
        assert_eq!(staged.file_name, "ref-a.json");
        assert_eq!(staged.bytes, b"{\"points\":[]}");
    }

    #[test]
    fn empty_path_stages_nothing() {
        assert!(stage_file("").is_none());
    }

    #[test]
    fn unreadable_path_stages_nothing() {
        assert!(stage_file("definitely/not/here.json").is_none());
    }
}
