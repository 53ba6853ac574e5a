use std::fs;
use std::path::Path;

use async_trait::async_trait;
use recentpick_core::commands::{show_recent_files, RecentCategory, SessionStatus};
use recentpick_core::config::Config;
use recentpick_core::host::{Host, SurfaceId, SurfaceKind};
use recentpick_core::keyboard::{Key, KeyEvent, KeyboardHub, Modifiers, Platform};
use recentpick_core::model::{QueryOutcome, QueryPayload, RawQueryResult};
use recentpick_core::placement::{PlacementOutcome, PlacementPreference};
use recentpick_core::query_engine::{QueryEngine, QueryError, SqliteQueryEngine};
use recentpick_core::vault_index;
use recentpick_core::workspace::Workspace;
use serde_json::json;

enum FakeEngine {
    Offline,
    Broken,
    Rows(RawQueryResult),
}

#[async_trait(?Send)]
impl QueryEngine for FakeEngine {
    fn check_available(&self) -> Result<(), QueryError> {
        match self {
            Self::Offline => Err(QueryError::Unavailable("engine is offline".to_string())),
            _ => Ok(()),
        }
    }

    async fn query(&self, _text: &str) -> Result<QueryOutcome, QueryError> {
        match self {
            Self::Offline => unreachable!("availability is checked first"),
            Self::Broken => Err(QueryError::Execution("engine crashed".to_string())),
            Self::Rows(table) => Ok(Ok(QueryPayload::Table(table.clone()))),
        }
    }
}

fn write_note(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn ctrl_enter() -> KeyEvent {
    KeyEvent::new(
        Key::Enter,
        Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        },
    )
}

#[tokio::test]
async fn unavailable_engine_notifies_and_opens_nothing() {
    let hub = KeyboardHub::new();
    let mut workspace = Workspace::new(None).with_platform(Platform::Linux);

    let session = show_recent_files(
        &FakeEngine::Offline,
        &mut workspace,
        &hub,
        &Config::default(),
        RecentCategory::Modified,
    )
    .await;

    assert!(session.is_none());
    assert_eq!(workspace.take_notices(), vec!["engine is offline".to_string()]);
    assert_eq!(hub.listener_count(), 0);
}

#[tokio::test]
async fn failing_query_still_opens_an_empty_picker() {
    let hub = KeyboardHub::new();
    let mut workspace = Workspace::new(None).with_platform(Platform::Linux);

    let session = show_recent_files(
        &FakeEngine::Broken,
        &mut workspace,
        &hub,
        &Config::default(),
        RecentCategory::Created,
    )
    .await
    .expect("picker opens");

    assert!(session.picker().is_open());
    assert!(session.picker().ranked_matches().is_empty());
    assert_eq!(session.picker().placeholder(), "Search recently created files...");
    assert!(workspace.take_notices().is_empty());
}

#[tokio::test]
async fn modifier_purpose_follows_placement_preference() {
    let hub = KeyboardHub::new();
    let mut workspace = Workspace::new(None).with_platform(Platform::Mac);
    let config = Config {
        placement: PlacementPreference::Window,
        ..Config::default()
    };
    let table = RawQueryResult::new(&["Name", "Path"], vec![vec![json!("A"), json!("a.md")]]);

    let session = show_recent_files(
        &FakeEngine::Rows(table),
        &mut workspace,
        &hub,
        &config,
        RecentCategory::Modified,
    )
    .await
    .expect("picker opens");

    let instruction = &session.picker().instructions()[2];
    assert_eq!(instruction.command, "⌘+↵");
    assert_eq!(instruction.purpose, "to open in a new window");
}

#[tokio::test]
async fn aborted_session_releases_its_listener() {
    let hub = KeyboardHub::new();
    let mut workspace = Workspace::new(None).with_platform(Platform::Linux);
    let table = RawQueryResult::new(&["Name", "Path"], vec![vec![json!("A"), json!("a.md")]]);

    let mut session = show_recent_files(
        &FakeEngine::Rows(table),
        &mut workspace,
        &hub,
        &Config::default(),
        RecentCategory::Modified,
    )
    .await
    .expect("picker opens");
    assert_eq!(hub.listener_count(), 1);

    session.abort();
    assert_eq!(hub.listener_count(), 0);
    assert_eq!(
        session.handle_key(&mut workspace, &KeyEvent::plain(Key::Enter)),
        SessionStatus::Closed
    );
}

#[tokio::test]
async fn indexed_vault_opens_selection_in_new_tab() {
    let vault = tempfile::tempdir().unwrap();
    let data = tempfile::tempdir().unwrap();
    write_note(vault.path(), "Report.md", "---\ntags: [work]\n---\nQ3 numbers\n");
    write_note(vault.path(), "Random.md", "nothing here #misc\n");
    write_note(vault.path(), ".trash/Report old.md", "hidden\n");

    let db_path = data.path().join("index.sqlite3");
    assert_eq!(vault_index::rebuild(vault.path(), &db_path).unwrap(), 2);

    let config = Config {
        vault_root: Some(vault.path().to_path_buf()),
        index_db_path: db_path.clone(),
        workspace_path: data.path().join("workspace.json"),
        ..Config::default()
    };
    let engine = SqliteQueryEngine::new(&db_path);
    let hub = KeyboardHub::new();
    let mut workspace =
        Workspace::new(config.vault_root.clone()).with_platform(Platform::Linux);

    let mut session = show_recent_files(
        &engine,
        &mut workspace,
        &hub,
        &config,
        RecentCategory::Modified,
    )
    .await
    .expect("picker opens");
    assert_eq!(session.picker().candidates().len(), 2);

    for ch in "rpt".chars() {
        assert_eq!(
            session.handle_key(&mut workspace, &KeyEvent::char(ch)),
            SessionStatus::Open
        );
    }
    let selected = session.picker().selected().cloned().unwrap();
    assert_eq!(selected.name, "Report");
    assert_eq!(selected.tags, Some(vec!["work".to_string()]));
    assert!(selected.date.is_some());

    let status = session.handle_key(&mut workspace, &ctrl_enter());
    assert_eq!(status, SessionStatus::Opened(PlacementOutcome::Created(SurfaceId(2))));
    assert_eq!(hub.listener_count(), 0);

    let surface = workspace.surface(SurfaceId(2)).unwrap();
    assert_eq!(surface.kind, SurfaceKind::Tab);
    assert_eq!(surface.file.as_deref(), Some("Report.md"));
    assert_eq!(workspace.most_recent_surface(), Some(SurfaceId(2)));
}

#[tokio::test]
async fn plain_enter_reuses_current_surface_and_missing_file_notifies() {
    let vault = tempfile::tempdir().unwrap();
    write_note(vault.path(), "kept.md", "x\n");
    let table = RawQueryResult::new(
        &["Name", "Path"],
        vec![
            vec![json!("gone"), json!("gone.md")],
            vec![json!("kept"), json!("kept.md")],
        ],
    );
    let hub = KeyboardHub::new();
    let mut workspace =
        Workspace::new(Some(vault.path().to_path_buf())).with_platform(Platform::Linux);

    let engine = FakeEngine::Rows(table);
    let config = Config::default();

    let mut session = show_recent_files(&engine, &mut workspace, &hub, &config, RecentCategory::Modified)
        .await
        .expect("picker opens");
    let status = session.handle_key(&mut workspace, &KeyEvent::plain(Key::Enter));
    assert!(matches!(status, SessionStatus::Opened(PlacementOutcome::Failed(_))));
    assert_eq!(workspace.take_notices(), vec!["File not found.".to_string()]);
    assert_eq!(workspace.surfaces().len(), 1);

    let mut session = show_recent_files(&engine, &mut workspace, &hub, &config, RecentCategory::Modified)
        .await
        .expect("picker opens");
    session.handle_key(&mut workspace, &KeyEvent::plain(Key::Down));
    let status = session.handle_key(&mut workspace, &KeyEvent::plain(Key::Enter));
    assert_eq!(status, SessionStatus::Opened(PlacementOutcome::Reused(SurfaceId(1))));
    assert_eq!(
        workspace.surface(SurfaceId(1)).and_then(|s| s.file.as_deref()),
        Some("kept.md")
    );
}
