mod common;

use blockpage_control::{HttpLayoutStore, LayoutServer, LayoutServerConfig};
use blockpage_core::{BlockId, Geometry, IVec2};
use blockpage_ui::{
    BlockRegistry, BlockSpec, Editor, EditorAction, EditorConfig, HostEvent, Interactable,
};
use common::{home_records, record, Call, RecordingStore};
use std::sync::Arc;

async fn editor_on_home(store: RecordingStore) -> (Editor<RecordingStore>, Arc<RecordingStore>) {
    let store = Arc::new(store);
    let mut editor = Editor::new(
        Arc::clone(&store),
        BlockRegistry::with_defaults(),
        &EditorConfig::default(),
    );
    editor.navigate("/home");
    editor.settle().await;
    (editor, store)
}

fn at(x: i32, y: i32) -> IVec2 {
    IVec2::new(x, y)
}

#[tokio::test]
async fn menu_add_creates_a_block_on_the_current_page() {
    let (mut editor, store) = editor_on_home(RecordingStore::new()).await;

    editor.apply(EditorAction::ToggleDeveloperMode);
    editor.apply(EditorAction::ContextMenu { at: at(600, 400) });
    assert!(editor.coordinator().menu().is_open());
    assert_eq!(
        editor.coordinator().menu().available_components().to_vec(),
        vec!["cup_preview".to_string(), "interactable".to_string()]
    );

    editor.apply(EditorAction::MenuAdd {
        kind: "cup_preview".to_string(),
    });
    assert!(!editor.coordinator().menu().is_open());
    assert_eq!(editor.host().len(), 1);
    editor.settle().await;

    let stored = store.records();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].page_path, "/home");
    assert_eq!(stored[0].component_type, "cup_preview");
}

#[tokio::test]
async fn menu_delete_removes_the_block_under_the_cursor() {
    let (mut editor, store) = editor_on_home(RecordingStore::with_records(home_records())).await;

    editor.apply(EditorAction::SetDeveloperMode { on: true });
    editor.apply(EditorAction::ContextMenu { at: at(350, 50) });
    assert_eq!(
        editor.coordinator().menu().target(),
        Some(&BlockId::new("b"))
    );
    editor.apply(EditorAction::MenuDelete);
    editor.settle().await;

    assert_eq!(editor.host().ids(), vec![BlockId::new("a")]);
    assert_eq!(store.calls().last(), Some(&Call::Delete(BlockId::new("b"))));
}

#[tokio::test]
async fn menu_delete_without_target_is_rejected() {
    let (mut editor, store) = editor_on_home(RecordingStore::with_records(home_records())).await;
    let calls_before = store.calls().len();

    editor.apply(EditorAction::SetDeveloperMode { on: true });
    editor.apply(EditorAction::ContextMenu { at: at(1500, 900) });
    let events = editor.apply(EditorAction::MenuDelete);

    assert!(matches!(events.as_slice(), [HostEvent::IntentRejected(_)]));
    assert_eq!(editor.host().len(), 2);
    assert_eq!(store.calls().len(), calls_before);
}

#[tokio::test]
async fn context_menu_stays_closed_outside_developer_mode() {
    let (mut editor, _store) = editor_on_home(RecordingStore::new()).await;

    editor.apply(EditorAction::ContextMenu { at: at(10, 10) });
    assert!(!editor.coordinator().menu().is_open());

    editor.apply(EditorAction::ToggleDeveloperMode);
    editor.apply(EditorAction::ContextMenu { at: at(10, 10) });
    editor.apply(EditorAction::DocumentClick);
    assert!(!editor.coordinator().menu().is_open());
}

#[tokio::test]
async fn drag_through_the_editor_is_persisted() {
    let (mut editor, store) = editor_on_home(RecordingStore::with_records(home_records())).await;

    editor.apply(EditorAction::ToggleDeveloperMode);
    editor.apply(EditorAction::PointerDown { at: at(20, 20) });
    editor.apply(EditorAction::PointerMove { at: at(25, 60) });
    editor.apply(EditorAction::PointerUp);
    editor.settle().await;

    assert_eq!(
        store.records()[0].geometry(),
        Geometry::new(15, 50, 200, 150)
    );
}

#[tokio::test]
async fn leaving_developer_mode_mid_drag_freezes_the_block() {
    let (mut editor, _store) = editor_on_home(RecordingStore::with_records(home_records())).await;

    editor.apply(EditorAction::ToggleDeveloperMode);
    editor.apply(EditorAction::PointerDown { at: at(20, 20) });
    editor.apply(EditorAction::PointerMove { at: at(30, 30) });
    editor.apply(EditorAction::ToggleDeveloperMode);
    editor.apply(EditorAction::PointerMove { at: at(400, 400) });
    editor.apply(EditorAction::PointerUp);
    editor.settle().await;

    let a = editor.host().instance(&BlockId::new("a")).unwrap();
    assert_eq!(a.geometry(), Geometry::new(20, 20, 200, 150));
}

#[tokio::test]
async fn redirect_click_navigates() {
    let mut registry = BlockRegistry::new();
    registry
        .register(BlockSpec::new("link", || Box::new(Interactable)).with_redirect("/about"))
        .unwrap();
    let store = Arc::new(RecordingStore::with_records(vec![
        record("l", "/home", "link", Geometry::new(0, 0, 100, 100)),
        record("z", "/about", "link", Geometry::new(0, 0, 50, 50)),
    ]));
    let mut editor = Editor::new(Arc::clone(&store), registry, &EditorConfig::default());
    editor.navigate("/home");
    editor.settle().await;

    let events = editor.apply(EditorAction::Click { at: at(40, 40) });
    assert!(events.contains(&HostEvent::NavigationRequested("/about".to_string())));
    assert_eq!(editor.current_route(), "/about");
    editor.settle().await;

    assert_eq!(editor.host().active_page(), Some("/about"));
    assert_eq!(editor.host().ids(), vec![BlockId::new("z")]);
}

#[tokio::test]
async fn clicks_in_developer_mode_do_not_redirect() {
    let mut registry = BlockRegistry::new();
    registry
        .register(BlockSpec::new("link", || Box::new(Interactable)).with_redirect("/about"))
        .unwrap();
    let store = Arc::new(RecordingStore::with_records(vec![record(
        "l",
        "/home",
        "link",
        Geometry::new(0, 0, 100, 100),
    )]));
    let mut config = EditorConfig::default();
    config.developer_mode = true;
    let mut editor = Editor::new(Arc::clone(&store), registry, &config);
    editor.navigate("/home");
    editor.settle().await;

    editor.apply(EditorAction::Click { at: at(40, 40) });
    assert_eq!(editor.current_route(), "/home");
}

#[tokio::test]
async fn session_against_the_reference_backend() {
    let server = LayoutServer::new(LayoutServerConfig::new(0)).with_records(home_records());
    let db = server.db();
    let (addr, _handle) = server.spawn().await.unwrap();
    let store = Arc::new(HttpLayoutStore::new(&format!("http://{}", addr)).unwrap());

    let mut editor = Editor::new(store, BlockRegistry::with_defaults(), &EditorConfig::default());
    editor.navigate("/home");
    editor.settle().await;
    assert_eq!(editor.host().len(), 2);

    editor.apply(EditorAction::ToggleDeveloperMode);
    editor.apply(EditorAction::ContextMenu { at: at(320, 20) });
    editor.apply(EditorAction::MenuDelete);
    editor.apply(EditorAction::ContextMenu { at: at(900, 600) });
    editor.apply(EditorAction::MenuAdd {
        kind: "interactable".to_string(),
    });
    let events = editor.settle().await;
    assert!(!events
        .iter()
        .any(|e| matches!(e, HostEvent::PersistFailed { .. })));

    let stored = db.all().await;
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|r| r.uuid != BlockId::new("b")));
    assert!(stored.iter().any(|r| r.component_type == "interactable"));
}
