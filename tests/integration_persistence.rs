// Saved rounds surviving a restart, through each file-backed store.
use placeguess::places::{PlaceRecord, Places};
use placeguess::session::{FormFields, PersistedGame};
use placeguess::store::{open_store, JsonFileStore, SessionStore, SqliteStore, StoreBackend, STORAGE_KEY};
use placeguess::view::{GameView, TextView};
use placeguess::{ControllerOptions, SessionController};
use tempfile::tempdir;

fn places() -> Places {
    Places::from_records(
        ["Paris", "Prague", "Porto", "Lisbon", "London"]
            .iter()
            .map(|n| PlaceRecord::new(*n))
            .collect(),
    )
}

fn play_and_drop<S: SessionStore>(store: S) {
    let mut c = SessionController::new(TextView::default(), store, ControllerOptions::default())
        .with_places(places());
    c.view_mut().restore_form(FormFields {
        start_letter: "p".into(),
        time_limit: "60".into(),
    });
    c.start_from_form().unwrap();
    c.check_guess("paris, porto");
    c.update_timer();
    c.update_timer();
}

fn resume<S: SessionStore>(store: S) -> SessionController<TextView, S> {
    let mut c = SessionController::new(TextView::default(), store, ControllerOptions::default())
        .with_places(places());
    assert!(c.restore(), "a saved round should be found");
    c
}

fn assert_resumed<S: SessionStore>(c: &mut SessionController<TextView, S>) {
    assert!(c.state().is_active);
    assert!(!c.state().is_ended);
    assert_eq!(c.state().start_letter, Some('p'));
    assert_eq!(c.state().correct_count, 2);
    assert_eq!(c.state().remaining_seconds, 58);
    assert!(c.is_timer_running());
    assert_eq!(c.view().form().time_limit, "60");
    assert_eq!(
        c.view().guessed,
        Some(vec!["Paris".to_string(), "Porto".to_string()])
    );

    // the restored list still blocks duplicates
    c.check_guess("paris");
    assert_eq!(c.state().correct_count, 2);
    c.check_guess("prague");
    assert_eq!(c.state().correct_count, 3);
}

#[test]
fn json_store_resumes_round() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state").join("session.json");

    play_and_drop(JsonFileStore::with_path(&path));
    assert!(path.exists());

    let mut c = resume(JsonFileStore::with_path(&path));
    assert_resumed(&mut c);
}

#[test]
fn sqlite_store_resumes_round() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.db");

    play_and_drop(SqliteStore::open(&path).unwrap());

    let mut c = resume(SqliteStore::open(&path).unwrap());
    assert_resumed(&mut c);
}

#[test]
fn boxed_store_from_backend_choice() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.db");

    play_and_drop(open_store(StoreBackend::Sqlite, Some(path.as_path())).unwrap());

    let mut c = resume(open_store(StoreBackend::Sqlite, Some(path.as_path())).unwrap());
    assert_resumed(&mut c);
}

#[test]
fn saved_record_uses_camel_case_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    play_and_drop(JsonFileStore::with_path(&path));

    let value = JsonFileStore::with_path(&path)
        .get(STORAGE_KEY)
        .unwrap()
        .unwrap();
    assert_eq!(value["correctCount"], 2);
    assert_eq!(value["isActive"], true);
    assert_eq!(value["remainingSeconds"], 58);
    assert!(value.get("savedAt").is_some());

    let saved: PersistedGame = serde_json::from_value(value).unwrap();
    assert_eq!(saved.guessed.len(), 2);
}

#[test]
fn reset_is_what_gets_restored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");

    let mut c = SessionController::new(
        TextView::default(),
        JsonFileStore::with_path(&path),
        ControllerOptions::default(),
    )
    .with_places(places());
    c.start_game('l', 30).unwrap();
    c.check_guess("london");
    c.reset_game();
    drop(c);

    let c = resume(JsonFileStore::with_path(&path));
    assert!(!c.state().is_active);
    assert_eq!(c.state().correct_count, 0);
    assert!(!c.is_timer_running());
}

#[test]
fn truncated_save_file_is_replaced_by_next_round() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, b"{truncated").unwrap();

    let mut c = SessionController::new(
        TextView::default(),
        JsonFileStore::with_path(&path),
        ControllerOptions::default(),
    )
    .with_places(places());
    assert!(!c.restore());
    c.start_game('p', 0).unwrap();
    c.check_guess("paris");
    drop(c);

    let c = resume(JsonFileStore::with_path(&path));
    assert_eq!(c.state().correct_count, 1);
    assert_eq!(c.state().guessed[0].name, "Paris");
}
