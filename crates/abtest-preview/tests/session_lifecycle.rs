use abtest_model::{FunnelStage, Persona};
use abtest_preview::{FileStore, PreviewSession, SessionStore};
use abtest_test_utils::{active_test, variant_id};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::fs;

#[test]
fn test_file_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preview.json");
    let test = active_test("t-7");

    let mut session = PreviewSession::new(FileStore::new(&path));
    session.load().unwrap();
    session.set_persona(Some(Persona::Parent));
    session.set_stage(Some(FunnelStage::Consideration));
    session.force_variant(&test, variant_id("t-7-b")).unwrap();
    session.apply().unwrap();
    drop(session);

    let mut restarted = PreviewSession::new(FileStore::new(&path));
    let overrides = restarted.load().unwrap().clone();
    assert_eq!(overrides.persona, Some(Persona::Parent));
    assert_eq!(overrides.stage, Some(FunnelStage::Consideration));
    assert_eq!(
        restarted.effective_variant(&test.id),
        Some(&variant_id("t-7-b"))
    );
}

#[test]
fn test_corrupt_file_loads_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preview.json");
    fs::write(&path, "[1, 2").unwrap();

    let mut session = PreviewSession::new(FileStore::new(&path));
    assert!(session.load().unwrap().is_empty());

    session.set_persona(Some(Persona::Student));
    session.apply().unwrap();
    let stored = FileStore::new(&path).load().unwrap().unwrap();
    assert_eq!(stored.persona, Some(Persona::Student));
}

#[test]
fn test_reset_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preview.json");

    let mut session = PreviewSession::new(FileStore::new(&path));
    session.load().unwrap();
    session.set_persona(Some(Persona::Donor));
    session.apply().unwrap();
    assert!(path.exists());

    session.reset().unwrap();
    assert!(!path.exists());
}

#[derive(Debug, Clone)]
enum Edit {
    Persona(Option<Persona>),
    Stage(Option<FunnelStage>),
    Force(bool),
}

fn edit() -> impl Strategy<Value = Edit> {
    let persona = prop::option::of(prop::sample::select(Persona::ALL.to_vec()));
    let stage = prop::option::of(prop::sample::select(FunnelStage::ALL.to_vec()));
    prop_oneof![
        persona.prop_map(Edit::Persona),
        stage.prop_map(Edit::Stage),
        any::<bool>().prop_map(Edit::Force),
    ]
}

proptest! {
    #[test]
    fn prop_apply_persists_pending(edits in prop::collection::vec(edit(), 0..12)) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.json");
        let test = active_test("t-1");

        let mut session = PreviewSession::new(FileStore::new(&path));
        session.load().unwrap();
        for edit in edits {
            match edit {
                Edit::Persona(p) => session.set_persona(p),
                Edit::Stage(s) => session.set_stage(s),
                Edit::Force(true) => session.force_variant(&test, variant_id("t-1-b")).unwrap(),
                Edit::Force(false) => {
                    session.unforce(&test.id);
                }
            }
        }
        let pending = session.pending().clone();
        session.apply().unwrap();

        prop_assert!(!session.is_dirty());
        prop_assert!(session.applied().same_selection(&pending));
        let stored = FileStore::new(&path).load().unwrap().unwrap();
        prop_assert_eq!(&stored, session.applied());
    }
}
