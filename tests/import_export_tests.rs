use chrono::NaiveDate;
use habit_planner::{
    EffortLevel, SqliteTaskStore, StoreError, TaskDraft, TaskStatus, TaskStore, export_to_csv,
    export_to_json, import_from_csv, import_from_json,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn build_sample_store() -> SqliteTaskStore {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let coach = store.create_role("Coach").unwrap();
    let writer = store.create_role("Writer, poet").unwrap();
    store
        .create_task(&TaskDraft::new(coach.id, "Plan practice", EffortLevel::High).scheduled_on(d(2024, 6, 11)))
        .unwrap();
    let done = store
        .create_task(&TaskDraft::new(writer.id, "Draft \"chapter\" one", EffortLevel::Medium))
        .unwrap();
    store.set_task_complete(done.id, true).unwrap();
    store
        .create_task(&TaskDraft::new(writer.id, "Edit notes", EffortLevel::Low))
        .unwrap();
    store
}

#[test]
fn json_export_import_round_trip() {
    let source = build_sample_store();
    let file = NamedTempFile::new().expect("temp file");

    let exported = export_to_json(&source, file.path()).expect("export json");
    assert_eq!(exported.roles.len(), 2);
    assert_eq!(exported.tasks.len(), 3);

    let target = SqliteTaskStore::open_in_memory().unwrap();
    target.create_role("Will be replaced").unwrap();
    let imported = import_from_json(&target, file.path()).expect("import json");

    assert_eq!(imported, exported);
    assert_eq!(target.snapshot().unwrap(), exported);
    assert_eq!(target.list_tasks(TaskStatus::Completed).unwrap().len(), 1);
}

#[test]
fn csv_export_import_round_trip() {
    let source = build_sample_store();
    let file = NamedTempFile::new().expect("temp file");

    let exported = export_to_csv(&source, file.path()).expect("export csv");
    let raw = std::fs::read_to_string(file.path()).unwrap();
    assert!(raw.starts_with("kind,id,name,role_id,effort_level,scheduled_date,is_complete"));
    assert!(raw.contains("task,1,Plan practice,1,High,2024-06-11,false"));

    let target = SqliteTaskStore::open_in_memory().unwrap();
    let imported = import_from_csv(&target, file.path()).expect("import csv");
    assert_eq!(imported, exported);

    let coach_tasks = target.tasks_for_role(1).unwrap();
    assert_eq!(coach_tasks[0].scheduled_date, Some(d(2024, 6, 11)));
    assert_eq!(target.find_role(2).unwrap().unwrap().name, "Writer, poet");
}

#[test]
fn import_rejects_tasks_pointing_at_missing_roles() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "kind,id,name,role_id,effort_level,scheduled_date,is_complete").unwrap();
    writeln!(file, "role,1,Mentor,,,,").unwrap();
    writeln!(file, "task,1,Coffee chat,7,Low,2024-06-12,false").unwrap();
    file.flush().unwrap();

    let store = build_sample_store();
    let before = store.snapshot().unwrap();
    let result = import_from_csv(&store, file.path());
    assert!(matches!(result, Err(StoreError::InvalidData(_))));
    assert_eq!(store.snapshot().unwrap(), before);
}

#[test]
fn import_rejects_unknown_kinds_and_bad_values() {
    let store = SqliteTaskStore::open_in_memory().unwrap();

    let mut unknown = NamedTempFile::new().unwrap();
    writeln!(unknown, "kind,id,name,role_id,effort_level,scheduled_date,is_complete").unwrap();
    writeln!(unknown, "project,1,Nope,,,,").unwrap();
    unknown.flush().unwrap();
    assert!(matches!(
        import_from_csv(&store, unknown.path()),
        Err(StoreError::InvalidData(_))
    ));

    let mut bad_effort = NamedTempFile::new().unwrap();
    writeln!(bad_effort, "kind,id,name,role_id,effort_level,scheduled_date,is_complete").unwrap();
    writeln!(bad_effort, "role,1,Mentor,,,,").unwrap();
    writeln!(bad_effort, "task,1,Coffee chat,1,Extreme,,false").unwrap();
    bad_effort.flush().unwrap();
    assert!(matches!(
        import_from_csv(&store, bad_effort.path()),
        Err(StoreError::InvalidData(_))
    ));
}

#[test]
fn json_import_of_malformed_file_fails() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{\"roles\": [").unwrap();
    file.flush().unwrap();

    let store = SqliteTaskStore::open_in_memory().unwrap();
    assert!(matches!(
        import_from_json(&store, file.path()),
        Err(StoreError::Serialization(_))
    ));
}
