use chrono::NaiveDate;
use habit_planner::{
    EffortLevel, ScheduledTaskSource, SqliteTaskStore, StoreError, TaskDraft, TaskStatus,
    TaskStore,
};
use rusqlite::{Connection, params};
use tempfile::TempDir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn sqlite_store_persists_across_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("planner.db");

    {
        let store = SqliteTaskStore::open(&path).expect("open store");
        let role = store.create_role("Husband").unwrap();
        store
            .create_task(&TaskDraft::new(role.id, "Date night", EffortLevel::Medium).scheduled_on(d(2024, 6, 14)))
            .unwrap();
    }

    let store = SqliteTaskStore::open(&path).expect("reopen store");
    let roles = store.list_roles().unwrap();
    assert_eq!(roles.len(), 1);
    assert_eq!(roles[0].name, "Husband");
    let tasks = store.tasks_for_role(roles[0].id).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].scheduled_date, Some(d(2024, 6, 14)));
    assert!(!tasks[0].is_complete);
}

#[test]
fn roles_are_listed_by_name_and_trimmed() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    store.create_role("Teacher").unwrap();
    store.create_role("  Athlete ").unwrap();
    let names: Vec<String> = store
        .list_roles()
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Athlete", "Teacher"]);
}

#[test]
fn role_with_linked_tasks_cannot_be_deleted() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let role = store.create_role("Volunteer").unwrap();
    let task = store
        .create_task(&TaskDraft::new(role.id, "Food bank shift", EffortLevel::High))
        .unwrap();

    match store.delete_role(role.id) {
        Err(StoreError::Conflict(message)) => assert!(message.contains("1 task(s)")),
        other => panic!("expected conflict, got {other:?}"),
    }

    assert!(store.delete_task(task.id).unwrap());
    store.delete_role(role.id).unwrap();
    assert!(store.find_role(role.id).unwrap().is_none());
    assert!(matches!(
        store.delete_role(role.id),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn tasks_require_an_existing_role_and_a_name() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    assert!(matches!(
        store.create_task(&TaskDraft::new(42, "Orphan", EffortLevel::Low)),
        Err(StoreError::InvalidData(_))
    ));
    let role = store.create_role("Student").unwrap();
    assert!(matches!(
        store.create_task(&TaskDraft::new(role.id, "  ", EffortLevel::Low)),
        Err(StoreError::InvalidData(_))
    ));
}

#[test]
fn update_complete_and_reactivate_round_trip() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let home = store.create_role("Homeowner").unwrap();
    let work = store.create_role("Engineer").unwrap();
    let task = store
        .create_task(&TaskDraft::new(home.id, "Fix gutter", EffortLevel::Low))
        .unwrap();

    let updated = store
        .update_task(
            task.id,
            &TaskDraft::new(work.id, "Fix build", EffortLevel::High).scheduled_on(d(2024, 6, 12)),
        )
        .unwrap();
    assert_eq!(updated.role_id, work.id);
    assert_eq!(updated.name, "Fix build");
    assert_eq!(updated.effort_level, EffortLevel::High);
    assert_eq!(updated.scheduled_date, Some(d(2024, 6, 12)));

    let done = store.set_task_complete(task.id, true).unwrap();
    assert!(done.is_complete);
    assert!(store.list_tasks(TaskStatus::Active).unwrap().is_empty());
    assert_eq!(store.list_tasks(TaskStatus::Completed).unwrap().len(), 1);

    let back = store.set_task_complete(task.id, false).unwrap();
    assert!(!back.is_complete);
    assert!(matches!(
        store.set_task_complete(999, true),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn active_tasks_list_dated_first_then_by_name() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let role = store.create_role("Parent").unwrap();
    for (name, date) in [
        ("Zoo trip", Some(d(2024, 6, 15))),
        ("Buy shoes", None),
        ("Apply to camp", None),
        ("Dentist", Some(d(2024, 6, 11))),
    ] {
        let mut draft = TaskDraft::new(role.id, name, EffortLevel::Medium);
        draft.scheduled_date = date;
        store.create_task(&draft).unwrap();
    }

    let names: Vec<String> = store
        .list_tasks(TaskStatus::Active)
        .unwrap()
        .into_iter()
        .map(|listing| {
            assert_eq!(listing.role_name, "Parent");
            listing.task.name
        })
        .collect();
    assert_eq!(names, vec!["Dentist", "Zoo trip", "Apply to camp", "Buy shoes"]);
}

#[test]
fn scheduled_query_applies_bounds_and_completion_filter() {
    let store = SqliteTaskStore::open_in_memory().unwrap();
    let role = store.create_role("Friend").unwrap();
    let make = |name: &str, date: NaiveDate| {
        store
            .create_task(&TaskDraft::new(role.id, name, EffortLevel::Low).scheduled_on(date))
            .unwrap()
    };
    make("Old letter", d(2024, 5, 1));
    make("Lunch", d(2024, 6, 10));
    make("Birthday", d(2024, 6, 10));
    make("Too far", d(2024, 7, 30));
    let done = make("Done already", d(2024, 6, 11));
    store.set_task_complete(done.id, true).unwrap();
    store
        .create_task(&TaskDraft::new(role.id, "Someday", EffortLevel::Low))
        .unwrap();

    let rows = store
        .query_scheduled_tasks(true, d(2024, 6, 30), None)
        .unwrap();
    let names: Vec<&str> = rows.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Old letter", "Birthday", "Lunch"]);
    assert!(rows.iter().all(|t| t.role_name == "Friend"));
    assert_eq!(rows[0].scheduled_date, "2024-05-01");

    let rows = store
        .query_scheduled_tasks(true, d(2024, 6, 30), Some(d(2024, 6, 10)))
        .unwrap();
    assert_eq!(rows.len(), 2);

    let rows = store
        .query_scheduled_tasks(false, d(2024, 6, 30), Some(d(2024, 6, 10)))
        .unwrap();
    assert_eq!(rows.len(), 3);
}

#[test]
fn malformed_dates_bypass_the_query_bounds() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("planner.db");
    let store = SqliteTaskStore::open(&path).unwrap();
    let role = store.create_role("Secretary").unwrap();
    store
        .create_task(&TaskDraft::new(role.id, "Minutes", EffortLevel::Low).scheduled_on(d(2024, 6, 11)))
        .unwrap();
    store
        .create_task(&TaskDraft::new(role.id, "Next year", EffortLevel::Low).scheduled_on(d(2025, 6, 11)))
        .unwrap();

    let raw = Connection::open(&path).unwrap();
    raw.execute(
        "INSERT INTO tasks (role_id, name, effort_level, scheduled_date, is_complete)
         VALUES (?1, 'Garbled', 'Low', '2024-6-9', 0)",
        params![role.id],
    )
    .unwrap();

    let rows = store
        .query_scheduled_tasks(true, d(2024, 6, 13), Some(d(2024, 6, 10)))
        .unwrap();
    let dates: Vec<&str> = rows.iter().map(|t| t.scheduled_date.as_str()).collect();
    assert_eq!(dates, vec!["2024-06-11", "2024-6-9"]);

    match store.list_tasks(TaskStatus::Active) {
        Err(StoreError::Corrupt(message)) => assert!(message.contains("2024-6-9")),
        other => panic!("expected corrupt row error, got {other:?}"),
    }
}
