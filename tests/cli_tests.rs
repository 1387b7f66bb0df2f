use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::TempDir;

#[allow(deprecated)]
fn run_cli(dir: &TempDir, script: &str) -> assert_cmd::assert::Assert {
    let db = dir.path().join("planner.db");
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.current_dir(dir.path())
        .env_remove("HABIT_PLANNER_CONFIG")
        .env_remove("HABIT_PLANNER_DB")
        .arg("--db")
        .arg(db)
        .arg("--today")
        .arg("2024-06-10")
        .write_stdin(script.to_string())
        .assert()
}

#[test]
fn cli_creates_roles_and_tasks() {
    let dir = TempDir::new().unwrap();
    run_cli(
        &dir,
        "role add Community Leader\ntask add 1 High 2024-06-11 Organize cleanup\ntasks\nquit\n",
    )
    .success()
    .stdout(str_contains("Created role 1 'Community Leader'."))
    .stdout(str_contains("Created task 1 'Organize cleanup'."))
    .stdout(str_contains("Organize cleanup"))
    .stdout(str_contains("2024-06-11"));
}

#[test]
fn cli_refuses_to_delete_role_with_tasks() {
    let dir = TempDir::new().unwrap();
    run_cli(
        &dir,
        "role add Mentor\ntask add 1 Low - Weekly call\nrole delete 1\ntask delete 1\nrole delete 1\nquit\n",
    )
    .success()
    .stdout(str_contains("cannot delete role: 1 task(s) are still linked"))
    .stdout(str_contains("Deleted task 1."))
    .stdout(str_contains("Deleted role 1."));
}

#[test]
fn cli_schedule_lists_overdue_day_first() {
    let dir = TempDir::new().unwrap();
    let assert = run_cli(
        &dir,
        "role add Gardener\ntask add 1 Medium 2024-06-08 Prune roses\nschedule\nquit\n",
    )
    .success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let overdue = output
        .find("Saturday, 06/08 (overdue)")
        .expect("overdue heading");
    let today = output.find("Monday, 06/10").expect("today heading");
    assert!(overdue < today);
    assert!(output.contains("[Medium] Prune roses - Gardener"));
}

#[test]
fn cli_completed_tasks_leave_the_schedule() {
    let dir = TempDir::new().unwrap();
    let assert = run_cli(
        &dir,
        "role add Runner\ntask add 1 High 2024-06-10 Tempo run\ntask done 1\nschedule\ntasks completed\nquit\n",
    )
    .success()
    .stdout(str_contains("Completed task 1."));
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let schedule_part = output
        .split("Completed task 1.")
        .last()
        .unwrap_or_default();
    assert!(!schedule_part.contains("[High] Tempo run"));
    assert!(schedule_part.contains("Tempo run"));
}

#[test]
fn cli_export_and_import_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let export = dir.path().join("backup.json");
    let path = export.to_string_lossy();
    let script = format!(
        "role add Scout\nexport json {path}\nrole add Temporary\nimport json {path}\nroles\nquit\n"
    );
    let assert = run_cli(&dir, &script)
        .success()
        .stdout(str_contains("Exported 1 roles and 0 tasks"))
        .stdout(str_contains("Imported 1 roles and 0 tasks"));
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let after_import = output.split("Imported").last().unwrap_or_default();
    assert!(after_import.contains("Scout"));
    assert!(!after_import.contains("Temporary"));
}

#[test]
fn cli_data_survives_restart() {
    let dir = TempDir::new().unwrap();
    run_cli(&dir, "role add Historian\nquit\n").success();
    run_cli(&dir, "roles\nquit\n")
        .success()
        .stdout(str_contains("Historian"));
}

#[test]
fn cli_reports_bad_task_input() {
    let dir = TempDir::new().unwrap();
    run_cli(
        &dir,
        "role add Cook\ntask add 1 Huge - Bake bread\ntask add 1 Low 06/12 Bake bread\ntask done 9\nquit\n",
    )
    .success()
    .stdout(str_contains("unknown effort level"))
    .stdout(str_contains("Invalid date '06/12'"))
    .stdout(str_contains("task 9 not found"));
}
