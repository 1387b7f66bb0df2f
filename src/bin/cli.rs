use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use habit_planner::schedule::render;
use habit_planner::{
    AppConfig, EffortLevel, SqliteTaskStore, TaskDraft, TaskStatus, TaskStore, export_to_csv,
    export_to_json, import_from_csv, import_from_json, print_view, schedule_view,
    scheduling_window,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "habit-planner", about = "Interactive Seven Habits planner")]
struct Args {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// SQLite database, overriding the config file.
    #[arg(long)]
    db: Option<PathBuf>,
    /// Date treated as today (YYYY-MM-DD); defaults to the local date.
    #[arg(long)]
    today: Option<NaiveDate>,
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if len > widths[ci] {
                widths[ci] = len;
            }
        }
    }

    let mut sep = String::new();
    sep.push('+');
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&format_row(headers, &widths));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        out.push_str(&format_row(&cells, &widths));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn format_row(cells: &[&str], widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.iter().zip(widths) {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(width - cell.chars().count()));
        line.push_str(" |");
    }
    line
}

fn print_help() {
    println!(
        "Commands:\n  help                                        Show this help\n  roles                                       List roles\n  role add <name...>                          Create a role\n  role rename <id> <name...>                  Rename a role\n  role show <id>                              Show a role and its tasks\n  role delete <id>                            Delete a role without tasks\n  tasks [active|completed]                    List tasks\n  task add <role_id> <effort> <date|-> <name...>\n                                              Create a task (effort Low|Medium|High)\n  task edit <id> <role_id> <effort> <date|-> <name...>\n                                              Replace a task's fields\n  task done <id>                              Mark a task complete\n  task undo <id>                              Reactivate a completed task\n  task delete <id>                            Delete a task\n  schedule                                    Show the single column schedule\n  print                                       Show the two column printable schedule\n  config                                      Show schedule settings\n  export <json|csv> <path>                    Write roles and tasks to disk\n  import <json|csv> <path>                    Replace roles and tasks from disk\n  quit|exit                                   Exit"
    );
}

fn parse_id(input: Option<&str>) -> Option<i64> {
    input.and_then(|s| s.parse::<i64>().ok())
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn parse_date_arg(input: &str) -> Result<Option<NaiveDate>, String> {
    if input == "-" {
        return Ok(None);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| format!("Invalid date '{input}' (YYYY-MM-DD or -)"))
}

/// Parses `<role_id> <effort> <date|-> <name...>`.
fn parse_draft<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<TaskDraft, String> {
    let role_id = parse_id(parts.next()).ok_or("Invalid role id")?;
    let effort = parts
        .next()
        .ok_or("Missing effort level")?
        .parse::<EffortLevel>()
        .map_err(|err| err.to_string())?;
    let scheduled_date = parse_date_arg(parts.next().ok_or("Missing date")?)?;
    let name = rest_of_line(parts);
    let mut draft = TaskDraft::new(role_id, name, effort);
    draft.scheduled_date = scheduled_date;
    Ok(draft)
}

fn show_roles(store: &SqliteTaskStore) {
    match store.list_roles() {
        Ok(roles) => {
            let rows: Vec<Vec<String>> = roles
                .iter()
                .map(|r| vec![r.id.to_string(), r.name.clone()])
                .collect();
            println!("{}", render_text_table(&["id", "name"], &rows));
        }
        Err(e) => println!("Error: {e}"),
    }
}

fn show_tasks(store: &SqliteTaskStore, status: TaskStatus, today: NaiveDate) {
    match store.list_tasks(status) {
        Ok(tasks) => {
            let rows: Vec<Vec<String>> = tasks
                .iter()
                .map(|t| {
                    let date = match t.task.scheduled_date {
                        Some(d) if d < today && !t.task.is_complete => format!("{d} !"),
                        Some(d) => d.to_string(),
                        None => String::new(),
                    };
                    vec![
                        t.task.id.to_string(),
                        t.task.name.clone(),
                        t.role_name.clone(),
                        t.task.effort_level.to_string(),
                        date,
                    ]
                })
                .collect();
            println!(
                "{}",
                render_text_table(&["id", "name", "role", "effort", "scheduled"], &rows)
            );
        }
        Err(e) => println!("Error: {e}"),
    }
}

fn main() -> anyhow::Result<()> {
    habit_planner::init_tracing();
    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(db) = args.db {
        config.database_path = db;
    }
    let store = SqliteTaskStore::open(&config.database_path).with_context(|| {
        format!("opening task database {}", config.database_path.display())
    })?;
    let today = args
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    println!("Seven Habits Planner (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "roles" => show_roles(&store),
            "role" => match parts.next() {
                Some("add") => {
                    let name = rest_of_line(parts);
                    match store.create_role(&name) {
                        Ok(role) => println!("Created role {} '{}'.", role.id, role.name),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                Some("rename") => {
                    let Some(id) = parse_id(parts.next()) else {
                        println!("Usage: role rename <id> <name...>");
                        continue;
                    };
                    match store.rename_role(id, &rest_of_line(parts)) {
                        Ok(role) => println!("Renamed role {} to '{}'.", role.id, role.name),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                Some("show") => {
                    let Some(id) = parse_id(parts.next()) else {
                        println!("Usage: role show <id>");
                        continue;
                    };
                    match (store.find_role(id), store.tasks_for_role(id)) {
                        (Ok(Some(role)), Ok(tasks)) => {
                            println!("Role {}: {}", role.id, role.name);
                            let rows: Vec<Vec<String>> = tasks
                                .iter()
                                .map(|t| {
                                    vec![
                                        t.id.to_string(),
                                        t.name.clone(),
                                        t.effort_level.to_string(),
                                        t.scheduled_date
                                            .map(|d| d.to_string())
                                            .unwrap_or_default(),
                                        if t.is_complete { "yes" } else { "no" }.to_string(),
                                    ]
                                })
                                .collect();
                            println!(
                                "{}",
                                render_text_table(
                                    &["id", "name", "effort", "scheduled", "complete"],
                                    &rows
                                )
                            );
                        }
                        (Ok(None), _) => println!("Role {id} not found."),
                        (Err(e), _) | (_, Err(e)) => println!("Error: {e}"),
                    }
                }
                Some("delete") => {
                    let Some(id) = parse_id(parts.next()) else {
                        println!("Usage: role delete <id>");
                        continue;
                    };
                    match store.delete_role(id) {
                        Ok(()) => println!("Deleted role {id}."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                _ => println!("Usage: role <add|rename|show|delete> ..."),
            },
            "tasks" => {
                let status = match parts.next() {
                    None => TaskStatus::Active,
                    Some(s) => match s.parse::<TaskStatus>() {
                        Ok(status) => status,
                        Err(e) => {
                            println!("{e}");
                            continue;
                        }
                    },
                };
                show_tasks(&store, status, today);
            }
            "task" => match parts.next() {
                Some("add") => match parse_draft(parts) {
                    Ok(draft) => {
                        let (min, max) = scheduling_window(today);
                        if let Some(date) = draft.scheduled_date {
                            if date < min || date > max {
                                println!("Note: {date} is outside {min}..{max}.");
                            }
                        }
                        match store.create_task(&draft) {
                            Ok(task) => println!("Created task {} '{}'.", task.id, task.name),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    Err(e) => println!("{e}"),
                },
                Some("edit") => {
                    let Some(id) = parse_id(parts.next()) else {
                        println!("Usage: task edit <id> <role_id> <effort> <date|-> <name...>");
                        continue;
                    };
                    match parse_draft(parts) {
                        Ok(draft) => match store.update_task(id, &draft) {
                            Ok(task) => println!("Updated task {}.", task.id),
                            Err(e) => println!("Error: {e}"),
                        },
                        Err(e) => println!("{e}"),
                    }
                }
                Some(action @ ("done" | "undo")) => {
                    let Some(id) = parse_id(parts.next()) else {
                        println!("Usage: task {action} <id>");
                        continue;
                    };
                    match store.set_task_complete(id, action == "done") {
                        Ok(task) if task.is_complete => println!("Completed task {id}."),
                        Ok(_) => println!("Reactivated task {id}."),
                        Err(e) => println!("Error: {e}"),
                    }
                }
                Some("delete") => {
                    let Some(id) = parse_id(parts.next()) else {
                        println!("Usage: task delete <id>");
                        continue;
                    };
                    match store.delete_task(id) {
                        Ok(true) => println!("Deleted task {id}."),
                        Ok(false) => println!("Task {id} not found."),
                        Err(e) => println!("Error deleting task: {e}"),
                    }
                }
                _ => println!("Usage: task <add|edit|done|undo|delete> ..."),
            },
            "schedule" => match schedule_view(&store, today, &config.schedule) {
                Ok(days) => print!("{}", render::render_single_column(&days)),
                Err(e) => println!("Schedule error: {e}"),
            },
            "print" => match print_view(&store, today, &config.print) {
                Ok(columns) => print!(
                    "{}",
                    render::render_columns(&columns, render::DEFAULT_COLUMN_WIDTH)
                ),
                Err(e) => println!("Schedule error: {e}"),
            },
            "config" => {
                for (name, view) in [("schedule", &config.schedule), ("print", &config.print)] {
                    println!(
                        "{name:<9}: max_lines={} max_future_days={} header_lines={} include_overdue={}",
                        view.max_lines, view.max_future_days, view.header_lines, view.include_overdue
                    );
                }
            }
            "export" | "import" => {
                let fmt = parts.next();
                let path = parts.next();
                let (Some(fmt), Some(path)) = (fmt, path) else {
                    println!("Usage: {cmd} <json|csv> <path>");
                    continue;
                };
                let result = match (cmd, fmt) {
                    ("export", "json") => export_to_json(&store, path),
                    ("export", "csv") => export_to_csv(&store, path),
                    ("import", "json") => import_from_json(&store, path),
                    ("import", "csv") => import_from_csv(&store, path),
                    _ => {
                        println!("Unknown format '{fmt}' (json|csv)");
                        continue;
                    }
                };
                match result {
                    Ok(snapshot) if cmd == "export" => println!(
                        "Exported {} roles and {} tasks to {path}.",
                        snapshot.roles.len(),
                        snapshot.tasks.len()
                    ),
                    Ok(snapshot) => println!(
                        "Imported {} roles and {} tasks from {path}.",
                        snapshot.roles.len(),
                        snapshot.tasks.len()
                    ),
                    Err(e) => println!("Error: {e}"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
    Ok(())
}
