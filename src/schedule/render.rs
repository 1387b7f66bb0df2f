use super::days::DayBucket;
use super::layout::ScheduleColumns;

pub const DEFAULT_COLUMN_WIDTH: usize = 44;
const COLUMN_GAP: &str = "  ";

/// The `line_cost` lines of one day: heading, one line per task, then blank spacing.
pub fn day_lines(day: &DayBucket) -> Vec<String> {
    let mut lines = Vec::with_capacity(day.line_cost);
    if day.header_lines() > 0 {
        if day.is_overdue {
            lines.push(format!("{} (overdue)", day.formatted_label));
        } else {
            lines.push(day.formatted_label.clone());
        }
    }
    for task in &day.tasks {
        lines.push(format!(
            "  [{}] {} - {}",
            task.effort_level, task.name, task.role_name
        ));
    }
    while lines.len() < day.line_cost {
        lines.push(String::new());
    }
    lines
}

pub fn render_single_column(days: &[DayBucket]) -> String {
    let mut out = String::new();
    for day in days {
        for line in day_lines(day) {
            out.push_str(&line);
            out.push('\n');
        }
    }
    out
}

/// Left and right columns side by side, each cut or padded to `column_width`.
pub fn render_columns(columns: &ScheduleColumns, column_width: usize) -> String {
    let left: Vec<String> = columns.left.iter().flat_map(day_lines).collect();
    let right: Vec<String> = columns.right.iter().flat_map(day_lines).collect();
    let rows = left.len().max(right.len());

    let mut out = String::new();
    for row in 0..rows {
        let left_cell = fit_to_width(left.get(row).map(String::as_str).unwrap_or(""), column_width);
        let right_cell = right.get(row).map(String::as_str).unwrap_or("");
        let line = format!("{left_cell}{COLUMN_GAP}{right_cell}");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn fit_to_width(text: &str, width: usize) -> String {
    let mut cell: String = text.chars().take(width).collect();
    let used = cell.chars().count();
    cell.push_str(&" ".repeat(width - used));
    cell
}
