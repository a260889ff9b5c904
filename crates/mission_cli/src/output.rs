//! Terminal rendering of tasks, the board and memories.

use crate::error::CliResult;
use chrono::DateTime;
use mission_core::{
    Memory, MemoryCategory, MemoryScreen, MemoryStats, Task, TaskBoard, TaskStatus,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn format_timestamp(epoch_ms: i64) -> String {
    DateTime::from_timestamp_millis(epoch_ms)
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| epoch_ms.to_string())
}

pub fn print_task(task: &Task, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(task),
        OutputFormat::Table => {
            println!("{}", task_line(task));
            Ok(())
        }
    }
}

pub fn print_tasks(tasks: &[Task], format: OutputFormat) -> CliResult<()> {
    if format == OutputFormat::Json {
        return print_json(tasks);
    }
    if tasks.is_empty() {
        println!("No tasks.");
    }
    for task in tasks {
        println!("{}", task_line(task));
    }
    Ok(())
}

pub fn print_board(board: &TaskBoard, format: OutputFormat) -> CliResult<()> {
    if format == OutputFormat::Json {
        return print_json(board);
    }
    for status in TaskStatus::ALL {
        let tasks = board.column(status);
        println!("== {} ({})", status.label(), tasks.len());
        for task in tasks {
            println!("  {}", task_line(task));
        }
    }
    Ok(())
}

fn task_line(task: &Task) -> String {
    let mut line = format!(
        "{}  [{}] {:<6} {:<8} {}",
        task.id,
        task.status.as_str(),
        task.priority.as_str(),
        task.assigned_to.as_str(),
        task.title
    );
    if let Some(completed_at) = task.completed_at {
        line.push_str(&format!("  (completed {})", format_timestamp(completed_at)));
    }
    line
}

pub fn print_memory(memory: &Memory, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(memory),
        OutputFormat::Table => {
            println!("{}", memory_line(memory));
            Ok(())
        }
    }
}

pub fn print_memory_screen(screen: &MemoryScreen, format: OutputFormat) -> CliResult<()> {
    let visible = screen.visible();
    if format == OutputFormat::Json {
        return print_json(&visible);
    }
    if visible.is_empty() {
        println!("No memories.");
    }
    for memory in visible {
        println!("{}", memory_line(memory));
    }
    println!("-- {} total", screen.stats.total);
    Ok(())
}

fn memory_line(memory: &Memory) -> String {
    let mut line = format!(
        "{}  {}  {:<10} {}",
        memory.id,
        format_timestamp(memory.created_at),
        memory.category.as_str(),
        memory.content
    );
    if let Some(source) = memory.source.as_deref() {
        line.push_str(&format!("  (source: {source})"));
    }
    line
}

pub fn print_stats(stats: &MemoryStats, format: OutputFormat) -> CliResult<()> {
    if format == OutputFormat::Json {
        return print_json(stats);
    }
    println!("Total: {}", stats.total);
    for category in MemoryCategory::ALL {
        println!("  {:<11} {}", category.label(), stats.by_category.get(category));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::format_timestamp;

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(format_timestamp(0), "1970-01-01 00:00");
        assert_eq!(format_timestamp(1_771_459_200_000), "2026-02-19 00:00");
    }
}
