//! `mission` command line front end for the task board and memory log.
//!
//! Every command goes through `Bindings`, so an unreachable store degrades to
//! empty output and skipped writes instead of aborting.

mod error;
mod output;

use clap::{Args, Parser, Subcommand};
use error::{CliError, CliResult};
use mission_core::store::mutations::{
    CreateMemory, CreateTask, DeleteMemory, DeleteTask, SeedMemories, SeedTasks, UpdateMemory,
    UpdateTask, UpdateTaskStatus,
};
use mission_core::store::queries::{ListMemories, ListTasks, MemoryStatsQuery};
use mission_core::{
    Assignee, Bindings, CategorySelection, MemoryCategory, MemoryPatch, MemoryScreen,
    MissionConfig, Mutation, MutationOutcome, NewMemory, NewTask, Store, TaskBoard, TaskFilter,
    TaskPatch, TaskPriority, TaskStatus,
};
use output::OutputFormat;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "mission")]
#[command(about = "Task board and memory log")]
#[command(version)]
struct Cli {
    #[arg(long, short, global = true, help = "Output in JSON format")]
    json: bool,

    #[arg(long, short = 'c', global = true, help = "Path to config file")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Path to the store file, overriding the config")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check core linkage.
    Ping,
    /// Task board commands.
    #[command(subcommand)]
    Tasks(TaskCommand),
    /// Show tasks grouped by status.
    Board {
        #[arg(long, value_parser = parse_assignee)]
        assignee: Option<Assignee>,
    },
    /// Memory log commands.
    #[command(subcommand)]
    Memories(MemoryCommand),
    /// Insert the initial tasks and memories.
    Seed {
        #[arg(long, conflicts_with = "memories_only")]
        tasks_only: bool,
        #[arg(long)]
        memories_only: bool,
    },
}

#[derive(Subcommand)]
enum TaskCommand {
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
        #[arg(long, value_parser = parse_assignee)]
        assignee: Option<Assignee>,
    },
    Add {
        title: String,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, short, value_parser = parse_assignee)]
        assignee: Assignee,
        #[arg(long, short, value_parser = parse_priority, default_value = "medium")]
        priority: TaskPriority,
    },
    Status {
        id: Uuid,
        #[arg(value_parser = parse_status)]
        status: TaskStatus,
    },
    Edit {
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_assignee)]
        assignee: Option<Assignee>,
        #[arg(long, value_parser = parse_priority)]
        priority: Option<TaskPriority>,
    },
    Rm(RemoveArgs),
}

#[derive(Subcommand)]
enum MemoryCommand {
    List {
        #[arg(long, short)]
        search: Option<String>,
        #[arg(long, value_parser = parse_category)]
        category: Option<MemoryCategory>,
    },
    Add {
        content: String,
        #[arg(long, value_parser = parse_category)]
        category: MemoryCategory,
        #[arg(long)]
        source: Option<String>,
    },
    Edit {
        id: Uuid,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_parser = parse_category)]
        category: Option<MemoryCategory>,
    },
    Rm(RemoveArgs),
    Stats,
}

#[derive(Args)]
struct RemoveArgs {
    id: Uuid,
    /// Skip the confirmation prompt.
    #[arg(long, short)]
    yes: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    let config = load_config(&cli)?;

    if let Err(err) = mission_core::init_logging_from_config(&config.logging) {
        eprintln!("warning: logging disabled: {err}");
    }

    if let Command::Ping = cli.command {
        println!("mission_core ping={}", mission_core::ping());
        println!("mission_core version={}", mission_core::core_version());
        return Ok(());
    }

    if !config.store.in_memory {
        if let Some(parent) = config.store.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let bindings = Bindings::new(Store::open(&config.store));
    if !bindings.state().is_connected() {
        eprintln!("warning: store {}", bindings.state());
    }

    match cli.command {
        Command::Ping => Ok(()),
        Command::Tasks(command) => run_tasks(&bindings, command, format),
        Command::Board { assignee } => {
            let view = bindings.use_query(ListTasks {
                filter: TaskFilter {
                    status: None,
                    assigned_to: assignee,
                },
            });
            output::print_board(&TaskBoard::from_tasks(view.data), format)
        }
        Command::Memories(command) => run_memories(&bindings, command, format),
        Command::Seed {
            tasks_only,
            memories_only,
        } => {
            if !memories_only {
                if let Some(count) = apply(&bindings, SeedTasks)? {
                    println!("Seeded {count} tasks.");
                }
            }
            if !tasks_only {
                if let Some(count) = apply(&bindings, SeedMemories)? {
                    println!("Seeded {count} memories.");
                }
            }
            Ok(())
        }
    }
}

fn run_tasks(bindings: &Bindings, command: TaskCommand, format: OutputFormat) -> CliResult<()> {
    match command {
        TaskCommand::List { status, assignee } => {
            let view = bindings.use_query(ListTasks {
                filter: TaskFilter {
                    status,
                    assigned_to: assignee,
                },
            });
            output::print_tasks(&view.data, format)
        }
        TaskCommand::Add {
            title,
            description,
            assignee,
            priority,
        } => {
            let created = apply(
                bindings,
                CreateTask(NewTask {
                    title,
                    description,
                    assigned_to: assignee,
                    priority,
                }),
            )?;
            print_applied(created.as_ref(), format, output::print_task)
        }
        TaskCommand::Status { id, status } => {
            let updated = apply(bindings, UpdateTaskStatus { id, status })?;
            print_applied(updated.as_ref(), format, output::print_task)
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            assignee,
            priority,
        } => {
            let patch = TaskPatch {
                title,
                description,
                assigned_to: assignee,
                priority,
            };
            let updated = apply(bindings, UpdateTask { id, patch })?;
            print_applied(updated.as_ref(), format, output::print_task)
        }
        TaskCommand::Rm(args) => {
            if !args.yes && !confirm("Delete this task?")? {
                return Ok(());
            }
            if apply(bindings, DeleteTask { id: args.id })?.is_some() {
                println!("Deleted task {}.", args.id);
            }
            Ok(())
        }
    }
}

fn run_memories(
    bindings: &Bindings,
    command: MemoryCommand,
    format: OutputFormat,
) -> CliResult<()> {
    match command {
        MemoryCommand::List { search, category } => {
            let memories = bindings.use_query(ListMemories { search }).data;
            let stats = bindings.use_query(MemoryStatsQuery).data;
            let selection = category.map_or(CategorySelection::All, CategorySelection::Only);
            output::print_memory_screen(&MemoryScreen::new(memories, selection, stats), format)
        }
        MemoryCommand::Add {
            content,
            category,
            source,
        } => {
            let created = apply(
                bindings,
                CreateMemory(NewMemory {
                    content,
                    category,
                    source,
                }),
            )?;
            print_applied(created.as_ref(), format, output::print_memory)
        }
        MemoryCommand::Edit {
            id,
            content,
            category,
        } => {
            let updated = apply(
                bindings,
                UpdateMemory {
                    id,
                    patch: MemoryPatch { content, category },
                },
            )?;
            print_applied(updated.as_ref(), format, output::print_memory)
        }
        MemoryCommand::Rm(args) => {
            if !args.yes && !confirm("Delete this memory?")? {
                return Ok(());
            }
            if apply(bindings, DeleteMemory { id: args.id })?.is_some() {
                println!("Deleted memory {}.", args.id);
            }
            Ok(())
        }
        MemoryCommand::Stats => {
            let view = bindings.use_query(MemoryStatsQuery);
            output::print_stats(&view.data, format)
        }
    }
}

/// Reads `--config` when given, otherwise the default config file, then
/// applies the `--db` override.
fn load_config(cli: &Cli) -> CliResult<MissionConfig> {
    let mut config = match cli.config.as_deref() {
        Some(path) => MissionConfig::load(path)?,
        None => MissionConfig::load_default()?,
    };
    if let Some(db) = cli.db.clone() {
        config.store.path = db;
        config.store.in_memory = false;
    }
    Ok(config)
}

/// Runs a mutation through its binding.
///
/// A skipped write is reported on stderr and yields `None`; a rejected
/// write becomes an error.
fn apply<M: Mutation>(bindings: &Bindings, mutation: M) -> CliResult<Option<M::Output>> {
    match bindings.use_mutation::<M>().call(mutation) {
        MutationOutcome::Applied(output) => Ok(Some(output)),
        MutationOutcome::Skipped { reason } => {
            eprintln!("warning: nothing changed ({reason})");
            Ok(None)
        }
        MutationOutcome::Rejected(err) => Err(CliError::Rejected(err)),
    }
}

fn print_applied<T>(
    value: Option<&T>,
    format: OutputFormat,
    print: fn(&T, OutputFormat) -> CliResult<()>,
) -> CliResult<()> {
    match value {
        Some(value) => print(value, format),
        None => Ok(()),
    }
}

fn confirm(prompt: &str) -> CliResult<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn parse_status(value: &str) -> Result<TaskStatus, String> {
    TaskStatus::parse(value).ok_or_else(|| expected(value, &TaskStatus::ALL.map(TaskStatus::as_str)))
}

fn parse_assignee(value: &str) -> Result<Assignee, String> {
    Assignee::parse(value).ok_or_else(|| expected(value, &Assignee::ALL.map(Assignee::as_str)))
}

fn parse_priority(value: &str) -> Result<TaskPriority, String> {
    TaskPriority::parse(value)
        .ok_or_else(|| expected(value, &TaskPriority::ALL.map(TaskPriority::as_str)))
}

fn parse_category(value: &str) -> Result<MemoryCategory, String> {
    MemoryCategory::parse(value)
        .ok_or_else(|| expected(value, &MemoryCategory::ALL.map(MemoryCategory::as_str)))
}

fn expected(value: &str, allowed: &[&str]) -> String {
    format!("`{value}` is not one of {}", allowed.join("|"))
}
