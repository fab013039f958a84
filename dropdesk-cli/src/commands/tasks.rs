use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use dropdesk_core::{JsonFileStore, TaskList, TaskRecord};

#[derive(Parser, Debug)]
pub struct TasksArgs {
    #[command(subcommand)]
    pub command: TasksCommands,
}

#[derive(Subcommand, Debug)]
pub enum TasksCommands {
    /// Add a task (words are joined with spaces; blank input is ignored)
    Add(AddArgs),
    /// List tasks in insertion order
    List(ListArgs),
    /// Flip a task between done and not done
    Toggle(IdArgs),
    /// Delete a task
    Delete(IdArgs),
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Task text
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub text: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct IdArgs {
    /// Task id (as shown by `tasks list`)
    pub id: i64,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

pub fn run_tasks(args: TasksArgs, store_path: &Path) -> Result<()> {
    let store = JsonFileStore::open(store_path)
        .with_context(|| format!("Failed to open storage file {}", store_path.display()))?;
    let mut list = TaskList::initialize(store).context("Failed to load task list")?;

    match args.command {
        TasksCommands::Add(args) => {
            let raw = args.text.join(" ");
            match list.add_task(&raw)? {
                Some(task) => println!("✓ Added task {}: {}", task.id, task.text),
                None => println!("Nothing to add (empty task)"),
            }
        }
        TasksCommands::List(args) => match args.format {
            OutputFormat::Json => println!("{}", list.to_json()?),
            OutputFormat::Text => print_list(list.tasks(), list.remaining()),
        },
        TasksCommands::Toggle(args) => match list.toggle_task(args.id)? {
            Some(true) => println!("✓ Task {} done", args.id),
            Some(false) => println!("✓ Task {} not done", args.id),
            None => println!("No task with id {}", args.id),
        },
        TasksCommands::Delete(args) => {
            if list.delete_task(args.id)? {
                println!("✓ Deleted task {}", args.id);
            } else {
                println!("No task with id {}", args.id);
            }
        }
    }

    Ok(())
}

fn print_list(tasks: &[TaskRecord], remaining: usize) {
    if tasks.is_empty() {
        println!("No tasks");
        return;
    }

    for task in tasks {
        let mark = if task.completed { "x" } else { " " };
        println!("[{}] {}  {}", mark, task.id, task.text);
    }
    println!("{} of {} remaining", remaining, tasks.len());
}
