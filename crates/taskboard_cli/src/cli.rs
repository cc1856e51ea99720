use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taskboard_core::{Category, Priority, TaskStatus};

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Kanban task board with a contacts address book")]
#[command(version)]
pub struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Document store base URL
    #[arg(long, global = true)]
    pub store_url: Option<String>,

    /// Session cache database file
    #[arg(long = "cache", global = true)]
    pub cache_path: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Directory for rolling log files (stderr when unset)
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in and remember the session
    Login {
        #[arg(long, required_unless_present = "guest")]
        email: Option<String>,
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Use the shared guest account
        #[arg(long, conflicts_with_all = ["email", "password"])]
        guest: bool,
    },
    /// Forget the current session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Print all four status lists
    Board,
    /// Print counts and the next urgent deadline
    Summary,
    /// Print tasks whose title or description contains a term
    Search {
        term: String,
    },
    /// Task commands
    Task {
        #[command(subcommand)]
        task_cmd: TaskCommand,
    },
    /// Subtask commands (indices start at 0)
    Subtask {
        #[command(subcommand)]
        subtask_cmd: SubtaskCommand,
    },
    /// Contact commands
    Contact {
        #[command(subcommand)]
        contact_cmd: ContactCommand,
    },
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Create a task
    Add {
        #[command(flatten)]
        fields: TaskFieldArgs,
        /// Target status list
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
        /// Initial subtask (repeatable)
        #[arg(long = "subtask")]
        subtasks: Vec<String>,
    },
    /// Change task fields; omitted flags keep their current value
    Edit {
        id: String,
        #[command(flatten)]
        fields: TaskEditArgs,
    },
    /// Move a task to another status list
    Move {
        id: String,
        to: TaskStatus,
    },
    /// Delete a task
    Delete {
        id: String,
    },
}

#[derive(Args)]
pub struct TaskFieldArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// Due date as YYYY-MM-DD
    #[arg(long)]
    pub due: String,
    #[arg(long, default_value = "medium")]
    pub priority: Priority,
    /// "Technical Task" or "User Story"
    #[arg(long)]
    pub category: Option<Category>,
    /// Assigned contact id (repeatable)
    #[arg(long = "contact")]
    pub contacts: Vec<String>,
}

#[derive(Args)]
pub struct TaskEditArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub category: Option<Category>,
    /// Replace assigned contacts with these ids (repeatable)
    #[arg(long = "contact")]
    pub contacts: Option<Vec<String>>,
}

#[derive(Subcommand)]
pub enum SubtaskCommand {
    Add {
        task_id: String,
        text: String,
    },
    /// Replace subtask text; empty text deletes the subtask
    Edit {
        task_id: String,
        index: usize,
        text: String,
    },
    Delete {
        task_id: String,
        index: usize,
    },
    /// Flip the completed flag
    Toggle {
        task_id: String,
        index: usize,
    },
}

#[derive(Subcommand)]
pub enum ContactCommand {
    /// List contacts grouped by last-name initial
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
    },
    /// Change contact fields and update every task that references the contact
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Delete a contact and unassign it from every task
    Delete {
        id: String,
    },
}
