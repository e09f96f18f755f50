use clap::{Args, Parser, Subcommand};
use rollcall_client::TaskStatus;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) server: ServerArgs,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Args, Debug)]
pub(crate) struct ServerArgs {
    /// Server host to connect to
    #[cfg_attr(debug_assertions, arg(long, default_value = "localhost"))]
    #[cfg_attr(not(debug_assertions), arg(long, default_value = "api.rollcall.io"))]
    pub server_host: String,

    /// Server port to connect to
    #[cfg_attr(debug_assertions, arg(long, default_value_t = 8080))]
    #[cfg_attr(not(debug_assertions), arg(long, default_value_t = 443))]
    pub server_port: u16,
}

impl ServerArgs {
    pub fn api_base_url(&self) -> String {
        match self.server_port {
            443 | 8443 => format!("https://{}/api", self.server_host),
            port => format!("http://{}:{}/api", self.server_host, port),
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Inspect and manage tracked clients
    Clients {
        #[command(subcommand)]
        command: ClientsCommands,
    },
    /// Create and monitor tasks
    Tasks {
        #[command(subcommand)]
        command: TasksCommands,
    },
    /// Print version information
    Version,
}

#[derive(Subcommand)]
pub(crate) enum ClientsCommands {
    /// List one page of clients
    List(PageArgs),
    /// Show a single client
    Show { client_id: String },
    /// Delete every client currently offline
    RemoveOffline,
}

#[derive(Subcommand)]
pub(crate) enum TasksCommands {
    /// Create a task spread across available clients
    Create(CreateTaskArgs),
    /// List one page of tasks
    List(ListTasksArgs),
    /// Mark a stuck assignment as failed
    Fail(FailArgs),
}

#[derive(Args, Debug)]
pub(crate) struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = 10)]
    pub page_size: u32,
}

#[derive(Args, Debug)]
pub(crate) struct CreateTaskArgs {
    /// What the clients should work on
    #[arg(long)]
    pub target: String,

    /// Total duration in seconds, split evenly across clients
    #[arg(long)]
    pub duration: u64,

    /// How many clients to involve
    #[arg(long, default_value_t = 1)]
    pub clients: u32,
}

#[derive(Args, Debug)]
pub(crate) struct ListTasksArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Only show tasks with this status
    #[arg(long)]
    pub status: Option<TaskStatus>,
}

#[derive(Args, Debug)]
pub(crate) struct FailArgs {
    pub assignment_id: i64,

    /// Failure message recorded on the assignment
    #[arg(long, default_value = "marked failed by operator")]
    pub message: String,

    #[arg(long)]
    pub detail: Option<String>,
}

pub(crate) fn parse() -> Cli {
    Cli::parse()
}
