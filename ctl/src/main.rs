mod cli;
mod output;

use anyhow::Context;
use rollcall_client::{
    ControlClient, CreateTaskRequest, FailureReport, ListClientsParams, ListTasksParams,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rollcall_common::logger::init("rollcall:ctl");

    let cli = cli::parse();
    let api = ControlClient::new(cli.server.api_base_url()).context("invalid server url")?;

    match cli.command {
        cli::Commands::Clients { command } => match command {
            cli::ClientsCommands::List(args) => {
                let page = api
                    .list_clients(ListClientsParams {
                        page: args.page,
                        page_size: args.page_size,
                    })
                    .await?;
                println!("{}", output::clients_table(&page));
            }
            cli::ClientsCommands::Show { client_id } => {
                let record = api.get_client(&client_id).await?;
                println!("{}", output::client_details(&record));
            }
            cli::ClientsCommands::RemoveOffline => {
                let result = api.remove_offline_clients().await?;
                println!(
                    "{}: removed {} offline clients",
                    result.status, result.deleted_count
                );
            }
        },
        cli::Commands::Tasks { command } => match command {
            cli::TasksCommands::Create(args) => {
                let result = api
                    .create_task(&CreateTaskRequest {
                        target: args.target,
                        total_duration_secs: args.duration,
                        client_count: args.clients,
                    })
                    .await?;
                println!(
                    "task {} created: {}s for each of {} clients",
                    result.task_id, result.duration_per_client_secs, result.client_count
                );
            }
            cli::TasksCommands::List(args) => {
                let page = api
                    .list_tasks(ListTasksParams {
                        page: args.page.page,
                        page_size: args.page.page_size,
                        status: args.status,
                    })
                    .await?;
                println!("{}", output::tasks_table(&page));
            }
            cli::TasksCommands::Fail(args) => {
                api.report_failure(&FailureReport {
                    assignment_id: args.assignment_id,
                    error_message: args.message,
                    detail: args.detail,
                })
                .await?;
                println!("assignment {} marked failed", args.assignment_id);
            }
        },
        cli::Commands::Version => println!("{}", env!("CARGO_PKG_VERSION")),
    }

    Ok(())
}
