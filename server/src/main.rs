mod server;

mod cli;
mod clients;
mod env;
mod http;
mod maintenance;
mod registry;
mod state;
mod tasks;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::parse();
    match cli.command {
        Some(cli::Commands::Start) | None => {
            rollcall_common::logger::init("rollcall:server");
            let config = env::init()?;
            server::start(config).await
        }
        Some(cli::Commands::Version) => {
            println!("{}", env::version());
            Ok(())
        }
    }
}
