mod agent;
mod cli;
mod env;
mod worker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::parse();
    match cli.command {
        Some(cli::Commands::Start) | None => {
            rollcall_common::logger::init("rollcall:agent");
            let config = env::init()?;
            agent::start(config).await
        }
        Some(cli::Commands::Version) => {
            println!("{}", env::version());
            Ok(())
        }
    }
}
