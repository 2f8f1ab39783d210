//! dbot CLI: run the Discord bot, inspect stored threads. Config from env (`.env`, `app.env`) and
//! optional CLI args.

use anyhow::Result;
use clap::Parser;
use dbot_cli::{load_config, run_bot, show_thread, BaseConfig, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    dotenvy::from_filename("app.env").ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = load_config(token)?;
            run_bot(config).await
        }
        Commands::Thread { message_id } => {
            let base = BaseConfig::load()?;
            println!("{}", show_thread(&base, &message_id).await?);
            Ok(())
        }
    }
}
