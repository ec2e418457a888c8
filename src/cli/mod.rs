use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod chat;
pub mod serve;
pub mod validate;

#[derive(Subcommand)]
enum Command {
    /// Run the web chat server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
    /// Start a chat session in the terminal
    Chat {
        /// Google API key. Falls back to GOOGLE_API_KEY or a prompt
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Check that an API key can generate content
    Validate {
        #[arg(long)]
        api_key: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        Some(Command::Chat { api_key }) => {
            chat::run(api_key).await?;
        }
        Some(Command::Validate { api_key }) => {
            validate::run(api_key).await?;
        }
        None => {}
    }

    Ok(())
}
