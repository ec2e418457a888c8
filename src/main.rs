use anyhow::Result;
use ccmi_assistant::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
