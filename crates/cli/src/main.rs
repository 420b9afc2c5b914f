use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    carbot_cli::run().await
}
