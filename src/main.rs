use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    teslacli::run().await
}
