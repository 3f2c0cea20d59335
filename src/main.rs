#[tokio::main]
async fn main() -> anyhow::Result<()> {
    wavr::app::run().await
}
