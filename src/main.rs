#[tokio::main]
async fn main() -> anyhow::Result<()> {
    olm_sessions_lib::run().await
}
