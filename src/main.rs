#[tokio::main]
async fn main() -> anyhow::Result<()> {
    candidate_lens_lib::run().await
}
