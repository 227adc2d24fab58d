#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = formgate::run().await {
        eprintln!("formgate fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
