#[tokio::main]
async fn main() {
    if let Err(e) = solace::run().await {
        eprintln!("solace: {e}");
        std::process::exit(1);
    }
}
