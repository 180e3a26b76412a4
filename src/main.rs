#[tokio::main]
async fn main() {
    if let Err(e) = blackhole::run().await {
        eprintln!("blackhole: {}", e);
        std::process::exit(1);
    }
}
