#[tokio::main]
async fn main() {
    if let Err(e) = careline_lib::run().await {
        eprintln!("careline: {e}");
        std::process::exit(1);
    }
}
