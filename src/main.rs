#[tokio::main]
async fn main() {
    if let Err(e) = tars_gateway_lib::run().await {
        eprintln!("tars-gateway: {e}");
        std::process::exit(1);
    }
}
