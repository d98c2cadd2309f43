//! Entrypoint for the `novella` binary.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    std::process::exit(novella_cli::run().await);
}
