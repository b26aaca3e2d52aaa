use tracing::error;

#[tokio::main]
async fn main() {
    eventfan::logging::init();
    if let Err(e) = run().await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = eventfan::config::Config::from_env()?;
    eventfan::web::serve(config).await
}
