mod app;
mod config;
mod error;
mod models;
mod selection;
mod services;

use app::App;
use config::Config;
use error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Config::load()?;

    let mut app = App::new(&config)?;
    app.run().await
}
