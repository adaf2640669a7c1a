mod config;
mod crawler;
mod error;
mod metrics;
mod normalize;
mod pipeline;
mod storage;

use config::Config;
use pipeline::PipelineService;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().init();

    let cfg = Config::from_env()?;
    let service = PipelineService::new(cfg).await?;

    match service.run().await {
        Ok(appended) => {
            info!(appended, "Bond import finished");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Bond import failed");
            Err(e)
        }
    }
}
