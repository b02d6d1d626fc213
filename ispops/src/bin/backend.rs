use std::error::Error;

use clap::Parser;

use common::config::Config;
use ispops::registry::{mock_backend, seed_demo_data};
use simcore::server::{initialize_tracing, run_backend};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "config/backend.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting mock backend...");
    let args = Args::parse();
    let config = Config::load(&args.config)?;
    initialize_tracing(&config.backend.log_level);
    tracing::info!(project = %config.common.project_name, "loaded config");

    if config.backend.seed_demo_data {
        seed_demo_data();
    }

    run_backend(config.backend, mock_backend()).await
}
