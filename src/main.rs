use log::info;

use gridview::GridEngine;
use gridview::server::run_server;

#[tokio::main]
async fn main() {
    // establish logger, default level info, initialize
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Beginning run...");

    // No external solver wired up by default; /api/calculate-flow reports
    // the solver as unavailable until one is configured here.
    let engine = GridEngine::new("data");
    run_server(engine).await;
}
