use clap::Parser;
use roomwalk::{
    config::{Args, ViewerConfig},
    RoomApp,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::from(Args::parse());
    log::info!(
        "Starting roomwalk with {} at {}x{}",
        config.asset_path.display(),
        config.window_size.0,
        config.window_size.1
    );

    RoomApp::new(config)?.run()
}
