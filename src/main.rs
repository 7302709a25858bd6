mod app;
mod config;
mod frame;
mod producer;
mod raster;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    app::run(config::load())
}
