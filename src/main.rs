use clap::Parser;
use fear_greed::{Cli, run_app};

fn main() -> anyhow::Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Score every region and write the outputs
    run_app(&args)
}
