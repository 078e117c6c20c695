use clap::Parser;
use reading_app::app::{run, AppConfig, Cli};

fn main() {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = AppConfig::from_env().unwrap_or_default();
    if let Err(err) = run(config, cli.command) {
        eprintln!("reading: {err:#}");
        std::process::exit(1);
    }
}
