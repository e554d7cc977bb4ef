use clap::Parser;
use jest_runner::Runner;
use tracing_subscriber::EnvFilter;

fn main() {
    let runner = Runner::parse();

    // RUST_LOG wins; --verbose only changes the default
    let default_level = if runner.global.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let global = runner.global.clone();
    if let Err(err) = runner.command.execute(&global) {
        match err.downcast_ref::<jest_runner_core::Error>() {
            Some(core_err) if core_err.is_user_message() => {
                eprintln!("⚠️  {core_err}");
                std::process::exit(2);
            }
            _ => {
                eprintln!("❌ Error: {err:#}");
                std::process::exit(1);
            }
        }
    }
}
