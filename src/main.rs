use clap::Parser;
use envseal::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Keygen => envseal::cli::commands::keygen::execute(&cli).await,
        Commands::Encrypt {
            ref file,
            ref lookups,
        } => envseal::cli::commands::encrypt::execute(&cli, file, lookups).await,
        Commands::Decrypt {
            ref file,
            ref lookups,
            show_values,
            json,
        } => envseal::cli::commands::decrypt::execute(&cli, file, lookups, show_values, json).await,
        Commands::Status { ref file } => envseal::cli::commands::status::execute(&cli, file).await,
    };

    if let Err(e) = result {
        envseal::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Send diagnostics to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "envseal=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
