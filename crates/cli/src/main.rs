mod compile_commands;
mod config_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tessera_config::TesseraConfig,
    tracing::{debug, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "tessera", about = "Tessera message segment compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of searching the standard locations.
    #[arg(long, global = true, env = "TESSERA_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a single segment and print the result.
    Compile(compile_commands::CompileArgs),
    /// Compile a JSON array of segments as one message.
    Batch(compile_commands::BatchArgs),
    /// Report how an audio file would be handled by the voice pipeline.
    Classify {
        /// Audio file to inspect.
        path: PathBuf,
    },
    /// Print the effective configuration as TOML.
    Config,
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<TesseraConfig> {
    let config = match cli.config {
        Some(ref path) => {
            debug!(path = %path.display(), "loading config");
            tessera_config::load_config(path)?
        },
        None => tessera_config::discover_and_load(),
    };
    Ok(tessera_config::apply_env_overrides(config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "tessera starting");

    let config = load_config(&cli)?;
    match cli.command {
        Commands::Compile(args) => compile_commands::handle_compile(&config, args).await,
        Commands::Batch(args) => compile_commands::handle_batch(&config, args).await,
        Commands::Classify { path } => compile_commands::handle_classify(&path).await,
        Commands::Config => config_commands::handle_config(&config),
    }
}
