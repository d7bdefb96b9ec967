mod config_commands;
mod output;
mod run_command;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

/// Extra directives applied by the deprecated `xmpp.debug` flag.
const XMPP_DEBUG_DIRECTIVES: &str = "jabberfeed_xmpp=trace,tokio_xmpp=debug";

#[derive(Parser)]
#[command(
    name = "jabberfeed",
    version,
    about = "Stream XMPP chat messages as structured events"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: search ./ then ~/.config/jabberfeed/).
    #[arg(long, short, global = true, env = "JABBERFEED_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and stream events to stdout (default).
    Run,
    /// Validate the config file and report errors and warnings.
    Check,
}

fn filter_spec(base: &str, xmpp_debug: bool) -> String {
    if xmpp_debug {
        format!("{base},{XMPP_DEBUG_DIRECTIVES}")
    } else {
        base.to_string()
    }
}

/// Logs go to stderr; stdout carries the event stream.
fn init_telemetry(cli: &Cli, xmpp_debug: bool) {
    let base = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| cli.log_level.clone());
    let filter = EnvFilter::new(filter_spec(&base, xmpp_debug));
    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Check) => config_commands::check(cli.config.as_deref()),
        None | Some(Commands::Run) => {
            let (path, config) = jabberfeed_config::discover_and_load(cli.config.as_deref())?;
            init_telemetry(&cli, config.xmpp.debug);
            info!(
                version = env!("CARGO_PKG_VERSION"),
                config = %path.display(),
                "jabberfeed starting"
            );
            run_command::run(config).await
        },
    }
}
