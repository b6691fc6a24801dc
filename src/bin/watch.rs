//! ntsync Watcher
//!
//! Connects to a table server and prints every entry that changes.

use clap::Parser;
use ntsync::{Config, NtError, Session};
use tracing_subscriber::{fmt, EnvFilter};

/// ntsync Watcher
#[derive(Parser, Debug)]
#[command(name = "ntsync-watch")]
#[command(about = "Mirror a remote table and print changes as they arrive")]
#[command(version)]
struct Args {
    /// Server to connect to (host or host:port)
    target: String,

    /// Read timeout in milliseconds (0 = block forever)
    #[arg(short, long, default_value = "1000")]
    read_timeout_ms: u64,

    /// Protocol version to announce
    #[arg(long, default_value_t = ntsync::protocol::PROTOCOL_VERSION)]
    protocol_version: u16,

    /// Log every processed message
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize tracing/logging
    let default_filter = if args.debug { "info,ntsync=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    tracing::info!("ntsync-watch v{}", ntsync::VERSION);

    let config = match Config::from_target(&args.target) {
        Ok(config) => Config {
            read_timeout_ms: args.read_timeout_ms,
            protocol_version: args.protocol_version,
            ..config
        },
        Err(e) => {
            tracing::error!("Invalid target '{}': {}", args.target, e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&config) {
        tracing::error!("Session ended: {}", e);
        std::process::exit(1);
    }
}

/// Process messages forever, printing entries whose snapshot changed
fn run(config: &Config) -> Result<(), NtError> {
    let mut session = Session::connect(config)?;
    let mut seen = session.snapshot();

    loop {
        match session.process() {
            Ok(_) => {}
            // quiet server; keep waiting
            Err(e) if e.is_timeout() => continue,
            Err(e) => {
                if let Err(close_err) = session.close() {
                    tracing::debug!("Close after failure: {}", close_err);
                }
                return Err(e);
            }
        }

        let now = session.snapshot();
        for change in now.changes_since(&seen) {
            println!("------");
            println!("{} {}", change.id(), change.current());
        }
        seen = now;
    }
}
