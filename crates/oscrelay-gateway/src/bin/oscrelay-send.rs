//! Send OSC messages over UDP, e.g. to exercise a running relay.
//!
//! `oscrelay-send --target 127.0.0.1:8000 /hid/move 1 640 360 0.5 -2.0`
//!
//! Each argument is sent as int32 if it parses as an integer (clamped),
//! float32 if it parses as a finite float, and string otherwise.

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use oscrelay_core::protocol::osc::OscArg;
use oscrelay_gateway::sender::OscSender;

#[derive(Debug, Parser)]
#[command(name = "oscrelay-send", about = "Send an OSC message over UDP")]
struct Cli {
    /// Destination host:port.
    #[arg(long, default_value = "127.0.0.1:8000")]
    target: String,

    /// OSC address, e.g. /hid/move. A missing leading '/' is added.
    address: String,

    /// Message arguments. Negative numbers are values; other `-` tokens are flags.
    #[arg(allow_negative_numbers = true)]
    args: Vec<String>,

    /// How many times to send the message.
    #[arg(long, default_value_t = 1)]
    repeat: u32,

    /// Pause between repeats.
    #[arg(long, default_value_t = 100)]
    interval_ms: u64,
}

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let args: Vec<OscArg> = cli.args.iter().map(|a| OscArg::parse_loose(a)).collect();

    let sender = match OscSender::connect(cli.target.as_str()).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(target_addr = %cli.target, error = %e, "sender setup failed");
            std::process::exit(1);
        }
    };

    for i in 0..cli.repeat {
        if i > 0 {
            tokio::time::sleep(Duration::from_millis(cli.interval_ms)).await;
        }
        match sender.send(&cli.address, &args).await {
            Ok(n) => tracing::info!(address = %cli.address, bytes = n, "sent"),
            Err(e) => tracing::warn!(error = %e, "send failed"),
        }
    }
}
