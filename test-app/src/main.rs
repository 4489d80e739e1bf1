// Maxigauge test application -- CLI tool for exercising the Maxigauge
// driver against a real controller or a scripted mock transport.
//
// Usage:
//   maxigauge-test-app --port /dev/ttyUSB0 read 1
//   maxigauge-test-app --port ASRL/dev/ttyS0::INSTR read-all
//   maxigauge-test-app --mock enable 4
//   maxigauge-test-app --port /dev/ttyUSB0 mask 2,0,1,0,0,0
//   maxigauge-test-app --port /dev/ttyUSB0 query PR3
//   maxigauge-test-app --mock -v monitor --interval-ms 500 --count 5
//
// Logging goes to stderr; RUST_LOG overrides the level chosen by -v.

use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use maxigauge::commands::{cmd_read_pressure, cmd_sensor_mask, cmd_set_channel_enabled};
use maxigauge::{CHANNEL_COUNT, Channel, ChannelMask, Maxigauge, MaxigaugeBuilder, Reading};
use maxigauge_test_harness::MockTransport;

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Maxigauge test application -- talks to a Pfeiffer Maxigauge from the
/// command line.
#[derive(Parser)]
#[command(name = "maxigauge-test-app", version, about)]
struct Cli {
    /// Serial port path or VISA resource (e.g. /dev/ttyUSB0, ASRL/dev/ttyS0::INSTR).
    #[arg(long, default_value = "/dev/ttyS0")]
    port: String,

    /// Baud rate configured on the controller.
    #[arg(long, default_value_t = 9600)]
    baud: u32,

    /// Reply timeout per line, in milliseconds.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: u64,

    /// Use a scripted mock transport instead of a real serial port.
    #[arg(long)]
    mock: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read the pressure on one channel (1-6).
    Read { channel: u8 },

    /// Read all six channels.
    ReadAll,

    /// Switch a sensor on.
    Enable { channel: u8 },

    /// Switch a sensor off.
    Disable { channel: u8 },

    /// Send a raw sensor mask, six comma-separated codes
    /// (0 = no change, 1 = off, 2 = on).
    Mask { mask: ChannelMask },

    /// Send an arbitrary command and print the handshake result.
    Query { command: String },

    /// Poll all channels repeatedly.
    Monitor {
        /// Delay between polls, in milliseconds.
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,

        /// Number of polls (runs until interrupted if omitted).
        #[arg(long)]
        count: Option<u64>,
    },
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

/// Pressures reported by the mock controller, one per channel. `None`
/// means the channel NAKs, like a sensor that is not fitted.
const MOCK_READINGS: [Option<&str>; CHANNEL_COUNT] = [
    Some("0,1.0000E-03"),
    Some("0,2.5000E-06"),
    Some("0,8.7000E-09"),
    Some("1,2.0000E-02"),
    None,
    Some("5,"),
];

fn script_read(mock: &mut MockTransport, channel: Channel) {
    let cmd = cmd_read_pressure(channel);
    match MOCK_READINGS[channel.index()] {
        Some(payload) => mock.expect_exchange(&cmd, payload),
        None => mock.expect_rejection(&cmd),
    }
}

fn script_read_all(mock: &mut MockTransport) {
    for channel in Channel::all() {
        script_read(mock, channel);
    }
}

/// Script a mock controller that answers exactly what `command` will send.
fn script_mock(command: &Command) -> Result<MockTransport> {
    let mut mock = MockTransport::new();
    match command {
        Command::Read { channel } => {
            if let Ok(channel) = Channel::new(*channel) {
                script_read(&mut mock, channel);
            }
        }
        Command::ReadAll => script_read_all(&mut mock),
        Command::Enable { channel } | Command::Disable { channel } => {
            if let Ok(ch) = Channel::new(*channel) {
                let enabled = matches!(command, Command::Enable { .. });
                let cmd = cmd_set_channel_enabled(ch, enabled);
                let echo = cmd.trim_start_matches("SEN,").to_string();
                mock.expect_exchange(&cmd, &echo);
            }
        }
        Command::Mask { mask } => mock.expect_exchange(&cmd_sensor_mask(mask), &mask.to_string()),
        Command::Query { command } => {
            let reading = Channel::all()
                .find(|ch| cmd_read_pressure(*ch) == *command)
                .and_then(|ch| MOCK_READINGS[ch.index()]);
            match reading {
                Some(payload) => mock.expect_exchange(command, payload),
                None => mock.expect_rejection(command),
            }
        }
        Command::Monitor { count, .. } => {
            let Some(count) = count else {
                bail!("--count is required with --mock");
            };
            for _ in 0..*count {
                script_read_all(&mut mock);
            }
        }
    }
    Ok(mock)
}

async fn create_gauge(cli: &Cli) -> Result<Maxigauge> {
    let builder = MaxigaugeBuilder::new()
        .baud_rate(cli.baud)
        .command_timeout(Duration::from_millis(cli.timeout_ms));

    if cli.mock {
        let mock = script_mock(&cli.command)?;
        let gauge = builder
            .build_with_transport(Box::new(mock))
            .await
            .context("failed to build Maxigauge with mock transport")?;
        println!("Connected (mock transport)");
        return Ok(gauge);
    }

    let gauge = builder
        .serial_port(&cli.port)
        .build()
        .await
        .with_context(|| format!("failed to open {}", cli.port))?;
    println!("Connected -- {} at {} baud", cli.port, cli.baud);
    Ok(gauge)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Values are in whatever unit the controller is set to.
fn format_reading(channel: usize, reading: Reading) -> String {
    match reading {
        Reading::Value(_) => format!("  CH{channel}: {reading}"),
        Reading::Invalid => format!("  CH{channel}: invalid"),
    }
}

async fn cmd_read(gauge: &Maxigauge, channel: u8) -> Result<()> {
    let reading = gauge
        .read_sensor(channel)
        .await
        .with_context(|| format!("failed to read channel {channel}"))?;
    println!("{}", format_reading(channel as usize, reading));
    Ok(())
}

async fn cmd_read_all(gauge: &Maxigauge) -> Result<()> {
    let readings = gauge.read_all().await.context("failed to read channels")?;
    for (i, reading) in readings.into_iter().enumerate() {
        println!("{}", format_reading(i + 1, reading));
    }
    Ok(())
}

async fn cmd_enable(gauge: &Maxigauge, channel: u8, enabled: bool) -> Result<()> {
    gauge
        .set_channel_enabled(channel, enabled)
        .await
        .with_context(|| format!("failed to switch channel {channel}"))?;
    println!("CH{channel} -> {}", if enabled { "on" } else { "off" });
    Ok(())
}

async fn cmd_mask(gauge: &Maxigauge, mask: &ChannelMask) -> Result<()> {
    gauge
        .set_channel_mask(mask)
        .await
        .context("failed to send sensor mask")?;
    println!("SEN,{mask} sent");
    Ok(())
}

async fn cmd_query(gauge: &Maxigauge, command: &str) -> Result<()> {
    let reply = gauge
        .query_reply(command)
        .await
        .with_context(|| format!("query {command:?} failed"))?;
    if reply.is_payload() {
        println!("{command} -> {reply}");
    } else {
        println!("{command} -> ({reply})");
    }
    Ok(())
}

async fn cmd_monitor(gauge: &Maxigauge, interval: Duration, count: Option<u64>) -> Result<()> {
    if interval.is_zero() {
        bail!("monitor interval must be greater than zero");
    }
    let start = Instant::now();
    let mut ticker = tokio::time::interval(interval);
    let mut polls = 0u64;

    while count.is_none_or(|n| polls < n) {
        ticker.tick().await;
        let readings = gauge.read_all().await.context("poll failed")?;
        let row = readings
            .iter()
            .map(|r| r.to_string())
            .collect::<Vec<_>>()
            .join("  ");
        println!("{:>8.1}s  {row}", start.elapsed().as_secs_f64());
        polls += 1;
    }
    Ok(())
}

/// Close the gauge after a command. The command's own error wins; a close
/// failure is reported only when the command succeeded.
async fn finish(gauge: &Maxigauge, result: Result<()>) -> Result<()> {
    let closed = gauge.close().await.context("failed to close controller");
    result.and(closed)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let gauge = create_gauge(&cli).await?;

    let result = match &cli.command {
        Command::Read { channel } => cmd_read(&gauge, *channel).await,
        Command::ReadAll => cmd_read_all(&gauge).await,
        Command::Enable { channel } => cmd_enable(&gauge, *channel, true).await,
        Command::Disable { channel } => cmd_enable(&gauge, *channel, false).await,
        Command::Mask { mask } => cmd_mask(&gauge, mask).await,
        Command::Query { command } => cmd_query(&gauge, command).await,
        Command::Monitor { interval_ms, count } => {
            cmd_monitor(&gauge, Duration::from_millis(*interval_ms), *count).await
        }
    };

    finish(&gauge, result).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn mock_gauge(mock: MockTransport) -> Maxigauge {
        MaxigaugeBuilder::new()
            .command_timeout(Duration::from_millis(200))
            .build_with_transport(Box::new(mock))
            .await
            .unwrap()
    }

    #[test]
    fn zero_interval_rejected_by_parser() {
        let result = Cli::try_parse_from([
            "maxigauge-test-app",
            "--mock",
            "monitor",
            "--interval-ms",
            "0",
            "--count",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_timeout_rejected_by_parser() {
        let result =
            Cli::try_parse_from(["maxigauge-test-app", "--timeout-ms", "0", "read-all"]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn monitor_zero_interval_is_an_error() {
        let mut mock = MockTransport::new();
        script_read_all(&mut mock);
        let gauge = mock_gauge(mock).await;

        let result = cmd_monitor(&gauge, Duration::ZERO, Some(1)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn monitor_polls_count_times() {
        let mut mock = MockTransport::new();
        script_read_all(&mut mock);
        script_read_all(&mut mock);
        let gauge = mock_gauge(mock).await;

        cmd_monitor(&gauge, Duration::from_millis(1), Some(2))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn finish_reports_close_failure() {
        let mut mock = MockTransport::new();
        mock.fail_close("port busy");
        let gauge = mock_gauge(mock).await;

        let err = finish(&gauge, Ok(())).await.unwrap_err();
        assert!(err.to_string().contains("failed to close controller"));
    }

    #[tokio::test]
    async fn finish_prefers_command_error() {
        let mut mock = MockTransport::new();
        mock.fail_close("port busy");
        let gauge = mock_gauge(mock).await;

        let err = finish(&gauge, Err(anyhow::anyhow!("read failed")))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "read failed");
        assert!(!gauge.is_connected().await);
    }

    #[tokio::test]
    async fn finish_after_clean_close_is_ok() {
        let gauge = mock_gauge(MockTransport::new()).await;
        finish(&gauge, Ok(())).await.unwrap();
    }

    #[test]
    fn readings_carry_no_unit() {
        let line = format_reading(1, Reading::Value(1.0e-3));
        assert_eq!(line, "  CH1: 1.000e-03");
        assert_eq!(format_reading(5, Reading::Invalid), "  CH5: invalid");
    }

    #[test]
    fn mock_script_matches_read_all() {
        let mut mock = MockTransport::new();
        script_read_all(&mut mock);
        // Five exchanges of two writes each, plus one rejected command.
        assert_eq!(mock.remaining_expectations(), 11);
    }
}
