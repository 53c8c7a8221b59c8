// sdrio test application -- CLI tool for exercising the streaming stack
// (device enumeration, RF configuration, chunked transfers, hardware clock
// tracking) against the simulated device backend.
//
// Usage:
//   sdrio-test-app probe
//   sdrio-test-app --args "driver=sim,serial=0001" probe
//   sdrio-test-app time-test
//   sdrio-test-app write-tone --seconds 5
//   sdrio-test-app --verbose write-tone --seconds 2 --buffer 10000

mod tone;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use sdrio::sim::SimDevice;
use sdrio::{
    await_burst_end, ns_to_secs, read_all, write_all, ClockDriver, Device, DeviceArgs, Direction,
    LogLevel, LogObserver, PollPolicy, RxStream, SampleFormat, StreamFlags, TxStream,
};

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// sdrio test application -- exercises the streaming stack from the command line.
#[derive(Parser)]
#[command(name = "sdrio-test-app", version, about)]
struct Cli {
    /// Device enumeration filter, e.g. "driver=sim,serial=0001".
    #[arg(long, default_value = "driver=sim")]
    args: String,

    /// Enable verbose tracing and device debug messages on stderr.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enumerate matching devices and print attributes and channel capabilities.
    Probe,

    /// Exercise the hardware clock: reset it, sample it around delays and
    /// transfers, and show that it freezes without an active receive stream.
    TimeTest {
        /// Samples per transfer buffer.
        #[arg(long, default_value_t = 30_000)]
        buffer: usize,
    },

    /// Stream tone bursts (1 kHz, silence, 2 kHz) and confirm each burst
    /// was flushed via the status channel.
    WriteTone {
        /// Seconds of samples per tone segment.
        #[arg(long, default_value_t = 5)]
        seconds: u64,

        /// Samples per transfer buffer.
        #[arg(long, default_value_t = 30_000)]
        buffer: usize,
    },
}

// ---------------------------------------------------------------------------
// Device log routing
// ---------------------------------------------------------------------------

/// Routes device log messages to stderr, suppressing debug chatter unless
/// the user asked for it.
struct StderrLog {
    verbose: bool,
}

impl LogObserver for StderrLog {
    fn log(&self, level: LogLevel, message: &str) {
        if level == LogLevel::Debug && !self.verbose {
            return;
        }
        eprintln!("[{level}] {message}");
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

const SAMPLE_RATE: f64 = 625_000.0;
const MASTER_CLOCK_RATE: f64 = 40.0e6;
const FREQUENCY: f64 = 144.295e6;
const TX_GAIN: f64 = 52.0;
const TRANSFER_TIMEOUT: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    }

    let filter: DeviceArgs = cli
        .args
        .parse()
        .with_context(|| format!("invalid --args '{}'", cli.args))?;

    match cli.command {
        Command::Probe => probe(&filter, cli.verbose).await,
        Command::TimeTest { buffer } => time_test(&filter, cli.verbose, buffer).await,
        Command::WriteTone { seconds, buffer } => {
            write_tone(&filter, cli.verbose, seconds, buffer).await
        }
    }
}

/// Enumerate with the filter and open the first match, wiring up stderr
/// device logging.
fn open_device(filter: &DeviceArgs, verbose: bool) -> Result<SimDevice> {
    let found = sdrio::sim::enumerate(filter);
    if found.is_empty() {
        bail!("no device found matching \"{filter}\"");
    }
    for (index, descriptor) in found.iter().enumerate() {
        println!("Device {index}");
        for (key, value) in descriptor.iter() {
            println!("\tAttr [{key}] = [{value}]");
        }
    }
    Ok(SimDevice::builder()
        .log_observer(Arc::new(StderrLog { verbose }))
        .build())
}

// ---------------------------------------------------------------------------
// probe
// ---------------------------------------------------------------------------

async fn probe(filter: &DeviceArgs, verbose: bool) -> Result<()> {
    println!("sdrio library version [{}]", sdrio::version());

    let device = open_device(filter, verbose)?;

    println!("  Master Clock Rate: {}", device.master_clock_rate().await?);
    device.set_master_clock_rate(MASTER_CLOCK_RATE).await?;
    println!("  Master Clock Rate: {}", device.master_clock_rate().await?);

    for direction in [Direction::Rx, Direction::Tx] {
        let count = device.num_channels(direction);
        println!("  {direction} channels: {count}");
        for channel in 0..count {
            let info = device.channel_info(direction, channel)?;
            println!("  Channel: {channel}");
            println!("\t{direction} Antennas: {}", info.antennas.join(" "));
            let rates: Vec<String> = info.sample_rates.iter().map(|r| r.to_string()).collect();
            println!("\t{direction} Rates: {}", rates.join(" "));
            println!("\t{direction} Freq Range: {}", info.frequency_range);
            println!("\t{direction} Gain Range: {}", info.gain_range);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// RF configuration shared by the streaming commands
// ---------------------------------------------------------------------------

async fn configure_rf(device: &SimDevice) -> Result<()> {
    device
        .set_master_clock_rate(MASTER_CLOCK_RATE)
        .await
        .context("set master clock rate")?;
    for direction in [Direction::Rx, Direction::Tx] {
        device.set_frequency(direction, 0, FREQUENCY).await?;
        device.set_sample_rate(direction, 0, SAMPLE_RATE).await?;
    }
    device.set_gain(Direction::Tx, 0, TX_GAIN).await?;
    device.set_antenna(Direction::Tx, 0, "BAND1").await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// time-test
// ---------------------------------------------------------------------------

async fn time_test(filter: &DeviceArgs, verbose: bool, buffer: usize) -> Result<()> {
    let device = open_device(filter, verbose)?;
    configure_rf(&device).await?;

    let mut rx = device.open_rx_stream(SampleFormat::Cf32, &[0]).await?;
    let mut tx = device.open_tx_stream(SampleFormat::Cf32, &[0]).await?;

    // The hardware clock only advances while a receive stream is active, so
    // the receive path comes up first.
    rx.activate(StreamFlags::NONE, None, 0).await?;
    tx.activate(StreamFlags::NONE, None, 0).await?;

    device.set_hardware_time(0).await?;

    tokio::time::sleep(Duration::from_micros(10)).await;
    report_time(&device, "after 10 us delay").await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    report_time(&device, "after 10 ms delay").await?;

    let mut rx_buf = vec![sdrio::Complex32::new(0.0, 0.0); buffer];
    let outcome = read_all(rx.as_mut(), &mut rx_buf, TRANSFER_TIMEOUT).await?;
    println!(
        "Read {} samples; first sample at {:.9} s",
        outcome.samples,
        outcome.time_ns.map(ns_to_secs).unwrap_or_default()
    );
    report_time(&device, &format!("after reading a {buffer} sample buffer")).await?;

    let tx_buf = tone::tone(buffer, 2.0 * std::f64::consts::PI / 625.0, 1.0);
    send_burst(tx.as_mut(), &tx_buf).await?;
    report_time(&device, &format!("after writing a {buffer} sample buffer")).await?;

    // Deactivate the receive path: the clock freezes, and stays frozen
    // through further transmit work and delays.
    rx.deactivate().await?;
    report_time(&device, "after deactivating the receive stream").await?;

    send_burst(tx.as_mut(), &tx_buf).await?;
    report_time(&device, &format!("after writing a {buffer} sample buffer")).await?;

    tokio::time::sleep(Duration::from_millis(10)).await;
    report_time(&device, "after 10 ms delay").await?;
    tokio::time::sleep(Duration::from_millis(10)).await;
    report_time(&device, "after 10 ms delay").await?;

    tx.deactivate().await?;
    Ok(())
}

async fn report_time(device: &SimDevice, label: &str) -> Result<()> {
    let ns = device.hardware_time().await?;
    println!("Time {label} = {:.12} s", ns_to_secs(ns));
    Ok(())
}

/// Write one buffer as a complete burst and wait for the device to confirm
/// the flush.
async fn send_burst(tx: &mut dyn sdrio::TxStream, samples: &[sdrio::Complex32]) -> Result<()> {
    let moved = write_all(tx, samples, StreamFlags::END_BURST, None, TRANSFER_TIMEOUT)
        .await
        .context("write burst")?;

    let status = await_burst_end(tx, 1, TRANSFER_TIMEOUT, &PollPolicy::default())
        .await
        .context("confirm burst end")?;
    println!(
        "Wrote {moved} samples; status flags = [{}] at {:.9} s",
        status.flags,
        ns_to_secs(status.time_ns)
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// write-tone
// ---------------------------------------------------------------------------

async fn write_tone(filter: &DeviceArgs, verbose: bool, seconds: u64, buffer: usize) -> Result<()> {
    if buffer == 0 {
        bail!("--buffer must be at least 1");
    }
    let device = open_device(filter, verbose)?;
    configure_rf(&device).await?;

    // Transmit-only interest, but timestamps still need a receive stream
    // running.
    let clock_driver = ClockDriver::start(&device).await?;

    let mut tx = device.open_tx_stream(SampleFormat::Cf32, &[0]).await?;
    tx.activate(StreamFlags::NONE, None, 0).await?;

    let phase_incr = 2.0 * std::f64::consts::PI / 625.0;
    let segments: [(&str, Vec<sdrio::Complex32>); 3] = [
        ("1 kHz tone", tone::tone(buffer, phase_incr, 0.5)),
        ("silence", tone::silence(buffer)),
        ("2 kHz tone", tone::tone(buffer, 2.0 * phase_incr, 0.5)),
    ];

    let iterations = ((seconds as f64 * SAMPLE_RATE) / buffer as f64).ceil() as usize;
    let iterations = iterations.max(1);

    for (label, samples) in &segments {
        println!("Sending {label} ({iterations} buffers of {buffer} samples)");

        for i in 0..iterations {
            // Only the final buffer of the segment closes the burst.
            let flags = if i + 1 == iterations {
                StreamFlags::END_BURST
            } else {
                StreamFlags::NONE
            };
            write_all(tx.as_mut(), samples, flags, None, TRANSFER_TIMEOUT)
                .await
                .with_context(|| format!("writing {label}"))?;
        }

        let status = await_burst_end(tx.as_mut(), 1, TRANSFER_TIMEOUT, &PollPolicy::default())
            .await
            .with_context(|| format!("confirming burst end for {label}"))?;
        println!(
            "End of {label}: status flags = [{}] at {:.9} s",
            status.flags,
            ns_to_secs(status.time_ns)
        );
    }

    tx.deactivate().await?;
    clock_driver.stop().await?;
    Ok(())
}
