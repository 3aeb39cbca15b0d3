use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};

use chillerlink_control::{max_capacity_intent, CommandScheduler};
use chillerlink_runner::config::{RunnerConfig, TransportConfig};
use chillerlink_runner::display::{detailed_status, status_line};
use chillerlink_runner::logging::{init_logging, LogFormat, LogLevel};
use chillerlink_runner::poll::Poller;
use chillerlink_runner::record::{RecordFormat, RecordWriter, StatusRecord};
use chillerlink_runner::transport::{SerialTransport, TcpTransport, Transport};
use chillerlink_runner::RunnerError;
use gree_protocol::{ControlIntent, CycleDirection, DecodedStatus, Mode, RawFrame};

/// Read timeout applied to both transports.
const READ_TIMEOUT: Duration = Duration::from_millis(300);

#[derive(Parser, Debug)]
#[command(
    name = "chillerlink",
    version,
    about = "Monitor and control a Gree-derived heat pump / chiller over its serial protocol"
)]
struct Cli {
    /// Path to a YAML config file.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Serial device to open (overrides the config file).
    #[arg(long, value_name = "PATH", global = true)]
    serial: Option<String>,

    /// Baud rate for the serial link.
    #[arg(long, value_name = "BAUD", default_value_t = 9600, global = true)]
    baud: u32,

    /// Connect to the network status feed (host:port) instead of serial.
    #[arg(long, value_name = "ADDR", global = true, conflicts_with = "serial")]
    tcp: Option<String>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query the unit once and print the decoded status and safety verdict.
    Status,

    /// Continuously decode and display the status feed.
    Monitor {
        /// Print the full per-profile breakdown every 10 seconds.
        #[arg(long)]
        detailed: bool,
    },

    /// Capture decoded statuses to a CSV or JSON-lines file.
    Collect {
        /// How long to capture, in minutes.
        #[arg(long, default_value_t = 5.0)]
        duration_mins: f64,

        /// Seconds between polls.
        #[arg(long, default_value_t = 2.0)]
        interval_secs: f64,

        /// Output file; defaults to a timestamped name.
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Output format.
        #[arg(long, value_enum, default_value = "csv")]
        format: RecordFormat,
    },

    /// Hold the unit at maximum capacity while enforcing safety limits.
    Chiller {
        /// Total runtime in minutes.
        #[arg(long, default_value_t = 60)]
        duration_mins: u64,

        /// Seconds between safety checks.
        #[arg(long, default_value_t = 30)]
        check_interval_secs: u64,

        /// Operating mode for the baseline command.
        #[arg(long, value_enum, default_value = "cool")]
        mode: ModeArg,
    },

    /// Detect the cycle direction and push an aggressive one-shot setpoint
    /// with maximum capacity, flow, and fan.
    MaxPerformance,

    /// Decode a hex-encoded frame with every applicable profile.
    Analyze {
        /// Frame bytes as hex (spaces and 0x prefixes allowed).
        hex_frame: String,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModeArg {
    Auto,
    Cool,
    Dry,
    Fan,
    Heat,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Auto => Mode::Auto,
            ModeArg::Cool => Mode::Cool,
            ModeArg::Dry => Mode::Dry,
            ModeArg::Fan => Mode::Fan,
            ModeArg::Heat => Mode::Heat,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), RunnerError> {
    let mut config = match &cli.config {
        Some(path) => RunnerConfig::load(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(addr) = &cli.tcp {
        config.transport = TransportConfig::Tcp { addr: addr.clone() };
    } else if let Some(path) = &cli.serial {
        config.transport = TransportConfig::Serial {
            path: path.clone(),
            baud: cli.baud,
        };
    }

    match cli.command {
        Command::Status => cmd_status(&config),
        Command::Monitor { detailed } => cmd_monitor(&config, detailed),
        Command::Collect {
            duration_mins,
            interval_secs,
            output,
            format,
        } => cmd_collect(&config, duration_mins, interval_secs, output, format),
        Command::Chiller {
            duration_mins,
            check_interval_secs,
            mode,
        } => cmd_chiller(&config, duration_mins, check_interval_secs, mode.into()),
        Command::MaxPerformance => cmd_max_performance(&config),
        Command::Analyze { hex_frame } => cmd_analyze(&hex_frame),
    }
}

/// Open the configured transport and wrap it in a matching poller.
fn make_poller(config: &RunnerConfig) -> Result<Poller<Box<dyn Transport>>, RunnerError> {
    match &config.transport {
        TransportConfig::Serial { path, baud } => {
            let transport: Box<dyn Transport> =
                Box::new(SerialTransport::open(path, *baud, READ_TIMEOUT)?);
            Ok(Poller::serial(transport, config.limits))
        }
        TransportConfig::Tcp { addr } => {
            let transport: Box<dyn Transport> =
                Box::new(TcpTransport::connect(addr, READ_TIMEOUT)?);
            Ok(Poller::network(transport, config.limits))
        }
    }
}

/// A flag that flips to false on Ctrl-C.
fn shutdown_flag() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    let _ = ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst));
    running
}

fn cmd_status(config: &RunnerConfig) -> Result<(), RunnerError> {
    let mut poller = make_poller(config)?;
    let outcome = poller
        .wait_for_status(10, Duration::from_millis(300), Duration::ZERO)?
        .ok_or(RunnerError::NoResponse)?;

    let status = outcome.status.as_ref().ok_or(RunnerError::NoResponse)?;
    print!("{}", detailed_status(status, outcome.verdict.as_ref()));
    Ok(())
}

fn cmd_monitor(config: &RunnerConfig, detailed: bool) -> Result<(), RunnerError> {
    let mut poller = make_poller(config)?;
    let running = shutdown_flag();
    let start = Instant::now();
    let mut last_detail = Instant::now();
    let mut frames = 0usize;

    while running.load(Ordering::SeqCst) {
        let outcome = poller.poll_once(start.elapsed())?;
        if let Some(status) = &outcome.status {
            frames += 1;
            println!(
                "{} {}",
                Local::now().format("%H:%M:%S"),
                status_line(status)
            );
            if detailed && last_detail.elapsed() >= Duration::from_secs(10) {
                print!("{}", detailed_status(status, outcome.verdict.as_ref()));
                last_detail = Instant::now();
            }
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    println!("stopped after {frames} status frames");
    Ok(())
}

fn cmd_collect(
    config: &RunnerConfig,
    duration_mins: f64,
    interval_secs: f64,
    output: Option<PathBuf>,
    format: RecordFormat,
) -> Result<(), RunnerError> {
    let path = output.unwrap_or_else(|| {
        let ext = match format {
            RecordFormat::Csv => "csv",
            RecordFormat::Jsonl => "jsonl",
        };
        PathBuf::from(format!(
            "chillerlink_capture_{}.{ext}",
            Local::now().format("%Y%m%d_%H%M%S")
        ))
    });
    let mut writer = RecordWriter::create(&path, format)?;
    tracing::info!(path = %path.display(), "capture started");

    let mut poller = make_poller(config)?;
    let running = shutdown_flag();
    let start = Instant::now();
    let deadline = Duration::from_secs_f64(duration_mins * 60.0);
    let interval = Duration::from_secs_f64(interval_secs);

    while running.load(Ordering::SeqCst) && start.elapsed() < deadline {
        let outcome = poller.poll_once(start.elapsed())?;
        if let (Some(status), Some(frame)) = (&outcome.status, &outcome.frame) {
            let record = StatusRecord::new(
                Utc::now(),
                start.elapsed().as_secs_f64(),
                status,
                frame,
            );
            writer.write(&record)?;
            if writer.rows() % 5 == 0 {
                println!("{:4} samples | {}", writer.rows(), status_line(status));
            }
        }
        std::thread::sleep(interval);
    }

    println!("saved {} samples to {}", writer.rows(), path.display());
    Ok(())
}

fn cmd_chiller(
    config: &RunnerConfig,
    duration_mins: u64,
    check_interval_secs: u64,
    mode: Mode,
) -> Result<(), RunnerError> {
    let baseline = max_capacity_intent(mode);
    let mut scheduler_config = config.scheduler.clone();
    scheduler_config.baseline = baseline.clone();
    let scheduler = CommandScheduler::new(scheduler_config);

    let mut poller =
        make_poller(config)?.with_scheduler(scheduler, config.encode_profile);
    let running = shutdown_flag();
    let start = Instant::now();
    let deadline = Duration::from_secs(duration_mins * 60);
    let interval = Duration::from_secs(check_interval_secs);

    println!(
        "chiller mode: holding maximum capacity ({mode}) for {duration_mins} minutes, \
safety check every {check_interval_secs}s"
    );

    while running.load(Ordering::SeqCst) && start.elapsed() < deadline {
        let outcome = poller.poll_once(start.elapsed())?;

        match (&outcome.status, &outcome.verdict) {
            (Some(status), Some(verdict)) => {
                let remaining = deadline.saturating_sub(start.elapsed());
                println!(
                    "{} [{:3.0} min left] {}",
                    Local::now().format("%H:%M:%S"),
                    remaining.as_secs_f64() / 60.0,
                    status_line(status)
                );
                if !verdict.ok {
                    for violation in &verdict.violations {
                        println!("  SAFETY: {violation}");
                    }
                }
                if let Some(sent) = &outcome.sent {
                    if sent == &baseline {
                        println!("  re-asserted maximum capacity");
                    } else {
                        println!("  reduced capacity for safety");
                    }
                }
            }
            _ => println!("no status response"),
        }

        std::thread::sleep(interval);
    }

    println!("chiller mode finished");
    Ok(())
}

fn cmd_max_performance(config: &RunnerConfig) -> Result<(), RunnerError> {
    let mut poller = make_poller(config)?;

    let outcome = poller
        .wait_for_status(10, Duration::from_millis(300), Duration::ZERO)?
        .ok_or(RunnerError::NoResponse)?;
    let status = outcome.status.as_ref().ok_or(RunnerError::NoResponse)?;

    let direction = status
        .fixed_offset
        .as_ref()
        .map(|fo| fo.cycle_direction())
        .unwrap_or(CycleDirection::Unknown);

    // Aggressive setpoint for the detected direction; moderate fallback
    // when the differential is ambiguous.
    let (setpoint, label) = match direction {
        CycleDirection::Cool => (18.0, "maximum cooling"),
        CycleDirection::Heat => (30.0, "maximum heating"),
        CycleDirection::Unknown => (24.0, "maximum performance"),
    };
    println!("detected cycle: {direction:?}; configuring {label} at {setpoint} C");

    let steps: [(&str, ControlIntent); 5] = [
        (
            "power on",
            ControlIntent {
                power: Some(true),
                ..Default::default()
            },
        ),
        (
            "setpoint",
            ControlIntent {
                power: Some(true),
                setpoint_c: Some(setpoint),
                ..Default::default()
            },
        ),
        (
            "compressor capacity",
            ControlIntent {
                power: Some(true),
                capacity: Some(0x80),
                ..Default::default()
            },
        ),
        (
            "refrigerant flow",
            ControlIntent {
                power: Some(true),
                flow: Some(0x80),
                ..Default::default()
            },
        ),
        (
            "fan speed",
            ControlIntent {
                power: Some(true),
                fan_speed: Some(5),
                ..Default::default()
            },
        ),
    ];

    for (label, intent) in &steps {
        println!("  setting {label}");
        poller.send_intent(intent)?;
        std::thread::sleep(Duration::from_secs(1));
    }

    println!("unit configured for {label}");
    Ok(())
}

fn cmd_analyze(hex_frame: &str) -> Result<(), RunnerError> {
    let cleaned: String = hex_frame
        .replace("0x", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let bytes = hex::decode(cleaned)?;
    let frame = RawFrame::from_bytes(bytes)?;

    println!(
        "frame: {} bytes, declared 0x{:02X}, type 0x{:02X}, addr 0x{:02X}",
        frame.len(),
        frame.declared_len(),
        frame.frame_type(),
        frame.address()
    );
    match frame.validate_checksum() {
        Ok(()) => println!("checksum: OK (0x{:02X})", frame.checksum()),
        Err(e) => println!("checksum: {e}"),
    }

    match DecodedStatus::from_frame(&frame) {
        Ok(status) => print!("{}", detailed_status(&status, None)),
        Err(e) => println!("decode: {e}"),
    }
    Ok(())
}
