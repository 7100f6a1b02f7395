//! MtkGps CLI - bench tool for MTK receivers
//!
//! Thin front end over `mtkgps_core` for poking a receiver on a serial port
//! and inspecting captured NMEA offline.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use mtkgps_core::cli::{print_exit_codes, CliResult, ExitCodes};
use mtkgps_core::config::{self, AppConfig, ConfigError};
use mtkgps_core::core::protocol::pmtk;
use mtkgps_core::core::protocol::{CommandError, NmeaError, SentenceKind};
use mtkgps_core::core::session::{ParseOutcome, ReceiverError, UNKNOWN_RELEASE};
use mtkgps_core::core::transport::{list_ports, SerialTransport, TransportError};
use mtkgps_core::core::{detect, ProbeOutcome, ReceiverSession, SentenceLogger};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// CLI output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format for scripting
    Json,
}

/// MtkGps CLI
#[derive(Parser, Debug)]
#[command(
    name = "mtkgps",
    version,
    about = "Bench tool for MediaTek NMEA GPS receivers",
    long_about = None
)]
struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file instead of the platform default
    #[arg(long, env = "MTKGPS_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Port selection shared by every command that talks to a receiver
#[derive(clap::Args, Debug, Clone)]
struct PortArgs {
    /// Serial port name (e.g., COM3, /dev/ttyUSB0); defaults to the configured port
    #[arg(short, long)]
    port: Option<String>,

    /// Link speed; defaults to the configured rate
    #[arg(short, long)]
    baud: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available serial ports
    Ports {
        /// Show detailed info
        #[arg(short, long)]
        detailed: bool,
    },

    /// Find the rate the receiver is talking at
    Detect {
        /// Serial port name
        #[arg(short, long)]
        port: Option<String>,

        /// Listen window per candidate (ms)
        #[arg(long)]
        window: Option<u64>,
    },

    /// Decode live output until Ctrl+C
    Monitor {
        #[command(flatten)]
        link: PortArgs,

        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,

        /// Echo raw sentences
        #[arg(long)]
        nmea: bool,

        /// Capture traffic to this file
        #[arg(short = 'l', long)]
        log: Option<PathBuf>,
    },

    /// Send one PMTK command
    Send {
        #[command(flatten)]
        link: PortArgs,

        /// Command code (0-999)
        code: u16,

        /// Optional numeric argument
        arg: Option<u32>,

        /// How long to wait for the acknowledgement (ms)
        #[arg(long, default_value = "1000")]
        wait: u64,
    },

    /// Send `$PMTK<BODY>` with the checksum appended
    Raw {
        #[command(flatten)]
        link: PortArgs,

        /// Text after `$PMTK`, e.g. `220,200`
        body: String,
    },

    /// Query the firmware release
    Release {
        #[command(flatten)]
        link: PortArgs,

        /// How long to wait for the reply (ms)
        #[arg(long, default_value = "2000")]
        wait: u64,
    },

    /// Switch receiver and port speed
    Baud {
        /// Serial port name
        #[arg(short, long)]
        port: Option<String>,

        /// Current receiver speed
        #[arg(long)]
        from: u32,

        /// New speed
        #[arg(long)]
        to: u32,
    },

    /// Apply the configured output-rate masks
    Output {
        #[command(flatten)]
        link: PortArgs,
    },

    /// Validate and decode a captured NMEA file
    Decode {
        /// Capture file, one sentence per line
        file: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Print the exit code table
    ExitCodes,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let result = match run(&cli) {
        Ok(result) => result,
        Err(err) => error_result(err),
    };

    if let Some(msg) = result.message() {
        if result.is_success() {
            if !cli.quiet {
                eprintln!("{}", msg);
            }
        } else {
            eprintln!("Error: {}", msg);
        }
    }
    result.to_exit_code()
}

fn init_tracing(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    // Scripts reading JSON on stdout get JSON records on stderr too
    match cli.format {
        OutputFormat::Json => builder.json().init(),
        OutputFormat::Text => builder.init(),
    }
}

fn run(cli: &Cli) -> anyhow::Result<CliResult> {
    match &cli.command {
        Commands::Ports { detailed } => ports(cli, *detailed),
        Commands::Config { action } => handle_config(cli, action),
        Commands::ExitCodes => {
            print_exit_codes();
            Ok(CliResult::success())
        }
        Commands::Decode { file } => decode_file(cli, file),
        Commands::Detect { port, window } => {
            run_detect(cli, &load_config(cli)?, port.as_deref(), *window)
        }
        Commands::Monitor { link, seconds, nmea, log } => {
            monitor(cli, &load_config(cli)?, link, *seconds, *nmea, log.as_deref())
        }
        Commands::Send { link, code, arg, wait } => send(&load_config(cli)?, link, *code, *arg, *wait),
        Commands::Raw { link, body } => raw(&load_config(cli)?, link, body),
        Commands::Release { link, wait } => release(&load_config(cli)?, link, *wait),
        Commands::Baud { port, from, to } => switch_baud(&load_config(cli)?, port.as_deref(), *from, *to),
        Commands::Output { link } => apply_output(&load_config(cli)?, link),
    }
}

/// Map library errors carried through `anyhow` to exit codes
fn error_result(err: anyhow::Error) -> CliResult {
    let err = match err.downcast::<ReceiverError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<TransportError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<CommandError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<NmeaError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    let err = match err.downcast::<ConfigError>() {
        Ok(e) => return e.into(),
        Err(err) => err,
    };
    match err.downcast::<std::io::Error>() {
        Ok(e) => e.into(),
        Err(err) => CliResult::error(ExitCodes::ERROR, format!("{:#}", err)),
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
}

/// Open the link at the requested (or configured) rate
fn connect(
    config: &AppConfig,
    port: Option<&str>,
    baud: Option<u32>,
) -> Result<(ReceiverSession, SerialTransport), ReceiverError> {
    let mut serial = config.receiver.serial.clone();
    if let Some(port) = port {
        serial.port = port.to_string();
    }
    if serial.port.is_empty() {
        return Err(TransportError::InvalidConfiguration(
            "no port given and none configured".into(),
        )
        .into());
    }

    let mut session = config.receiver.session();
    let mut link = SerialTransport::new(serial);
    session.begin(&mut link, baud.unwrap_or(config.receiver.baud_rate))?;
    info!("connected to {}", link.connection_info());
    Ok((session, link))
}

/// Poll and parse until `done` holds or the wait runs out
fn wait_for(
    session: &mut ReceiverSession,
    link: &mut SerialTransport,
    wait: Duration,
    mut done: impl FnMut(&ReceiverSession) -> bool,
) -> Result<bool, TransportError> {
    let started = Instant::now();
    while started.elapsed() < wait {
        match session.poll(link)? {
            Some(line) => {
                if let Err(e) = session.parse(&line) {
                    debug!("discarded line: {}", e);
                } else if done(session) {
                    return Ok(true);
                }
            }
            None => std::thread::sleep(Duration::from_millis(2)),
        }
    }
    Ok(false)
}

fn ports(cli: &Cli, detailed: bool) -> anyhow::Result<CliResult> {
    let ports = list_ports()?;

    if ports.is_empty() {
        if cli.format == OutputFormat::Json {
            println!("[]");
        } else if !cli.quiet {
            println!("No serial ports found.");
        }
        return Ok(CliResult::success());
    }

    match cli.format {
        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = ports
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "name": p.port_name,
                        "type": format!("{:?}", p.port_type)
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if detailed {
                println!("Available Serial Ports:");
                println!("{:-<60}", "");
                for port in &ports {
                    println!("  {} [{:?}]", port.port_name, port.port_type);
                }
            } else {
                for port in &ports {
                    println!("{}", port.port_name);
                }
            }
        }
    }

    Ok(CliResult::success())
}

fn run_detect(
    cli: &Cli,
    config: &AppConfig,
    port: Option<&str>,
    window: Option<u64>,
) -> anyhow::Result<CliResult> {
    let mut serial = config.receiver.serial.clone();
    if let Some(port) = port {
        serial.port = port.to_string();
    }
    if serial.port.is_empty() {
        return Ok(CliResult::error(ExitCodes::INVALID_ARGS, "no port given and none configured"));
    }
    let name = serial.port.clone();

    let mut probe = config.probe.clone();
    if let Some(ms) = window {
        probe = probe.window(Duration::from_millis(ms));
    }

    let mut session = config.receiver.session();
    let mut link = SerialTransport::new(serial);
    let outcome = detect(&mut session, &mut link, &probe)?;

    match cli.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "port": name, "baud_rate": outcome.rate() })
            );
        }
        OutputFormat::Text => {
            if let ProbeOutcome::Detected(rate) = outcome {
                println!("{}", rate);
            }
        }
    }

    Ok(match outcome {
        ProbeOutcome::Detected(_) => CliResult::success(),
        ProbeOutcome::NotDetected => CliResult::no_receiver(&name),
    })
}

fn monitor(
    cli: &Cli,
    config: &AppConfig,
    args: &PortArgs,
    seconds: Option<u64>,
    nmea: bool,
    log: Option<&Path>,
) -> anyhow::Result<CliResult> {
    let (mut session, mut link) = connect(config, args.port.as_deref(), args.baud)?;

    let capture = match log {
        Some(path) => Some(path.to_path_buf()),
        None if config.logging.enabled => config.logging.capture_path(),
        None => None,
    };
    if let Some(path) = capture {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let mut logger = SentenceLogger::to_file(&path, config.logging.format)
            .with_context(|| format!("opening capture file {}", path.display()))?;
        logger.set_timestamps(config.logging.timestamps);
        session.attach_logger(logger);
        info!("capturing to {}", path.display());
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    if !cli.quiet {
        eprintln!("Monitoring. Press Ctrl+C to exit.");
    }

    let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s));
    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }

        let Some(line) = session.poll(&mut link)? else {
            std::thread::sleep(Duration::from_millis(5));
            continue;
        };
        if nmea {
            println!("{}", line.trim_end());
        }
        match session.parse(&line) {
            Ok(ParseOutcome::Decoded(kind @ (SentenceKind::Rmc | SentenceKind::Gga))) => {
                if !nmea {
                    println!("{}", fix_summary(&session, kind));
                }
            }
            Ok(_) => {}
            Err(e) => debug!("discarded line: {}", e),
        }
    }

    if let Some(mut logger) = session.take_logger() {
        logger.stop();
    }
    let stats = session.port_stats();
    if !cli.quiet {
        eprintln!(
            "Disconnected. rx={} tx={} overflows={}",
            stats.rx, stats.tx, stats.overflows
        );
    }
    Ok(CliResult::success())
}

fn fix_summary(session: &ReceiverSession, kind: SentenceKind) -> String {
    let time = session
        .fix_time()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .or_else(|| session.fix_time_of_day().map(|t| t.format("%H:%M:%S").to_string()))
        .unwrap_or_else(|| "--:--:--".to_string());
    let position = session
        .position()
        .map_or_else(|| "no position".to_string(), |(lat, lon)| format!("{:.6},{:.6}", lat, lon));
    let gga = session.gga();
    format!(
        "{} {} {} {} sats={} hdop={}",
        kind,
        time,
        position,
        session.fix_quality_name(),
        gga.satellites_used,
        gga.hdop.map_or_else(|| "-".to_string(), |h| format!("{:.1}", h)),
    )
}

fn send(
    config: &AppConfig,
    args: &PortArgs,
    code: u16,
    arg: Option<u32>,
    wait: u64,
) -> anyhow::Result<CliResult> {
    let (mut session, mut link) = connect(config, args.port.as_deref(), args.baud)?;
    let line = session.send_command(&mut link, code, arg)?;
    println!("> {}", line);

    let acked = wait_for(&mut session, &mut link, Duration::from_millis(wait), |s| {
        s.last_ack().is_some_and(|ack| ack.command == code)
    })?;
    match session.last_ack() {
        Some(ack) if acked => {
            println!("{} ({}): {}", code, pmtk::command_name(code), ack.status);
            if ack.status.is_success() {
                Ok(CliResult::success())
            } else {
                Ok(CliResult::error(ExitCodes::COMMAND_REJECTED, format!("receiver answered: {}", ack.status)))
            }
        }
        _ => {
            warn!("no acknowledgement for {}", code);
            Ok(CliResult::success_with_message("sent, no acknowledgement seen"))
        }
    }
}

fn raw(config: &AppConfig, args: &PortArgs, body: &str) -> anyhow::Result<CliResult> {
    let (mut session, mut link) = connect(config, args.port.as_deref(), args.baud)?;
    let line = session.send_str(&mut link, &format!("$PMTK{}", body))?;
    println!("> {}", line);
    Ok(CliResult::success())
}

fn release(config: &AppConfig, args: &PortArgs, wait: u64) -> anyhow::Result<CliResult> {
    let (mut session, mut link) = connect(config, args.port.as_deref(), args.baud)?;
    session.query_release(&mut link)?;

    let seen = wait_for(&mut session, &mut link, Duration::from_millis(wait), |s| {
        s.firmware_release() != UNKNOWN_RELEASE
    })?;
    if seen {
        println!("{}", session.firmware_release());
        Ok(CliResult::success())
    } else {
        Ok(CliResult::timeout("no release reply from receiver"))
    }
}

fn switch_baud(config: &AppConfig, port: Option<&str>, from: u32, to: u32) -> anyhow::Result<CliResult> {
    pmtk::check_baud(to)?;
    let (mut session, mut link) = connect(config, port, Some(from))?;
    session.set_nmea_baud_rate(&mut link, to)?;
    session.begin(&mut link, to)?;

    let answered = wait_for(&mut session, &mut link, config.probe.window * 4, |_| true)?;
    if answered {
        Ok(CliResult::success_with_message(format!("receiver now at {} baud", to)))
    } else {
        warn!("nothing heard at {} baud", to);
        Ok(CliResult::no_receiver(&link.connection_info()))
    }
}

fn apply_output(config: &AppConfig, args: &PortArgs) -> anyhow::Result<CliResult> {
    let (mut session, mut link) = connect(config, args.port.as_deref(), args.baud)?;
    let line = session.set_output(&mut link, &config.output.to_masks())?;
    println!("> {}", line);
    Ok(CliResult::success())
}

fn decode_file(cli: &Cli, file: &Path) -> anyhow::Result<CliResult> {
    if !file.exists() {
        return Ok(CliResult::file_not_found(&file.display().to_string()));
    }
    let content = std::fs::read_to_string(file)?;

    let mut session = ReceiverSession::new();
    let mut decoded: BTreeMap<String, usize> = BTreeMap::new();
    let mut ignored = 0usize;
    let mut rejected = 0usize;

    for (number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match session.parse(line) {
            Ok(ParseOutcome::Decoded(kind)) => *decoded.entry(kind.to_string()).or_default() += 1,
            Ok(ParseOutcome::Ignored(_)) => ignored += 1,
            Err(e) => {
                rejected += 1;
                debug!("line {}: {}", number + 1, e);
            }
        }
    }

    let position = session.position();
    let fix_time = session.fix_time().map(|t| t.to_string());
    match cli.format {
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "file": file.display().to_string(),
                "decoded": decoded,
                "ignored": ignored,
                "rejected": rejected,
                "validity": session.validity().bits(),
                "position": position.map(|(lat, lon)| serde_json::json!({ "latitude": lat, "longitude": lon })),
                "fix_time": fix_time,
                "fix_quality": session.fix_quality_name(),
                "satellites": session.satellites(),
                "release": session.firmware_release(),
                "last_ack": session.last_ack(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            println!("File: {}", file.display());
            println!("{:-<60}", "");
            for (kind, count) in &decoded {
                println!("  {:<8} {}", kind, count);
            }
            println!("  ignored  {}", ignored);
            println!("  rejected {}", rejected);
            println!();
            match position {
                Some((lat, lon)) => println!("Position:   {:.6}, {:.6}", lat, lon),
                None => println!("Position:   none"),
            }
            println!("Fix time:   {}", fix_time.as_deref().unwrap_or("none"));
            println!("Quality:    {}", session.fix_quality_name());
            println!("Satellites: {} in view", session.satellites().len());
            println!("Release:    {}", session.firmware_release());
        }
    }

    Ok(CliResult::success())
}

fn handle_config(cli: &Cli, action: &ConfigAction) -> anyhow::Result<CliResult> {
    match action {
        ConfigAction::Show => {
            let config = load_config(cli)?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                OutputFormat::Text => print!("{}", toml::to_string_pretty(&config)?),
            }
        }
        ConfigAction::Init { force } => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => config::config_file().ok_or(ConfigError::NoConfigDir)?,
            };
            if path.exists() && !force {
                return Ok(CliResult::error(
                    ExitCodes::CONFIG_ERROR,
                    format!("{} already exists (use --force)", path.display()),
                ));
            }
            config::init_directories()?;
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let defaults = AppConfig::default();
            defaults.save_to(&path)?;
            return Ok(CliResult::success_with_message(format!("wrote {}", path.display())));
        }
        ConfigAction::Path => match config::config_file() {
            Some(path) => println!("{}", path.display()),
            None => return Err(ConfigError::NoConfigDir.into()),
        },
    }
    Ok(CliResult::success())
}
