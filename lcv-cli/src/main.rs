//! Low Cost Ventilator Telemetry CLI
//!
//! This is the command-line interface for the ventilator telemetry reader.
//! It uses the lcv-decoder library and adds:
//! - Serial port discovery
//! - Configuration file loading
//! - Replay of raw byte captures
//! - Console summary and CSV/JSON export

use anyhow::{Context, Result};
use clap::Parser;
use lcv_decoder::{Acquisition, AcquisitionConfig, MeasurementSeries, MemorySource, Schema, SerialSource};
use std::path::PathBuf;

mod config;
mod device;
mod report;

use config::AppConfig;
use report::ExportTarget;

/// LCV Telemetry - Acquire control-loop telemetry from the ventilator
#[derive(Parser, Debug)]
#[command(name = "lcv-cli")]
#[command(about = "Acquire pressure telemetry from the Low Cost Ventilator", long_about = None)]
#[command(version)]
struct Args {
    /// Acquisition time in seconds (default: 15.0)
    #[arg(value_name = "SECONDS")]
    duration: Option<f64>,

    /// Serial port to read from (default: auto-detect)
    #[arg(short, long, value_name = "PORT")]
    port: Option<String>,

    /// Serial baud rate
    #[arg(long, value_name = "BAUD")]
    baud: Option<u32>,

    /// Payload schema: two-field or three-field
    #[arg(short, long, value_name = "SCHEMA")]
    schema: Option<Schema>,

    /// Decode a raw byte capture instead of a live device
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Export file for the measurement series (.csv or .json)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// List available serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("LCV Telemetry CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", lcv_decoder::VERSION);

    if args.list_ports {
        return device::list_ports();
    }

    let app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    let acquisition_config = merge_acquisition_config(&app_config, &args);
    let acquisition = Acquisition::new(acquisition_config).context("Invalid run parameters")?;
    let export_target = resolve_export_target(&app_config, &args)?;

    let series = match &args.replay {
        Some(path) => replay_mode(&acquisition, path)?,
        None => device_mode(&acquisition, &app_config, &args)?,
    };

    report::print_summary(&series);

    if let Some(target) = &export_target {
        report::export(&series, &target.path, target.format)?;
    }

    Ok(())
}

/// Command-line values override the config file
fn merge_acquisition_config(app_config: &AppConfig, args: &Args) -> AcquisitionConfig {
    let mut config = app_config.acquisition.clone();
    if let Some(duration) = args.duration {
        config = config.with_run_duration_secs(duration);
    }
    if let Some(schema) = args.schema {
        config = config.with_schema(schema);
    }
    config
}

/// Check the export path up front so a bad extension fails before the run
fn resolve_export_target(app_config: &AppConfig, args: &Args) -> Result<Option<ExportTarget>> {
    args.output
        .as_ref()
        .or(app_config.output.path.as_ref())
        .map(|path| ExportTarget::new(path))
        .transpose()
}

/// Live mode - discover the ventilator and acquire from its serial port
fn device_mode(acquisition: &Acquisition, app_config: &AppConfig, args: &Args) -> Result<MeasurementSeries> {
    let port_name = match args.port.as_ref().or(app_config.device.port.as_ref()) {
        Some(port) => port.clone(),
        None => match device::find_ventilator_port(&app_config.device.port_match) {
            Ok(port) => port,
            Err(e) => {
                println!("Could not connect to Low Cost Ventilator");
                return Err(e);
            }
        },
    };

    let baud_rate = args.baud.unwrap_or(app_config.device.baud_rate);
    let mut source = SerialSource::open(&port_name, baud_rate)
        .with_context(|| format!("Failed to open serial port {}", port_name))?;
    println!("Connected to Low Cost Ventilator");

    let series = acquisition.run(&mut source);
    // Port closes when the source is dropped
    drop(source);

    Ok(series)
}

/// Replay mode - decode a raw capture file as if it came from the device
fn replay_mode(acquisition: &Acquisition, path: &PathBuf) -> Result<MeasurementSeries> {
    let mut source = MemorySource::from_file(path)
        .with_context(|| format!("Failed to load capture: {:?}", path))?;
    println!("Replaying capture {:?}", path);

    Ok(acquisition.run(&mut source))
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse_duration() {
        let args = Args::parse_from(["lcv-cli", "2.5", "--schema", "two-field"]);
        assert_eq!(args.duration, Some(2.5));
        assert_eq!(args.schema, Some(Schema::TwoField));
    }

    #[test]
    fn test_args_reject_non_numeric_duration() {
        assert!(Args::try_parse_from(["lcv-cli", "soon"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let app_config = AppConfig::default();
        let args = Args::parse_from(["lcv-cli", "3", "-s", "2"]);

        let config = merge_acquisition_config(&app_config, &args);
        assert_eq!(config.run_duration_secs, 3.0);
        assert_eq!(config.schema, Schema::TwoField);
        assert_eq!(config.attempt_timeout_ms, 100);
    }

    #[test]
    fn test_bad_export_extension_rejected_before_run() {
        let args = Args::parse_from(["lcv-cli", "15", "-o", "run.txt"]);
        assert!(resolve_export_target(&AppConfig::default(), &args).is_err());

        let args = Args::parse_from(["lcv-cli", "15", "-o", "run.json"]);
        let target = resolve_export_target(&AppConfig::default(), &args).unwrap();
        assert_eq!(target.map(|t| t.format), Some(report::ExportFormat::Json));
    }

    #[test]
    fn test_export_path_from_config() {
        let mut app_config = AppConfig::default();
        app_config.output.path = Some(PathBuf::from("run.csv"));
        let args = Args::parse_from(["lcv-cli"]);

        let target = resolve_export_target(&app_config, &args).unwrap().unwrap();
        assert_eq!(target.path, PathBuf::from("run.csv"));
        assert_eq!(target.format, report::ExportFormat::Csv);
    }

    #[test]
    fn test_defaults_without_arguments() {
        let args = Args::parse_from(["lcv-cli"]);
        let config = merge_acquisition_config(&AppConfig::default(), &args);
        assert_eq!(config.run_duration_secs, 15.0);
        assert_eq!(config.schema, Schema::ThreeField);
    }
}
