//! Run report and export
//!
//! Prints the console summary of an acquisition run and writes the series to
//! an export file for external plotting.

use anyhow::{bail, Context, Result};
use lcv_decoder::MeasurementSeries;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Export destination, resolved before acquisition starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub path: PathBuf,
    pub format: ExportFormat,
}

impl ExportTarget {
    pub fn new(path: &Path) -> Result<Self> {
        Ok(Self {
            path: path.to_path_buf(),
            format: ExportFormat::from_path(path)?,
        })
    }
}

/// Export formats, chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(ExportFormat::Csv),
            Some("json") => Ok(ExportFormat::Json),
            _ => bail!("Unsupported export format: {:?} (use .csv or .json)", path),
        }
    }
}

/// Print the end-of-run summary
pub fn print_summary(series: &MeasurementSeries) {
    println!("Readings complete");
    println!("Readings received: {}", series.len());

    println!("\n📊 Run Summary:");
    println!("  Started:           {}", series.started_at.format("%Y-%m-%d %H:%M:%S%.3f UTC"));
    println!("  Stop reason:       {}", series.stop_reason);
    println!("  Checksum failures: {}", series.stats.checksum_failures);
    println!("  Empty attempts:    {}", series.stats.timeouts);
    println!("  Discarded bytes:   {}", series.stats.discarded_bytes);

    let Some(summary) = series.summary() else {
        return;
    };

    println!("───────────────────────────────────────────────");
    println!("  Span:      {:.3}s ({:.1} Hz)", summary.span_secs, summary.frame_rate_hz);
    println!(
        "  Pressure:  min {:>6}  max {:>6}  mean {:>8.2}",
        summary.pressure_min, summary.pressure_max, summary.pressure_mean
    );
    println!(
        "  Setpoint:  min {:>6}  max {:>6}",
        summary.setpoint_min, summary.setpoint_max
    );
    if let (Some(min), Some(max)) = (summary.output_min, summary.output_max) {
        println!("  Output:    min {:>6.3}  max {:>6.3}", min, max);
    }
}

/// Write the series to `path` in `format`
pub fn export(series: &MeasurementSeries, path: &Path, format: ExportFormat) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {:?}", path))?;
    let writer = BufWriter::new(file);

    match format {
        ExportFormat::Csv => series.write_csv(writer)?,
        ExportFormat::Json => series.write_json(writer)?,
    }

    log::info!("Wrote {} measurements to {:?}", series.len(), path);
    Ok(())
}
