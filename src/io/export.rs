//! CSV export for market tick records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::TickRecord;

/// Column header for CSV telemetry export.
const HEADER: &str = "tick,time_hr,time_of_day,prosumers,aggregator,net_demand_kw,price,broadcast_receivers";

/// Exports tick records to a CSV file at the given path.
///
/// Writes a header row followed by one row per (tick, aggregator) pair.
/// Produces deterministic output for identical inputs.
///
/// # Arguments
///
/// * `records` - Complete tick records
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[TickRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes tick records as CSV to any writer.
///
/// `broadcast_receivers` is empty on ticks without a broadcast.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(records: &[TickRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for r in records {
        for a in &r.aggregators {
            wtr.write_record(&[
                r.tick.to_string(),
                format!("{:.2}", r.time_hr),
                r.time_of_day.to_string(),
                r.prosumers.to_string(),
                a.aggregator.0.to_string(),
                format!("{:.4}", a.net_demand_kw),
                format!("{:.4}", a.price),
                a.broadcast_receivers
                    .map(|n| n.to_string())
                    .unwrap_or_default(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
