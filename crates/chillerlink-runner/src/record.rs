//! Status capture records.
//!
//! The collector flattens a decoded status into one row per poll, stamped
//! with wall-clock time, and appends it as CSV or JSON lines.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use gree_protocol::{DecodedStatus, RawFrame};
use serde::Serialize;

/// One captured status row.
#[derive(Debug, Clone, Serialize)]
pub struct StatusRecord {
    /// Wall-clock capture time.
    pub timestamp: DateTime<Utc>,
    /// Seconds since the capture started.
    pub elapsed_secs: f64,
    /// Total frame length.
    pub frame_len: usize,
    /// Bit-packed power flag.
    pub power: Option<bool>,
    /// Bit-packed mode name.
    pub mode: Option<String>,
    /// Bit-packed fan speed.
    pub fan_speed: Option<u8>,
    /// Bit-packed setpoint in celsius.
    pub setpoint_c: Option<f64>,
    /// Fixed-offset vapor line temperature in celsius.
    pub vapor_temp_c: Option<i16>,
    /// Fixed-offset liquid line temperature in celsius.
    pub liquid_temp_c: Option<i16>,
    /// Fixed-offset operational byte.
    pub operational: Option<u8>,
    /// Fixed-offset liquid minus vapor differential in celsius.
    pub diff_c: Option<i16>,
    /// Long-status vapor pressure in bar.
    pub vapor_pressure_bar: Option<f64>,
    /// Long-status liquid pressure in kPa.
    pub liquid_pressure_kpa: Option<u16>,
    /// Long-status system mode byte.
    pub system_mode: Option<u8>,
    /// The raw frame as hex.
    pub raw_hex: String,
}

impl StatusRecord {
    /// Flatten a decoded status and its source frame into a row.
    pub fn new(
        timestamp: DateTime<Utc>,
        elapsed_secs: f64,
        status: &DecodedStatus,
        frame: &RawFrame,
    ) -> Self {
        let bp = status.bit_packed.as_ref();
        let fo = status.fixed_offset.as_ref();
        let ls = status.long_status.as_ref();

        StatusRecord {
            timestamp,
            elapsed_secs,
            frame_len: frame.len(),
            power: bp.map(|b| b.power_on),
            mode: bp.and_then(|b| b.mode).map(|m| m.to_string()),
            fan_speed: bp.map(|b| b.fan_speed),
            setpoint_c: bp.map(|b| b.setpoint_c),
            vapor_temp_c: fo.map(|f| f.vapor_temp_c),
            liquid_temp_c: fo.map(|f| f.liquid_temp_c),
            operational: fo.map(|f| f.operational),
            diff_c: fo.map(|f| f.differential_c()),
            vapor_pressure_bar: ls.map(|l| l.vapor_pressure_bar()),
            liquid_pressure_kpa: ls.map(|l| l.liquid_pressure_kpa),
            system_mode: ls.map(|l| l.system_mode),
            raw_hex: hex::encode(frame.as_bytes()),
        }
    }
}

/// Capture file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordFormat {
    /// Comma-separated rows with a header line.
    Csv,
    /// One JSON object per line.
    Jsonl,
}

const CSV_HEADER: &str = "timestamp,elapsed_secs,frame_len,power,mode,fan_speed,setpoint_c,\
vapor_temp_c,liquid_temp_c,operational,diff_c,vapor_pressure_bar,liquid_pressure_kpa,\
system_mode,raw_hex";

/// Appends records to a file in the chosen format.
pub struct RecordWriter {
    out: BufWriter<File>,
    format: RecordFormat,
    rows: usize,
}

impl RecordWriter {
    /// Create the output file, writing the CSV header if applicable.
    pub fn create(path: &Path, format: RecordFormat) -> io::Result<Self> {
        let mut out = BufWriter::new(File::create(path)?);
        if format == RecordFormat::Csv {
            writeln!(out, "{CSV_HEADER}")?;
        }
        Ok(RecordWriter {
            out,
            format,
            rows: 0,
        })
    }

    /// Append one record and flush so a killed capture loses nothing.
    pub fn write(&mut self, record: &StatusRecord) -> io::Result<()> {
        match self.format {
            RecordFormat::Csv => {
                writeln!(self.out, "{}", csv_row(record))?;
            }
            RecordFormat::Jsonl => {
                serde_json::to_writer(&mut self.out, record)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }
}

fn csv_row(record: &StatusRecord) -> String {
    let mut row = String::new();
    let _ = write!(
        row,
        "{},{:.1},{}",
        record.timestamp.to_rfc3339(),
        record.elapsed_secs,
        record.frame_len
    );
    push_cell(&mut row, record.power.as_ref());
    push_cell(&mut row, record.mode.as_ref());
    push_cell(&mut row, record.fan_speed.as_ref());
    push_cell(&mut row, record.setpoint_c.as_ref());
    push_cell(&mut row, record.vapor_temp_c.as_ref());
    push_cell(&mut row, record.liquid_temp_c.as_ref());
    push_cell(&mut row, record.operational.as_ref());
    push_cell(&mut row, record.diff_c.as_ref());
    push_cell(&mut row, record.vapor_pressure_bar.as_ref());
    push_cell(&mut row, record.liquid_pressure_kpa.as_ref());
    push_cell(&mut row, record.system_mode.as_ref());
    row.push(',');
    row.push_str(&record.raw_hex);
    row
}

/// Empty cell for a missing field; none of the values need quoting.
fn push_cell<T: std::fmt::Display>(row: &mut String, value: Option<&T>) {
    row.push(',');
    if let Some(value) = value {
        let _ = write!(row, "{value}");
    }
}
