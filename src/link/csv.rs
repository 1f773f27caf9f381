//! CSV serialization of run logs.
//!
//! Transmit logs are `deltaTime,bit,message` rows; captures are
//! `deltaTime,blue,green,red,bit` rows with `N/A` standing in for bits
//! that never decoded. The reader accepts capture rows without the bit
//! column, which is what an external intensity-extraction tool produces.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use crate::error::{LinkError, Result};
use crate::link::log::{FrameSample, RunLog, Symbol};
use crate::phy::Bit;

pub const TRANSMIT_HEADER: &str = "deltaTime,bit,message";
pub const CAPTURE_HEADER: &str = "deltaTime,blue,green,red,bit";

pub fn write_transmit_log<P: AsRef<Path>>(path: P, log: &RunLog) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{TRANSMIT_HEADER}")?;
    for symbol in log.symbols() {
        write!(out, "{},{}", symbol.elapsed.as_secs_f64(), symbol.bit)?;
        match &symbol.note {
            Some(note) => writeln!(out, ",{note}")?,
            None => writeln!(out)?,
        }
    }
    out.flush()?;
    Ok(())
}

pub fn read_transmit_log<P: AsRef<Path>>(path: P) -> Result<Vec<Symbol>> {
    let reader = BufReader::new(File::open(path)?);
    let mut symbols = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line_no == 0 || line.trim().is_empty() {
            continue; // header
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 2 {
            return Err(malformed(line_no, "expected deltaTime,bit[,message]"));
        }
        let elapsed = parse_seconds(fields[0], line_no)?;
        let bit = parse_bit(fields[1], line_no)?;
        let note = fields
            .get(2)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(String::from);
        symbols.push(Symbol {
            index: symbols.len(),
            elapsed,
            bit,
            note,
        });
    }
    Ok(symbols)
}

pub fn write_capture_log<P: AsRef<Path>>(path: P, samples: &[FrameSample]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{CAPTURE_HEADER}")?;
    for sample in samples {
        writeln!(
            out,
            "{},{},{},{},{}",
            sample.elapsed.as_secs_f64(),
            sample.channels[0],
            sample.channels[1],
            sample.channels[2],
            sample.bit
        )?;
    }
    out.flush()?;
    Ok(())
}

pub fn read_capture_log<P: AsRef<Path>>(path: P) -> Result<Vec<FrameSample>> {
    let reader = BufReader::new(File::open(path)?);
    let mut samples = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line_no == 0 || line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 4 {
            return Err(malformed(line_no, "expected deltaTime,blue,green,red[,bit]"));
        }
        let elapsed = parse_seconds(fields[0], line_no)?;
        let mut channels = [0.0f64; 3];
        for (slot, field) in channels.iter_mut().zip(&fields[1..4]) {
            *slot = field.trim().parse().map_err(|_| {
                malformed(line_no, &format!("unparseable channel value {field:?}"))
            })?;
        }
        let bit = match fields.get(4) {
            Some(field) => parse_bit(field, line_no)?,
            None => Bit::Unknown,
        };
        samples.push(FrameSample {
            elapsed,
            channels,
            bit,
        });
    }
    Ok(samples)
}

fn parse_seconds(field: &str, line_no: usize) -> Result<Duration> {
    let seconds: f64 = field
        .trim()
        .parse()
        .map_err(|_| malformed(line_no, &format!("unparseable deltaTime {field:?}")))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(malformed(line_no, &format!("deltaTime out of range: {seconds}")));
    }
    Ok(Duration::from_secs_f64(seconds))
}

fn parse_bit(field: &str, line_no: usize) -> Result<Bit> {
    match field.trim() {
        "0" => Ok(Bit::Zero),
        "1" => Ok(Bit::One),
        "" | "N/A" => Ok(Bit::Unknown),
        other => Err(malformed(line_no, &format!("unparseable bit {other:?}"))),
    }
}

fn malformed(line_no: usize, reason: &str) -> LinkError {
    LinkError::MalformedRecord {
        line: line_no + 1,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("lightlink_csv_test");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_transmit_log_round_trip() {
        let mut log = RunLog::new();
        log.push(Duration::from_secs_f64(0.0), Bit::One, None);
        log.push(
            Duration::from_secs_f64(0.04),
            Bit::Unknown,
            Some("bit dropped".into()),
        );
        log.push(Duration::from_secs_f64(0.08), Bit::Zero, None);

        let path = temp_path("transmit.csv");
        write_transmit_log(&path, &log).unwrap();
        let symbols = read_transmit_log(&path).unwrap();

        assert_eq!(symbols.len(), 3);
        assert_eq!(symbols[0].bit, Bit::One);
        assert_eq!(symbols[1].bit, Bit::Unknown);
        assert_eq!(symbols[1].note.as_deref(), Some("bit dropped"));
        assert_eq!(symbols[2].index, 2);
    }

    #[test]
    fn test_capture_log_round_trip() {
        let samples = vec![
            FrameSample {
                elapsed: Duration::ZERO,
                channels: [180.5, 40.0, 38.25],
                bit: Bit::One,
            },
            FrameSample {
                elapsed: Duration::from_secs_f64(0.01),
                channels: [52.0, 41.0, 40.0],
                bit: Bit::Unknown,
            },
        ];

        let path = temp_path("capture.csv");
        write_capture_log(&path, &samples).unwrap();
        let read_back = read_capture_log(&path).unwrap();
        assert_eq!(read_back, samples);
    }

    #[test]
    fn test_capture_rows_without_bit_column() {
        let path = temp_path("raw_capture.csv");
        std::fs::write(&path, "deltaTime,blue,green,red\n0.0,10,20,30\n0.01,11,21,31\n").unwrap();
        let samples = read_capture_log(&path).unwrap();
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.bit == Bit::Unknown));
        assert_eq!(samples[1].channels, [11.0, 21.0, 31.0]);
    }

    #[test]
    fn test_malformed_row_is_reported_with_line_number() {
        let path = temp_path("broken.csv");
        std::fs::write(&path, "deltaTime,bit,message\nnot-a-number,1\n").unwrap();
        match read_transmit_log(&path) {
            Err(LinkError::MalformedRecord { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }
}
