use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::analyzer::AnalysisRecord;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One CSV row. Column names match the published report format.
#[derive(Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "Filename")]
    filename: &'a str,
    #[serde(rename = "LFN Peak (Hz)")]
    lfn_peak_hz: f32,
    #[serde(rename = "LFN dB")]
    lfn_db: f32,
    #[serde(rename = "VAD Risk")]
    vad_risk: &'static str,
    #[serde(rename = "Ultrasonic Peak (Hz)")]
    ultrasonic_peak_hz: f32,
    #[serde(rename = "Ultrasonic dB")]
    ultrasonic_db: f32,
    #[serde(rename = "Spectrogram")]
    spectrogram: String,
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}

const HEADER: [&str; 7] = [
    "Filename",
    "LFN Peak (Hz)",
    "LFN dB",
    "VAD Risk",
    "Ultrasonic Peak (Hz)",
    "Ultrasonic dB",
    "Spectrogram",
];

/// Write the batch report. One row per successfully analyzed file, in
/// file-processing order. Numeric fields are rounded to 2 decimals.
/// An empty batch still gets the header row.
pub fn write_report(path: &Path, records: &[AnalysisRecord]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    // serialize() only emits the header alongside the first row
    if records.is_empty() {
        writer.write_record(HEADER)?;
    }
    for record in records {
        writer.serialize(ReportRow {
            filename: &record.filename,
            lfn_peak_hz: round2(record.lfn_peak.frequency),
            lfn_db: round2(record.lfn_peak.energy_db),
            vad_risk: record.risk.as_str(),
            ultrasonic_peak_hz: round2(record.ultrasonic_peak.frequency),
            ultrasonic_db: round2(record.ultrasonic_peak.energy_db),
            spectrogram: record.spectrogram_path.to_string_lossy().to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}
