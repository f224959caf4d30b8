pub mod bands;
pub mod decode;
pub mod spectral;

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use walkdir::WalkDir;

use crate::config::AppConfig;
use crate::render::RenderError;
use crate::report::ReportError;
use crate::risk::{self, RiskLevel};
use crate::transcode::{self, TranscodeError};
use crate::{CONVERTED_SUFFIX, SUPPORTED_EXTENSIONS};
use bands::BandPeak;

/// Per-file failure. Contained at the batch boundary: logged with the
/// offending filename, file skipped, batch continues.
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("transcode error: {0}")]
    Transcode(#[from] TranscodeError),
    #[error("decode error: {0}")]
    Decode(#[from] decode::DecodeError),
    #[error("spectral error: {0}")]
    Spectral(#[from] spectral::SpectralError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("analysis timed out after {0}s")]
    Timeout(u64),
}

/// Batch-level failure. Unlike per-file errors these abort the run.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("input path is not a directory: {0}")]
    NotADirectory(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to write report: {0}")]
    Report(#[from] ReportError),
}

/// Result of analyzing one file. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub filename: String,
    pub lfn_peak: BandPeak,
    pub risk: RiskLevel,
    pub ultrasonic_peak: BandPeak,
    pub spectrogram_path: PathBuf,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub analyzed: u64,
    pub failed: u64,
    pub records: Vec<AnalysisRecord>,
    pub report_path: PathBuf,
    pub spectrogram_dir: PathBuf,
}

/// Analyze one wav file: decode -> spectrogram -> band peaks -> risk ->
/// PNG artifact -> record. Pure function of input + config, so running
/// it twice on the same file yields an identical record.
pub fn analyze_file(
    wav_path: &Path,
    label: &str,
    config: &AppConfig,
    spectrogram_dir: &Path,
) -> Result<AnalysisRecord, AnalyzeError> {
    let buffer = decode::load_wav(wav_path)?;
    let spectrogram = spectral::compute_spectrogram(&buffer, &config.stft)?;

    let (lfn_lo, lfn_hi) = config.bands.lfn;
    let lfn_peak = bands::extract_band(&spectrogram, lfn_lo, lfn_hi);

    let (ultra_lo, ultra_hi) = config.bands.ultrasonic;
    let ultrasonic_peak = bands::extract_band(&spectrogram, ultra_lo, ultra_hi);

    // The VAD model is defined on infrasound/low-frequency exposure, so
    // only the LFN band drives the classification.
    let risk = risk::classify(lfn_peak.energy_db, &config.thresholds);

    // Name the artifact from the full label, not its stem: inputs like
    // a.wav and a.mp3 share a stem, and concurrent pipeline invocations
    // must never write the same file.
    let spectrogram_path = spectrogram_dir.join(format!("{label}.png"));
    crate::render::render_spectrogram(
        &spectrogram,
        config.bands.display_max_hz,
        label,
        risk,
        &spectrogram_path,
    )?;

    Ok(AnalysisRecord {
        filename: label.to_string(),
        lfn_peak,
        risk,
        ultrasonic_peak,
        spectrogram_path,
    })
}

/// Analyze every supported audio file directly inside `input_dir`.
///
/// Non-wav inputs are transcoded to a sibling `<stem>_converted.wav`
/// first. Files are processed on a rayon pool in chunks; per-file
/// failures are logged and skipped, and the CSV report is written into
/// the input directory at the end (a report write failure is fatal).
pub fn analyze_directory(
    input_dir: &Path,
    config: &AppConfig,
    jobs: usize,
) -> Result<BatchOutcome, BatchError> {
    if !input_dir.is_dir() {
        return Err(BatchError::NotADirectory(
            input_dir.to_string_lossy().to_string(),
        ));
    }

    let files = list_audio_files(input_dir);
    log::info!(
        "Analyzing {} files in {} with {} workers",
        files.len(),
        input_dir.display(),
        jobs
    );

    let spectrogram_dir = input_dir.join(&config.output.spectrogram_dir);
    std::fs::create_dir_all(&spectrogram_dir)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap()
        .progress_chars("#>-"),
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .unwrap();

    let mut records: Vec<AnalysisRecord> = Vec::new();
    let mut failed: u64 = 0;

    // Process in chunks: analyze a chunk in parallel, collect, repeat.
    // Keeps memory bounded to one chunk of spectrograms at a time.
    let chunk_size = (jobs * 2).max(1);

    for chunk in files.chunks(chunk_size) {
        let results: Vec<(String, Result<AnalysisRecord, AnalyzeError>)> = pool.install(|| {
            use rayon::prelude::*;
            chunk
                .par_iter()
                .map(|path| {
                    let label = path
                        .file_name()
                        .map(|f| f.to_string_lossy().to_string())
                        .unwrap_or_default();
                    let result = {
                        let path = path.clone();
                        let input_dir = input_dir.to_path_buf();
                        let spectrogram_dir = spectrogram_dir.clone();
                        let config = config.clone();
                        run_with_timeout(config.timeout_secs, move || {
                            process_entry(&path, &input_dir, &spectrogram_dir, &config)
                        })
                    };
                    pb.inc(1);
                    (label, result)
                })
                .collect()
        });

        for (label, result) in results {
            match result {
                Ok(record) => {
                    pb.println(format!("  {} -> VAD risk: {}", label, record.risk));
                    records.push(record);
                }
                Err(e) => {
                    pb.println(format!("  {} -> error: {}", label, e));
                    log::warn!("Analysis failed for {}: {}", label, e);
                    failed += 1;
                }
            }
        }

        pb.set_message(format!("{} analyzed, {} failed", records.len(), failed));
    }

    pb.finish_with_message(format!("Done: {} analyzed, {} failed", records.len(), failed));

    // No partial-report recovery path: a report write failure is fatal
    let report_path = input_dir.join(&config.output.report_name);
    crate::report::write_report(&report_path, &records)?;

    Ok(BatchOutcome {
        analyzed: records.len() as u64,
        failed,
        records,
        report_path,
        spectrogram_dir,
    })
}

/// Enumerate supported audio files directly inside the input directory
/// (no recursion), sorted by name for a deterministic processing order.
/// Transcoder leftovers (`*_converted.wav`) are skipped so re-runs
/// don't analyze them twice.
fn list_audio_files(input_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(input_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| {
            let ext = p
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_lowercase();
            if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
                return false;
            }
            let stem = p.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            !stem.ends_with(CONVERTED_SUFFIX)
        })
        .collect();
    files.sort();
    files
}

/// Run one pipeline invocation bounded by the per-file timeout so a
/// pathological input can't stall the batch. On timeout the worker
/// thread is abandoned; it finishes in the background while the batch
/// moves on. A timeout of 0 disables the bound and runs inline.
fn run_with_timeout<F>(timeout_secs: u64, work: F) -> Result<AnalysisRecord, AnalyzeError>
where
    F: FnOnce() -> Result<AnalysisRecord, AnalyzeError> + Send + 'static,
{
    if timeout_secs == 0 {
        return work();
    }

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(work());
    });

    match rx.recv_timeout(Duration::from_secs(timeout_secs)) {
        Ok(result) => result,
        Err(_) => Err(AnalyzeError::Timeout(timeout_secs)),
    }
}

fn process_entry(
    path: &Path,
    input_dir: &Path,
    spectrogram_dir: &Path,
    config: &AppConfig,
) -> Result<AnalysisRecord, AnalyzeError> {
    let label = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let wav_path = if ext == "wav" {
        path.to_path_buf()
    } else {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or(&label);
        let converted = input_dir.join(format!("{stem}{CONVERTED_SUFFIX}.wav"));
        transcode::convert_to_wav(path, &converted)?;
        converted
    };

    analyze_file(&wav_path, &label, config, spectrogram_dir)
}
