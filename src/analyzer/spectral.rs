use ndarray::Array2;
use realfft::RealFftPlanner;
use thiserror::Error;

use crate::analyzer::decode::SampleBuffer;
use crate::config::StftConfig;

/// Added to power before the logarithm so zero-energy bins land on a
/// finite floor: 10·log10(1e-10) = −100 dB.
pub const DB_EPSILON: f32 = 1e-10;

/// Energy floor in dB, matching `10 * log10(DB_EPSILON)`.
pub const DB_FLOOR: f32 = -100.0;

#[derive(Error, Debug)]
pub enum SpectralError {
    #[error("invalid STFT parameters: window {window} must be greater than overlap {overlap}")]
    InvalidParams { window: usize, overlap: usize },
    #[error("input too short: {samples} samples, need {window} for one analysis window")]
    InsufficientData { samples: usize, window: usize },
    #[error("sample rate must be positive")]
    ZeroSampleRate,
}

/// Magnitude-in-dB spectrogram. `energy_db` is indexed [frequency, time]
/// with `nrows() == frequencies.len()` and `ncols() == times.len()`.
/// All values are finite.
#[derive(Debug, Clone)]
pub struct Spectrogram {
    /// Frequency bin centers, ascending, Hz. Spans [0, sample_rate / 2].
    pub frequencies: Vec<f32>,
    /// Frame start times, ascending, seconds. Step = hop / sample_rate.
    pub times: Vec<f32>,
    /// Power in dB per [frequency, time] cell.
    pub energy_db: Array2<f32>,
}

impl Spectrogram {
    /// Highest representable frequency (sample_rate / 2).
    pub fn nyquist(&self) -> f32 {
        *self.frequencies.last().unwrap_or(&0.0)
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}

/// Compute a magnitude-in-dB spectrogram from a mono sample buffer.
///
/// Hann-windowed overlapping frames, real FFT, power = |X[k]|², then
/// `10 * log10(power + DB_EPSILON)`. Input shorter than one window is an
/// error rather than being padded — a sub-window recording has no stable
/// spectral estimate and the caller must know it was skipped.
pub fn compute_spectrogram(
    buffer: &SampleBuffer,
    params: &StftConfig,
) -> Result<Spectrogram, SpectralError> {
    let window_size = params.window_size;
    let overlap = params.overlap;

    // A 1-sample window would make the Hann denominator zero and leak
    // NaN into the energy matrix, so 2 is the smallest legal window.
    if window_size < 2 || overlap >= window_size {
        return Err(SpectralError::InvalidParams {
            window: window_size,
            overlap,
        });
    }
    if buffer.sample_rate == 0 {
        return Err(SpectralError::ZeroSampleRate);
    }
    if buffer.samples.len() < window_size {
        return Err(SpectralError::InsufficientData {
            samples: buffer.samples.len(),
            window: window_size,
        });
    }

    let hop = window_size - overlap;
    let n_frames = (buffer.samples.len() - window_size) / hop + 1;
    let n_bins = window_size / 2 + 1;
    let sample_rate = buffer.sample_rate as f32;

    let fft = RealFftPlanner::<f32>::new().plan_fft_forward(window_size);
    let window = hann_window(window_size);

    // Reusable FFT buffers, filled in-place per frame
    let mut input = fft.make_input_vec();
    let mut spectrum = fft.make_output_vec();

    let mut energy_db = Array2::zeros((n_bins, n_frames));

    for frame_i in 0..n_frames {
        let pos = frame_i * hop;
        for (inp, (&s, &w)) in input
            .iter_mut()
            .zip(buffer.samples[pos..pos + window_size].iter().zip(window.iter()))
        {
            *inp = s * w;
        }

        fft.process(&mut input, &mut spectrum)
            .expect("FFT sizes are fixed by the planner");

        for (bin, c) in spectrum.iter().enumerate() {
            let power = c.norm_sqr();
            energy_db[[bin, frame_i]] = 10.0 * (power + DB_EPSILON).log10();
        }
    }

    let frequencies: Vec<f32> = (0..n_bins)
        .map(|k| k as f32 * sample_rate / window_size as f32)
        .collect();
    let times: Vec<f32> = (0..n_frames)
        .map(|i| (i * hop) as f32 / sample_rate)
        .collect();

    Ok(Spectrogram {
        frequencies,
        times,
        energy_db,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_buffer(freq: f64, amplitude: f64, sample_rate: u32, n: usize) -> SampleBuffer {
        let samples: Vec<f32> = (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (amplitude * (2.0 * std::f64::consts::PI * freq * t).sin()) as f32
            })
            .collect();
        SampleBuffer {
            samples,
            sample_rate,
        }
    }

    #[test]
    fn test_shapes_match_axes() {
        let buffer = sine_buffer(440.0, 1.0, 44_100, 44_100);
        let spec = compute_spectrogram(&buffer, &StftConfig::default()).unwrap();

        assert_eq!(spec.energy_db.nrows(), spec.frequencies.len());
        assert_eq!(spec.energy_db.ncols(), spec.times.len());
        assert_eq!(spec.frequencies.len(), 4096 / 2 + 1);
        assert_eq!(spec.frequencies[0], 0.0);
        assert!((spec.nyquist() - 22_050.0).abs() < 1e-3);
        assert!(spec.energy_db.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_sine_peak_within_one_bin() {
        let buffer = sine_buffer(1000.0, 1.0, 44_100, 44_100);
        let spec = compute_spectrogram(&buffer, &StftConfig::default()).unwrap();

        // Peak of the middle frame should sit within one bin of 1 kHz
        let col = spec.energy_db.ncols() / 2;
        let peak_bin = (0..spec.energy_db.nrows())
            .max_by(|&a, &b| {
                spec.energy_db[[a, col]]
                    .partial_cmp(&spec.energy_db[[b, col]])
                    .unwrap()
            })
            .unwrap();
        let bin_width = 44_100.0 / 4096.0;
        assert!((spec.frequencies[peak_bin] - 1000.0).abs() <= bin_width);
    }

    #[test]
    fn test_silence_hits_exact_floor() {
        let buffer = SampleBuffer {
            samples: vec![0.0; 8192],
            sample_rate: 44_100,
        };
        let spec = compute_spectrogram(&buffer, &StftConfig::default()).unwrap();
        for &v in spec.energy_db.iter() {
            assert!((v - DB_FLOOR).abs() < 1e-3, "expected floor, got {}", v);
        }
    }

    #[test]
    fn test_short_input_is_an_error() {
        let buffer = SampleBuffer {
            samples: vec![0.0; 4095],
            sample_rate: 44_100,
        };
        match compute_spectrogram(&buffer, &StftConfig::default()) {
            Err(SpectralError::InsufficientData { samples, window }) => {
                assert_eq!(samples, 4095);
                assert_eq!(window, 4096);
            }
            other => panic!("expected InsufficientData, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_overlap_must_be_smaller_than_window() {
        let buffer = sine_buffer(100.0, 1.0, 44_100, 8192);
        let params = StftConfig {
            window_size: 1024,
            overlap: 1024,
        };
        assert!(matches!(
            compute_spectrogram(&buffer, &params),
            Err(SpectralError::InvalidParams { .. })
        ));
    }

    #[test]
    fn test_single_sample_window_is_rejected() {
        let buffer = sine_buffer(100.0, 1.0, 44_100, 8192);
        let params = StftConfig {
            window_size: 1,
            overlap: 0,
        };
        assert!(matches!(
            compute_spectrogram(&buffer, &params),
            Err(SpectralError::InvalidParams { .. })
        ));
    }

    #[test]
    fn test_time_axis_step() {
        let buffer = sine_buffer(100.0, 1.0, 44_100, 44_100);
        let spec = compute_spectrogram(&buffer, &StftConfig::default()).unwrap();
        assert_eq!(spec.times[0], 0.0);
        let hop_secs = 2048.0 / 44_100.0;
        assert!((spec.times[1] - hop_secs).abs() < 1e-6);
    }
}
