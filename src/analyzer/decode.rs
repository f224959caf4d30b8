use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("wav decode error: {0}")]
    Wav(#[from] hound::Error),
    #[error("file has no audio channels: {0}")]
    NoChannels(String),
    #[error("file contains no samples: {0}")]
    Empty(String),
}

/// Mono amplitude samples plus their sample rate. Owned by exactly one
/// pipeline invocation and dropped when analysis completes.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl SampleBuffer {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Read a wav file into a mono `SampleBuffer`.
///
/// Integer formats are normalized to [-1, 1]. Multi-channel input is
/// reduced to mono by averaging channels per frame before analysis.
pub fn load_wav(path: &Path) -> Result<SampleBuffer, DecodeError> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(DecodeError::NoChannels(path.to_string_lossy().to_string()));
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    if interleaved.is_empty() {
        return Err(DecodeError::Empty(path.to_string_lossy().to_string()));
    }

    let samples = downmix(&interleaved, spec.channels as usize);

    Ok(SampleBuffer {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Average interleaved channels down to mono. A trailing partial frame
/// (truncated file) is averaged over the samples actually present.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}
