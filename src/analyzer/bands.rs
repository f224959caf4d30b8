use crate::analyzer::spectral::{DB_FLOOR, Spectrogram};

/// Peak of one frequency band: the frequency of the bin holding the
/// band's global maximum energy, and that energy in dB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPeak {
    pub frequency: f32,
    pub energy_db: f32,
}

/// Sentinel returned when no frequency bins fall inside the requested
/// interval (e.g. an ultrasonic band on a low-sample-rate recording).
/// "Band not present" is a legitimate outcome, not an error.
pub const EMPTY_BAND: BandPeak = BandPeak {
    frequency: 0.0,
    energy_db: DB_FLOOR,
};

/// Find the peak of the closed frequency interval [lo, hi].
///
/// Scans the band's rows across all time bins and returns the global
/// maximum. Ties resolve to the first occurrence in row-major scan order
/// (lowest frequency, then earliest time).
pub fn extract_band(spec: &Spectrogram, lo: f32, hi: f32) -> BandPeak {
    let rows: Vec<usize> = spec
        .frequencies
        .iter()
        .enumerate()
        .filter(|&(_, &f)| f >= lo && f <= hi)
        .map(|(i, _)| i)
        .collect();

    if rows.is_empty() {
        return EMPTY_BAND;
    }

    let mut best = BandPeak {
        frequency: spec.frequencies[rows[0]],
        energy_db: f32::NEG_INFINITY,
    };

    for &row in &rows {
        for col in 0..spec.energy_db.ncols() {
            let v = spec.energy_db[[row, col]];
            if v > best.energy_db {
                best = BandPeak {
                    frequency: spec.frequencies[row],
                    energy_db: v,
                };
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Spectrogram with 10 Hz-spaced bins and a flat floor, with chosen
    /// cells raised to given energies.
    fn test_spectrogram(n_bins: usize, n_frames: usize, hot: &[(usize, usize, f32)]) -> Spectrogram {
        let mut energy_db = Array2::from_elem((n_bins, n_frames), DB_FLOOR);
        for &(row, col, db) in hot {
            energy_db[[row, col]] = db;
        }
        Spectrogram {
            frequencies: (0..n_bins).map(|i| i as f32 * 10.0).collect(),
            times: (0..n_frames).map(|i| i as f32 * 0.05).collect(),
            energy_db,
        }
    }

    #[test]
    fn test_peak_in_band() {
        // Peak at 50 Hz in frame 2; a louder cell outside the band must not win
        let spec = test_spectrogram(100, 4, &[(5, 2, 80.0), (40, 1, 95.0)]);
        let peak = extract_band(&spec, 1.0, 100.0);
        assert_eq!(peak.frequency, 50.0);
        assert_eq!(peak.energy_db, 80.0);
    }

    #[test]
    fn test_interval_endpoints_inclusive() {
        let spec = test_spectrogram(100, 2, &[(10, 0, 70.0)]);
        // 100 Hz bin sits exactly on the upper endpoint
        let peak = extract_band(&spec, 1.0, 100.0);
        assert_eq!(peak.frequency, 100.0);
        assert_eq!(peak.energy_db, 70.0);
    }

    #[test]
    fn test_band_above_nyquist_returns_sentinel() {
        // 16 kHz sample rate -> bins top out at 8 kHz
        let spec = Spectrogram {
            frequencies: (0..=800).map(|i| i as f32 * 10.0).collect(),
            times: vec![0.0],
            energy_db: Array2::from_elem((801, 1), 50.0),
        };
        let peak = extract_band(&spec, 20_000.0, 24_000.0);
        assert_eq!(peak, EMPTY_BAND);
        assert_eq!(peak.frequency, 0.0);
        assert_eq!(peak.energy_db, DB_FLOOR);
    }

    #[test]
    fn test_empty_interval_returns_sentinel() {
        let spec = test_spectrogram(100, 2, &[]);
        // lo > hi selects nothing
        assert_eq!(extract_band(&spec, 500.0, 400.0), EMPTY_BAND);
    }

    #[test]
    fn test_tie_breaks_to_first_in_scan_order() {
        // Same energy at (3, 1) and (7, 0): lowest frequency row wins
        let spec = test_spectrogram(100, 2, &[(3, 1, 66.0), (7, 0, 66.0)]);
        let peak = extract_band(&spec, 1.0, 100.0);
        assert_eq!(peak.frequency, 30.0);
    }

    #[test]
    fn test_uniform_floor_reports_floor() {
        let spec = test_spectrogram(100, 3, &[]);
        let peak = extract_band(&spec, 1.0, 100.0);
        assert_eq!(peak.energy_db, DB_FLOOR);
        // First in-band bin (10 Hz for lo = 1.0)
        assert_eq!(peak.frequency, 10.0);
    }
}
