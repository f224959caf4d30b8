use std::fmt;

use crate::config::ThresholdConfig;

/// VAD exposure risk category, ordered by ascending severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Moderate => "MODERATE",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a peak energy (dB) to a risk level via the threshold ladder.
/// Boundary values exactly equal to a threshold map to the higher
/// category. Total over all finite inputs, no error path.
pub fn classify(db: f32, thresholds: &ThresholdConfig) -> RiskLevel {
    if db >= thresholds.critical {
        RiskLevel::Critical
    } else if db >= thresholds.high {
        RiskLevel::High
    } else if db >= thresholds.moderate {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_thresholds() -> ThresholdConfig {
        ThresholdConfig::default()
    }

    #[test]
    fn test_ladder() {
        let t = default_thresholds();
        assert_eq!(classify(-100.0, &t), RiskLevel::Low);
        assert_eq!(classify(59.99, &t), RiskLevel::Low);
        assert_eq!(classify(70.0, &t), RiskLevel::Moderate);
        assert_eq!(classify(80.0, &t), RiskLevel::High);
        assert_eq!(classify(120.0, &t), RiskLevel::Critical);
    }

    #[test]
    fn test_boundary_values_map_to_higher_category() {
        let t = default_thresholds();
        assert_eq!(classify(60.0, &t), RiskLevel::Moderate);
        assert_eq!(classify(75.0, &t), RiskLevel::High);
        assert_eq!(classify(90.0, &t), RiskLevel::Critical);
    }

    #[test]
    fn test_monotonic_over_sweep() {
        let t = default_thresholds();
        let mut prev = classify(-120.0, &t);
        let mut db = -120.0f32;
        while db <= 120.0 {
            let level = classify(db, &t);
            assert!(level >= prev, "classification regressed at {} dB", db);
            prev = level;
            db += 0.25;
        }
    }

    #[test]
    fn test_severity_order() {
        assert!(RiskLevel::Low < RiskLevel::Moderate);
        assert!(RiskLevel::Moderate < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = ThresholdConfig {
            critical: 10.0,
            high: 5.0,
            moderate: 0.0,
        };
        assert_eq!(classify(-0.1, &t), RiskLevel::Low);
        assert_eq!(classify(0.0, &t), RiskLevel::Moderate);
        assert_eq!(classify(12.0, &t), RiskLevel::Critical);
    }
}
