// Feedback - fixed rule table mapping mean amplitude to patient feedback
//
// This is the policy behind `/simulate_eeg`. It looks at the mean amplitude
// only; the standard deviation, dominant frequency and the trained classifier
// play no part. Both boundaries are strict:
//
// 1. IF amplitude > 60 THEN Seizure
// 2. ELSE IF amplitude > 40 THEN Engaged
// 3. ELSE Relaxed (including NaN)

use serde::{Deserialize, Serialize};

/// Mean amplitude above which a seizure is reported
pub const SEIZURE_THRESHOLD: f64 = 60.0;

/// Mean amplitude above which the patient is reported as engaged
pub const ENGAGED_THRESHOLD: f64 = 40.0;

/// Feedback tier for one window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    /// Immediate spike above the seizure threshold
    Seizure,
    /// Alpha wave dominant
    Engaged,
    /// Theta wave dominant
    Relaxed,
}

impl Feedback {
    /// Apply the threshold table to a mean amplitude
    pub fn from_amplitude(amplitude: f64) -> Self {
        if amplitude > SEIZURE_THRESHOLD {
            Feedback::Seizure
        } else if amplitude > ENGAGED_THRESHOLD {
            Feedback::Engaged
        } else {
            Feedback::Relaxed
        }
    }

    /// Message returned to clients
    ///
    /// Clients key off the substrings "Seizure", "engaged" and "relaxed".
    pub fn message(&self) -> &'static str {
        match self {
            Feedback::Seizure => "Seizure detected (immediate spike above 60 amplitude)",
            Feedback::Engaged => "Patient is engaged (Alpha wave dominant)",
            Feedback::Relaxed => "Patient is relaxed (Theta wave dominant)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seizure_tier() {
        assert_eq!(Feedback::from_amplitude(61.0), Feedback::Seizure);
        assert_eq!(Feedback::from_amplitude(250.0), Feedback::Seizure);
        assert!(Feedback::from_amplitude(61.0).message().contains("Seizure"));
    }

    #[test]
    fn test_engaged_tier() {
        assert_eq!(Feedback::from_amplitude(45.0), Feedback::Engaged);
        assert!(Feedback::from_amplitude(45.0).message().contains("engaged"));
    }

    #[test]
    fn test_relaxed_tier() {
        assert_eq!(Feedback::from_amplitude(10.0), Feedback::Relaxed);
        assert_eq!(Feedback::from_amplitude(-5.0), Feedback::Relaxed);
        assert!(Feedback::from_amplitude(10.0).message().contains("relaxed"));
    }

    #[test]
    fn test_boundaries_are_strict() {
        // Exactly at the seizure threshold is engaged, not seizure
        assert_eq!(Feedback::from_amplitude(60.0), Feedback::Engaged);
        assert_eq!(Feedback::from_amplitude(60.000001), Feedback::Seizure);

        // Exactly at the engaged threshold is relaxed
        assert_eq!(Feedback::from_amplitude(40.0), Feedback::Relaxed);
        assert_eq!(Feedback::from_amplitude(40.000001), Feedback::Engaged);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            Feedback::Seizure.message(),
            "Seizure detected (immediate spike above 60 amplitude)"
        );
        assert_eq!(
            Feedback::Engaged.message(),
            "Patient is engaged (Alpha wave dominant)"
        );
        assert_eq!(
            Feedback::Relaxed.message(),
            "Patient is relaxed (Theta wave dominant)"
        );
    }

    #[test]
    fn test_nan_is_relaxed() {
        assert_eq!(Feedback::from_amplitude(f64::NAN), Feedback::Relaxed);
    }
}
