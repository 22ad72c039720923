//! Random window selection for the inference service.
//!
//! The RNG is injected so tests can pin exact offsets with a seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Recording, Window};
use crate::error::DataError;

/// Draws uniformly random full windows from a recording
pub struct WindowSampler<R> {
    rng: R,
    window_size: usize,
}

impl WindowSampler<StdRng> {
    /// Sampler over `StdRng`, seeded when `seed` is given and from OS
    /// entropy otherwise
    pub fn seeded(seed: Option<u64>, window_size: usize) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng, window_size)
    }
}

impl<R: Rng> WindowSampler<R> {
    pub fn new(rng: R, window_size: usize) -> Self {
        Self { rng, window_size }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Uniform start offset in `[0, len - window_size]`
    ///
    /// Both ends are inclusive so the last full window can be drawn.
    pub fn next_offset(&mut self, recording_len: usize) -> Result<usize, DataError> {
        if self.window_size == 0 || recording_len < self.window_size {
            return Err(DataError::RecordingTooShort {
                required: self.window_size,
                available: recording_len,
            });
        }
        Ok(self.rng.gen_range(0..=recording_len - self.window_size))
    }

    /// Draw one full window from `recording`
    pub fn sample<'a>(&mut self, recording: &'a Recording) -> Result<Window<'a>, DataError> {
        let start = self.next_offset(recording.len())?;
        recording.window_at(start, self.window_size)
    }
}
