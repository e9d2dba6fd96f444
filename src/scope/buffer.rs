use std::collections::VecDeque;
use crate::scope::ScopeError;
/// One signed amplitude reading, in device units.
pub type Sample = i32;
/// How many windows of history the buffer keeps.
const HISTORY_WINDOWS: f64 = 2.0;
/// Sample rate and the capacity derived from it.
///
/// The two values only ever change together: a rate change builds a new
/// `RateConfig` and replaces the old one, so no reader can see a capacity
/// that belongs to a different rate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateConfig {
    sample_rate_hz: u32,
    capacity: usize,
}
impl RateConfig {
    pub fn new(sample_rate_hz: u32, window_seconds: f64) -> Result<Self, ScopeError> {
        if sample_rate_hz == 0 {
            return Err(ScopeError::InvalidSampleRate);
        }
        if !(window_seconds > 0.0) {
            return Err(ScopeError::InvalidWindow(window_seconds));
        }
        let capacity = (HISTORY_WINDOWS * window_seconds * f64::from(sample_rate_hz)).floor() as usize;
        Ok(Self {
            sample_rate_hz,
            capacity,
        })
    }
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
/// Bounded store of the most recent samples plus the running sample count.
///
/// `total_samples` counts everything appended since the last reset and only
/// feeds the time axis; it never goes backwards except through [`reset`].
///
/// [`reset`]: SampleRingBuffer::reset
#[derive(Debug)]
pub struct SampleRingBuffer {
    samples: VecDeque<Sample>,
    total_samples: u64,
    rate: RateConfig,
    window_seconds: f64,
}
impl SampleRingBuffer {
    pub fn new(sample_rate_hz: u32, window_seconds: f64) -> Result<Self, ScopeError> {
        let rate = RateConfig::new(sample_rate_hz, window_seconds)?;
        Ok(Self {
            samples: VecDeque::new(),
            total_samples: 0,
            rate,
            window_seconds,
        })
    }
    pub fn sample_rate_hz(&self) -> u32 {
        self.rate.sample_rate_hz()
    }
    pub fn capacity(&self) -> usize {
        self.rate.capacity()
    }
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }
    pub fn len(&self) -> usize {
        self.samples.len()
    }
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
    /// Appends in arrival order, evicting the oldest samples past capacity.
    pub fn append(&mut self, samples: &[Sample]) {
        if samples.is_empty() {
            return;
        }
        self.total_samples += samples.len() as u64;
        let capacity = self.rate.capacity();
        if samples.len() >= capacity {
            // The incoming batch alone fills the buffer.
            self.samples.clear();
            self.samples
                .extend(samples[samples.len() - capacity..].iter().copied());
            return;
        }
        let overflow = (self.samples.len() + samples.len()).saturating_sub(capacity);
        self.samples.drain(..overflow);
        self.samples.extend(samples.iter().copied());
    }
    /// Drops all buffered data and switches to `sample_rate_hz`.
    ///
    /// On an invalid rate the buffer is left untouched. Storage grows with
    /// what is appended, not with the announced capacity.
    pub fn reset(&mut self, sample_rate_hz: u32) -> Result<(), ScopeError> {
        let rate = RateConfig::new(sample_rate_hz, self.window_seconds)?;
        self.samples = VecDeque::new();
        self.total_samples = 0;
        self.rate = rate;
        Ok(())
    }
    /// The last `min(len, max_age_samples)` samples, oldest first.
    pub fn tail(&self, max_age_samples: usize) -> Vec<Sample> {
        let skip = self.samples.len().saturating_sub(max_age_samples);
        self.samples.iter().skip(skip).copied().collect()
    }
}
