use crate::scope::buffer::{Sample, SampleRingBuffer};
/// Number of samples that cover `window_seconds` at `sample_rate_hz`.
pub fn window_len(window_seconds: f64, sample_rate_hz: u32) -> usize {
    (window_seconds * f64::from(sample_rate_hz)).floor().max(0.0) as usize
}
/// The most recent `window_seconds` of the buffer, oldest first.
pub fn extract(buffer: &SampleRingBuffer, window_seconds: f64) -> Vec<Sample> {
    buffer.tail(window_len(window_seconds, buffer.sample_rate_hz()))
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn under_capacity_returns_everything() {
        let mut buffer = SampleRingBuffer::new(16_000, 10.0).unwrap();
        let batch: Vec<Sample> = (0..8_000).collect();
        for _ in 0..10 {
            buffer.append(&batch);
        }
        let window = extract(&buffer, 10.0);
        assert_eq!(window.len(), 80_000);
        assert_eq!(window[0], 0);
        assert_eq!(window[79_999], 7_999);
    }
    #[test]
    fn full_buffer_yields_latest_window_only() {
        let mut buffer = SampleRingBuffer::new(10, 2.0).unwrap();
        buffer.append(&(0..40).collect::<Vec<_>>());
        let window = extract(&buffer, 2.0);
        assert_eq!(window, (20..40).collect::<Vec<_>>());
    }
    #[test]
    fn fractional_window_rounds_down() {
        let mut buffer = SampleRingBuffer::new(3, 10.0).unwrap();
        buffer.append(&(0..30).collect::<Vec<_>>());
        assert_eq!(window_len(1.5, 3), 4);
        assert_eq!(extract(&buffer, 1.5), vec![26, 27, 28, 29]);
    }
    #[test]
    fn extract_does_not_mutate() {
        let mut buffer = SampleRingBuffer::new(10, 1.0).unwrap();
        buffer.append(&[1, 2, 3]);
        let _ = extract(&buffer, 1.0);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.total_samples(), 3);
    }
}
