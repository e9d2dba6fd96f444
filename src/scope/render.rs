use std::time::Duration;
use crate::scope::buffer::SampleRingBuffer;
use crate::scope::downsample::decimate;
use crate::scope::sink::ViewerSink;
use crate::scope::window::{extract, window_len};
/// One chart refresh worth of data. Built fresh on every tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlotWindow {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}
impl PlotWindow {
    pub fn len(&self) -> usize {
        self.y.len()
    }
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
    pub fn points(&self) -> Vec<[f64; 2]> {
        self.x.iter().zip(&self.y).map(|(&x, &y)| [x, y]).collect()
    }
}
/// Axis configuration handed to the chart when it is (re)initialized.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartLayout {
    pub x_label: String,
    pub y_label: String,
    pub sample_rate_hz: u32,
    pub window_seconds: f64,
}
impl ChartLayout {
    pub fn new(sample_rate_hz: u32, window_seconds: f64) -> Self {
        Self {
            x_label: "Time (s)".to_owned(),
            y_label: "Amplitude (i16)".to_owned(),
            sample_rate_hz,
            window_seconds,
        }
    }
    /// Flat zero trace spanning the start of the axis, used until the first tick.
    pub fn seed(&self, max_points: usize) -> PlotWindow {
        let n = window_len(self.window_seconds, self.sample_rate_hz).min(max_points);
        let rate = f64::from(self.sample_rate_hz);
        PlotWindow {
            x: (0..n).map(|i| i as f64 / rate).collect(),
            y: vec![0.0; n],
        }
    }
}
/// Builds the scrolling window on a fixed period, independent of arrivals.
#[derive(Clone, Debug)]
pub struct RenderScheduler {
    window_seconds: f64,
    max_points: usize,
    period: Duration,
}
impl RenderScheduler {
    pub fn new(window_seconds: f64, max_points: usize, period: Duration) -> Self {
        Self {
            window_seconds,
            max_points,
            period,
        }
    }
    pub fn period(&self) -> Duration {
        self.period
    }
    /// Re-seeds the chart for the buffer's current rate.
    pub fn init_chart(&self, buffer: &SampleRingBuffer, sink: &mut impl ViewerSink) {
        let layout = ChartLayout::new(buffer.sample_rate_hz(), self.window_seconds);
        let seed = layout.seed(self.max_points);
        sink.init_chart(&layout, seed);
    }
    pub fn frame(&self, buffer: &SampleRingBuffer) -> PlotWindow {
        let series = extract(buffer, self.window_seconds);
        let y: Vec<f64> = decimate(series, self.max_points)
            .into_iter()
            .map(f64::from)
            .collect();
        // The axis only moves when new samples move `total_samples`.
        let t_end = buffer.total_samples() as f64 / f64::from(buffer.sample_rate_hz());
        let x = time_axis(t_end, self.window_seconds, y.len());
        PlotWindow { x, y }
    }
    pub fn tick(&self, buffer: &SampleRingBuffer, sink: &mut impl ViewerSink) {
        sink.update_chart(self.frame(buffer));
    }
}
/// `n` evenly spaced times ending at `t_end` and starting one window earlier.
fn time_axis(t_end: f64, window_seconds: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![t_end],
        _ => {
            let t_start = t_end - window_seconds;
            let step = window_seconds / (n - 1) as f64;
            (0..n).map(|i| t_start + i as f64 * step).collect()
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::sink::testing::{RecordingSink, SinkCall};
    fn scheduler() -> RenderScheduler {
        RenderScheduler::new(10.0, 5000, Duration::from_millis(1000))
    }
    #[test]
    fn seed_is_capped_flat_trace() {
        let seed = ChartLayout::new(16_000, 10.0).seed(5000);
        assert_eq!(seed.len(), 5000);
        assert!(seed.y.iter().all(|&y| y == 0.0));
        assert_eq!(seed.x[1], 1.0 / 16_000.0);
        let small = ChartLayout::new(10, 10.0).seed(5000);
        assert_eq!(small.len(), 100);
    }
    #[test]
    fn empty_buffer_gives_empty_frame() {
        let buffer = SampleRingBuffer::new(16_000, 10.0).unwrap();
        assert!(scheduler().frame(&buffer).is_empty());
    }
    #[test]
    fn single_sample_sits_at_end_time() {
        let mut buffer = SampleRingBuffer::new(4, 10.0).unwrap();
        buffer.append(&[9]);
        let frame = scheduler().frame(&buffer);
        assert_eq!(frame.x, vec![0.25]);
        assert_eq!(frame.y, vec![9.0]);
    }
    #[test]
    fn axis_spans_the_window_ending_at_total_time() {
        let mut buffer = SampleRingBuffer::new(16_000, 10.0).unwrap();
        let batch: Vec<i32> = (0..8_000).collect();
        for _ in 0..30 {
            buffer.append(&batch);
        }
        let frame = scheduler().frame(&buffer);
        // 160000 windowed samples, stride 32.
        assert_eq!(frame.len(), 5000);
        assert_eq!(frame.x.len(), frame.y.len());
        assert!((frame.x[0] - 5.0).abs() < 1e-9);
        assert!((frame.x[4999] - 15.0).abs() < 1e-9);
        assert!(frame.x.windows(2).all(|w| w[0] < w[1]));
    }
    #[test]
    fn idle_ticks_redraw_the_same_window() {
        let mut buffer = SampleRingBuffer::new(100, 10.0).unwrap();
        buffer.append(&[1, 2, 3]);
        let scheduler = scheduler();
        let mut sink = RecordingSink::default();
        scheduler.tick(&buffer, &mut sink);
        scheduler.tick(&buffer, &mut sink);
        let frames: Vec<_> = sink.chart_updates().collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], frames[1]);
    }
    #[test]
    fn init_chart_uses_current_rate() {
        let buffer = SampleRingBuffer::new(8_000, 10.0).unwrap();
        let mut sink = RecordingSink::default();
        scheduler().init_chart(&buffer, &mut sink);
        match &sink.calls[..] {
            [SinkCall::InitChart(layout, seed)] => {
                assert_eq!(layout.sample_rate_hz, 8_000);
                assert_eq!(layout.x_label, "Time (s)");
                assert_eq!(seed.len(), 5000);
            }
            other => panic!("unexpected sink calls: {other:?}"),
        }
    }
}
