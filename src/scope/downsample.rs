/// Fixed-stride decimation down to at most `cap` points.
///
/// Series that already fit are returned as-is. Otherwise every
/// `ceil(len / cap)`-th element is kept, starting with the first one, so
/// the output keeps input order and spacing and never exceeds `cap`.
/// This is plain nth-point sampling, not min/max binning: peaks between
/// kept points are lost.
pub fn decimate<T>(series: Vec<T>, cap: usize) -> Vec<T> {
    if series.len() <= cap {
        return series;
    }
    if cap == 0 {
        return Vec::new();
    }
    let stride = series.len().div_ceil(cap);
    series.into_iter().step_by(stride).collect()
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn short_series_passes_through() {
        let series = vec![3, 1, 2];
        assert_eq!(decimate(series.clone(), 3), series);
        assert_eq!(decimate(series.clone(), 5000), series);
        assert_eq!(decimate(Vec::<i32>::new(), 1), Vec::<i32>::new());
    }
    #[test]
    fn twelve_thousand_points_use_stride_three() {
        let series: Vec<i32> = (0..12_000).collect();
        let out = decimate(series, 5000);
        assert_eq!(out.len(), 4000);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], 3);
        assert_eq!(out[3999], 11_997);
    }
    #[test]
    fn output_never_exceeds_cap_and_keeps_order() {
        for len in [2usize, 7, 100, 101, 999, 5001, 10_007] {
            for cap in [1usize, 2, 3, 10, 64, 5000] {
                let series: Vec<usize> = (0..len).collect();
                let out = decimate(series, cap);
                assert!(out.len() <= cap, "len={len} cap={cap}");
                assert_eq!(out.first(), Some(&0));
                assert!(out.windows(2).all(|w| w[0] < w[1]));
            }
        }
    }
    #[test]
    fn zero_cap_yields_nothing_for_nonempty_input() {
        assert!(decimate(vec![1, 2, 3], 0).is_empty());
    }
}
