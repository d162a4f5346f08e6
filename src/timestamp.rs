/// Formats a duration as `HH:MM:SS.mmm`.
pub fn time_str(sec: f64) -> String {
    let ms = sec * 1000f64;
    let hours = (ms / 3600000f64) as u64;
    let minutes = ((ms % 3600000f64) / 60000f64) as u64;
    let seconds = ((ms % 60000f64) / 1000f64) as u64;
    let milliseconds = (ms % 1000f64) as u64;

    format!(
        "{hours:0width$}:{minutes:02}:{seconds:02}.{milliseconds:03}",
        width = if hours >= 100 { 0 } else { 2 }
    )
}

/// Formats a block timestamp in nanoseconds.
pub fn ns_str(ns: u64) -> String {
    time_str(ns as f64 / 1e9)
}

#[test]
fn formats_durations() {
    assert_eq!(time_str(0.0), "00:00:00.000");
    assert_eq!(time_str(3723.5), "01:02:03.500");
    assert_eq!(ns_str(40_000_000), "00:00:00.040");
}
