use keystride::time_series::WpmSeries;

/// Compute X (seconds) and Y (WPM) bounds for the results chart
pub fn compute_chart_params(series: &WpmSeries, elapsed_secs: f64) -> (f64, f64) {
    let (overall_duration, highest_wpm) = series.bounds(elapsed_secs);
    // a flat zero line still needs a non-empty y range
    (overall_duration, highest_wpm.round().max(1.0))
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
