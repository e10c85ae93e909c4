pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    Some(data.iter().sum::<f64>() / data.len() as f64)
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let avg = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = avg - value;
            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

/// Rounds to `places` decimals for display
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[40., 60., 50.]), Some(50.0));
        assert_eq!(mean(&[72.0]), Some(72.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[20., 10.]), Some(5.0));
        assert_eq!(std_dev(&[64., 64., 64.]), Some(0.0));
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_std_dev_spread() {
        let sd = std_dev(&[30., 45., 60., 75.]).unwrap();
        assert!((sd - 16.770509831244).abs() < 1e-9);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(66.666, 1), 66.7);
        assert_eq!(round_to(12.345, 0), 12.0);
    }
}
