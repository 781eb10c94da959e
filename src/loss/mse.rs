/// Mean squared error, the quantity the output-layer update descends.
pub struct MseLoss;

impl MseLoss {
    /// `mean((predicted - expected)²)`; `0.0` for empty slices.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        if predicted.is_empty() {
            return 0.0;
        }
        predicted
            .iter()
            .zip(expected)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            / predicted.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_squared_differences() {
        assert!((MseLoss::loss(&[0.5, 1.0], &[1.0, 1.0]) - 0.125).abs() < 1e-12);
        assert_eq!(MseLoss::loss(&[], &[]), 0.0);
    }
}
