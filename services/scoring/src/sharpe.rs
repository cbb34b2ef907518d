//! Sharpe ratio statistics

use types::errors::ScoringUndefined;

/// Standard deviations below this are treated as zero
pub const ZERO_VARIANCE_TOLERANCE: f64 = 1e-12;

/// Arithmetic mean; None for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator); None below two samples
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// `(mean(returns) - risk_free_rate_per_tick) / sample_std_dev(returns)`
pub fn sharpe_ratio(
    returns: &[f64],
    risk_free_rate_per_tick: f64,
) -> Result<f64, ScoringUndefined> {
    if returns.len() < 2 {
        return Err(ScoringUndefined::InsufficientSamples {
            count: returns.len(),
        });
    }
    let count = returns.len();
    let m = mean(returns).ok_or(ScoringUndefined::InsufficientSamples { count })?;
    let std = sample_std_dev(returns).ok_or(ScoringUndefined::InsufficientSamples { count })?;

    if !std.is_finite() || std < ZERO_VARIANCE_TOLERANCE {
        return Err(ScoringUndefined::ZeroVariance);
    }

    Ok((m - risk_free_rate_per_tick) / std)
}
