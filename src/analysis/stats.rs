//! Closed-form numeric helpers used by the analysis pipeline.
//!
//! Callers guarantee non-empty input; none of these functions divide by a
//! value that can be zero for `len >= 2`.

// ---

/// Ordinary least-squares slope of `values` against their index `0..n`.
///
/// Values are offset by the first sample before accumulating, so a constant
/// series produces an exact `0.0` rather than rounding noise.
pub fn ols_slope(values: &[f64]) -> f64 {
    // ---
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let first = values[0];
    let x_mean = (n - 1) as f64 / 2.0;

    let (sxy, sxx) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (i, &y)| {
            let dx = i as f64 - x_mean;
            (sxy + dx * (y - first), sxx + dx * dx)
        });

    sxy / sxx
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn std_dev(values: &[f64]) -> f64 {
    // ---
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Round to `places` decimals, exact ties to even (`10.25` -> `10.2`).
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}
