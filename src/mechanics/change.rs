/// Convergence mechanics: relative change between successive joint strategies.

/// What to do when a previous coordinate is exactly zero and the ratio is undefined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ZeroDenominator {
    /// Compare that coordinate by absolute change instead.
    #[default]
    AbsoluteFallback,
    /// The coordinate's ratio is +inf, so the test cannot pass while it stays zero.
    NeverConverges,
}

/// `|(next - prev) / prev|` for one coordinate. NaN maps to +inf.
#[inline]
pub fn relative_change(prev: f64, next: f64, zero: ZeroDenominator) -> f64 {
    let delta = next - prev;
    let ratio = if prev == 0.0 {
        match zero {
            ZeroDenominator::AbsoluteFallback => delta,
            ZeroDenominator::NeverConverges => f64::INFINITY,
        }
    } else {
        delta / prev
    };
    let ratio = ratio.abs();
    if ratio.is_nan() { f64::INFINITY } else { ratio }
}

/// Largest coordinate-wise relative change. Zero for empty input.
pub fn max_relative_change<'a, I>(pairs: I, zero: ZeroDenominator) -> f64
where
    I: IntoIterator<Item = (&'a [f64; 2], &'a [f64; 2])>,
{
    pairs
        .into_iter()
        .flat_map(|(prev, next)| prev.iter().zip(next.iter()))
        .map(|(&p, &n)| relative_change(p, n, zero))
        .fold(0.0, f64::max)
}
