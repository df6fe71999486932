/// Simple moving average of the `period` most recent values.
///
/// Values are ordered oldest first. Returns `None` when fewer than `period`
/// values exist or `period` is zero.
pub fn calculate_sma<I>(prices: I, period: usize) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
    I::IntoIter: DoubleEndedIterator + ExactSizeIterator,
{
    let prices = prices.into_iter();
    if period == 0 || prices.len() < period {
        return None;
    }

    let sum: f64 = prices.rev().take(period).sum();
    Some(sum / period as f64)
}
