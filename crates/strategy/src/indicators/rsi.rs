/// Relative Strength Index over `closes` (oldest first).
///
/// Wilder's smoothing, same as TradingView / standard RSI: the first
/// `period` deltas seed the average gain/loss as simple means, later
/// deltas update via `avg = (avg * (period - 1) + x) / period`.
///
/// Falls back to the neutral 50 when fewer than `period + 1` closes are
/// available. A window with no price movement at all also resolves to
/// 50; only a window with gains and zero losses saturates at 100.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if period == 0 || closes.len() < period + 1 {
        return 50.0;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let initial = &changes[..period];

    let mut avg_gain = initial.iter().filter(|&&c| c > 0.0).sum::<f64>() / period as f64;
    let mut avg_loss =
        initial.iter().filter(|&&c| c < 0.0).map(|c| c.abs()).sum::<f64>() / period as f64;

    for &change in &changes[period..] {
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { change.abs() } else { 0.0 };
        avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
    }

    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Rolling RSI, one value per input close.
///
/// Streaming form of [`rsi`]: index `i` holds the RSI as of
/// `closes[..=i]`, with 50 during the warm-up stretch. The recurrence is
/// identical to the batch function, so the final element always equals
/// `rsi(closes, period)`.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(closes.len());
    if period == 0 {
        out.resize(closes.len(), 50.0);
        return out;
    }

    let mut gain_sum = 0.0;
    let mut loss_sum = 0.0;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    let mut warm = false;

    for (i, &close) in closes.iter().enumerate() {
        if i == 0 {
            out.push(50.0);
            continue;
        }
        let change = close - closes[i - 1];
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { change.abs() } else { 0.0 };

        if !warm {
            gain_sum += gain;
            loss_sum += loss;
            if i >= period {
                avg_gain = gain_sum / period as f64;
                avg_loss = loss_sum / period as f64;
                warm = true;
            } else {
                out.push(50.0);
                continue;
            }
        } else {
            let w = period as f64;
            avg_gain = (avg_gain * (w - 1.0) + gain) / w;
            avg_loss = (avg_loss * (w - 1.0) + loss) / w;
        }

        let value = if avg_loss == 0.0 {
            if avg_gain == 0.0 {
                50.0
            } else {
                100.0
            }
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        out.push(value);
    }
    out
}
