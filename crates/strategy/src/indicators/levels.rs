use serde::{Deserialize, Serialize};

/// Nearest meaningful price levels around the current price.
/// Soft invariant: `support < close <= resistance` — not enforced when
/// the data is too sparse to cluster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceLevels {
    pub support: f64,
    pub resistance: f64,
}

struct Cluster {
    avg: f64,
    count: usize,
}

/// Support/resistance from greedy price clustering.
///
/// All highs and lows are sorted and swept once: each point either merges
/// into the current cluster (within relative `tolerance` of its running
/// average) or starts a new one. Clusters are ranked by member count;
/// the strongest cluster strictly below `close` becomes support, the
/// strongest at or above becomes resistance. When a side has no cluster
/// the raw extreme (`min(lows)` / `max(highs)`) is used, and ±0.5% of
/// the close when there is no data at all.
pub fn support_resistance(highs: &[f64], lows: &[f64], close: f64, tolerance: f64) -> PriceLevels {
    let fallback = PriceLevels {
        support: close * 0.995,
        resistance: close * 1.005,
    };

    let mut points: Vec<f64> = highs
        .iter()
        .chain(lows.iter())
        .copied()
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect();
    if points.is_empty() || close <= 0.0 {
        return fallback;
    }
    points.sort_by(|a, b| a.total_cmp(b));

    let mut clusters: Vec<Cluster> = Vec::new();
    for point in points {
        match clusters.last_mut() {
            Some(c) if (point - c.avg).abs() / c.avg <= tolerance => {
                c.avg = (c.avg * c.count as f64 + point) / (c.count + 1) as f64;
                c.count += 1;
            }
            _ => clusters.push(Cluster { avg: point, count: 1 }),
        }
    }
    clusters.sort_by(|a, b| b.count.cmp(&a.count));

    let support = clusters
        .iter()
        .find(|c| c.avg < close)
        .map(|c| c.avg)
        .unwrap_or_else(|| {
            lows.iter()
                .copied()
                .filter(|l| l.is_finite())
                .fold(f64::INFINITY, f64::min)
        });
    let resistance = clusters
        .iter()
        .find(|c| c.avg >= close)
        .map(|c| c.avg)
        .unwrap_or_else(|| {
            highs
                .iter()
                .copied()
                .filter(|h| h.is_finite())
                .fold(f64::NEG_INFINITY, f64::max)
        });

    PriceLevels {
        support: if support.is_finite() { support } else { fallback.support },
        resistance: if resistance.is_finite() { resistance } else { fallback.resistance },
    }
}
