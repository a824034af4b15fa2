use common::models::MovieRow;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// count/mean/std/min/quartiles/max of one numeric column, nulls dropped.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Statistics {
    pub start_year: ColumnSummary,
    pub average_rating: ColumnSummary,
    pub num_votes: ColumnSummary,
}

/// Equal-width histogram of `average_rating` over the observed range.
/// The last bin is closed on the right.
pub fn rating_histogram(rows: &[MovieRow], bins: usize) -> Vec<HistogramBin> {
    let ratings: Vec<f64> = rows
        .iter()
        .filter_map(|row| row.average_rating)
        .filter(|r| r.is_finite())
        .collect();
    if ratings.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = ratings.iter().copied().fold(f64::INFINITY, f64::min);
    let max = ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: ratings.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut histogram: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();

    for rating in ratings {
        let index = (((rating - min) / width).floor() as usize).min(bins - 1);
        histogram[index].count += 1;
    }
    histogram
}

pub fn describe(rows: &[MovieRow]) -> Statistics {
    Statistics {
        start_year: summarize(rows.iter().filter_map(|r| r.start_year.map(f64::from))),
        average_rating: summarize(rows.iter().filter_map(|r| r.average_rating)),
        num_votes: summarize(rows.iter().filter_map(|r| r.num_votes.map(|v| v as f64))),
    }
}

fn summarize(values: impl Iterator<Item = f64>) -> ColumnSummary {
    let mut sorted: Vec<f64> = values.filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return ColumnSummary::default();
    }
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    // Sample standard deviation; undefined for a single value.
    let std = (n > 1).then(|| {
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    });

    ColumnSummary {
        count: n,
        mean: Some(mean),
        std,
        min: sorted.first().copied(),
        p25: Some(quantile(&sorted, 0.25)),
        p50: Some(quantile(&sorted, 0.50)),
        p75: Some(quantile(&sorted, 0.75)),
        max: sorted.last().copied(),
    }
}

/// Linear interpolation between closest ranks; `sorted` must be non-empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
