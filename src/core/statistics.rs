// statistics.rs - Column summaries, correlation and distance helpers for tables

/// Per-column summary; statistics are None when the column has no numbers
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub count: usize,
    pub missing: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1); 0.0 for a single value
    pub sd: Option<f64>,
    pub min: Option<f64>,
    pub median: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnSummary {
    pub const FIELDS: [&'static str; 7] = ["count", "missing", "mean", "sd", "min", "median", "max"];

    /// Values in `FIELDS` order
    pub fn cells(&self) -> Vec<Option<f64>> {
        vec![
            Some(self.count as f64),
            Some(self.missing as f64),
            self.mean,
            self.sd,
            self.min,
            self.median,
            self.max,
        ]
    }
}

/// Sequential-order mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn sample_sd(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.len() < 2 {
        return Some(0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

pub fn summarize(column: &[Option<f64>]) -> ColumnSummary {
    let values: Vec<f64> = column.iter().flatten().copied().collect();
    ColumnSummary {
        count: values.len(),
        missing: column.len() - values.len(),
        mean: mean(&values),
        sd: sample_sd(&values),
        min: values.iter().copied().reduce(f64::min),
        median: median(&values),
        max: values.iter().copied().reduce(f64::max),
    }
}

/// Pearson correlation over pairwise-complete observations.
/// None with fewer than two complete pairs or zero variance.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx) * (x - mx);
        syy += (y - my) * (y - my);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Euclidean distance over columns present in both rows; None if none are shared
pub fn euclidean(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let mut shared = 0usize;
    let mut sum = 0.0;
    for (x, y) in a.iter().zip(b) {
        if let (Some(x), Some(y)) = (x, y) {
            shared += 1;
            sum += (x - y) * (x - y);
        }
    }
    if shared == 0 {
        None
    } else {
        Some(sum.sqrt())
    }
}

/// Standard scores of the present values; a constant input scores 0.0
pub fn z_scores(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let (m, sd) = match (mean(&present), sample_sd(&present)) {
        (Some(m), Some(sd)) => (m, sd),
        _ => return vec![None; values.len()],
    };
    values
        .iter()
        .map(|v| v.map(|x| if sd > 0.0 { (x - m) / sd } else { 0.0 }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        let s = summarize(&[Some(1.0), None, Some(3.0), Some(2.0)]);
        assert_eq!(s.count, 3);
        assert_eq!(s.missing, 1);
        assert_eq!(s.mean, Some(2.0));
        assert_eq!(s.sd, Some(1.0));
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.median, Some(2.0));
        assert_eq!(s.max, Some(3.0));

        let empty = summarize(&[None, None]);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.mean, None);
        assert_eq!(summarize(&[Some(5.0)]).sd, Some(0.0));
    }

    #[test]
    fn test_median_even() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_pearson() {
        let x = [Some(1.0), Some(2.0), Some(3.0), None];
        let y = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        assert!((pearson(&x, &y).unwrap() - 1.0).abs() < 1e-12);

        let flat = [Some(1.0), Some(1.0), Some(1.0), Some(1.0)];
        assert_eq!(pearson(&x, &flat), None);
        assert_eq!(pearson(&[Some(1.0)], &[Some(2.0)]), None);
    }

    #[test]
    fn test_euclidean_shared_columns() {
        let a = [Some(0.0), Some(0.0), None];
        let b = [Some(3.0), Some(4.0), Some(9.0)];
        assert_eq!(euclidean(&a, &b), Some(5.0));
        assert_eq!(euclidean(&[None], &[Some(1.0)]), None);
    }

    #[test]
    fn test_z_scores() {
        let z = z_scores(&[Some(1.0), Some(2.0), Some(3.0), None]);
        assert_eq!(z[0], Some(-1.0));
        assert_eq!(z[1], Some(0.0));
        assert_eq!(z[3], None);
        assert_eq!(z_scores(&[Some(2.0), Some(2.0)]), vec![Some(0.0), Some(0.0)]);
    }
}
