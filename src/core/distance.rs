// distance.rs - Pairwise distance matrices, clustering and outlier scoring

use crate::core::cancel::CancelToken;
use crate::core::statistics::z_scores;
use crate::error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Labelled square matrix; `None` marks pairs with no comparable data
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl DistanceMatrix {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i)?.get(j).copied().flatten()
    }
}

/// Styled progress bar, or a hidden one
pub fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {per_sec} ETA: {eta}",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Compute a symmetric matrix from a pair function.
/// Rows run in parallel; each value is independent so the result does not
/// depend on scheduling. Cancellation is checked before every row.
pub fn pairwise_matrix<F>(
    labels: Vec<String>,
    pair: F,
    pb: &ProgressBar,
    cancel: &CancelToken,
) -> Result<DistanceMatrix>
where
    F: Fn(usize, usize) -> Option<f64> + Sync,
{
    let n = labels.len();
    let total = n * n.saturating_sub(1) / 2;
    let start = Instant::now();
    let completed = Arc::new(AtomicUsize::new(0));

    let rows: Vec<(usize, Vec<Option<f64>>)> = (0..n)
        .into_par_iter()
        .map(|i| {
            cancel.check(completed.load(Ordering::Relaxed), total)?;
            let row: Vec<Option<f64>> = (i + 1..n).map(|j| pair(i, j)).collect();
            completed.fetch_add(row.len(), Ordering::Relaxed);
            pb.inc(row.len() as u64);
            Ok((i, row))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut values = vec![vec![None; n]; n];
    for (i, row) in values.iter_mut().enumerate() {
        row[i] = Some(0.0);
    }
    for (i, row) in rows {
        for (offset, distance) in row.into_iter().enumerate() {
            let j = i + 1 + offset;
            values[i][j] = distance;
            values[j][i] = distance;
        }
    }

    pb.finish_and_clear();
    debug!(
        "Computed {} x {} matrix ({} comparisons) in {:.2}s",
        n,
        n,
        total,
        start.elapsed().as_secs_f64()
    );
    Ok(DistanceMatrix { labels, values })
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Single-linkage clusters: records joined whenever a pair is within
/// `threshold`. Cluster indices follow first appearance in record order.
pub fn single_linkage(matrix: &DistanceMatrix, threshold: f64) -> Vec<usize> {
    let n = matrix.len();
    let mut parent: Vec<usize> = (0..n).collect();

    for i in 0..n {
        for j in i + 1..n {
            if let Some(d) = matrix.get(i, j) {
                if d <= threshold {
                    let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                    if ri != rj {
                        parent[ri.max(rj)] = ri.min(rj);
                    }
                }
            }
        }
    }

    let mut cluster_of_root = vec![usize::MAX; n];
    let mut next = 0;
    (0..n)
        .map(|i| {
            let root = find(&mut parent, i);
            if cluster_of_root[root] == usize::MAX {
                cluster_of_root[root] = next;
                next += 1;
            }
            cluster_of_root[root]
        })
        .collect()
}

/// Mean distance from each record to every other comparable record
pub fn mean_distances(matrix: &DistanceMatrix) -> Vec<Option<f64>> {
    (0..matrix.len())
        .map(|i| {
            let others: Vec<f64> = (0..matrix.len())
                .filter(|&j| j != i)
                .filter_map(|j| matrix.get(i, j))
                .collect();
            if others.is_empty() {
                None
            } else {
                Some(others.iter().sum::<f64>() / others.len() as f64)
            }
        })
        .collect()
}

/// Outlier score per record (z-score of its mean distance; 0.0 when it has
/// no comparable record) and the indices whose score exceeds `z_threshold`
pub fn outlier_scores(matrix: &DistanceMatrix, z_threshold: f64) -> (Vec<f64>, Vec<usize>) {
    let scores: Vec<f64> = z_scores(&mean_distances(matrix))
        .into_iter()
        .map(|z| z.unwrap_or(0.0))
        .collect();
    let flagged = scores
        .iter()
        .enumerate()
        .filter(|(_, z)| **z > z_threshold)
        .map(|(i, _)| i)
        .collect();
    (scores, flagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BioenvError;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("r{}", i)).collect()
    }

    fn line_matrix(points: &[f64]) -> DistanceMatrix {
        let pts = points.to_vec();
        pairwise_matrix(
            labels(points.len()),
            |i, j| Some((pts[i] - pts[j]).abs()),
            &ProgressBar::hidden(),
            &CancelToken::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_matrix_symmetric_with_zero_diagonal() {
        let m = line_matrix(&[0.0, 1.0, 5.0]);
        assert_eq!(m.get(0, 0), Some(0.0));
        assert_eq!(m.get(0, 2), Some(5.0));
        assert_eq!(m.get(2, 0), Some(5.0));
        assert_eq!(m.get(1, 2), Some(4.0));
    }

    #[test]
    fn test_cancelled_matrix() {
        let token = CancelToken::new();
        token.cancel();
        let result = pairwise_matrix(labels(4), |_, _| Some(1.0), &ProgressBar::hidden(), &token);
        assert!(matches!(result, Err(BioenvError::Cancelled { .. })));
    }

    #[test]
    fn test_single_linkage_chains() {
        // 0-1 and 1-2 within threshold chain into one cluster
        let m = line_matrix(&[0.0, 1.0, 2.0, 10.0]);
        assert_eq!(single_linkage(&m, 1.0), vec![0, 0, 0, 1]);
        assert_eq!(single_linkage(&m, 0.5), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_outliers() {
        let m = line_matrix(&[0.0, 0.1, 0.2, 0.1, 0.0, 50.0]);
        let (scores, flagged) = outlier_scores(&m, 1.5);
        assert_eq!(scores.len(), 6);
        assert_eq!(flagged, vec![5]);
    }
}
