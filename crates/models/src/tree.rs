use common::metrics::quantile;

/// Growth limits for a single regression tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// When set, split candidates are quantile-spaced bin edges instead of
    /// every midpoint between distinct values.
    pub max_bins: Option<usize>,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// CART regression tree with squared-error splits, used as the base
/// learner on pinball-loss pseudo-residuals.
#[derive(Debug, Clone)]
pub(crate) struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Fit on the given rows. Returns the tree and, per input row, the
    /// index of the leaf node it landed in (for leaf re-estimation).
    pub fn fit(x: &[Vec<f64>], targets: &[f64], params: TreeParams) -> (Self, Vec<usize>) {
        let mut tree = Self { nodes: Vec::new() };
        let mut leaf_of_row = vec![0usize; targets.len()];
        let all_rows: Vec<usize> = (0..targets.len()).collect();
        tree.grow(x, targets, all_rows, 0, params, &mut leaf_of_row);
        (tree, leaf_of_row)
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        targets: &[f64],
        rows: Vec<usize>,
        depth: usize,
        params: TreeParams,
        leaf_of_row: &mut [usize],
    ) -> usize {
        let mean = rows.iter().map(|&i| targets[i]).sum::<f64>() / rows.len().max(1) as f64;

        let split = if depth < params.max_depth && rows.len() >= 2 * params.min_samples_leaf {
            best_split(x, targets, &rows, params)
        } else {
            None
        };

        match split {
            Some((feature, threshold)) => {
                let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                    .into_iter()
                    .partition(|&i| x[i][feature] <= threshold);

                // Reserve this node's slot before growing children.
                let node_idx = self.nodes.len();
                self.nodes.push(Node::Leaf { value: mean });

                let left = self.grow(x, targets, left_rows, depth + 1, params, leaf_of_row);
                let right = self.grow(x, targets, right_rows, depth + 1, params, leaf_of_row);
                self.nodes[node_idx] = Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                };
                node_idx
            }
            None => {
                let node_idx = self.nodes.len();
                self.nodes.push(Node::Leaf { value: mean });
                for &i in &rows {
                    leaf_of_row[i] = node_idx;
                }
                node_idx
            }
        }
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Leaf index a row falls into.
    pub fn apply_row(&self, row: &[f64]) -> usize {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { .. } => return idx,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Replace a leaf's prediction, used for per-leaf quantile
    /// re-estimation after the tree structure is grown.
    pub fn set_leaf_value(&mut self, leaf_idx: usize, value: f64) {
        if let Node::Leaf { value: slot } = &mut self.nodes[leaf_idx] {
            *slot = value;
        }
    }
}

/// Best (feature, threshold) by squared-error reduction, or None when no
/// candidate respects the leaf-size floor.
fn best_split(
    x: &[Vec<f64>],
    targets: &[f64],
    rows: &[usize],
    params: TreeParams,
) -> Option<(usize, f64)> {
    let n_features = x[rows[0]].len();
    let mut best: Option<(usize, f64, f64)> = None; // (feature, threshold, score)

    for feature in 0..n_features {
        let mut pairs: Vec<(f64, f64)> = rows.iter().map(|&i| (x[i][feature], targets[i])).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let thresholds = candidate_thresholds(&pairs, params.max_bins);
        if thresholds.is_empty() {
            continue;
        }

        // Prefix sums over the sorted order let each candidate be scored
        // in O(log n).
        let mut prefix = Vec::with_capacity(pairs.len() + 1);
        prefix.push(0.0);
        for (_, t) in &pairs {
            prefix.push(prefix.last().copied().unwrap_or(0.0) + t);
        }
        let total: f64 = prefix[pairs.len()];

        for &threshold in &thresholds {
            let left_count = pairs.partition_point(|(v, _)| *v <= threshold);
            let right_count = pairs.len() - left_count;
            if left_count < params.min_samples_leaf || right_count < params.min_samples_leaf {
                continue;
            }

            let left_sum = prefix[left_count];
            let right_sum = total - left_sum;
            // Maximizing sum²/n on both sides is equivalent to minimizing
            // within-node SSE.
            let score = left_sum * left_sum / left_count as f64
                + right_sum * right_sum / right_count as f64;

            let improves = match best {
                Some((_, _, best_score)) => score > best_score + 1e-15,
                None => true,
            };
            if improves {
                best = Some((feature, threshold, score));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

/// Candidate thresholds for one feature: midpoints between distinct sorted
/// values, or quantile-spaced bin edges when binning is on.
fn candidate_thresholds(sorted_pairs: &[(f64, f64)], max_bins: Option<usize>) -> Vec<f64> {
    let values: Vec<f64> = sorted_pairs.iter().map(|(v, _)| *v).collect();
    if values.first() == values.last() {
        return Vec::new();
    }

    match max_bins {
        Some(bins) if values.len() > bins => {
            let mut edges = Vec::with_capacity(bins - 1);
            for b in 1..bins {
                let edge = quantile(&values, b as f64 / bins as f64);
                if edges.last() != Some(&edge) && edge > values[0] && edge < values[values.len() - 1]
                {
                    edges.push(edge);
                }
            }
            edges
        }
        _ => {
            let mut midpoints = Vec::new();
            for w in values.windows(2) {
                if w[1] > w[0] {
                    midpoints.push((w[0] + w[1]) / 2.0);
                }
            }
            midpoints
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: 3,
            min_samples_leaf: 1,
            max_bins: None,
        }
    }

    #[test]
    fn test_single_split_recovers_step_function() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..20).map(|i| if i < 10 { 0.0 } else { 10.0 }).collect();

        let (tree, _) = RegressionTree::fit(&x, &y, params());
        assert!((tree.predict_row(&[2.0]) - 0.0).abs() < 1e-9);
        assert!((tree.predict_row(&[15.0]) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y = vec![3.5; 10];

        let (tree, leaves) = RegressionTree::fit(&x, &y, params());
        assert!(leaves.iter().all(|&l| l == leaves[0]));
        assert!((tree.predict_row(&[100.0]) - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_leaf_assignment_matches_apply() {
        let x: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 7) as f64]).collect();
        let y: Vec<f64> = (0..30).map(|i| (i as f64).sin()).collect();

        let (tree, leaves) = RegressionTree::fit(&x, &y, params());
        for (i, row) in x.iter().enumerate() {
            assert_eq!(tree.apply_row(row), leaves[i]);
        }
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let strict = TreeParams {
            max_depth: 8,
            min_samples_leaf: 5,
            max_bins: None,
        };

        let (tree, leaves) = RegressionTree::fit(&x, &y, strict);
        let mut counts = std::collections::HashMap::new();
        for l in &leaves {
            *counts.entry(*l).or_insert(0usize) += 1;
        }
        assert!(counts.values().all(|&c| c >= 5));
        let _ = tree;
    }

    #[test]
    fn test_binned_splits_still_separate() {
        let x: Vec<Vec<f64>> = (0..200).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = (0..200).map(|i| if i < 100 { -1.0 } else { 1.0 }).collect();
        let binned = TreeParams {
            max_depth: 2,
            min_samples_leaf: 1,
            max_bins: Some(8),
        };

        let (tree, _) = RegressionTree::fit(&x, &y, binned);
        assert!(tree.predict_row(&[10.0]) < 0.0);
        assert!(tree.predict_row(&[190.0]) > 0.0);
    }
}
