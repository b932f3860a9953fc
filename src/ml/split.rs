//! Stratified partitioning of labeled rows.
//!
//! Both helpers work on row indices only, so the caller keeps ownership of
//! the feature vectors and can slice them however it likes.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::dataset::Label;
use crate::error::{Result, UrlGuardError};

/// Row indices of a train/test partition, each sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// One cross-validation fold: rows to fit on and rows to score on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Row indices grouped by label, labels ascending, rows in input order.
fn group_by_label(labels: &[Label]) -> BTreeMap<Label, Vec<usize>> {
    let mut groups: BTreeMap<Label, Vec<usize>> = BTreeMap::new();
    for (idx, &label) in labels.iter().enumerate() {
        groups.entry(label).or_default().push(idx);
    }
    groups
}

/// Number of test rows for `n` rows and a test fraction.
///
/// The product is nudged down before rounding up so that `0.2 * 15` gives 3
/// rather than 4. At least one row lands on each side.
pub fn test_row_count(n: usize, test_size: f64) -> usize {
    let raw = (test_size * n as f64 - 1e-9).ceil().max(1.0) as usize;
    raw.min(n.saturating_sub(1))
}

/// Single stratified shuffle split.
///
/// Each label receives `floor(n_label * n_test / n)` test rows; leftover test
/// slots go to the labels with the largest remainders (smaller label first on
/// ties). A label never gives up its last row, so every label present in the
/// input is present in the training side.
pub fn stratified_train_test_split(
    labels: &[Label],
    test_size: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(UrlGuardError::config(format!(
            "test_size must be in (0, 1), got {test_size}"
        )));
    }
    let n = labels.len();
    if n < 2 {
        return Err(UrlGuardError::data(format!(
            "cannot split {n} row(s) into train and test"
        )));
    }

    let n_test = test_row_count(n, test_size);
    let groups = group_by_label(labels);

    // (label, quota, remainder numerator, capacity)
    let mut quotas: Vec<(Label, usize, usize, usize)> = groups
        .iter()
        .map(|(&label, rows)| {
            let share = rows.len() * n_test;
            let capacity = rows.len() - 1;
            (label, (share / n).min(capacity), share % n, capacity)
        })
        .collect();

    let mut remaining = n_test.saturating_sub(quotas.iter().map(|q| q.1).sum());
    let mut order: Vec<usize> = (0..quotas.len()).collect();
    order.sort_by(|&a, &b| quotas[b].2.cmp(&quotas[a].2).then(quotas[a].0.cmp(&quotas[b].0)));

    while remaining > 0 {
        let mut assigned = false;
        for &c in &order {
            if remaining == 0 {
                break;
            }
            let quota = &mut quotas[c];
            if quota.1 < quota.3 {
                quota.1 += 1;
                remaining -= 1;
                assigned = true;
            }
        }
        if !assigned {
            break;
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::with_capacity(n - n_test);
    let mut test = Vec::with_capacity(n_test);
    for ((_, mut rows), &(_, quota, _, _)) in groups.into_iter().zip(&quotas) {
        rows.shuffle(&mut rng);
        test.extend_from_slice(&rows[..quota]);
        train.extend_from_slice(&rows[quota..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(TrainTestSplit { train, test })
}

/// Stratified k-fold partition without shuffling.
///
/// Rows are taken label by label (ascending) and dealt to folds round-robin,
/// so each fold receives a near-equal share of every label. Requires
/// `2 <= k <= labels.len()`, which guarantees no fold is empty.
pub fn stratified_k_fold(labels: &[Label], k: usize) -> Result<Vec<Fold>> {
    if k < 2 {
        return Err(UrlGuardError::config(format!(
            "cross-validation needs at least 2 folds, got {k}"
        )));
    }
    if k > labels.len() {
        return Err(UrlGuardError::config(format!(
            "cannot make {k} folds from {} rows",
            labels.len()
        )));
    }

    let mut fold_of = vec![0usize; labels.len()];
    let mut counter = 0usize;
    for rows in group_by_label(labels).values() {
        for &row in rows {
            fold_of[row] = counter % k;
            counter += 1;
        }
    }

    Ok((0..k)
        .map(|fold| {
            let (test, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&row| fold_of[row] == fold);
            Fold { train, test }
        })
        .collect())
}
