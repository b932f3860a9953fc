//! Sparse feature vectors.
//!
//! A TF-IDF vector over a URL vocabulary has a handful of non-zero entries
//! out of thousands of dimensions, so only `(index, value)` pairs are kept.

use serde::{Deserialize, Serialize};

/// A sparse vector with strictly increasing indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dimension: usize,
    indices: Vec<usize>,
    values: Vec<f64>,
}

impl SparseVector {
    /// An all-zero vector of the given dimension.
    pub fn zeros(dimension: usize) -> Self {
        SparseVector {
            dimension,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from `(index, value)` pairs. Pairs are sorted, duplicate indices
    /// are summed and explicit zeros dropped. Indices must be `< dimension`.
    pub fn from_pairs(dimension: usize, mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|&(idx, _)| idx);

        let mut indices: Vec<usize> = Vec::with_capacity(pairs.len());
        let mut values: Vec<f64> = Vec::with_capacity(pairs.len());
        for (idx, value) in pairs {
            debug_assert!(idx < dimension, "index {idx} out of bounds {dimension}");
            if indices.last() == Some(&idx) {
                if let Some(last) = values.last_mut() {
                    *last += value;
                }
            } else {
                indices.push(idx);
                values.push(value);
            }
        }

        let (indices, values) = indices
            .into_iter()
            .zip(values)
            .filter(|&(_, v)| v != 0.0)
            .unzip();

        SparseVector {
            dimension,
            indices,
            values,
        }
    }

    /// Build from a dense slice, keeping non-zero entries.
    pub fn from_dense(dense: &[f64]) -> Self {
        let pairs = dense
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0.0)
            .map(|(i, &v)| (i, v))
            .collect();
        Self::from_pairs(dense.len(), pairs)
    }

    /// Logical length of the vector.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Iterate over `(index, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Value at `index` (zero if not stored).
    pub fn get(&self, index: usize) -> f64 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scale in place so that the Euclidean norm is 1. Zero vectors are left alone.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for value in &mut self.values {
                *value /= norm;
            }
        }
    }

    /// Dot product with a dense weight row of the same dimension.
    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(i, v)| v * dense[i]).sum()
    }

    /// Expand to a dense vector.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut dense = vec![0.0; self.dimension];
        for (i, v) in self.iter() {
            dense[i] = v;
        }
        dense
    }
}
