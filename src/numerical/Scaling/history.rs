//! Append-only record of the scaling used by completed mesh iterations.
//! The refinement loop owns the log and lends it to each new iteration.
use crate::numerical::errors::{CollocationResult, check_len};
use nalgebra::DVector;

/// Un-expanded scaling of one completed iteration
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    pub objective_scale: f64,
    pub x_scale: DVector<f64>,
    pub x_shift: DVector<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct ScalingHistory {
    records: Vec<IterationRecord>,
}

impl ScalingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record; all records share the OCP-level vector length
    pub fn push(&mut self, record: IterationRecord) -> CollocationResult<()> {
        check_len("record shift", record.x_scale.len(), record.x_shift.len())?;
        if let Some(first) = self.records.first() {
            check_len("record scale", first.x_scale.len(), record.x_scale.len())?;
        }
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Blending weights for `k` iterations, earliest first:
/// `α(1-α)^{k-i}` for `i = 1..k`, with the earliest divided by α so the sum is 1.
pub fn blend_weights(k: usize, alpha: f64) -> Vec<f64> {
    let mut weights: Vec<f64> = (1..=k)
        .map(|i| alpha * (1.0 - alpha).powi((k - i) as i32))
        .collect();
    if let Some(first) = weights.first_mut() {
        *first /= alpha;
    }
    weights
}
