//! Summary state: named scalar quantities controls may refer to.

use std::collections::HashMap;
use wg_core::{Real, WgError, WgResult};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryState {
    values: HashMap<String, Real>,
}

impl SummaryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: Real) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<Real> {
        self.values.get(key).copied()
    }

    pub fn require(&self, key: &str) -> WgResult<Real> {
        self.get(key).ok_or_else(|| WgError::UnknownQuantity {
            key: key.to_owned(),
        })
    }
}
