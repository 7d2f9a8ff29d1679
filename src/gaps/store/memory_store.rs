use std::collections::BTreeSet;

use async_trait::async_trait;

use super::{BlockNumbersStore, QueryError};
use crate::gaps::window::{BlockNumber, Window};

pub struct MemoryBlockNumbersStore {
    numbers: BTreeSet<BlockNumber>,
}

impl MemoryBlockNumbersStore {
    pub fn new(numbers: impl IntoIterator<Item = BlockNumber>) -> Self {
        Self {
            numbers: numbers.into_iter().collect(),
        }
    }
}

#[async_trait]
impl BlockNumbersStore for MemoryBlockNumbersStore {
    async fn head(&self) -> Result<Option<BlockNumber>, QueryError> {
        Ok(self.numbers.last().copied())
    }

    async fn count_present(&self, window: &Window) -> Result<i64, QueryError> {
        Ok(self
            .numbers
            .iter()
            .filter(|number| window.contains(**number))
            .count() as i64)
    }

    async fn missing_numbers(&self, window: &Window) -> Result<Vec<BlockNumber>, QueryError> {
        Ok((window.start..window.end)
            .filter(|number| !self.numbers.contains(number))
            .collect())
    }
}
