use super::{Store, StoreError, YearlyData};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Store kept in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    years: RwLock<HashMap<i32, YearlyData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn save(&self, year: i32, data: &YearlyData) -> Result<(), StoreError> {
        self.years.write().insert(year, data.clone());
        Ok(())
    }

    fn load(&self, year: i32) -> Result<YearlyData, StoreError> {
        Ok(self.years.read().get(&year).cloned().unwrap_or_default())
    }
}
