//! CSV-backed category repository.

use crate::domain::models::category::HabitCategory;
use crate::storage::{CategoryStorage, StorageError, StorageResult};

use super::connection::CsvConnection;
use super::{read_rows, write_rows};

const CATEGORIES_FILE: &str = "categories.csv";

/// CSV-backed category repository.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    connection: CsvConnection,
}

impl CategoryRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_all(&self) -> StorageResult<Vec<HabitCategory>> {
        read_rows(&self.connection, CATEGORIES_FILE)
    }

    fn write_all(&self, categories: &[HabitCategory]) -> StorageResult<()> {
        write_rows(&self.connection, CATEGORIES_FILE, categories)
    }
}

impl CategoryStorage for CategoryRepository {
    fn store_category(&self, category: &HabitCategory) -> StorageResult<()> {
        let mut categories = self.read_all()?;
        categories.push(category.clone());
        self.write_all(&categories)
    }

    fn get_category(&self, category_id: &str) -> StorageResult<Option<HabitCategory>> {
        Ok(self.read_all()?.into_iter().find(|c| c.id == category_id))
    }

    fn list_categories(&self) -> StorageResult<Vec<HabitCategory>> {
        let mut categories = self.read_all()?;
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    fn update_category(&self, category: &HabitCategory) -> StorageResult<()> {
        let mut categories = self.read_all()?;
        let existing = categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or_else(|| StorageError::NotFound {
                entity: "category",
                id: category.id.clone(),
            })?;
        *existing = category.clone();
        self.write_all(&categories)
    }

    fn delete_category(&self, category_id: &str) -> StorageResult<bool> {
        let mut categories = self.read_all()?;
        let before = categories.len();
        categories.retain(|c| c.id != category_id);
        if categories.len() == before {
            return Ok(false);
        }
        self.write_all(&categories)?;
        Ok(true)
    }
}
