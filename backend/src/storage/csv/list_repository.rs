//! CSV-backed habit list repository.

use crate::domain::models::habit_list::HabitList;
use crate::storage::{HabitListStorage, StorageError, StorageResult};

use super::connection::CsvConnection;
use super::{read_rows, write_rows};

const LISTS_FILE: &str = "lists.csv";

/// CSV-backed habit list repository.
#[derive(Debug, Clone)]
pub struct ListRepository {
    connection: CsvConnection,
}

impl ListRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_all(&self) -> StorageResult<Vec<HabitList>> {
        read_rows(&self.connection, LISTS_FILE)
    }

    fn write_all(&self, lists: &[HabitList]) -> StorageResult<()> {
        write_rows(&self.connection, LISTS_FILE, lists)
    }
}

impl HabitListStorage for ListRepository {
    fn store_list(&self, list: &HabitList) -> StorageResult<()> {
        let mut lists = self.read_all()?;
        lists.push(list.clone());
        self.write_all(&lists)
    }

    fn get_list(&self, list_id: &str) -> StorageResult<Option<HabitList>> {
        Ok(self.read_all()?.into_iter().find(|l| l.id == list_id))
    }

    fn list_lists(&self) -> StorageResult<Vec<HabitList>> {
        let mut lists = self.read_all()?;
        lists.sort_by_key(|l| l.order);
        Ok(lists)
    }

    fn update_list(&self, list: &HabitList) -> StorageResult<()> {
        self.update_lists(std::slice::from_ref(list))
    }

    fn update_lists(&self, updated: &[HabitList]) -> StorageResult<()> {
        let mut lists = self.read_all()?;
        for update in updated {
            let list = lists
                .iter_mut()
                .find(|l| l.id == update.id)
                .ok_or_else(|| StorageError::NotFound {
                    entity: "habit list",
                    id: update.id.clone(),
                })?;
            *list = update.clone();
        }
        self.write_all(&lists)
    }

    fn delete_list(&self, list_id: &str) -> StorageResult<bool> {
        let mut lists = self.read_all()?;
        let before = lists.len();
        lists.retain(|l| l.id != list_id);
        if lists.len() == before {
            return Ok(false);
        }
        self.write_all(&lists)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn setup() -> (ListRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        (ListRepository::new(connection), temp_dir)
    }

    fn sample_list(name: &str, order: i64) -> HabitList {
        HabitList {
            id: HabitList::generate_id(),
            name: name.to_string(),
            icon: "folder".to_string(),
            color: "#50C878".to_string(),
            order,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_store_list_get_round_trip() {
        let (repo, _temp_dir) = setup();
        let list = sample_list("Morning", 0);
        repo.store_list(&list).unwrap();
        assert_eq!(repo.get_list(&list.id).unwrap().unwrap().name, "Morning");
    }

    #[test]
    fn test_list_lists_sorted_by_order() {
        let (repo, _temp_dir) = setup();
        repo.store_list(&sample_list("Second", 1)).unwrap();
        repo.store_list(&sample_list("First", 0)).unwrap();
        let names: Vec<String> = repo.list_lists().unwrap().into_iter().map(|l| l.name).collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_update_missing_list_is_not_found() {
        let (repo, _temp_dir) = setup();
        let err = repo.update_list(&sample_list("Ghost", 0)).unwrap_err();
        assert!(matches!(err, StorageError::NotFound { entity: "habit list", .. }));
    }

    #[test]
    fn test_delete_list() {
        let (repo, _temp_dir) = setup();
        let list = sample_list("Morning", 0);
        repo.store_list(&list).unwrap();
        assert!(repo.delete_list(&list.id).unwrap());
        assert!(!repo.delete_list(&list.id).unwrap());
    }
}
