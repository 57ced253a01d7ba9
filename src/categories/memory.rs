use std::sync::{Mutex, MutexGuard};

use super::{default_categories, insert, remove, Category, CategoryStore, Result};

/// メモリ上のカテゴリカタログ（テスト用）
#[derive(Debug)]
pub struct MemoryCategories {
    categories: Mutex<Vec<Category>>,
}

impl MemoryCategories {
    pub fn new() -> Self {
        Self {
            categories: Mutex::new(default_categories()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Category>> {
        self.categories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryCategories {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryStore for MemoryCategories {
    fn all(&self) -> Result<Vec<Category>> {
        Ok(self.lock().clone())
    }

    fn add(&self, name: &str, color: Option<&str>) -> Result<Category> {
        insert(&mut self.lock(), name, color)
    }

    fn delete(&self, name: &str) -> Result<Category> {
        remove(&mut self.lock(), name)
    }
}
