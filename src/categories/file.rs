use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{default_categories, insert, remove, Category, CategoryStore, Result};
use crate::store::FileLock;

/// JSONファイルに保存するカテゴリカタログ
///
/// ファイルがない場合はデフォルトのカテゴリだけを返し、最初の追加で作成する。
/// ファイルからデフォルトが欠けていても読み込み時に補う。
#[derive(Debug, Clone)]
pub struct FileCategories {
    path: PathBuf,
}

impl FileCategories {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Category>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(default_categories()),
            Err(e) => return Err(e.into()),
        };
        if data.trim().is_empty() {
            return Ok(default_categories());
        }

        let stored: Vec<Category> = serde_json::from_str(&data)?;
        let mut categories = default_categories();
        let custom: Vec<Category> = stored
            .into_iter()
            .filter(|category| !categories.iter().any(|d| d.matches(&category.name)))
            .collect();
        categories.extend(custom);
        Ok(categories)
    }

    fn write(&self, categories: &[Category]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(categories)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Vec<Category>) -> Result<T>) -> Result<T> {
        let _lock = FileLock::acquire(&self.path.with_extension("json.lock"))?;
        let mut categories = self.read()?;
        let value = f(&mut categories)?;
        self.write(&categories)?;
        Ok(value)
    }
}

impl CategoryStore for FileCategories {
    fn all(&self) -> Result<Vec<Category>> {
        self.read()
    }

    fn add(&self, name: &str, color: Option<&str>) -> Result<Category> {
        let category = self.modify(|categories| insert(categories, name, color))?;
        debug!("カテゴリを追加しました: {}", category.name);
        Ok(category)
    }

    fn delete(&self, name: &str) -> Result<Category> {
        let category = self.modify(|categories| remove(categories, name))?;
        debug!("カテゴリを削除しました: {}", category.name);
        Ok(category)
    }
}
