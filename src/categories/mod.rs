//! カテゴリカタログ
//!
//! セッションに付けるカテゴリの一覧を管理する。
//! Work / Study / Personal / Meeting の4つはデフォルトとして常に存在し、削除できない。
//! 名前の比較は大文字小文字を区別しない。

mod error;
mod file;
mod memory;

pub use error::{CategoryError, Result};
pub use file::FileCategories;
pub use memory::MemoryCategories;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// デフォルトのカテゴリ（名前と表示色）
pub const DEFAULT_CATEGORIES: [(&str, &str); 4] = [
    ("Work", "#3b82f6"),
    ("Study", "#10b981"),
    ("Personal", "#f59e0b"),
    ("Meeting", "#8b5cf6"),
];

/// 色を指定せずに追加したカテゴリの表示色
pub const DEFAULT_CUSTOM_COLOR: &str = "#64748b";

/// カテゴリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub is_default: bool,
}

impl Category {
    /// ユーザーが追加するカテゴリ
    pub fn custom(name: &str, color: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            color: color.unwrap_or(DEFAULT_CUSTOM_COLOR).to_string(),
            is_default: false,
        }
    }

    /// 名前が一致するか（大文字小文字を区別しない）
    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}

/// デフォルトのカテゴリ一覧
pub fn default_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, color)| Category {
            id: format!("default-{}", name.to_lowercase()),
            name: name.to_string(),
            color: color.to_string(),
            is_default: true,
        })
        .collect()
}

/// カテゴリの保存先
pub trait CategoryStore: Send + Sync {
    /// 全カテゴリ（デフォルトが先頭、追加順）
    fn all(&self) -> Result<Vec<Category>>;

    /// カテゴリを追加
    ///
    /// # Errors
    ///
    /// - 名前が空の場合
    /// - 同名のカテゴリが既にある場合（大文字小文字を区別しない）
    fn add(&self, name: &str, color: Option<&str>) -> Result<Category>;

    /// 名前でカテゴリを削除し、削除したカテゴリを返す
    ///
    /// # Errors
    ///
    /// - デフォルトのカテゴリを指定した場合
    /// - カテゴリが存在しない場合
    fn delete(&self, name: &str) -> Result<Category>;

    /// 名前で検索
    fn find(&self, name: &str) -> Result<Option<Category>> {
        Ok(self.all()?.into_iter().find(|category| category.matches(name)))
    }

    /// 登録済みならそのカテゴリを、未登録なら追加したカテゴリを返す
    ///
    /// 戻り値の `bool` は新しく追加したかどうか。
    fn ensure(&self, name: &str) -> Result<(Category, bool)> {
        if let Some(existing) = self.find(name)? {
            return Ok((existing, false));
        }
        Ok((self.add(name, None)?, true))
    }
}

/// 一覧にカテゴリを追加する
pub(crate) fn insert(
    categories: &mut Vec<Category>,
    name: &str,
    color: Option<&str>,
) -> Result<Category> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CategoryError::EmptyName);
    }
    if categories.iter().any(|category| category.matches(trimmed)) {
        return Err(CategoryError::Duplicate(trimmed.to_string()));
    }
    let category = Category::custom(trimmed, color);
    categories.push(category.clone());
    Ok(category)
}

/// 一覧からカテゴリを取り除く
pub(crate) fn remove(categories: &mut Vec<Category>, name: &str) -> Result<Category> {
    let index = categories
        .iter()
        .position(|category| category.matches(name))
        .ok_or_else(|| CategoryError::NotFound(name.trim().to_string()))?;
    if categories[index].is_default {
        return Err(CategoryError::ProtectedDefault(categories[index].name.clone()));
    }
    Ok(categories.remove(index))
}
