//! Category/subcategory registry.
//!
//! Categories are unique by exact (case-sensitive) name; subcategories are
//! unique within their owning category. Adding a duplicate or an empty name
//! is a no-op. There is no removal.

use crate::model::{Category, CategorySet};

impl CategorySet {
    /// Append a category with an empty subcategory list.
    ///
    /// Returns `false` when nothing changed (empty or already present).
    pub fn add_category(&mut self, name: &str) -> bool {
        if name.is_empty() || self.contains(name) {
            log::debug!("category '{name}' not added (empty or duplicate)");
            return false;
        }
        self.entries.push(Category::new(name));
        true
    }

    /// Append a subcategory under an existing category.
    ///
    /// Returns `false` when nothing changed: empty name, unknown category,
    /// or the subcategory already exists under that category.
    pub fn add_subcategory(&mut self, category: &str, name: &str) -> bool {
        if name.is_empty() {
            return false;
        }
        let Some(entry) = self.entries.iter_mut().find(|c| c.name == category) else {
            log::debug!("subcategory '{name}' not added: no category '{category}'");
            return false;
        };
        if entry.subcategories.iter().any(|s| s == name) {
            return false;
        }
        entry.subcategories.push(name.to_string());
        true
    }
}
