// src/memory.rs
// Per-session shopping lists. Nothing here outlives the process.

use chrono::{DateTime, Local};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingListItem {
    pub title: String,
    pub description: String,
    pub price: String,
    pub url: String,
    pub source: String,
    pub added_at: DateTime<Local>,
}

impl ShoppingListItem {
    pub fn new(title: &str, description: &str, price: &str, url: &str, source: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            price: price.to_string(),
            url: url.to_string(),
            source: source.to_string(),
            added_at: Local::now(),
        }
    }

    fn same_as(&self, other: &ShoppingListItem) -> bool {
        self.url == other.url && self.title == other.title
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShoppingList {
    items: Vec<ShoppingListItem>,
}

impl ShoppingList {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// False if an item with the same (url, title) is already on the list.
    pub fn add(&mut self, item: ShoppingListItem) -> bool {
        if self.items.iter().any(|existing| existing.same_as(&item)) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<ShoppingListItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[ShoppingListItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Session id → that session's list.
#[derive(Clone, Default)]
pub struct SessionStore {
    lists: Arc<DashMap<String, ShoppingList>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        self.lists.insert(id.clone(), ShoppingList::new());
        id
    }

    /// Runs `f` on the session's list; `None` if the session is unknown.
    pub fn with_list<R>(&self, id: &str, f: impl FnOnce(&mut ShoppingList) -> R) -> Option<R> {
        self.lists.get_mut(id).map(|mut list| f(&mut list))
    }

    pub fn snapshot(&self, id: &str) -> Option<ShoppingList> {
        self.lists.get(id).map(|list| list.clone())
    }

    /// Drops the session and its list.
    pub fn remove(&self, id: &str) -> Option<ShoppingList> {
        self.lists.remove(id).map(|(_, list)| list)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, url: &str) -> ShoppingListItem {
        ShoppingListItem::new(title, "desc", "₹40", url, "bigbasket.com")
    }

    #[test]
    fn duplicates_are_keyed_on_url_and_title() {
        let mut list = ShoppingList::new();
        assert!(list.add(item("Tomato", "https://a.com/1")));
        assert!(!list.add(item("Tomato", "https://a.com/1")));
        assert!(list.add(item("Tomato", "https://a.com/2")));
        assert!(list.add(item("Tomato Hybrid", "https://a.com/1")));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn remove_and_clear() {
        let mut list = ShoppingList::new();
        list.add(item("A", "https://a.com"));
        list.add(item("B", "https://b.com"));
        assert_eq!(list.remove(5), None);
        assert_eq!(list.remove(0).map(|i| i.title), Some("A".to_string()));
        assert_eq!(list.items()[0].title, "B");
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn sessions_do_not_share_lists() {
        let store = SessionStore::new();
        let a = store.create();
        let b = store.create();
        assert_ne!(a, b);

        store.with_list(&a, |l| l.add(item("Milk", "https://x.com")));
        assert_eq!(store.snapshot(&a).map(|l| l.len()), Some(1));
        assert_eq!(store.snapshot(&b).map(|l| l.len()), Some(0));
        assert!(store.with_list("missing", |l| l.len()).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn removed_sessions_are_gone() {
        let store = SessionStore::new();
        let id = store.create();
        store.with_list(&id, |l| l.add(item("Milk", "https://x.com")));

        assert_eq!(store.remove(&id).map(|l| l.len()), Some(1));
        assert_eq!(store.len(), 0);
        assert!(store.snapshot(&id).is_none());
        assert!(store.remove(&id).is_none());
    }
}
