//! Notes service: the in-memory store behind resources, tools and the dashboard.
//!
//! Notes live for the lifetime of the process. Ids are decimal strings from a
//! monotonic counter, so they stay unique even if removal is ever added.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{Error, Result};

/// A text note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: String,
    /// Title, trimmed and non-empty
    pub title: String,
    /// Text content, trimmed and non-empty
    pub content: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

/// Notes in insertion order plus an id index.
#[derive(Debug, Default)]
struct NoteStore {
    notes: Vec<Note>,
    index: HashMap<String, usize>,
    last_id: u64,
}

impl NoteStore {
    fn insert(&mut self, title: String, content: String) -> Note {
        self.last_id += 1;
        let note = Note {
            id: self.last_id.to_string(),
            title,
            content,
            created_at: Utc::now(),
        };
        self.index.insert(note.id.clone(), self.notes.len());
        self.notes.push(note.clone());
        note
    }
}

/// Notes service.
#[derive(Debug, Default)]
pub struct NotesService {
    store: RwLock<NoteStore>,
}

impl NotesService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service holding the two example notes.
    pub fn with_seed_notes() -> Self {
        let mut store = NoteStore::default();
        store.insert("First Note".to_string(), "This is note 1".to_string());
        store.insert("Second Note".to_string(), "This is note 2".to_string());
        Self {
            store: RwLock::new(store),
        }
    }

    /// All notes in insertion order.
    pub async fn list(&self) -> Vec<Note> {
        self.store.read().await.notes.clone()
    }

    /// Look up a note by id.
    pub async fn get(&self, id: &str) -> Result<Note> {
        let store = self.store.read().await;
        store
            .index
            .get(id)
            .map(|&i| store.notes[i].clone())
            .ok_or_else(|| Error::NotFound(format!("Note {} not found", id)))
    }

    /// Create a note. Both fields are trimmed and must not end up empty.
    ///
    /// ```
    /// use create_mcp_server::service::NotesService;
    ///
    /// # tokio_test::block_on(async {
    /// let service = NotesService::with_seed_notes();
    /// let note = service.create(" Groceries ", "milk").await.unwrap();
    /// assert_eq!(note.id, "3");
    /// assert_eq!(note.title, "Groceries");
    /// assert!(service.create("   ", "milk").await.is_err());
    /// # });
    /// ```
    pub async fn create(&self, title: &str, content: &str) -> Result<Note> {
        let title = title.trim();
        let content = content.trim();

        if title.is_empty() {
            return Err(Error::InvalidArgument(
                "Title is required and must be a non-empty string".to_string(),
            ));
        }
        if content.is_empty() {
            return Err(Error::InvalidArgument(
                "Content is required and must be a non-empty string".to_string(),
            ));
        }

        let note = self
            .store
            .write()
            .await
            .insert(title.to_string(), content.to_string());
        info!("Created note {}: {}", note.id, note.title);

        Ok(note)
    }

    /// Number of stored notes.
    pub async fn count(&self) -> usize {
        self.store.read().await.notes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_notes() {
        let service = NotesService::with_seed_notes();
        let notes = service.list().await;

        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, "1");
        assert_eq!(notes[0].title, "First Note");
        assert_eq!(notes[1].id, "2");
        assert_eq!(notes[1].content, "This is note 2");
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let service = NotesService::new();
        let note = service.create("  Groceries ", "\tmilk, eggs\n").await.unwrap();

        assert_eq!(note.id, "1");
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "milk, eggs");
        assert_eq!(service.get("1").await.unwrap(), note);
    }

    #[tokio::test]
    async fn test_ids_strictly_increase() {
        let service = NotesService::with_seed_notes();
        let mut previous = 2u64;

        for i in 0..10 {
            let note = service
                .create(&format!("Note {}", i), "content")
                .await
                .unwrap();
            let id: u64 = note.id.parse().unwrap();
            assert!(id > previous);
            previous = id;
        }
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let service = NotesService::new();
        for title in ["c", "a", "b"] {
            service.create(title, "x").await.unwrap();
        }

        let titles: Vec<_> = service.list().await.into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let service = NotesService::with_seed_notes();

        for (title, content) in [("", "x"), ("x", ""), ("   ", "x"), ("x", " \n\t ")] {
            let err = service.create(title, content).await.unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)));
        }

        assert_eq!(service.count().await, 2);
    }

    #[tokio::test]
    async fn test_get_missing() {
        let service = NotesService::with_seed_notes();
        let err = service.get("42").await.unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.to_string(), "Note 42 not found");
    }

    #[test]
    fn test_note_serialization() {
        let note = Note {
            id: "1".to_string(),
            title: "t".to_string(),
            content: "c".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
