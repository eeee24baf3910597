//! Core document types.
//!
//! A [`Document`] is one knowledge-base entry: a recipe, FAQ item, blog post,
//! or user feedback record. Documents are immutable once stored and replaced
//! wholesale on index rebuild. The retrieval engine and vector index hold
//! `Arc<Document>` handles, never copies of mutable state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Well-known attribute keys produced by ingestion.
pub mod attr {
    pub const DESCRIPTION: &str = "description";
    pub const INGREDIENTS: &str = "ingredients";
    pub const INSTRUCTIONS: &str = "instructions";
    pub const CATEGORY: &str = "category";
    pub const COOKING_TIME: &str = "cooking_time";
    pub const DIFFICULTY: &str = "difficulty";
    pub const TAGS: &str = "tags";
    pub const QUESTION: &str = "question";
    pub const ANSWER: &str = "answer";
    pub const CONTENT: &str = "content";
    pub const AUTHOR: &str = "author";
    pub const RATING: &str = "rating";
    pub const COMMENT: &str = "comment";
    pub const CREATED_AT: &str = "created_at";
    pub const SOURCE_ID: &str = "source_id";
}

/// The kind of knowledge-base entry a document represents.
///
/// A closed set: retrieval strategies and confidence factors branch on kind,
/// so open-ended extension is deliberately not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// A cooking recipe with ingredients and instructions.
    Recipe,
    /// A curated question/answer pair.
    Faq,
    /// An editorial blog post.
    Blog,
    /// A user rating with an optional comment.
    Feedback,
}

impl DocumentKind {
    /// Lowercase name used in logs and display output.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Recipe => "recipe",
            DocumentKind::Faq => "faq",
            DocumentKind::Blog => "blog",
            DocumentKind::Feedback => "feedback",
        }
    }
}

/// A typed attribute value attached to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    String(String),
    Integer(i64),
    Float(f64),
    /// Ordered list of strings (ingredient lines, instruction steps, tags).
    List(Vec<String>),
}

/// An immutable knowledge-base entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier (UUID v4, assigned at ingestion).
    pub id: Uuid,
    /// Entry kind, drives strategy and factor branching.
    pub kind: DocumentKind,
    /// Primary name/title field (recipe name, FAQ question, blog title).
    pub title: String,
    /// Flattened text used by substring and keyword matching.
    pub searchable_text: String,
    /// Kind-specific attributes keyed by the [`attr`] constants.
    pub attributes: HashMap<String, AttrValue>,
}

impl Document {
    /// Creates a document with a fresh UUID.
    pub fn new(
        kind: DocumentKind,
        title: String,
        searchable_text: String,
        attributes: HashMap<String, AttrValue>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title,
            searchable_text,
            attributes,
        }
    }

    /// Returns a string attribute, or `None` if absent or differently typed.
    pub fn str_attr(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(AttrValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Returns a list attribute, or `None` if absent or differently typed.
    pub fn list_attr(&self, key: &str) -> Option<&[String]> {
        match self.attributes.get(key) {
            Some(AttrValue::List(v)) => Some(v),
            _ => None,
        }
    }
}
