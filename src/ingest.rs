//! Raw record ingestion.
//!
//! Maps loosely structured JSON records (the shape the upstream store
//! produces) into typed [`Document`]s, building the flattened searchable
//! text each kind uses for substring and keyword matching. Missing fields
//! are simply omitted from the text; only a feedback record without a
//! comment is dropped outright, since it carries nothing to search.

use crate::config;
use crate::document::{attr, AttrValue, Document, DocumentKind};
use serde_json::Value;
use std::collections::HashMap;

/// Stored category codes and their Vietnamese display names.
const CATEGORY_DISPLAY: &[(&str, &str)] = &[
    ("monchinh", "món chính"),
    ("monphu", "món phụ"),
    ("trangmieng", "tráng miệng"),
    ("douong", "đồ uống"),
    ("anvat", "ăn vặt"),
];

/// Display name for a category code; unknown codes pass through unchanged.
pub fn category_display_name(code: &str) -> &str {
    CATEGORY_DISPLAY
        .iter()
        .find(|(c, _)| *c == code)
        .map(|&(_, name)| name)
        .unwrap_or(code)
}

/// Builds a recipe document.
///
/// Searchable text is assembled as labeled ` | `-joined segments, e.g.
/// `Tên món: Phở Bò | Mô tả: … | Danh mục: món chính | Nguyên liệu: …`.
pub fn recipe_from_json(record: &Value) -> Document {
    let name = str_field(record, "name").unwrap_or_default();
    let mut parts = Vec::new();
    let mut attrs = HashMap::new();

    if !name.is_empty() {
        parts.push(format!("Tên món: {name}"));
    }
    if let Some(description) = str_field(record, "description") {
        parts.push(format!("Mô tả: {description}"));
        attrs.insert(
            attr::DESCRIPTION.to_string(),
            AttrValue::String(description),
        );
    }
    if let Some(category) = str_field(record, "category") {
        parts.push(format!("Danh mục: {}", category_display_name(&category)));
        attrs.insert(attr::CATEGORY.to_string(), AttrValue::String(category));
    }
    if let Some(ingredients) = list_field(record, "ingredients") {
        parts.push(format!("Nguyên liệu: {}", ingredients.join(", ")));
        attrs.insert(attr::INGREDIENTS.to_string(), AttrValue::List(ingredients));
    }
    if let Some(instructions) = list_field(record, "instructions") {
        parts.push(format!("Cách làm: {}", instructions.join(". ")));
        attrs.insert(
            attr::INSTRUCTIONS.to_string(),
            AttrValue::List(instructions),
        );
    }
    if let Some(cooking_time) = str_field(record, "cookingTime") {
        parts.push(format!("Thời gian: {cooking_time}"));
        attrs.insert(
            attr::COOKING_TIME.to_string(),
            AttrValue::String(cooking_time),
        );
    }
    if let Some(difficulty) = str_field(record, "difficulty") {
        parts.push(format!("Độ khó: {difficulty}"));
        attrs.insert(attr::DIFFICULTY.to_string(), AttrValue::String(difficulty));
    }
    if let Some(tags) = list_field(record, "tags") {
        parts.push(format!("Tags: {}", tags.join(", ")));
        attrs.insert(attr::TAGS.to_string(), AttrValue::List(tags));
    }
    if let Some(created_at) = str_field(record, "createdAt") {
        attrs.insert(attr::CREATED_AT.to_string(), AttrValue::String(created_at));
    }
    if let Some(id) = str_field(record, "_id") {
        attrs.insert(attr::SOURCE_ID.to_string(), AttrValue::String(id));
    }

    Document::new(DocumentKind::Recipe, name, parts.join(" | "), attrs)
}

/// Builds an FAQ document. Searchable text is the bare `question answer`
/// concatenation the embedding side uses.
pub fn faq_from_json(record: &Value) -> Document {
    let question = str_field(record, "question").unwrap_or_default();
    let answer = str_field(record, "answer").unwrap_or_default();
    let mut attrs = HashMap::new();
    attrs.insert(
        attr::QUESTION.to_string(),
        AttrValue::String(question.clone()),
    );
    attrs.insert(attr::ANSWER.to_string(), AttrValue::String(answer.clone()));
    if let Some(category) = str_field(record, "category") {
        attrs.insert(attr::CATEGORY.to_string(), AttrValue::String(category));
    }

    let searchable = format!("{question} {answer}").trim().to_string();
    Document::new(DocumentKind::Faq, question, searchable, attrs)
}

/// Builds a blog document. Content is capped at
/// [`config::BLOG_CONTENT_SNIPPET_CHARS`] characters in the searchable text
/// but stored whole.
pub fn blog_from_json(record: &Value) -> Document {
    let title = str_field(record, "title").unwrap_or_default();
    let mut parts = Vec::new();
    let mut attrs = HashMap::new();

    if !title.is_empty() {
        parts.push(format!("Tiêu đề: {title}"));
    }
    if let Some(content) = str_field(record, "content") {
        let snippet: String = content
            .chars()
            .take(config::BLOG_CONTENT_SNIPPET_CHARS)
            .collect();
        parts.push(format!("Nội dung: {snippet}"));
        attrs.insert(attr::CONTENT.to_string(), AttrValue::String(content));
    }
    if let Some(category) = str_field(record, "category") {
        parts.push(format!("Danh mục: {category}"));
        attrs.insert(attr::CATEGORY.to_string(), AttrValue::String(category));
    }
    if let Some(tags) = list_field(record, "tags") {
        parts.push(format!("Tags: {}", tags.join(", ")));
        attrs.insert(attr::TAGS.to_string(), AttrValue::List(tags));
    }
    if let Some(author) = str_field(record, "author") {
        parts.push(format!("Tác giả: {author}"));
        attrs.insert(attr::AUTHOR.to_string(), AttrValue::String(author));
    }

    Document::new(DocumentKind::Blog, title, parts.join(" | "), attrs)
}

/// Builds a feedback document, or `None` when the record has no comment.
/// `recipeName` is expected to be pre-resolved by the caller.
pub fn feedback_from_json(record: &Value) -> Option<Document> {
    let comment = str_field(record, "comment")?;
    let mut parts = vec![format!("Đánh giá: {comment}")];
    let mut attrs = HashMap::new();
    attrs.insert(
        attr::COMMENT.to_string(),
        AttrValue::String(comment.clone()),
    );

    if let Some(rating) = record.get("rating").and_then(Value::as_i64) {
        parts.push(format!("Điểm: {rating}/5 sao"));
        attrs.insert(attr::RATING.to_string(), AttrValue::Integer(rating));
    }
    let title = match str_field(record, "recipeName") {
        Some(recipe_name) => {
            parts.push(format!("Món ăn: {recipe_name}"));
            recipe_name
        }
        None => String::new(),
    };
    if let Some(id) = str_field(record, "recipeId") {
        attrs.insert(attr::SOURCE_ID.to_string(), AttrValue::String(id));
    }

    Some(Document::new(
        DocumentKind::Feedback,
        title,
        parts.join(" | "),
        attrs,
    ))
}

fn str_field(record: &Value, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn list_field(record: &Value, key: &str) -> Option<Vec<String>> {
    let items: Vec<String> = record
        .get(key)?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}
