//! The seven confidence factor functions.
//!
//! Each factor maps retrieval context to a score in `[0, 1]`. Absent inputs
//! never panic or error: factors with nothing to measure return their
//! documented neutral or floor values.

use crate::config;
use crate::document::{attr, Document, DocumentKind};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

/// Cooking-domain keyword categories for context relevance.
const COOKING_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "ingredients",
        &["nguyên liệu", "thành phần", "gia vị", "rau củ", "thịt", "cá"],
    ),
    (
        "cooking_methods",
        &["nấu", "chiên", "luộc", "nướng", "xào", "hấp", "om", "kho"],
    ),
    (
        "time_related",
        &["thời gian", "phút", "giờ", "nhanh", "chậm", "lâu"],
    ),
    (
        "difficulty",
        &["dễ", "khó", "đơn giản", "phức tạp", "cơ bản", "nâng cao"],
    ),
    (
        "taste",
        &["ngon", "ngọt", "mặn", "chua", "cay", "đắng", "béo"],
    ),
    (
        "nutrition",
        &["dinh dưỡng", "vitamin", "protein", "carb", "chất béo", "calo"],
    ),
];

/// Phrases that signal a recipe-style request.
const RECIPE_PHRASES: &[&str] = &["công thức", "cách làm"];

/// Phrases that signal an FAQ-style request.
const FAQ_PHRASES: &[&str] = &["tại sao", "làm sao", "như thế nào", "có nên"];

/// Specificity phrases for query clarity.
const SPECIFICITY_PHRASES: &[&str] =
    &["cách làm", "công thức", "nguyên liệu", "thời gian", "làm sao"];

/// Interrogative markers for query clarity.
const QUESTION_WORDS: &[&str] = &["gì", "sao", "nào", "bao nhiêu", "như thế nào"];

/// Enumeration and bullet markers for answer structure.
const STRUCTURE_MARKERS: &[&str] = &["1.", "2.", "-", "•"];

/// Rank-decayed weighted mean of similarity scores, pushed through a
/// logistic transform to spread the mid-range. Empty input scores 0.
pub(crate) fn semantic_similarity(scores: &[f32]) -> f32 {
    if scores.is_empty() {
        return 0.0;
    }
    let weights: Vec<f32> = (0..scores.len())
        .map(|rank| (-(rank as f32) * config::SIMILARITY_DECAY_RATE).exp())
        .collect();
    let weight_sum: f32 = weights.iter().sum();
    let weighted_avg: f32 = scores
        .iter()
        .zip(&weights)
        .map(|(score, weight)| score * weight)
        .sum::<f32>()
        / weight_sum;

    let sigmoid = 2.0
        / (1.0 + (-config::SIGMOID_STEEPNESS * (weighted_avg - config::SIGMOID_MIDPOINT)).exp());
    sigmoid.min(1.0)
}

/// Word-token overlap between query and documents, averaged over documents
/// and normalized by the query's distinct token count.
pub(crate) fn keyword_match(query: &str, docs: &[Arc<Document>]) -> f32 {
    if docs.is_empty() {
        return 0.0;
    }
    let query_lower = query.to_lowercase();
    let query_words = word_set(&query_lower);
    if query_words.is_empty() {
        return 0.0;
    }

    let total_matches: usize = docs
        .iter()
        .map(|doc| {
            let doc_text = matchable_text(doc).to_lowercase();
            let doc_words = word_set(&doc_text);
            query_words.intersection(&doc_words).count()
        })
        .sum();

    let avg_match_rate = (total_matches as f32 / docs.len() as f32) / query_words.len() as f32;
    avg_match_rate.min(1.0)
}

/// Per-document relevance from shared cooking keyword categories plus a
/// bonus when the query's phrasing matches the document kind, averaged.
pub(crate) fn context_relevance(query: &str, docs: &[Arc<Document>]) -> f32 {
    if docs.is_empty() {
        return 0.0;
    }
    let query = query.to_lowercase();

    let sum: f32 = docs
        .iter()
        .map(|doc| {
            let mut score = 0.0f32;
            let doc_text = matchable_text(doc).to_lowercase();

            for (_, keywords) in COOKING_KEYWORDS {
                let query_has = keywords.iter().any(|kw| query.contains(kw));
                if query_has && keywords.iter().any(|kw| doc_text.contains(kw)) {
                    score += config::CATEGORY_MATCH_INCREMENT;
                }
            }

            if RECIPE_PHRASES.iter().any(|p| query.contains(p))
                && doc.kind == DocumentKind::Recipe
            {
                score += config::KIND_MATCH_BONUS;
            }
            if FAQ_PHRASES.iter().any(|p| query.contains(p)) && doc.kind == DocumentKind::Faq {
                score += config::KIND_MATCH_BONUS;
            }

            score.min(1.0)
        })
        .sum();
    sum / docs.len() as f32
}

/// Linear one-year decay for timestamped recipes; static kinds score a flat
/// default. No documents at all scores neutral.
pub(crate) fn data_freshness(docs: &[Arc<Document>], now: DateTime<Utc>) -> f32 {
    if docs.is_empty() {
        return config::NEUTRAL_SCORE;
    }

    let sum: f32 = docs
        .iter()
        .map(|doc| {
            if doc.kind != DocumentKind::Recipe {
                return config::FRESHNESS_STATIC_DEFAULT;
            }
            match doc.str_attr(attr::CREATED_AT) {
                Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                    Ok(created) => {
                        let days = (now - created.with_timezone(&Utc)).num_days() as f32;
                        (1.0 - days / config::FRESHNESS_HORIZON_DAYS).clamp(0.0, 1.0)
                    }
                    Err(_) => config::FRESHNESS_PARSE_DEFAULT,
                },
                None => config::FRESHNESS_PARSE_DEFAULT,
            }
        })
        .sum();
    sum / docs.len() as f32
}

/// Kind-based reliability with bonuses for complete, detailed content.
pub(crate) fn source_reliability(docs: &[Arc<Document>]) -> f32 {
    if docs.is_empty() {
        return config::NEUTRAL_SCORE;
    }

    let sum: f32 = docs
        .iter()
        .map(|doc| {
            let mut score = match doc.kind {
                DocumentKind::Recipe => {
                    let mut s = config::RELIABILITY_RECIPE_BASE;
                    let ingredients = doc.list_attr(attr::INGREDIENTS);
                    let instructions = doc.list_attr(attr::INSTRUCTIONS);
                    if ingredients.is_some_and(|l| !l.is_empty())
                        && instructions.is_some_and(|l| !l.is_empty())
                    {
                        s += config::RELIABILITY_BONUS;
                    }
                    if instructions.is_some_and(|l| l.len() >= config::DETAILED_INSTRUCTION_STEPS)
                    {
                        s += config::RELIABILITY_BONUS;
                    }
                    s
                }
                DocumentKind::Faq => {
                    let mut s = config::RELIABILITY_FAQ_BASE;
                    if doc
                        .str_attr(attr::ANSWER)
                        .is_some_and(|a| a.chars().count() > config::DETAILED_ANSWER_CHARS)
                    {
                        s += config::RELIABILITY_BONUS;
                    }
                    s
                }
                _ => config::RELIABILITY_DEFAULT_BASE,
            };
            score = score.min(1.0);
            score
        })
        .sum();
    sum / docs.len() as f32
}

/// Length, specificity, and interrogative signals in the query itself.
pub(crate) fn query_clarity(query: &str) -> f32 {
    let query = query.to_lowercase();
    let query = query.trim();
    let length = query.chars().count();

    if length < config::CLARITY_MIN_QUERY_CHARS {
        return config::CLARITY_SHORT_SCORE;
    }

    let mut score = config::CLARITY_BASE;
    if (config::CLARITY_OPTIMAL_MIN..=config::CLARITY_OPTIMAL_MAX).contains(&length) {
        score += config::CLARITY_LENGTH_BONUS;
    } else if length > config::CLARITY_OPTIMAL_MAX {
        score += config::CLARITY_LONG_BONUS;
    }
    if SPECIFICITY_PHRASES.iter().any(|p| query.contains(p)) {
        score += config::CLARITY_SPECIFICITY_BONUS;
    }
    if QUESTION_WORDS.iter().any(|w| query.contains(w)) {
        score += config::CLARITY_QUESTION_WORD_BONUS;
    }
    if query.ends_with('?') {
        score += config::CLARITY_QUESTION_MARK_BONUS;
    }
    score.min(1.0)
}

/// Length, structure, and domain-completeness signals in the generated answer.
pub(crate) fn answer_completeness(query: &str, answer: &str) -> f32 {
    let length = answer.chars().count();
    if length < config::COMPLETENESS_MIN_ANSWER_CHARS {
        return config::COMPLETENESS_SHORT_SCORE;
    }

    let mut score = config::COMPLETENESS_BASE;
    if (config::COMPLETENESS_OPTIMAL_MIN..=config::COMPLETENESS_OPTIMAL_MAX).contains(&length) {
        score += config::COMPLETENESS_LENGTH_BONUS;
    } else if length > config::COMPLETENESS_OPTIMAL_MAX {
        score += config::COMPLETENESS_LONG_BONUS;
    }
    if STRUCTURE_MARKERS.iter().any(|m| answer.contains(m)) {
        score += config::COMPLETENESS_STRUCTURE_BONUS;
    }

    let query = query.to_lowercase();
    let answer = answer.to_lowercase();
    if RECIPE_PHRASES.iter().any(|p| query.contains(p)) {
        if answer.contains("nguyên liệu") {
            score += config::COMPLETENESS_DOMAIN_BONUS;
        }
        if ["bước", "cách", "làm"].iter().any(|w| answer.contains(w)) {
            score += config::COMPLETENESS_DOMAIN_BONUS;
        }
    }
    score.min(1.0)
}

/// Kind-specific text used for keyword and context matching.
fn matchable_text(doc: &Document) -> String {
    match doc.kind {
        DocumentKind::Recipe => format!("{} {}", doc.title, doc.searchable_text),
        DocumentKind::Faq => format!(
            "{} {}",
            doc.str_attr(attr::QUESTION).unwrap_or(&doc.title),
            doc.str_attr(attr::ANSWER).unwrap_or_default()
        ),
        _ => doc.searchable_text.clone(),
    }
}

/// Distinct alphanumeric word tokens.
fn word_set(text: &str) -> HashSet<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::AttrValue;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn recipe(title: &str, text: &str, attrs: HashMap<String, AttrValue>) -> Arc<Document> {
        Arc::new(Document::new(
            DocumentKind::Recipe,
            title.to_string(),
            text.to_string(),
            attrs,
        ))
    }

    fn faq(question: &str, answer: &str) -> Arc<Document> {
        let mut attrs = HashMap::new();
        attrs.insert(
            attr::QUESTION.to_string(),
            AttrValue::String(question.to_string()),
        );
        attrs.insert(
            attr::ANSWER.to_string(),
            AttrValue::String(answer.to_string()),
        );
        Arc::new(Document::new(
            DocumentKind::Faq,
            question.to_string(),
            format!("{question} {answer}"),
            attrs,
        ))
    }

    // ── Semantic similarity ────────────────────────────────────────────

    #[test]
    fn test_semantic_similarity_empty_is_zero() {
        assert_eq!(semantic_similarity(&[]), 0.0);
    }

    #[test]
    fn test_semantic_similarity_high_scores_saturate() {
        // Weighted average 1.0 → sigmoid ≈ 1.76, capped at 1.0.
        assert_eq!(semantic_similarity(&[1.0, 1.0, 1.0]), 1.0);
    }

    #[test]
    fn test_semantic_similarity_midpoint() {
        // A single score at the sigmoid midpoint maps to exactly 1.0 before
        // the cap: 2 / (1 + e^0) = 1.0.
        let score = semantic_similarity(&[0.5]);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_semantic_similarity_low_scores_stay_low() {
        let score = semantic_similarity(&[0.1, 0.05]);
        assert!(score < 0.5);
    }

    #[test]
    fn test_semantic_similarity_earlier_ranks_dominate() {
        let descending = semantic_similarity(&[0.9, 0.1]);
        let ascending = semantic_similarity(&[0.1, 0.9]);
        assert!(descending > ascending);
    }

    // ── Keyword match ──────────────────────────────────────────────────

    #[test]
    fn test_keyword_match_full_overlap() {
        let docs = vec![recipe("Phở Bò", "Tên món: phở bò", HashMap::new())];
        let score = keyword_match("phở bò", &docs);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let docs = vec![recipe("Phở Bò", "Tên món: PHỞ BÒ", HashMap::new())];
        let score = keyword_match("Phở BÒ", &docs);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_keyword_match_no_docs_is_zero() {
        assert_eq!(keyword_match("phở", &[]), 0.0);
    }

    #[test]
    fn test_keyword_match_partial() {
        let docs = vec![recipe("Phở Bò", "phở", HashMap::new())];
        let score = keyword_match("phở gà chiên giòn", &docs);
        assert!(score > 0.0 && score < 0.5);
    }

    // ── Context relevance ──────────────────────────────────────────────

    #[test]
    fn test_context_relevance_keyword_category_overlap() {
        let docs = vec![recipe(
            "Gà Chiên",
            "chiên gà với gia vị",
            HashMap::new(),
        )];
        // "chiên" (cooking method) and "gia vị" (ingredients) co-occur.
        let score = context_relevance("cách chiên gà với gia vị gì", &docs);
        assert!(score >= 2.0 * config::CATEGORY_MATCH_INCREMENT - 1e-6);
    }

    #[test]
    fn test_context_relevance_kind_bonus() {
        let docs = vec![recipe("Phở Bò", "x", HashMap::new())];
        let with_phrase = context_relevance("cách làm phở", &docs);
        let without = context_relevance("phở", &docs);
        assert!((with_phrase - without - config::KIND_MATCH_BONUS).abs() < 1e-6);
    }

    #[test]
    fn test_context_relevance_faq_phrase_matches_faq_kind() {
        let docs = vec![faq("Tại sao nước dùng bị đục?", "Do lửa quá to")];
        let score = context_relevance("tại sao nước dùng đục", &docs);
        assert!(score >= config::KIND_MATCH_BONUS);
    }

    // ── Data freshness ─────────────────────────────────────────────────

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_freshness_no_docs_is_neutral() {
        assert_eq!(data_freshness(&[], at(2026, 1, 1)), config::NEUTRAL_SCORE);
    }

    #[test]
    fn test_freshness_decays_over_a_year() {
        let mut attrs = HashMap::new();
        attrs.insert(
            attr::CREATED_AT.to_string(),
            AttrValue::String("2025-07-01T00:00:00Z".to_string()),
        );
        let docs = vec![recipe("Phở", "x", attrs)];

        // 184 days later: 1 − 184/365 ≈ 0.496.
        let score = data_freshness(&docs, at(2026, 1, 1));
        assert!((score - (1.0 - 184.0 / 365.0)).abs() < 0.01);
    }

    #[test]
    fn test_freshness_old_recipe_floors_at_zero() {
        let mut attrs = HashMap::new();
        attrs.insert(
            attr::CREATED_AT.to_string(),
            AttrValue::String("2020-01-01T00:00:00Z".to_string()),
        );
        assert_eq!(data_freshness(&[recipe("Phở", "x", attrs)], at(2026, 1, 1)), 0.0);
    }

    #[test]
    fn test_freshness_defaults() {
        // Unparseable timestamp.
        let mut attrs = HashMap::new();
        attrs.insert(
            attr::CREATED_AT.to_string(),
            AttrValue::String("hôm qua".to_string()),
        );
        assert_eq!(
            data_freshness(&[recipe("Phở", "x", attrs)], at(2026, 1, 1)),
            config::FRESHNESS_PARSE_DEFAULT
        );
        // Missing timestamp.
        assert_eq!(
            data_freshness(&[recipe("Phở", "x", HashMap::new())], at(2026, 1, 1)),
            config::FRESHNESS_PARSE_DEFAULT
        );
        // Static kind.
        assert_eq!(
            data_freshness(&[faq("q?", "a")], at(2026, 1, 1)),
            config::FRESHNESS_STATIC_DEFAULT
        );
    }

    // ── Source reliability ─────────────────────────────────────────────

    #[test]
    fn test_reliability_detailed_recipe() {
        let mut attrs = HashMap::new();
        attrs.insert(
            attr::INGREDIENTS.to_string(),
            AttrValue::List(vec!["thịt bò".into()]),
        );
        attrs.insert(
            attr::INSTRUCTIONS.to_string(),
            AttrValue::List(vec!["b1".into(), "b2".into(), "b3".into()]),
        );
        let score = source_reliability(&[recipe("Phở", "x", attrs)]);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reliability_bare_recipe() {
        let score = source_reliability(&[recipe("Phở", "x", HashMap::new())]);
        assert!((score - config::RELIABILITY_RECIPE_BASE).abs() < 1e-6);
    }

    #[test]
    fn test_reliability_faq_detailed_answer() {
        let long_answer = "Nên hầm xương trong ít nhất sáu giờ để nước dùng ngọt và trong hơn.";
        let score = source_reliability(&[faq("Hầm xương bao lâu?", long_answer)]);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_reliability_other_kinds_neutral() {
        let doc = Arc::new(Document::new(
            DocumentKind::Blog,
            "Mẹo bếp".into(),
            "x".into(),
            HashMap::new(),
        ));
        assert_eq!(source_reliability(&[doc]), config::RELIABILITY_DEFAULT_BASE);
    }

    // ── Query clarity ──────────────────────────────────────────────────

    #[test]
    fn test_clarity_empty_query() {
        assert_eq!(query_clarity(""), config::CLARITY_SHORT_SCORE);
    }

    #[test]
    fn test_clarity_very_short_query() {
        assert_eq!(query_clarity("phở"), config::CLARITY_SHORT_SCORE);
    }

    #[test]
    fn test_clarity_rich_query_saturates() {
        // Optimal length + specificity + question word + question mark.
        let score = query_clarity("cách làm phở bò ngon nhất là gì?");
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_clarity_plain_mid_length_query() {
        // 10–50 chars, no other signals: 0.5 + 0.2.
        let score = query_clarity("mua rau o dau re");
        assert!((score - (config::CLARITY_BASE + config::CLARITY_LENGTH_BONUS)).abs() < 1e-6);
    }

    // ── Answer completeness ────────────────────────────────────────────

    #[test]
    fn test_completeness_tiny_answer() {
        assert_eq!(answer_completeness("q", "Chưa"), config::COMPLETENESS_SHORT_SCORE);
        assert_eq!(answer_completeness("q", ""), config::COMPLETENESS_SHORT_SCORE);
    }

    #[test]
    fn test_completeness_structured_recipe_answer() {
        let answer = "Nguyên liệu: thịt bò, bánh phở.\n1. Hầm xương.\n2. Làm bánh phở mềm rồi chan nước dùng.";
        let score = answer_completeness("cách làm phở bò", answer);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_completeness_plain_answer() {
        // 10–49 chars, unstructured, no domain phrasing: base only.
        // Note "-" counts as a structure marker, so avoid it here.
        let score = answer_completeness("phở ngon không", "Phở rất ngon bạn nhé");
        assert!((score - config::COMPLETENESS_BASE).abs() < 1e-6);
    }

    // ── Range invariant ────────────────────────────────────────────────

    #[test]
    fn test_all_factors_stay_in_unit_range() {
        let docs = vec![
            recipe("Phở Bò", "nấu chiên luộc nướng gia vị ngon", HashMap::new()),
            faq("Tại sao?", "Vì nhiệt độ quá cao trong lúc chiên."),
        ];
        let queries = ["", "phở", "cách làm phở bò ngon với nguyên liệu gì?"];
        let answers = ["", "Ngắn", "Nguyên liệu: 1. thịt 2. bánh phở - rất chi tiết."];
        let now = Utc::now();

        for query in queries {
            for answer in answers {
                for value in [
                    semantic_similarity(&[0.0, 0.5, 1.0]),
                    keyword_match(query, &docs),
                    context_relevance(query, &docs),
                    data_freshness(&docs, now),
                    source_reliability(&docs),
                    query_clarity(query),
                    answer_completeness(query, answer),
                ] {
                    assert!((0.0..=1.0).contains(&value), "factor out of range: {value}");
                }
            }
        }
    }
}
