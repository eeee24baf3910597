//! End-to-end scenarios exercising retrieval and confidence together.

use cookbase::confidence::ConfidenceScorer;
use cookbase::document::Document;
use cookbase::index::{IndexStrategy, VectorIndex};
use cookbase::retrieval::{MatchType, RetrievalEngine, SemanticQuery, SemanticSource};
use cookbase::{ingest, DocumentKind};
use serde_json::json;
use std::sync::Arc;

fn pho_bo_recipe() -> Document {
    ingest::recipe_from_json(&json!({
        "name": "Phở Bò",
        "description": "Phở bò truyền thống Hà Nội",
        "category": "monchinh",
        "ingredients": ["thịt bò", "bánh phở", "hành", "gừng"],
        "instructions": ["Hầm xương bò", "Nướng hành gừng", "Chan nước dùng"],
        "cookingTime": "6 giờ",
        "difficulty": "khó"
    }))
}

fn unrelated_faq() -> Document {
    ingest::faq_from_json(&json!({
        "question": "Bảo quản rau trong tủ lạnh thế nào?",
        "answer": "Bọc rau trong khăn giấy ẩm rồi cho vào ngăn mát."
    }))
}

#[test]
fn recipe_query_ranks_recipe_above_unrelated_faq() {
    let engine = RetrievalEngine::new();
    engine
        .store()
        .replace(vec![Arc::new(unrelated_faq()), Arc::new(pho_bo_recipe())]);

    let results = engine.search("phở bò", None);

    // Only the recipe matches; the FAQ has no overlapping title, attribute,
    // or category signal for this query.
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.title, "Phở Bò");
    assert_eq!(results[0].document.kind, DocumentKind::Recipe);
    assert_eq!(results[0].match_type, MatchType::Exact);
}

#[test]
fn recipe_query_scores_nonzero_exact_and_context_factors() {
    let engine = RetrievalEngine::new();
    engine
        .store()
        .replace(vec![Arc::new(pho_bo_recipe()), Arc::new(unrelated_faq())]);

    // The full question contains the dish name, so the title strategy fires
    // and the recipe comes back ahead of the unrelated FAQ.
    let results = engine.search("cách làm phở bò", None);
    assert!(!results.is_empty());
    assert_eq!(results[0].document.title, "Phở Bò");
    assert_eq!(results[0].match_type, MatchType::Exact);
    assert!(results.iter().all(|m| m.document.kind != DocumentKind::Faq));

    let docs: Vec<_> = results.iter().map(|m| m.document.clone()).collect();
    let scores: Vec<f32> = results.iter().map(|m| m.score).collect();
    let confidence = ConfidenceScorer::new().score(
        "cách làm phở bò",
        &docs,
        &scores,
        "Nguyên liệu: thịt bò, bánh phở. Hầm xương rồi chan nước dùng.",
    );

    assert!(confidence.factors.context_relevance > 0.0);
    assert!(confidence.factors.keyword_match > 0.0);
    assert!((0.0..=1.0).contains(&confidence.overall));
}

#[test]
fn repeated_search_is_deterministic() {
    let engine = RetrievalEngine::new();
    engine
        .store()
        .replace(vec![Arc::new(pho_bo_recipe()), Arc::new(unrelated_faq())]);

    let first = engine.search("phở bò", None);
    let second = engine.search("phở bò", None);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.document.id, b.document.id);
        assert_eq!(a.match_type, b.match_type);
    }
}

#[test]
fn semantic_and_exact_agree_on_match_type_priority() {
    let engine = RetrievalEngine::new();
    let recipe = Arc::new(pho_bo_recipe());
    engine.store().replace(vec![recipe.clone()]);

    // Index the same document so the semantic strategy also finds it.
    let mut index = VectorIndex::new(IndexStrategy::Flat, 4);
    index
        .add(&[vec![1.0, 0.0, 0.0, 0.0]], vec![pho_bo_recipe()])
        .unwrap();

    let results = engine.search(
        "phở bò",
        Some(SemanticQuery {
            embedding: &[1.0, 0.0, 0.0, 0.0],
            source: SemanticSource::Index(&index),
        }),
    );

    // The store copy wins via Exact; the index copy (different id) follows.
    assert_eq!(results[0].match_type, MatchType::Exact);
    assert!(results.iter().any(|m| m.match_type == MatchType::Semantic));
}
