//! Multi-factor confidence scoring.
//!
//! Replaces a single cosine similarity with a weighted combination of seven
//! factors covering retrieval quality, document trust, query quality, and
//! answer quality. The weighted total maps onto a five-step
//! [`ConfidenceLevel`] ladder, and every score ships with a human-readable
//! explanation and improvement recommendations in Vietnamese.

mod factors;

use crate::config;
use crate::document::Document;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// The seven factor values, each in `[0, 1]`.
///
/// Field order is the canonical factor order: it drives weight application,
/// explanation tie-breaking, and display.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceFactors {
    pub semantic_similarity: f32,
    pub keyword_match: f32,
    pub context_relevance: f32,
    pub data_freshness: f32,
    pub source_reliability: f32,
    pub query_clarity: f32,
    pub answer_completeness: f32,
}

impl ConfidenceFactors {
    /// Factors with their names, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f32)> {
        [
            ("semantic_similarity", self.semantic_similarity),
            ("keyword_match", self.keyword_match),
            ("context_relevance", self.context_relevance),
            ("data_freshness", self.data_freshness),
            ("source_reliability", self.source_reliability),
            ("query_clarity", self.query_clarity),
            ("answer_completeness", self.answer_completeness),
        ]
        .into_iter()
    }

    /// Weighted sum using the configured factor weights.
    fn weighted_total(&self) -> f32 {
        self.semantic_similarity * config::WEIGHT_SEMANTIC_SIMILARITY
            + self.keyword_match * config::WEIGHT_KEYWORD_MATCH
            + self.context_relevance * config::WEIGHT_CONTEXT_RELEVANCE
            + self.data_freshness * config::WEIGHT_DATA_FRESHNESS
            + self.source_reliability * config::WEIGHT_SOURCE_RELIABILITY
            + self.query_clarity * config::WEIGHT_QUERY_CLARITY
            + self.answer_completeness * config::WEIGHT_ANSWER_COMPLETENESS
    }
}

/// Five-step confidence ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl ConfidenceLevel {
    pub fn from_score(score: f32) -> Self {
        if score >= config::LEVEL_VERY_HIGH {
            ConfidenceLevel::VeryHigh
        } else if score >= config::LEVEL_HIGH {
            ConfidenceLevel::High
        } else if score >= config::LEVEL_MEDIUM {
            ConfidenceLevel::Medium
        } else if score >= config::LEVEL_LOW {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::VeryHigh => "very_high",
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::VeryLow => "very_low",
        }
    }
}

/// A scored response with explanation and recommendations.
#[derive(Debug, Clone)]
pub struct ConfidenceScore {
    pub overall: f32,
    pub level: ConfidenceLevel,
    pub factors: ConfidenceFactors,
    pub explanation: String,
    pub recommendations: Vec<String>,
}

/// Rounded presentation form of a [`ConfidenceScore`].
#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceDisplay {
    pub score: f32,
    pub level: &'static str,
    pub percentage: f32,
    pub explanation: String,
    pub recommendations: Vec<String>,
    pub factors: Vec<(&'static str, f32)>,
}

impl ConfidenceScore {
    /// Display form: score rounded to 2 decimals, percentage to 1.
    pub fn display(&self) -> ConfidenceDisplay {
        ConfidenceDisplay {
            score: round2(self.overall),
            level: self.level.as_str(),
            percentage: (self.overall * 1000.0).round() / 10.0,
            explanation: self.explanation.clone(),
            recommendations: self.recommendations.clone(),
            factors: self
                .factors
                .iter()
                .map(|(name, value)| (name, round2(value)))
                .collect(),
        }
    }
}

fn round2(x: f32) -> f32 {
    (x * 100.0).round() / 100.0
}

/// Computes [`ConfidenceScore`]s from retrieval context.
///
/// Stateless except for an optional fixed reference time, which freshness
/// scoring uses instead of the wall clock (tests and replay).
pub struct ConfidenceScorer {
    reference_time: Option<DateTime<Utc>>,
}

impl ConfidenceScorer {
    pub fn new() -> Self {
        Self {
            reference_time: None,
        }
    }

    /// Scores freshness against `reference_time` instead of `Utc::now()`.
    pub fn with_reference_time(reference_time: DateTime<Utc>) -> Self {
        Self {
            reference_time: Some(reference_time),
        }
    }

    /// Scores a full interaction: the user query, the retrieved documents
    /// with their similarity scores (best first), and the generated answer.
    pub fn score(
        &self,
        query: &str,
        docs: &[Arc<Document>],
        similarity_scores: &[f32],
        answer: &str,
    ) -> ConfidenceScore {
        let now = self.reference_time.unwrap_or_else(Utc::now);

        let factors = ConfidenceFactors {
            semantic_similarity: factors::semantic_similarity(similarity_scores),
            keyword_match: factors::keyword_match(query, docs),
            context_relevance: factors::context_relevance(query, docs),
            data_freshness: factors::data_freshness(docs, now),
            source_reliability: factors::source_reliability(docs),
            query_clarity: factors::query_clarity(query),
            answer_completeness: factors::answer_completeness(query, answer),
        };

        let overall = factors.weighted_total();
        let level = ConfidenceLevel::from_score(overall);
        let explanation = explain(&factors, overall);
        let recommendations = recommend(&factors, level);

        tracing::debug!(
            "Confidence {:.2} ({}) for query {:?}",
            overall,
            level.as_str(),
            query
        );

        ConfidenceScore {
            overall,
            level,
            factors,
            explanation,
            recommendations,
        }
    }
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Names the overall score plus the strongest and weakest factor. Ties go
/// to the factor earliest in canonical order.
fn explain(factors: &ConfidenceFactors, overall: f32) -> String {
    let mut strongest = ("", f32::MIN);
    let mut weakest = ("", f32::MAX);
    for (name, value) in factors.iter() {
        if value > strongest.1 {
            strongest = (name, value);
        }
        if value < weakest.1 {
            weakest = (name, value);
        }
    }
    format!(
        "Điểm tin cậy tổng thể: {:.2} | Yếu tố mạnh nhất: {} ({:.2}) | Yếu tố yếu nhất: {} ({:.2})",
        overall, strongest.0, strongest.1, weakest.0, weakest.1
    )
}

/// Rule-based improvement suggestions keyed off the level and weak factors.
fn recommend(factors: &ConfidenceFactors, level: ConfidenceLevel) -> Vec<String> {
    let mut recommendations = Vec::new();
    match level {
        ConfidenceLevel::Low | ConfidenceLevel::VeryLow => {
            if factors.semantic_similarity < config::NEUTRAL_SCORE {
                recommendations.push("Thử đặt câu hỏi với từ khóa cụ thể hơn".to_string());
            }
            if factors.keyword_match < config::NEUTRAL_SCORE {
                recommendations.push("Sử dụng thuật ngữ nấu ăn chính xác hơn".to_string());
            }
            if factors.query_clarity < config::NEUTRAL_SCORE {
                recommendations.push("Làm rõ câu hỏi với chi tiết cụ thể".to_string());
            }
        }
        ConfidenceLevel::Medium => {
            recommendations.push(
                "Kết quả khá tốt, có thể cần thêm thông tin để chính xác hơn".to_string(),
            );
        }
        ConfidenceLevel::High | ConfidenceLevel::VeryHigh => {
            recommendations.push("Kết quả có độ tin cậy cao".to_string());
        }
    }
    recommendations
}
