//! End-to-end ask pipeline.
//!
//! Wires the vector index, the multi-strategy retrieval engine, and the
//! confidence scorer together behind two caller-supplied boundaries:
//! an [`EmbeddingProvider`] that turns text into vectors and an
//! [`AnswerGenerator`] that turns an assembled prompt into an answer.
//!
//! The pipeline degrades instead of failing: an embedding error disables
//! the semantic strategy for that query, and a generation error substitutes
//! the configured fallback answer and flags it in the response. Confidence
//! is always scored over whatever was actually retrieved and answered.

use crate::config;
use crate::confidence::{ConfidenceScore, ConfidenceScorer};
use crate::document::{attr, Document, DocumentKind};
use crate::error::Result;
use crate::index::{IndexStats, IndexStrategy, VectorIndex};
use crate::retrieval::{RankedMatch, RetrievalEngine, SemanticQuery, SemanticSource};

/// Answer shown when the generator is unavailable.
const DEFAULT_FALLBACK_ANSWER: &str =
    "Xin lỗi, tôi không thể trả lời câu hỏi này lúc này. Vui lòng thử lại.";

/// Turns text into an embedding vector. Implementations wrap whatever model
/// or service produces the vectors; the pipeline only sees the result.
pub trait EmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Turns an assembled prompt into a natural-language answer.
pub trait AnswerGenerator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// A fully processed question.
#[derive(Debug)]
pub struct AskResponse {
    pub answer: String,
    /// True when the generator failed and the fallback answer was used.
    pub used_fallback: bool,
    pub confidence: ConfidenceScore,
    /// Top retrieved sources, capped at [`config::RESPONSE_SOURCE_DOCS`].
    pub sources: Vec<RankedMatch>,
}

/// The assembled knowledge-base pipeline.
pub struct Pipeline<E, G> {
    index: VectorIndex,
    engine: RetrievalEngine,
    scorer: ConfidenceScorer,
    embedder: E,
    generator: G,
    fallback_answer: String,
}

impl<E: EmbeddingProvider, G: AnswerGenerator> Pipeline<E, G> {
    pub fn new(strategy: IndexStrategy, dimension: usize, embedder: E, generator: G) -> Self {
        Self {
            index: VectorIndex::new(strategy, dimension),
            engine: RetrievalEngine::new(),
            scorer: ConfidenceScorer::new(),
            embedder,
            generator,
            fallback_answer: DEFAULT_FALLBACK_ANSWER.to_string(),
        }
    }

    /// Replaces the default fallback answer.
    pub fn with_fallback_answer(mut self, fallback_answer: impl Into<String>) -> Self {
        self.fallback_answer = fallback_answer.into();
        self
    }

    /// Overrides the scorer, e.g. one pinned to a reference time.
    pub fn with_scorer(mut self, scorer: ConfidenceScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    /// Rebuilds the index and the retrieval snapshot from a fresh document
    /// set, embedding each document's searchable text. The old index and
    /// snapshot stay live until the replacement is complete.
    pub fn rebuild(&mut self, documents: Vec<Document>) -> Result<IndexStats> {
        let embeddings = documents
            .iter()
            .map(|doc| self.embedder.embed(&doc.searchable_text))
            .collect::<Result<Vec<_>>>()?;

        let stats = self.index.stats();
        let mut index = VectorIndex::new(stats.strategy, stats.dimension);
        index.add(&embeddings, documents)?;
        self.engine.store().replace(index.documents().to_vec());
        self.index = index;

        let stats = self.index.stats();
        tracing::info!(
            "Rebuilt pipeline index: {} documents, strategy {}",
            stats.count,
            stats.strategy.as_str()
        );
        Ok(stats)
    }

    /// Answers a question: retrieve, generate, score.
    pub fn ask(&self, query: &str) -> AskResponse {
        let embedding = match self.embedder.embed(query) {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                tracing::warn!("Query embedding failed, semantic strategy disabled: {e}");
                None
            }
        };
        let semantic = embedding.as_ref().map(|embedding| SemanticQuery {
            embedding,
            source: SemanticSource::Index(&self.index),
        });

        let matches = self.engine.search(query, semantic);
        let prompt = build_prompt(query, &matches);

        let (answer, used_fallback) = match self.generator.generate(&prompt) {
            Ok(answer) => (answer, false),
            Err(e) => {
                tracing::warn!("Answer generation failed, using fallback: {e}");
                (self.fallback_answer.clone(), true)
            }
        };

        let docs: Vec<_> = matches.iter().map(|m| m.document.clone()).collect();
        let scores: Vec<f32> = matches.iter().map(|m| m.score).collect();
        let confidence = self.scorer.score(query, &docs, &scores, &answer);

        let mut sources = matches;
        sources.truncate(config::RESPONSE_SOURCE_DOCS);

        AskResponse {
            answer,
            used_fallback,
            confidence,
            sources,
        }
    }
}

/// Assembles the generation prompt: one formatted context section per
/// retrieved document (top [`config::PROMPT_CONTEXT_DOCS`]), then the
/// question and answering instructions.
fn build_prompt(query: &str, matches: &[RankedMatch]) -> String {
    let sections: Vec<String> = matches
        .iter()
        .take(config::PROMPT_CONTEXT_DOCS)
        .map(|m| context_section(&m.document))
        .collect();
    let source_count = sections.len();
    let context = sections.join("\n\n---\n\n");

    format!(
        "Bạn là một chuyên gia nấu ăn AI thông minh, chuyên về ẩm thực Việt Nam.\n\
         Bạn có quyền truy cập vào nhiều nguồn thông tin: công thức nấu ăn, bài viết blog, \
         đánh giá người dùng, và FAQ.\n\n\
         THÔNG TIN THAM KHẢO (từ {source_count} nguồn):\n{context}\n\n\
         CÂU HỎI: {query}\n\n\
         HƯỚNG DẪN TRẢ LỜI:\n\
         1. Trả lời bằng tiếng Việt, thân thiện và dễ hiểu\n\
         2. Kết hợp thông tin từ TẤT CẢ các nguồn để đưa ra câu trả lời toàn diện\n\
         3. Nếu có đánh giá, hãy đề cập đến kinh nghiệm thực tế của người dùng\n\
         4. Nếu là công thức nấu ăn, hãy trình bày rõ ràng từng bước\n\
         5. Nếu không có thông tin phù hợp, hãy thành thật nói không biết\n\n\
         TRẢ LỜI:"
    )
}

/// Kind-specific context block for one document.
fn context_section(doc: &Document) -> String {
    match doc.kind {
        DocumentKind::Recipe => {
            let mut lines = vec![format!("📖 CÔNG THỨC: {}", doc.title)];
            if let Some(description) = doc.str_attr(attr::DESCRIPTION) {
                lines.push(format!("Mô tả: {description}"));
            }
            if let Some(ingredients) = doc.list_attr(attr::INGREDIENTS) {
                lines.push(format!("Nguyên liệu: {}", ingredients.join(", ")));
            }
            if let Some(instructions) = doc.list_attr(attr::INSTRUCTIONS) {
                lines.push(format!("Cách làm: {}", instructions.join(". ")));
            }
            if let Some(cooking_time) = doc.str_attr(attr::COOKING_TIME) {
                lines.push(format!("Thời gian: {cooking_time}"));
            }
            if let Some(difficulty) = doc.str_attr(attr::DIFFICULTY) {
                lines.push(format!("Độ khó: {difficulty}"));
            }
            lines.join("\n")
        }
        DocumentKind::Blog => {
            let mut lines = vec![format!("📝 BÀI VIẾT: {}", doc.title)];
            if let Some(content) = doc.str_attr(attr::CONTENT) {
                let snippet: String = content
                    .chars()
                    .take(config::PROMPT_BLOG_SNIPPET_CHARS)
                    .collect();
                lines.push(format!("Nội dung: {snippet}"));
            }
            lines.join("\n")
        }
        DocumentKind::Feedback => {
            let rating = match doc.attributes.get(attr::RATING) {
                Some(crate::document::AttrValue::Integer(r)) => r.to_string(),
                _ => "N/A".to_string(),
            };
            let comment = doc
                .str_attr(attr::COMMENT)
                .unwrap_or("Không có nhận xét");
            format!("⭐ ĐÁNH GIÁ: {rating}/5 sao\nNhận xét: {comment}")
        }
        DocumentKind::Faq => format!(
            "❓ Q: {}\n💡 A: {}",
            doc.str_attr(attr::QUESTION).unwrap_or(&doc.title),
            doc.str_attr(attr::ANSWER).unwrap_or_default()
        ),
    }
}
