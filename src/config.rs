//! Global configuration constants for cookbase.
//!
//! Every tuning parameter lives here as a named constant: index build
//! parameters, the retrieval merge limit, and all confidence-scoring weights,
//! thresholds, and length bands. Keeping these out of the scoring logic lets
//! them be tuned and tested independently of the aggregation code.

/// Default embedding dimension (multilingual MiniLM-L12-v2 output size).
pub const DEFAULT_DIMENSION: usize = 384;

// ── Vector index ───────────────────────────────────────────────────────

/// Number of IVF clusters.
pub const IVF_NLIST: usize = 100;

/// Minimum batch size required to train an IVF index.
///
/// Batches below this fall back to exact (Flat) scan behavior for the
/// lifetime of the index. The fallback is recorded in `IndexStats::fell_back`.
pub const IVF_MIN_TRAIN_SAMPLES: usize = 100;

/// Number of nearest centroid lists probed per IVF query.
pub const IVF_NPROBE: usize = 8;

/// Lloyd iterations for IVF k-means training.
pub const IVF_KMEANS_ITERS: usize = 10;

/// Number of bidirectional links per HNSW node (layers above 0).
pub const HNSW_M: usize = 16;

/// Maximum links per HNSW node at layer 0 (2 × M).
pub const HNSW_M_MAX0: usize = 32;

/// Candidate list size during HNSW index construction.
pub const HNSW_EF_CONSTRUCTION: usize = 200;

/// Candidate list size during HNSW search.
pub const HNSW_EF_SEARCH: usize = 50;

/// Maximum number of layers in the HNSW graph.
pub const HNSW_MAX_LAYERS: usize = 16;

// ── Retrieval engine ───────────────────────────────────────────────────

/// Minimum cosine similarity for a semantic strategy hit.
pub const SEMANTIC_SIMILARITY_THRESHOLD: f32 = 0.7;

/// Maximum number of results returned by the merged strategy union.
pub const MERGE_MAX_RESULTS: usize = 10;

/// Nominal score assigned to an exact title match.
pub const EXACT_MATCH_SCORE: f32 = 1.0;

/// Nominal score assigned to attribute and category matches.
///
/// These strategies produce no similarity of their own; ranking is by
/// strategy priority, so this value only feeds the confidence scorer.
pub const NON_SEMANTIC_MATCH_SCORE: f32 = 0.6;

// ── Confidence factor weights (must sum to 1.0) ────────────────────────

pub const WEIGHT_SEMANTIC_SIMILARITY: f32 = 0.25;
pub const WEIGHT_KEYWORD_MATCH: f32 = 0.20;
pub const WEIGHT_CONTEXT_RELEVANCE: f32 = 0.15;
pub const WEIGHT_DATA_FRESHNESS: f32 = 0.10;
pub const WEIGHT_SOURCE_RELIABILITY: f32 = 0.10;
pub const WEIGHT_QUERY_CLARITY: f32 = 0.10;
pub const WEIGHT_ANSWER_COMPLETENESS: f32 = 0.10;

// ── Semantic similarity factor ─────────────────────────────────────────

/// Exponential decay rate per rank when averaging similarity scores.
pub const SIMILARITY_DECAY_RATE: f32 = 0.5;

/// Center of the logistic transform applied to the weighted average.
pub const SIGMOID_MIDPOINT: f32 = 0.5;

/// Steepness of the logistic transform.
pub const SIGMOID_STEEPNESS: f32 = 4.0;

// ── Context relevance factor ───────────────────────────────────────────

/// Score increment per keyword category present in both query and document.
pub const CATEGORY_MATCH_INCREMENT: f32 = 0.2;

/// Bonus when the query's interrogative form matches the document kind.
pub const KIND_MATCH_BONUS: f32 = 0.3;

// ── Data freshness factor ──────────────────────────────────────────────

/// Linear decay horizon for timestamped documents, in days.
pub const FRESHNESS_HORIZON_DAYS: f32 = 365.0;

/// Default freshness for malformed or missing timestamps.
pub const FRESHNESS_PARSE_DEFAULT: f32 = 0.7;

/// Default freshness for static (non-timestamped) document kinds.
pub const FRESHNESS_STATIC_DEFAULT: f32 = 0.8;

/// Neutral factor value when retrieval found no documents at all.
pub const NEUTRAL_SCORE: f32 = 0.5;

// ── Source reliability factor ──────────────────────────────────────────

/// Base reliability for recipe documents.
pub const RELIABILITY_RECIPE_BASE: f32 = 0.8;

/// Base reliability for FAQ documents (curated content).
pub const RELIABILITY_FAQ_BASE: f32 = 0.9;

/// Base reliability for all other document kinds.
pub const RELIABILITY_DEFAULT_BASE: f32 = 0.5;

/// Additive bonus per completeness signal (capped at 1.0 overall).
pub const RELIABILITY_BONUS: f32 = 0.1;

/// Instruction-step count at which a recipe counts as detailed.
pub const DETAILED_INSTRUCTION_STEPS: usize = 3;

/// FAQ answer length (chars) above which it counts as detailed.
pub const DETAILED_ANSWER_CHARS: usize = 50;

// ── Query clarity factor ───────────────────────────────────────────────

/// Queries shorter than this (chars) short-circuit to `CLARITY_SHORT_SCORE`.
pub const CLARITY_MIN_QUERY_CHARS: usize = 5;

/// Fixed score for very short queries.
pub const CLARITY_SHORT_SCORE: f32 = 0.2;

pub const CLARITY_BASE: f32 = 0.5;

/// Optimal query length band (chars), inclusive.
pub const CLARITY_OPTIMAL_MIN: usize = 10;
pub const CLARITY_OPTIMAL_MAX: usize = 50;

/// Bonus for a query inside the optimal length band.
pub const CLARITY_LENGTH_BONUS: f32 = 0.2;

/// Smaller bonus for a query longer than the optimal band.
pub const CLARITY_LONG_BONUS: f32 = 0.1;

/// Bonus when the query contains a high-signal domain phrase.
pub const CLARITY_SPECIFICITY_BONUS: f32 = 0.2;

/// Bonus when the query contains an interrogative marker.
pub const CLARITY_QUESTION_WORD_BONUS: f32 = 0.1;

/// Bonus when the query is terminated as a question.
pub const CLARITY_QUESTION_MARK_BONUS: f32 = 0.1;

// ── Answer completeness factor ─────────────────────────────────────────

/// Answers shorter than this (chars) short-circuit to `COMPLETENESS_SHORT_SCORE`.
pub const COMPLETENESS_MIN_ANSWER_CHARS: usize = 10;

/// Fixed score for empty or extremely short answers.
pub const COMPLETENESS_SHORT_SCORE: f32 = 0.1;

pub const COMPLETENESS_BASE: f32 = 0.5;

/// Target answer length band (chars), inclusive.
pub const COMPLETENESS_OPTIMAL_MIN: usize = 50;
pub const COMPLETENESS_OPTIMAL_MAX: usize = 500;

/// Bonus for an answer inside the target length band.
pub const COMPLETENESS_LENGTH_BONUS: f32 = 0.2;

/// Smaller bonus for an answer longer than the target band.
pub const COMPLETENESS_LONG_BONUS: f32 = 0.1;

/// Bonus for structured answers (enumerations or bullet markers).
pub const COMPLETENESS_STRUCTURE_BONUS: f32 = 0.1;

/// Bonus per domain-completeness signal in a recipe-style answer.
pub const COMPLETENESS_DOMAIN_BONUS: f32 = 0.1;

// ── Confidence level ladder ────────────────────────────────────────────

pub const LEVEL_VERY_HIGH: f32 = 0.9;
pub const LEVEL_HIGH: f32 = 0.7;
pub const LEVEL_MEDIUM: f32 = 0.5;
pub const LEVEL_LOW: f32 = 0.3;

// ── Ingestion / prompt assembly ────────────────────────────────────────

/// Maximum blog content length (chars) included in searchable text.
pub const BLOG_CONTENT_SNIPPET_CHARS: usize = 1000;

/// Maximum retrieved documents included in a generation prompt.
pub const PROMPT_CONTEXT_DOCS: usize = 8;

/// Maximum source documents echoed back in an ask response.
pub const RESPONSE_SOURCE_DOCS: usize = 5;

/// Maximum blog content length (chars) quoted inside a generation prompt.
pub const PROMPT_BLOG_SNIPPET_CHARS: usize = 500;
