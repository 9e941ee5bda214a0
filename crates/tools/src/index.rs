//! The document corpus behind `doc_search` and `document_list`.
//!
//! [`DocumentIndex`] is the seam between the retrieval tools and
//! whatever actually stores the documents. [`InMemoryIndex`] is the
//! built-in implementation: keyword scoring over an in-process corpus,
//! good enough for small corpora and for tests.

use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// One document in the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Source name cited in answers (file name, title, URL).
    pub name: String,
    pub content: String,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// One search hit: the source name, a snippet around the best match,
/// and a relevance score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub name: String,
    pub snippet: String,
    pub score: f32,
}

/// Name and size of one indexed document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub name: String,
    pub chars: usize,
}

/// Retrieval contract the tools depend on.
pub trait DocumentIndex: Send + Sync {
    /// Top `top_k` hits for a query, best first. Empty when nothing
    /// matches.
    fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit>;

    /// All indexed documents.
    fn list(&self) -> Vec<DocumentInfo>;
}

/// Characters of context shown around the first query match.
const SNIPPET_CHARS: usize = 240;

/// Keyword index over an in-process document list.
pub struct InMemoryIndex {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn with_documents(documents: Vec<Document>) -> Self {
        Self {
            documents: RwLock::new(documents),
        }
    }

    pub fn add(&self, document: Document) {
        self.documents.write().unwrap().push(document);
    }

    pub fn len(&self) -> usize {
        self.documents.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().unwrap().is_empty()
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentIndex for InMemoryIndex {
    fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(String::from)
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let documents = self.documents.read().unwrap();
        let mut hits: Vec<SearchHit> = documents
            .iter()
            .filter_map(|doc| {
                let lower = doc.content.to_lowercase();
                let mut score = 0.0f32;
                let mut first_match = None;
                for term in &terms {
                    let count = lower.matches(term.as_str()).count();
                    if count > 0 {
                        score += count as f32;
                        if first_match.is_none() {
                            first_match = lower.find(term.as_str());
                        }
                    }
                }
                // Title matches weigh more than body matches.
                if terms.iter().any(|t| doc.name.to_lowercase().contains(t)) {
                    score += 2.0;
                }
                if score == 0.0 {
                    return None;
                }
                Some(SearchHit {
                    name: doc.name.clone(),
                    snippet: snippet_around(&doc.content, first_match.unwrap_or(0)),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.name.cmp(&b.name)));
        hits.truncate(top_k);
        hits
    }

    fn list(&self) -> Vec<DocumentInfo> {
        self.documents
            .read()
            .unwrap()
            .iter()
            .map(|doc| DocumentInfo {
                name: doc.name.clone(),
                chars: doc.content.chars().count(),
            })
            .collect()
    }
}

/// A char-safe window of the content centered near `byte_offset`.
fn snippet_around(content: &str, byte_offset: usize) -> String {
    let chars: Vec<char> = content.chars().collect();
    let char_offset = content
        .char_indices()
        .position(|(i, _)| i >= byte_offset)
        .unwrap_or(0);

    let start = char_offset.saturating_sub(SNIPPET_CHARS / 4);
    let end = (start + SNIPPET_CHARS).min(chars.len());
    let mut snippet: String = chars[start..end].iter().collect();
    if start > 0 {
        snippet = format!("...{snippet}");
    }
    if end < chars.len() {
        snippet.push_str("...");
    }
    snippet.replace('\n', " ")
}
