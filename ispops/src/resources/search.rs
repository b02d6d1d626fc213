use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::json;

use simcore::error::HandlerError;
use simcore::response::MockResponse;
use simcore::router::{MockRouter, RequestContext};
use simcore::store::{Record, ResourceStore};

/// Global search works over its own document store, seeded independently
/// of the other modules; the simulator never reads their stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchDocument {
    pub id: String,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub href: String,
}

impl Record for SearchDocument {
    fn id(&self) -> &str {
        &self.id
    }
}

pub static SEARCH_DOCUMENTS: Lazy<ResourceStore<SearchDocument>> = Lazy::new(ResourceStore::new);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchDocumentOverrides {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub href: Option<String>,
}

pub fn search_document(overrides: SearchDocumentOverrides) -> SearchDocument {
    let id = overrides.id.unwrap_or_else(|| SEARCH_DOCUMENTS.next_id("DOC"));
    SearchDocument {
        kind: overrides.kind.unwrap_or_else(|| "subscriber".to_string()),
        title: overrides.title.unwrap_or_else(|| "Untitled".to_string()),
        body: overrides.body.unwrap_or_default(),
        href: overrides.href.unwrap_or_else(|| format!("/records/{}", id)),
        id,
    }
}

pub fn seed_search_documents(records: Vec<SearchDocument>) {
    SEARCH_DOCUMENTS.seed(records);
}

pub fn clear_search() {
    SEARCH_DOCUMENTS.clear();
}

pub fn register(router: &mut MockRouter) {
    router.get("/search", search);
}

/// Ranked lookup: title matches sort before body-only matches, ties break
/// on ID. An empty or missing `q` returns every document.
fn search(ctx: &RequestContext) -> Result<MockResponse, HandlerError> {
    let needle = ctx.query_value("q").unwrap_or("").to_lowercase();
    let kind = ctx.query_value("kind").map(str::to_string);

    let mut hits: Vec<(u8, SearchDocument)> = SEARCH_DOCUMENTS
        .snapshot()
        .into_iter()
        .filter(|doc| kind.as_deref().is_none_or(|k| doc.kind == k))
        .filter_map(|doc| {
            if needle.is_empty() {
                return Some((1, doc));
            }
            if doc.title.to_lowercase().contains(&needle) {
                Some((0, doc))
            } else if doc.body.to_lowercase().contains(&needle) {
                Some((1, doc))
            } else {
                None
            }
        })
        .collect();
    hits.sort_by(|(rank_a, a), (rank_b, b)| rank_a.cmp(rank_b).then_with(|| a.id.cmp(&b.id)));

    let results: Vec<SearchDocument> = hits.into_iter().map(|(_, doc)| doc).collect();
    Ok(MockResponse::ok(json!({
        "total": results.len(),
        "results": results,
    })))
}
