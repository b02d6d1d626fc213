use std::cmp::Ordering;

use serde::Serialize;
use serde_json::{Value, json};

use crate::store::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// The list-endpoint query contract shared by every resource: AND-combined
/// field filters, free-text search, one sort key, offset/limit pagination.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Field filters; a multi-valued entry matches by inclusion.
    pub filters: Vec<(String, Vec<String>)>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub direction: SortDirection,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Parse raw query-string pairs. `q`/`search`, `sort`, `order`,
    /// `offset` and `limit` are reserved keys; every other key is a field
    /// filter. Repeated keys and comma-separated values both widen a
    /// filter to an inclusion list.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, String> {
        let mut query = ListQuery::default();
        for (key, value) in pairs {
            match key.as_str() {
                "q" | "search" => query.search = Some(value.clone()),
                "sort" => query.sort = Some(value.clone()),
                "order" => {
                    query.direction = match value.as_str() {
                        "asc" => SortDirection::Ascending,
                        "desc" => SortDirection::Descending,
                        other => return Err(format!("invalid sort order: {}", other)),
                    }
                }
                "offset" => {
                    query.offset = value
                        .parse()
                        .map_err(|_| format!("invalid offset: {}", value))?
                }
                "limit" => {
                    query.limit = Some(
                        value
                            .parse()
                            .map_err(|_| format!("invalid limit: {}", value))?,
                    )
                }
                _ => {
                    let values: Vec<String> = value
                        .split(',')
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                        .collect();
                    if values.is_empty() {
                        continue;
                    }
                    match query.filters.iter_mut().find(|(k, _)| k == key) {
                        Some((_, existing)) => existing.extend(values),
                        None => query.filters.push((key.clone(), values)),
                    }
                }
            }
        }
        Ok(query)
    }
}

/// One page of a filtered result set.
#[derive(Debug, Clone)]
pub struct Page<R> {
    pub items: Vec<R>,
    pub total: usize,
    pub has_more: bool,
}

impl<R: Serialize> Page<R> {
    /// The standard list-response envelope.
    pub fn into_body(self) -> Value {
        json!({
            "items": self.items,
            "total": self.total,
            "has_more": self.has_more,
        })
    }
}

/// Run the filter -> search -> sort -> paginate pipeline over a store
/// snapshot. `search_fields` names the record fields the free-text search
/// inspects; comparison happens against each record's JSON form so status
/// enums, numbers and booleans all filter by their serialized value.
pub fn apply_list_query<R>(records: Vec<R>, query: &ListQuery, search_fields: &[&str]) -> Page<R>
where
    R: Record + Serialize,
{
    let mut rows: Vec<(R, Value)> = records
        .into_iter()
        .map(|record| {
            let value = serde_json::to_value(&record).unwrap_or(Value::Null);
            (record, value)
        })
        .collect();

    rows.retain(|(_, value)| matches_filters(value, &query.filters));

    if let Some(needle) = &query.search {
        let needle = needle.to_lowercase();
        rows.retain(|(_, value)| matches_search(value, search_fields, &needle));
    }

    if let Some(sort_key) = &query.sort {
        // Vec::sort_by is stable; the ID tie-break keeps equal keys
        // deterministic either way.
        rows.sort_by(|(a, a_value), (b, b_value)| {
            compare_fields(a_value.get(sort_key), b_value.get(sort_key), query.direction)
                .then_with(|| a.id().cmp(b.id()))
        });
    }

    let total = rows.len();
    let items: Vec<R> = rows
        .into_iter()
        .skip(query.offset)
        .take(query.limit.unwrap_or(usize::MAX))
        .map(|(record, _)| record)
        .collect();
    let has_more = query.offset + items.len() < total;

    Page {
        items,
        total,
        has_more,
    }
}

fn matches_filters(record: &Value, filters: &[(String, Vec<String>)]) -> bool {
    filters.iter().all(|(field, allowed)| {
        field_as_string(record, field)
            .map(|value| allowed.contains(&value))
            .unwrap_or(false)
    })
}

fn matches_search(record: &Value, search_fields: &[&str], needle: &str) -> bool {
    search_fields.iter().any(|field| {
        field_as_string(record, field)
            .map(|value| value.to_lowercase().contains(needle))
            .unwrap_or(false)
    })
}

/// Canonical string form of a scalar field; objects, arrays and nulls
/// never participate in filtering or search.
fn field_as_string(record: &Value, field: &str) -> Option<String> {
    match record.get(field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Missing sort fields order last regardless of direction.
fn compare_fields(a: Option<&Value>, b: Option<&Value>, direction: SortDirection) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = compare_values(a, b);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_f64(), b.as_f64()) {
        return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
    }
    let a = a.as_str().map(str::to_string).unwrap_or_else(|| a.to_string());
    let b = b.as_str().map(str::to_string).unwrap_or_else(|| b.to_string());
    a.cmp(&b)
}
