//! Read pipeline over one collection: filter -> full-text search -> sort -> window.
//! Embedding runs afterwards on the windowed records (see `embed`).

use crate::query::params::{parse_int, FieldFilter, FilterOp, ListQuery, SortOrder};
use crate::store::Record;
use serde_json::Value;
use std::cmp::Ordering;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Look up a field by exact name, then as a dotted path through nested objects/arrays.
pub fn field_value<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
    if let Some(v) = record.get(path) {
        return Some(v);
    }
    if !path.contains('.') {
        return None;
    }
    let mut parts = path.split('.');
    let mut current = record.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(m) => m.get(part)?,
            Value::Array(a) => a.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// String form used for equality, `_ne` and `_like`. Null has none.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Numeric comparison when both sides parse as numbers, string comparison otherwise.
fn compare_operand(element: &Value, operand: &str) -> Option<Ordering> {
    let elem = scalar_string(element)?;
    match (elem.trim().parse::<f64>(), operand.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b),
        _ => Some(elem.as_str().cmp(operand)),
    }
}

fn matches_value(element: &Value, op: FilterOp, operand: &str) -> bool {
    match op {
        FilterOp::Eq => scalar_string(element).as_deref() == Some(operand),
        FilterOp::Ne => scalar_string(element).map(|s| s != operand).unwrap_or(false),
        FilterOp::Like => scalar_string(element).map(|s| s.contains(operand)).unwrap_or(false),
        FilterOp::Gte => matches!(compare_operand(element, operand), Some(Ordering::Greater | Ordering::Equal)),
        FilterOp::Lte => matches!(compare_operand(element, operand), Some(Ordering::Less | Ordering::Equal)),
    }
}

fn matches_filter(record: &Record, filter: &FieldFilter) -> bool {
    match field_value(record, &filter.field) {
        // `_ne` values must all differ; every other operator matches any of its values.
        Some(element) if filter.op == FilterOp::Ne => {
            filter.values.iter().all(|v| matches_value(element, filter.op, v))
        }
        Some(element) => filter.values.iter().any(|v| matches_value(element, filter.op, v)),
        None => false,
    }
}

/// Apply field filters. Plain equality on a field that no record in `all` has is ignored;
/// operator filters are always applied, so an unknown field excludes everything.
pub fn filter<'a>(items: Vec<&'a Record>, all: &[Record], filters: &[FieldFilter]) -> Vec<&'a Record> {
    let active: Vec<&FieldFilter> = filters
        .iter()
        .filter(|f| {
            let known = f.op != FilterOp::Eq || all.iter().any(|r| field_value(r, &f.field).is_some());
            if !known {
                tracing::debug!(field = %f.field, "ignoring filter on unknown field");
            }
            known
        })
        .collect();
    if active.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|r| active.iter().all(|f| matches_filter(r, f)))
        .collect()
}

fn value_contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::Null => false,
        Value::Object(m) => m.values().any(|v| value_contains(v, needle)),
        Value::Array(a) => a.iter().any(|v| value_contains(v, needle)),
        other => scalar_string(other)
            .map(|s| s.to_lowercase().contains(needle))
            .unwrap_or(false),
    }
}

/// Full-text search over every (nested) value of a record, case-insensitive.
pub fn search<'a>(items: Vec<&'a Record>, q: Option<&str>) -> Vec<&'a Record> {
    let needle = match q {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return items,
    };
    items
        .into_iter()
        .filter(|r| r.values().any(|v| value_contains(v, &needle)))
        .collect()
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a)
            .cmp(&type_rank(b))
            .then_with(|| a.to_string().cmp(&b.to_string())),
    }
}

/// Stable multi-field sort. Fields absent from every record in `all` are dropped;
/// records missing a sort field go last regardless of order.
pub fn sort<'a>(mut items: Vec<&'a Record>, all: &[Record], keys: &[(String, SortOrder)]) -> Vec<&'a Record> {
    let keys: Vec<&(String, SortOrder)> = keys
        .iter()
        .filter(|(field, _)| all.iter().any(|r| field_value(r, field).is_some()))
        .collect();
    if keys.is_empty() {
        return items;
    }
    items.sort_by(|a, b| {
        for (field, order) in &keys {
            let ord = match (field_value(a, field), field_value(b, field)) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(x), Some(y)) => match order {
                    SortOrder::Asc => compare_values(x, y),
                    SortOrder::Desc => compare_values(x, y).reverse(),
                },
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    items
}

/// Result window requested by `_page`/`_limit` or `_start`/`_end`/`_limit`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Window {
    All,
    Page { page: i64, limit: i64 },
    Slice { start: i64, end: i64 },
}

/// Pick the window. Pagination wins over `_end`, which wins over `_limit`-only slicing.
pub fn window(query: &ListQuery) -> Window {
    if let Some(page) = &query.page {
        let page = parse_int(page).filter(|&n| n >= 1).unwrap_or(1);
        let limit = query
            .limit
            .as_deref()
            .and_then(parse_int)
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        return Window::Page { page, limit };
    }
    let start = query.start.as_deref().and_then(parse_int).unwrap_or(0);
    if let Some(end) = &query.end {
        return Window::Slice {
            start,
            end: parse_int(end).unwrap_or(0),
        };
    }
    if let Some(limit) = &query.limit {
        // An unparseable limit ends the slice at 0.
        let end = parse_int(limit).map(|l| start.saturating_add(l)).unwrap_or(0);
        return Window::Slice { start, end };
    }
    Window::All
}

/// Bounds for a slice of `len` items: negative start/end count from the end,
/// end is clamped to `len`, and start >= end is empty.
pub fn slice_bounds(len: usize, start: i64, end: i64) -> (usize, usize) {
    let len_i = len as i64;
    let start = if start < 0 { (len_i + start).max(0) } else { start };
    let mut end = end.min(len_i);
    if end < 0 {
        end += len_i;
    }
    if start >= end {
        (0, 0)
    } else {
        (start as usize, end as usize)
    }
}

/// Page numbers for the `Link` header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub current: i64,
    pub first: Option<i64>,
    pub prev: Option<i64>,
    pub next: Option<i64>,
    pub last: Option<i64>,
}

impl PageLinks {
    /// Render as a `Link` header value, rewriting `_page` in the request query.
    pub fn to_header(&self, path: &str, raw_query: &str) -> Option<String> {
        let rels = [("first", self.first), ("prev", self.prev), ("next", self.next), ("last", self.last)];
        let links: Vec<String> = rels
            .iter()
            .filter_map(|(rel, page)| page.map(|p| format!("<{}?{}>; rel=\"{}\"", path, with_page(raw_query, p), rel)))
            .collect();
        if links.is_empty() {
            None
        } else {
            Some(links.join(", "))
        }
    }
}

fn with_page(raw_query: &str, page: i64) -> String {
    let mut replaced = false;
    let mut parts: Vec<String> = raw_query
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p == "_page" || p.starts_with("_page=") {
                replaced = true;
                format!("_page={}", page)
            } else {
                p.to_string()
            }
        })
        .collect();
    if !replaced {
        parts.push(format!("_page={}", page));
    }
    parts.join("&")
}

/// Records selected by the pipeline, borrowed from the collection.
#[derive(Debug, Default)]
pub struct Selection<'a> {
    pub items: Vec<&'a Record>,
    /// Size of the filtered set; set whenever a window was applied.
    pub total: Option<usize>,
    pub links: Option<PageLinks>,
}

fn paginate<'a>(items: Vec<&'a Record>, page: i64, limit: i64) -> Selection<'a> {
    let total = items.len();
    let start = (page - 1).saturating_mul(limit);
    let end = page.saturating_mul(limit);
    let (from, to) = slice_bounds(total, start, end);
    let window: Vec<&Record> = items[from..to].to_vec();
    let mut links = None;
    if !window.is_empty() {
        let mut l = PageLinks {
            current: page,
            ..Default::default()
        };
        if page > 1 {
            l.prev = Some(page - 1);
        }
        if (end as usize) < total {
            l.next = Some(page + 1);
        }
        if window.len() != total {
            l.first = Some(1);
            l.last = Some((total as i64 + limit - 1) / limit);
        }
        links = Some(l);
    }
    Selection {
        items: window,
        total: Some(total),
        links,
    }
}

/// Run filter, search, sort and window over `records`.
pub fn run<'a>(records: &'a [Record], query: &ListQuery) -> Selection<'a> {
    let items: Vec<&Record> = records.iter().collect();
    let items = filter(items, records, &query.filters);
    let items = search(items, query.q.as_deref());
    let items = sort(items, records, &query.sort);
    match window(query) {
        Window::All => Selection {
            items,
            total: None,
            links: None,
        },
        Window::Page { page, limit } => paginate(items, page, limit),
        Window::Slice { start, end } => {
            let total = items.len();
            let (from, to) = slice_bounds(total, start, end);
            Selection {
                items: items[from..to].to_vec(),
                total: Some(total),
                links: None,
            }
        }
    }
}
