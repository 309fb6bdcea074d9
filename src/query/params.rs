//! Parse list query parameters into a `ListQuery`.
//!
//! Nothing here fails: unknown or malformed parameters are dropped or normalized
//! when the pipeline runs.

use regex::Regex;
use std::sync::OnceLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
    Ne,
    Like,
}

/// One filter key with all of its values; the values are OR-ed together.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldFilter {
    /// Field name as given, possibly dotted ("author.name").
    pub field: String,
    pub op: FilterOp,
    pub values: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than "desc" sorts ascending.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

/// Parsed list query. Window parameters are kept raw; see `pipeline::window`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<FieldFilter>,
    pub q: Option<String>,
    pub sort: Vec<(String, SortOrder)>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub embed: Vec<String>,
    pub expand: Vec<String>,
}

fn operator_key() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)_(gte|lte|ne|like)$").expect("valid operator regex"))
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

impl ListQuery {
    /// Build from decoded (key, value) pairs, preserving repeated keys.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut query = ListQuery::default();
        let mut sort_fields: Vec<String> = Vec::new();
        let mut orders: Vec<SortOrder> = Vec::new();

        for (key, value) in pairs {
            match key.as_str() {
                "q" => query.q = Some(value.clone()),
                "_sort" => sort_fields.extend(split_list(value)),
                "_order" => orders.extend(value.split(',').map(SortOrder::parse)),
                "_page" => query.page = Some(value.clone()),
                "_limit" => query.limit = Some(value.clone()),
                "_start" => query.start = Some(value.clone()),
                "_end" => query.end = Some(value.clone()),
                "_embed" => query.embed.extend(split_list(value)),
                "_expand" => query.expand.extend(split_list(value)),
                // JSONP callback and cache-buster
                "callback" | "_" => {}
                k if k.is_empty() => {}
                k => {
                    let (field, op) = match operator_key().captures(k) {
                        Some(caps) => {
                            let op = match &caps[2] {
                                "gte" => FilterOp::Gte,
                                "lte" => FilterOp::Lte,
                                "ne" => FilterOp::Ne,
                                _ => FilterOp::Like,
                            };
                            (caps[1].to_string(), op)
                        }
                        None if k.starts_with('_') => {
                            tracing::debug!(param = %k, "ignoring unrecognized reserved parameter");
                            continue;
                        }
                        None => (k.to_string(), FilterOp::Eq),
                    };
                    match query.filters.iter_mut().find(|f| f.field == field && f.op == op) {
                        Some(existing) => existing.values.push(value.clone()),
                        None => query.filters.push(FieldFilter {
                            field,
                            op,
                            values: vec![value.clone()],
                        }),
                    }
                }
            }
        }

        query.sort = sort_fields
            .into_iter()
            .enumerate()
            .map(|(i, f)| (f, orders.get(i).copied().unwrap_or(SortOrder::Asc)))
            .collect();
        query
    }

    /// Add an implicit equality filter (nested routes).
    pub fn with_filter(mut self, field: &str, value: &str) -> Self {
        self.filters.insert(
            0,
            FieldFilter {
                field: field.to_string(),
                op: FilterOp::Eq,
                values: vec![value.to_string()],
            },
        );
        self
    }
}

/// Leading-integer parse: optional sign then digits, trailing garbage ignored.
/// "12" -> 12, " -3x" -> -3, "abc" -> None.
pub fn parse_int(s: &str) -> Option<i64> {
    let t = s.trim_start();
    let (sign, digits) = match t.as_bytes().first() {
        Some(b'-') => (-1, &t[1..]),
        Some(b'+') => (1, &t[1..]),
        _ => (1, t),
    };
    let end = digits.find(|c: char| !c.is_ascii_digit()).unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
