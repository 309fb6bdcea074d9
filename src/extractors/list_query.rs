//! Extract the list query from the request URI. Never rejects: an unparseable query string
//! is treated as empty.

use crate::query::ListQuery;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};

/// Parsed `_sort`, `_page`, filters and friends, with repeated keys preserved.
#[derive(Clone, Debug, Default)]
pub struct ListParams(pub ListQuery);

#[async_trait]
impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
            Ok(Query(pairs)) => pairs,
            Err(e) => {
                tracing::debug!(error = %e, uri = %parts.uri, "ignoring malformed query string");
                Vec::new()
            }
        };
        Ok(ListParams(ListQuery::from_pairs(&pairs)))
    }
}
