//! Paginated Fetcher
//!
//! Walks offset/limit pages of list endpoints and merges the items into a
//! single typed response.

use super::client::GatewayClient;
use super::transport::CallContext;
use crate::endpoint::{Endpoint, Pagination, Request};
use crate::error::{AdapterError, Result};
use crate::materialize::{materialize, normalize_keys, value_kind, TypedResponse};
use serde_json::{Map, Value};

/// Upper bound on pages fetched in one walk
pub const MAX_PAGES: usize = 1000;

/// One fetched page, keys already normalized
#[derive(Debug, Clone)]
pub struct PageResult {
    /// Page body with the items removed
    pub raw: Value,
    pub items: Vec<Value>,
    pub total: Option<u64>,
}

/// Fetch one page at `offset`
pub async fn fetch_page(
    client: &GatewayClient,
    ctx: &CallContext,
    endpoint: &Endpoint,
    pagination: &Pagination,
    request: &Request,
    offset: u64,
    limit: u64,
) -> Result<PageResult> {
    let request = request
        .clone()
        .set(&pagination.offset_param, offset)
        .set(&pagination.limit_param, limit);

    let body = client.call_raw(ctx, endpoint, &request).await?;
    let Some(raw) = body.filter(|raw| !raw.is_null()) else {
        return Err(AdapterError::NilResponse {
            endpoint: endpoint.key.clone(),
        });
    };

    let mut raw = normalize_keys(raw);
    let items = match take_json_value(&mut raw, &pagination.items_path) {
        Some(Value::Array(items)) => items,
        None | Some(Value::Null) => Vec::new(),
        Some(other) => {
            return Err(AdapterError::TypeMismatch {
                endpoint: endpoint.key.clone(),
                field: pagination.items_path.clone(),
                expected: "list".to_string(),
                found: value_kind(&other).to_string(),
            })
        }
    };
    let total = extract_json_value(&raw, &pagination.total_path).and_then(Value::as_u64);

    Ok(PageResult { raw, items, total })
}

/// Fetch every page of a paginated endpoint (auto-paginate).
///
/// Stops on an empty page or once `total` items are collected. A short page
/// only ends the walk when the page carries no total. Endpoints without
/// pagination are executed once.
pub async fn fetch_all_pages(
    client: &GatewayClient,
    ctx: &CallContext,
    endpoint: &Endpoint,
    request: &Request,
) -> Result<TypedResponse> {
    let Some(pagination) = &endpoint.pagination else {
        return client.execute(ctx, endpoint, request).await;
    };

    let mut offset = request
        .get(&pagination.offset_param)
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let limit = request
        .get(&pagination.limit_param)
        .and_then(Value::as_u64)
        .filter(|l| *l > 0)
        .unwrap_or(u64::from(pagination.page_size));

    let mut first: Option<Value> = None;
    let mut all_items = Vec::new();

    for page in 0..MAX_PAGES {
        let result = fetch_page(client, ctx, endpoint, pagination, request, offset, limit).await?;
        let count = result.items.len() as u64;
        all_items.extend(result.items);
        if first.is_none() {
            first = Some(result.raw);
        }

        tracing::debug!(
            "{} page {}: {} items (total {:?})",
            endpoint.key,
            page + 1,
            count,
            result.total
        );

        let done = count == 0
            || match result.total {
                Some(total) => offset + count >= total,
                None => count < limit,
            };
        if done {
            break;
        }
        if page + 1 == MAX_PAGES {
            tracing::warn!("{}: stopped after {} pages", endpoint.key, MAX_PAGES);
        }
        offset += count;
    }

    let mut merged = first.unwrap_or_else(|| Value::Object(Map::new()));
    put_json_value(&mut merged, &pagination.items_path, Value::Array(all_items));

    materialize(&endpoint.response, &merged).map_err(|e| e.for_endpoint(&endpoint.key))
}

impl GatewayClient {
    /// Invoke a paginated endpoint and merge every page into one response
    pub async fn execute_all_pages(
        &self,
        ctx: &CallContext,
        endpoint: &Endpoint,
        request: &Request,
    ) -> Result<TypedResponse> {
        fetch_all_pages(self, ctx, endpoint, request).await
    }
}

/// Extract a value from JSON using a dot-notation path
pub fn extract_json_value<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(item, |current, part| current.get(part))
}

/// Remove and return the value at a dot-notation path
fn take_json_value(item: &mut Value, path: &str) -> Option<Value> {
    let (parent, last) = match path.rsplit_once('.') {
        Some((parent, last)) => (extract_json_value_mut(item, parent)?, last),
        None => (item, path),
    };
    parent.as_object_mut()?.remove(last)
}

fn extract_json_value_mut<'a>(item: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    path.split('.').try_fold(item, |current, part| current.get_mut(part))
}

/// Set the value at a dot-notation path.
///
/// Missing parents are left missing so an absent wrapper still materializes
/// as a typed null.
fn put_json_value(item: &mut Value, path: &str, value: Value) {
    let (parent, last) = match path.rsplit_once('.') {
        Some((parent, last)) => (extract_json_value_mut(item, parent), last),
        None => (Some(item), path),
    };
    if let Some(Value::Object(map)) = parent {
        map.insert(last.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_json_value() {
        let value = json!({"page": {"total": 3}});
        assert_eq!(extract_json_value(&value, "page.total"), Some(&json!(3)));
        assert_eq!(extract_json_value(&value, "page.missing"), None);
    }

    #[test]
    fn test_take_nested_value() {
        let mut value = json!({"page": {"content": [1, 2], "total": 2}});
        assert_eq!(take_json_value(&mut value, "page.content"), Some(json!([1, 2])));
        assert_eq!(value, json!({"page": {"total": 2}}));
        assert_eq!(take_json_value(&mut value, "content"), None);
    }

    #[test]
    fn test_put_skips_missing_parents() {
        let mut value = json!({});
        put_json_value(&mut value, "page.content", json!([1]));
        assert_eq!(value, json!({}));

        let mut value = json!({"page": {"total": 1}});
        put_json_value(&mut value, "page.content", json!([1]));
        assert_eq!(value, json!({"page": {"total": 1, "content": [1]}}));

        put_json_value(&mut value, "content", json!([]));
        assert_eq!(value["content"], json!([]));
    }
}
