//! Pagination handling for GitHub API.

use futures::stream::{self, Stream};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{GitHubError, GitHubResult};

/// Pagination links parsed from Link header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationLinks {
    /// URL for the next page.
    pub next: Option<String>,
    /// URL for the previous page.
    pub prev: Option<String>,
    /// URL for the first page.
    pub first: Option<String>,
    /// URL for the last page.
    pub last: Option<String>,
}

impl PaginationLinks {
    /// Parses pagination links from the Link header (RFC 8288).
    pub fn from_header(header_value: &str) -> Self {
        let mut links = Self::default();

        for part in header_value.split(',') {
            let mut url = None;
            let mut rel = None;

            for segment in part.split(';') {
                let segment = segment.trim();
                if segment.starts_with('<') && segment.ends_with('>') {
                    url = Some(segment[1..segment.len() - 1].to_string());
                } else if let Some(value) = segment.strip_prefix("rel=") {
                    rel = Some(value.trim_matches('"').to_string());
                }
            }

            if let (Some(url), Some(rel)) = (url, rel) {
                // rel may hold several space separated relation types
                for rel in rel.split_whitespace() {
                    match rel {
                        "next" => links.next = Some(url.clone()),
                        "prev" => links.prev = Some(url.clone()),
                        "first" => links.first = Some(url.clone()),
                        "last" => links.last = Some(url.clone()),
                        _ => {}
                    }
                }
            }
        }

        links
    }

    /// Parses pagination links from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get("link")
            .and_then(|v| v.to_str().ok())
            .map(Self::from_header)
            .unwrap_or_default()
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Gets the total page count from the last link.
    pub fn total_pages(&self) -> Option<u32> {
        self.last.as_deref().and_then(extract_page_number)
    }
}

/// Opaque pointer to the next page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageCursor(String);

impl PageCursor {
    /// Reads the `rel="next"` target from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        PaginationLinks::from_headers(headers).next.map(Self)
    }

    /// Absolute URL of the next page.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Items of a multi-page listing in the order the API returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedResult {
    items: Vec<Value>,
    pages: u32,
}

impl AggregatedResult {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends one page worth of items.
    pub(crate) fn push_page(&mut self, items: Vec<Value>) {
        self.items.extend(items);
        self.pages += 1;
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no item was returned.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of pages fetched.
    pub fn pages(&self) -> u32 {
        self.pages
    }

    /// Borrowing iterator.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Consumes the result and returns the items.
    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    /// Deserializes every item into `T`.
    pub fn deserialize<T: DeserializeOwned>(self) -> GitHubResult<Vec<T>> {
        self.items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|e| {
                    GitHubError::unknown(format!("Failed to deserialize item: {}", e)).with_cause(e)
                })
            })
            .collect()
    }

    /// Exposes the items as a stream.
    pub fn into_stream(self) -> impl Stream<Item = Value> {
        stream::iter(self.items)
    }
}

impl IntoIterator for AggregatedResult {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

/// Items contributed by one page body.
///
/// Arrays contribute their elements, search-style envelopes their `items`,
/// other objects themselves and an empty body nothing.
pub fn page_items(body: Option<Value>) -> Vec<Value> {
    match body {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(Value::Object(mut map)) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                map.insert("items".to_string(), other);
                vec![Value::Object(map)]
            }
            None => vec![Value::Object(map)],
        },
        Some(other) => vec![other],
    }
}

/// Extracts page number from a URL.
pub fn extract_page_number(url: &str) -> Option<u32> {
    url::Url::parse(url).ok().and_then(|u| {
        u.query_pairs()
            .find(|(k, _)| k == "page")
            .and_then(|(_, v)| v.parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_parse_link_header() {
        let header = r#"<https://api.github.com/repos?page=2>; rel="next", <https://api.github.com/repos?page=5>; rel="last""#;
        let links = PaginationLinks::from_header(header);

        assert_eq!(links.next, Some("https://api.github.com/repos?page=2".to_string()));
        assert_eq!(links.last, Some("https://api.github.com/repos?page=5".to_string()));
        assert!(links.prev.is_none());
        assert!(links.first.is_none());
        assert_eq!(links.total_pages(), Some(5));
    }

    #[test]
    fn test_parse_full_link_header() {
        let header = r#"<https://api.github.com/repos?page=1>; rel="first", <https://api.github.com/repos?page=2>; rel="prev", <https://api.github.com/repos?page=4>; rel="next", <https://api.github.com/repos?page=5>; rel="last""#;
        let links = PaginationLinks::from_header(header);

        assert!(links.first.is_some());
        assert!(links.prev.is_some());
        assert!(links.has_next());
        assert!(links.last.is_some());
    }

    #[test]
    fn test_cursor_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(PageCursor::from_headers(&headers).is_none());

        headers.insert(
            "link",
            HeaderValue::from_static(r#"<https://api.github.com/repositories/1/issues?page=3>; rel="next""#),
        );
        let cursor = PageCursor::from_headers(&headers).unwrap();
        assert_eq!(cursor.as_str(), "https://api.github.com/repositories/1/issues?page=3");
    }

    #[test]
    fn test_page_items_shapes() {
        assert_eq!(page_items(None), Vec::<Value>::new());
        assert_eq!(page_items(Some(json!([1, 2]))), vec![json!(1), json!(2)]);
        assert_eq!(
            page_items(Some(json!({"total_count": 2, "items": [{"id": 1}, {"id": 2}]}))),
            vec![json!({"id": 1}), json!({"id": 2})]
        );
        assert_eq!(page_items(Some(json!({"id": 7}))), vec![json!({"id": 7})]);
    }

    #[tokio::test]
    async fn test_aggregated_result_keeps_page_order() {
        let mut result = AggregatedResult::new();
        result.push_page(vec![json!(1), json!(2)]);
        result.push_page(vec![]);
        result.push_page(vec![json!(3)]);

        assert_eq!(result.len(), 3);
        assert_eq!(result.pages(), 3);

        let collected: Vec<Value> = result.clone().into_stream().collect().await;
        assert_eq!(collected, vec![json!(1), json!(2), json!(3)]);

        let numbers: Vec<u32> = result.deserialize().unwrap();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
