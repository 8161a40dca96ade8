//! Shared API types
//!
//! Pagination query parsing and the list-response envelope. Query
//! parameters arrive as strings so we control how malformed values are
//! handled: list endpoints fall back to defaults, search endpoints
//! reject them with a validation error.

use serde::{Deserialize, Serialize};

use crate::api::middleware::ApiError;
use crate::models::{ListParams, PagedResult};

/// Pagination query parameters
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PaginationQuery {
    /// Parse leniently: malformed or missing values fall back to defaults.
    pub fn lenient(&self) -> ListParams {
        let page = self
            .page
            .as_deref()
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(1);
        let page_size = self
            .page_size
            .as_deref()
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(10);
        ListParams::new(page, page_size)
    }

    /// Parse strictly: present values must be positive integers.
    pub fn strict(&self) -> Result<ListParams, ApiError> {
        let page = parse_positive(self.page.as_deref(), 1, "page")?;
        let page_size = parse_positive(self.page_size.as_deref(), 10, "page_size")?;
        Ok(ListParams::new(page, page_size))
    }
}

fn parse_positive(value: Option<&str>, default: u32, name: &str) -> Result<u32, ApiError> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(ApiError::validation_error(format!(
                "{} must be a positive integer",
                name
            ))),
        },
    }
}

/// List-response envelope: count plus next/previous page numbers
#[derive(Debug, Serialize, Deserialize)]
pub struct PagedResponse<T> {
    pub count: i64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> PagedResponse<T> {
    pub fn from_result(result: PagedResult<T>) -> Self {
        Self {
            count: result.total,
            next: result.next_page(),
            previous: result.previous_page(),
            results: result.items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lenient_defaults_on_garbage() {
        let query = PaginationQuery {
            page: Some("abc".to_string()),
            page_size: Some("-3".to_string()),
        };
        let params = query.lenient();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);
    }

    #[test]
    fn test_lenient_parses_valid_values() {
        let query = PaginationQuery {
            page: Some("3".to_string()),
            page_size: Some("25".to_string()),
        };
        let params = query.lenient();
        assert_eq!(params.page, 3);
        assert_eq!(params.page_size, 25);
    }

    #[test]
    fn test_strict_rejects_garbage() {
        let query = PaginationQuery {
            page: Some("abc".to_string()),
            page_size: None,
        };
        assert!(query.strict().is_err());

        let query = PaginationQuery {
            page: Some("0".to_string()),
            page_size: None,
        };
        assert!(query.strict().is_err());
    }

    #[test]
    fn test_strict_defaults_when_absent() {
        let params = PaginationQuery::default().strict().unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 10);
    }

    #[test]
    fn test_envelope_from_result() {
        let params = ListParams::new(2, 10);
        let result = PagedResult::new(vec![1, 2, 3], 25, &params);
        let response = PagedResponse::from_result(result);
        assert_eq!(response.count, 25);
        assert_eq!(response.next, Some(3));
        assert_eq!(response.previous, Some(1));
        assert_eq!(response.results, vec![1, 2, 3]);
    }
}
