//! Query parameter parsing.
//!
//! Queries arrive as raw `(name, value)` pairs so repeated `sort` keys survive
//! and search parameters can share the query string with paging.

use std::collections::HashMap;

use roster_core::PagingConfig;
use roster_model::EntityKind;
use roster_storage::{Direction, PageRequest, SortKey};

use crate::error::{ApiError, ApiResult};

/// Parsed listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    /// Page index and size with validated sort keys.
    pub page: PageRequest,
    /// Requested projection.
    pub projection: Option<String>,
    /// Every other parameter, first occurrence wins.
    pub extra: Vec<(String, String)>,
}

impl ListParams {
    /// Parses paging, sorting and projection for a listing of `kind`.
    ///
    /// `size` defaults to `paging.default_size` and is clamped to
    /// `paging.max_size`.
    ///
    /// ## Errors
    ///
    /// Returns `ApiError::BadRequest` for a non-numeric `page` or `size`, a
    /// zero `size`, or a `sort` naming an unknown field or direction.
    pub fn parse(kind: EntityKind, query: &[(String, String)], paging: PagingConfig) -> ApiResult<Self> {
        let mut page = 0;
        let mut size = paging.default_size;
        let mut sort = Vec::new();
        let mut projection = None;
        let mut extra: Vec<(String, String)> = Vec::new();

        for (name, value) in query {
            match name.as_str() {
                "page" => page = parse_number("page", value)?,
                "size" => {
                    size = parse_number("size", value)?;
                    if size == 0 {
                        return Err(ApiError::bad_request("size must be at least 1"));
                    }
                }
                "sort" => sort.push(parse_sort(kind, value)?),
                "projection" if !value.is_empty() => projection = Some(value.clone()),
                "projection" => {}
                _ if extra.iter().any(|(n, _)| n == name) => {}
                _ => extra.push((name.clone(), value.clone())),
            }
        }

        let mut request = PageRequest::new(page, size.min(paging.max_size));
        request.sort = sort;
        Ok(Self {
            page: request,
            projection,
            extra,
        })
    }

    /// Parameters handed to a search binding.
    #[must_use]
    pub fn search_values(&self) -> HashMap<String, String> {
        self.extra.iter().cloned().collect()
    }

    /// Query pairs for a link to `page`, keeping size, sort, projection and
    /// the search parameters.
    #[must_use]
    pub fn link_query(&self, page: u32) -> Vec<(String, String)> {
        let mut pairs = self.extra.clone();
        pairs.push(("page".into(), page.to_string()));
        pairs.push(("size".into(), self.page.size.to_string()));
        for key in &self.page.sort {
            pairs.push((
                "sort".into(),
                format!("{},{}", key.field, key.direction.as_str()),
            ));
        }
        if let Some(projection) = &self.projection {
            pairs.push(("projection".into(), projection.clone()));
        }
        pairs
    }
}

/// Reads the `projection` parameter alone (item endpoints).
#[must_use]
pub fn projection(query: &[(String, String)]) -> Option<String> {
    query
        .iter()
        .find(|(name, value)| name == "projection" && !value.is_empty())
        .map(|(_, value)| value.clone())
}

fn parse_number(name: &str, value: &str) -> ApiResult<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("{name} must be a non-negative integer, got '{value}'")))
}

fn parse_sort(kind: EntityKind, value: &str) -> ApiResult<SortKey> {
    let (field, direction) = match value.split_once(',') {
        Some((field, direction)) => (field.trim(), direction.trim()),
        None => (value.trim(), "asc"),
    };
    if kind.descriptor().field(field).is_none() {
        return Err(ApiError::bad_request(format!("{kind} cannot be sorted by '{field}'")));
    }
    let direction: Direction = direction.parse().map_err(ApiError::BadRequest)?;
    Ok(SortKey {
        field: field.to_string(),
        direction,
    })
}
