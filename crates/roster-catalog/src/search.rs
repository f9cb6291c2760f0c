//! Named searches.
//!
//! A search is a finite list of substring predicates over scalar fields, each
//! fed by a request parameter. Binding a search turns request parameters into
//! storage [`Criterion`]s; an optional parameter that is absent drops its
//! predicate.

use std::collections::HashMap;

use roster_model::EntityKind;
use roster_storage::Criterion;
use thiserror::Error;

/// Errors raised while binding request parameters to a search.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// A required parameter is absent.
    #[error("search '{search}' requires parameter '{param}'")]
    MissingParameter {
        /// Search name.
        search: String,
        /// Parameter name.
        param: String,
    },

    /// A parameter value does not fit its type.
    #[error("parameter '{param}' {reason}")]
    InvalidParameter {
        /// Parameter name.
        param: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Value type of a search parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Any string.
    Text,
    /// Non-empty, no whitespace (codes, usernames).
    Token,
}

impl ParamType {
    fn check(self, param: &str, value: &str) -> Result<(), SearchError> {
        match self {
            Self::Text => Ok(()),
            Self::Token if value.is_empty() => Err(SearchError::InvalidParameter {
                param: param.to_string(),
                reason: "must not be empty".to_string(),
            }),
            Self::Token if value.chars().any(char::is_whitespace) => {
                Err(SearchError::InvalidParameter {
                    param: param.to_string(),
                    reason: "must not contain whitespace".to_string(),
                })
            }
            Self::Token => Ok(()),
        }
    }
}

/// A declared search parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParam {
    /// Query parameter name.
    pub name: String,
    /// Value type.
    pub ty: ParamType,
    /// Whether the parameter must be present.
    pub required: bool,
}

impl SearchParam {
    /// A required parameter.
    #[must_use]
    pub fn required(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
        }
    }

    /// An optional parameter.
    #[must_use]
    pub fn optional(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
        }
    }
}

/// Case-insensitive substring match of `field` against parameter `param`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Scalar field of the searched kind.
    pub field: &'static str,
    /// Parameter supplying the value.
    pub param: String,
}

/// A named search over one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDef {
    /// Searched kind.
    pub kind: EntityKind,
    /// Name, used as URL path segment.
    pub name: String,
    /// Declared parameters.
    pub params: Vec<SearchParam>,
    /// Predicates, combined with AND.
    pub predicates: Vec<Predicate>,
}

impl SearchDef {
    /// Starts a search definition.
    #[must_use]
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            params: Vec::new(),
            predicates: Vec::new(),
        }
    }

    /// Declares a parameter.
    #[must_use]
    pub fn param(mut self, param: SearchParam) -> Self {
        self.params.push(param);
        self
    }

    /// Adds a substring predicate.
    #[must_use]
    pub fn contains(mut self, field: &'static str, param: impl Into<String>) -> Self {
        self.predicates.push(Predicate {
            field,
            param: param.into(),
        });
        self
    }

    /// Shorthand for the common single-field search on parameter `q`.
    #[must_use]
    pub fn by_field(kind: EntityKind, name: impl Into<String>, field: &'static str, ty: ParamType) -> Self {
        Self::new(kind, name)
            .param(SearchParam::required("q", ty))
            .contains(field, "q")
    }

    /// Binds request parameters to storage criteria.
    ///
    /// Parameters the search does not declare are ignored, so paging and
    /// projection parameters can travel in the same query string.
    ///
    /// ## Errors
    ///
    /// Returns `SearchError::MissingParameter` for an absent required
    /// parameter and `SearchError::InvalidParameter` for a malformed value.
    pub fn bind(&self, values: &HashMap<String, String>) -> Result<Vec<Criterion>, SearchError> {
        let mut bound: HashMap<&str, &str> = HashMap::new();
        for param in &self.params {
            match values.get(&param.name) {
                Some(value) => {
                    param.ty.check(&param.name, value)?;
                    bound.insert(param.name.as_str(), value.as_str());
                }
                None if param.required => {
                    return Err(SearchError::MissingParameter {
                        search: self.name.clone(),
                        param: param.name.clone(),
                    });
                }
                None => {}
            }
        }

        Ok(self
            .predicates
            .iter()
            .filter_map(|p| {
                bound
                    .get(p.param.as_str())
                    .map(|value| Criterion::contains(p.field, *value))
            })
            .collect())
    }
}
