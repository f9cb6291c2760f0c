//! Paging and sorting types.

use std::str::FromStr;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Ascending (default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    /// Returns the lowercase keyword (`asc` / `desc`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// One sort key: a scalar field and a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    /// Field name.
    pub field: String,
    /// Direction.
    pub direction: Direction,
}

impl SortKey {
    /// Ascending sort on `field`.
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    /// Descending sort on `field`.
    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// A page request: zero-based page index, page size and sort keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: u32,
    /// Page size (always at least 1).
    pub size: u32,
    /// Sort keys, most significant first. Identity order breaks ties.
    pub sort: Vec<SortKey>,
}

impl PageRequest {
    /// Creates a page request. A zero `size` is raised to 1.
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.max(1),
            sort: Vec::new(),
        }
    }

    /// First page of `size` items.
    #[must_use]
    pub fn first(size: u32) -> Self {
        Self::new(0, size)
    }

    /// Adds a sort key.
    #[must_use]
    pub fn sorted_by(mut self, key: SortKey) -> Self {
        self.sort.push(key);
        self
    }

    /// Number of items to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    /// Maximum number of items to return.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.size
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total_elements: u64,
    /// Zero-based page index.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
}

impl<T> Page<T> {
    /// Creates a page for `request`.
    #[must_use]
    pub fn new(items: Vec<T>, total_elements: u64, request: &PageRequest) -> Self {
        Self {
            items,
            total_elements,
            page: request.page,
            size: request.size,
        }
    }

    /// Cuts the requested page out of a complete, already ordered result.
    #[must_use]
    pub fn slice(all: Vec<T>, request: &PageRequest) -> Self {
        let total = all.len() as u64;
        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let items = all
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .collect();
        Self::new(items, total, request)
    }

    /// Total number of pages (0 when there are no items).
    #[must_use]
    pub fn total_pages(&self) -> u32 {
        if self.size == 0 {
            return 0;
        }
        let pages = self.total_elements.div_ceil(u64::from(self.size));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Whether a following page exists.
    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) + 1 < u64::from(self.total_pages())
    }

    /// Whether a preceding page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 0
    }
}
