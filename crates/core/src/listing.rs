//! Track listing request validation and pagination metadata.
//!
//! A [`ListingRequest`] can only be built through [`ListingRequest::from_params`],
//! which enforces the pagination bounds and the sort allow-list. The storage
//! layer therefore never sees caller-provided sort text: it receives a
//! [`SortColumn`] and a [`SortDirection`] and nothing else.

use std::time::Duration;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// First page number. Pages are 1-based.
pub const FIRST_PAGE: i64 = 1;

/// Page used when the caller does not provide one.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the caller does not provide one.
pub const DEFAULT_PAGE_SIZE: i64 = 5;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: i64 = 50;

/// Sort key used when the caller does not provide one.
pub const DEFAULT_SORT: &str = "id";

/// Every sort key accepted by [`Sort::parse`].
pub const SORT_SAFELIST: &[&str] = &["id", "title", "year", "-id", "-title", "-year"];

/// Default deadline for one listing query round trip.
pub const DEFAULT_LISTING_TIMEOUT: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Boxed storage-layer cause, kept opaque so this crate stays free of
/// database dependencies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why the storage round trip of a listing call failed.
#[derive(Debug, thiserror::Error)]
pub enum StorageFailure {
    /// Connectivity loss, query error, or a row that could not be decoded.
    #[error("listing query failed: {0}")]
    Query(#[source] BoxError),

    /// The query did not complete before its deadline.
    #[error("listing query exceeded its {}ms deadline", .0.as_millis())]
    Timeout(Duration),
}

/// Errors returned by the track listing engine.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Unsafe sort key: {0:?}")]
    UnsafeSortKey(String),

    #[error(transparent)]
    StorageFailure(#[from] StorageFailure),
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortColumn {
    Id,
    Title,
    Year,
}

impl SortColumn {
    /// Resolve an allow-listed column name. Anything else yields `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// Column identifier in the listing projection.
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Year => "year",
        }
    }
}

/// Ordering direction. A leading `-` on the sort key selects `Desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A validated ordering: one allow-listed column plus a direction.
///
/// The `id ASC` tiebreak is appended by the query builder and is not part of
/// this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sort {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            column: SortColumn::Id,
            direction: SortDirection::Asc,
        }
    }
}

impl Sort {
    /// Parse a sort key such as `"title"` or `"-year"`.
    ///
    /// A single leading `-` selects descending order. The remainder must be
    /// one of `id`, `title`, `year`; otherwise the key is rejected with
    /// [`ListingError::UnsafeSortKey`] rather than coerced to a default.
    ///
    /// # Examples
    ///
    /// ```
    /// use spookify_core::listing::{Sort, SortColumn, SortDirection};
    ///
    /// let sort = Sort::parse("-year").unwrap();
    /// assert_eq!(sort.column, SortColumn::Year);
    /// assert_eq!(sort.direction, SortDirection::Desc);
    /// assert!(Sort::parse("title; DROP TABLE tracks").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ListingError> {
        let (direction, name) = match raw.strip_prefix('-') {
            Some(rest) => (SortDirection::Desc, rest),
            None => (SortDirection::Asc, raw),
        };

        let column = SortColumn::from_name(name)
            .ok_or_else(|| ListingError::UnsafeSortKey(raw.to_string()))?;

        Ok(Self { column, direction })
    }

    /// Canonical sort key, the inverse of [`Sort::parse`].
    pub fn key(&self) -> String {
        match self.direction {
            SortDirection::Asc => self.column.column().to_string(),
            SortDirection::Desc => format!("-{}", self.column.column()),
        }
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// A validated page selection: `page >= 1`, `1 <= page_size <= 50`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    page_size: i64,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Result<Self, ListingError> {
        if page < FIRST_PAGE {
            return Err(ListingError::InvalidPagination(
                "page must be greater than 0".to_string(),
            ));
        }
        if page_size < 1 {
            return Err(ListingError::InvalidPagination(
                "page size must be greater than 0".to_string(),
            ));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(ListingError::InvalidPagination(format!(
                "page size has maximum of {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Rows skipped before this page. Saturates instead of overflowing for
    /// absurd page numbers, which simply produce an empty page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Pagination block rendered alongside a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMetadata {
    pub current_page: i64,
    pub page_size: i64,
    pub first_page: i64,
    /// `ceil(total_records / page_size)`; 0 when nothing matches.
    pub last_page: i64,
    pub total_records: i64,
}

impl PageMetadata {
    pub fn new(pagination: Pagination, total_records: i64) -> Self {
        let total = total_records.max(0);
        let size = pagination.page_size();
        Self {
            current_page: pagination.page(),
            page_size: size,
            first_page: FIRST_PAGE,
            last_page: (total + size - 1) / size,
            total_records: total,
        }
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Raw listing input as received from a caller. Empty strings and empty
/// genre lists mean "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingParams {
    pub title: String,
    pub artist: String,
    pub genres: Vec<String>,
    pub sort: String,
    pub page: i64,
    pub page_size: i64,
}

impl Default for ListingParams {
    fn default() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            genres: Vec::new(),
            sort: DEFAULT_SORT.to_string(),
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A validated listing request.
///
/// Each filter is an explicit `Option`: `None` means the predicate is left
/// out of the query entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    title: Option<String>,
    artist: Option<String>,
    genres: Option<Vec<String>>,
    sort: Sort,
    pagination: Pagination,
}

impl ListingRequest {
    /// Validate raw parameters. Pagination is checked before the sort key.
    pub fn from_params(params: &ListingParams) -> Result<Self, ListingError> {
        let pagination = Pagination::new(params.page, params.page_size)?;
        let sort = Sort::parse(&params.sort)?;

        Ok(Self {
            title: non_blank(&params.title),
            artist: non_blank(&params.artist),
            genres: genre_set(&params.genres),
            sort,
            pagination,
        })
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn artist(&self) -> Option<&str> {
        self.artist.as_deref()
    }

    pub fn genres(&self) -> Option<&[String]> {
        self.genres.as_deref()
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }
}

impl TryFrom<&ListingParams> for ListingRequest {
    type Error = ListingError;

    fn try_from(params: &ListingParams) -> Result<Self, Self::Error> {
        Self::from_params(params)
    }
}

/// Trimmed text, or `None` when nothing is left.
fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trimmed, de-duplicated genre tags in first-seen order, or `None` when no
/// tag survives.
fn genre_set(genres: &[String]) -> Option<Vec<String>> {
    let mut set: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
        if !set.iter().any(|existing| existing == genre) {
            set.push(genre.to_string());
        }
    }
    if set.is_empty() {
        None
    } else {
        Some(set)
    }
}

/// Split a comma-separated `genres` query value into tags.
pub fn split_genres(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
