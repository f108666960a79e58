//! List pagination and sort handling.
//!
//! Sort orders are parsed against a whitelist instead of being spliced into
//! SQL verbatim; [`StorySort::as_sql`] is the only thing that ever reaches
//! an `ORDER BY` clause.

use std::str::FromStr;

/// Default page size for story listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Maximum page size for story listings.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Sortable story columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// A validated story sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorySort {
    pub field: SortField,
    pub dir: SortDir,
}

impl Default for StorySort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            dir: SortDir::Desc,
        }
    }
}

impl StorySort {
    /// SQL fragment for the `ORDER BY` clause.
    pub fn as_sql(self) -> &'static str {
        match (self.field, self.dir) {
            (SortField::CreatedAt, SortDir::Asc) => "created_at ASC",
            (SortField::CreatedAt, SortDir::Desc) => "created_at DESC",
            (SortField::UpdatedAt, SortDir::Asc) => "updated_at ASC",
            (SortField::UpdatedAt, SortDir::Desc) => "updated_at DESC",
            (SortField::Title, SortDir::Asc) => "title ASC",
            (SortField::Title, SortDir::Desc) => "title DESC",
        }
    }

    /// Normalized token used inside cache keys.
    pub fn cache_token(self) -> &'static str {
        match (self.field, self.dir) {
            (SortField::CreatedAt, SortDir::Asc) => "created_at_asc",
            (SortField::CreatedAt, SortDir::Desc) => "created_at_desc",
            (SortField::UpdatedAt, SortDir::Asc) => "updated_at_asc",
            (SortField::UpdatedAt, SortDir::Desc) => "updated_at_desc",
            (SortField::Title, SortDir::Asc) => "title_asc",
            (SortField::Title, SortDir::Desc) => "title_desc",
        }
    }
}

impl FromStr for StorySort {
    type Err = String;

    /// Parse `"created_at desc"`, `"title asc"`, etc. Direction defaults to
    /// ascending when omitted. Anything outside the whitelist is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let field = match parts.next() {
            Some("created_at") | None => SortField::CreatedAt,
            Some("updated_at") => SortField::UpdatedAt,
            Some("title") => SortField::Title,
            Some(other) => return Err(format!("unknown sort field '{other}'")),
        };
        let dir = match parts.next() {
            Some("asc") | None => SortDir::Asc,
            Some("desc") => SortDir::Desc,
            Some(other) => return Err(format!("unknown sort direction '{other}'")),
        };
        if parts.next().is_some() {
            return Err(format!("malformed sort expression '{s}'"));
        }
        Ok(Self { field, dir })
    }
}

/// Clamp a caller-supplied page number to at least 1.
pub fn clamp_page(page: i64) -> i64 {
    page.max(1)
}

/// Clamp a caller-supplied page size into `1..=MAX_PAGE_LIMIT`.
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_PAGE_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_and_direction() {
        let sort: StorySort = "created_at desc".parse().unwrap();
        assert_eq!(sort.as_sql(), "created_at DESC");
        assert_eq!(sort.cache_token(), "created_at_desc");

        let sort: StorySort = "title asc".parse().unwrap();
        assert_eq!(sort.as_sql(), "title ASC");
    }

    #[test]
    fn direction_defaults_to_ascending() {
        let sort: StorySort = "updated_at".parse().unwrap();
        assert_eq!(sort.as_sql(), "updated_at ASC");
    }

    #[test]
    fn rejects_unknown_fields() {
        assert!("id; DROP TABLE stories".parse::<StorySort>().is_err());
        assert!("created_at sideways".parse::<StorySort>().is_err());
    }

    #[test]
    fn clamps_pagination() {
        assert_eq!(clamp_page(0), 1);
        assert_eq!(clamp_page(-3), 1);
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(1000), MAX_PAGE_LIMIT);
        assert_eq!(clamp_limit(25), 25);
    }
}
