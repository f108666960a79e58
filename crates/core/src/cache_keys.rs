//! Cache key layout for the read-through list caches.
//!
//! Keys are deterministic so that a mutation can invalidate every cached
//! page of a listing by prefix. The category list is a single well-known
//! key; story lists are keyed per (page, limit, sort) combination.

/// Single key holding the full category list.
pub const CATEGORY_LIST_KEY: &str = "categories:all";

/// Prefix shared by all cached story list pages.
pub const STORY_LIST_PREFIX: &str = "stories:";

/// Key for one cached page of the story list.
///
/// `sort` must already be a normalized token (see
/// [`StorySort::cache_token`](crate::listing::StorySort::cache_token)) so
/// that two spellings of the same sort order share a cache entry.
pub fn story_list_key(page: i64, limit: i64, sort: &str) -> String {
    format!("{STORY_LIST_PREFIX}p{page}:l{limit}:s{sort}")
}
