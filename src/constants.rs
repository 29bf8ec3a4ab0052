/// Earliest accepted publication year (movable-type printing).
pub const MIN_PUBLICATION_YEAR: i32 = 1450;

/// Default page size for `GET /books` when `limit` is not supplied.
pub const DEFAULT_LIST_LIMIT: usize = 10;
