use serde::{Deserialize, Serialize};

/// One page of results plus whether another page follows.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Slice<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub has_next: bool,
}

impl<T> Slice<T> {
    /// Builds a slice from rows fetched with `limit = size + 1`.
    ///
    /// The extra row only signals that a next page exists and is dropped.
    pub fn from_overfetch(mut rows: Vec<T>, page: i64, size: i64) -> Self {
        let size_usize = usize::try_from(size).unwrap_or(0);
        let has_next = rows.len() > size_usize;
        rows.truncate(size_usize);

        Slice {
            items: rows,
            page,
            size,
            has_next,
        }
    }
}
