use crate::errors::{SearchError, SearchResult};

/// Splits `items` into exactly `workers` contiguous chunks.
///
/// Chunk sizes differ by at most one: the first `items.len() % workers`
/// chunks carry the extra element. Concatenating the chunks in order gives
/// back `items`, so with fewer items than workers the trailing chunks are
/// empty.
pub fn partition<T>(items: &[T], workers: usize) -> SearchResult<Vec<&[T]>> {
    if workers == 0 {
        return Err(SearchError::config_error("worker count must be at least 1"));
    }

    let base = items.len() / workers;
    let extra = items.len() % workers;

    let mut chunks = Vec::with_capacity(workers);
    let mut start = 0;
    for index in 0..workers {
        let len = base + usize::from(index < extra);
        chunks.push(&items[start..start + len]);
        start += len;
    }
    debug_assert_eq!(start, items.len());

    Ok(chunks)
}
