//! Fixed-size batching.

/// Split `items` into contiguous chunks of `size`, the last possibly shorter.
///
/// Empty input yields no chunks.
///
/// # Panics
///
/// Panics if `size` is zero.
pub fn chunk<T>(items: &[T], size: usize) -> std::slice::Chunks<'_, T> {
    assert!(size > 0, "chunk size must be positive");
    items.chunks(size)
}
