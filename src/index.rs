//! Index translation
//!
//! Facade positions are zero-based with negative values counting from the
//! end (`-1` is the last element) and slice ends are exclusive. The store
//! uses the same negative convention but inclusive stops, so slices need a
//! small translation; client-side algorithms resolve positions against a
//! known length instead.

use std::ops::Range;

/// Inclusive store range for an exclusive facade slice.
///
/// `None` means the slice is empty regardless of the collection length
/// (an exclusive end of `0`).
pub fn store_range(start: i64, end: Option<i64>) -> Option<(i64, i64)> {
    match end {
        None => Some((start, -1)),
        Some(0) => None,
        Some(end) => Some((start, end - 1)),
    }
}

/// Resolve a possibly negative position against `len`, clamping into
/// `[0, len]`
pub fn clamp_position(index: i64, len: usize) -> usize {
    let len = len as i64;
    let resolved = if index < 0 { len + index } else { index };
    resolved.clamp(0, len) as usize
}

/// Python-style slice bounds over a sequence of `len` items
pub fn slice_bounds(len: usize, start: i64, end: Option<i64>) -> Range<usize> {
    let from = clamp_position(start, len);
    let to = end.map_or(len, |end| clamp_position(end, len));
    if from >= to {
        from..from
    } else {
        from..to
    }
}

/// Position inside `[0, len)` for element access, `None` when out of range
pub fn element_position(index: i64, len: usize) -> Option<usize> {
    let len = len as i64;
    let resolved = if index < 0 { len + index } else { index };
    (0..len).contains(&resolved).then(|| resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_range() {
        assert_eq!(store_range(0, None), Some((0, -1)));
        assert_eq!(store_range(1, Some(3)), Some((1, 2)));
        assert_eq!(store_range(-3, Some(-1)), Some((-3, -2)));
        assert_eq!(store_range(2, Some(0)), None);
    }

    #[test]
    fn test_slice_bounds_clamp() {
        assert_eq!(slice_bounds(5, -3, None), 2..5);
        assert_eq!(slice_bounds(5, 1, Some(-1)), 1..4);
        assert_eq!(slice_bounds(5, -100, Some(100)), 0..5);
        assert_eq!(slice_bounds(5, 4, Some(2)), 4..4);
        assert_eq!(slice_bounds(0, 0, None), 0..0);
    }

    #[test]
    fn test_positions() {
        assert_eq!(clamp_position(-1, 4), 3);
        assert_eq!(clamp_position(-9, 4), 0);
        assert_eq!(clamp_position(9, 4), 4);
        assert_eq!(element_position(-1, 4), Some(3));
        assert_eq!(element_position(4, 4), None);
        assert_eq!(element_position(-5, 4), None);
        assert_eq!(element_position(0, 0), None);
    }
}
