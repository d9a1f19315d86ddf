//! Small helpers shared by the textual dumps.

/// Digits needed to print every index in `0..count`.
pub fn width_for_count(count: usize) -> usize {
    if count <= 1 {
        1
    } else {
        (count - 1).ilog10() as usize + 1
    }
}
