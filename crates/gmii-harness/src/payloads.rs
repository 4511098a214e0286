//! Test payload generators.

/// Payload of `len` bytes counting 0, 1, .., 255, 0, 1, ..
pub fn incrementing(len: usize) -> Vec<u8> {
    (0..=u8::MAX).cycle().take(len).collect()
}

/// Frame lengths for the standard link regression.
///
/// Every length from 64 to 127, then 512, 1514 and 9214 (jumbo), then ten
/// minimum-size frames back to back.
pub fn size_list() -> Vec<usize> {
    (64..128).chain([512, 1514, 9214]).chain(std::iter::repeat_n(64, 10)).collect()
}
