// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Type conversion utilities
//!
//! Code points, glyph offsets and handles are represented as `u32` by this
//! library while slices are indexed by `usize`. We do not expect `usize`
//! smaller than `u32`, so widening is always lossless; narrowing is only
//! needed for handle allocation and is checked.

use easy_cast::{Cast, Conv};

/// Convert `u32` → `usize`
///
/// This is a "safer" wrapper around `as` ensuring that the operation is
/// zero-extension.
#[inline]
pub fn to_usize(x: u32) -> usize {
    x.cast()
}

/// Convert `usize` → `u32`, returning `None` where not representable
#[inline]
pub fn try_to_u32(x: usize) -> Option<u32> {
    u32::try_conv(x).ok()
}
