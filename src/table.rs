// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Glyph tables
//!
//! A [`GlyphTable`] describes the glyphs of one contiguous range of Unicode
//! code points. Tables are produced by a font compiler and are expected to
//! live in `static` items; this library only reads them.

use crate::conv::to_usize;
use easy_cast::Conv;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Glyph descriptor
///
/// One entry exists per glyph present in a table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlyphDsc {
    /// Width of the glyph in pixels
    pub w_px: u8,
    /// Byte offset of the glyph's bitmap within [`GlyphTable::glyph_bitmap`]
    pub glyph_index: u32,
}

impl GlyphDsc {
    /// Construct
    #[inline]
    pub const fn new(w_px: u8, glyph_index: u32) -> Self {
        GlyphDsc { w_px, glyph_index }
    }
}

/// Bits per pixel of glyph bitmaps
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
#[repr(u8)]
pub enum Bpp {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl Bpp {
    /// Number of bits used per pixel
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Unsupported bits-per-pixel value
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unsupported bpp: {0}")]
pub struct InvalidBpp(pub u8);

impl TryFrom<u8> for Bpp {
    type Error = InvalidBpp;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Ok(match bits {
            1 => Bpp::One,
            2 => Bpp::Two,
            4 => Bpp::Four,
            8 => Bpp::Eight,
            _ => return Err(InvalidBpp(bits)),
        })
    }
}

impl From<Bpp> for u8 {
    #[inline]
    fn from(bpp: Bpp) -> u8 {
        bpp.bits()
    }
}

/// Storage layout of a [`GlyphTable`]
///
/// The layout selects the lookup strategy used for the table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Layout<'a> {
    /// Every code point of the range has a glyph
    ///
    /// Descriptors are indexed by offset from the first code point.
    Continuous,
    /// Only the listed code points have a glyph
    ///
    /// `unicode_list` is sorted ascending and index-aligned with the
    /// descriptor list.
    Sparse { unicode_list: &'a [u32] },
}

/// Invalid glyph table
///
/// Reported by [`GlyphTable::validate`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("inverted range: first {first:#x} > last {last:#x}")]
    InvertedRange { first: u32, last: u32 },
    #[error("continuous table expects {expected} descriptors, found {found}")]
    DescriptorCount { expected: u64, found: usize },
    #[error("sparse table has {list} code points but {descriptors} descriptors")]
    ListLength { list: usize, descriptors: usize },
    #[error("code point list not strictly ascending at index {index}")]
    NotAscending { index: usize },
    #[error("code point {code_point:#x} outside of table range")]
    OutOfRange { code_point: u32 },
    #[error("glyph {index}: bitmap offset {offset} exceeds bitmap length {len}")]
    BitmapOffset { index: usize, offset: u32, len: usize },
}

/// A table of glyphs over one contiguous code-point range
///
/// Several tables are combined into a [`Font`](crate::fonts::Font); tables
/// within one font may use different layouts and bit depths.
///
/// Construct with [`GlyphTable::continuous`] or [`GlyphTable::sparse`]. Both
/// are `const` so that tables may be defined as `static` items:
/// ```
/// # use kas_bitfont::{Bpp, GlyphDsc, GlyphTable};
/// static DSC: [GlyphDsc; 2] = [GlyphDsc::new(5, 0), GlyphDsc::new(6, 5)];
/// static BITMAP: [u8; 11] = [0; 11];
/// static TABLE: GlyphTable<'static> = GlyphTable::continuous(0x41, 0x42, Bpp::One, &DSC, &BITMAP)
///     .with_name("latin-ab");
/// assert!(TABLE.validate().is_ok());
/// ```
#[derive(Clone, Copy)]
pub struct GlyphTable<'a> {
    name: &'a str,
    unicode_first: u32,
    unicode_last: u32,
    bpp: Bpp,
    monospace: u8,
    glyph_dsc: &'a [GlyphDsc],
    glyph_bitmap: &'a [u8],
    layout: Layout<'a>,
}

impl<'a> GlyphTable<'a> {
    /// Construct a table defining every code point in `first..=last`
    ///
    /// `glyph_dsc` must have one entry per code point of the range.
    pub const fn continuous(
        unicode_first: u32,
        unicode_last: u32,
        bpp: Bpp,
        glyph_dsc: &'a [GlyphDsc],
        glyph_bitmap: &'a [u8],
    ) -> Self {
        GlyphTable {
            name: "",
            unicode_first,
            unicode_last,
            bpp,
            monospace: 0,
            glyph_dsc,
            glyph_bitmap,
            layout: Layout::Continuous,
        }
    }

    /// Construct a table defining the code points of `unicode_list`
    ///
    /// `unicode_list` must be strictly ascending, lie within `first..=last`
    /// and be index-aligned with `glyph_dsc`.
    pub const fn sparse(
        unicode_first: u32,
        unicode_last: u32,
        bpp: Bpp,
        unicode_list: &'a [u32],
        glyph_dsc: &'a [GlyphDsc],
        glyph_bitmap: &'a [u8],
    ) -> Self {
        GlyphTable {
            name: "",
            unicode_first,
            unicode_last,
            bpp,
            monospace: 0,
            glyph_dsc,
            glyph_bitmap,
            layout: Layout::Sparse { unicode_list },
        }
    }

    /// Set a fixed advance width
    ///
    /// A non-zero value replaces the per-glyph width of every glyph resolved
    /// through this table. Zero uses per-glyph widths.
    #[inline]
    pub const fn with_monospace(mut self, monospace: u8) -> Self {
        self.monospace = monospace;
        self
    }

    /// Set a name, used for debugging only
    #[inline]
    pub const fn with_name(mut self, name: &'a str) -> Self {
        self.name = name;
        self
    }

    /// Table name (may be empty)
    #[inline]
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// First code point of the range
    #[inline]
    pub fn unicode_first(&self) -> u32 {
        self.unicode_first
    }

    /// Last code point of the range (inclusive)
    #[inline]
    pub fn unicode_last(&self) -> u32 {
        self.unicode_last
    }

    /// The range of code points this table may answer for
    #[inline]
    pub fn range(&self) -> RangeInclusive<u32> {
        self.unicode_first..=self.unicode_last
    }

    /// True if `c` lies within the table's range
    ///
    /// This does not imply that the table has a glyph for `c`.
    #[inline]
    pub fn contains(&self, c: u32) -> bool {
        self.unicode_first <= c && c <= self.unicode_last
    }

    /// Bits per pixel of this table's bitmaps
    #[inline]
    pub fn bpp(&self) -> Bpp {
        self.bpp
    }

    /// Fixed advance width, or zero
    #[inline]
    pub fn monospace(&self) -> u8 {
        self.monospace
    }

    /// Storage layout
    #[inline]
    pub fn layout(&self) -> Layout<'a> {
        self.layout
    }

    /// True for [`Layout::Sparse`]
    #[inline]
    pub fn is_sparse(&self) -> bool {
        matches!(self.layout, Layout::Sparse { .. })
    }

    /// Glyph descriptors
    #[inline]
    pub fn glyph_dsc(&self) -> &'a [GlyphDsc] {
        self.glyph_dsc
    }

    /// Packed glyph bitmaps
    #[inline]
    pub fn glyph_bitmap(&self) -> &'a [u8] {
        self.glyph_bitmap
    }

    /// Number of glyphs in this table
    #[inline]
    pub fn glyph_count(&self) -> usize {
        self.glyph_dsc.len()
    }

    /// Check table invariants
    ///
    /// Lookups on a table failing validation do not panic but may miss
    /// glyphs the table claims to have.
    pub fn validate(&self) -> Result<(), TableError> {
        let (first, last) = (self.unicode_first, self.unicode_last);
        if first > last {
            return Err(TableError::InvertedRange { first, last });
        }

        match self.layout {
            Layout::Continuous => {
                let expected = u64::from(last - first) + 1;
                let found = self.glyph_dsc.len();
                if u64::conv(found) != expected {
                    return Err(TableError::DescriptorCount { expected, found });
                }
            }
            Layout::Sparse { unicode_list } => {
                if unicode_list.len() != self.glyph_dsc.len() {
                    return Err(TableError::ListLength {
                        list: unicode_list.len(),
                        descriptors: self.glyph_dsc.len(),
                    });
                }
                for (index, pair) in unicode_list.windows(2).enumerate() {
                    if code_compare(&pair[0], &pair[1]) != Ordering::Less {
                        return Err(TableError::NotAscending { index: index + 1 });
                    }
                }
                if let Some(&code_point) = unicode_list.iter().find(|c| !self.contains(**c)) {
                    return Err(TableError::OutOfRange { code_point });
                }
            }
        }

        let len = self.glyph_bitmap.len();
        for (index, dsc) in self.glyph_dsc.iter().enumerate() {
            // An offset equal to `len` addresses an empty bitmap
            if to_usize(dsc.glyph_index) > len {
                return Err(TableError::BitmapOffset {
                    index,
                    offset: dsc.glyph_index,
                    len,
                });
            }
        }

        Ok(())
    }
}

impl<'a> fmt::Debug for GlyphTable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlyphTable")
            .field("name", &self.name)
            .field("range", &format_args!("{:#x}..={:#x}", self.unicode_first, self.unicode_last))
            .field("bpp", &self.bpp)
            .field("monospace", &self.monospace)
            .field("sparse", &self.is_sparse())
            .field("glyphs", &self.glyph_count())
            .finish()
    }
}

/// Compare a reference code point against a list element
///
/// Returns [`Ordering::Less`] if `reference` precedes `element`,
/// [`Ordering::Equal`] on a match and [`Ordering::Greater`] if `reference`
/// follows `element`.
#[inline]
pub fn code_compare(reference: &u32, element: &u32) -> Ordering {
    if reference < element {
        Ordering::Less
    } else if reference == element {
        Ordering::Equal
    } else {
        Ordering::Greater
    }
}
