// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Per-table glyph lookup
//!
//! The lookup strategy is selected by the table's [`Layout`]:
//!
//! -   [`Layout::Continuous`]: O(1), the descriptor index is the offset of
//!     the code point from the start of the range
//! -   [`Layout::Sparse`]: O(log n), binary search of the code point list
//!
//! Both strategies reject code points outside of the table's range before
//! touching any glyph data.

use crate::conv::to_usize;
use crate::table::{code_compare, GlyphDsc, GlyphTable, Layout};

/// A glyph found within a single table
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TableGlyph<'a> {
    /// Index of the glyph's descriptor
    pub index: usize,
    /// The glyph's descriptor
    pub dsc: GlyphDsc,
    /// Bitmap data, starting at the glyph's offset and running to the end of
    /// the table's bitmap buffer
    pub bitmap: &'a [u8],
}

#[inline]
fn continuous_index(table: &GlyphTable, c: u32) -> Option<usize> {
    if !table.contains(c) {
        return None;
    }
    Some(to_usize(c - table.unicode_first()))
}

#[inline]
fn sparse_index(table: &GlyphTable, unicode_list: &[u32], c: u32) -> Option<usize> {
    if !table.contains(c) {
        return None;
    }
    // binary_search_by wants the ordering of the element relative to `c`
    unicode_list
        .binary_search_by(|element| code_compare(&c, element).reverse())
        .ok()
}

impl<'a> GlyphTable<'a> {
    /// Find the descriptor index for `c`
    ///
    /// Returns `None` if `c` is outside of the table's range or (for sparse
    /// tables) not listed.
    pub fn index_of(&self, c: u32) -> Option<usize> {
        match self.layout() {
            Layout::Continuous => continuous_index(self, c),
            Layout::Sparse { unicode_list } => sparse_index(self, unicode_list, c),
        }
    }

    /// Find the glyph descriptor for `c`
    pub fn descriptor(&self, c: u32) -> Option<&'a GlyphDsc> {
        self.index_of(c).and_then(|index| self.descriptor_at(index, c))
    }

    fn descriptor_at(&self, index: usize, c: u32) -> Option<&'a GlyphDsc> {
        let dsc = self.glyph_dsc().get(index);
        if dsc.is_none() {
            log::warn!("{:?}: no descriptor at index {index} for {c:#x}", self);
        }
        dsc
    }

    /// Find the width in pixels of the glyph for `c`
    ///
    /// This is the raw per-glyph width; [`GlyphTable::monospace`] is not
    /// applied.
    #[inline]
    pub fn width(&self, c: u32) -> Option<u8> {
        self.descriptor(c).map(|dsc| dsc.w_px)
    }

    /// Find the bitmap of the glyph for `c`
    ///
    /// The returned slice starts at the glyph's data and runs to the end of
    /// the table's bitmap buffer; its extent is determined by the renderer
    /// from the glyph's size and the table's [`Bpp`](crate::Bpp).
    pub fn bitmap(&self, c: u32) -> Option<&'a [u8]> {
        self.glyph(c).map(|glyph| glyph.bitmap)
    }

    /// Find the glyph for `c`
    pub fn glyph(&self, c: u32) -> Option<TableGlyph<'a>> {
        let index = self.index_of(c)?;
        let dsc = *self.descriptor_at(index, c)?;
        let Some(bitmap) = self.glyph_bitmap().get(to_usize(dsc.glyph_index)..) else {
            log::warn!(
                "{:?}: bitmap offset {} out of bounds for {c:#x}",
                self,
                dsc.glyph_index
            );
            return None;
        };
        Some(TableGlyph { index, dsc, bitmap })
    }
}
