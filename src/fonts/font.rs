// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Font: a chain of glyph tables

#![allow(clippy::len_without_is_empty)]

use crate::{Bpp, GlyphTable};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

/// Default limit on the number of tables in one [`Font`]
pub const DEFAULT_MAX_PAGES: usize = 32;

/// Rejected font chain edit
///
/// The font is left unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    /// The added font shares a table with the target font
    ///
    /// A table may appear at most once within a font. This includes adding
    /// a font to itself or to a font it already extends.
    #[error("table already linked into this font")]
    SharedTable,
    /// The edit would exceed the page limit
    #[error("font chain limited to {max} tables")]
    TooLong { max: usize },
    /// The removed table is not a page of the target font
    #[error("table is not a page of this font")]
    NotLinked,
}

/// Metrics of a resolved glyph
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlyphMetrics {
    /// Per-glyph width in pixels
    pub real_width: u8,
    /// Advance width: the table's monospace width if set, else `real_width`
    pub width: u8,
    /// Bits per pixel of the resolving table
    pub bpp: Bpp,
    /// True if the resolving table has a monospace width
    pub monospace: bool,
}

/// A glyph resolved through a [`Font`]
#[derive(Copy, Clone, Debug)]
pub struct ResolvedGlyph<'a> {
    /// Index of the resolving table within the font (0 is the head)
    pub page: usize,
    /// The resolving table
    pub table: &'a GlyphTable<'a>,
    /// Bitmap data (see [`GlyphTable::bitmap`])
    pub bitmap: &'a [u8],
    /// Metrics from the resolving table
    pub metrics: GlyphMetrics,
}

/// A font
///
/// A font is an ordered list of [`GlyphTable`]s: a head table followed by
/// zero or more extension tables ("pages"). Queries visit tables in order
/// and the first table to supply a glyph wins, regardless of whether a later
/// table has a narrower range covering the same code point.
///
/// The number of tables is bounded (see [`Font::with_max_pages`]) and a table
/// appears at most once, so every query terminates.
#[derive(Clone)]
pub struct Font<'a> {
    pages: SmallVec<[&'a GlyphTable<'a>; 4]>,
    max_pages: usize,
}

impl<'a> Font<'a> {
    /// Construct a font over a single table
    #[inline]
    pub fn new(head: &'a GlyphTable<'a>) -> Self {
        Font::with_max_pages(head, DEFAULT_MAX_PAGES)
    }

    /// Construct a font with a custom page limit
    ///
    /// A limit of zero is treated as one.
    pub fn with_max_pages(head: &'a GlyphTable<'a>, max_pages: usize) -> Self {
        let mut pages = SmallVec::new();
        pages.push(head);
        Font {
            pages,
            max_pages: max_pages.max(1),
        }
    }

    /// The head table
    #[inline]
    pub fn head(&self) -> &'a GlyphTable<'a> {
        self.pages[0]
    }

    /// Iterate over tables in resolution order
    #[inline]
    pub fn pages(&self) -> impl ExactSizeIterator<Item = &'a GlyphTable<'a>> + '_ {
        self.pages.iter().copied()
    }

    /// Number of tables, including the head
    #[inline]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Page limit
    #[inline]
    pub fn max_pages(&self) -> usize {
        self.max_pages
    }

    /// Adjust the page limit
    ///
    /// Fails if the font already has more than `max_pages` tables.
    pub fn set_max_pages(&mut self, max_pages: usize) -> Result<(), ChainError> {
        let max = max_pages.max(1);
        if self.pages.len() > max {
            return Err(ChainError::TooLong { max });
        }
        self.max_pages = max;
        Ok(())
    }

    /// Position of `table` (by address) within this font
    pub fn position(&self, table: &GlyphTable) -> Option<usize> {
        self.pages.iter().position(|page| std::ptr::eq(*page, table))
    }

    /// True if `table` (by address) is part of this font
    #[inline]
    pub fn contains_table(&self, table: &GlyphTable) -> bool {
        self.position(table).is_some()
    }

    /// Extend this font with the tables of `child`
    ///
    /// The tables of `child` are appended in order after all existing tables,
    /// irrespective of their code-point ranges. Later edits to `child` do not
    /// affect `self`.
    pub fn add(&mut self, child: &Font<'a>) -> Result<(), ChainError> {
        if child.pages().any(|table| self.contains_table(table)) {
            log::warn!("Font::add: {:?} shares a table with {:?}", child.head(), self.head());
            return Err(ChainError::SharedTable);
        }
        if self.pages.len() + child.pages.len() > self.max_pages {
            log::warn!(
                "Font::add: adding {} tables to {:?} exceeds limit {}",
                child.pages.len(),
                self.head(),
                self.max_pages
            );
            return Err(ChainError::TooLong {
                max: self.max_pages,
            });
        }

        log::debug!("Font::add: {:?} -> {:?}", child.head(), self.head());
        self.pages.extend_from_slice(&child.pages);
        Ok(())
    }

    /// Remove the head table of `child` from this font
    ///
    /// Only that one table is removed: tables which followed it remain in
    /// place, and `child` itself is not modified. The head of `self` cannot
    /// be removed.
    pub fn remove(&mut self, child: &Font<'a>) -> Result<(), ChainError> {
        let table = child.head();
        match self.position(table) {
            Some(index) if index > 0 => {
                log::debug!("Font::remove: {:?} from {:?}", table, self.head());
                self.pages.remove(index);
                Ok(())
            }
            _ => {
                log::warn!("Font::remove: {:?} is not a page of {:?}", table, self.head());
                Err(ChainError::NotLinked)
            }
        }
    }

    /// Find the bitmap for `letter`
    ///
    /// Returns the bitmap of the first table with a glyph for `letter`.
    pub fn bitmap(&self, letter: impl Into<u32>) -> Option<&'a [u8]> {
        let c = letter.into();
        self.pages.iter().find_map(|table| table.bitmap(c))
    }

    /// Find the per-glyph width of `letter` in pixels
    ///
    /// Monospace widths are ignored.
    pub fn real_width(&self, letter: impl Into<u32>) -> Option<u8> {
        let c = letter.into();
        self.pages.iter().find_map(|table| table.width(c))
    }

    /// Find the advance width of `letter` in pixels
    ///
    /// If the table supplying the glyph has a monospace width, this is
    /// returned in place of the per-glyph width.
    pub fn width(&self, letter: impl Into<u32>) -> Option<u8> {
        let c = letter.into();
        self.pages.iter().find_map(|table| {
            table.width(c).map(|w| match table.monospace() {
                0 => w,
                m => m,
            })
        })
    }

    /// True if the table supplying `letter` is monospace
    ///
    /// This is false if no table has a glyph for `letter`.
    pub fn is_monospace(&self, letter: impl Into<u32>) -> bool {
        let c = letter.into();
        self.pages
            .iter()
            .find_map(|table| table.width(c).map(|_| table.monospace() != 0))
            .unwrap_or(false)
    }

    /// Find the bits-per-pixel for `letter`
    ///
    /// This selects the first table whose *range* contains `letter`, whether
    /// or not that table has a glyph for it. Where ranges overlap, this may
    /// differ from the table supplying the bitmap; use [`Font::resolve`] to
    /// get metadata from the supplying table.
    pub fn bpp(&self, letter: impl Into<u32>) -> Option<Bpp> {
        let c = letter.into();
        self.pages
            .iter()
            .find(|table| table.contains(c))
            .map(|table| table.bpp())
    }

    /// Resolve `letter` to a glyph
    ///
    /// All returned data comes from the first table with a glyph for
    /// `letter`.
    pub fn resolve(&self, letter: impl Into<u32>) -> Option<ResolvedGlyph<'a>> {
        let c = letter.into();
        self.pages
            .iter()
            .enumerate()
            .find_map(|(page, table)| {
                let glyph = table.glyph(c)?;
                let monospace = table.monospace();
                Some(ResolvedGlyph {
                    page,
                    table: *table,
                    bitmap: glyph.bitmap,
                    metrics: GlyphMetrics {
                        real_width: glyph.dsc.w_px,
                        width: if monospace != 0 { monospace } else { glyph.dsc.w_px },
                        bpp: table.bpp(),
                        monospace: monospace != 0,
                    },
                })
            })
    }
}

impl<'a> fmt::Debug for Font<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("pages", &self.pages)
            .field("max_pages", &self.max_pages)
            .finish()
    }
}
