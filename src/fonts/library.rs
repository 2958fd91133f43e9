// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Font library

use super::{ChainError, Font, ResolvedGlyph, DEFAULT_MAX_PAGES};
use crate::conv::{to_usize, try_to_u32};
use crate::{Bpp, GlyphTable, TableError};
use std::sync::{LazyLock, OnceLock, RwLock};
use thiserror::Error;

/// Bad [`FontId`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid FontId")]
pub struct InvalidFontId;

/// Bad [`TableId`]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid TableId")]
pub struct InvalidTableId;

/// Font library errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("invalid glyph table")]
    Table(#[from] TableError),
    #[error("font chain edit rejected")]
    Chain(#[from] ChainError),
    #[error(transparent)]
    InvalidFontId(#[from] InvalidFontId),
    #[error(transparent)]
    InvalidTableId(#[from] InvalidTableId),
    #[error("library is full")]
    Full,
}

/// Glyph table identifier
///
/// Identifies a registered table within the [`FontLibrary`] by index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableId(u32);
impl TableId {
    /// Get as `usize`
    pub fn get(self) -> usize {
        to_usize(self.0)
    }
}

/// Font identifier
///
/// Identifies a font (head table plus pages) within the [`FontLibrary`] by
/// index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FontId(u32);
impl FontId {
    /// Get as `usize`
    pub fn get(self) -> usize {
        to_usize(self.0)
    }
}

/// Provider of built-in fonts
///
/// Implemented by whatever registers the application's compiled-in fonts;
/// see [`FontLibrary::init`].
pub trait BuiltinFonts {
    /// Register tables and compose fonts
    fn register(&self, library: &FontLibrary) -> Result<(), LibraryError>;
}

#[derive(Default)]
struct TableList {
    tables: Vec<&'static GlyphTable<'static>>,
}

impl TableList {
    fn push(&mut self, table: &'static GlyphTable<'static>) -> Result<TableId, LibraryError> {
        let id = TableId(try_to_u32(self.tables.len()).ok_or(LibraryError::Full)?);
        self.tables.push(table);
        Ok(id)
    }
}

struct FontList {
    fonts: Vec<Font<'static>>,
    max_pages: usize,
}

impl FontList {
    fn push(&mut self, font: Font<'static>) -> Result<FontId, LibraryError> {
        let id = FontId(try_to_u32(self.fonts.len()).ok_or(LibraryError::Full)?);
        self.fonts.push(font);
        Ok(id)
    }

    fn get(&self, id: FontId) -> Result<&Font<'static>, InvalidFontId> {
        self.fonts.get(id.get()).ok_or(InvalidFontId)
    }
}

/// Library of glyph tables and fonts
///
/// This is the type of the global singleton accessible via the [`library()`]
/// function; independent instances may be constructed with
/// [`FontLibrary::new`]. Thread-safety is handled via internal locks: queries
/// take a read lock while [`FontLibrary::add`] and [`FontLibrary::remove`]
/// take a write lock, thus edits never race with lookups.
pub struct FontLibrary {
    tables: RwLock<TableList>,
    fonts: RwLock<FontList>,
    initialized: OnceLock<Result<(), LibraryError>>,
}

impl Default for FontLibrary {
    fn default() -> Self {
        FontLibrary::new()
    }
}

/// Setup
impl FontLibrary {
    /// Construct an empty library
    pub fn new() -> Self {
        FontLibrary {
            tables: Default::default(),
            fonts: RwLock::new(FontList {
                fonts: vec![],
                max_pages: DEFAULT_MAX_PAGES,
            }),
            initialized: OnceLock::new(),
        }
    }

    /// Register built-in fonts
    ///
    /// Must be called before any lookup of built-in fonts. Only the first
    /// call runs `builtin`. Concurrent callers block until it completes, and
    /// every call returns the result of that first registration, including a
    /// failure. `builtin` must not call `init` on the same library.
    pub fn init(&self, builtin: &dyn BuiltinFonts) -> Result<(), LibraryError> {
        let mut ran = false;
        let result = self.initialized.get_or_init(|| {
            ran = true;
            match builtin.register(self) {
                Ok(()) => {
                    log::info!(
                        "Registered {} glyph tables, {} fonts",
                        self.num_tables(),
                        self.num_fonts()
                    );
                    Ok(())
                }
                Err(err) => {
                    log::error!("Failed to register built-in fonts: {err}");
                    Err(err)
                }
            }
        });
        if !ran {
            log::debug!("FontLibrary::init: already initialized");
        }
        result.clone()
    }

    /// True once [`FontLibrary::init`] has completed
    ///
    /// This is also true if registration failed.
    pub fn is_initialized(&self) -> bool {
        self.initialized.get().is_some()
    }

    /// Set the page limit of fonts created after this call
    pub fn set_max_pages(&self, max_pages: usize) {
        self.fonts.write().unwrap().max_pages = max_pages.max(1);
    }
}

/// Table management
impl FontLibrary {
    /// Register a glyph table
    ///
    /// The table is validated first. Registering the same table (by address)
    /// twice returns the existing identifier.
    pub fn add_table(&self, table: &'static GlyphTable<'static>) -> Result<TableId, LibraryError> {
        let mut tables = self.tables.write().unwrap();
        if let Some(index) = tables.tables.iter().position(|t| std::ptr::eq(*t, table)) {
            return Ok(TableId(try_to_u32(index).ok_or(LibraryError::Full)?));
        }

        table.validate().inspect_err(|err| {
            log::warn!("FontLibrary::add_table: {table:?}: {err}");
        })?;

        log::debug!("FontLibrary::add_table: {table:?}");
        tables.push(table)
    }

    /// Get a registered table
    pub fn get_table(&self, id: TableId) -> Result<&'static GlyphTable<'static>, InvalidTableId> {
        let tables = self.tables.read().unwrap();
        tables.tables.get(id.get()).copied().ok_or(InvalidTableId)
    }

    /// Number of registered tables
    pub fn num_tables(&self) -> usize {
        self.tables.read().unwrap().tables.len()
    }
}

/// Font management
impl FontLibrary {
    /// Create a font over a single registered table
    pub fn new_font(&self, head: TableId) -> Result<FontId, LibraryError> {
        let table = self.get_table(head)?;
        let mut fonts = self.fonts.write().unwrap();
        let font = Font::with_max_pages(table, fonts.max_pages);
        fonts.push(font)
    }

    /// Register and validate `table`, then create a font over it
    pub fn add_font(&self, table: &'static GlyphTable<'static>) -> Result<FontId, LibraryError> {
        let id = self.add_table(table)?;
        self.new_font(id)
    }

    /// Get a copy of a font
    pub fn get_font(&self, id: FontId) -> Result<Font<'static>, InvalidFontId> {
        self.fonts.read().unwrap().get(id).cloned()
    }

    /// Number of fonts
    pub fn num_fonts(&self) -> usize {
        self.fonts.read().unwrap().fonts.len()
    }

    /// Extend `parent` with the tables of `child`
    ///
    /// See [`Font::add`].
    pub fn add(&self, child: FontId, parent: FontId) -> Result<(), LibraryError> {
        let mut fonts = self.fonts.write().unwrap();
        let child = fonts.get(child)?.clone();
        let parent = fonts.fonts.get_mut(parent.get()).ok_or(InvalidFontId)?;
        Ok(parent.add(&child)?)
    }

    /// Remove the head table of `child` from `parent`
    ///
    /// See [`Font::remove`].
    pub fn remove(&self, child: FontId, parent: FontId) -> Result<(), LibraryError> {
        let mut fonts = self.fonts.write().unwrap();
        let child = fonts.get(child)?.clone();
        let parent = fonts.fonts.get_mut(parent.get()).ok_or(InvalidFontId)?;
        Ok(parent.remove(&child)?)
    }

    fn with_font<R>(
        &self,
        id: FontId,
        f: impl FnOnce(&Font<'static>) -> R,
    ) -> Result<R, InvalidFontId> {
        let fonts = self.fonts.read().unwrap();
        fonts.get(id).map(f)
    }
}

/// Glyph queries
///
/// These forward to the [`Font`] methods of the same name.
impl FontLibrary {
    /// See [`Font::bitmap`]
    pub fn bitmap(
        &self,
        font: FontId,
        letter: impl Into<u32>,
    ) -> Result<Option<&'static [u8]>, InvalidFontId> {
        self.with_font(font, |f| f.bitmap(letter))
    }

    /// See [`Font::width`]
    pub fn width(
        &self,
        font: FontId,
        letter: impl Into<u32>,
    ) -> Result<Option<u8>, InvalidFontId> {
        self.with_font(font, |f| f.width(letter))
    }

    /// See [`Font::real_width`]
    pub fn real_width(
        &self,
        font: FontId,
        letter: impl Into<u32>,
    ) -> Result<Option<u8>, InvalidFontId> {
        self.with_font(font, |f| f.real_width(letter))
    }

    /// See [`Font::is_monospace`]
    pub fn is_monospace(
        &self,
        font: FontId,
        letter: impl Into<u32>,
    ) -> Result<bool, InvalidFontId> {
        self.with_font(font, |f| f.is_monospace(letter))
    }

    /// See [`Font::bpp`]
    pub fn bpp(
        &self,
        font: FontId,
        letter: impl Into<u32>,
    ) -> Result<Option<Bpp>, InvalidFontId> {
        self.with_font(font, |f| f.bpp(letter))
    }

    /// See [`Font::resolve`]
    pub fn resolve(
        &self,
        font: FontId,
        letter: impl Into<u32>,
    ) -> Result<Option<ResolvedGlyph<'static>>, InvalidFontId> {
        self.with_font(font, |f| f.resolve(letter))
    }
}

static LIBRARY: LazyLock<FontLibrary> = LazyLock::new(FontLibrary::new);

/// Access the [`FontLibrary`] singleton
pub fn library() -> &'static FontLibrary {
    &LIBRARY
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::GlyphDsc;
    use std::time::Duration;

    static DSC: [GlyphDsc; 2] = [GlyphDsc::new(3, 0), GlyphDsc::new(4, 1)];
    static BITMAP: [u8; 2] = [0xAA, 0x55];
    static LATIN: GlyphTable<'static> =
        GlyphTable::continuous(0x61, 0x62, Bpp::One, &DSC, &BITMAP).with_name("latin");
    static BROKEN: GlyphTable<'static> =
        GlyphTable::continuous(0x61, 0x63, Bpp::One, &DSC, &BITMAP).with_name("broken");

    #[test]
    fn table_dedup() {
        let lib = FontLibrary::new();
        let a = lib.add_table(&LATIN).unwrap();
        let b = lib.add_table(&LATIN).unwrap();
        assert_eq!(a, b);
        assert_eq!(lib.num_tables(), 1);
    }

    #[test]
    fn rejects_invalid_table() {
        let lib = FontLibrary::new();
        assert!(matches!(
            lib.add_table(&BROKEN),
            Err(LibraryError::Table(TableError::DescriptorCount { .. }))
        ));
        assert_eq!(lib.num_tables(), 0);
    }

    #[test]
    fn invalid_ids() {
        let lib = FontLibrary::new();
        assert_eq!(
            lib.new_font(TableId(0)),
            Err(LibraryError::InvalidTableId(InvalidTableId))
        );
        assert_eq!(lib.width(FontId(3), 'a'), Err(InvalidFontId));
        let font = lib.add_font(&LATIN).unwrap();
        assert_eq!(
            lib.add(FontId(9), font),
            Err(LibraryError::InvalidFontId(InvalidFontId))
        );
    }

    #[test]
    fn self_add_rejected() {
        let lib = FontLibrary::new();
        let font = lib.add_font(&LATIN).unwrap();
        assert_eq!(
            lib.add(font, font),
            Err(LibraryError::Chain(ChainError::SharedTable))
        );
        assert_eq!(lib.get_font(font).unwrap().len(), 1);
    }

    struct Builtin;
    impl BuiltinFonts for Builtin {
        fn register(&self, library: &FontLibrary) -> Result<(), LibraryError> {
            library.add_font(&LATIN).map(|_| ())
        }
    }

    #[test]
    fn init_once() {
        let lib = FontLibrary::new();
        assert!(!lib.is_initialized());
        lib.init(&Builtin).unwrap();
        lib.init(&Builtin).unwrap();
        assert!(lib.is_initialized());
        assert_eq!(lib.num_fonts(), 1);
    }

    struct SlowBuiltin;
    impl BuiltinFonts for SlowBuiltin {
        fn register(&self, library: &FontLibrary) -> Result<(), LibraryError> {
            std::thread::sleep(Duration::from_millis(200));
            library.add_font(&LATIN).map(|_| ())
        }
    }

    #[test]
    fn concurrent_init_waits_for_registration() {
        let lib = FontLibrary::new();
        std::thread::scope(|s| {
            let first = s.spawn(|| lib.init(&SlowBuiltin));
            std::thread::sleep(Duration::from_millis(50));
            assert_eq!(lib.init(&SlowBuiltin), Ok(()));
            assert_eq!(lib.num_fonts(), 1);
            assert!(lib.is_initialized());
            assert_eq!(first.join().unwrap(), Ok(()));
        });
        assert_eq!(lib.num_fonts(), 1);
    }

    struct FailingBuiltin;
    impl BuiltinFonts for FailingBuiltin {
        fn register(&self, library: &FontLibrary) -> Result<(), LibraryError> {
            library.add_font(&BROKEN).map(|_| ())
        }
    }

    #[test]
    fn init_failure_is_sticky() {
        let lib = FontLibrary::new();
        let err = lib.init(&FailingBuiltin).unwrap_err();
        assert!(matches!(err, LibraryError::Table(_)));
        assert!(lib.is_initialized());
        assert_eq!(lib.init(&Builtin), Err(err));
        assert_eq!(lib.num_fonts(), 0);
    }
}
