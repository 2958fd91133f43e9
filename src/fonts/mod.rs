// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Font composition and lookup
//!
//! A [`Font`] is a list of [`GlyphTable`](crate::GlyphTable)s: the head
//! table plus extension tables ("pages") which supply glyphs the head lacks,
//! for example accented letters or a symbol set. Each table may use its own
//! layout and bit depth.
//!
//! Fonts may be used directly or be managed by the [`FontLibrary`], of which
//! a static singleton exists and can be accessed via [`library()`].
//!
//! ### Resolution
//!
//! All glyph queries visit a font's tables in order and stop at the first
//! table which has a glyph for the queried code point. The order is that in
//! which tables were added ([`Font::add`] always appends), not the order of
//! their code-point ranges.
//!
//! The one exception is [`Font::bpp`], which selects the first table whose
//! range contains the code point, whether or not that table has a glyph for
//! it. [`Font::resolve`] returns the bit depth of the table which actually
//! supplies the glyph.
//!
//! ### Monospace
//!
//! A table with a non-zero monospace width reports that width from
//! [`Font::width`] for every glyph it supplies. [`Font::real_width`] always
//! reports the per-glyph width.

mod font;
mod library;

pub use font::{ChainError, Font, GlyphMetrics, ResolvedGlyph, DEFAULT_MAX_PAGES};
pub use library::{
    library, BuiltinFonts, FontId, FontLibrary, InvalidFontId, InvalidTableId, LibraryError,
    TableId,
};
