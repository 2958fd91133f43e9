// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! KAS bitmap-font library
//!
//! This library resolves glyph metadata for pre-compiled bitmap fonts: given
//! a font and a code point it finds the table defining the glyph and returns
//! the glyph's bitmap, width and bit depth. It does not rasterize, decompress
//! or cache glyphs.
//!
//! ```
//! use kas_bitfont::{fonts::Font, Bpp, GlyphDsc, GlyphTable};
//!
//! static DIGITS_DSC: [GlyphDsc; 2] = [GlyphDsc::new(5, 0), GlyphDsc::new(4, 7)];
//! static DIGITS: GlyphTable<'static> =
//!     GlyphTable::continuous(0x30, 0x31, Bpp::One, &DIGITS_DSC, &[0; 14]).with_monospace(6);
//!
//! static SYMBOLS_DSC: [GlyphDsc; 1] = [GlyphDsc::new(8, 0)];
//! static SYMBOLS: GlyphTable<'static> =
//!     GlyphTable::sparse(0x2000, 0x20ff, Bpp::Four, &[0x20ac], &SYMBOLS_DSC, &[0; 64]);
//!
//! let mut font = Font::new(&DIGITS);
//! font.add(&Font::new(&SYMBOLS)).unwrap();
//!
//! assert_eq!(font.width('1'), Some(6));
//! assert_eq!(font.real_width('1'), Some(4));
//! assert_eq!(font.width('€'), Some(8));
//! assert_eq!(font.bpp('€'), Some(Bpp::Four));
//! assert_eq!(font.bitmap('x'), None);
//! ```

mod conv;
pub mod fonts;
mod lookup;
mod table;

pub use lookup::TableGlyph;
pub use table::*;
