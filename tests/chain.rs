// Font chain resolution and composition through the public API

use kas_bitfont::fonts::{BuiltinFonts, ChainError, Font, FontLibrary, LibraryError};
use kas_bitfont::{Bpp, GlyphDsc, GlyphTable};

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

static BITMAP: [u8; 16] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,
];

// 'A'..='E', widths 1..=5, 2 bytes per glyph
static LATIN_DSC: [GlyphDsc; 5] = [
    GlyphDsc::new(1, 0),
    GlyphDsc::new(2, 2),
    GlyphDsc::new(3, 4),
    GlyphDsc::new(4, 6),
    GlyphDsc::new(5, 8),
];
static LATIN: GlyphTable<'static> =
    GlyphTable::continuous(0x41, 0x45, Bpp::One, &LATIN_DSC, &BITMAP).with_name("latin");

// Overlaps LATIN on 'D' and 'E'
static WIDE_DSC: [GlyphDsc; 4] = [
    GlyphDsc::new(10, 1),
    GlyphDsc::new(11, 3),
    GlyphDsc::new(12, 5),
    GlyphDsc::new(13, 7),
];
static WIDE: GlyphTable<'static> =
    GlyphTable::continuous(0x44, 0x47, Bpp::Eight, &WIDE_DSC, &BITMAP).with_name("wide");

static SPARSE_DSC: [GlyphDsc; 3] = [
    GlyphDsc::new(6, 0),
    GlyphDsc::new(7, 4),
    GlyphDsc::new(8, 12),
];
static SPARSE: GlyphTable<'static> =
    GlyphTable::sparse(65, 200, Bpp::Two, &[65, 90, 200], &SPARSE_DSC, &BITMAP).with_name("sparse");

static MONO_DSC: [GlyphDsc; 1] = [GlyphDsc::new(7, 0)];
static MONO: GlyphTable<'static> = GlyphTable::continuous(0x30, 0x30, Bpp::Four, &MONO_DSC, &BITMAP)
    .with_monospace(12)
    .with_name("mono");

fn names<'a>(font: &Font<'a>) -> Vec<&'a str> {
    font.pages().map(|table| table.name()).collect()
}

#[test]
fn tables_are_valid() {
    for table in [&LATIN, &WIDE, &SPARSE, &MONO] {
        assert_eq!(table.validate(), Ok(()), "{table:?}");
    }
}

#[test]
fn chain_order_determinism() {
    init_log();
    let mut latin_first = Font::new(&LATIN);
    latin_first.add(&Font::new(&WIDE)).unwrap();
    assert_eq!(latin_first.real_width('D'), Some(4));
    assert_eq!(latin_first.bitmap('E'), Some(&BITMAP[8..]));

    let mut wide_first = Font::new(&WIDE);
    wide_first.add(&Font::new(&LATIN)).unwrap();
    assert_eq!(wide_first.real_width('D'), Some(10));
    assert_eq!(wide_first.bitmap('E'), Some(&BITMAP[3..]));

    // Non-overlapping code points resolve through whichever table has them
    assert_eq!(latin_first.real_width('G'), Some(13));
    assert_eq!(wide_first.real_width('A'), Some(1));
}

#[test]
fn continuous_round_trip() {
    let font = Font::new(&LATIN);
    for c in LATIN.range() {
        let dsc = LATIN_DSC[(c - LATIN.unicode_first()) as usize];
        assert_eq!(font.real_width(c), Some(dsc.w_px));
        assert_eq!(font.bitmap(c), Some(&BITMAP[dsc.glyph_index as usize..]));
    }
}

#[test]
fn sparse_correctness() {
    let font = Font::new(&SPARSE);
    assert_eq!(font.bitmap(66u32), None);
    assert_eq!(font.real_width(66u32), None);
    assert_eq!(font.real_width(90u32), Some(7));
    assert_eq!(font.bitmap(90u32), Some(&BITMAP[4..]));
    assert_eq!(font.real_width(64u32), None);
    assert_eq!(font.real_width(200u32), Some(8));
}

#[test]
fn monospace_override() {
    let mut font = Font::new(&LATIN);
    font.add(&Font::new(&MONO)).unwrap();
    assert_eq!(font.width('0'), Some(12));
    assert_eq!(font.real_width('0'), Some(7));
    assert!(font.is_monospace('0'));

    assert_eq!(font.width('A'), Some(1));
    assert!(!font.is_monospace('A'));

    let metrics = font.resolve('0').unwrap().metrics;
    assert_eq!(metrics.width, 12);
    assert_eq!(metrics.real_width, 7);
    assert!(metrics.monospace);
}

#[test]
fn composition_append_order() {
    let mut a = Font::new(&LATIN);
    assert_eq!(names(&a), ["latin"]);
    a.add(&Font::new(&WIDE)).unwrap();
    assert_eq!(names(&a), ["latin", "wide"]);
    a.add(&Font::new(&SPARSE)).unwrap();
    assert_eq!(names(&a), ["latin", "wide", "sparse"]);
}

#[test]
fn add_splices_whole_child_chain() {
    let mut child = Font::new(&WIDE);
    child.add(&Font::new(&SPARSE)).unwrap();
    let mut a = Font::new(&LATIN);
    a.add(&child).unwrap();
    assert_eq!(names(&a), ["latin", "wide", "sparse"]);

    // Later edits to the child do not reach the parent
    child.add(&Font::new(&MONO)).unwrap();
    assert_eq!(a.len(), 3);
    assert_eq!(a.width('0'), None);
}

#[test]
fn removal_splice() {
    init_log();
    let b = Font::new(&WIDE);
    let mut b_chain = b.clone();
    b_chain.add(&Font::new(&SPARSE)).unwrap();

    let mut a = Font::new(&LATIN);
    a.add(&b).unwrap();
    a.add(&Font::new(&SPARSE)).unwrap();
    assert_eq!(names(&a), ["latin", "wide", "sparse"]);

    a.remove(&b_chain).unwrap();
    assert_eq!(names(&a), ["latin", "sparse"]);
    // The removed font keeps its own chain
    assert_eq!(names(&b_chain), ["wide", "sparse"]);

    assert_eq!(a.remove(&b), Err(ChainError::NotLinked));
}

#[test]
fn shared_table_add_rejected() {
    let mut a = Font::new(&LATIN);
    a.add(&Font::new(&WIDE)).unwrap();
    let mut b = Font::new(&WIDE);
    assert_eq!(b.add(&a), Err(ChainError::SharedTable));
    assert_eq!(names(&b), ["wide"]);
    assert_eq!(a.add(&Font::new(&LATIN)), Err(ChainError::SharedTable));
}

#[test]
fn not_found_propagation() {
    let mut font = Font::new(&LATIN);
    font.add(&Font::new(&SPARSE)).unwrap();
    let c = 0x1F600u32;
    assert_eq!(font.bitmap(c), None);
    assert_eq!(font.width(c), None);
    assert_eq!(font.real_width(c), None);
    assert!(!font.is_monospace(c));
    assert_eq!(font.bpp(c), None);
    assert!(font.resolve(c).is_none());
}

#[test]
fn bpp_by_range_containment() {
    let mut font = Font::new(&SPARSE);
    font.add(&Font::new(&WIDE)).unwrap();
    // 'F' is inside SPARSE's range but only WIDE has a glyph
    assert_eq!(font.bpp('F'), Some(Bpp::Two));
    let glyph = font.resolve('F').unwrap();
    assert_eq!(glyph.page, 1);
    assert_eq!(glyph.metrics.bpp, Bpp::Eight);
    assert_eq!(glyph.table.name(), "wide");
}

struct Builtin;
impl BuiltinFonts for Builtin {
    fn register(&self, library: &FontLibrary) -> Result<(), LibraryError> {
        let latin = library.add_font(&LATIN)?;
        let mono = library.add_font(&MONO)?;
        library.add(mono, latin)
    }
}

#[test]
fn library_queries() {
    init_log();
    let lib = FontLibrary::new();
    lib.init(&Builtin).unwrap();
    assert_eq!(lib.num_tables(), 2);
    assert_eq!(lib.num_fonts(), 2);

    let latin = lib.add_font(&LATIN).unwrap();
    let sparse = lib.add_font(&SPARSE).unwrap();
    lib.add(sparse, latin).unwrap();
    assert_eq!(lib.num_tables(), 3);

    assert_eq!(lib.real_width(latin, 'Z'), Ok(Some(7)));
    assert_eq!(lib.width(latin, 'A'), Ok(Some(1)));
    assert_eq!(lib.bpp(latin, 'Z'), Ok(Some(Bpp::Two)));
    assert_eq!(lib.is_monospace(latin, 'A'), Ok(false));
    assert_eq!(lib.bitmap(latin, 'Z'), Ok(Some(&BITMAP[4..])));

    lib.remove(sparse, latin).unwrap();
    assert_eq!(lib.real_width(latin, 'Z'), Ok(None));
    assert_eq!(
        lib.remove(sparse, latin),
        Err(LibraryError::Chain(ChainError::NotLinked))
    );
}

#[test]
fn library_page_limit() {
    let lib = FontLibrary::new();
    lib.set_max_pages(2);
    let latin = lib.add_font(&LATIN).unwrap();
    let wide = lib.add_font(&WIDE).unwrap();
    let sparse = lib.add_font(&SPARSE).unwrap();
    lib.add(wide, latin).unwrap();
    assert_eq!(
        lib.add(sparse, latin),
        Err(LibraryError::Chain(ChainError::TooLong { max: 2 }))
    );
    assert_eq!(lib.get_font(latin).unwrap().len(), 2);
}
