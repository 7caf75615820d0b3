//! AcadNusx to Unicode Georgian character mapping.
//!
//! AcadNusx is a legacy 8-bit glyph font: ordinary Latin keycodes render as
//! Mkhedruli glyph shapes only because the font maps them so. This module
//! holds the fixed keycode-to-letter table and the per-character conversion
//! built on it.
//!
//! Uses `phf` for a compile-time perfect-hash lookup table.

use phf::phf_map;

/// Mapping from AcadNusx keycodes to Mkhedruli Georgian letters.
///
/// Case is significant and entries are independent: an uppercase keycode is a
/// distinct letter, not a case variant of its lowercase counterpart (e.g.
/// 't' is ტ while 'T' is თ). Keycodes outside this table have no Georgian
/// meaning in the encoding and pass through unchanged.
static ACADNUSX_TO_GEORGIAN: phf::Map<char, char> = phf_map! {
    'a' => 'ა', 'b' => 'ბ', 'c' => 'ც', 'd' => 'დ', 'e' => 'ე',
    'f' => 'ფ', 'g' => 'გ', 'h' => 'ჰ', 'i' => 'ი', 'j' => 'ჯ',
    'k' => 'კ', 'l' => 'ლ', 'm' => 'მ', 'n' => 'ნ', 'o' => 'ო',
    'p' => 'პ', 'q' => 'ქ', 'r' => 'რ', 's' => 'ს', 't' => 'ტ',
    'u' => 'უ', 'v' => 'ვ', 'w' => 'წ', 'x' => 'ხ', 'y' => 'ყ',
    'z' => 'ზ',
    'W' => 'ჭ', 'R' => 'ღ', 'Z' => 'ძ', 'C' => 'ჩ', 'J' => 'ჟ',
    'S' => 'შ', 'T' => 'თ',
};

/// Map a single AcadNusx character to its Georgian letter.
///
/// Total and deterministic: characters outside the table (digits,
/// punctuation, whitespace, already-Georgian text) are returned unchanged.
#[inline]
pub fn map_char(c: char) -> char {
    ACADNUSX_TO_GEORGIAN.get(&c).copied().unwrap_or(c)
}

/// Map a whole string character by character.
///
/// The output always has the same character count as the input.
pub fn map_text(text: &str) -> String {
    text.chars().map(map_char).collect()
}
