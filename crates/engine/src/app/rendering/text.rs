pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;

const FIRST_GLYPH: u32 = ' ' as u32;
const LAST_GLYPH: u32 = '~' as u32;

/// 3x5 glyphs for printable ASCII, indexed from `' '`. Each glyph packs its
/// five 3-bit rows top to bottom, leftmost pixel in the high bit of a row.
const GLYPHS: [u16; 95] = [
    0x0000, 0x2482, 0x5a00, 0x5f7d, 0x7ddf, 0x52a5, 0x2aab, 0x2400,
    0x1491, 0x4494, 0x0aa8, 0x05d0, 0x0014, 0x01c0, 0x0002, 0x12a4,
    0x7b6f, 0x2c97, 0x73e7, 0x73cf, 0x5bc9, 0x79cf, 0x79ef, 0x7292,
    0x7bef, 0x7bcf, 0x0410, 0x0414, 0x1511, 0x0e38, 0x4454, 0x72c2,
    0x7be7, 0x2bed, 0x6bae, 0x7927, 0x6b6e, 0x79a7, 0x79a4, 0x796f,
    0x5bed, 0x7497, 0x726f, 0x5bad, 0x4927, 0x5fed, 0x5ffd, 0x7b6f,
    0x6ba4, 0x7b79, 0x6bad, 0x79cf, 0x7492, 0x5b6f, 0x5b6a, 0x5bfd,
    0x5aad, 0x5a92, 0x72a7, 0x6926, 0x4889, 0x324b, 0x2a00, 0x0007,
    0x4400, 0x0e7f, 0x49ae, 0x0f27, 0x13ef, 0x0fa7, 0x39a4, 0x0f79,
    0x49ad, 0x2092, 0x106a, 0x4bad, 0x4927, 0x0ded, 0x0d6d, 0x0f6f,
    0x0d74, 0x0f79, 0x0d64, 0x0f8f, 0x2e93, 0x0b6f, 0x0b6a, 0x0b7a,
    0x0a95, 0x0b79, 0x0e57, 0x3593, 0x2492, 0x64d6, 0x0780,
];

pub(crate) fn glyph_rows(ch: char) -> Option<[u8; GLYPH_HEIGHT as usize]> {
    let code = ch as u32;
    if !(FIRST_GLYPH..=LAST_GLYPH).contains(&code) {
        return None;
    }
    let packed = GLYPHS[(code - FIRST_GLYPH) as usize];
    let mut rows = [0u8; GLYPH_HEIGHT as usize];
    for (index, row) in rows.iter_mut().enumerate() {
        let shift = (GLYPH_HEIGHT as usize - 1 - index) * GLYPH_WIDTH as usize;
        *row = ((packed >> shift) & 0b111) as u8;
    }
    Some(rows)
}

/// Horizontal advance of one glyph cell, including its one-pixel gap.
pub(crate) fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_WIDTH + 1) * scale
}

pub fn text_width(text: &str, scale: i32) -> i32 {
    let count = text.chars().count() as i32;
    if count == 0 {
        return 0;
    }
    count * glyph_advance(scale) - scale
}
