use super::raster::{Canvas, Rgba};

pub const GLYPH_COLS: i32 = 3;
pub const GLYPH_ROWS: i32 = 5;

/// Packs a 3x5 pattern (`#` = lit) into the low 15 bits, top row first.
const fn glyph(rows: [&str; GLYPH_ROWS as usize]) -> u16 {
    let mut bits = 0u16;
    let mut row = 0;
    while row < GLYPH_ROWS as usize {
        let cells = rows[row].as_bytes();
        let mut col = 0;
        while col < GLYPH_COLS as usize {
            bits <<= 1;
            if cells[col] == b'#' {
                bits |= 1;
            }
            col += 1;
        }
        row += 1;
    }
    bits
}

const FALLBACK: u16 = glyph(["##.", "..#", ".#.", "...", ".#."]);

const FONT: [(char, u16); 62] = [
    ('0', glyph(["###", "#.#", "#.#", "#.#", "###"])),
    ('1', glyph([".#.", "##.", ".#.", ".#.", "###"])),
    ('2', glyph(["##.", "..#", ".#.", "#..", "###"])),
    ('3', glyph(["##.", "..#", ".#.", "..#", "##."])),
    ('4', glyph(["#.#", "#.#", "###", "..#", "..#"])),
    ('5', glyph(["###", "#..", "##.", "..#", "##."])),
    ('6', glyph([".##", "#..", "###", "#.#", "###"])),
    ('7', glyph(["###", "..#", ".#.", ".#.", ".#."])),
    ('8', glyph(["###", "#.#", "###", "#.#", "###"])),
    ('9', glyph(["###", "#.#", "###", "..#", "##."])),
    ('A', glyph([".#.", "#.#", "###", "#.#", "#.#"])),
    ('B', glyph(["##.", "#.#", "##.", "#.#", "##."])),
    ('C', glyph([".##", "#..", "#..", "#..", ".##"])),
    ('D', glyph(["##.", "#.#", "#.#", "#.#", "##."])),
    ('E', glyph(["###", "#..", "##.", "#..", "###"])),
    ('F', glyph(["###", "#..", "##.", "#..", "#.."])),
    ('G', glyph([".##", "#..", "#.#", "#.#", ".##"])),
    ('H', glyph(["#.#", "#.#", "###", "#.#", "#.#"])),
    ('I', glyph(["###", ".#.", ".#.", ".#.", "###"])),
    ('J', glyph(["..#", "..#", "..#", "#.#", ".#."])),
    ('K', glyph(["#.#", "#.#", "##.", "#.#", "#.#"])),
    ('L', glyph(["#..", "#..", "#..", "#..", "###"])),
    ('M', glyph(["#.#", "###", "###", "#.#", "#.#"])),
    ('N', glyph(["##.", "#.#", "#.#", "#.#", "#.#"])),
    ('O', glyph([".#.", "#.#", "#.#", "#.#", ".#."])),
    ('P', glyph(["##.", "#.#", "##.", "#..", "#.."])),
    ('Q', glyph([".#.", "#.#", "#.#", "##.", ".##"])),
    ('R', glyph(["##.", "#.#", "##.", "#.#", "#.#"])),
    ('S', glyph([".##", "#..", ".#.", "..#", "##."])),
    ('T', glyph(["###", ".#.", ".#.", ".#.", ".#."])),
    ('U', glyph(["#.#", "#.#", "#.#", "#.#", "###"])),
    ('V', glyph(["#.#", "#.#", "#.#", "#.#", ".#."])),
    ('W', glyph(["#.#", "#.#", "###", "###", "#.#"])),
    ('X', glyph(["#.#", "#.#", ".#.", "#.#", "#.#"])),
    ('Y', glyph(["#.#", "#.#", ".#.", ".#.", ".#."])),
    ('Z', glyph(["###", "..#", ".#.", "#..", "###"])),
    (' ', glyph(["...", "...", "...", "...", "..."])),
    ('.', glyph(["...", "...", "...", "...", ".#."])),
    (',', glyph(["...", "...", "...", ".#.", "#.."])),
    (':', glyph(["...", ".#.", "...", ".#.", "..."])),
    (';', glyph(["...", ".#.", "...", ".#.", "#.."])),
    ('-', glyph(["...", "...", "###", "...", "..."])),
    ('+', glyph(["...", ".#.", "###", ".#.", "..."])),
    ('=', glyph(["...", "###", "...", "###", "..."])),
    ('/', glyph(["..#", "..#", ".#.", "#..", "#.."])),
    ('(', glyph(["..#", ".#.", ".#.", ".#.", "..#"])),
    (')', glyph(["#..", ".#.", ".#.", ".#.", "#.."])),
    ('[', glyph(["##.", "#..", "#..", "#..", "##."])),
    (']', glyph([".##", "..#", "..#", "..#", ".##"])),
    ('<', glyph(["..#", ".#.", "#..", ".#.", "..#"])),
    ('>', glyph(["#..", ".#.", "..#", ".#.", "#.."])),
    ('#', glyph(["#.#", "###", "#.#", "###", "#.#"])),
    ('%', glyph(["#.#", "..#", ".#.", "#..", "#.#"])),
    ('*', glyph(["...", "#.#", ".#.", "#.#", "..."])),
    ('!', glyph([".#.", ".#.", ".#.", "...", ".#."])),
    ('?', FALLBACK),
    ('_', glyph(["...", "...", "...", "...", "###"])),
    ('\'', glyph([".#.", ".#.", "...", "...", "..."])),
    ('"', glyph(["#.#", "#.#", "...", "...", "..."])),
    ('|', glyph([".#.", ".#.", ".#.", ".#.", ".#."])),
    ('^', glyph([".#.", "#.#", "...", "...", "..."])),
    ('~', glyph(["...", "##.", "#.#", ".##", "..."])),
];

/// Letters are drawn upper-case; anything the font lacks draws as `?`.
pub fn glyph_bits(ch: char) -> u16 {
    let ch = ch.to_ascii_uppercase();
    FONT.iter()
        .find(|(key, _)| *key == ch)
        .map_or(FALLBACK, |(_, bits)| *bits)
}

pub fn has_glyph(ch: char) -> bool {
    let ch = ch.to_ascii_uppercase();
    FONT.iter().any(|(key, _)| *key == ch)
}

pub fn glyph_advance(scale: i32) -> i32 {
    (GLYPH_COLS + 1) * scale
}

pub fn line_advance(scale: i32) -> i32 {
    (GLYPH_ROWS + 2) * scale
}

pub fn text_width(text: &str, scale: i32) -> i32 {
    text.chars().count() as i32 * glyph_advance(scale)
}

pub fn draw_text(canvas: &mut Canvas<'_>, x: i32, y: i32, text: &str, scale: i32, color: Rgba) {
    let mut pen_x = x;
    for ch in text.chars() {
        draw_glyph(canvas, pen_x, y, glyph_bits(ch), scale, color);
        pen_x = pen_x.saturating_add(glyph_advance(scale));
    }
}

fn draw_glyph(canvas: &mut Canvas<'_>, x: i32, y: i32, bits: u16, scale: i32, color: Rgba) {
    let cell_count = GLYPH_COLS * GLYPH_ROWS;
    for index in 0..cell_count {
        if bits & (1 << (cell_count - 1 - index)) == 0 {
            continue;
        }
        let col = index % GLYPH_COLS;
        let row = index / GLYPH_COLS;
        canvas.fill_rect(x + col * scale, y + row * scale, scale, scale, color);
    }
}
