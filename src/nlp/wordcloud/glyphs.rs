// 5x7 bitmap face used to draw cloud words. Letters are drawn upper-case; anything the face
// does not cover is drawn as a hollow box.

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
// one blank column between letters
pub const ADVANCE: u32 = GLYPH_WIDTH + 1;

const UNKNOWN: [u8; 7] = [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111];

#[rustfmt::skip]
const LETTERS: [[u8; 7]; 26] = [
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110], // B
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110], // C
    [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110], // D
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000], // F
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111], // G
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001], // M
    [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010], // W
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001], // X
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111], // Z
];

#[rustfmt::skip]
const DIGITS: [[u8; 7]; 10] = [
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111], // 2
    [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110], // 3
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110], // 5
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000], // 7
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100], // 9
];

const APOSTROPHE: [u8; 7] = [0b00100, 0b00100, 0b01000, 0, 0, 0, 0];

pub fn glyph(c: char) -> [u8; 7] {
    let upper = c.to_ascii_uppercase();
    match upper {
        'A'..='Z' => LETTERS[(upper as u8 - b'A') as usize],
        '0'..='9' => DIGITS[(upper as u8 - b'0') as usize],
        '\'' => APOSTROPHE,
        // collocations are drawn with a blank between their words
        ' ' => [0; 7],
        _ => UNKNOWN,
    }
}

/// A rendered word: `true` where ink goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub width: u32,
    pub height: u32,
    bits: Vec<bool>,
}

impl Mask {
    fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; (width * height) as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[(y * self.width + x) as usize]
    }

    fn set(&mut self, x: u32, y: u32) {
        let w = self.width;
        self.bits[(y * w + x) as usize] = true;
    }

    /// Rotated a quarter turn counter-clockwise, so the text reads bottom to top.
    pub fn rotate_ccw(&self) -> Mask {
        let mut out = Mask::blank(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    out.set(y, self.width - 1 - x);
                }
            }
        }
        out
    }
}

/// Pixel size of `word` at `font_size` (the glyph cell height in pixels).
pub fn text_size(word: &str, font_size: u32) -> (u32, u32) {
    let chars = word.chars().count() as u32;
    if chars == 0 {
        return (0, 0);
    }
    let cells = chars * ADVANCE - 1;
    let scale = font_size as f64 / GLYPH_HEIGHT as f64;
    ((cells as f64 * scale).ceil() as u32, font_size)
}

/// Draw `word` horizontally, each glyph cell scaled to `font_size / 7` pixels.
pub fn rasterize(word: &str, font_size: u32) -> Mask {
    let (width, height) = text_size(word, font_size);
    let mut mask = Mask::blank(width, height);
    let scale = font_size as f64 / GLYPH_HEIGHT as f64;
    let edge = |cell: u32| (cell as f64 * scale).floor() as u32;

    for (i, c) in word.chars().enumerate() {
        let rows = glyph(c);
        let origin = i as u32 * ADVANCE;
        for (gy, row) in rows.iter().enumerate() {
            for gx in 0..GLYPH_WIDTH {
                if row & (1 << (GLYPH_WIDTH - 1 - gx)) == 0 {
                    continue;
                }
                let (x0, x1) = (edge(origin + gx), edge(origin + gx + 1).min(width));
                let (y0, y1) = (edge(gy as u32), edge(gy as u32 + 1).min(height));
                for y in y0..y1 {
                    for x in x0..x1 {
                        mask.set(x, y);
                    }
                }
            }
        }
    }
    mask
}
