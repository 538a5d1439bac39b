/// Glyph sprite sheet.
///
/// The terminal stand-in for a bitmap sheet: `SPRITE_ROWS` lines of text,
/// each holding `SPRITE_COLS` sprites of two characters. Sprite `i` sits at
/// `sprite_origin(i, 2, 1)`, the same lookup a pixel renderer would do
/// with its tile size. Short lines are padded with spaces.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use rockfall::domain::sprite::{sprite_origin, SPRITE_COLS, SPRITE_ROWS};

/// Terminal columns per sprite.
pub const GLYPH_W: usize = 2;

const BUILTIN: &str = include_str!("../../assets/sprites.txt");

pub struct GlyphSheet {
    rows: Vec<Vec<char>>,
}

impl GlyphSheet {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read sprite sheet {}", path.display()))?;
        Self::parse(&text)
            .with_context(|| format!("bad sprite sheet {}", path.display()))
    }

    /// The sheet compiled into the binary.
    pub fn builtin() -> Self {
        let rows = BUILTIN.lines().map(pad_row).collect();
        GlyphSheet { rows }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<Vec<char>> = text.lines().take(SPRITE_ROWS).map(pad_row).collect();
        if rows.len() < SPRITE_ROWS {
            bail!("expected {} rows, found {}", SPRITE_ROWS, rows.len());
        }
        Ok(GlyphSheet { rows })
    }

    /// The two characters of sprite `index`. Indices off the sheet draw `??`.
    pub fn glyph(&self, index: usize) -> [char; GLYPH_W] {
        let (x, y) = sprite_origin(index, GLYPH_W, 1);
        match self.rows.get(y) {
            Some(row) if x + 1 < row.len() => [row[x], row[x + 1]],
            _ => ['?', '?'],
        }
    }
}

fn pad_row(line: &str) -> Vec<char> {
    let mut row: Vec<char> = line.chars().collect();
    row.resize(SPRITE_COLS * GLYPH_W, ' ');
    row
}
