/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// Layout (rows):
///   0            HUD: "<level> - Gems: <n> / <target>"
///   2 ..         map, one tile = `GLYPH_W` terminal columns
///   map + 1      message bar (sprite sheet errors, pause)
///   map + 3      key help

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, SetTitle},
};

use rockfall::domain::sprite::sprite_index;
use rockfall::domain::tile::Tile;
use rockfall::sim::world::WorldState;

use super::sprites::{GlyphSheet, GLYPH_W};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// gaps between rows match the cell color on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '\u{0}', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors. Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Tile colors ──

/// Foreground/background for a tile's glyph.
fn tile_colors(tile: Tile) -> (Color, Color) {
    match tile {
        Tile::Empty      => (Color::Reset, Color::Reset),
        Tile::Dirt       => (Color::Rgb{r:150,g:100,b:50}, Color::Rgb{r:70,g:45,b:20}),
        Tile::BrickWall  => (Color::Rgb{r:180,g:120,b:60}, Color::Rgb{r:100,g:65,b:30}),
        Tile::StoneWall  => (Color::Rgb{r:120,g:120,b:120}, Color::Rgb{r:70,g:70,b:70}),
        Tile::Rock       => (Color::Rgb{r:200,g:200,b:190}, Color::Reset),
        Tile::Gem        => (Color::Rgb{r:80,g:230,b:255}, Color::Reset),
        Tile::ClosedExit => (Color::Rgb{r:140,g:140,b:140}, Color::Rgb{r:40,g:40,b:40}),
        Tile::OpenExit   => (Color::Rgb{r:255,g:255,b:120}, Color::Rgb{r:60,g:120,b:40}),
        Tile::Player     => (Color::Rgb{r:255,g:230,b:90}, Color::Reset),
        Tile::Enemy1     => (Color::Rgb{r:255,g:90,b:90}, Color::Reset),
        Tile::Enemy2     => (Color::Rgb{r:255,g:140,b:60}, Color::Reset),
        Tile::Enemy3     => (Color::Rgb{r:220,g:90,b:255}, Color::Reset),
        Tile::Explosion0 => (Color::Rgb{r:255,g:255,b:255}, Color::Rgb{r:255,g:200,b:60}),
        Tile::Explosion1 => (Color::Rgb{r:255,g:240,b:120}, Color::Rgb{r:240,g:150,b:40}),
        Tile::Explosion2 => (Color::Rgb{r:255,g:200,b:80}, Color::Rgb{r:210,g:100,b:30}),
        Tile::Explosion3 => (Color::Rgb{r:240,g:150,b:60}, Color::Rgb{r:160,g:60,b:20}),
        Tile::Explosion4 => (Color::Rgb{r:180,g:90,b:40}, Color::Rgb{r:90,g:30,b:15}),
        Tile::Explosion5 => (Color::Rgb{r:110,g:60,b:40}, Color::Rgb{r:40,g:20,b:15}),
    }
}

// ── Renderer ──

/// Vertical offsets
const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const MSG_BG: Color = Color::Rgb { r: 200, g: 180, b: 50 };

const HELP: &str = " Arrows/WASD:Move  R/F2:Reset  N:Next  F1:Pause  Esc/Q:Quit";

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    sheet: GlyphSheet,
    /// Persistent message (sprite sheet load failure).
    notice: Option<String>,
}

impl Renderer {
    pub fn new(sheet: GlyphSheet, notice: Option<String>) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            sheet,
            notice,
        }
    }

    pub fn init(&mut self, title: &str) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            SetTitle(title),
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, world: &WorldState, paused: bool) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.front.clear();
        self.compose(world, paused);
        self.flush_diff()?;

        // Swap: current front becomes next back
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        // Explicit base colors, never ResetColor: the terminal default may
        // differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, w: &WorldState, paused: bool) {
        // ── HUD row ──
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(1, HUD_ROW, &w.hud_text(), Color::White, HUD_BG);

        // ── Map ──
        let facing = w.facing();
        for (gx, gy, tile) in w.grid.cells() {
            let row = MAP_ROW + gy;
            let col = gx * GLYPH_W;
            let [c0, c1] = self.sheet.glyph(sprite_index(tile, facing));
            let (fg, bg) = tile_colors(tile);
            self.front.set(col, row, Cell::new(c0, fg, bg));
            self.front.set(col + 1, row, Cell::new(c1, fg, bg));
        }

        // ── Message bar ──
        let msg_row = MAP_ROW + w.grid.height() + 1;
        let message = if paused {
            Some("PAUSED  [F1] Resume".to_string())
        } else {
            self.notice.clone()
        };
        if let Some(msg) = message {
            self.front.fill_row(msg_row, MSG_BG);
            self.front.put_str(1, msg_row, &msg, Color::Black, MSG_BG);
        }

        // ── Help bar ──
        let help_row = MAP_ROW + w.grid.height() + 3;
        self.front.put_str(0, help_row, HELP, Color::DarkGrey, Color::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.put_str(2, 0, "abcdef", Color::White, Color::Reset);
        assert_eq!(fb.get(2, 0).ch, 'a');
        assert_eq!(fb.get(3, 0).ch, 'b');
        assert_eq!(fb.get(4, 0), Cell::BLANK);
    }

    #[test]
    fn reset_background_becomes_base() {
        assert_eq!(Cell::new('x', Color::White, Color::Reset).bg, Cell::BASE_BG);
    }

    #[test]
    fn compose_draws_hud_and_map() {
        let world = WorldState::with_default_levels();
        let mut r = Renderer::new(GlyphSheet::builtin(), None);
        r.front.resize(60, 30);
        r.compose(&world, false);

        let hud: String = (1..24).map(|x| r.front.get(x, HUD_ROW).ch).collect();
        assert_eq!(hud, "Level 1 - Gems: 0 / 20 ");

        // player at (1, 1) facing down
        assert_eq!(r.front.get(2, MAP_ROW + 1).ch, '@');
        assert_eq!(r.front.get(3, MAP_ROW + 1).ch, 'v');
        // brick corner
        assert_eq!(r.front.get(0, MAP_ROW).ch, '▒');
    }

    #[test]
    fn pause_replaces_notice() {
        let world = WorldState::with_default_levels();
        let mut r = Renderer::new(GlyphSheet::builtin(), Some("sheet missing".into()));
        r.front.resize(60, 30);
        let msg_row = MAP_ROW + world.grid.height() + 1;

        r.compose(&world, false);
        assert_eq!(r.front.get(1, msg_row).ch, 's');

        r.front.clear();
        r.compose(&world, true);
        assert_eq!(r.front.get(1, msg_row).ch, 'P');
    }
}
