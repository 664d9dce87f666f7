use std::fmt::Write;

/// RGB bytes.
pub type Rgb = [u8; 3];

/// Parses `#RRGGBB` (the leading `#` is optional).
pub fn parse_hex_color(text: &str) -> Option<Rgb> {
    let hex = text.strip_prefix('#').unwrap_or(text);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellGlyph {
    pub ch: char,
    /// Source colour when colour preservation is on, `None` for monochrome or
    /// masked-out cells.
    pub color: Option<Rgb>,
}

impl CellGlyph {
    pub fn new(ch: char) -> Self {
        Self { ch, color: None }
    }

    pub fn colored(ch: char, color: Rgb) -> Self {
        Self { ch, color: Some(color) }
    }
}

/// One rendered frame: row-major glyphs with optional colour.
///
/// Grids are rebuilt from scratch every tick and handed out by reference;
/// nothing patches a published grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterGrid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<CellGlyph>,
}

impl CharacterGrid {
    pub fn new(width: usize, height: usize, cells: Vec<CellGlyph>) -> Self {
        assert_eq!(width * height, cells.len());
        Self { width, height, cells }
    }

    /// Grid with zero rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Literal text laid out as a grid, shorter lines padded with spaces.
    ///
    /// Used for placeholders such as `[?]` when a frame cannot be produced.
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        if width == 0 {
            return Self::empty();
        }

        let mut cells = Vec::with_capacity(width * lines.len());
        for line in &lines {
            let mut count = 0;
            for ch in line.chars() {
                cells.push(CellGlyph::new(ch));
                count += 1;
            }
            cells.extend(std::iter::repeat(CellGlyph::new(' ')).take(width - count));
        }

        Self::new(width, lines.len(), cells)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<&CellGlyph> {
        if column >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(row * self.width + column)
    }

    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        // `chunks` panics on zero, and a zero-width grid has no cells anyway.
        let width = self.width.max(1);
        self.cells.chunks(width).map(|row| row.iter().map(|cell| cell.ch).collect::<String>())
    }

    /// Rows joined by `\n`, without a trailing newline.
    pub fn to_text(&self) -> String {
        self.rows().collect::<Vec<_>>().join("\n")
    }

    /// Text with 24-bit ANSI foreground colours.
    ///
    /// Cells without their own colour fall back to `tint`; with neither the
    /// glyph is written unstyled.
    pub fn to_ansi(&self, tint: Option<Rgb>) -> String {
        let width = self.width.max(1);
        let mut out = String::with_capacity(self.cells.len() * 4);

        for (index, row) in self.cells.chunks(width).enumerate() {
            if index > 0 {
                out.push('\n');
            }

            let mut active: Option<Rgb> = None;
            for cell in row {
                let color = cell.color.or(tint);
                if color != active {
                    match color {
                        Some([r, g, b]) => {
                            let _ = write!(out, "\x1b[38;2;{r};{g};{b}m");
                        },
                        None => out.push_str("\x1b[0m"),
                    }
                    active = color;
                }
                out.push(cell.ch);
            }

            if active.is_some() {
                out.push_str("\x1b[0m");
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_text_pads_short_lines() {
        let grid = CharacterGrid::from_text("ab\nc");
        assert_eq!((grid.width, grid.height), (2, 2));
        assert_eq!(grid.to_text(), "ab\nc ");
    }

    #[test]
    fn empty_text_is_an_empty_grid() {
        let grid = CharacterGrid::from_text("");
        assert!(grid.is_empty());
        assert_eq!(grid.rows().count(), 0);
        assert_eq!(grid.to_text(), "");
    }

    #[test]
    fn cell_lookup_is_bounds_checked() {
        let grid = CharacterGrid::from_text("xy");
        assert_eq!(grid.cell(1, 0).map(|c| c.ch), Some('y'));
        assert!(grid.cell(2, 0).is_none());
        assert!(grid.cell(0, 1).is_none());
    }

    #[test]
    fn ansi_groups_runs_of_the_same_colour() {
        let red = [255, 0, 0];
        let grid = CharacterGrid::new(
            3,
            1,
            vec![CellGlyph::colored('a', red), CellGlyph::colored('b', red), CellGlyph::new(' ')],
        );
        assert_eq!(grid.to_ansi(None), "\x1b[38;2;255;0;0mab\x1b[0m ");
    }

    #[test]
    fn ansi_uses_tint_for_monochrome_cells() {
        let grid = CharacterGrid::from_text("@");
        assert_eq!(grid.to_ansi(Some([1, 2, 3])), "\x1b[38;2;1;2;3m@\x1b[0m");
        assert_eq!(grid.to_ansi(None), "@");
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#D4A574"), Some([0xd4, 0xa5, 0x74]));
        assert_eq!(parse_hex_color("7dd3fc"), Some([0x7d, 0xd3, 0xfc]));
        assert_eq!(parse_hex_color("#abc"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }
}
