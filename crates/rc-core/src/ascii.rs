//! Text rendering of a layout.

use crate::arrange::RectKind;
use crate::layout::Layout;
use crate::queue::Id;

const EMPTY: char = '.';
const TUNNEL: char = '#';

/// Paint every rectangle onto a grid covering the layout's bounds, in id
/// order so later slots draw over earlier ones. Rows are joined with `\n`.
pub(crate) fn render(layout: &Layout) -> String {
    let Some(bounds) = layout.bounds() else {
        return String::new();
    };
    let width = bounds.width as usize;
    let height = bounds.height as usize;
    let mut grid = vec![vec![EMPTY; width]; height];

    for (id, placed) in layout.rects() {
        let ch = match placed.kind {
            RectKind::Room => glyph(id),
            RectKind::Tunnel => TUNNEL,
        };
        let rect = placed.rect;
        for y in rect.y..rect.y2() {
            for x in rect.x..rect.x2() {
                let row = (y - bounds.y) as usize;
                let col = (x - bounds.x) as usize;
                grid[row][col] = ch;
            }
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Base-36 digit for `id`, wrapping after `z`
fn glyph(id: Id) -> char {
    std::char::from_digit(id % 36, 36).unwrap_or('?')
}
