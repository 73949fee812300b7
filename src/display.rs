//! Rendering layer: all terminal output lives here.
//!
//! The core draws into a retained list of shapes on the 1920×1080 logical
//! canvas.  Each frame that list is scaled onto the terminal grid: polygons
//! are filled cell by cell, small shapes collapse to a single glyph, and text
//! is printed at its anchor.

use std::collections::BTreeMap;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use space_blaster::geometry::{Vec2, CANVAS_HEIGHT, CANVAS_WIDTH};
use space_blaster::render::{Anchor, Handle, Renderer, Rgb, ShapeKind, ShapeSpec};

const C_HIGHLIGHT: Color = Color::Yellow;

/// Shapes at least this fraction of the canvas are backgrounds; the terminal's
/// own background stands in for them.
const BACKDROP_FRACTION: f32 = 0.9;

struct Node {
    spec: ShapeSpec,
    highlighted: bool,
}

#[derive(Default)]
pub struct TerminalRenderer {
    nodes: BTreeMap<Handle, Node>,
    next_handle: u64,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one complete frame onto a `cols`×`rows` terminal.
    pub fn render<W: Write>(&self, out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
        out.queue(terminal::Clear(terminal::ClearType::All))?;
        let grid = Grid { cols, rows };

        // Handles are issued in increasing order, so map order is draw order.
        for node in self.nodes.values() {
            let color = if node.highlighted {
                C_HIGHLIGHT
            } else {
                to_color(node.spec.color)
            };
            out.queue(style::SetForegroundColor(color))?;
            match &node.spec.kind {
                ShapeKind::Text { content, .. } => {
                    draw_text(out, &grid, node.spec.position, node.spec.anchor, content)?
                }
                ShapeKind::Rect { width, height } => {
                    draw_rect(out, &grid, node.spec.position, *width, *height)?
                }
                ShapeKind::Circle { radius } => {
                    draw_circle(out, &grid, node.spec.position, *radius)?
                }
                ShapeKind::Polygon { points } => {
                    draw_polygon(out, &grid, node.spec.position, points)?
                }
            }
        }

        // Park cursor in a harmless spot and flush
        out.queue(style::ResetColor)?;
        out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
        out.flush()?;
        Ok(())
    }
}

impl Renderer for TerminalRenderer {
    fn draw_shape(&mut self, spec: ShapeSpec) -> Handle {
        let handle = Handle(self.next_handle);
        self.next_handle += 1;
        self.nodes.insert(
            handle,
            Node {
                spec,
                highlighted: false,
            },
        );
        handle
    }

    fn set_text(&mut self, handle: Handle, text: &str) {
        if let Some(Node {
            spec:
                ShapeSpec {
                    kind: ShapeKind::Text { content, .. },
                    ..
                },
            ..
        }) = self.nodes.get_mut(&handle)
        {
            *content = text.to_string();
        }
    }

    fn set_position(&mut self, handle: Handle, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.spec.position = position;
        }
    }

    fn set_color(&mut self, handle: Handle, color: Rgb) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.spec.color = color;
        }
    }

    fn set_highlight(&mut self, handle: Handle, highlighted: bool) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.highlighted = highlighted;
        }
    }

    fn destroy(&mut self, handle: Handle) {
        self.nodes.remove(&handle);
    }
}

// ── Canvas → cell mapping ─────────────────────────────────────────────────────

struct Grid {
    cols: u16,
    rows: u16,
}

impl Grid {
    fn cell_width(&self) -> f32 {
        CANVAS_WIDTH / self.cols.max(1) as f32
    }

    fn cell_height(&self) -> f32 {
        CANVAS_HEIGHT / self.rows.max(1) as f32
    }

    fn cell_of(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x / self.cell_width()).floor() as i32,
            (p.y / self.cell_height()).floor() as i32,
        )
    }

    /// Canvas position of a cell's centre.
    fn centre_of(&self, col: i32, row: i32) -> Vec2 {
        Vec2::new(
            (col as f32 + 0.5) * self.cell_width(),
            (row as f32 + 0.5) * self.cell_height(),
        )
    }

    fn contains(&self, col: i32, row: i32) -> bool {
        col >= 0 && row >= 0 && col < self.cols as i32 && row < self.rows as i32
    }
}

fn to_color(rgb: Rgb) -> Color {
    let (r, g, b) = rgb.channels();
    Color::Rgb { r, g, b }
}

fn put<W: Write>(out: &mut W, grid: &Grid, col: i32, row: i32, glyph: &str) -> std::io::Result<()> {
    if grid.contains(col, row) {
        out.queue(cursor::MoveTo(col as u16, row as u16))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

// ── Shapes ────────────────────────────────────────────────────────────────────

fn draw_text<W: Write>(
    out: &mut W,
    grid: &Grid,
    position: Vec2,
    anchor: Anchor,
    content: &str,
) -> std::io::Result<()> {
    let (col, row) = grid.cell_of(position);
    let lines: Vec<&str> = content.lines().collect();
    let first_row = match anchor {
        Anchor::Center => row - lines.len() as i32 / 2,
        Anchor::TopLeft | Anchor::TopRight => row,
    };
    for (i, line) in lines.iter().enumerate() {
        let width = line.chars().count() as i32;
        let start = match anchor {
            Anchor::Center => col - width / 2,
            Anchor::TopLeft => col,
            Anchor::TopRight => col - width,
        };
        let row = first_row + i as i32;
        if !grid.contains(0, row) {
            continue;
        }
        // Clip horizontally rather than dropping the whole line.
        let visible: String = line
            .chars()
            .enumerate()
            .filter(|(j, _)| grid.contains(start + *j as i32, row))
            .map(|(_, c)| c)
            .collect();
        if visible.is_empty() {
            continue;
        }
        out.queue(cursor::MoveTo(start.max(0) as u16, row as u16))?;
        out.queue(Print(visible))?;
    }
    Ok(())
}

fn draw_rect<W: Write>(
    out: &mut W,
    grid: &Grid,
    centre: Vec2,
    width: f32,
    height: f32,
) -> std::io::Result<()> {
    if width >= CANVAS_WIDTH * BACKDROP_FRACTION && height >= CANVAS_HEIGHT * BACKDROP_FRACTION {
        return Ok(());
    }
    let half = Vec2::new(width / 2.0, height / 2.0);
    let (left, top) = grid.cell_of(centre - half);
    let (right, bottom) = grid.cell_of(centre + half);

    if right - left < 2 || bottom - top < 2 {
        for row in top..=bottom {
            for col in left..=right {
                put(out, grid, col, row, "█")?;
            }
        }
        return Ok(());
    }

    // Outline only: cards and overlays keep their contents readable.
    for col in left + 1..right {
        put(out, grid, col, top, "─")?;
        put(out, grid, col, bottom, "─")?;
    }
    for row in top + 1..bottom {
        put(out, grid, left, row, "│")?;
        put(out, grid, right, row, "│")?;
    }
    put(out, grid, left, top, "┌")?;
    put(out, grid, right, top, "┐")?;
    put(out, grid, left, bottom, "└")?;
    put(out, grid, right, bottom, "┘")?;
    Ok(())
}

fn draw_circle<W: Write>(out: &mut W, grid: &Grid, centre: Vec2, radius: f32) -> std::io::Result<()> {
    let (col, row) = grid.cell_of(centre);
    let glyph = if radius < 4.0 { "·" } else { "●" };
    put(out, grid, col, row, glyph)
}

fn draw_polygon<W: Write>(
    out: &mut W,
    grid: &Grid,
    origin: Vec2,
    points: &[Vec2],
) -> std::io::Result<()> {
    let world: Vec<Vec2> = points.iter().map(|p| origin + *p).collect();
    let Some((min, max)) = bounds(&world) else {
        return Ok(());
    };
    let (left, top) = grid.cell_of(min);
    let (right, bottom) = grid.cell_of(max);

    let mut filled = false;
    for row in top..=bottom {
        for col in left..=right {
            if point_in_polygon(grid.centre_of(col, row), &world) {
                put(out, grid, col, row, "█")?;
                filled = true;
            }
        }
    }
    // Smaller than a cell: mark the spot instead of vanishing.
    if !filled {
        let (col, row) = grid.cell_of(origin);
        put(out, grid, col, row, "▲")?;
    }
    Ok(())
}

fn bounds(points: &[Vec2]) -> Option<(Vec2, Vec2)> {
    let first = *points.first()?;
    Some(points.iter().fold((first, first), |(min, max), p| {
        (
            Vec2::new(min.x.min(p.x), min.y.min(p.y)),
            Vec2::new(max.x.max(p.x), max.y.max(p.y)),
        )
    }))
}

/// Even-odd rule.
fn point_in_polygon(p: Vec2, polygon: &[Vec2]) -> bool {
    let mut inside = false;
    let mut j = polygon.len().wrapping_sub(1);
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}
