//! ASCII renderer for terminals and logs

use std::fmt::Write;
use std::sync::Mutex;

use glam::IVec2;

use super::{Color, Renderer};
use crate::sim::{BoardSnapshot, Direction, ObstacleKind};

#[derive(Debug, Default)]
struct Frame {
    text: String,
    overlay: Option<(String, Color)>,
    frames: u64,
}

/// Keeps the most recent frame as text; the host decides when to print it
#[derive(Debug, Default)]
pub struct TextRenderer {
    frame: Mutex<Frame>,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last rendered frame with the overlay line appended
    pub fn frame(&self) -> String {
        let Ok(frame) = self.frame.lock() else {
            return String::new();
        };
        match &frame.overlay {
            Some((text, _)) => format!("{}== {} ==\n", frame.text, text),
            None => frame.text.clone(),
        }
    }

    pub fn overlay(&self) -> Option<String> {
        self.frame
            .lock()
            .ok()
            .and_then(|f| f.overlay.as_ref().map(|(text, _)| text.clone()))
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame.lock().map(|f| f.frames).unwrap_or(0)
    }
}

fn draw(snapshot: &BoardSnapshot) -> String {
    let width = snapshot.width.max(0) as usize;
    let height = snapshot.height.max(0) as usize;
    let mut cells = vec![vec!['.'; width]; height];

    let mut put = |cell: IVec2, glyph: char| {
        if cell.x >= 0 && cell.y >= 0 && (cell.x as usize) < width && (cell.y as usize) < height
        {
            cells[cell.y as usize][cell.x as usize] = glyph;
        }
    };

    for obstacle in &snapshot.obstacles {
        let glyph = match obstacle.kind {
            ObstacleKind::Boundary => '#',
            ObstacleKind::Block => char::from_digit(obstacle.health.clamp(0, 9) as u32, 10)
                .unwrap_or('B'),
        };
        put(obstacle.cell, glyph);
    }
    if let Some(food) = snapshot.food {
        put(food, '*');
    }
    if let Some(door) = snapshot.door {
        put(door, 'D');
    }
    for bullet in &snapshot.bullets {
        let glyph = match bullet.direction {
            Direction::Up | Direction::Down => '|',
            Direction::Left | Direction::Right => '-',
        };
        put(bullet.cell, glyph);
    }
    for (i, cell) in snapshot.snake.iter().enumerate() {
        let glyph = match (i, snapshot.alive) {
            (0, true) => '@',
            (0, false) => 'X',
            _ => 'o',
        };
        put(*cell, glyph);
    }

    let mut out = String::with_capacity((width + 1) * (height + 1) + 64);
    let _ = writeln!(
        out,
        "level {}  score {}  length {}  time {}s",
        snapshot.level,
        snapshot.score,
        snapshot.snake.len(),
        snapshot.remaining_secs
    );
    for row in cells {
        out.extend(row);
        out.push('\n');
    }
    out
}

impl Renderer for TextRenderer {
    fn render(&self, snapshot: &BoardSnapshot) {
        let text = draw(snapshot);
        if let Ok(mut frame) = self.frame.lock() {
            frame.text = text;
            frame.frames += 1;
        }
    }

    fn set_overlay(&self, text: &str, color: Color) {
        if let Ok(mut frame) = self.frame.lock() {
            frame.overlay = Some((text.to_string(), color));
        }
    }

    fn clear_overlay(&self) {
        if let Ok(mut frame) = self.frame.lock() {
            frame.overlay = None;
        }
    }
}
