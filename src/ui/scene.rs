//! Draws a `Scene` onto a ratatui frame.
//!
//! The 500 × 800 world is scaled onto whatever character grid is available.
//! Each cell samples the world at its top-left corner.

use crate::constants::*;
use crate::game::{Bird, Pipe};
use crate::harness::Scene;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Ground texture stripe width in world pixels.
const GROUND_STRIPE: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Sky,
    Pipe,
    Ground { light: bool },
    Bird(&'static str),
}

/// Render the scene with its border, play area and status bar.
pub fn render_scene(frame: &mut Frame, area: Rect, scene: &Scene) {
    let block = Block::default()
        .title(" flappy-evolve ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(1)])
        .split(inner);

    render_play_area(frame, chunks[0], scene);
    render_overlays(frame, chunks[0], scene);

    let controls = Paragraph::new(Line::from(vec![
        Span::styled("[q/Esc]", Style::default().fg(Color::White)),
        Span::styled(" Save best and quit", Style::default().fg(Color::DarkGray)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(controls, chunks[1]);
}

fn render_play_area(frame: &mut Frame, area: Rect, scene: &Scene) {
    let width = area.width as usize;
    let height = area.height as usize;
    if width == 0 || height == 0 {
        return;
    }

    let x_scale = WIN_WIDTH / width as f64;
    let y_scale = WIN_HEIGHT / height as f64;

    let birds: Vec<(usize, usize, &'static str)> = scene
        .birds
        .iter()
        .map(|bird| {
            let centre_x = bird.x + BIRD_WIDTH / 2.0;
            let centre_y = bird.y + BIRD_HEIGHT / 2.0;
            let col = ((centre_x / x_scale) as usize).min(width - 1);
            let row = ((centre_y.max(0.0) / y_scale) as usize).min(height - 1);
            (row, col, bird_glyph(bird))
        })
        .collect();

    let mut lines = Vec::with_capacity(height);
    for row in 0..height {
        let world_y = row as f64 * y_scale;
        let spans: Vec<Span> = (0..width)
            .map(|col| {
                let world_x = col as f64 * x_scale;
                let cell = birds
                    .iter()
                    .find(|(r, c, _)| *r == row && *c == col)
                    .map(|(_, _, glyph)| Cell::Bird(*glyph))
                    .unwrap_or_else(|| world_cell(scene, world_x, world_y));
                cell_span(cell)
            })
            .collect();
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

/// What the world shows at one point, birds aside.
fn world_cell(scene: &Scene, x: f64, y: f64) -> Cell {
    if y >= scene.base.y {
        let offset = (x - scene.base.x1).rem_euclid(BASE_WIDTH);
        let light = (offset / GROUND_STRIPE) as i64 % 2 == 0;
        return Cell::Ground { light };
    }
    if scene.pipes.iter().any(|p| pipe_covers(p, x, y)) {
        return Cell::Pipe;
    }
    Cell::Sky
}

fn pipe_covers(pipe: &Pipe, x: f64, y: f64) -> bool {
    x >= pipe.x && x < pipe.right() && (y < pipe.height || y >= pipe.bottom())
}

/// Nose up while climbing, down while diving.
fn bird_glyph(bird: &Bird) -> &'static str {
    if bird.tilt <= DIVE_TILT {
        "▼"
    } else if bird.tilt >= MAX_TILT {
        "▲"
    } else {
        "►"
    }
}

fn cell_span(cell: Cell) -> Span<'static> {
    let sky = Style::default().bg(Color::Blue);
    match cell {
        Cell::Sky => Span::styled(" ", sky),
        Cell::Pipe => Span::styled("█", Style::default().fg(Color::Green).bg(Color::Blue)),
        Cell::Ground { light: true } => Span::styled("▒", Style::default().fg(Color::Yellow)),
        Cell::Ground { light: false } => Span::styled("░", Style::default().fg(Color::Yellow)),
        Cell::Bird(glyph) => Span::styled(
            glyph,
            sky.fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    }
}

/// "Score" top right, "Gen" and "Alive" top left.
fn render_overlays(frame: &mut Frame, area: Rect, scene: &Scene) {
    if area.height < 2 {
        return;
    }
    let text = Style::default()
        .fg(Color::White)
        .bg(Color::Blue)
        .add_modifier(Modifier::BOLD);

    let first = Rect { height: 1, ..area };
    let second = Rect {
        y: area.y + 1,
        height: 1,
        ..area
    };

    let gen = format!(" Gen: {}", scene.generation);
    let alive = format!(" Alive: {}", scene.alive);
    let score = format!("Score: {} ", scene.score);

    frame.render_widget(
        Paragraph::new(Span::styled(gen.clone(), text)),
        Rect {
            width: (gen.len() as u16).min(first.width),
            ..first
        },
    );
    frame.render_widget(
        Paragraph::new(Span::styled(alive.clone(), text)),
        Rect {
            width: (alive.len() as u16).min(second.width),
            ..second
        },
    );
    let score_width = (score.len() as u16).min(first.width);
    frame.render_widget(
        Paragraph::new(Span::styled(score, text)).alignment(Alignment::Right),
        Rect {
            x: first.x + first.width - score_width,
            width: score_width,
            ..first
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Base;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_world_cell_layers() {
        let base = Base::new(FLOOR_Y);
        let pipes = vec![Pipe::new(100.0, 300.0)];
        let scene = Scene {
            pipes: &pipes,
            base: &base,
            birds: Vec::new(),
            score: 0,
            generation: 1,
            alive: 0,
        };
        assert_eq!(world_cell(&scene, 150.0, 100.0), Cell::Pipe);
        assert_eq!(world_cell(&scene, 150.0, 400.0), Cell::Sky);
        assert_eq!(world_cell(&scene, 150.0, 600.0), Cell::Pipe);
        assert_eq!(world_cell(&scene, 10.0, 100.0), Cell::Sky);
        assert!(matches!(world_cell(&scene, 10.0, 760.0), Cell::Ground { .. }));
    }

    #[test]
    fn test_bird_glyph_follows_tilt() {
        let mut bird = Bird::spawn();
        bird.tilt = MAX_TILT;
        assert_eq!(bird_glyph(&bird), "▲");
        bird.tilt = 0.0;
        assert_eq!(bird_glyph(&bird), "►");
        bird.tilt = MIN_TILT;
        assert_eq!(bird_glyph(&bird), "▼");
    }

    #[test]
    fn test_render_shows_overlays() {
        let backend = TestBackend::new(60, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let base = Base::new(FLOOR_Y);
        let pipes = vec![Pipe::new(300.0, 250.0)];
        let bird = Bird::spawn();
        let scene = Scene {
            pipes: &pipes,
            base: &base,
            birds: vec![&bird],
            score: 12,
            generation: 3,
            alive: 1,
        };
        terminal
            .draw(|f| render_scene(f, f.size(), &scene))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Score: 12"));
        assert!(text.contains("Gen: 3"));
        assert!(text.contains("Alive: 1"));
        assert!(text.contains('►') || text.contains('▲') || text.contains('▼'));
        assert!(text.contains('█'));
    }

    #[test]
    fn test_render_tiny_area_does_not_panic() {
        let backend = TestBackend::new(3, 3);
        let mut terminal = Terminal::new(backend).unwrap();
        let base = Base::new(FLOOR_Y);
        let scene = Scene {
            pipes: &[],
            base: &base,
            birds: Vec::new(),
            score: 0,
            generation: 0,
            alive: 0,
        };
        terminal
            .draw(|f| render_scene(f, f.size(), &scene))
            .unwrap();
    }
}
