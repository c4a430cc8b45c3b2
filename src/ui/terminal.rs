//! Interactive frontend on the real terminal.

use super::scene::render_scene;
use crate::harness::{Frontend, Scene};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

/// Raw-mode alternate screen paced at a fixed frame rate. The terminal is
/// restored when the frontend is dropped.
pub struct TerminalFrontend {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    frame_time: Duration,
    last_frame: Instant,
    active: bool,
}

impl TerminalFrontend {
    /// Take over the terminal. `fps == 0` disables pacing.
    pub fn new(fps: u32) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let frame_time = if fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(1) / fps
        };
        Ok(Self {
            terminal,
            frame_time,
            last_frame: Instant::now(),
            active: true,
        })
    }

    /// Give the terminal back. Safe to call more than once.
    pub fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        disable_raw_mode()?;
        self.terminal.backend_mut().execute(LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Frontend for TerminalFrontend {
    /// Waits out the rest of the current frame while watching for quit keys.
    fn poll_quit(&mut self) -> io::Result<bool> {
        let deadline = self.last_frame + self.frame_time;
        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if is_quit_key(&key) {
                        return Ok(true);
                    }
                }
            }
            if Instant::now() >= deadline {
                break;
            }
        }
        self.last_frame = Instant::now();
        Ok(false)
    }

    fn draw(&mut self, scene: &Scene) -> io::Result<()> {
        self.terminal.draw(|f| render_scene(f, f.size(), scene))?;
        Ok(())
    }
}

impl Drop for TerminalFrontend {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// q, Esc or Ctrl-C. Raw mode swallows SIGINT, so Ctrl-C arrives as a key.
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}
