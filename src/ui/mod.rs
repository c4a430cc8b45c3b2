//! Terminal rendering.

pub mod scene;
pub mod terminal;

pub use scene::render_scene;
pub use terminal::TerminalFrontend;
