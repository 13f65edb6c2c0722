//! Layout helpers for the main screen.

use ratatui::prelude::*;

/// Vertical split of the whole frame.
pub struct MainLayout {
    /// Upload panel + stage panel.
    pub body: Rect,
    /// Keybinding help bar.
    pub help_bar: Rect,
    /// Status bar.
    pub status_bar: Rect,
}

/// Horizontal split of the body.
pub struct BodyLayout {
    /// Upload card on the left.
    pub upload_panel: Rect,
    /// Stage-dependent panel on the right.
    pub stage_panel: Rect,
}

pub fn create_main_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(3), // help
            Constraint::Length(3), // status
        ])
        .split(area);

    MainLayout {
        body: chunks[0],
        help_bar: chunks[1],
        status_bar: chunks[2],
    }
}

pub fn create_body_layout(area: Rect) -> BodyLayout {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(60),
        ])
        .split(area);

    BodyLayout {
        upload_panel: chunks[0],
        stage_panel: chunks[1],
    }
}
