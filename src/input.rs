//! Single-line text input popup used to enter a file path.

use ratatui::{
    layout::Alignment,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// State of the open input box.
#[derive(Clone, Debug)]
pub struct InputBoxState {
    /// Prompt shown above the field.
    pub prompt: String,
    /// Current value.
    pub value: String,
    /// Cursor position in characters.
    pub cursor: usize,
}

impl InputBoxState {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            value: String::new(),
            cursor: 0,
        }
    }

    /// Byte offset corresponding to the character cursor.
    fn cursor_byte(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.cursor_byte();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.cursor_byte();
            self.value.remove(at);
        }
    }

    pub fn delete(&mut self) {
        let at = self.cursor_byte();
        if at < self.value.len() {
            self.value.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.value.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }
}

/// Draw the input box as a centered popup over the current frame.
pub fn render_input_box(f: &mut Frame, state: &InputBoxState) {
    let popup_area = centered_popup(f.area(), 70, 7);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Input")
        .style(Style::default().bg(Color::DarkGray));
    f.render_widget(block, popup_area);

    let inner_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // prompt
            Constraint::Length(1), // input field
            Constraint::Length(1),
            Constraint::Length(1), // help
        ])
        .split(popup_area);

    let prompt_widget = Paragraph::new(state.prompt.clone()).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(prompt_widget, inner_layout[0]);

    // Horizontal scroll so the cursor stays visible in a narrow field.
    let display_width = inner_layout[1].width as usize;
    let scroll_offset = state
        .cursor
        .saturating_sub(display_width.saturating_sub(2));

    let visible: Vec<char> = state
        .value
        .chars()
        .skip(scroll_offset)
        .take(display_width)
        .collect();
    let cursor_in_visible = (state.cursor - scroll_offset).min(visible.len());
    let before: String = visible[..cursor_in_visible].iter().collect();
    let after: String = visible[cursor_in_visible..].iter().collect();

    let input_widget =
        Paragraph::new(format!("{before}|{after}")).style(Style::default().fg(Color::Green));
    f.render_widget(input_widget, inner_layout[1]);

    let help = Paragraph::new("Enter=confirm | Esc=cancel | Ctrl+U=clear")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help, inner_layout[3]);
}

/// Compute a centered popup rectangle.
fn centered_popup(area: Rect, width_percent: u16, height: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(vertical[1])[1]
}
