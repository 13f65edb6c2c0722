//! Rendering for the main screen.

use ratatui::{
    Frame,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
};

use crate::{
    input, layout,
    model::{ExtractionResult, display_field},
    progress::PROCESS_STEPS,
    shortcuts::Shortcuts,
    validate,
    workflow::{Stage, ToastKind, WorkflowState},
};

use super::App;

/// Draw the whole frame.
pub fn draw(f: &mut Frame, app: &App) {
    let main_layout = layout::create_main_layout(f.area());
    let body_layout = layout::create_body_layout(main_layout.body);

    draw_upload_panel(f, app, body_layout.upload_panel);
    draw_stage_panel(f, app, body_layout.stage_panel);

    let help_bar = Paragraph::new(help_text(&app.shortcuts))
        .block(Block::default().borders(Borders::ALL).title("HELP"))
        .wrap(Wrap { trim: true });
    f.render_widget(help_bar, main_layout.help_bar);

    f.render_widget(build_status_bar(app), main_layout.status_bar);

    draw_toast(f, app.workflow.state(), main_layout.body);

    if let Some(input_state) = &app.input_box {
        input::render_input_box(f, input_state);
    }
}

/// Left panel: the upload card.
fn draw_upload_panel(f: &mut Frame, app: &App, area: Rect) {
    let state = app.workflow.state();
    let file_line = state
        .file_name
        .as_deref()
        .map(|name| format!("File: {name}"))
        .unwrap_or_else(|| "File: -".to_string());

    let text = format!(
        "{file_line}\n\n\
         JPG or PNG, up to {} MB.\n\n\
         u: pick an image by path\n\
         s: try the sample invoice\n\n\
         Service: {}\n\
         Nothing is stored server-side beyond the single request.",
        validate::MAX_UPLOAD_BYTES / (1024 * 1024),
        app.cfg.api.base_url,
    );
    let panel = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("UPLOAD"))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

/// Right panel, switched on the workflow stage.
fn draw_stage_panel(f: &mut Frame, app: &App, area: Rect) {
    let state = app.workflow.state();
    match state.stage {
        Stage::Landing => draw_landing(f, area),
        Stage::Processing => draw_processing(f, state, area),
        Stage::Result => draw_result(f, state, area),
        Stage::Error => draw_error(f, state, area),
    }
}

fn draw_landing(f: &mut Frame, area: Rect) {
    let text = "Accountant-ready preview\n\n\
                Upload an invoice screenshot and we will summarize the vendor\n\
                and totals and build a clean line-item table.\n\n\
                • Totals, currency, invoice number and dates extracted\n\
                • Line items always returned, even when the source is messy\n\
                • Export to Excel or copy rows straight to your spreadsheet";
    let panel = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("OUTPUT"))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

fn draw_processing(f: &mut Frame, state: &WorkflowState, area: Rect) {
    let mut lines = vec![
        format!(
            "Processing {}…",
            state.file_name.as_deref().unwrap_or("upload")
        ),
        String::new(),
    ];
    for (i, step) in PROCESS_STEPS.iter().enumerate() {
        let marker = if i == state.progress_step { "→" } else { " " };
        lines.push(format!("{marker} {step}"));
    }
    let panel = Paragraph::new(lines.join("\n"))
        .block(Block::default().borders(Borders::ALL).title("PROCESSING"))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

fn draw_result(f: &mut Frame, state: &WorkflowState, area: Rect) {
    let Some(result) = &state.result else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(3)])
        .split(area);

    f.render_widget(summary_panel(state, result), chunks[0]);

    let rows = result.line_items.iter().map(|item| {
        Row::new(vec![
            display_field(&item.description).to_string(),
            display_field(&item.quantity).to_string(),
            display_field(&item.unit_price).to_string(),
            display_field(&item.amount).to_string(),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(12),
            Constraint::Length(12),
        ],
    )
    .block(Block::default().borders(Borders::ALL).title("LINE ITEMS"))
    .header(Row::new(vec!["description", "qty", "unit price", "amount"]).bold());
    f.render_widget(table, chunks[1]);
}

fn summary_panel(state: &WorkflowState, result: &ExtractionResult) -> Paragraph<'static> {
    let s = &result.summary;
    let mut actions = String::from("d: download Excel | c: copy rows | r: start over");
    if state.downloading {
        actions.push_str("  (downloading…)");
    }
    if let Some(feedback) = &state.copy_feedback {
        actions.push_str(&format!("  {feedback}"));
    }
    let text = format!(
        "Vendor: {}\nInvoice #: {}  Date: {}  Currency: {}\nSubtotal: {}  Tax: {}  Total: {}\n\n{}",
        display_field(&s.vendor_name),
        display_field(&s.invoice_number),
        display_field(&s.invoice_date),
        display_field(&s.currency),
        display_field(&s.subtotal),
        display_field(&s.tax),
        display_field(&s.total),
        actions,
    );
    Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("SUMMARY"))
        .wrap(Wrap { trim: true })
}

fn draw_error(f: &mut Frame, state: &WorkflowState, area: Rect) {
    let message = state
        .error
        .as_deref()
        .unwrap_or("Something went wrong. Please try again with a clearer image.");
    let text = format!(
        "We hit a snag\n\n{message}\n\n\
         r: retry (back to start)\n\
         s: try sample invoice"
    );
    let panel = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("ERROR"))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });
    f.render_widget(panel, area);
}

/// One-line toast overlay in the top-right corner of the body.
fn draw_toast(f: &mut Frame, state: &WorkflowState, body: Rect) {
    let Some(toast) = &state.toast else {
        return;
    };
    let width = (toast.message.chars().count() as u16 + 4).min(body.width);
    let area = Rect {
        x: body.x + body.width.saturating_sub(width),
        y: body.y,
        width,
        height: 3.min(body.height),
    };
    let style = match toast.kind {
        ToastKind::Success => Style::default().fg(Color::Green),
        ToastKind::Error => Style::default().fg(Color::Red),
    };
    f.render_widget(Clear, area);
    let widget = Paragraph::new(toast.message.clone())
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(widget, area);
}

fn build_status_bar(app: &App) -> Paragraph<'static> {
    let state = app.workflow.state();
    let stage_name = match state.stage {
        Stage::Landing => "Landing",
        Stage::Processing => "Processing",
        Stage::Result => "Result",
        Stage::Error => "Error",
    };

    let status_text = if let Some(err) = &state.error {
        format!("[{stage_name}] ERROR: {err}")
    } else {
        format!("[{stage_name}] {}", app.status)
    };

    let mut status_bar = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("STATUS"))
        .wrap(Wrap { trim: true });
    if state.error.is_some() {
        status_bar = status_bar.style(Style::default().fg(Color::Red));
    }
    status_bar
}

fn help_text(shortcuts: &Shortcuts) -> String {
    let sc = &shortcuts.main;
    format!(
        "{}: upload | {}: sample | {}: download | {}: copy rows | {}: reset | {}: quit",
        sc.upload.join("/"),
        sc.sample.join("/"),
        sc.download.join("/"),
        sc.copy.join("/"),
        sc.reset.join("/"),
        sc.quit.join("/"),
    )
}
