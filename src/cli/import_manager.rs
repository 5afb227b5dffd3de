use std::path::Path;

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::fmt::money;
use crate::models::ImportRecord;
use crate::session::{ImportSession, SessionState};
use crate::settings::shellexpand;
use crate::tui::{wrap_text, FOOTER_STYLE, HEADER_STYLE, INVALID_STYLE, SELECTED_STYLE};

pub enum ImportAction {
    Continue,
    /// Valid rows accepted; caller merges them into the book.
    Committed(Vec<ImportRecord>),
    Close,
}

/// Interactive surface over an ImportSession: a path form while uploading,
/// a scrollable record table while previewing, a summary once complete.
pub struct ImportScreen {
    session: ImportSession,
    file_path: String,
    selected: usize,
    offset: usize,
    status: Option<String>,
}

impl ImportScreen {
    pub fn new() -> Self {
        Self {
            session: ImportSession::new(),
            file_path: String::new(),
            selected: 0,
            offset: 0,
            status: None,
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let [header_area, sep, content_area, hints_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(" Import Positions from CSV").style(HEADER_STYLE),
            header_area,
        );

        let sep_line = "\u{2501}".repeat(area.width as usize);
        frame.render_widget(Paragraph::new(sep_line.as_str()).style(border_style), sep);

        match self.session.state() {
            SessionState::Upload => self.draw_upload(frame, content_area, hints_area),
            SessionState::Preview => self.draw_preview(frame, content_area, hints_area),
            SessionState::Complete => self.draw_complete(frame, content_area, hints_area),
        }
    }

    fn draw_upload(&self, frame: &mut Frame, content_area: Rect, hints_area: Rect) {
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                " Load a CSV export",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    "   File path      ",
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{}_", self.file_path),
                    Style::default().fg(Color::Cyan),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "   Expected columns: Symbol, strategy, trade_date, expiration_date,",
                FOOTER_STYLE,
            )),
            Line::from(Span::styled(
                "   quantity, Days left, credit_amount (any order)",
                FOOTER_STYLE,
            )),
        ];

        let message = self.session.alert().or(self.status.as_deref());
        if let Some(msg) = message {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("   {msg}"),
                Style::default().fg(Color::Yellow),
            )));
        }

        frame.render_widget(Paragraph::new(lines), content_area);
        frame.render_widget(
            Paragraph::new(" Enter=load  Esc=cancel").style(FOOTER_STYLE),
            hints_area,
        );
    }

    fn draw_preview(&mut self, frame: &mut Frame, content_area: Rect, hints_area: Rect) {
        let Some(batch) = self.session.batch() else {
            return;
        };

        let valid = batch.valid_count();
        let invalid = batch.invalid_count();
        let total = batch.total();

        // counts + table header + separator + detail block
        let detail_height = 4usize;
        let visible = (content_area.height as usize)
            .saturating_sub(3 + detail_height)
            .max(3);
        if self.selected >= self.offset + visible {
            self.offset = self.selected + 1 - visible;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        }

        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    format!(" {valid} valid"),
                    Style::default().fg(Color::Green),
                ),
                Span::raw("  \u{00b7}  "),
                Span::styled(
                    format!("{invalid} invalid"),
                    if invalid > 0 {
                        Style::default().fg(Color::Red)
                    } else {
                        Style::default()
                    },
                ),
                Span::raw(format!("  \u{00b7}  {total} rows")),
            ]),
            Line::from(Span::styled(
                format!(
                    " {:<10}{:<8}{:<20}{:>5}  {:>8}  {:>12}  {}",
                    "Row", "Symbol", "Strategy", "Qty", "Days", "Credit", "Status"
                ),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ];

        for (i, record) in batch
            .records
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(visible)
        {
            let days = record
                .days_left
                .map(|d| d.to_string())
                .unwrap_or_default();
            let status = if record.is_valid { "ok" } else { "invalid" };
            let text = format!(
                " {:<10}{:<8}{:<20}{:>5}  {:>8}  {:>12}  {}",
                record.id,
                truncate(&record.symbol, 7),
                truncate(&record.strategy, 19),
                record.quantity,
                days,
                money(record.credit_amount),
                status
            );
            let style = if i == self.selected {
                SELECTED_STYLE
            } else if record.is_valid {
                Style::default()
            } else {
                INVALID_STYLE
            };
            lines.push(Line::from(Span::styled(text, style)));
        }

        lines.push(Line::from(""));
        if let Some(record) = batch.records.get(self.selected) {
            if record.errors.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!(" {}: no validation errors", record.id),
                    FOOTER_STYLE,
                )));
            } else {
                let width = (content_area.width as usize).saturating_sub(6).max(20);
                let joined = record.errors.join("; ");
                let (wrapped, _) = wrap_text(&joined, width);
                lines.push(Line::from(Span::styled(
                    format!(" {}:", record.id),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
                for row in wrapped.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("   {row}"),
                        INVALID_STYLE,
                    )));
                }
            }
        }

        frame.render_widget(Paragraph::new(lines), content_area);

        let hints = if self.session.can_commit() {
            " Enter=import valid rows  Up/Down=select  Esc=back"
        } else {
            " No valid rows to import  Esc=back"
        };
        frame.render_widget(Paragraph::new(hints).style(FOOTER_STYLE), hints_area);
    }

    fn draw_complete(&self, frame: &mut Frame, content_area: Rect, hints_area: Rect) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!(
                    " Imported {} position(s) into the book.",
                    self.session.committed()
                ),
                Style::default().fg(Color::Green),
            )),
        ];
        frame.render_widget(Paragraph::new(lines), content_area);
        frame.render_widget(
            Paragraph::new(" Esc=close").style(FOOTER_STYLE),
            hints_area,
        );
    }

    pub fn handle_key(&mut self, code: KeyCode) -> ImportAction {
        match self.session.state() {
            SessionState::Upload => self.handle_upload_key(code),
            SessionState::Preview => self.handle_preview_key(code),
            SessionState::Complete => match code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => ImportAction::Close,
                _ => ImportAction::Continue,
            },
        }
    }

    fn handle_upload_key(&mut self, code: KeyCode) -> ImportAction {
        match code {
            KeyCode::Esc => return ImportAction::Close,
            KeyCode::Char(c) => {
                self.file_path.push(c);
                self.status = None;
                self.session.take_alert();
            }
            KeyCode::Backspace => {
                self.file_path.pop();
                self.status = None;
                self.session.take_alert();
            }
            KeyCode::Enter => {
                let trimmed = self.file_path.trim().to_string();
                if trimmed.is_empty() {
                    self.status = Some("File path is required".to_string());
                    return ImportAction::Continue;
                }
                let expanded = shellexpand(&trimmed);
                if self.session.offer_file(Path::new(&expanded)) {
                    self.selected = 0;
                    self.offset = 0;
                    self.status = None;
                }
            }
            _ => {}
        }
        ImportAction::Continue
    }

    fn handle_preview_key(&mut self, code: KeyCode) -> ImportAction {
        let total = self.session.total_count();
        match code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if total > 0 {
                    self.selected = (self.selected + 1).min(total - 1);
                }
            }
            KeyCode::Esc | KeyCode::Char('b') => self.session.back(),
            KeyCode::Enter => {
                if let Some(records) = self.session.commit() {
                    return ImportAction::Committed(records);
                }
            }
            _ => {}
        }
        ImportAction::Continue
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}\u{2026}")
    }
}
