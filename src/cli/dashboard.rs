use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph},
    Frame,
};

use crate::cli::import_manager::{ImportAction, ImportScreen};
use crate::error::Result;
use crate::fmt::{compact_money, money};
use crate::models::DaysLeft;
use crate::portfolio::{Portfolio, PortfolioSummary};
use crate::settings::{ensure_settings_file, load_settings, Settings};
use crate::tui::{change_span, credit_span, FOOTER_STYLE, HEADER_STYLE};

const MENU_ITEMS: &[&str] = &[
    "Import positions from CSV",
    "Refresh watchlist quotes",
    "Quit",
];

enum DashboardScreen {
    Home,
    Import(ImportScreen),
}

enum HomeAction {
    OpenImport,
    RefreshQuotes,
    Quit,
}

struct Dashboard {
    screen: DashboardScreen,
    greeting: String,
    menu_selection: usize,
    summary: PortfolioSummary,
    expiring_soon_days: i64,
    status_message: Option<String>,
    pending: Option<HomeAction>,
}

impl Dashboard {
    fn new(settings: &Settings, portfolio: &Portfolio) -> Self {
        let greeting = if settings.user_name.is_empty() {
            format!("Condor \u{2014} options book \u{00b7} {}", Local::now().format("%b %d"))
        } else {
            format!(
                "Condor \u{2014} {}'s book \u{00b7} {}",
                settings.user_name,
                Local::now().format("%b %d")
            )
        };
        Self {
            screen: DashboardScreen::Home,
            greeting,
            menu_selection: 0,
            summary: portfolio.summary(settings.expiring_soon_days),
            expiring_soon_days: settings.expiring_soon_days,
            status_message: None,
            pending: None,
        }
    }

    fn reload(&mut self, portfolio: &Portfolio) {
        self.summary = portfolio.summary(self.expiring_soon_days);
    }

    fn draw(&mut self, frame: &mut Frame, portfolio: &Portfolio) {
        if let DashboardScreen::Import(ref mut screen) = self.screen {
            screen.draw(frame);
            return;
        }
        self.draw_home(frame, portfolio);
    }

    fn draw_home(&self, frame: &mut Frame, portfolio: &Portfolio) {
        let area = frame.area();
        let border_style = Style::default().fg(Color::DarkGray);

        let menu_rows = MENU_ITEMS.len() as u16 + 1;

        let [header_area, sep1, stats_area, sep2, mid_area, sep3, positions_area, menu_area, hints_area] =
            Layout::vertical([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(10),
                Constraint::Length(1),
                Constraint::Fill(1),
                Constraint::Length(menu_rows),
                Constraint::Length(1),
            ])
            .areas(area);

        frame.render_widget(
            Paragraph::new(format!(" {}", self.greeting)).style(HEADER_STYLE),
            header_area,
        );

        let sep_line = "\u{2501}".repeat(area.width as usize);
        let sep_widget = Paragraph::new(sep_line.as_str()).style(border_style);
        frame.render_widget(sep_widget.clone(), sep1);
        frame.render_widget(sep_widget.clone(), sep2);
        frame.render_widget(sep_widget.clone(), sep3);

        self.draw_stats(frame, stats_area);

        let [chart_area, watch_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(mid_area);
        self.draw_strategy_chart(frame, chart_area);
        draw_watchlist(frame, watch_area, portfolio);

        draw_positions(frame, positions_area, portfolio);

        self.draw_menu(frame, menu_area);

        if let Some(msg) = &self.status_message {
            frame.render_widget(
                Paragraph::new(format!(" {msg}")).style(Style::default().fg(Color::Yellow)),
                hints_area,
            );
        } else {
            frame.render_widget(
                Paragraph::new(" Up/Down=navigate  Enter=select  i=import  r=refresh  q=quit")
                    .style(FOOTER_STYLE),
                hints_area,
            );
        }
    }

    fn draw_stats(&self, frame: &mut Frame, stats_area: Rect) {
        let [left_area, right_area] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                .areas(stats_area);

        let s = &self.summary;
        let left = vec![
            Line::from(format!(" Open Positions   {}", s.open_positions)),
            Line::from(vec![
                Span::raw(" Credit Collected "),
                credit_span(s.total_credit),
            ]),
            Line::from(format!(" Contracts        {}", s.total_contracts)),
        ];
        frame.render_widget(Paragraph::new(left), left_area);

        let right = vec![
            Line::from(format!(
                " Expiring \u{2264}{}d     {}",
                self.expiring_soon_days, s.expiring_soon
            )),
            Line::from(format!(" Expired          {}", s.expired)),
            Line::from(format!(" Strategies       {}", s.strategy_credit.len())),
        ];
        frame.render_widget(Paragraph::new(right), right_area);
    }

    fn draw_strategy_chart(&self, frame: &mut Frame, chart_area: Rect) {
        if self.summary.strategy_credit.is_empty() {
            frame.render_widget(
                Paragraph::new(" No positions yet \u{2014} import a CSV to get started.")
                    .style(FOOTER_STYLE),
                chart_area,
            );
            return;
        }

        let max_val = self
            .summary
            .strategy_credit
            .iter()
            .map(|(_, credit)| *credit)
            .fold(0.0f64, f64::max);
        let (top_tick, mid_tick) = y_axis_ticks(max_val);
        let top_label = compact_money(top_tick);
        let mid_label = compact_money(mid_tick);
        let y_label_width = top_label.len().max(mid_label.len()) as u16 + 1;

        let [y_axis_area, bar_area] =
            Layout::horizontal([Constraint::Length(y_label_width), Constraint::Fill(1)])
                .areas(chart_area);

        let inner_height = bar_area.height.saturating_sub(2); // title + labels
        let mid_row = inner_height / 2;
        let mut y_lines: Vec<Line> = vec![Line::from("")];
        for row in 0..inner_height {
            if row == 0 {
                y_lines.push(Line::from(Span::styled(
                    format!("{:>width$}", top_label, width = y_label_width as usize),
                    FOOTER_STYLE,
                )));
            } else if row == mid_row {
                y_lines.push(Line::from(Span::styled(
                    format!("{:>width$}", mid_label, width = y_label_width as usize),
                    FOOTER_STYLE,
                )));
            } else {
                y_lines.push(Line::from(""));
            }
        }
        frame.render_widget(Paragraph::new(y_lines), y_axis_area);

        let bar_style = Style::default().fg(Color::Rgb(80, 220, 100));
        let bars: Vec<Bar> = self
            .summary
            .strategy_credit
            .iter()
            .map(|(strategy, credit)| {
                Bar::default()
                    .value(*credit as u64)
                    .label(Line::from(abbreviate(strategy)))
                    .style(bar_style)
            })
            .collect();

        let block = Block::default()
            .title("Credit by Strategy")
            .title_style(Style::default().add_modifier(Modifier::BOLD))
            .borders(Borders::NONE);

        let chart = BarChart::default()
            .block(block)
            .bar_width(4)
            .bar_gap(2)
            .data(BarGroup::default().bars(&bars));
        frame.render_widget(chart, bar_area);
    }

    fn draw_menu(&self, frame: &mut Frame, menu_area: Rect) {
        let [title_area, items_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(menu_area);
        frame.render_widget(
            Paragraph::new(Span::styled(
                " What would you like to do?",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            title_area,
        );

        let lines: Vec<Line> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let marker = if i == self.menu_selection { ">" } else { " " };
                let style = if i == self.menu_selection {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(Span::styled(format!(" {marker} {item}"), style))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), items_area);
    }

    fn handle_home_key(&mut self, code: KeyCode) {
        self.status_message = None;
        match code {
            KeyCode::Up => self.menu_selection = self.menu_selection.saturating_sub(1),
            KeyCode::Down => {
                self.menu_selection = (self.menu_selection + 1).min(MENU_ITEMS.len() - 1)
            }
            KeyCode::Char('q') => self.pending = Some(HomeAction::Quit),
            KeyCode::Char('i') => self.pending = Some(HomeAction::OpenImport),
            KeyCode::Char('r') => self.pending = Some(HomeAction::RefreshQuotes),
            KeyCode::Enter => {
                self.pending = match self.menu_selection {
                    0 => Some(HomeAction::OpenImport),
                    1 => Some(HomeAction::RefreshQuotes),
                    2 => Some(HomeAction::Quit),
                    _ => None,
                }
            }
            _ => {}
        }
    }
}

fn draw_watchlist(frame: &mut Frame, watch_area: Rect, portfolio: &Portfolio) {
    let mut lines = vec![Line::from(Span::styled(
        " Watchlist",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    let visible = watch_area.height.saturating_sub(1) as usize;
    for entry in portfolio.watchlist.iter().take(visible) {
        lines.push(Line::from(vec![
            Span::raw(format!(" {:<6} {:>10.2}  ", entry.symbol, entry.last_price)),
            change_span(entry.change_pct),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), watch_area);
}

fn draw_positions(frame: &mut Frame, positions_area: Rect, portfolio: &Portfolio) {
    let mut lines = vec![Line::from(Span::styled(
        format!(
            " {:<8}{:<20}{:<18}{:<12}{:>5}  {:>8}  {:>12}",
            "Symbol", "Strategy", "Strikes", "Expiration", "Qty", "Days", "Credit"
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    let visible = positions_area.height.saturating_sub(1) as usize;
    for pos in portfolio.positions.iter().take(visible) {
        let days = pos.days_left();
        let days_text = days.map(|d| d.to_string()).unwrap_or_default();
        let days_style = match days {
            Some(DaysLeft::Expired) => Style::default().fg(Color::Red),
            Some(DaysLeft::Days(n)) if n <= 7 => Style::default().fg(Color::Yellow),
            _ => Style::default(),
        };
        lines.push(Line::from(vec![
            Span::raw(format!(
                " {:<8}{:<20}{:<18}{:<12}{:>5}  ",
                pos.symbol(),
                pos.strategy(),
                pos.strikes(),
                pos.expiration_date(),
                pos.quantity()
            )),
            Span::styled(format!("{days_text:>8}"), days_style),
            Span::raw(format!("  {:>12}", money(pos.credit_amount()))),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), positions_area);
}

/// Short bar label for a strategy: initials for multi-word names, a prefix
/// for single words ("Iron Condor" -> "IC", "Strangle" -> "STR").
fn abbreviate(strategy: &str) -> String {
    let words: Vec<&str> = strategy.split_whitespace().collect();
    if words.len() >= 2 {
        words
            .iter()
            .filter_map(|w| w.chars().next())
            .map(|c| c.to_ascii_uppercase())
            .collect()
    } else {
        strategy.chars().take(3).collect::<String>().to_uppercase()
    }
}

/// Pick round y-axis tick values (top and mid) given a max data value.
fn y_axis_ticks(max_val: f64) -> (f64, f64) {
    let steps = [
        100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 25000.0, 50000.0, 100000.0,
        250000.0, 500000.0,
    ];
    let top = steps
        .iter()
        .copied()
        .find(|&s| s >= max_val)
        .unwrap_or(max_val);
    let mid = top / 2.0;
    (top, mid)
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

pub fn run() -> Result<()> {
    ensure_settings_file()?;
    let settings = load_settings();

    let mut portfolio = if settings.load_sample_data {
        Portfolio::sample()
    } else {
        Portfolio::new()
    };
    portfolio.refresh_quotes();

    let mut dashboard = Dashboard::new(&settings, &portfolio);

    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));

    let mut terminal = ratatui::init();

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| dashboard.draw(frame, &portfolio)) {
            break Err(e.into());
        }

        match event::read() {
            Err(e) => break Err(e.into()),
            Ok(Event::Key(key)) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break Ok(());
                }

                let mut return_home = false;
                let mut committed = None;
                match dashboard.screen {
                    DashboardScreen::Home => dashboard.handle_home_key(key.code),
                    DashboardScreen::Import(ref mut screen) => match screen.handle_key(key.code) {
                        ImportAction::Continue => {}
                        ImportAction::Committed(records) => committed = Some(records),
                        ImportAction::Close => return_home = true,
                    },
                }

                if let Some(records) = committed {
                    let count = records.len();
                    portfolio.commit_imported(records);
                    dashboard.reload(&portfolio);
                    dashboard.status_message =
                        Some(format!("Imported {count} position(s)."));
                }

                if return_home {
                    dashboard.screen = DashboardScreen::Home;
                    dashboard.reload(&portfolio);
                }

                match dashboard.pending.take() {
                    Some(HomeAction::OpenImport) => {
                        dashboard.screen = DashboardScreen::Import(ImportScreen::new());
                    }
                    Some(HomeAction::RefreshQuotes) => {
                        portfolio.refresh_quotes();
                        dashboard.reload(&portfolio);
                        dashboard.status_message = Some("Quotes refreshed.".to_string());
                    }
                    Some(HomeAction::Quit) => break Ok(()),
                    None => {}
                }
            }
            _ => {}
        }
    };

    drop(terminal);
    ratatui::restore();
    result
}
