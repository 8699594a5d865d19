use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use svs_terminal::export;
use svs_terminal::history::{self, state_label, Outcome};
use svs_terminal::loader;
use svs_terminal::selection::FilterKind;
use svs_terminal::state::{AppState, Panel};
use svs_terminal::table::{Cell, TableView};

struct App {
    state: AppState,
    source: String,
    should_quit: bool,
}

impl App {
    fn new() -> Self {
        Self {
            state: AppState::new(),
            source: String::new(),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.state.search_active = false,
                KeyCode::Backspace => self.state.search_pop(),
                KeyCode::Char(ch) => self.state.search_push(ch),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.state.cycle_focus(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char(' ') => self.state.toggle_current(),
            KeyCode::Char('a') | KeyCode::Char('A') => self.state.select_all_focused(),
            KeyCode::Char('c') | KeyCode::Char('C') => self.state.clear_focused(),
            KeyCode::Char('/') => {
                if self.state.focus != Panel::Table {
                    self.state.search_active = true;
                }
            }
            KeyCode::Char('p') | KeyCode::Char('P') => self.state.cycle_filter(FilterKind::Prep),
            KeyCode::Char('s') | KeyCode::Char('S') => self.state.cycle_filter(FilterKind::Castle),
            KeyCode::Char('m') | KeyCode::Char('M') => {
                self.state.cycle_filter(FilterKind::MatchOccurred)
            }
            KeyCode::Char('x') | KeyCode::Char('X') => self.state.clear_filters(),
            KeyCode::Char('n') => self.state.page_next(),
            KeyCode::Char('b') => self.state.page_prev(),
            KeyCode::Char('g') => self.state.page_first(),
            KeyCode::Char('G') => self.state.page_last(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export_snapshot(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn export_snapshot(&mut self) {
        if !self.state.loaded {
            self.state.push_log("[INFO] Nothing to export");
            return;
        }
        let path = export::default_export_path();
        match export::export_table(&self.state.history, &self.state.selection, &path) {
            Ok(report) => self.state.push_log(format!(
                "[INFO] Exported {} states x {} dates to {}",
                report.states,
                report.dates,
                report.path.display()
            )),
            Err(err) => self.state.push_log(format!("[ERROR] Export failed: {err:#}")),
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let mut app = App::new();
    if app.state.debug {
        app.state.push_log("[DEBUG] Debug mode enabled");
    }

    // The one fetch per run happens before any interaction is possible;
    // a failure leaves the table empty (no retry).
    app.source = loader::resolve_source();
    match loader::load_history(&app.source) {
        Ok(doc) => {
            let normalized = history::normalize(doc);
            app.state.load(normalized);
        }
        Err(err) => app.state.load_failed(&err),
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(26), Constraint::Min(40)])
        .split(chunks[1]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0]);

    render_states_panel(frame, side[0], &app.state);
    render_dates_panel(frame, side[1], &app.state);

    let view = app.state.table();
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(5),
        ])
        .split(columns[1]);

    render_filter_line(frame, right[0], &app.state);
    render_table(frame, right[1], &app.state, &view);
    render_page_line(frame, right[2], &app.state, &view);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, right[3]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let line1 = format!(
        "SVS HISTORY | {} states | {} dates{}",
        app.state.history.states.len(),
        app.state.history.all_dates.len(),
        if app.state.debug { " | DEBUG" } else { "" }
    );
    let line2 = format!("Source: {}", app.source);
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    if state.search_active {
        return "Type to search | Backspace Delete | Enter/Esc Done".to_string();
    }
    match state.focus {
        Panel::States | Panel::Dates => {
            "Tab Panel | j/k/↑/↓ Move | Space Toggle | a All | c Clear | / Search | p/s/m Filters | x Clear filters | n/b Page | e Export | ? Help | q Quit"
                .to_string()
        }
        Panel::Table => {
            "Tab Panel | j/k/↑/↓ Scroll | n/b Page | g/G First/Last | p/s/m Filters | x Clear filters | e Export | ? Help | q Quit"
                .to_string()
        }
    }
}

fn render_states_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = state.visible_states();
    let lines = checkbox_lines(
        &visible
            .iter()
            .map(|id| (state_label(id), state.selection.states.contains(id)))
            .collect::<Vec<_>>(),
        state.state_cursor,
        area.height,
        &state.state_search,
        state.focus == Panel::States,
        state.search_active && state.focus == Panel::States,
    );
    let title = format!("States ({}/{})", state.selection.states.len(), state.history.states.len());
    render_panel(frame, area, &title, lines, state.focus == Panel::States);
}

fn render_dates_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let visible = state.visible_dates();
    let lines = checkbox_lines(
        &visible
            .iter()
            .map(|date| (date.clone(), state.selection.dates.iter().any(|d| d == date)))
            .collect::<Vec<_>>(),
        state.date_cursor,
        area.height,
        &state.date_search,
        state.focus == Panel::Dates,
        state.search_active && state.focus == Panel::Dates,
    );
    let title = format!("Dates ({}/{})", state.selection.dates.len(), state.history.all_dates.len());
    render_panel(frame, area, &title, lines, state.focus == Panel::Dates);
}

fn render_panel(frame: &mut Frame, area: Rect, title: &str, lines: Vec<Line>, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let panel = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .title(title.to_string())
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(panel, area);
}

fn checkbox_lines(
    entries: &[(String, bool)],
    cursor: usize,
    panel_height: u16,
    search: &str,
    focused: bool,
    editing: bool,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let search_style = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    lines.push(Line::from(Span::styled(
        format!("Search: {search}"),
        search_style,
    )));

    // Borders take two rows, the search line one more.
    let visible = panel_height.saturating_sub(3) as usize;
    let (start, end) = visible_range(cursor, entries.len(), visible);
    for (idx, (label, checked)) in entries.iter().enumerate().take(end).skip(start) {
        let marker = if *checked { "[x]" } else { "[ ]" };
        let prefix = if focused && idx == cursor { "> " } else { "  " };
        let style = if focused && idx == cursor {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{prefix}{marker} {label}"),
            style,
        )));
    }
    lines
}

fn render_filter_line(frame: &mut Frame, area: Rect, state: &AppState) {
    let filters = state.selection.filters;
    let show = |value: Option<bool>| match value {
        None => "off",
        Some(true) => "Yes",
        Some(false) => "No",
    };
    let mut text = format!(
        "Filters: Prep={} Castle={} Match={}",
        show(filters.prep),
        show(filters.castle),
        show(filters.had_match)
    );
    let style = if state.selection.filters_active() {
        Style::default()
    } else {
        if filters.any() {
            text.push_str("  (select exactly one date to apply)");
        }
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_page_line(frame: &mut Frame, area: Rect, state: &AppState, view: &TableView) {
    let text = format!(
        "Page {}/{} | {} rows | g/G first/last, b/n prev/next",
        view.page, view.total_pages, view.total_rows
    );
    let style = if state.focus == Panel::Table {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

const ROW_HEIGHT: u16 = 3;

fn render_table(frame: &mut Frame, area: Rect, state: &AppState, view: &TableView) {
    if !state.loaded {
        let empty = Paragraph::new("No data loaded")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let mut widths = vec![Constraint::Length(11)];
    widths.extend(view.columns.iter().map(|_| Constraint::Length(17)));

    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.clone())
        .split(sections[0]);
    let header_style = Style::default().add_modifier(Modifier::BOLD);
    render_cell_text(frame, header_cols[0], "State", header_style);
    for (idx, date) in view.columns.iter().enumerate() {
        render_cell_text(frame, header_cols[idx + 1], date, header_style);
    }

    let body = sections[1];
    if view.columns.is_empty() {
        let empty = Paragraph::new("No dates selected")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, body);
        return;
    }
    if view.rows.is_empty() {
        let empty = Paragraph::new("No states match the current selection")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, body);
        return;
    }
    if body.height < ROW_HEIGHT {
        return;
    }

    let visible = (body.height / ROW_HEIGHT) as usize;
    let start = state
        .table_scroll
        .min(view.rows.len().saturating_sub(visible));
    let end = (start + visible).min(view.rows.len());

    for (i, row) in view.rows[start..end].iter().enumerate() {
        let row_area = Rect {
            x: body.x,
            y: body.y + (i as u16) * ROW_HEIGHT,
            width: body.width,
            height: ROW_HEIGHT,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths.clone())
            .split(row_area);

        render_cell_text(
            frame,
            cols[0],
            &state_label(&row.state),
            Style::default().add_modifier(Modifier::BOLD),
        );
        for (c, cell) in row.cells.iter().enumerate() {
            let paragraph = Paragraph::new(cell_text(cell));
            frame.render_widget(paragraph, cols[c + 1]);
        }
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text.to_string()).style(style);
    frame.render_widget(paragraph, area);
}

fn cell_text(cell: &Cell) -> Text<'static> {
    match cell {
        Cell::NoData => Text::from(Line::from(Span::styled(
            "No Data",
            Style::default().fg(Color::DarkGray),
        ))),
        Cell::NoMatch => Text::from(Line::from(Span::styled(
            "No Match",
            Style::default().fg(Color::Yellow),
        ))),
        Cell::Played {
            prep,
            castle,
            opposition,
        } => Text::from(vec![
            outcome_line("Prep", *prep),
            outcome_line("Castle", *castle),
            Line::from(format!("Opp: {}", opposition.label())),
        ]),
    }
}

fn outcome_line(label: &str, outcome: Outcome) -> Line<'static> {
    let style = match outcome {
        Outcome::Won => Style::default().fg(Color::Green),
        Outcome::Lost => Style::default().fg(Color::Red),
        Outcome::Unknown => Style::default().fg(Color::DarkGray),
    };
    Line::from(vec![
        Span::raw(format!("{label}: ")),
        Span::styled(outcome.label().to_string(), style),
    ])
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "SvS History - Help",
        "",
        "Global:",
        "  Tab          Cycle panel focus",
        "  j/k or ↑/↓   Move / scroll",
        "  n / b        Next / previous page",
        "  g / G        First / last page",
        "  e            Export table to .xlsx",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "States / Dates panels:",
        "  Space        Toggle checkbox",
        "  a / c        Select all / clear all",
        "  /            Edit search (Enter/Esc done)",
        "",
        "Filters (need exactly one selected date):",
        "  p / s / m    Cycle prep / castle / match filter",
        "  x            Clear filters",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
