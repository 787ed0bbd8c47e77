use std::io;
use std::sync::mpsc;
use std::time::Duration;
use std::time::Instant;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;

use dining_core::{
    action_enabled, project_panels, ranked_ax_suggestions, ranked_dx_suggestions, reduce,
    visible_beliefs, ActionId, DiagnosisId, LogEntry, LogLevel, LogSource, PanelProjection,
    RuntimeAction, StudyAction, StudyEffect, StudyState, Timestamp, UserAction, CERTAINTY_MAX,
};
use dining_exec::{TransitionEvent, TransitionOrchestrator};

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show);
    }
}

pub fn run(
    mut state: StudyState,
    orchestrator: TransitionOrchestrator,
    events: mpsc::Receiver<TransitionEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut view = ViewState::new(orchestrator.transport_label());

    run_app(&mut terminal, &mut state, &mut view, &orchestrator, &events).map_err(|e| e.into())
}

/// Cursor positions and playback clock. Purely presentational, so it lives
/// beside the store rather than in it.
#[derive(Debug)]
struct ViewState {
    dx_cursor: usize,
    ax_cursor: usize,
    playback_started: Option<Instant>,
    notice: Option<String>,
    transport: String,
}

impl ViewState {
    fn new(transport: &str) -> Self {
        Self {
            dx_cursor: 0,
            ax_cursor: 0,
            playback_started: None,
            notice: None,
            transport: transport.to_string(),
        }
    }
}

#[derive(Clone, Copy)]
struct UiPalette {
    accent: Color,
    success: Color,
    warning: Color,
    danger: Color,
    muted: Color,
    border: Color,
    selected_bg: Color,
}

const PALETTE: UiPalette = UiPalette {
    accent: Color::Cyan,
    success: Color::Green,
    warning: Color::Yellow,
    danger: Color::Red,
    muted: Color::DarkGray,
    border: Color::Gray,
    selected_bg: Color::DarkGray,
};

fn now_seconds() -> Timestamp {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}

enum KeyHandlerResult {
    Continue(Vec<StudyEffect>),
    Exit,
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut StudyState,
    view: &mut ViewState,
    orchestrator: &TransitionOrchestrator,
    events: &mpsc::Receiver<TransitionEvent>,
) -> io::Result<()> {
    loop {
        while let Ok(event) = events.try_recv() {
            if let TransitionEvent::Completed { elapsed_ms, .. } = &event {
                let entry = LogEntry::new(
                    LogLevel::Debug,
                    LogSource::Orchestrator,
                    state.round(),
                    format!("server answered in {elapsed_ms} ms"),
                );
                reduce(
                    state,
                    StudyAction::Runtime(RuntimeAction::AppendStructuredLog(entry)),
                );
            }
            let effects = reduce(state, StudyAction::Runtime(event.into_action()));
            dispatch_effects(effects, state, orchestrator);
        }

        let effects = advance_playback(state, view, Instant::now(), now_seconds());
        dispatch_effects(effects, state, orchestrator);

        terminal.draw(|f| ui(f, state, view))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key_event(key, state, view, now_seconds()) {
                    KeyHandlerResult::Continue(effects) => {
                        dispatch_effects(effects, state, orchestrator)
                    }
                    KeyHandlerResult::Exit => return Ok(()),
                }
            }
        }
    }
}

fn dispatch_effects(
    effects: Vec<StudyEffect>,
    state: &mut StudyState,
    orchestrator: &TransitionOrchestrator,
) {
    for effect in effects {
        match effect {
            StudyEffect::SubmitTransition(request) => {
                if let Err(err) = orchestrator.submit(request) {
                    let entry = LogEntry::new(
                        LogLevel::Warn,
                        LogSource::Orchestrator,
                        state.round(),
                        format!("request not sent: {err}"),
                    );
                    reduce(
                        state,
                        StudyAction::Runtime(RuntimeAction::AppendStructuredLog(entry)),
                    );
                }
            }
            // Every loop iteration redraws.
            StudyEffect::RequestFrame => {}
        }
    }
}

/// Starts the round's video as soon as the client is free to show it and
/// reports the end of playback once the configured duration has passed.
fn advance_playback(
    state: &mut StudyState,
    view: &mut ViewState,
    now: Instant,
    at: Timestamp,
) -> Vec<StudyEffect> {
    let ui = &state.ui_status;
    if !ui.video_loaded && !ui.awaiting_response && ui.video_loaded_time.is_none() {
        view.playback_started = Some(now);
        view.dx_cursor = 0;
        view.ax_cursor = 0;
        return reduce(state, StudyAction::User(UserAction::PlayVideo { at }));
    }
    if !ui.video_playing {
        return Vec::new();
    }

    let started = *view.playback_started.get_or_insert(now);
    let duration = Duration::from_millis(state.config.playback.video_duration_ms);
    if now.saturating_duration_since(started) >= duration {
        view.playback_started = None;
        return reduce(state, StudyAction::User(UserAction::DisplayState { at }));
    }
    Vec::new()
}

fn playback_ratio(state: &StudyState, view: &ViewState) -> f64 {
    let ui = &state.ui_status;
    if ui.video_finished() {
        return 1.0;
    }
    let (Some(started), true) = (view.playback_started, ui.video_playing) else {
        return 0.0;
    };
    let total = state.config.playback.video_duration_ms.max(1) as f64;
    (started.elapsed().as_millis() as f64 / total).clamp(0.0, 1.0)
}

fn move_cursor(cursor: &mut usize, len: usize, down: bool) {
    if len == 0 {
        *cursor = 0;
        return;
    }
    *cursor = if down {
        (*cursor + 1).min(len - 1)
    } else {
        cursor.saturating_sub(1)
    };
}

fn cursor_action(state: &StudyState, view: &ViewState) -> Option<ActionId> {
    state
        .config
        .catalog
        .actions
        .get(view.ax_cursor)
        .map(|entry| ActionId::new(entry.id.as_str()))
}

fn cursor_diagnosis(state: &StudyState, view: &ViewState) -> Option<DiagnosisId> {
    state
        .config
        .catalog
        .diagnoses
        .get(view.dx_cursor)
        .map(|entry| DiagnosisId::new(entry.id.as_str()))
}

fn copy_completion_link(state: &StudyState) -> String {
    let Some(url) = state.config.endpoint.completion_url.clone() else {
        return "No completion link is configured".to_string();
    };
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(url)) {
        Ok(()) => "Completion link copied".to_string(),
        Err(err) => format!("Could not copy link: {err}"),
    }
}

fn handle_key_event(
    key: event::KeyEvent,
    state: &mut StudyState,
    view: &mut ViewState,
    at: Timestamp,
) -> KeyHandlerResult {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyHandlerResult::Exit;
    }
    if key.code == KeyCode::Char('q') {
        return KeyHandlerResult::Exit;
    }

    let panels = project_panels(state);
    if panels.completion_visible {
        if key.code == KeyCode::Char('c') {
            view.notice = Some(copy_completion_link(state));
        }
        return KeyHandlerResult::Continue(Vec::new());
    }

    view.notice = None;
    let effects = match key.code {
        KeyCode::Up | KeyCode::Down => {
            let down = key.code == KeyCode::Down;
            if panels.diagnosis_enabled {
                let len = state.config.catalog.diagnoses.len();
                move_cursor(&mut view.dx_cursor, len, down);
            } else if panels.actions_visible {
                let len = state.config.catalog.actions.len();
                move_cursor(&mut view.ax_cursor, len, down);
            }
            Vec::new()
        }
        KeyCode::Char(' ') if panels.diagnosis_enabled => match cursor_diagnosis(state, view) {
            Some(diagnosis) => reduce(
                state,
                StudyAction::User(UserAction::ToggleDiagnosis(diagnosis)),
            ),
            None => Vec::new(),
        },
        KeyCode::Left if panels.certainty_enabled => {
            reduce(state, StudyAction::User(UserAction::AdjustCertainty(-1)))
        }
        KeyCode::Right if panels.certainty_enabled => {
            reduce(state, StudyAction::User(UserAction::AdjustCertainty(1)))
        }
        KeyCode::Enter => confirm(state, view, &panels, at),
        KeyCode::Char('r') if panels.retry_available => {
            reduce(state, StudyAction::User(UserAction::RetryTransition))
        }
        KeyCode::Char('x') => reduce(state, StudyAction::Runtime(RuntimeAction::ClearLogs)),
        _ => Vec::new(),
    };
    KeyHandlerResult::Continue(effects)
}

/// Enter confirms whichever panel is currently accepting input.
fn confirm(
    state: &mut StudyState,
    view: &mut ViewState,
    panels: &PanelProjection,
    at: Timestamp,
) -> Vec<StudyEffect> {
    if panels.diagnosis_enabled {
        if state.ui_status.selected_dx.is_empty() {
            view.notice = Some("Select at least one diagnosis first".to_string());
            return Vec::new();
        }
        let diagnoses = state.ui_status.selected_dx.clone();
        return reduce(
            state,
            StudyAction::User(UserAction::ConfirmDiagnoses { diagnoses, at }),
        );
    }
    if panels.certainty_enabled {
        let certainty = state.ui_status.certainty_draft;
        return reduce(
            state,
            StudyAction::User(UserAction::ConfirmCertainty { certainty }),
        );
    }
    if panels.actions_visible {
        let Some(action) = cursor_action(state, view) else {
            return Vec::new();
        };
        if !action_enabled(state, &action) {
            view.notice = Some("That action is not available right now".to_string());
            return Vec::new();
        }
        return reduce(
            state,
            StudyAction::User(UserAction::SelectAction { action, at }),
        );
    }
    Vec::new()
}

fn get_spinner() -> &'static str {
    let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let idx = (chrono::Utc::now().timestamp_millis() / 100).unsigned_abs() as usize % frames.len();
    frames[idx]
}

fn panel_block(title: &str, active: bool) -> Block<'_> {
    let border = if active { PALETTE.accent } else { PALETTE.border };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title)
}

fn marks(count: usize) -> String {
    "★".repeat(count)
}

fn ui(f: &mut ratatui::Frame, state: &StudyState, view: &ViewState) {
    let panels = project_panels(state);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(7), // Logs
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    // Header
    let status = if panels.communicating && state.ui_status.video_loaded_time.is_none() {
        format!("{} {}", get_spinner(), panels.phase.label())
    } else {
        panels.phase.label().to_string()
    };
    let header = Paragraph::new(format!(
        "Dining Room Study | Round {} | {} | Transport:{}",
        state.round() + 1,
        status,
        view.transport
    ))
    .style(Style::default().fg(PALETTE.accent))
    .block(panel_block("Participant", false));
    f.render_widget(header, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Video
            Constraint::Length(7), // Beliefs
            Constraint::Length(4), // Goal
            Constraint::Min(0),    // History
        ])
        .split(columns[0]);
    render_video(f, left[0], state, view, &panels);
    render_beliefs(f, left[1], state);
    render_goal(f, left[2], state);
    render_history(f, left[3], state);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // Diagnoses
            Constraint::Length(3),      // Certainty
            Constraint::Min(0),         // Actions
        ])
        .split(columns[1]);
    render_diagnoses(f, right[0], state, view, &panels);
    render_certainty(f, right[1], state, &panels);
    render_actions(f, right[2], state, view, &panels);

    render_logs(f, chunks[2], state);

    let footer_text = match &view.notice {
        Some(notice) => notice.clone(),
        None => "↑/↓ move | space toggle | ←/→ certainty | enter confirm | r retry | x clear logs | q quit"
            .to_string(),
    };
    let footer = Paragraph::new(footer_text).style(Style::default().fg(PALETTE.muted));
    f.render_widget(footer, chunks[3]);

    if panels.completion_visible {
        render_completion(f, state, view);
    }
}

fn render_video(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &StudyState,
    view: &ViewState,
    panels: &PanelProjection,
) {
    let block = panel_block("Robot camera", state.ui_status.video_playing);
    if let Some(error) = &state.ui_status.transition_error {
        let text = Paragraph::new(vec![
            Line::from(Span::styled(
                format!("Could not reach the robot: {error}"),
                Style::default().fg(PALETTE.danger),
            )),
            Line::from("Press r to try again."),
        ])
        .block(block)
        .wrap(Wrap { trim: true });
        f.render_widget(text, area);
        return;
    }
    if panels.communicating {
        let text = Paragraph::new(format!("{} Communicating with robot...", get_spinner()))
            .style(Style::default().fg(PALETTE.warning))
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(text, area);
        return;
    }

    let label = if state.ui_status.video_playing {
        format!("Playing {}", state.scenario_state.video_link)
    } else {
        format!("Finished {}", state.scenario_state.video_link)
    };
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(PALETTE.accent))
        .label(label)
        .ratio(playback_ratio(state, view));
    f.render_widget(gauge, area);
}

fn render_beliefs(f: &mut ratatui::Frame, area: Rect, state: &StudyState) {
    let lines: Vec<Line> = visible_beliefs(state)
        .into_iter()
        .map(|belief| {
            Line::from(vec![
                Span::styled(
                    format!("{}: ", belief.attr),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(belief.value.display()),
            ])
        })
        .collect();
    let text = Paragraph::new(lines)
        .block(panel_block("Robot beliefs", false))
        .wrap(Wrap { trim: true });
    f.render_widget(text, area);
}

fn render_goal(f: &mut ratatui::Frame, area: Rect, state: &StudyState) {
    let text = Paragraph::new(state.config.goal.sentence())
        .block(panel_block("Goal", false))
        .wrap(Wrap { trim: true });
    f.render_widget(text, area);
}

fn render_history(f: &mut ratatui::Frame, area: Rect, state: &StudyState) {
    let catalog = &state.config.catalog;
    let items: Vec<ListItem> = state
        .history
        .display_rows()
        .map(|(idx, entry)| {
            let errors = entry
                .errors
                .iter()
                .map(|id| catalog.diagnosis_label(id))
                .collect::<Vec<_>>()
                .join("; ");
            let (outcome, color) = if entry.result {
                ("succeeded", PALETTE.success)
            } else {
                ("failed", PALETTE.danger)
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{idx}. "), Style::default().fg(PALETTE.muted)),
                    Span::raw(catalog.action_label(&entry.action).to_string()),
                    Span::raw(" "),
                    Span::styled(outcome, Style::default().fg(color)),
                ]),
                Line::from(Span::styled(
                    format!("   {errors}"),
                    Style::default().fg(PALETTE.muted),
                )),
            ])
        })
        .collect();
    let list = List::new(items).block(panel_block("History", false));
    f.render_widget(list, area);
}

fn render_diagnoses(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &StudyState,
    view: &ViewState,
    panels: &PanelProjection,
) {
    let ranked = ranked_dx_suggestions(state);
    let ui = &state.ui_status;
    let shown: &[DiagnosisId] = if ui.diagnoses_confirmed() {
        &ui.confirmed_dx
    } else {
        &ui.selected_dx
    };
    let items: Vec<ListItem> = state
        .config
        .catalog
        .diagnoses
        .iter()
        .map(|entry| {
            let id = DiagnosisId::new(entry.id.as_str());
            let checked = if shown.contains(&id) { "[x]" } else { "[ ]" };
            let mut spans = vec![Span::raw(format!("{checked} {}", entry.label))];
            if panels.show_dx_suggestions {
                if let Some((_, count)) = ranked.iter().find(|(suggested, _)| **suggested == id) {
                    spans.push(Span::styled(
                        format!(" {}", marks(*count)),
                        Style::default().fg(PALETTE.warning),
                    ));
                }
            }
            let style = if panels.diagnosis_enabled {
                Style::default()
            } else {
                Style::default().fg(PALETTE.muted)
            };
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let title = if ui.diagnoses_confirmed() {
        "What went wrong? (confirmed)"
    } else {
        "What went wrong? (space select, enter confirm)"
    };
    let list = List::new(items)
        .block(panel_block(title, panels.diagnosis_enabled))
        .highlight_style(Style::default().bg(PALETTE.selected_bg));
    let mut list_state = ListState::default();
    if panels.diagnosis_enabled {
        list_state.select(Some(view.dx_cursor));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_certainty(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &StudyState,
    panels: &PanelProjection,
) {
    let block = panel_block("How certain are you? (1-5)", panels.certainty_enabled);
    if !panels.certainty_visible {
        f.render_widget(block, area);
        return;
    }
    let value = state
        .ui_status
        .dx_certainty
        .unwrap_or(state.ui_status.certainty_draft);
    let filled = usize::from(value);
    let empty = usize::from(CERTAINTY_MAX).saturating_sub(filled);
    let color = if panels.certainty_enabled {
        PALETTE.accent
    } else {
        PALETTE.success
    };
    let text = Paragraph::new(Line::from(vec![
        Span::styled("●".repeat(filled), Style::default().fg(color)),
        Span::styled("○".repeat(empty), Style::default().fg(PALETTE.muted)),
        Span::raw(format!("  {value}/{CERTAINTY_MAX}")),
    ]))
    .block(block);
    f.render_widget(text, area);
}

fn render_actions(
    f: &mut ratatui::Frame,
    area: Rect,
    state: &StudyState,
    view: &ViewState,
    panels: &PanelProjection,
) {
    let active = panels.actions_visible && !panels.actions_locked;
    let block = panel_block("What should the robot do?", active);
    if !panels.actions_visible {
        f.render_widget(block, area);
        return;
    }

    let ranked = ranked_ax_suggestions(state);
    let selected = state.ui_status.selected_action.as_ref();
    let items: Vec<ListItem> = state
        .config
        .catalog
        .actions
        .iter()
        .map(|entry| {
            let id = ActionId::new(entry.id.as_str());
            let enabled = action_enabled(state, &id);
            let mut spans = vec![Span::raw(entry.label.clone())];
            if panels.show_ax_suggestions {
                if let Some((_, count)) = ranked.iter().find(|(suggested, _)| **suggested == id) {
                    spans.push(Span::styled(
                        format!(" {}", marks(*count)),
                        Style::default().fg(PALETTE.warning),
                    ));
                }
            }
            let style = if selected == Some(&id) {
                Style::default()
                    .fg(PALETTE.accent)
                    .add_modifier(Modifier::BOLD)
            } else if enabled {
                Style::default()
            } else {
                Style::default().fg(PALETTE.muted)
            };
            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(PALETTE.selected_bg));
    let mut list_state = ListState::default();
    if active {
        list_state.select(Some(view.ax_cursor));
    }
    f.render_stateful_widget(list, area, &mut list_state);
}

fn format_ts(ts_ms: Option<u64>) -> String {
    ts_ms
        .and_then(|ms| chrono::DateTime::from_timestamp_millis(ms as i64))
        .map(|ts| ts.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Debug => PALETTE.muted,
        LogLevel::Info => Color::White,
        LogLevel::Warn => PALETTE.warning,
        LogLevel::Error => PALETTE.danger,
    }
}

fn render_logs(f: &mut ratatui::Frame, area: Rect, state: &StudyState) {
    let visible = usize::from(area.height.saturating_sub(2));
    let mut lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible)
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", format_ts(entry.ts_ms)),
                    Style::default().fg(PALETTE.muted),
                ),
                Span::styled(
                    format!("{:<5} ", entry.level.label()),
                    Style::default().fg(level_color(entry.level)),
                ),
                Span::styled(
                    format!("{}#{} ", entry.source.label(), entry.round),
                    Style::default().fg(PALETTE.muted),
                ),
                Span::raw(entry.message.clone()),
            ])
        })
        .collect();
    lines.reverse();
    let text = Paragraph::new(lines).block(panel_block("Log", false));
    f.render_widget(text, area);
}

fn render_completion(f: &mut ratatui::Frame, state: &StudyState, view: &ViewState) {
    let area = centered_rect(60, 30, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title("Scenario complete")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(PALETTE.success));

    let mut lines = vec![
        Line::from("Thank you! You have finished helping the robot."),
        Line::from(""),
    ];
    match &state.config.endpoint.completion_url {
        Some(url) => {
            lines.push(Line::from("Continue the study at:"));
            lines.push(Line::from(Span::styled(
                url.clone(),
                Style::default().fg(PALETTE.accent),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from("[C] Copy link  [Q] Quit"));
        }
        None => lines.push(Line::from("[Q] Quit")),
    }
    if let Some(notice) = &view.notice {
        lines.push(Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(PALETTE.muted),
        )));
    }
    let text = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(text, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
