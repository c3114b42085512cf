use tui::backend::Backend;
use tui::layout::{Alignment, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::{LayoutAreas, scroll_offset, split_list_detail, split_search};
use ftcscout_api::{Alliance, MatchRecord, Outcome, Stat, Team};

static TABS: &[&str; 2] = &["Teams", "Matches"];

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
        }

        match app.state.active_tab {
            MenuItem::Teams => draw_teams(f, layout.main, app),
            MenuItem::Matches => draw_matches(f, layout.main, app),
            MenuItem::Help => draw_placeholder(
                f,
                layout.main,
                "Teams: type to search  ↑/↓=team  Enter=matches  Esc=clear\n\
                 Matches: j/k=match  r=reload  Esc=back  q=quit\n\
                 Tab=switch tab  Ctrl-L=logs  Ctrl-F=full screen  Ctrl-C=quit",
            ),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        log::error!("draw failed: {e:?}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Teams => 0,
        MenuItem::Matches => 1,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new(format!("{}  F1 ", app.settings.season))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

// ---------------------------------------------------------------------------
// Teams tab
// ---------------------------------------------------------------------------

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let [list_area, detail_area] = split_list_detail(area);
    let [search_area, results_area] = split_search(list_area);
    let search = &app.state.search;

    let search_title = if search.is_loading() { " Search … " } else { " Search " };
    let input = if search.input.is_empty() {
        Span::styled("team name or number", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(format!("{}▏", search.input))
    };
    f.render_widget(
        Paragraph::new(Line::from(input)).block(default_border(Color::White).title(search_title)),
        search_area,
    );

    let block = default_border(Color::White).title(format!(" Teams ({}) ", search.results.len()));
    let inner = block.inner(results_area);
    f.render_widget(block, results_area);

    if search.results.is_empty() {
        let msg = match app.state.last_error.as_deref() {
            Some(err) => format!("Last request failed:\n{err}"),
            None if search.is_loading() => "Searching...".to_string(),
            None => "Start typing to search FTCScout".to_string(),
        };
        f.render_widget(
            Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
    } else {
        let height = inner.height as usize;
        let offset = scroll_offset(search.selected, height);
        let lines: Vec<Line> = search
            .results
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(idx, team)| {
                let selected = idx == search.selected;
                let marker = if selected { ">" } else { " " };
                let style = if selected {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(format!("{marker} {:>6} ", team.number), Style::default().fg(Color::Gray)),
                    Span::styled(team.name.clone(), style),
                ])
            })
            .collect();
        f.render_widget(Paragraph::new(lines), inner);
    }

    draw_team_detail(f, detail_area, search.selected_team());
}

fn draw_team_detail(f: &mut Frame, area: Rect, team: Option<&Team>) {
    let block = default_border(Color::White).title(" Team ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(team) = team else {
        f.render_widget(
            Paragraph::new("No team selected").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    };

    let mut lines = vec![
        label_line("Name", team.name.clone()),
        label_line("Number", team.number.to_string()),
        label_line("Location", team.location()),
        label_line("Rookie Year", team.rookie_year.to_string()),
        label_line("Host", team.school_name.clone().unwrap_or_else(|| "N/A".to_string())),
    ];

    for (idx, sponsor) in team.sponsors.iter().enumerate() {
        let title = if idx == 0 { "Sponsored by" } else { "" };
        lines.push(label_line(title, sponsor.clone()));
    }

    if let Some(stats) = &team.stats {
        lines.push(Line::from(""));
        lines.push(label_line("Total OPR", format_stat(&stats.total)));
        lines.push(label_line("Teleop OPR", format_stat(&stats.teleop)));
        lines.push(label_line("Auto OPR", format_stat(&stats.auto)));
        lines.push(label_line("Endgame OPR", format_stat(&stats.endgame)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(team.web_url(), Style::default().fg(Color::Cyan))));
    lines.push(Line::from(Span::styled(
        "Enter: view matches",
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(lines), inner);
}

fn label_line(title: &str, text: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{title:<13}"), Style::default().fg(Color::Gray)),
        Span::raw(text),
    ])
}

fn format_stat(stat: &Stat) -> String {
    format!("{:.2} (Rank: #{})", stat.value, stat.rank)
}

// ---------------------------------------------------------------------------
// Matches tab
// ---------------------------------------------------------------------------

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let [list_area, detail_area] = split_list_detail(area);
    let matches = &app.state.matches;

    let title = match app.state.matches_title.as_deref() {
        Some(team) => format!(" {team} · {} ", app.settings.season),
        None => " Matches ".to_string(),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(list_area);
    f.render_widget(block, list_area);

    if matches.team_number().is_none() {
        f.render_widget(
            Paragraph::new("Pick a team on the Teams tab and press Enter")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        draw_match_detail(f, detail_area, None);
        return;
    }

    // Section headers are not selectable, so track the line of the
    // highlighted match for scrolling.
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0;
    let mut row = 0;
    for event in matches.events() {
        let header_style = if event.is_valid {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::from(Span::styled(event.title().to_string(), header_style)));

        if event.is_valid && event.matches.is_empty() {
            let note = if matches.is_loading() { "  loading..." } else { "  no matches" };
            lines.push(Line::from(Span::styled(note, Style::default().fg(Color::DarkGray))));
        }

        for m in &event.matches {
            let selected = row == matches.selected;
            if selected {
                selected_line = lines.len();
            }
            lines.push(match_row(m, selected));
            row += 1;
        }
    }

    if lines.is_empty() {
        let msg = if matches.is_loading() {
            "Loading events...".to_string()
        } else {
            app.state
                .last_error
                .clone()
                .unwrap_or_else(|| "No events this season".to_string())
        };
        lines.push(Line::from(Span::styled(msg, Style::default().fg(Color::DarkGray))));
    }

    let footer = match (matches.is_loading(), matches.summary) {
        (true, _) => format!("{} fetches pending", matches.outstanding()),
        (false, Some(summary)) if summary.failed > 0 => format!(
            "{} of {} fetches failed{}",
            summary.failed,
            summary.total(),
            loaded_at(app)
        ),
        (false, _) => format!("loaded{}", loaded_at(app)),
    };

    let height = inner.height.saturating_sub(1) as usize;
    let offset = scroll_offset(selected_line, height);
    let mut visible: Vec<Line> = lines.into_iter().skip(offset).take(height).collect();
    while visible.len() < height {
        visible.push(Line::from(""));
    }
    visible.push(Line::from(Span::styled(footer, Style::default().fg(Color::DarkGray))));
    f.render_widget(Paragraph::new(visible), inner);

    draw_match_detail(f, detail_area, matches.selected_match());
}

fn loaded_at(app: &App) -> String {
    app.state
        .matches
        .loaded_at
        .map(|t| format!(" at {}", t.format("%H:%M")))
        .unwrap_or_default()
}

fn match_row(m: &MatchRecord, selected: bool) -> Line<'static> {
    let marker = if selected { ">" } else { " " };
    let name_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let outcome = m.outcome();
    Line::from(vec![
        Span::styled(format!("{marker} {:<12}", m.short_name()), name_style),
        Span::styled(format!("{:>3}-{:<3} ", m.red.total, m.blue.total), Style::default().fg(Color::Gray)),
        Span::styled(outcome.label(), Style::default().fg(outcome_color(outcome))),
    ])
}

fn outcome_color(outcome: Outcome) -> Color {
    match outcome {
        Outcome::Win => Color::Green,
        Outcome::Loss => Color::Red,
        Outcome::Tie => Color::Yellow,
    }
}

fn draw_match_detail(f: &mut Frame, area: Rect, m: Option<&MatchRecord>) {
    let block = default_border(Color::White).title(" Match ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(m) = m else {
        f.render_widget(
            Paragraph::new("No match selected").style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    };

    let team_tag = |number: u32, color: Color| {
        Span::styled(format!(" {number} "), Style::default().fg(Color::Black).bg(color))
    };

    let mut lines = vec![
        Line::from(Span::styled(m.long_name(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(format!(
            "Playing {} · {}",
            m.alliance().label(),
            m.outcome().label()
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{:<10}", "Teams"), Style::default().fg(Color::Gray)),
            team_tag(m.red_teams[0], Color::Red),
            Span::raw(" "),
            team_tag(m.red_teams[1], Color::Red),
            Span::raw("  "),
            team_tag(m.blue_teams[0], Color::Blue),
            Span::raw(" "),
            team_tag(m.blue_teams[1], Color::Blue),
        ]),
        Line::from(""),
        score_line("Auto", m.red.auto, m.blue.auto),
        score_line("TeleOp", m.red.teleop, m.blue.teleop),
        score_line("Endgame", m.red.endgame, m.blue.endgame),
        Line::from(""),
        score_line("Total", m.red.total, m.blue.total),
    ];

    if m.alliance() == Alliance::Blue && !m.blue_teams.contains(&m.subject_team) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Team not seated in a station; read from blue's side",
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

/// Equal sides are purple; otherwise the higher side takes its alliance
/// colour and the lower one is dimmed.
fn score_line(title: &str, red: i32, blue: i32) -> Line<'static> {
    let (red_color, blue_color) = if red == blue {
        (Color::Magenta, Color::Magenta)
    } else if red > blue {
        (Color::Red, Color::DarkGray)
    } else {
        (Color::DarkGray, Color::Blue)
    };
    Line::from(vec![
        Span::styled(format!("{title:<10}"), Style::default().fg(Color::Gray)),
        Span::styled(format!("{red:>5}"), Style::default().fg(red_color).add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled(format!("{blue:<5}"), Style::default().fg(blue_color).add_modifier(Modifier::BOLD)),
    ])
}

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

fn draw_logs(f: &mut Frame, area: Rect) {
    let widget = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .style_debug(Style::default().fg(Color::DarkGray));
    f.render_widget(widget, area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        inner,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
