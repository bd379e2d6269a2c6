//! Game screen rendering.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Local;
use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::input::{is_narrow_layout, ClickState};
use crate::widgets::{ButtonRow, ClickableList};

use super::actions::*;
use super::format::{format_number, format_rate};
use super::IdleGame;

const COOKIE_ART: &[&str] = &[" ╭━●━●━╮ ", " ━●━━●━● ", " ╰━●━●━╯ "];
const COOKIE_PRESSED_ART: &[&str] = &["  ╭━●━╮  ", "  ━●●●━  ", "  ╰━●━╯  "];
const SPINNER: &[char] = &['◐', '◓', '◑', '◒'];

pub fn render(game: &IdleGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let narrow = is_narrow_layout(area.width);
    let shop_height = game.engine.catalog().len() as u16 + 2;

    let (main_area, log_area) = if narrow {
        (area, None)
    } else {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);
        (cols[0], Some(cols[1]))
    };

    let mut constraints = vec![
        Constraint::Length(6),
        Constraint::Length(shop_height),
        Constraint::Length(3),
    ];
    if narrow {
        constraints.push(Constraint::Min(3));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(main_area);

    render_cookie(game, f, chunks[0], click_state);
    render_shop(game, f, chunks[1], click_state, !narrow);
    render_buttons(game, f, chunks[2], click_state);
    match log_area {
        Some(log_area) => render_log(game, f, log_area),
        None => render_log(game, f, chunks[3]),
    }
}

fn render_cookie(game: &IdleGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let state = game.engine.state();
    let rate = state.production_rate();
    let art = if game.click_flash > 0 { COOKIE_PRESSED_ART } else { COOKIE_ART };
    let art_style = Style::default().fg(if game.click_flash > 0 { Color::White } else { Color::Yellow });
    let spinner = if rate > 0.0 && game.engine.is_running() {
        SPINNER[(game.anim_frame / 3) as usize % SPINNER.len()]
    } else {
        ' '
    };
    let click_style = if game.click_flash > 0 {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };

    let mut cl = ClickableList::new();
    cl.push_clickable(
        Line::from(vec![
            Span::styled(art[0], art_style),
            Span::styled(
                format!(" 🍪 {} cookies", format_number(state.balance)),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ]),
        CLICK_COOKIE,
    );
    cl.push_clickable(
        Line::from(vec![
            Span::styled(art[1], art_style),
            Span::styled(
                format!(" {} {}/sec", spinner, format_rate(rate)),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        CLICK_COOKIE,
    );
    cl.push_clickable(
        Line::from(vec![
            Span::styled(art[2], art_style),
            Span::styled(" [C] CLICK!", click_style),
        ]),
        CLICK_COOKIE,
    );
    cl.push(Line::from(Span::styled(
        format!(
            " clicks {}  ·  earned {}  ·  generators {}",
            state.manual_actions,
            format_number(state.lifetime_earned),
            state.total_owned()
        ),
        Style::default().fg(Color::DarkGray),
    )));

    cl.register_targets(area, &mut click_state.borrow_mut(), 1, 1);

    let saved = match game.engine.last_saved() {
        _ if game.autosave_failed => " ⚠ save failed ".to_string(),
        Some(at) => format!(" saved {} ", at.with_timezone(&Local).format("%H:%M:%S")),
        None => String::new(),
    };
    let border = if game.purchase_flash > 0 { Color::White } else { Color::Yellow };
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(format!(" Idle Clicker · {} ", game.engine.username()))
            .title_bottom(Line::from(saved).right_aligned()),
    );
    f.render_widget(widget, area);
}

fn render_shop(
    game: &IdleGame,
    f: &mut Frame,
    area: Rect,
    click_state: &Rc<RefCell<ClickState>>,
    show_descriptions: bool,
) {
    let state = game.engine.state();
    let mut cl = ClickableList::new();

    for (i, def) in game.engine.catalog().definitions().iter().enumerate() {
        let owned = state.owned(&def.id);
        let cost = game.engine.cost_of(&def.id).unwrap_or(f64::INFINITY);
        let affordable = game.engine.can_afford(&def.id);

        let key_style = if affordable {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let text_style = if affordable {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let owned_style = if owned > 0 {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let mut spans = vec![
            Span::styled(format!("[{}] ", i + 1), key_style),
            Span::styled(format!("{} {:<13}", def.icon, def.name), text_style),
            Span::styled(format!("{:>4}x ", owned), owned_style),
            Span::styled(format!("${:<9}", format_number(cost)), text_style),
            Span::styled(format!("+{}/s", format_rate(def.rate)), owned_style),
        ];
        if show_descriptions {
            spans.push(Span::styled(
                format!("  {}", def.description),
                Style::default().fg(Color::DarkGray),
            ));
        }
        cl.push_clickable(Line::from(spans), BUY_GENERATOR_BASE + i as u16);
    }

    cl.register_targets(area, &mut click_state.borrow_mut(), 1, 1);

    let border = if game.purchase_flash > 0 { Color::Yellow } else { Color::Green };
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Shop · tap or press 1-8 "),
    );
    f.render_widget(widget, area);
}

fn render_buttons(game: &IdleGame, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let save_style = if game.autosave_failed {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    ButtonRow::new(" │ ")
        .button("[S] Save", save_style, SAVE_GAME)
        .button("[Q] Logout", Style::default().fg(Color::Magenta), LOGOUT)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .render(f, area, &mut click_state.borrow_mut());
}

fn render_log(game: &IdleGame, f: &mut Frame, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;

    // Newest first.
    let lines: Vec<Line> = game
        .log
        .iter()
        .rev()
        .take(visible)
        .enumerate()
        .map(|(i, entry)| {
            let style = match (entry.is_important, i < 3) {
                (true, _) => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                (false, true) => Style::default().fg(Color::White),
                (false, false) => Style::default().fg(Color::DarkGray),
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Log "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
