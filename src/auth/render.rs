//! Auth screen rendering.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph};
use ratzilla::ratatui::Frame;

use crate::input::ClickState;
use crate::widgets::{ButtonRow, ClickableList};

use super::actions::*;
use super::{AuthMode, AuthScreen, Field};

const FORM_WIDTH: u16 = 48;

pub fn render(screen: &AuthScreen, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
    let form_height = match screen.mode {
        AuthMode::Login => 12,
        AuthMode::Signup => 13,
    };
    let form = centered(area, FORM_WIDTH.min(area.width), form_height.min(area.height));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(form);

    let tab_style = |mode: AuthMode| {
        if screen.mode == mode {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    ButtonRow::new(" │ ")
        .button("Login", tab_style(AuthMode::Login), MODE_LOGIN)
        .button("Sign up", tab_style(AuthMode::Signup), MODE_SIGNUP)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" 🍪 Idle Clicker "),
        )
        .render(f, chunks[0], &mut click_state.borrow_mut());

    let mut cl = ClickableList::new();
    cl.push(Line::from(""));
    cl.push_clickable(field_line(screen, Field::Username, "Username"), FOCUS_USERNAME);
    cl.push_clickable(field_line(screen, Field::Password, "Password"), FOCUS_PASSWORD);
    if screen.mode == AuthMode::Signup {
        cl.push_clickable(field_line(screen, Field::Confirm, "Confirm "), FOCUS_CONFIRM);
    }
    cl.push(Line::from(""));
    let submit = match screen.mode {
        AuthMode::Login => "  ▶ Log in (Enter)",
        AuthMode::Signup => "  ▶ Create account (Enter)",
    };
    cl.push_clickable(
        Line::from(Span::styled(
            submit,
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        SUBMIT,
    );
    cl.push(match &screen.status {
        Some(msg) => Line::from(Span::styled(
            format!("  {}", msg.text),
            Style::default().fg(if msg.is_error { Color::Red } else { Color::Cyan }),
        )),
        None => Line::from(""),
    });
    cl.push(Line::from(Span::styled(
        "  Tab: next field · Esc: switch mode",
        Style::default().fg(Color::DarkGray),
    )));

    let body = chunks[1];
    cl.register_targets(body, &mut click_state.borrow_mut(), 1, 1);
    let widget = Paragraph::new(cl.into_lines()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(widget, body);
}

fn field_line<'a>(screen: &'a AuthScreen, field: Field, label: &'a str) -> Line<'a> {
    let focused = screen.focus == field;
    let value = match field {
        Field::Username => screen.username.clone(),
        Field::Password => "•".repeat(screen.password.chars().count()),
        Field::Confirm => "•".repeat(screen.confirm.chars().count()),
    };
    let cursor = if focused { "▏" } else { "" };
    let value_style = if focused {
        Style::default().fg(Color::White).add_modifier(Modifier::UNDERLINED)
    } else {
        Style::default().fg(Color::Gray)
    };
    Line::from(vec![
        Span::styled(
            if focused { " ▸ " } else { "   " },
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(format!("{label}: "), Style::default().fg(Color::Cyan)),
        Span::styled(format!("{value}{cursor}"), value_style),
    ])
    .alignment(Alignment::Left)
}

/// A `width` × `height` rectangle centered in `area`.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    )
}
