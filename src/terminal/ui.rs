use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::detail::DetailState;
use crate::domain::email::EmailSummary;
use crate::domain::filter::Filter;
use crate::format::{format_date, one_line, sender_line};
use crate::terminal::state::{AppState, Focus, ViewMode};

const ACCENT: Color = Color::Magenta;

pub fn render(f: &mut Frame, state: &mut AppState) {
    let [bar, main, footer] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_filters(f, bar, state.filter);

    match (state.mode, state.wide) {
        (ViewMode::ListOnly, _) => render_list(f, main, state),
        (ViewMode::Split, true) => {
            let [left, right] =
                Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .areas(main);
            render_list(f, left, state);
            render_detail(f, right, state);
        }
        (ViewMode::Split, false) => render_detail(f, main, state),
    }

    let hint = Paragraph::new(Line::from(vec![
        Span::styled("j/k", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" move  "),
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" open  "),
        Span::styled("f", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" favorite  "),
        Span::styled("1-4", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" filter  "),
        Span::styled("r", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" retry  "),
        Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" focus  "),
        Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ]));
    f.render_widget(hint, footer);
}

fn render_filters(f: &mut Frame, area: Rect, current: Filter) {
    let mut spans = vec![Span::raw(" Filter By: ")];
    for filter in Filter::ALL {
        let style = if filter == current {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Gray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", filter.label()), style));
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn avatar(e: &EmailSummary) -> Span<'static> {
    Span::styled(
        format!(" {} ", e.sender.initial()),
        Style::default()
            .fg(Color::White)
            .bg(ACCENT)
            .add_modifier(Modifier::BOLD),
    )
}

fn list_item(e: &EmailSummary, opened: bool, width: usize) -> ListItem<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let marker = if opened {
        Span::styled("▌", Style::default().fg(ACCENT))
    } else {
        Span::raw(" ")
    };

    let mut date_line = vec![Span::raw("     "), Span::raw(format_date(e.date))];
    if e.favorite {
        date_line.push(Span::styled(
            "     Favorite",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
    }

    let text = Text::from(vec![
        Line::from(vec![
            marker,
            avatar(e),
            Span::styled(" From: ", bold),
            Span::raw(sender_line(&e.sender)),
        ]),
        Line::from(vec![
            Span::raw("     "),
            Span::styled("Subject: ", bold),
            Span::raw(e.subject.clone()),
        ]),
        Line::from(vec![
            Span::raw("     "),
            Span::styled(
                one_line(&e.short_description, width.saturating_sub(6)),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(date_line),
        Line::raw(""),
    ]);

    let style = if e.read {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    ListItem::new(text).style(style)
}

fn render_list(f: &mut Frame, area: Rect, state: &mut AppState) {
    let border = if state.focus == Focus::List {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(format!(" {} ", state.filter.label()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let [rows, status] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
    state.list_rows = rows.height;

    let opened = state.store.selected_email_id().map(str::to_string);
    let width = rows.width as usize;
    let visible = state.visible();
    let count = visible.len();
    let items: Vec<ListItem> = visible
        .into_iter()
        .map(|e| list_item(e, opened.as_deref() == Some(e.id.as_str()), width))
        .collect();

    let list = List::new(items)
        .highlight_symbol("➜")
        .highlight_style(Style::default().fg(Color::Green));
    f.render_stateful_widget(list, rows, &mut state.list_state);

    let status_line = if let Some(err) = state.pager.error() {
        Line::styled(err.to_string(), Style::default().fg(Color::Red))
    } else if state.pager.is_loading() {
        Line::styled("Loading more emails...", Style::default().fg(Color::Gray))
    } else if count == 0 {
        Line::styled(
            "No emails available for the selected filter!",
            Style::default().fg(Color::Gray),
        )
    } else if !state.pager.has_more() {
        Line::styled(
            "You've reached the end of the list",
            Style::default().fg(Color::Gray),
        )
    } else {
        Line::raw("")
    };
    f.render_widget(
        Paragraph::new(status_line).alignment(Alignment::Center),
        status,
    );
}

fn render_detail(f: &mut Frame, area: Rect, state: &mut AppState) {
    let border = if state.focus == Focus::Body {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(" Email ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let html = match state.detail.state() {
        DetailState::Idle => return,
        DetailState::Loading { .. } => {
            centered(f, inner, Line::styled("Loading...", Style::default().fg(Color::Gray)));
            return;
        }
        DetailState::Failed { message, .. } => {
            let line = Line::styled(message.clone(), Style::default().fg(Color::Red));
            centered(f, inner, line);
            return;
        }
        DetailState::Loaded { body, .. } => body.clone(),
    };

    // the selection is a weak reference: nothing to show if the id is gone
    let Some(email) = state.store.selected_email().cloned() else {
        return;
    };

    let toggle_label = if email.favorite {
        "Remove from favorites"
    } else {
        "Mark as favorite"
    };
    let toggle_style = if email.favorite {
        Style::default().fg(Color::White).bg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White).bg(ACCENT)
    };

    let mut lines = vec![
        Line::from(vec![
            avatar(&email),
            Span::raw("  "),
            Span::styled(
                email.subject.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::raw("     "),
            Span::styled(format_date(email.date), Style::default().fg(Color::Gray)),
        ]),
        Line::from(vec![
            Span::raw("     "),
            Span::styled(format!(" [f] {toggle_label} "), toggle_style),
        ]),
        Line::raw(""),
    ];

    let width = inner.width.saturating_sub(1) as usize;
    let body = state.body_text(&email.id, &html, width);
    lines.extend(body.lines().map(|l| Line::raw(l.to_string())));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((state.body_scroll, 0));
    f.render_widget(p, inner);
}

fn centered(f: &mut Frame, area: Rect, line: Line<'static>) {
    let [_, mid, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), mid);
}
