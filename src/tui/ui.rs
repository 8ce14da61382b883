use crate::output::terminal_text;
use crate::storage::kv::KeyValueStore;
use crate::suggest::engine::SuggestionKind;
use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Query input
            Constraint::Min(10),   // Results / detail
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_query_input(f, app, chunks[0]);
    draw_main_area(f, app, chunks[1]);
    draw_status_bar(f, app, chunks[2]);

    // Dropdown overlays the results, directly under the query box
    if app.dropdown_open() {
        draw_suggestions(f, app, chunks[1]);
    }
}

fn draw_query_input<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let input = Paragraph::new(app.query.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search (^S save, ^O sort, ^T rating, ^X clear, Esc quit) "),
        );

    f.render_widget(input, area);

    let cursor = app.query.chars().count() as u16;
    f.set_cursor_position((area.x + cursor + 1, area.y + 1));
}

fn draw_main_area<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    draw_results_list(f, app, chunks[0]);
    draw_detail(f, app, chunks[1]);
}

fn draw_results_list<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    // Keep the selection on screen
    let visible = area.height.saturating_sub(2) as usize;
    let offset = (app.selected + 1).saturating_sub(visible);

    let items: Vec<ListItem> = app
        .results()
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, entity)| {
            let style = if i == app.selected {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let rating = entity
                .rating
                .map(|r| format!("{}/5", r))
                .unwrap_or_else(|| "-".to_string());

            let line = Line::from(vec![
                Span::styled(terminal_text(&entity.name).into_owned(), Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(terminal_text(entity.location_or_empty()).into_owned(), Style::default().fg(Color::Blue)),
                Span::raw("  "),
                Span::styled(rating, Style::default().fg(Color::Yellow)),
            ]);

            ListItem::new(line).style(style)
        })
        .collect();

    let title = if app.is_loading() {
        " Results (loading...) ".to_string()
    } else {
        format!(" Results ({}) ", app.results().len())
    };

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(list, area);
}

fn draw_detail<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);

    let content = match app.selected_entity() {
        Some(entity) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    terminal_text(&entity.name).into_owned(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![Span::styled("Type: ", label), Span::raw(terminal_text(&entity.entity_type).into_owned())]),
            ];
            if let Some(location) = &entity.location {
                lines.push(Line::from(vec![
                    Span::styled("Location: ", label),
                    Span::raw(terminal_text(location).into_owned()),
                ]));
            }
            if let Some(rating) = entity.rating {
                lines.push(Line::from(vec![
                    Span::styled("Rating: ", label),
                    Span::raw(format!("{}/5", rating)),
                ]));
            }
            if let Some(price) = &entity.price_range {
                lines.push(Line::from(vec![
                    Span::styled("Price: ", label),
                    Span::raw(terminal_text(price).into_owned()),
                ]));
            }
            if !entity.categories.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled("Categories: ", label),
                    Span::styled(terminal_text(&entity.categories.join(", ")).into_owned(), Style::default().fg(Color::Green)),
                ]));
            }
            lines.push(Line::from(vec![Span::styled("URL: ", label), Span::raw(terminal_text(&entity.url).into_owned())]));
            Text::from(lines)
        }
        None => Text::raw("No entity selected"),
    };

    let detail = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: false });

    f.render_widget(detail, area);
}

fn draw_suggestions<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let nav = app.context().nav();
    let height = (nav.items().len() as u16 + 2).min(area.height);
    let width = area.width.min(60);
    let popup = Rect::new(area.x, area.y, width, height);

    let items: Vec<ListItem> = nav
        .items()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let kind_color = match s.kind {
                SuggestionKind::Entity => Color::Magenta,
                SuggestionKind::Category => Color::Green,
                SuggestionKind::Location => Color::Blue,
            };
            let style = if nav.selected() == Some(i) {
                Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw(terminal_text(&s.text).into_owned()),
                Span::raw("  "),
                Span::styled(terminal_text(&s.subtitle).into_owned(), Style::default().fg(kind_color)),
            ]))
            .style(style)
        })
        .collect();

    f.render_widget(Clear, popup);
    f.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title(" Suggestions ")),
        popup,
    );
}

fn draw_status_bar<S: KeyValueStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let status = Paragraph::new(terminal_text(&app.status_message))
        .style(Style::default().fg(Color::Cyan));

    f.render_widget(status, area);
}
