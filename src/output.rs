//! Presentation boundary: escaped views for markup presenters, plus plain
//! terminal printers for the CLI.

use crate::index::types::{DirectoryStats, Entity};
use crate::storage::saved::SavedSearch;
use crate::suggest::engine::{Suggestion, SuggestionKind};
use crate::suggest::nav::SuggestionNav;
use std::borrow::Cow;
use std::fmt::{self, Write as _};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Text that is safe to interpolate into HTML.
///
/// Only constructible by escaping, so every untrusted directory field that
/// reaches a presenter has passed through [`SafeHtml::escape`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SafeHtml(String);

impl SafeHtml {
    pub fn escape(raw: &str) -> Self {
        let mut out = String::with_capacity(raw.len());
        for c in raw.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        SafeHtml(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafeHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Link target for a card. Anything but a site-relative path or http(s) URL
/// (e.g. `javascript:`) is replaced by `#`.
fn safe_href(url: &str) -> SafeHtml {
    let trimmed = url.trim();
    let lower = trimmed.to_lowercase();
    let allowed = (trimmed.starts_with('/') && !trimmed.starts_with("//"))
        || lower.starts_with("https://")
        || lower.starts_with("http://");
    if allowed {
        SafeHtml::escape(trimmed)
    } else {
        SafeHtml::escape("#")
    }
}

/// One entity, escaped for display
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    pub id: SafeHtml,
    pub name: SafeHtml,
    pub entity_type: SafeHtml,
    pub location: Option<SafeHtml>,
    pub rating: Option<f64>,
    pub price_range: Option<SafeHtml>,
    pub categories: Vec<SafeHtml>,
    pub url: SafeHtml,
}

impl ResultCard {
    pub fn from_entity(entity: &Entity) -> Self {
        Self {
            id: SafeHtml::escape(&entity.id),
            name: SafeHtml::escape(&entity.name),
            entity_type: SafeHtml::escape(&entity.entity_type),
            location: entity.location.as_deref().map(SafeHtml::escape),
            rating: entity.rating,
            price_range: entity.price_range.as_deref().map(SafeHtml::escape),
            categories: entity.categories.iter().map(|c| SafeHtml::escape(c)).collect(),
            url: safe_href(&entity.url),
        }
    }

    /// Entity card markup: name, type, location, rating, category tags
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        // Writing into a String cannot fail
        let _ = write!(html, r#"<div class="entity-card" data-id="{}">"#, self.id);
        let _ = write!(
            html,
            r#"<div class="entity-name"><a href="{}">{}</a></div>"#,
            self.url, self.name
        );
        let _ = write!(html, r#"<div class="entity-meta">Type: {}</div>"#, self.entity_type);
        if let Some(location) = &self.location {
            let _ = write!(html, r#"<div class="entity-meta">Location: {}</div>"#, location);
        }
        if let Some(rating) = self.rating {
            let _ = write!(html, r#"<div class="entity-meta">Rating: {}/5</div>"#, rating);
        }
        if let Some(price) = &self.price_range {
            let _ = write!(html, r#"<div class="entity-meta">Price: {}</div>"#, price);
        }
        if !self.categories.is_empty() {
            html.push_str(r#"<div class="categories">"#);
            for category in &self.categories {
                let _ = write!(html, r#"<span class="category-tag">{}</span>"#, category);
            }
            html.push_str("</div>");
        }
        html.push_str("</div>");
        html
    }
}

/// Ordered result cards plus the count shown next to them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultsView {
    pub cards: Vec<ResultCard>,
    pub count: usize,
}

impl ResultsView {
    pub fn from_entities<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        let cards: Vec<ResultCard> = entities.into_iter().map(ResultCard::from_entity).collect();
        let count = cards.len();
        Self { cards, count }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// One dropdown row, escaped for display
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionRow {
    pub kind: SuggestionKind,
    pub text: SafeHtml,
    pub subtitle: SafeHtml,
    pub selected: bool,
}

impl SuggestionRow {
    pub fn new(suggestion: &Suggestion, selected: bool) -> Self {
        Self {
            kind: suggestion.kind,
            text: SafeHtml::escape(&suggestion.text),
            subtitle: SafeHtml::escape(&suggestion.subtitle),
            selected,
        }
    }

    /// Rows for the dropdown as it currently stands (empty while closed)
    pub fn from_nav(nav: &SuggestionNav) -> Vec<Self> {
        let selected = nav.selected();
        nav.items()
            .iter()
            .enumerate()
            .map(|(i, s)| Self::new(s, selected == Some(i)))
            .collect()
    }
}

/// Anything that renders search state for a user
pub trait ResultPresenter {
    fn show_results(&mut self, view: &ResultsView);

    fn show_suggestions(&mut self, rows: &[SuggestionRow]);

    fn show_error(&mut self, message: &SafeHtml);
}

/// Renders into a markup buffer
#[derive(Debug, Clone, Default)]
pub struct HtmlPresenter {
    buffer: String,
}

impl HtmlPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(&self) -> &str {
        &self.buffer
    }

    pub fn into_html(self) -> String {
        self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl ResultPresenter for HtmlPresenter {
    fn show_results(&mut self, view: &ResultsView) {
        let noun = if view.count == 1 { "result" } else { "results" };
        let _ = write!(
            self.buffer,
            r#"<p class="result-count">{} {}</p>"#,
            view.count, noun
        );

        if view.is_empty() {
            self.buffer.push_str(r#"<p class="empty-state">No entities found.</p>"#);
            return;
        }

        self.buffer.push_str(r#"<div class="directory-grid">"#);
        for card in &view.cards {
            self.buffer.push_str(&card.to_html());
        }
        self.buffer.push_str("</div>");
    }

    fn show_suggestions(&mut self, rows: &[SuggestionRow]) {
        if rows.is_empty() {
            return;
        }
        self.buffer.push_str(r#"<ul class="suggestions">"#);
        for row in rows {
            let selected = if row.selected { " selected" } else { "" };
            let _ = write!(
                self.buffer,
                r#"<li class="suggestion suggestion-{}{}"><span class="suggestion-text">{}</span><span class="suggestion-subtitle">{}</span></li>"#,
                row.kind, selected, row.text, row.subtitle
            );
        }
        self.buffer.push_str("</ul>");
    }

    fn show_error(&mut self, message: &SafeHtml) {
        let _ = write!(self.buffer, r#"<div class="error-state">{}</div>"#, message);
    }
}

/// Text safe to write to a terminal: control characters become U+FFFD.
///
/// Directory content is untrusted, and an embedded escape or OSC sequence
/// would otherwise be interpreted by the terminal.
pub fn terminal_text(raw: &str) -> Cow<'_, str> {
    if raw.chars().any(char::is_control) {
        Cow::Owned(
            raw.chars()
                .map(|c| if c.is_control() { char::REPLACEMENT_CHARACTER } else { c })
                .collect(),
        )
    } else {
        Cow::Borrowed(raw)
    }
}

fn color_choice(color: bool) -> ColorChoice {
    if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Print results as plain terminal text.
///
/// This is not markup, so no HTML escaping applies. Fields pass through
/// [`terminal_text`] instead.
pub fn print_results(entities: &[Entity], color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));

    for entity in entities {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
        write!(stdout, "{}", terminal_text(&entity.name))?;
        stdout.reset()?;

        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
        write!(stdout, "  [{}]", terminal_text(&entity.entity_type))?;
        stdout.reset()?;

        if let Some(location) = &entity.location {
            write!(stdout, "  {}", terminal_text(location))?;
        }
        if let Some(rating) = entity.rating {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            write!(stdout, "  {}/5", rating)?;
            stdout.reset()?;
        }
        writeln!(stdout)?;

        if !entity.categories.is_empty() {
            stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            writeln!(stdout, "    {}", terminal_text(&entity.categories.join(", ")))?;
            stdout.reset()?;
        }
    }

    let noun = if entities.len() == 1 { "result" } else { "results" };
    stdout.set_color(ColorSpec::new().set_dimmed(true))?;
    writeln!(stdout, "{} {}", entities.len(), noun)?;
    stdout.reset()?;

    Ok(())
}

/// Print suggestions as plain terminal text (control characters replaced)
pub fn print_suggestions(suggestions: &[Suggestion], color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));

    for s in suggestions {
        let kind_color = match s.kind {
            SuggestionKind::Entity => Color::Magenta,
            SuggestionKind::Category => Color::Green,
            SuggestionKind::Location => Color::Blue,
        };
        stdout.set_color(ColorSpec::new().set_fg(Some(kind_color)))?;
        write!(stdout, "{:<9}", s.kind.as_str())?;
        stdout.reset()?;
        write!(stdout, "{}", terminal_text(&s.text))?;
        stdout.set_color(ColorSpec::new().set_dimmed(true))?;
        writeln!(stdout, "  {}", terminal_text(&s.subtitle))?;
        stdout.reset()?;
    }

    Ok(())
}

/// Print directory totals
pub fn print_stats(stats: &DirectoryStats, generated_at: Option<&str>, color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));

    for (label, value) in [
        ("Total Entities", stats.total_entities),
        ("Categories", stats.total_categories),
        ("Locations", stats.total_locations),
        ("Types", stats.total_types),
    ] {
        write!(stdout, "{:<16}", label)?;
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        writeln!(stdout, "{}", value)?;
        stdout.reset()?;
    }
    if let Some(generated_at) = generated_at {
        writeln!(stdout, "{:<16}{}", "Generated", terminal_text(generated_at))?;
    }

    Ok(())
}

/// Print the saved-search history, newest first (plain terminal text)
pub fn print_saved_searches(saved: &[SavedSearch], color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(color_choice(color));

    if saved.is_empty() {
        writeln!(stdout, "No saved searches.")?;
        return Ok(());
    }

    for entry in saved {
        let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| entry.timestamp.to_string());

        stdout.set_color(ColorSpec::new().set_dimmed(true))?;
        write!(stdout, "{}  ", when)?;
        stdout.reset()?;

        stdout.set_color(ColorSpec::new().set_bold(true))?;
        write!(stdout, "{}", terminal_text(&entry.query))?;
        stdout.reset()?;

        let f = &entry.filters;
        for (label, value) in [
            ("category", f.category.as_str()),
            ("location", f.location.as_str()),
            ("type", f.entity_type.as_str()),
        ] {
            if !value.is_empty() {
                write!(stdout, "  {}={}", label, terminal_text(value))?;
            }
        }
        if let Some(min) = f.min_rating {
            write!(stdout, "  rating>={}", min)?;
        }
        writeln!(stdout)?;
    }

    Ok(())
}
