//! Message body tokenizing (links, mentions) and styled rendering.

use eframe::egui::{self, Color32};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ui::theme::{self, ChatTheme};

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>"]+[^\s<>".,;:!?)\]'"]"#).expect("URL regex pattern is valid")
});

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[A-Za-z0-9_.\-]+").expect("mention regex pattern is valid"));

/// A run of body text with one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Span<'a> {
    Text(&'a str),
    Link(&'a str),
    /// `@name`, without the `@`
    Mention(&'a str),
    LineBreak,
}

/// Split a body into styled spans. Links win over mentions when they overlap.
pub(crate) fn tokenize(body: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    for (i, line) in body.split('\n').enumerate() {
        if i > 0 {
            spans.push(Span::LineBreak);
        }
        let mut cursor = 0;
        let mut matches: Vec<(usize, usize, bool)> = URL_RE
            .find_iter(line)
            .map(|m| (m.start(), m.end(), true))
            .collect();
        for m in MENTION_RE.find_iter(line) {
            let overlaps = matches.iter().any(|&(s, e, _)| m.start() < e && s < m.end());
            // Only at a word start: "mail@example" is not a mention
            let word_start = line[..m.start()]
                .chars()
                .next_back()
                .is_none_or(|c| !c.is_alphanumeric());
            if !overlaps && word_start {
                matches.push((m.start(), m.end(), false));
            }
        }
        matches.sort_by_key(|&(start, _, _)| start);

        for (start, end, is_link) in matches {
            if start > cursor {
                spans.push(Span::Text(&line[cursor..start]));
            }
            spans.push(if is_link {
                Span::Link(&line[start..end])
            } else {
                Span::Mention(&line[start + 1..end])
            });
            cursor = end;
        }
        if cursor < line.len() {
            spans.push(Span::Text(&line[cursor..]));
        }
    }
    spans
}

/// Render a body with clickable links and colored mentions.
pub(crate) fn render_body(ui: &mut egui::Ui, body: &str, color: Color32, theme: &ChatTheme) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in tokenize(body) {
            match span {
                Span::Text(text) => {
                    ui.label(egui::RichText::new(text).size(14.0).color(color));
                }
                Span::Link(url) => {
                    ui.hyperlink_to(egui::RichText::new(url).size(14.0).color(theme.link), url);
                }
                Span::Mention(name) => {
                    ui.label(
                        egui::RichText::new(format!("@{name}"))
                            .size(14.0)
                            .strong()
                            .color(theme::author_color(name)),
                    );
                }
                Span::LineBreak => ui.end_row(),
            }
        }
    });
}
