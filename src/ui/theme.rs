//! Color palettes and small drawing helpers shared by the chat widgets.
//!
//! Surfaces go from the deepest layer to the most elevated one:
//!
//! - `surface[0]`: window background
//! - `surface[1]`: sidebar and composer
//! - `surface[2]`: message area
//! - `surface[3]`: hovered rows and buttons
//! - `surface[4]`: selected conversation, reply preview
//!
//! Author colors and avatars are derived from the author id only, so the same
//! person looks the same in every conversation and across restarts.

use eframe::egui::{self, Color32};

#[derive(Clone, Debug)]
pub struct ChatTheme {
    pub name: &'static str,
    pub dark: bool,
    pub surface: [Color32; 5],
    pub accent: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub error: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,
    pub border: Color32,
    /// Background of rows that mention the current user
    pub mention_bg: Color32,
    /// Bubble background for the current user's messages
    pub own_bg: Color32,
    pub link: Color32,
}

impl ChatTheme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            dark: true,
            surface: [
                Color32::from_rgb(14, 15, 19),
                Color32::from_rgb(22, 23, 29),
                Color32::from_rgb(30, 31, 38),
                Color32::from_rgb(39, 40, 49),
                Color32::from_rgb(49, 51, 62),
            ],
            accent: Color32::from_rgb(94, 129, 244),
            success: Color32::from_rgb(72, 187, 120),
            warning: Color32::from_rgb(236, 170, 52),
            error: Color32::from_rgb(232, 84, 84),
            text_primary: Color32::from_rgb(236, 237, 240),
            text_secondary: Color32::from_rgb(183, 186, 194),
            text_muted: Color32::from_rgb(118, 123, 134),
            border: Color32::from_rgb(46, 48, 57),
            mention_bg: Color32::from_rgba_unmultiplied(236, 170, 52, 28),
            own_bg: Color32::from_rgba_unmultiplied(94, 129, 244, 22),
            link: Color32::from_rgb(120, 170, 255),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            dark: false,
            surface: [
                Color32::from_rgb(255, 255, 255),
                Color32::from_rgb(245, 246, 248),
                Color32::from_rgb(250, 250, 251),
                Color32::from_rgb(234, 236, 240),
                Color32::from_rgb(221, 225, 232),
            ],
            accent: Color32::from_rgb(64, 99, 220),
            success: Color32::from_rgb(46, 150, 92),
            warning: Color32::from_rgb(200, 130, 20),
            error: Color32::from_rgb(200, 55, 55),
            text_primary: Color32::from_rgb(20, 22, 26),
            text_secondary: Color32::from_rgb(70, 76, 88),
            text_muted: Color32::from_rgb(120, 128, 140),
            border: Color32::from_rgb(220, 223, 229),
            mention_bg: Color32::from_rgba_unmultiplied(236, 170, 52, 45),
            own_bg: Color32::from_rgba_unmultiplied(64, 99, 220, 18),
            link: Color32::from_rgb(40, 90, 200),
        }
    }

    /// Palette for a settings value; anything but "light" is dark.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}

/// Apply spacing, rounding and base visuals for the given theme.
pub fn apply_app_style(ctx: &egui::Context, theme: &ChatTheme) {
    ctx.set_visuals(if theme.dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    });

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 4.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    for widget in [
        &mut style.visuals.widgets.inactive,
        &mut style.visuals.widgets.hovered,
        &mut style.visuals.widgets.active,
    ] {
        widget.corner_radius = egui::CornerRadius::same(6);
    }
    style.visuals.widgets.hovered.weak_bg_fill = theme.surface[3];
    style.visuals.widgets.active.weak_bg_fill = theme.accent;
    style.visuals.panel_fill = theme.surface[2];
    style.visuals.extreme_bg_color = theme.surface[1];
    style.visuals.hyperlink_color = theme.link;
    style.visuals.selection.bg_fill = theme.accent.linear_multiply(0.4);
    ctx.set_style(style);
}

const AUTHOR_COLORS: [Color32; 12] = [
    Color32::from_rgb(231, 96, 84),
    Color32::from_rgb(64, 176, 116),
    Color32::from_rgb(70, 150, 220),
    Color32::from_rgb(160, 104, 200),
    Color32::from_rgb(222, 170, 40),
    Color32::from_rgb(230, 130, 60),
    Color32::from_rgb(40, 178, 160),
    Color32::from_rgb(226, 104, 160),
    Color32::from_rgb(110, 130, 230),
    Color32::from_rgb(150, 170, 60),
    Color32::from_rgb(200, 90, 70),
    Color32::from_rgb(90, 170, 200),
];

/// Deterministic color for an author id (FNV-1a).
pub fn author_color(author: &str) -> Color32 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in author.as_bytes() {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    AUTHOR_COLORS[(hash % AUTHOR_COLORS.len() as u64) as usize]
}

/// Up to two initials: first letters of the first two words, or the first
/// letter alone.
pub fn initials(name: &str) -> String {
    let mut words = name
        .split(|c: char| c.is_whitespace() || c == '.' || c == '_' || c == '-')
        .filter(|w| !w.is_empty());
    let first = words.next().and_then(|w| w.chars().next());
    let second = words.next().and_then(|w| w.chars().next());
    match (first, second) {
        (Some(a), Some(b)) => a.to_uppercase().chain(b.to_uppercase()).collect(),
        (Some(a), None) => a.to_uppercase().collect(),
        _ => "?".to_string(),
    }
}

/// Circular avatar with initials.
pub fn render_avatar(ui: &mut egui::Ui, author: &str, size: f32) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
    let painter = ui.painter();
    painter.circle_filled(rect.center(), size / 2.0, author_color(author));
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        initials(author),
        egui::FontId::proportional(size * 0.42),
        Color32::WHITE,
    );
    response
}

/// Small rounded count badge (sidebar unread counts).
pub fn badge(ui: &mut egui::Ui, text: &str, fill: Color32) -> egui::Response {
    egui::Frame::new()
        .fill(fill)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(6, 1))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).size(11.0).strong().color(Color32::WHITE))
        })
        .response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_color_deterministic() {
        assert_eq!(author_color("alice"), author_color("alice"));
        assert_ne!(author_color("alice"), author_color("bob"));
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("alice"), "A");
        assert_eq!(initials("Ada Lovelace"), "AL");
        assert_eq!(initials("john.doe"), "JD");
        assert_eq!(initials(""), "?");
    }

    #[test]
    fn test_from_name() {
        assert!(ChatTheme::from_name("dark").dark);
        assert!(!ChatTheme::from_name("light").dark);
        assert!(ChatTheme::from_name("unknown").dark);
    }
}
