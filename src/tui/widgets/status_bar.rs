use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::Config;

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    message: Option<&String>,
    key_hints: &[String],
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let max_width = area.width as usize;

    let (content, style) = if let Some(msg) = message {
        // Status messages get a highlighted background for visibility
        let msg_fg = get_contrast_text_color(highlight_bg);
        let mut text = msg.clone();
        if text.chars().count() > max_width {
            text = text
                .chars()
                .take(max_width.saturating_sub(3))
                .collect::<String>()
                + "...";
        }
        (
            text,
            Style::default()
                .fg(msg_fg)
                .bg(highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            fit_key_hints(key_hints, max_width),
            Style::default().fg(fg_color).bg(bg_color),
        )
    };

    // Status bar is a plain 1-line display; content areas carry the borders
    let paragraph = Paragraph::new(content).style(style);

    f.render_widget(paragraph, area);
}

/// Join hints with bullet separators, keeping as many whole hints as fit.
/// A trailing "..." marks hints that were dropped.
fn fit_key_hints(key_hints: &[String], max_width: usize) -> String {
    let separator = " • ";
    let mut text = String::new();

    for (i, hint) in key_hints.iter().enumerate() {
        let would_be_len = if i == 0 {
            hint.chars().count()
        } else {
            text.chars().count() + separator.chars().count() + hint.chars().count()
        };

        if would_be_len > max_width {
            let ellipsis = "...";
            if text.chars().count() + ellipsis.len() > max_width {
                text = text
                    .chars()
                    .take(max_width.saturating_sub(ellipsis.len()))
                    .collect();
            }
            text.push_str(ellipsis);
            break;
        }

        if i > 0 {
            text.push_str(separator);
        }
        text.push_str(hint);
    }

    text
}
