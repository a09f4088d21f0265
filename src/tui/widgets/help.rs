use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::widgets::color::parse_color;
use crate::Config;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    // Centered popup, following the ratatui popup example
    let popup_area = popup_area(area, 60, 70);

    // Clear the background first so list content does not show through
    f.render_widget(Clear, popup_area);

    let help_text = build_help_text(config);

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

/// Centered rect taking up the given percentage of the available rect.
fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

fn build_help_text(config: &Config) -> String {
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!(
        "  {} / {}: Move selection up/down\n",
        crate::utils::format_key_binding_for_display(&config.key_bindings.list_up),
        crate::utils::format_key_binding_for_display(&config.key_bindings.list_down)
    ));
    text.push_str("  Arrow keys: Move selection\n");
    text.push('\n');

    text.push_str("Actions:\n");
    text.push_str(&format!(
        "  {}: Add task\n",
        crate::utils::format_key_binding_for_display(&config.key_bindings.add)
    ));
    text.push_str(&format!(
        "  {}: Toggle done\n",
        crate::utils::format_key_binding_for_display(&config.key_bindings.toggle_completed)
    ));
    text.push_str(&format!(
        "  {}: Delete task\n",
        crate::utils::format_key_binding_for_display(&config.key_bindings.delete)
    ));
    text.push('\n');

    text.push_str("Add form:\n");
    text.push_str("  Tab / Shift+Tab: Next/previous field\n");
    text.push_str("  Enter: Save task\n");
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("Colors:\n");
    text.push_str("  Tasks due before today are shown in the overdue color,\n");
    text.push_str("  tasks due today in the today color. Completed tasks are\n");
    text.push_str("  crossed out and sort to the bottom.\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!(
        "  {}: Quit\n",
        crate::utils::format_key_binding_for_display(&config.key_bindings.quit)
    ));
    text.push_str(&format!(
        "  {}: Show/hide help\n",
        crate::utils::format_key_binding_for_display(&config.key_bindings.help)
    ));

    text
}
