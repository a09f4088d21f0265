use chrono::NaiveDateTime;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{
    Block, Borders, List, ListItem, ListState, Scrollbar, ScrollbarOrientation, ScrollbarState,
    StatefulWidget,
};
use ratatui::Frame;

use crate::due::{self, DueStatus};
use crate::models::Task;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::Config;

pub fn render_task_list(
    f: &mut Frame,
    area: Rect,
    tasks: &[Task],
    list_state: &mut ListState,
    config: &Config,
    now: NaiveDateTime,
) {
    // Calculate max width for truncation (account for borders and padding)
    let max_width = area.width.saturating_sub(4) as usize; // 2 for borders, 2 for padding

    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };

    let items: Vec<ListItem> = tasks
        .iter()
        .map(|task| {
            let status_indicator = if task.completed { "✓" } else { "○" };

            // A due time without a date is not shown; it carries no meaning
            let due_str = match (&task.due_date, &task.due_time) {
                (Some(date), Some(time)) => format!(" [{} {}]", date, time),
                (Some(date), None) => format!(" [{}]", date),
                _ => String::new(),
            };

            let mut line = format!("{} {}{}", status_indicator, task.text, due_str);

            // Truncate if too long
            if line.chars().count() > max_width {
                line = line
                    .chars()
                    .take(max_width.saturating_sub(3))
                    .collect::<String>()
                    + "...";
            }

            let style = if task.completed {
                Style::default()
                    .fg(parse_color(&active_theme.completed_fg))
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                match due::status(task, now) {
                    DueStatus::Overdue => Style::default().fg(parse_color(&active_theme.overdue_fg)),
                    DueStatus::Today => Style::default().fg(parse_color(&active_theme.today_fg)),
                    DueStatus::Upcoming | DueStatus::Unscheduled => Style::default(),
                }
            };

            ListItem::new(line).style(style)
        })
        .collect();

    // Split area to reserve space for the scrollbar
    let list_areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // Scrollbar
        ])
        .split(area);

    let list_area = list_areas[0];
    let scrollbar_area = list_areas[1];

    let total_items = items.len();
    let title = format!("Tasks ({})", total_items);
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(parse_color(&active_theme.fg)))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    StatefulWidget::render(list, list_area, f.buffer_mut(), list_state);

    // Render scrollbar if needed
    let visible_items = list_area.height.saturating_sub(2) as usize; // Account for borders

    if total_items > visible_items && scrollbar_area.width > 0 && list_area.height > 2 {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            list_area.y + 1, // Start after top border
            scrollbar_area.width,
            list_area.height.saturating_sub(2), // Match inner list height
        );

        if scrollbar_inner_area.width > 0 && scrollbar_inner_area.height > 0 {
            // Scroll position follows the selected index
            let selected_index = list_state.selected().unwrap_or(0);
            let scroll_position = if selected_index < visible_items {
                0
            } else {
                selected_index.saturating_sub(visible_items - 1)
            };

            let mut scrollbar_state = ScrollbarState::new(total_items)
                .viewport_content_length(visible_items)
                .position(scroll_position);

            let scrollbar = Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");

            f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
        }
    }
}
