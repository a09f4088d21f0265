use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::app::{AddField, AddForm};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::input::Input;
use crate::Config;

fn build_input_line(input: &Input, style: Style) -> Line<'static> {
    Line::from(Span::styled(input.value.clone(), style))
}

pub fn render_add_form(f: &mut Frame, area: Rect, form: &AddForm, config: &Config) {
    if area.width < 2 || area.height < 2 {
        return;
    }

    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };
    let highlight_style = Style::default().bg(highlight_bg).fg(highlight_fg);
    let inactive_field_style = Style::default()
        .fg(parse_color(&active_theme.fg))
        .add_modifier(Modifier::DIM);

    // Single-line fields: 3 lines each (border top + content + border bottom)
    let constraints = vec![
        Constraint::Length(3), // Task text
        Constraint::Length(3), // Due date
        Constraint::Length(3), // Due time
        Constraint::Min(0),
    ];

    let field_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let fields = [
        (AddField::Text, &form.text, "Task"),
        (AddField::DueDate, &form.due_date, "Due date (YYYY-MM-DD)"),
        (AddField::DueTime, &form.due_time, "Due time (HH:MM)"),
    ];

    for (i, (field, input, title)) in fields.iter().enumerate() {
        let is_active = form.current_field == *field;
        let style = if is_active {
            highlight_style
        } else {
            inactive_field_style
        };
        let line = build_input_line(input, style);
        let paragraph =
            Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(*title));
        f.render_widget(paragraph, field_areas[i]);

        // Place the terminal cursor in the active field
        if is_active {
            let inner_width = field_areas[i].width.saturating_sub(2);
            if inner_width > 0 && field_areas[i].height >= 3 {
                let col = (input.cursor_col as u16).min(inner_width.saturating_sub(1));
                let x = field_areas[i].x + 1 + col;
                let y = field_areas[i].y + 1;
                f.set_cursor_position((x, y));
            }
        }
    }
}
