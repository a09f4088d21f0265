use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::app::{App, Mode};
use crate::tui::layout::Layout;
use crate::tui::widgets::{
    color::parse_color, form::render_add_form, help::render_help, status_bar::render_status_bar,
    task_list::render_task_list,
};

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    // Outer border with the app title centered in the top border
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("DueTask")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    // Main pane: the add form replaces the list while it is open.
    // Help mode shows the list underneath its overlay.
    match app.ui.mode {
        Mode::Add => {
            if let Some(ref form) = app.form.add_form {
                render_add_form(f, layout.list_area, form, &app.config);
            }
        }
        Mode::View | Mode::Help => {
            if app.tasks.is_empty() {
                let hint = format!(
                    "No tasks. Press {} to add one.",
                    crate::utils::format_key_binding_for_display(&app.config.key_bindings.add)
                );
                let paragraph = Paragraph::new(hint)
                    .block(Block::default().borders(Borders::ALL).title("Tasks"))
                    .style(Style::default().fg(fg_color));
                f.render_widget(paragraph, layout.list_area);
            } else {
                render_task_list(
                    f,
                    layout.list_area,
                    &app.tasks,
                    &mut app.ui.list_state,
                    &app.config,
                    App::now(),
                );
            }
        }
    }

    // Counts line below the list, hidden while there are no tasks
    if !app.list.is_empty() {
        let counts = app.counts();
        let counts_text = format!("{} left, {} done", counts.left, counts.done);
        let counts_paragraph =
            Paragraph::new(counts_text).style(Style::default().fg(fg_color).bg(bg_color));
        f.render_widget(counts_paragraph, layout.counts_area);
    }

    // Render help popup overlay after normal content
    if app.ui.mode == Mode::Help {
        render_help(f, f.area(), &app.config);
    }

    let key_hints = get_key_hints(app);
    render_status_bar(
        f,
        layout.status_area,
        app.status.message.as_ref(),
        &key_hints,
        &app.config,
    );
}

fn get_key_hints(app: &App) -> Vec<String> {
    match app.ui.mode {
        Mode::Help => {
            vec![format!(
                "Esc or {}: Exit help",
                crate::utils::format_key_binding_for_display(&app.config.key_bindings.help)
            )]
        }
        Mode::Add => {
            vec![
                "Tab/Shift+Tab: Switch field".to_string(),
                "Enter: Save".to_string(),
                "Esc: Cancel".to_string(),
            ]
        }
        Mode::View => {
            vec![
                format!(
                    "{}: Quit",
                    crate::utils::format_key_binding_for_display(&app.config.key_bindings.quit)
                ),
                format!(
                    "{}: Add",
                    crate::utils::format_key_binding_for_display(&app.config.key_bindings.add)
                ),
                format!(
                    "{}: Toggle done",
                    crate::utils::format_key_binding_for_display(
                        &app.config.key_bindings.toggle_completed
                    )
                ),
                format!(
                    "{}: Delete",
                    crate::utils::format_key_binding_for_display(&app.config.key_bindings.delete)
                ),
                format!(
                    "{}/{}: Navigate",
                    crate::utils::format_key_binding_for_display(&app.config.key_bindings.list_up),
                    crate::utils::format_key_binding_for_display(&app.config.key_bindings.list_down)
                ),
                format!(
                    "{}: Help",
                    crate::utils::format_key_binding_for_display(&app.config.key_bindings.help)
                ),
            ]
        }
    }
}
