use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;

use crate::tui::app::{App, Mode};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::utils::parse_key_binding;

/// Guard that ensures terminal state is restored even on panic.
/// If the terminal is left in raw mode or the alternate screen, the
/// user's shell becomes unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Manually restore terminal state (called on normal exit).
    /// After calling this, the guard will do nothing on drop.
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop - we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check terminal size before entering the alternate screen so the
    // error message lands in the normal terminal
    let (width, height) = terminal_size().map_err(TuiError::IoError)?;

    let min_width_with_border = Layout::MIN_WIDTH + 2; // +2 for borders
    let min_height_with_border = Layout::MIN_HEIGHT + 2; // +2 for borders

    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        // Check if the status message should be auto-cleared
        app.check_status_message_timeout();

        // Get terminal size explicitly to ensure compatibility across different terminals
        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Handle events - only process Press events to avoid duplicate processing on Windows
        if event::poll(std::time::Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key_event) => {
                    if key_event.kind == KeyEventKind::Press {
                        if handle_key_event(&mut app, key_event)? {
                            break; // Quit requested
                        }
                    }
                }
                Event::Resize(_width, _height) => {
                    // The terminal size is refreshed on the next draw
                }
                _ => {
                    // Ignore other event types (mouse, etc.)
                }
            }
        }
    }

    guard.restore()?;

    Ok(())
}

fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    // The add form captures typed characters, so it comes before the
    // global bindings
    if app.ui.mode == Mode::Add {
        return handle_add_mode(app, key_event);
    }

    if app.ui.mode == Mode::Help {
        return handle_help_mode(app, key_event);
    }

    handle_global_key_bindings(app, key_event)
}

fn handle_add_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::BackTab => {
            // Shift+Tab is sometimes sent as BackTab on some terminals
            app.navigate_form_field(false);
            return Ok(false);
        }
        KeyCode::Tab => {
            let forward = !key_event.modifiers.contains(KeyModifiers::SHIFT);
            app.navigate_form_field(forward);
            return Ok(false);
        }
        KeyCode::Up => {
            app.navigate_form_field(false);
            return Ok(false);
        }
        KeyCode::Down => {
            app.navigate_form_field(true);
            return Ok(false);
        }
        KeyCode::Enter => {
            app.submit_add_form();
            return Ok(false);
        }
        KeyCode::Esc => {
            app.exit_add_mode();
            return Ok(false);
        }
        _ => {}
    }

    // Forward all other keys to the current form field
    if let Some(input) = app.current_form_input() {
        match key_event.code {
            KeyCode::Char(c) => {
                // Skip if the primary modifier is held so shortcuts are not inserted
                if crate::utils::has_primary_modifier(key_event.modifiers) {
                    return Ok(false);
                }
                input.insert_char(c);
            }
            KeyCode::Backspace => {
                input.delete_char();
            }
            KeyCode::Delete => {
                input.delete_char_forward();
            }
            KeyCode::Left => {
                input.move_cursor_left();
            }
            KeyCode::Right => {
                input.move_cursor_right();
            }
            KeyCode::Home => {
                input.move_cursor_home();
            }
            KeyCode::End => {
                input.move_cursor_end();
            }
            _ => {
                // Ignore other keys in add mode
            }
        }
    }
    Ok(false)
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    match key_event.code {
        KeyCode::Esc => {
            app.exit_help_mode();
            Ok(false)
        }
        _ => {
            // Check if the help binding is pressed again to toggle off
            let help_binding = parse_key_binding(&app.config.key_bindings.help)
                .map_err(TuiError::KeyBindingError)?;
            if matches_key_event(key_event, &help_binding) {
                app.exit_help_mode();
            }
            // Ignore all other keys in help mode
            Ok(false)
        }
    }
}

fn handle_global_key_bindings(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    // Check for quit key
    let quit_binding = parse_key_binding(&app.config.key_bindings.quit)
        .map_err(TuiError::KeyBindingError)?;
    if matches_key_event(key_event, &quit_binding) {
        return Ok(true); // Quit
    }

    // Arrow keys work as an alternative to the configured list bindings
    match key_event.code {
        KeyCode::Up => {
            app.move_selection_up();
            return Ok(false);
        }
        KeyCode::Down => {
            app.move_selection_down();
            return Ok(false);
        }
        _ => {}
    }

    let list_down_binding = parse_key_binding(&app.config.key_bindings.list_down)
        .map_err(TuiError::KeyBindingError)?;
    if matches_key_event(key_event, &list_down_binding) {
        app.move_selection_down();
        return Ok(false);
    }

    let list_up_binding = parse_key_binding(&app.config.key_bindings.list_up)
        .map_err(TuiError::KeyBindingError)?;
    if matches_key_event(key_event, &list_up_binding) {
        app.move_selection_up();
        return Ok(false);
    }

    // Check for add binding
    let add_binding = parse_key_binding(&app.config.key_bindings.add)
        .map_err(TuiError::KeyBindingError)?;
    if matches_key_event(key_event, &add_binding) {
        app.enter_add_mode();
        return Ok(false);
    }

    // Check for toggle binding
    let toggle_binding = parse_key_binding(&app.config.key_bindings.toggle_completed)
        .map_err(TuiError::KeyBindingError)?;
    if matches_key_event(key_event, &toggle_binding) {
        app.toggle_selected_task();
        return Ok(false);
    }

    // Check for delete binding
    let delete_binding = parse_key_binding(&app.config.key_bindings.delete)
        .map_err(TuiError::KeyBindingError)?;
    if matches_key_event(key_event, &delete_binding) {
        app.delete_selected_task();
        return Ok(false);
    }

    // Check for help binding
    let help_binding = parse_key_binding(&app.config.key_bindings.help)
        .map_err(TuiError::KeyBindingError)?;
    if matches_key_event(key_event, &help_binding) {
        app.enter_help_mode();
        return Ok(false);
    }

    Ok(false)
}

fn matches_key_event(key_event: KeyEvent, binding: &crate::utils::ParsedKeyBinding) -> bool {
    // Primary modifier is Ctrl on Windows/Linux, Option/Alt on macOS
    let has_primary_mod = crate::utils::has_primary_modifier(key_event.modifiers);
    if binding.requires_ctrl != has_primary_mod {
        return false;
    }

    binding.key_code == key_event.code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::TaskStore;
    use tempfile::TempDir;

    fn test_app() -> (App, TempDir) {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("tasks.json");
        let store = TaskStore::open(path.to_str().expect("valid utf-8 path"))
            .expect("open store");
        let app = App::new(Config::default(), store).expect("create app");
        (app, dir)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key_event(app, press(KeyCode::Char(c))).expect("handle key");
        }
    }

    #[test]
    fn quit_binding_requests_exit() {
        let (mut app, _dir) = test_app();
        let quit = handle_key_event(&mut app, press(KeyCode::Char('q'))).expect("handle key");
        assert!(quit);
    }

    #[test]
    fn unknown_key_is_ignored() {
        let (mut app, _dir) = test_app();
        let quit = handle_key_event(&mut app, press(KeyCode::Char('z'))).expect("handle key");
        assert!(!quit);
        assert_eq!(app.ui.mode, Mode::View);
    }

    #[test]
    fn add_binding_opens_form_and_typing_fills_it() {
        let (mut app, _dir) = test_app();
        handle_key_event(&mut app, press(KeyCode::Char('a'))).expect("handle key");
        assert_eq!(app.ui.mode, Mode::Add);

        type_text(&mut app, "buy milk");
        let form = app.form.add_form.as_ref().expect("form open");
        assert_eq!(form.text.value, "buy milk");

        handle_key_event(&mut app, press(KeyCode::Enter)).expect("handle key");
        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.list.len(), 1);
    }

    #[test]
    fn quit_key_types_into_form_instead_of_quitting() {
        let (mut app, _dir) = test_app();
        handle_key_event(&mut app, press(KeyCode::Char('a'))).expect("handle key");
        let quit = handle_key_event(&mut app, press(KeyCode::Char('q'))).expect("handle key");
        assert!(!quit);
        let form = app.form.add_form.as_ref().expect("form open");
        assert_eq!(form.text.value, "q");
    }

    #[test]
    fn escape_cancels_form_without_adding() {
        let (mut app, _dir) = test_app();
        handle_key_event(&mut app, press(KeyCode::Char('a'))).expect("handle key");
        type_text(&mut app, "draft");
        handle_key_event(&mut app, press(KeyCode::Esc)).expect("handle key");
        assert_eq!(app.ui.mode, Mode::View);
        assert!(app.list.is_empty());
    }

    #[test]
    fn space_toggles_selected_task() {
        let (mut app, _dir) = test_app();
        handle_key_event(&mut app, press(KeyCode::Char('a'))).expect("handle key");
        type_text(&mut app, "stretch");
        handle_key_event(&mut app, press(KeyCode::Enter)).expect("handle key");

        handle_key_event(&mut app, press(KeyCode::Char(' '))).expect("handle key");
        assert_eq!(app.selected_task().map(|t| t.completed), Some(true));
    }

    #[test]
    fn delete_binding_removes_selected_task() {
        let (mut app, _dir) = test_app();
        handle_key_event(&mut app, press(KeyCode::Char('a'))).expect("handle key");
        type_text(&mut app, "old chore");
        handle_key_event(&mut app, press(KeyCode::Enter)).expect("handle key");
        assert_eq!(app.list.len(), 1);

        handle_key_event(&mut app, press(KeyCode::Char('d'))).expect("handle key");
        assert!(app.list.is_empty());
        assert_eq!(app.status.message.as_deref(), Some("Task deleted"));
    }

    #[test]
    fn help_opens_and_escape_closes() {
        let (mut app, _dir) = test_app();
        handle_key_event(&mut app, press(KeyCode::F(1))).expect("handle key");
        assert_eq!(app.ui.mode, Mode::Help);
        // Keys other than Escape and the help binding are swallowed
        let quit = handle_key_event(&mut app, press(KeyCode::Char('q'))).expect("handle key");
        assert!(!quit);
        handle_key_event(&mut app, press(KeyCode::Esc)).expect("handle key");
        assert_eq!(app.ui.mode, Mode::View);
    }

    #[test]
    fn tab_and_arrows_move_between_form_fields() {
        let (mut app, _dir) = test_app();
        handle_key_event(&mut app, press(KeyCode::Char('a'))).expect("handle key");
        handle_key_event(&mut app, press(KeyCode::Tab)).expect("handle key");
        let form = app.form.add_form.as_ref().expect("form open");
        assert_eq!(form.current_field, crate::tui::app::AddField::DueDate);

        handle_key_event(&mut app, press(KeyCode::Up)).expect("handle key");
        let form = app.form.add_form.as_ref().expect("form open");
        assert_eq!(form.current_field, crate::tui::app::AddField::Text);
    }
}
