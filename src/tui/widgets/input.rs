use std::cmp;

/// Single-line text input used by the add-task form.
#[derive(Debug, Clone)]
pub struct Input {
    pub value: String,
    pub cursor_col: usize,
}

impl Input {
    pub fn new() -> Self {
        Self {
            value: String::new(),
            cursor_col: 0,
        }
    }

    pub fn from_string(content: String) -> Self {
        // Use chars().count() for UTF-8 safe character count, not byte count
        let cursor_col = content.chars().count();
        Self {
            value: content,
            cursor_col,
        }
    }

    pub fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn insert_char(&mut self, ch: char) {
        let col = cmp::min(self.cursor_col, self.char_count());
        let mut chars: Vec<char> = self.value.chars().collect();
        chars.insert(col, ch);
        self.value = chars.into_iter().collect();
        self.cursor_col = col + 1;
    }

    /// Delete the character before the cursor (Backspace).
    pub fn delete_char(&mut self) {
        let col = cmp::min(self.cursor_col, self.char_count());
        if col == 0 {
            return;
        }
        let mut chars: Vec<char> = self.value.chars().collect();
        chars.remove(col - 1);
        self.value = chars.into_iter().collect();
        self.cursor_col = col - 1;
    }

    /// Delete the character under the cursor (Delete).
    pub fn delete_char_forward(&mut self) {
        let col = cmp::min(self.cursor_col, self.char_count());
        let mut chars: Vec<char> = self.value.chars().collect();
        if col < chars.len() {
            chars.remove(col);
            self.value = chars.into_iter().collect();
            self.cursor_col = col;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.char_count() {
            self.cursor_col += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.char_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_col = 0;
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}
