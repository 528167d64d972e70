//! The in-progress input line: content, a char-indexed cursor, and the
//! `newest` slot that preserves an unfinished line while the user
//! browses history.

#[derive(Debug, Default)]
pub struct LineBuffer {
    content: String,
    cursor: usize,
    newest: Option<String>,
}

impl LineBuffer {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Delete before the cursor. Returns whether anything was removed.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
        true
    }

    /// Delete at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Take the line on Enter: clears content, cursor and the saved
    /// newest line.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        self.newest = None;
        std::mem::take(&mut self.content)
    }

    /// Replace the buffer (history recall); cursor moves to the end.
    pub fn set(&mut self, s: &str) {
        self.content = s.to_string();
        self.cursor = self.char_len();
    }

    /// Save the in-progress line before the first step back in history.
    pub fn save_newest(&mut self) {
        self.newest = Some(self.content.clone());
    }

    /// Restore the saved line when navigation returns past the end.
    pub fn take_newest(&mut self) -> String {
        self.newest.take().unwrap_or_default()
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }
}
