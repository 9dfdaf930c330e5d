//! Text input field handling.

use unicode_width::UnicodeWidthStr;

/// State for a single-line text input field.
#[derive(Clone, Debug, Default)]
pub struct TextInput {
    /// The current text content.
    content: String,
    /// Cursor position as a character index.
    cursor: usize,
}

impl TextInput {
    /// Creates a new empty text input.
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Deletes the character at the cursor position (delete).
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Takes the content and resets the input.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    pub fn clear(&mut self) {
        self.take();
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Terminal columns between the start of the text and the cursor.
    pub fn cursor_column(&self) -> u16 {
        let before = &self.content[..self.byte_index(self.cursor)];
        u16::try_from(before.width()).unwrap_or(u16::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> TextInput {
        let mut input = TextInput::new();
        s.chars().for_each(|c| input.insert(c));
        input
    }

    #[test]
    fn editing_in_the_middle() {
        let mut input = typed("bc1q");
        input.move_left();
        input.move_left();
        input.insert('X');
        assert_eq!(input.as_str(), "bcX1q");
        input.backspace();
        input.delete();
        assert_eq!(input.as_str(), "bcq");
    }

    #[test]
    fn multibyte_characters_are_safe() {
        let mut input = typed("地址");
        assert_eq!(input.cursor_column(), 4);
        input.move_left();
        input.backspace();
        assert_eq!(input.as_str(), "址");
        input.move_end();
        input.insert('a');
        assert_eq!(input.as_str(), "址a");
    }

    #[test]
    fn take_resets() {
        let mut input = typed("abc");
        assert_eq!(input.take(), "abc");
        assert!(input.is_empty());
        assert_eq!(input.cursor_column(), 0);
    }
}
