use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Cancel,
    Submit,
}

/// Single-line text field with a caret
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    /// Caret position in chars
    cursor: usize,
    masked: bool,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn masked() -> Self {
        Self {
            masked: true,
            ..Self::default()
        }
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self {
            value,
            cursor,
            masked: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Text to draw: bullets in place of characters when masked
    pub fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('u') => self.clear(),
                KeyCode::Char('a') => self.cursor = 0,
                KeyCode::Char('e') => self.cursor = self.len(),
                _ => {}
            }
            return InputAction::None;
        }

        match key.code {
            KeyCode::Esc => return InputAction::Cancel,
            KeyCode::Enter => return InputAction::Submit,
            KeyCode::Char(ch) => self.insert(ch),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            _ => {}
        }
        InputAction::None
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(idx, _)| idx)
            .unwrap_or(self.value.len())
    }

    fn insert(&mut self, ch: char) {
        let idx = self.byte_index(self.cursor);
        self.value.insert(idx, ch);
        self.cursor += 1;
    }

    fn remove_at(&mut self, char_idx: usize) {
        let idx = self.byte_index(char_idx);
        self.value.remove(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(input: &mut TextInput, text: &str) {
        for ch in text.chars() {
            input.handle_key(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn typing_and_backspace() {
        let mut input = TextInput::new();
        type_text(&mut input, "milk");
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "mil");
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn insert_in_the_middle_handles_multibyte() {
        let mut input = TextInput::with_value("café");
        input.handle_key(key(KeyCode::Left));
        input.handle_key(key(KeyCode::Left));
        type_text(&mut input, "-");
        assert_eq!(input.value(), "ca-fé");
        input.handle_key(key(KeyCode::End));
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "ca-f");
    }

    #[test]
    fn enter_and_escape_are_actions() {
        let mut input = TextInput::new();
        assert_eq!(input.handle_key(key(KeyCode::Enter)), InputAction::Submit);
        assert_eq!(input.handle_key(key(KeyCode::Esc)), InputAction::Cancel);
    }

    #[test]
    fn ctrl_u_clears() {
        let mut input = TextInput::with_value("draft");
        input.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn masked_display_hides_text() {
        let mut input = TextInput::masked();
        type_text(&mut input, "pw1");
        assert_eq!(input.display(), "•••");
        assert_eq!(input.value(), "pw1");
    }
}
