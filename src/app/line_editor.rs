use std::cmp::min;

/// What a field accepts at input time. Date components (day, month,
/// year) take digits only, capped at their natural width, so invalid
/// characters never reach validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InputMode {
    Text,
    Digits { max_chars: usize },
}

#[derive(Clone, Debug)]
pub struct LineEditor {
    pub text: String,
    pub cursor_col: usize,
    mode: InputMode,
}

impl LineEditor {
    pub fn text_input() -> Self {
        Self {
            text: String::new(),
            cursor_col: 0,
            mode: InputMode::Text,
        }
    }

    pub fn digit_input(max_chars: usize) -> Self {
        Self {
            text: String::new(),
            cursor_col: 0,
            mode: InputMode::Digits { max_chars },
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self.cursor_col = self.text.chars().count();
        self
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buffer = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buffer));
    }

    pub fn insert_str(&mut self, text: &str) {
        let accepted = match self.mode {
            InputMode::Text => flatten_to_single_line(text),
            InputMode::Digits { max_chars } => {
                let digits: String = text.chars().filter(|ch| ch.is_ascii_digit()).collect();
                let room = max_chars.saturating_sub(self.text.chars().count());
                digits.chars().take(room).collect()
            }
        };
        if accepted.is_empty() {
            return;
        }

        self.clamp_cursor();
        let byte_index = char_to_byte_index(&self.text, self.cursor_col);
        self.text.insert_str(byte_index, &accepted);
        self.cursor_col += accepted.chars().count();
    }

    pub fn backspace(&mut self) {
        self.clamp_cursor();
        if self.cursor_col == 0 {
            return;
        }

        let remove_col = self.cursor_col - 1;
        let byte_index = char_to_byte_index(&self.text, remove_col);
        self.text.remove(byte_index);
        self.cursor_col -= 1;
    }

    pub fn delete_forward(&mut self) {
        self.clamp_cursor();
        if self.cursor_col >= self.text.chars().count() {
            return;
        }

        let byte_index = char_to_byte_index(&self.text, self.cursor_col);
        self.text.remove(byte_index);
    }

    pub fn move_left(&mut self) {
        self.clamp_cursor();
        self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.clamp_cursor();
        self.cursor_col = (self.cursor_col + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.text.chars().count();
    }

    fn clamp_cursor(&mut self) {
        let len = self.text.chars().count();
        self.cursor_col = min(self.cursor_col, len);
    }
}

/// Newlines and tabs become spaces; runs of spaces collapse. Single-line
/// fields should survive a multi-line paste.
fn flatten_to_single_line(text: &str) -> String {
    let mut out = String::new();
    let mut last_was_space = false;

    for ch in text.chars() {
        let ch = match ch {
            '\n' | '\r' | '\t' => ' ',
            other => other,
        };

        if ch == ' ' {
            if last_was_space {
                continue;
            }
            last_was_space = true;
        } else {
            last_was_space = false;
        }
        out.push(ch);
    }

    out
}

fn char_to_byte_index(text: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }
    match text.char_indices().nth(char_index) {
        Some((index, _)) => index,
        None => text.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_backspace_behave_on_unicode() {
        let mut editor = LineEditor::text_input();
        editor.insert_str("ab");
        editor.insert_char('é');
        assert_eq!(editor.text, "abé");
        assert_eq!(editor.cursor_col, 3);
        editor.backspace();
        assert_eq!(editor.text, "ab");
        assert_eq!(editor.cursor_col, 2);
    }

    #[test]
    fn pasted_newlines_flatten_to_spaces() {
        let mut editor = LineEditor::text_input();
        editor.insert_str("buy\nmilk\tand  eggs");
        assert_eq!(editor.text, "buy milk and eggs");
    }

    #[test]
    fn digit_mode_drops_non_digits_and_caps_length() {
        let mut editor = LineEditor::digit_input(2);
        editor.insert_char('a');
        assert_eq!(editor.text, "");
        editor.insert_str("04");
        assert_eq!(editor.text, "04");
        editor.insert_char('5');
        assert_eq!(editor.text, "04");
    }

    #[test]
    fn digit_mode_filters_mixed_paste() {
        let mut editor = LineEditor::digit_input(4);
        editor.insert_str("year 2019!");
        assert_eq!(editor.text, "2019");
    }

    #[test]
    fn with_text_places_the_cursor_at_the_end() {
        let editor = LineEditor::text_input().with_text("water plants");
        assert_eq!(editor.cursor_col, 12);
    }
}
