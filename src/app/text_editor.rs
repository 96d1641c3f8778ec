use std::cmp::min;

/// Multi-line editor backing the description field. Lines are stored
/// unjoined; `text()` assembles the final value on submit.
#[derive(Clone, Debug)]
pub struct TextEditor {
    pub lines: Vec<String>,
    pub cursor_row: usize,
    pub cursor_col: usize,
}

impl TextEditor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            cursor_col: 0,
        }
    }

    pub fn with_text(text: &str) -> Self {
        let lines: Vec<String> = normalize_newlines(text)
            .split('\n')
            .map(str::to_string)
            .collect();
        let cursor_row = lines.len().saturating_sub(1);
        let cursor_col = lines.last().map(|line| line.chars().count()).unwrap_or(0);
        Self {
            lines,
            cursor_row,
            cursor_col,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buffer = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buffer));
    }

    pub fn insert_str(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.clamp_cursor();

        let normalized = normalize_newlines(text);
        let parts: Vec<&str> = normalized.split('\n').collect();
        if parts.len() == 1 {
            let line = &mut self.lines[self.cursor_row];
            let byte_index = char_to_byte_index(line, self.cursor_col);
            line.insert_str(byte_index, parts[0]);
            self.cursor_col += parts[0].chars().count();
            return;
        }

        let current = std::mem::take(&mut self.lines[self.cursor_row]);
        let (before, after) = split_at_char_index(&current, self.cursor_col);

        let mut new_lines = Vec::with_capacity(parts.len());
        new_lines.push(format!("{before}{}", parts[0]));
        for mid in &parts[1..parts.len() - 1] {
            new_lines.push((*mid).to_string());
        }
        new_lines.push(format!("{}{after}", parts[parts.len() - 1]));

        self.lines.splice(self.cursor_row..=self.cursor_row, new_lines);
        self.cursor_row += parts.len() - 1;
        self.cursor_col = parts[parts.len() - 1].chars().count();
    }

    pub fn insert_newline(&mut self) {
        self.clamp_cursor();

        let current = std::mem::take(&mut self.lines[self.cursor_row]);
        let (before, after) = split_at_char_index(&current, self.cursor_col);
        self.lines[self.cursor_row] = before;
        self.lines.insert(self.cursor_row + 1, after);
        self.cursor_row += 1;
        self.cursor_col = 0;
    }

    pub fn backspace(&mut self) {
        self.clamp_cursor();

        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_row];
            let byte_index = char_to_byte_index(line, self.cursor_col - 1);
            line.remove(byte_index);
            self.cursor_col -= 1;
            return;
        }

        if self.cursor_row == 0 {
            return;
        }

        let current = self.lines.remove(self.cursor_row);
        self.cursor_row -= 1;
        let previous = &mut self.lines[self.cursor_row];
        self.cursor_col = previous.chars().count();
        previous.push_str(&current);
    }

    pub fn delete_forward(&mut self) {
        self.clamp_cursor();

        if self.cursor_col < self.current_line_chars() {
            let line = &mut self.lines[self.cursor_row];
            let byte_index = char_to_byte_index(line, self.cursor_col);
            line.remove(byte_index);
            return;
        }

        if self.cursor_row + 1 >= self.lines.len() {
            return;
        }

        let next = self.lines.remove(self.cursor_row + 1);
        self.lines[self.cursor_row].push_str(&next);
    }

    pub fn move_left(&mut self) {
        self.clamp_cursor();
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.current_line_chars();
        }
    }

    pub fn move_right(&mut self) {
        self.clamp_cursor();
        if self.cursor_col < self.current_line_chars() {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_up(&mut self) {
        self.clamp_cursor();
        if self.cursor_row == 0 {
            return;
        }
        self.cursor_row -= 1;
        self.cursor_col = min(self.cursor_col, self.current_line_chars());
    }

    pub fn move_down(&mut self) {
        self.clamp_cursor();
        if self.cursor_row + 1 >= self.lines.len() {
            return;
        }
        self.cursor_row += 1;
        self.cursor_col = min(self.cursor_col, self.current_line_chars());
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.clamp_cursor();
        self.cursor_col = self.current_line_chars();
    }

    fn current_line_chars(&self) -> usize {
        self.lines
            .get(self.cursor_row)
            .map(|line| line.chars().count())
            .unwrap_or(0)
    }

    fn clamp_cursor(&mut self) {
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        if self.cursor_row >= self.lines.len() {
            self.cursor_row = self.lines.len() - 1;
        }
        self.cursor_col = min(self.cursor_col, self.current_line_chars());
    }
}

impl Default for TextEditor {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_newlines(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn split_at_char_index(input: &str, char_index: usize) -> (String, String) {
    let byte_index = char_to_byte_index(input, char_index);
    (input[..byte_index].to_string(), input[byte_index..].to_string())
}

fn char_to_byte_index(input: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }
    input
        .char_indices()
        .nth(char_index)
        .map(|(index, _)| index)
        .unwrap_or(input.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_splits_the_current_line() {
        let mut editor = TextEditor::new();
        editor.insert_str("milk eggs");
        editor.cursor_col = 4;
        editor.insert_newline();
        assert_eq!(editor.lines, vec!["milk", " eggs"]);
        assert_eq!((editor.cursor_row, editor.cursor_col), (1, 0));
    }

    #[test]
    fn multi_line_paste_lands_as_separate_lines() {
        let mut editor = TextEditor::new();
        editor.insert_str("first\r\nsecond\rthird");
        assert_eq!(editor.lines, vec!["first", "second", "third"]);
    }

    #[test]
    fn backspace_at_line_start_joins_lines() {
        let mut editor = TextEditor::with_text("one\ntwo");
        editor.cursor_row = 1;
        editor.cursor_col = 0;
        editor.backspace();
        assert_eq!(editor.text(), "onetwo");
        assert_eq!((editor.cursor_row, editor.cursor_col), (0, 3));
    }

    #[test]
    fn with_text_round_trips() {
        let editor = TextEditor::with_text("pick up keys\nfrom the office");
        assert_eq!(editor.text(), "pick up keys\nfrom the office");
        assert_eq!(editor.cursor_row, 1);
    }
}
