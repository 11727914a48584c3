//! Indented line buffer for GDScript text

const INDENT: &str = "\t";

#[derive(Debug, Default)]
pub(crate) struct Output {
    lines: Vec<String>,
    indent: usize,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_indent(indent: usize) -> Self {
        Self {
            lines: Vec::new(),
            indent,
        }
    }

    pub(crate) fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines.push(format!("{}{}", INDENT.repeat(self.indent), text));
        }
    }

    /// Appends lines that already carry their indentation.
    pub(crate) fn raw_lines(&mut self, lines: Vec<String>) {
        self.lines.extend(lines);
    }

    /// Separates top-level blocks with a single empty line.
    pub(crate) fn blank(&mut self) {
        if matches!(self.lines.last(), Some(last) if !last.is_empty()) {
            self.lines.push(String::new());
        }
    }

    pub(crate) fn indent(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub(crate) fn level(&self) -> usize {
        self.indent
    }

    pub(crate) fn len(&self) -> usize {
        self.lines.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub(crate) fn into_lines(self) -> Vec<String> {
        self.lines
    }

    /// Joined text with one trailing newline and no trailing empty lines.
    pub(crate) fn finish(mut self) -> String {
        while matches!(self.lines.last(), Some(last) if last.is_empty()) {
            self.lines.pop();
        }
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation() {
        let mut out = Output::new();
        out.line("func _ready():");
        out.indent();
        out.line("pass");
        out.dedent();
        out.blank();
        out.blank();
        out.line("var x = 1");
        assert_eq!(out.finish(), "func _ready():\n\tpass\n\nvar x = 1\n");
    }
}
