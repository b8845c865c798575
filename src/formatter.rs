//! Turns rendered text into a block of line comments.

/// Line-comment token of Emacs Lisp.
pub const DEFAULT_COMMENT_TOKEN: &str = ";;";

/// Prefixes lines with a line-comment token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFormatter {
    token: String,
}

impl Default for CommentFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_COMMENT_TOKEN)
    }
}

impl CommentFormatter {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Comments out every line of `text`.
    ///
    /// Each line becomes `<token> <line>` followed by a newline. Blank lines
    /// get the bare token so no trailing whitespace is produced. Existing
    /// comment tokens are not recognised and get prefixed again.
    pub fn format(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + text.len() / 8);

        for line in text.lines() {
            let line = line.trim_end();
            out.push_str(&self.token);
            if !line.is_empty() {
                out.push(' ');
                out.push_str(line);
            }
            out.push('\n');
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_prefixes_each_line() {
        let formatter = CommentFormatter::default();
        assert_eq!(formatter.format("Hello\nWorld"), ";; Hello\n;; World\n");
    }

    #[test]
    fn test_format_trailing_newline_is_not_an_extra_line() {
        let formatter = CommentFormatter::default();
        assert_eq!(formatter.format("Hello\nWorld\n"), ";; Hello\n;; World\n");
    }

    #[test]
    fn test_format_blank_lines_get_bare_token() {
        let formatter = CommentFormatter::default();
        assert_eq!(
            formatter.format("Title\n\n   \nBody"),
            ";; Title\n;;\n;;\n;; Body\n"
        );
    }

    #[test]
    fn test_format_empty_input() {
        assert_eq!(CommentFormatter::default().format(""), "");
    }

    #[test]
    fn test_format_keeps_indentation() {
        let formatter = CommentFormatter::default();
        assert_eq!(
            formatter.format("- item\n  continued"),
            ";; - item\n;;   continued\n"
        );
    }

    #[test]
    fn test_format_double_prefixes_comments() {
        let formatter = CommentFormatter::default();
        assert_eq!(formatter.format(";; already"), ";; ;; already\n");
    }

    #[test]
    fn test_format_line_count_is_preserved() {
        let formatter = CommentFormatter::new("#");
        let text = "one\ntwo\n\nfour\nfive";
        let formatted = formatter.format(text);
        assert_eq!(formatted.lines().count(), text.lines().count());
        assert!(formatted.lines().all(|line| line.starts_with('#')));
    }
}
