//! Comment capture
//!
//! Comments never reach the token stream. The lexer hands every comment
//! block it skips to a [`CommentTracker`], which keeps two rotating slots:
//! - *current*: the block found while scanning for the latest token
//! - *last*: the previous non-empty block
//!
//! Declarations ask for the slot that fits their position. A block only
//! attaches when it ends on the line of the annotation keyword.

/// A captured comment and the lines it spans.
///
/// `end_line` is the line of the first significant character after the
/// comment, so a block directly above a declaration ends on its line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentBlock {
    pub text: String,
    pub start_line: usize,
    pub end_line: usize,
}

/// Which slot a declaration prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentSlot {
    Current,
    Last,
}

#[derive(Debug, Clone, Default)]
pub struct CommentTracker {
    current: CommentBlock,
    last: CommentBlock,
}

impl CommentTracker {
    /// Start scanning for a new token at `line`.
    pub(crate) fn begin_scan(&mut self, line: usize) {
        if !self.current.text.is_empty() {
            self.last = std::mem::take(&mut self.current);
        }
        self.current = CommentBlock {
            text: String::new(),
            start_line: line,
            end_line: line,
        };
    }

    pub(crate) fn record(
        &mut self,
        text: String,
        start_line: usize,
        end_line: usize,
    ) {
        self.current = CommentBlock {
            text,
            start_line,
            end_line,
        };
    }

    pub fn current(&self) -> &CommentBlock {
        &self.current
    }

    pub fn last(&self) -> &CommentBlock {
        &self.last
    }

    /// Comment text attached to a declaration whose keyword sits on `line`.
    ///
    /// The preferred slot wins; the other slot is used only if the preferred
    /// one does not end on `line`.
    pub fn attached(&self, slot: CommentSlot, line: usize) -> Option<&str> {
        let (preferred, other) = match slot {
            CommentSlot::Current => (&self.current, &self.last),
            CommentSlot::Last => (&self.last, &self.current),
        };
        [preferred, other]
            .into_iter()
            .find(|block| !block.text.is_empty() && block.end_line == line)
            .map(|block| block.text.as_str())
    }
}

/// Strip a line comment body and measure its indentation.
///
/// Returns the text after the leading slashes and blanks, and the number of
/// blanks. An empty line reports `usize::MAX` so it always counts as deeper.
pub(crate) fn split_line_comment(raw: &str) -> (&str, usize) {
    let raw = raw.strip_suffix('\r').unwrap_or(raw);
    let body = raw.trim_start_matches('/');
    match body.find(|c: char| c != ' ' && c != '\t') {
        Some(indent) => (&body[indent..], indent),
        None => ("", usize::MAX),
    }
}

/// Fold raw `//` lines into paragraphs.
///
/// A line indented deeper than the last line that started a paragraph is
/// joined to the previous line with a space.
pub(crate) fn fold_line_comments<'a>(
    raw_lines: impl IntoIterator<Item = &'a str>,
) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut last_indent = 0;
    for raw in raw_lines {
        let (text, indent) = split_line_comment(raw);
        match lines.last_mut() {
            Some(previous) if indent > last_indent => {
                previous.push(' ');
                previous.push_str(text);
            }
            _ => {
                lines.push(text.to_string());
                last_indent = indent;
            }
        }
    }
    lines.join("\n")
}
