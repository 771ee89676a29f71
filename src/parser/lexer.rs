//! Lexer (tokenizer) for annotated C++ headers
//!
//! Unlike a batch tokenizer, this lexer is pulled one token at a time by the
//! parser, which decides per call how `<` and `>>` are lexed (see
//! [`LexMode`]). Any token can be pushed back once with
//! [`Lexer::unget_token`].
//!
//! Comments are not tokens. They are captured into the lexer's
//! [`CommentTracker`] so declarations can attach the block written right
//! above them.

use super::comments::{fold_line_comments, CommentTracker};
use crate::error::ParseError;
use std::fmt;

/// Two-character symbols merged into a single token.
const SYMBOL_PAIRS: [[char; 2]; 21] = [
    ['<', '<'],
    ['-', '>'],
    ['>', '>'],
    ['!', '='],
    ['<', '='],
    ['>', '='],
    ['+', '+'],
    ['-', '-'],
    ['+', '='],
    ['-', '='],
    ['*', '='],
    ['/', '='],
    ['^', '='],
    ['|', '='],
    ['&', '='],
    ['~', '='],
    ['%', '='],
    ['&', '&'],
    ['|', '|'],
    ['=', '='],
    [':', ':'],
];

/// Typed value of a constant token.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    String(String),
    Bool(bool),
    UInt32(u32),
    Int32(i32),
    UInt64(u64),
    Int64(i64),
    Real(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Symbol,
    Identifier,
    Constant(Constant),
}

/// A token together with where it started.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw text. String and character literals hold their unescaped body
    /// without quotes.
    pub text: String,
    pub offset: usize,
    pub line: usize,
}

impl Token {
    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }

    pub fn is_identifier(&self, name: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == name
    }

    pub fn constant(&self) -> Option<&Constant> {
        match &self.kind {
            TokenKind::Constant(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Constant(Constant::String(s)) => write!(f, "\"{s}\""),
            _ => write!(f, "{}", self.text),
        }
    }
}

/// How ambiguous characters are lexed for a single [`Lexer::get_token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LexMode {
    /// Lex `<...>` as a string constant (include targets).
    pub angle_strings: bool,
    /// Never merge `>>`, so nested template lists can close one at a time.
    pub split_closing_angle: bool,
}

impl LexMode {
    pub const DEFAULT: LexMode = LexMode {
        angle_strings: false,
        split_closing_angle: false,
    };
    pub const INCLUDE_PATH: LexMode = LexMode {
        angle_strings: true,
        split_closing_angle: false,
    };
    pub const TEMPLATE_CLOSE: LexMode = LexMode {
        angle_strings: false,
        split_closing_angle: true,
    };
}

/// Pull lexer over one file's text.
#[derive(Debug, Default)]
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    prev_position: usize,
    prev_line: usize,
    comments: CommentTracker,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let mut lexer = Self::default();
        lexer.reset(input);
        lexer
    }

    /// Load new text and rewind to its first line.
    pub fn reset(&mut self, input: &str) {
        self.input.clear();
        self.input.extend(input.chars());
        self.position = 0;
        self.line = 1;
        self.prev_position = 0;
        self.prev_line = 1;
        self.comments = CommentTracker::default();
    }

    /// Current 1-based line.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn comments(&self) -> &CommentTracker {
        &self.comments
    }

    pub fn at_eof(&self) -> bool {
        self.position >= self.input.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Consume one character, counting newlines.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.prev_position = self.position;
        self.prev_line = self.line;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Undo the last [`Lexer::next_char`]. Only one level is remembered.
    pub fn unget_char(&mut self) {
        self.position = self.prev_position;
        self.line = self.prev_line;
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.next_char();
        }
    }

    /// Skip whitespace and comments and consume the next significant
    /// character. Comments found on the way are recorded.
    pub fn leading_char(&mut self) -> Option<char> {
        self.comments.begin_scan(self.line);
        while let Some(c) = self.next_char() {
            if c.is_whitespace() || c.is_control() {
                continue;
            }
            if c == '/' {
                match self.peek() {
                    Some('/') => {
                        self.line_comments();
                        continue;
                    }
                    Some('*') => {
                        self.block_comment();
                        continue;
                    }
                    _ => {}
                }
            }
            return Some(c);
        }
        None
    }

    /// Consecutive `//` lines. The first `/` has been consumed.
    fn line_comments(&mut self) {
        let start_line = self.line;
        let mut raw_lines = Vec::new();
        loop {
            let mut raw = String::new();
            while let Some(c) = self.next_char() {
                if c == '\n' {
                    break;
                }
                raw.push(c);
            }
            raw_lines.push(raw);

            self.skip_whitespace();
            if self.peek() == Some('/') && self.peek_ahead(1) == Some('/') {
                self.next_char();
            } else {
                break;
            }
        }
        let text = fold_line_comments(raw_lines.iter().map(String::as_str));
        self.comments.record(text, start_line, self.line);
    }

    /// A `/* */` block. The `/` has been consumed.
    fn block_comment(&mut self) {
        let start_line = self.line;
        self.next_char();

        let mut lines: Vec<String> = Vec::new();
        let mut line = String::new();
        loop {
            match self.next_char() {
                None => break,
                Some('*') if self.peek() == Some('/') => {
                    self.next_char();
                    break;
                }
                Some('\n') => {
                    let text = line.trim_end_matches('\r').to_string();
                    line.clear();
                    if !lines.is_empty() || !text.is_empty() {
                        lines.push(text);
                    }
                }
                Some(c) => {
                    if !line.is_empty() || !(c.is_whitespace() || c == '*') {
                        line.push(c);
                    }
                }
            }
        }
        let tail = line.trim_end();
        if !tail.is_empty() {
            lines.push(tail.to_string());
        }
        while lines.last().is_some_and(String::is_empty) {
            lines.pop();
        }

        self.skip_whitespace();
        self.comments.record(lines.join("\n"), start_line, self.line);
    }

    /// Lex the next token, or `None` at end of input.
    pub fn get_token(&mut self, mode: LexMode) -> Option<Token> {
        let c = self.leading_char()?;
        let offset = self.prev_position;
        let line = self.prev_line;

        let (kind, text) = if c.is_ascii_alphabetic() || c == '_' {
            self.identifier(c)
        } else if c.is_ascii_digit()
            || ((c == '-' || c == '+')
                && self.peek().is_some_and(|d| d.is_ascii_digit()))
        {
            self.number(c)
        } else if c == '"' || c == '\'' || (mode.angle_strings && c == '<') {
            self.quoted(c)
        } else {
            self.symbol(c, mode)
        };

        Some(Token {
            kind,
            text,
            offset,
            line,
        })
    }

    /// Push a token back. The cursor returns to where the token started.
    pub fn unget_token(&mut self, token: &Token) {
        self.position = token.offset;
        self.line = token.line;
    }

    fn identifier(&mut self, first: char) -> (TokenKind, String) {
        let mut text = String::from(first);
        while let Some(c) = self.next_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
            } else {
                self.unget_char();
                break;
            }
        }

        let kind = match text.as_str() {
            "true" => TokenKind::Constant(Constant::Bool(true)),
            "false" => TokenKind::Constant(Constant::Bool(false)),
            _ => TokenKind::Identifier,
        };
        (kind, text)
    }

    fn number(&mut self, first: char) -> (TokenKind, String) {
        let mut text = String::from(first);
        let mut is_float = false;
        let mut is_hex = false;

        while let Some(c) = self.next_char() {
            let accepted = match c {
                '0'..='9' => true,
                '.' if !is_float && !is_hex => {
                    is_float = true;
                    true
                }
                'x' | 'X' if !is_hex && !is_float && is_lone_zero(&text) => {
                    is_hex = true;
                    true
                }
                _ => is_hex && c.is_ascii_hexdigit(),
            };
            if accepted {
                text.push(c);
            } else {
                self.unget_char();
                break;
            }
        }

        if !is_hex && matches!(self.peek(), Some('f' | 'F')) {
            self.next_char();
            is_float = true;
        }

        let value = if is_float {
            Constant::Real(text.parse().unwrap_or(0.0))
        } else {
            integer_constant(&text)
        };
        (TokenKind::Constant(value), text)
    }

    fn quoted(&mut self, open: char) -> (TokenKind, String) {
        let close = match open {
            '<' => '>',
            other => other,
        };
        let mut text = String::new();
        while let Some(c) = self.next_char() {
            if c == close {
                break;
            }
            if c != '\\' {
                text.push(c);
                continue;
            }
            match self.next_char() {
                Some('n') => text.push('\n'),
                Some('t') => text.push('\t'),
                Some('r') => text.push('\r'),
                Some(other) => text.push(other),
                None => break,
            }
        }
        (TokenKind::Constant(Constant::String(text.clone())), text)
    }

    fn symbol(&mut self, first: char, mode: LexMode) -> (TokenKind, String) {
        let mut text = String::from(first);
        if let Some(second) = self.peek() {
            let split = mode.split_closing_angle && first == '>' && second == '>';
            if !split && SYMBOL_PAIRS.contains(&[first, second]) {
                self.next_char();
                text.push(second);
            }
        }
        (TokenKind::Symbol, text)
    }

    /// Consume the next token if it is an identifier.
    pub fn get_identifier(&mut self) -> Option<Token> {
        let token = self.get_token(LexMode::DEFAULT)?;
        if token.kind == TokenKind::Identifier {
            Some(token)
        } else {
            self.unget_token(&token);
            None
        }
    }

    /// Consume the identifier `name` if it comes next.
    pub fn match_identifier(&mut self, name: &str) -> bool {
        self.match_token(LexMode::DEFAULT, |token| token.is_identifier(name))
    }

    /// Consume the symbol `symbol` if it comes next.
    ///
    /// `>` is always matched in split mode so `>>` closes two template
    /// lists.
    pub fn match_symbol(&mut self, symbol: &str) -> bool {
        let mode = if symbol == ">" {
            LexMode::TEMPLATE_CLOSE
        } else {
            LexMode::DEFAULT
        };
        self.match_token(mode, |token| token.is_symbol(symbol))
    }

    fn match_token(
        &mut self,
        mode: LexMode,
        accept: impl Fn(&Token) -> bool,
    ) -> bool {
        match self.get_token(mode) {
            Some(token) if accept(&token) => true,
            Some(token) => {
                self.unget_token(&token);
                false
            }
            None => false,
        }
    }

    pub fn require_identifier(&mut self, name: &str) -> Result<(), ParseError> {
        if self.match_identifier(name) {
            Ok(())
        } else {
            Err(ParseError::syntax(format!("Expected `{name}`"), self.line))
        }
    }

    pub fn require_symbol(&mut self, symbol: &str) -> Result<(), ParseError> {
        if self.match_symbol(symbol) {
            Ok(())
        } else {
            Err(ParseError::syntax(format!("Expected `{symbol}`"), self.line))
        }
    }
}

fn is_lone_zero(text: &str) -> bool {
    matches!(text, "0" | "-0" | "+0")
}

/// Pick the narrowest integer type for a literal.
///
/// Magnitudes beyond 64 bits degrade to [`Constant::Real`].
fn integer_constant(text: &str) -> Constant {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (radix, digits) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1
        && digits.starts_with('0')
        && digits.chars().all(|c| ('0'..='7').contains(&c))
    {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    let magnitude = if digits.is_empty() {
        Some(0)
    } else {
        u64::from_str_radix(digits, radix).ok()
    };
    let Some(magnitude) = magnitude else {
        let value = digits.chars().fold(0.0_f64, |acc, c| {
            acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
        });
        return Constant::Real(if negative { -value } else { value });
    };

    if !negative {
        return match u32::try_from(magnitude) {
            Ok(value) => Constant::UInt32(value),
            Err(_) => Constant::UInt64(magnitude),
        };
    }
    let value = -i128::from(magnitude);
    if let Ok(value) = i32::try_from(value) {
        Constant::Int32(value)
    } else if let Ok(value) = i64::try_from(value) {
        Constant::Int64(value)
    } else {
        Constant::Real(value as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        std::iter::from_fn(|| lexer.get_token(LexMode::DEFAULT)).collect()
    }

    fn constant(source: &str) -> Constant {
        let token = Lexer::new(source).get_token(LexMode::DEFAULT).unwrap();
        match token.kind {
            TokenKind::Constant(value) => value,
            other => panic!("Expected constant, found {:?}", other),
        }
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = tokens("void Move(int dx);");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["void", "Move", "(", "int", "dx", ")", ";"]);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert!(tokens[2].is_symbol("("));
    }

    #[test]
    fn test_symbol_pairs() {
        let tokens = tokens("std::string a->b x>=y &&");
        assert!(tokens[1].is_symbol("::"));
        assert!(tokens[4].is_symbol("->"));
        assert!(tokens[7].is_symbol(">="));
        assert!(tokens[9].is_symbol("&&"));
    }

    #[test]
    fn test_split_closing_angle() {
        let mut lexer = Lexer::new(">>");
        let token = lexer.get_token(LexMode::DEFAULT).unwrap();
        assert!(token.is_symbol(">>"));

        lexer.unget_token(&token);
        assert!(lexer.match_symbol(">"));
        assert!(lexer.match_symbol(">"));
        assert!(lexer.at_eof());
    }

    #[test]
    fn test_narrowest_integer_types() {
        assert_eq!(constant("42"), Constant::UInt32(42));
        assert_eq!(constant("4294967296"), Constant::UInt64(4_294_967_296));
        assert_eq!(constant("-1"), Constant::Int32(-1));
        assert_eq!(constant("-2147483649"), Constant::Int64(-2_147_483_649));
        assert_eq!(constant("0x1F"), Constant::UInt32(31));
        assert_eq!(constant("010"), Constant::UInt32(8));
        assert_eq!(constant("0"), Constant::UInt32(0));
    }

    #[test]
    fn test_real_literals() {
        assert_eq!(constant("1.5"), Constant::Real(1.5));
        assert_eq!(constant("-0.25f"), Constant::Real(-0.25));
        assert_eq!(constant("2f"), Constant::Real(2.0));
    }

    #[test]
    fn test_float_suffix_not_in_text() {
        let token = Lexer::new("1.5f").get_token(LexMode::DEFAULT).unwrap();
        assert_eq!(token.text, "1.5");
    }

    #[test]
    fn test_oversized_integer_degrades_to_real() {
        assert!(matches!(
            constant("99999999999999999999"),
            Constant::Real(v) if v > 9.9e19
        ));
    }

    #[test]
    fn test_sign_needs_adjacent_digit() {
        let tokens = tokens("- 1");
        assert!(tokens[0].is_symbol("-"));
        assert_eq!(tokens[1].constant(), Some(&Constant::UInt32(1)));
    }

    #[test]
    fn test_booleans() {
        assert_eq!(constant("true"), Constant::Bool(true));
        assert_eq!(constant("false"), Constant::Bool(false));
    }

    #[test]
    fn test_string_escapes() {
        let token = Lexer::new(r#""a\"b\n\q""#)
            .get_token(LexMode::DEFAULT)
            .unwrap();
        assert_eq!(token.text, "a\"b\nq");
        assert_eq!(token.constant(), Some(&Constant::String("a\"b\nq".into())));
    }

    #[test]
    fn test_unterminated_string_ends_at_eof() {
        let token = Lexer::new("\"abc").get_token(LexMode::DEFAULT).unwrap();
        assert_eq!(token.text, "abc");
    }

    #[test]
    fn test_character_literal_is_one_token() {
        let lexed = tokens("c = '{'; d = '\\'';");
        assert_eq!(lexed[2].constant(), Some(&Constant::String("{".into())));
        assert!(lexed[3].is_symbol(";"));
        assert_eq!(lexed[6].text, "'");
        assert!(lexed[7].is_symbol(";"));
    }

    #[test]
    fn test_angle_strings_only_in_include_mode() {
        let mut lexer = Lexer::new("<vector> <map>");
        let path = lexer.get_token(LexMode::INCLUDE_PATH).unwrap();
        assert_eq!(path.constant(), Some(&Constant::String("vector".into())));
        assert!(lexer.match_symbol("<"));
    }

    #[test]
    fn test_unget_token_restores_line() {
        let mut lexer = Lexer::new("a\n\n  b");
        lexer.get_token(LexMode::DEFAULT).unwrap();
        let b = lexer.get_token(LexMode::DEFAULT).unwrap();
        assert_eq!(b.line, 3);
        lexer.unget_token(&b);
        assert_eq!(lexer.line(), 3);
        assert_eq!(lexer.get_identifier().unwrap().text, "b");
    }

    #[test]
    fn test_unget_char() {
        let mut lexer = Lexer::new("ab");
        assert_eq!(lexer.next_char(), Some('a'));
        assert_eq!(lexer.next_char(), Some('b'));
        lexer.unget_char();
        assert_eq!(lexer.peek(), Some('b'));
    }

    #[test]
    fn test_require_reports_expected_text() {
        let mut lexer = Lexer::new("\n{");
        let err = lexer.require_symbol(";").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Syntax { ref message, line: 2 } if message == "Expected `;`"
        ));
    }

    #[test]
    fn test_line_comment_block_is_captured() {
        let mut lexer = Lexer::new("// Player entity\n//   with health\nCLASS");
        let token = lexer.get_token(LexMode::DEFAULT).unwrap();
        assert_eq!(token.line, 3);
        let comment = lexer.comments().current();
        assert_eq!(comment.text, "Player entity with health");
        assert_eq!(comment.start_line, 1);
        assert_eq!(comment.end_line, 3);
    }

    #[test]
    fn test_block_comment_strips_stars() {
        let mut lexer =
            Lexer::new("/**\n * Returns the name.\n *\n * Never empty.\n */\nX");
        lexer.get_token(LexMode::DEFAULT).unwrap();
        assert_eq!(
            lexer.comments().current().text,
            "Returns the name.\n\nNever empty."
        );
    }

    #[test]
    fn test_single_line_block_comment() {
        let mut lexer = Lexer::new("/* health points */ int");
        lexer.get_token(LexMode::DEFAULT).unwrap();
        assert_eq!(lexer.comments().current().text, "health points");
    }

    #[test]
    fn test_comment_rotates_into_last_slot() {
        let mut lexer = Lexer::new("// doc\nFUNCTION()");
        lexer.get_token(LexMode::DEFAULT).unwrap();
        lexer.get_token(LexMode::DEFAULT).unwrap();
        assert_eq!(lexer.comments().last().text, "doc");
        assert!(lexer.comments().current().text.is_empty());
    }
}
