//! Main parser coordinator
//!
//! This module provides the [`Parser`] and [`Session`] types, the statement
//! dispatcher and the tolerant skipping of everything that is not annotated.
//!
//! # Parser Architecture
//!
//! The Parser is a streaming recursive descent parser:
//! - This module: Parser state, sessions, statement dispatch, directives
//! - `declarations`: enums, classes, functions, constructors, properties,
//!   namespaces, marker macros and their meta blocks
//! - `types`: type expressions
//!
//! Parser methods are split across multiple files using `impl Parser` blocks.
//! Declarations are written into the current file's JSON buffer as they are
//! recognized; no syntax tree is kept.
//!
//! # Sessions
//!
//! [`Parser::open`] starts the output document and returns a [`Session`]
//! that borrows the parser mutably. A parser therefore cannot be opened
//! twice, and output cannot be closed without having been opened.

use super::lexer::{LexMode, Lexer, Token, TokenKind};
use super::scope::{Access, ScopeStack};
use crate::config::Options;
use crate::emitter::{file_writer, Document, JsonWriter};
use crate::error::{Error, ParseError};
use rustc_hash::FxHashMap;
use std::io::{self, Write};

/// What a configured annotation keyword introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Enum,
    Class,
    Constructor,
    Function,
    Property,
    Namespace,
    Custom,
}

/// Reusable parser for annotated headers.
pub struct Parser {
    keywords: FxHashMap<String, Keyword>,
    pub(crate) lexer: Lexer,
    pub(crate) scopes: ScopeStack,
    pub(crate) out: JsonWriter<Vec<u8>>,
}

impl Parser {
    pub fn new(options: Options) -> Self {
        Self {
            keywords: keyword_table(&options),
            lexer: Lexer::default(),
            scopes: ScopeStack::new(),
            out: file_writer(),
        }
    }

    /// Start an output document on `sink`.
    pub fn open<W: Write>(&mut self, sink: W) -> Result<Session<'_, W>, Error> {
        let document = Document::begin(sink)?;
        log::debug!("opened header document");
        Ok(Session {
            parser: self,
            document,
        })
    }

    /// Parse `(display name, text)` pairs into one JSON document.
    ///
    /// Stops at the first file that fails to parse.
    pub fn parse_batch<'a, I>(&mut self, files: I) -> Result<String, Error>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut session = self.open(Vec::new())?;
        for (name, text) in files {
            session.parse(text, name)?;
        }
        let bytes = session.close()?;
        String::from_utf8(bytes)
            .map_err(|err| Error::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
    }

    /// Render one file as a `{file, content}` object.
    fn parse_file(&mut self, text: &str, file: &str) -> Result<Vec<u8>, ParseError> {
        self.lexer.reset(text);
        self.scopes.reset();
        self.out = file_writer();

        self.out.begin_object()?;
        self.out.field("file", file)?;
        self.out.key("content")?;
        self.out.begin_array()?;
        while self.parse_statement()? {}
        self.out.end_array()?;
        self.out.end_object()?;

        let out = std::mem::replace(&mut self.out, file_writer());
        Ok(out.into_inner())
    }

    /// Parse one statement. Returns `false` at end of input.
    pub(crate) fn parse_statement(&mut self) -> Result<bool, ParseError> {
        let Some(token) = self.lexer.get_token(LexMode::DEFAULT) else {
            return Ok(false);
        };
        self.parse_declaration(token)?;
        Ok(true)
    }

    fn parse_declaration(&mut self, token: Token) -> Result<(), ParseError> {
        if token.is_symbol("#") {
            return self.parse_directive(&token);
        }
        if token.is_symbol(";") {
            return Ok(());
        }

        let keyword = match token.kind {
            TokenKind::Identifier => self.keywords.get(&token.text).copied(),
            _ => None,
        };
        if let Some(keyword) = keyword {
            log::trace!("line {}: `{}` ({:?})", token.line, token.text, keyword);
        }

        match keyword {
            Some(Keyword::Enum) => return self.parse_enum(&token),
            Some(Keyword::Class) => return self.parse_class(&token),
            Some(Keyword::Constructor) => return self.parse_constructor(&token),
            Some(Keyword::Function) => return self.parse_function(&token),
            Some(Keyword::Property) => return self.parse_property(&token),
            _ => {}
        }
        if token.is_identifier("namespace") {
            return self.parse_namespace(&token);
        }
        if keyword == Some(Keyword::Namespace) {
            return self.parse_annotated_namespace(&token);
        }
        if let Some(access) = Access::from_token(&token) {
            self.scopes.top_mut().access = access;
            return self.lexer.require_symbol(":");
        }
        if keyword == Some(Keyword::Custom) {
            return self.parse_custom_macro(&token);
        }

        self.skip_declaration(token);
        Ok(())
    }

    fn parse_directive(&mut self, hash: &Token) -> Result<(), ParseError> {
        let directive =
            self.expect_identifier("Missing compiler directive after #")?;
        match directive.text.as_str() {
            "include" => {
                let path = self
                    .lexer
                    .get_token(LexMode::INCLUDE_PATH)
                    .ok_or_else(|| self.error("Expected include path"))?;
                self.out.begin_object()?;
                self.out.field("type", "include")?;
                self.out.field("line", &hash.line)?;
                self.out.field("file", path.text.as_str())?;
                self.out.end_object()?;
                self.skip_line(false);
            }
            "define" => self.skip_line(true),
            _ => self.skip_line(false),
        }
        Ok(())
    }

    /// Discard the rest of the physical line. With `continuations`, lines
    /// ending in a backslash extend it.
    fn skip_line(&mut self, continuations: bool) {
        let mut last = '\n';
        while let Some(c) = self.lexer.next_char() {
            match c {
                '\n' if continuations && last == '\\' => last = '\n',
                '\n' => break,
                '\r' => {}
                _ => last = c,
            }
        }
    }

    /// Skip an unrecognized statement starting at `first`.
    ///
    /// Stops after a `;` outside braces or after the `}` that closes the
    /// outermost brace.
    pub(crate) fn skip_declaration(&mut self, first: Token) {
        log::trace!("line {}: skipping `{}`", first.line, first);
        let mut depth = 0usize;
        let mut token = Some(first);
        while let Some(current) = token {
            if current.kind == TokenKind::Symbol {
                match current.text.as_str() {
                    ";" if depth == 0 => return,
                    "{" => depth += 1,
                    "}" => {
                        depth = depth.saturating_sub(1);
                        if depth == 0 {
                            return;
                        }
                    }
                    _ => {}
                }
            }
            token = self.lexer.get_token(LexMode::DEFAULT);
        }
    }

    /// Skip whatever follows a declaration: its `;` or its body.
    pub(crate) fn skip_remainder(&mut self) {
        if let Some(token) = self.lexer.get_token(LexMode::DEFAULT) {
            self.skip_declaration(token);
        }
    }

    // ===== Helper methods =====

    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::syntax(message, self.lexer.line())
    }

    pub(crate) fn expect_identifier(
        &mut self,
        message: &str,
    ) -> Result<Token, ParseError> {
        self.lexer
            .get_identifier()
            .ok_or_else(|| self.error(message))
    }
}

fn keyword_table(options: &Options) -> FxHashMap<String, Keyword> {
    let mut table = FxHashMap::default();
    let mut add = |keyword: &String, kind: Keyword| {
        if !keyword.is_empty() {
            table.entry(keyword.clone()).or_insert(kind);
        }
    };

    add(&options.enum_keyword, Keyword::Enum);
    add(&options.class_keyword, Keyword::Class);
    add(&options.constructor_keyword, Keyword::Constructor);
    for keyword in &options.function_keywords {
        add(keyword, Keyword::Function);
    }
    for keyword in &options.property_keywords {
        add(keyword, Keyword::Property);
    }
    add(&options.namespace_keyword, Keyword::Namespace);
    for keyword in &options.custom_keywords {
        add(keyword, Keyword::Custom);
    }
    table
}

/// An open output document.
///
/// Files are appended in the order they are parsed. A file that fails to
/// parse is left out entirely.
pub struct Session<'p, W: Write> {
    parser: &'p mut Parser,
    document: Document<W>,
}

impl<W: Write> Session<'_, W> {
    /// Parse one file's text and append it to the document.
    pub fn parse(&mut self, text: &str, file: &str) -> Result<(), Error> {
        log::debug!("parsing `{file}`");
        let rendered = self.parser.parse_file(text, file).map_err(|err| {
            log::debug!("failed to parse `{file}`: {err}");
            err.in_file(file)
        })?;
        self.document.append(&rendered)?;
        log::debug!("parsed `{file}`");
        Ok(())
    }

    /// Number of files appended so far.
    pub fn files(&self) -> usize {
        self.document.files()
    }

    /// Close the document and return the sink.
    pub fn close(self) -> Result<W, Error> {
        log::debug!("closing header document with {} file(s)", self.files());
        Ok(self.document.finish()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_precedence() {
        let options = Options::new()
            .function_keyword("ENUM")
            .custom_keyword("public")
            .custom_keyword("MARK");
        let table = keyword_table(&options);
        assert_eq!(table.get("ENUM"), Some(&Keyword::Enum));
        assert_eq!(table.get("MARK"), Some(&Keyword::Custom));
        assert_eq!(table.get("FUNCTION"), Some(&Keyword::Function));
    }

    #[test]
    fn test_empty_keywords_are_ignored() {
        let table = keyword_table(&Options::new().namespace_keyword(""));
        assert!(!table.contains_key(""));
    }

    #[test]
    fn test_skip_declaration_balances_braces() {
        let mut parser = Parser::new(Options::default());
        parser.lexer.reset("struct S { int a; void f() { } } s; next");
        let first = parser.lexer.get_token(LexMode::DEFAULT).unwrap();
        parser.skip_declaration(first);
        assert_eq!(parser.lexer.get_identifier().unwrap().text, "s");
    }

    /// Run `parse_statement` over `source` on a fresh parser and report the
    /// scope depth it stopped at.
    fn depth_after(source: &str) -> (bool, usize) {
        let mut parser = Parser::new(Options::default());
        parser.lexer.reset(source);
        let parsed = parser.parse_statement().is_ok();
        (parsed, parser.scopes.depth())
    }

    #[test]
    fn test_scopes_close_with_their_braces() {
        let (parsed, depth) = depth_after("namespace n { CLASS() class C {");
        assert!(!parsed);
        assert_eq!(depth, 3);

        let (parsed, depth) = depth_after("namespace n { CLASS() class C { };");
        assert!(!parsed);
        assert_eq!(depth, 2);

        let (parsed, depth) = depth_after("namespace n { CLASS() class C { }; }");
        assert!(parsed);
        assert_eq!(depth, 1);
    }

    #[test]
    fn test_skip_line_honours_continuations() {
        let mut parser = Parser::new(Options::default());
        parser.lexer.reset(" A \\\r\n  B\nnext");
        parser.skip_line(true);
        assert_eq!(parser.lexer.get_identifier().unwrap().text, "next");
    }
}
