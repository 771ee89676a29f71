//! Declaration parsing
//!
//! Every annotated construct is written field by field into the current
//! file's output as soon as it is recognized:
//! - enums, classes and annotated namespaces (current comment slot)
//! - functions, constructors and properties (last comment slot)
//! - free-standing marker macros
//!
//! Each construct starts with its annotation keyword followed by an optional
//! meta block, e.g. `PROPERTY(readonly, group = "Stats")`.

use super::comments::CommentSlot;
use super::lexer::{LexMode, Token, TokenKind};
use super::parse::Parser;
use super::scope::{Access, ScopeKind};
use super::types::{parse_declarator, parse_type_node};
use crate::emitter::write_type_node;
use crate::error::ParseError;

/// Leading specifiers accepted on functions and constructors, in output
/// order.
const SPECIFIERS: [&str; 5] = ["virtual", "inline", "constexpr", "static", "explicit"];

/// Trailing qualifiers accepted after a parameter list, in output order.
const TRAILING_QUALIFIERS: [&str; 3] = ["noexcept", "override", "final"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Callable {
    Function,
    Constructor,
}

impl Parser {
    pub(crate) fn parse_enum(&mut self, keyword: &Token) -> Result<(), ParseError> {
        self.out.begin_object()?;
        self.out.field("type", "enum")?;
        self.out.field("line", &keyword.line)?;
        self.write_access()?;
        self.write_comment(CommentSlot::Current)?;
        self.parse_macro_meta()?;

        self.lexer.require_identifier("enum")?;
        let scoped = self.lexer.match_identifier("class")
            || self.lexer.match_identifier("struct");
        let name = self.expect_identifier("Missing enum name")?;
        self.out.field("name", name.text.as_str())?;
        self.out.flag("cxxclass", scoped)?;
        if scoped && self.lexer.match_symbol(":") {
            let base = parse_declarator(&mut self.lexer)?;
            self.out.field("base", base.as_str())?;
        }

        self.lexer.require_symbol("{")?;
        self.out.key("members")?;
        self.out.begin_array()?;
        while let Some(member) = self.lexer.get_identifier() {
            self.out.begin_object()?;
            self.out.field("key", member.text.as_str())?;
            if self.lexer.match_symbol("=") {
                let value = self.collect_raw_text(None);
                self.out.field("value", value.as_str())?;
            }
            self.out.end_object()?;
            if !self.lexer.match_symbol(",") {
                break;
            }
        }
        self.out.end_array()?;
        self.lexer.require_symbol("}")?;
        self.lexer.require_symbol(";")?;
        self.out.end_object()?;
        Ok(())
    }

    pub(crate) fn parse_class(&mut self, keyword: &Token) -> Result<(), ParseError> {
        self.out.begin_object()?;
        self.out.field("type", "class")?;
        self.out.field("line", &keyword.line)?;
        self.write_access()?;
        self.write_comment(CommentSlot::Current)?;
        self.parse_macro_meta()?;

        let default_access = if self.lexer.match_identifier("class") {
            Access::Private
        } else if self.lexer.match_identifier("struct") {
            Access::Public
        } else {
            return Err(self.error("Expected `class`"));
        };
        let name = self.expect_identifier("Missing class name")?;
        self.out.field("name", name.text.as_str())?;
        self.lexer.match_identifier("final");

        if self.lexer.match_symbol(":") {
            self.out.key("parents")?;
            self.out.begin_array()?;
            loop {
                self.parse_base_specifier(default_access)?;
                if !self.lexer.match_symbol(",") {
                    break;
                }
            }
            self.out.end_array()?;
        }

        self.lexer.require_symbol("{")?;
        self.out.key("members")?;
        self.out.begin_array()?;
        self.scopes
            .push(ScopeKind::Class, name.text.as_str(), default_access)?;
        self.parse_scope_body("class")?;
        self.scopes.pop()?;
        self.out.end_array()?;
        self.lexer.require_symbol(";")?;
        self.out.end_object()?;
        Ok(())
    }

    /// `[virtual] [access] [virtual] type`
    fn parse_base_specifier(&mut self, default_access: Access) -> Result<(), ParseError> {
        let mut is_virtual = self.lexer.match_identifier("virtual");
        let token = self
            .lexer
            .get_token(LexMode::DEFAULT)
            .ok_or_else(|| self.error("Missing class or access control specifier"))?;
        let access = Access::from_token(&token).unwrap_or_else(|| {
            self.lexer.unget_token(&token);
            default_access
        });
        is_virtual |= self.lexer.match_identifier("virtual");

        self.out.begin_object()?;
        self.out.field("access", access.as_str())?;
        self.out.flag("virtual", is_virtual)?;
        self.out.key("name")?;
        self.parse_type()?;
        self.out.end_object()?;
        Ok(())
    }

    pub(crate) fn parse_function(&mut self, keyword: &Token) -> Result<(), ParseError> {
        self.out.begin_object()?;
        self.out.field("type", "function")?;
        self.out.field("macro", keyword.text.as_str())?;
        self.out.field("line", &keyword.line)?;
        self.write_comment(CommentSlot::Last)?;
        self.parse_macro_meta()?;
        self.write_access()?;
        self.parse_specifiers()?;

        self.out.key("returnType")?;
        self.parse_type()?;
        let name = self.parse_function_name()?;
        self.out.field("name", name.as_str())?;
        self.parse_parameters()?;
        self.parse_function_suffix(Callable::Function)?;
        self.out.end_object()?;

        self.skip_remainder();
        Ok(())
    }

    pub(crate) fn parse_constructor(&mut self, keyword: &Token) -> Result<(), ParseError> {
        let Some(class) = self.scopes.enclosing_class().map(str::to_string) else {
            return Err(self.error(format!(
                "Constructor annotation `{}` outside of a class",
                keyword.text
            )));
        };

        self.out.begin_object()?;
        self.out.field("type", "constructor")?;
        self.out.field("macro", keyword.text.as_str())?;
        self.out.field("line", &keyword.line)?;
        self.write_comment(CommentSlot::Last)?;
        self.parse_macro_meta()?;
        self.write_access()?;
        self.parse_specifiers()?;

        let name = self.expect_identifier("Expected constructor name")?;
        if name.text != class {
            return Err(self.error(format!(
                "Constructor name `{}` does not match class `{}`",
                name.text, class
            )));
        }
        self.out.field("name", name.text.as_str())?;
        self.parse_parameters()?;
        self.parse_function_suffix(Callable::Constructor)?;
        self.out.end_object()?;

        self.skip_remainder();
        Ok(())
    }

    fn parse_specifiers(&mut self) -> Result<(), ParseError> {
        let mut seen = [false; SPECIFIERS.len()];
        'specifiers: loop {
            for (i, specifier) in SPECIFIERS.iter().enumerate() {
                if !seen[i] && self.lexer.match_identifier(specifier) {
                    seen[i] = true;
                    continue 'specifiers;
                }
            }
            break;
        }
        for (specifier, present) in SPECIFIERS.iter().zip(seen) {
            self.out.flag(specifier, present)?;
        }
        Ok(())
    }

    /// A plain identifier, or `operator` followed by its symbol.
    fn parse_function_name(&mut self) -> Result<String, ParseError> {
        let token = self.expect_identifier("Expected method name")?;
        if token.text != "operator" {
            return Ok(token.text);
        }

        let mut name = token.text;
        if self.lexer.match_symbol("(") {
            self.lexer.require_symbol(")")?;
            name.push_str("()");
            return Ok(name);
        }
        while let Some(part) = self.lexer.get_token(LexMode::DEFAULT) {
            if part.is_symbol("(") {
                self.lexer.unget_token(&part);
                break;
            }
            if part.kind == TokenKind::Identifier {
                name.push(' ');
            }
            name.push_str(&part.text);
        }
        Ok(name)
    }

    /// `( [type [name] [= default] {, ...}] )`, written as `arguments`.
    fn parse_parameters(&mut self) -> Result<(), ParseError> {
        self.lexer.require_symbol("(")?;
        self.out.key("arguments")?;
        self.out.begin_array()?;
        if !self.lexer.match_symbol(")") {
            loop {
                self.out.begin_object()?;
                self.out.key("type")?;
                self.parse_type()?;
                if let Some(name) = self.lexer.get_identifier() {
                    self.out.field("name", name.text.as_str())?;
                }
                if self.lexer.match_symbol("=") {
                    self.out.key("defaultValue")?;
                    self.parse_default_value()?;
                }
                self.out.end_object()?;
                if !self.lexer.match_symbol(",") {
                    break;
                }
            }
            self.lexer.require_symbol(")")?;
        }
        self.out.end_array()?;
        Ok(())
    }

    /// A lone constant is written typed; anything longer as raw text.
    fn parse_default_value(&mut self) -> Result<(), ParseError> {
        let first = self
            .lexer
            .get_token(LexMode::DEFAULT)
            .ok_or_else(|| self.error("Expected default value"))?;
        if first.is_symbol(",") || first.is_symbol(")") {
            return Err(self.error("Expected default value"));
        }

        if let Some(value) = first.constant() {
            let next = self.lexer.get_token(LexMode::DEFAULT);
            if let Some(next) = &next {
                self.lexer.unget_token(next);
            }
            let ends = next
                .as_ref()
                .map_or(true, |t| t.is_symbol(",") || t.is_symbol(")"));
            if ends {
                self.out.constant(value)?;
                return Ok(());
            }
        }

        let text = self.collect_raw_text(Some(first));
        self.out.scalar(text.as_str())?;
        Ok(())
    }

    /// Everything between the parameter list and the body or `;`.
    fn parse_function_suffix(&mut self, callable: Callable) -> Result<(), ParseError> {
        self.out.flag("const", self.lexer.match_identifier("const"))?;

        let mut seen = [false; TRAILING_QUALIFIERS.len()];
        'qualifiers: loop {
            for (i, qualifier) in TRAILING_QUALIFIERS.iter().enumerate() {
                if !seen[i] && self.lexer.match_identifier(qualifier) {
                    seen[i] = true;
                    if *qualifier == "noexcept" && self.lexer.match_symbol("(") {
                        self.skip_group()?;
                    }
                    continue 'qualifiers;
                }
            }
            break;
        }
        for (qualifier, present) in TRAILING_QUALIFIERS.iter().zip(seen) {
            self.out.flag(qualifier, present)?;
        }

        if !self.lexer.match_symbol("=") {
            return Ok(());
        }
        let token = self.lexer.get_token(LexMode::DEFAULT);
        match (callable, token.as_ref().map(|t| t.text.as_str())) {
            (Callable::Function, Some("0")) => self.out.flag("abstract", true)?,
            (_, Some("default")) => self.out.flag("default", true)?,
            (_, Some("delete")) => self.out.flag("delete", true)?,
            (Callable::Function, _) => {
                return Err(self.error("Expected `0`, `default` or `delete`"))
            }
            (Callable::Constructor, _) => {
                return Err(self.error("Expected `default` or `delete`"))
            }
        }
        Ok(())
    }

    pub(crate) fn parse_property(&mut self, keyword: &Token) -> Result<(), ParseError> {
        self.out.begin_object()?;
        self.out.field("type", "property")?;
        self.out.field("macro", keyword.text.as_str())?;
        self.out.field("line", &keyword.line)?;
        self.write_comment(CommentSlot::Last)?;
        self.parse_macro_meta()?;
        self.write_access()?;

        self.out.flag("mutable", self.lexer.match_identifier("mutable"))?;
        self.out.key("dataType")?;
        self.parse_type()?;
        let name = self.expect_identifier("Expected a property name")?;
        self.out.field("name", name.text.as_str())?;
        self.out.end_object()?;

        self.skip_to_semicolon();
        Ok(())
    }

    /// `namespace name { ... }` without annotation.
    pub(crate) fn parse_namespace(&mut self, keyword: &Token) -> Result<(), ParseError> {
        // Anonymous namespaces have internal linkage; nothing in them is exported.
        if let Some(next) = self.lexer.get_token(LexMode::DEFAULT) {
            self.lexer.unget_token(&next);
            if next.is_symbol("{") {
                self.skip_declaration(keyword.clone());
                return Ok(());
            }
        }

        let name = self.parse_namespace_name()?;
        if self.lexer.match_symbol("=") {
            self.skip_to_semicolon();
            return Ok(());
        }

        self.lexer.require_symbol("{")?;
        self.out.begin_object()?;
        self.out.field("type", "namespace")?;
        self.out.field("line", &keyword.line)?;
        self.out.field("name", name.as_str())?;
        self.parse_namespace_body(&name)?;
        self.out.end_object()?;
        Ok(())
    }

    pub(crate) fn parse_annotated_namespace(
        &mut self,
        keyword: &Token,
    ) -> Result<(), ParseError> {
        self.out.begin_object()?;
        self.out.field("type", "namespace")?;
        self.out.field("macro", keyword.text.as_str())?;
        self.out.field("line", &keyword.line)?;
        self.write_comment(CommentSlot::Current)?;
        self.parse_macro_meta()?;

        self.lexer.require_identifier("namespace")?;
        let name = self.parse_namespace_name()?;
        self.out.field("name", name.as_str())?;

        if self.lexer.match_symbol("=") {
            self.out.key("members")?;
            self.out.begin_array()?;
            self.out.end_array()?;
            self.out.end_object()?;
            self.skip_to_semicolon();
            return Ok(());
        }

        self.lexer.require_symbol("{")?;
        self.parse_namespace_body(&name)?;
        self.out.end_object()?;
        Ok(())
    }

    fn parse_namespace_name(&mut self) -> Result<String, ParseError> {
        parse_declarator(&mut self.lexer)
            .map_err(|_| self.error("Missing namespace name"))
    }

    /// Members after the opening `{`, written as `members`.
    fn parse_namespace_body(&mut self, name: &str) -> Result<(), ParseError> {
        self.out.key("members")?;
        self.out.begin_array()?;
        self.scopes.push(ScopeKind::Namespace, name, Access::Public)?;
        self.parse_scope_body("namespace")?;
        self.scopes.pop()?;
        self.out.end_array()?;
        Ok(())
    }

    /// `MACRO(meta)` on its own, recorded with its meta block.
    pub(crate) fn parse_custom_macro(&mut self, keyword: &Token) -> Result<(), ParseError> {
        self.out.begin_object()?;
        self.out.field("type", "macro")?;
        self.out.field("name", keyword.text.as_str())?;
        self.out.field("line", &keyword.line)?;
        self.write_access()?;
        self.parse_macro_meta()?;
        self.out.end_object()?;
        Ok(())
    }

    /// Statements up to and including the closing `}`.
    fn parse_scope_body(&mut self, what: &str) -> Result<(), ParseError> {
        while !self.lexer.match_symbol("}") {
            if !self.parse_statement()? {
                return Err(self.error(format!("Unexpected end of file in {what} body")));
            }
        }
        Ok(())
    }

    // ===== Meta blocks =====

    /// Write `meta`, empty when the keyword has no parenthesized block.
    fn parse_macro_meta(&mut self) -> Result<(), ParseError> {
        self.out.key("meta")?;
        if self.lexer.match_symbol("(") {
            self.parse_meta_sequence()?;
        } else {
            self.out.begin_object()?;
            self.out.end_object()?;
        }
        self.lexer.match_symbol(";");
        Ok(())
    }

    /// Entries after `(`, up to and including `)`.
    fn parse_meta_sequence(&mut self) -> Result<(), ParseError> {
        self.out.begin_object()?;
        if !self.lexer.match_symbol(")") {
            loop {
                let key = self.expect_identifier("Expected identifier in meta block")?;
                self.out.key(&key.text)?;
                if self.lexer.match_symbol("=") {
                    let value = self
                        .lexer
                        .get_token(LexMode::DEFAULT)
                        .ok_or_else(|| self.error("Expected value after `=`"))?;
                    self.write_token(&value)?;
                } else if self.lexer.match_symbol("(") {
                    self.parse_meta_sequence()?;
                } else {
                    self.out.null()?;
                }
                if !self.lexer.match_symbol(",") {
                    break;
                }
            }
            self.lexer.require_symbol(")")?;
        }
        self.out.end_object()?;
        Ok(())
    }

    // ===== Helper methods =====

    /// Parse a type expression and write it as the next value.
    pub(crate) fn parse_type(&mut self) -> Result<(), ParseError> {
        let node = parse_type_node(&mut self.lexer)?;
        write_type_node(&mut self.out, &node)?;
        Ok(())
    }

    fn write_token(&mut self, token: &Token) -> Result<(), ParseError> {
        match token.constant() {
            Some(value) => self.out.constant(value)?,
            None => self.out.scalar(token.text.as_str())?,
        }
        Ok(())
    }

    fn write_access(&mut self) -> Result<(), ParseError> {
        if let Some(access) = self.scopes.member_access() {
            self.out.field("access", access.as_str())?;
        }
        Ok(())
    }

    fn write_comment(&mut self, slot: CommentSlot) -> Result<(), ParseError> {
        let line = self.lexer.line();
        if let Some(text) = self.lexer.comments().attached(slot, line) {
            self.out.field("comment", text)?;
        }
        Ok(())
    }

    /// Concatenate raw token text up to a `,`, `)` or `}` outside brackets.
    /// The terminator is left unread.
    fn collect_raw_text(&mut self, first: Option<Token>) -> String {
        let mut text = String::new();
        let mut depth = 0usize;
        let mut token = first.or_else(|| self.lexer.get_token(LexMode::DEFAULT));
        while let Some(current) = token {
            if current.kind == TokenKind::Symbol {
                match current.text.as_str() {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" if depth > 0 => depth -= 1,
                    "," | ")" | "}" if depth == 0 => {
                        self.lexer.unget_token(&current);
                        break;
                    }
                    _ => {}
                }
            }
            text.push_str(&current.text);
            token = self.lexer.get_token(LexMode::DEFAULT);
        }
        text
    }

    /// Skip to the `;` that ends the current statement, ignoring any inside
    /// brackets or braces.
    fn skip_to_semicolon(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.lexer.get_token(LexMode::DEFAULT) {
            if token.kind != TokenKind::Symbol {
                continue;
            }
            match token.text.as_str() {
                "(" | "{" | "[" => depth += 1,
                ")" | "}" | "]" => depth = depth.saturating_sub(1),
                ";" if depth == 0 => break,
                _ => {}
            }
        }
    }

    /// Skip a parenthesized group whose `(` was consumed.
    fn skip_group(&mut self) -> Result<(), ParseError> {
        let mut depth = 1usize;
        while let Some(token) = self.lexer.get_token(LexMode::DEFAULT) {
            if token.is_symbol("(") {
                depth += 1;
            } else if token.is_symbol(")") {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(self.error("Unexpected end of file in `noexcept` group"))
    }
}
