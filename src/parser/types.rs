//! Type expression parsing
//!
//! Grammar, in order:
//! - leading `inline const volatile mutable static`, each at most once
//! - declarator: optional `class`/`struct`/`typename`, optional leading `::`,
//!   identifiers joined by `::`
//! - optional postfix `const` and template argument list
//! - any number of `*`, `&`, `&&`, each optionally `const`
//! - optional function suffix: `(params)` or `(*name)(params)`
//!
//! `const` binds to the innermost named node and to each pointer or
//! reference layer it follows. `volatile`, `mutable` and `static` always
//! describe the outermost node.

use super::ast::{FunctionParam, TypeKind, TypeNode};
use super::lexer::{LexMode, Lexer, TokenKind};
use crate::error::ParseError;

/// Words that combine with following builtin words into one type name.
const INTEGRAL_MODIFIERS: [&str; 4] = ["unsigned", "signed", "short", "long"];
const BUILTIN_WORDS: [&str; 7] =
    ["unsigned", "signed", "short", "long", "int", "char", "double"];

/// Parse a complete type expression from `source`.
pub fn parse_type_expression(source: &str) -> Result<TypeNode, ParseError> {
    let mut lexer = Lexer::new(source);
    parse_type_node(&mut lexer)
}

pub fn parse_type_node(lexer: &mut Lexer) -> Result<TypeNode, ParseError> {
    let mut is_const = false;
    let mut is_inline = false;
    let mut is_volatile = false;
    let mut is_mutable = false;
    let mut is_static = false;
    loop {
        let flag = if !is_const && lexer.match_identifier("const") {
            &mut is_const
        } else if !is_inline && lexer.match_identifier("inline") {
            &mut is_inline
        } else if !is_volatile && lexer.match_identifier("volatile") {
            &mut is_volatile
        } else if !is_mutable && lexer.match_identifier("mutable") {
            &mut is_mutable
        } else if !is_static && lexer.match_identifier("static") {
            &mut is_static
        } else {
            break;
        };
        *flag = true;
    }

    let name = parse_declarator(lexer)?;
    is_const |= lexer.match_identifier("const");

    let mut node = if lexer.match_symbol("<") {
        let arguments = parse_template_arguments(lexer)?;
        TypeNode::new(TypeKind::Template { name, arguments })
    } else {
        TypeNode::literal(name)
    };
    node.qualifiers.is_const = is_const;

    while let Some(token) = lexer.get_token(LexMode::DEFAULT) {
        let wrap: fn(Box<TypeNode>) -> TypeKind = match token.text.as_str() {
            "*" if token.kind == TokenKind::Symbol => TypeKind::Pointer,
            "&" if token.kind == TokenKind::Symbol => TypeKind::Reference,
            "&&" if token.kind == TokenKind::Symbol => TypeKind::RvalueReference,
            _ => {
                lexer.unget_token(&token);
                break;
            }
        };
        node = TypeNode::new(wrap(Box::new(node)));
        node.qualifiers.is_const = lexer.match_identifier("const");
    }

    if lexer.match_symbol("(") {
        node = parse_function_suffix(lexer, node)?;
    }

    node.qualifiers.is_volatile = is_volatile;
    node.qualifiers.is_mutable = is_mutable;
    node.qualifiers.is_static = is_static;
    Ok(node)
}

/// A possibly qualified type name such as `::std::vector` or
/// `unsigned long long`.
pub fn parse_declarator(lexer: &mut Lexer) -> Result<String, ParseError> {
    let _ = lexer.match_identifier("class")
        || lexer.match_identifier("struct")
        || lexer.match_identifier("typename");

    let mut declarator = String::new();
    if lexer.match_symbol("::") {
        declarator.push_str("::");
    }
    loop {
        let token = lexer
            .get_identifier()
            .ok_or_else(|| ParseError::syntax("Expected identifier", lexer.line()))?;
        declarator.push_str(&token.text);
        if INTEGRAL_MODIFIERS.contains(&token.text.as_str()) {
            absorb_builtin_words(lexer, &mut declarator);
        }
        if !lexer.match_symbol("::") {
            break;
        }
        declarator.push_str("::");
    }
    Ok(declarator)
}

fn absorb_builtin_words(lexer: &mut Lexer, declarator: &mut String) {
    while let Some(token) = lexer.get_identifier() {
        if !BUILTIN_WORDS.contains(&token.text.as_str()) {
            lexer.unget_token(&token);
            break;
        }
        declarator.push(' ');
        declarator.push_str(&token.text);
    }
}

/// Arguments after `<`, up to and including the closing `>`.
fn parse_template_arguments(
    lexer: &mut Lexer,
) -> Result<Vec<TypeNode>, ParseError> {
    let mut arguments = Vec::new();
    if lexer.match_symbol(">") {
        return Ok(arguments);
    }
    loop {
        arguments.push(parse_template_argument(lexer)?);
        if !lexer.match_symbol(",") {
            break;
        }
    }
    lexer.require_symbol(">")?;
    Ok(arguments)
}

/// A type, or a constant for non-type parameters such as `std::array<T, 4>`.
fn parse_template_argument(lexer: &mut Lexer) -> Result<TypeNode, ParseError> {
    if let Some(token) = lexer.get_token(LexMode::DEFAULT) {
        if token.constant().is_some() {
            return Ok(TypeNode::literal(token.text));
        }
        lexer.unget_token(&token);
    }
    parse_type_node(lexer)
}

/// Everything after the `(` that follows a return type.
fn parse_function_suffix(
    lexer: &mut Lexer,
    returns: TypeNode,
) -> Result<TypeNode, ParseError> {
    if lexer.match_symbol("*") {
        let _ = lexer.get_identifier();
        lexer.require_symbol(")")?;
        lexer.require_symbol("(")?;
    }

    let mut parameters = Vec::new();
    if !lexer.match_symbol(")") {
        loop {
            let ty = parse_type_node(lexer)?;
            let name = lexer.get_identifier().map(|token| token.text);
            parameters.push(FunctionParam { name, ty });
            if !lexer.match_symbol(",") {
                break;
            }
        }
        lexer.require_symbol(")")?;
    }

    Ok(TypeNode::new(TypeKind::Function {
        returns: Box::new(returns),
        parameters,
    }))
}
