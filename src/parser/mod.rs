//! Annotated header parser
//!
//! This module turns header text into the per-file JSON description:
//! - [`lexer`]: Tokenization (source text → tokens, comments on the side)
//! - [`comments`]: Comment blocks and the slots declarations read them from
//! - [`types`]: Type expressions (tokens → [`ast::TypeNode`])
//! - [`parse`]: [`Parser`] and [`Session`], statement dispatch
//! - [`scope`]: Enclosing namespaces and classes
//!
//! # Recognized constructs
//!
//! Only declarations introduced by a configured annotation keyword are
//! described, plus `#include` directives and plain namespaces. Everything
//! else is skipped up to the next `;` or the end of the next braced block.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser pulling one token at a time.
//! No external parser generator dependencies.

pub mod ast;
pub mod comments;
mod declarations;
pub mod lexer;
pub mod parse;
pub mod scope;
pub mod types;

pub use parse::{Parser, Session};
