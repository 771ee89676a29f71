//! # Introduction
//!
//! `header_parser` scans C++ headers for declarations marked with annotation
//! macros and describes them as JSON for a binding generator.
//!
//! ```text
//! LUA_CLASS(name = "Player")
//! class Player : public Entity
//! {
//! public:
//!     LUA_FUNCTION()
//!     void Move(float dx, float dy = 0.0f);
//! };
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Header text → Lexer → Declaration parser → JSON document
//! ```
//!
//! 1. [`parser`]: pulls tokens, recognizes annotated enums, classes,
//!    functions, constructors, properties, namespaces and marker macros.
//! 2. [`emitter`]: writes the description as order-preserving pretty JSON
//!    while parsing, one `{file, content}` object per header.
//! 3. [`config`]: which identifiers count as annotation keywords.
//!
//! ## Usage
//!
//! ```
//! use header_parser::{Options, Parser};
//!
//! let options = Options::new().function_keyword("LUA_FUNCTION");
//! let mut parser = Parser::new(options);
//! let mut session = parser.open(Vec::new())?;
//! session.parse("LUA_FUNCTION() int Answer();", "answer.h")?;
//! let json = String::from_utf8(session.close()?).unwrap();
//! assert!(json.contains("\"name\": \"Answer\""));
//! # Ok::<(), header_parser::Error>(())
//! ```
//!
//! Unannotated code is tolerated and skipped; it is never described.

pub mod config;
pub mod emitter;
pub mod error;
pub mod parser;

pub use config::Options;
pub use error::{Error, ParseError, ScopeError};
pub use parser::{Parser, Session};
