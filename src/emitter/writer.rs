//! Streaming JSON writer
//!
//! Values are written in call order, never reordered or buffered into a tree.
//! Layout comes from [`DocumentFormatter`], a `serde_json` formatter that
//! pretty-prints with four spaces of indentation starting at a base depth.
//! Scalars go through `serde_json` so string escaping matches it exactly.

use serde::Serialize;
use serde_json::ser::Formatter;
use std::io::{self, Write};

use crate::parser::lexer::Constant;

const INDENT: &[u8] = b"    ";

/// Pretty layout starting at a base nesting depth.
///
/// A base depth of 1 produces text that can be spliced as an element of a
/// depth-0 array.
#[derive(Debug, Clone)]
pub struct DocumentFormatter {
    depth: usize,
    has_value: bool,
}

impl DocumentFormatter {
    pub fn with_depth(depth: usize) -> Self {
        Self {
            depth,
            has_value: false,
        }
    }

    fn indent<W: ?Sized + Write>(&self, writer: &mut W) -> io::Result<()> {
        for _ in 0..self.depth {
            writer.write_all(INDENT)?;
        }
        Ok(())
    }

    fn open<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        bracket: &[u8],
    ) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(bracket)
    }

    fn close<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        bracket: &[u8],
    ) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        if self.has_value {
            writer.write_all(b"\n")?;
            self.indent(writer)?;
        }
        writer.write_all(bracket)
    }

    fn element<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        writer.write_all(if first { b"\n" } else { b",\n" })?;
        self.indent(writer)
    }
}

impl Formatter for DocumentFormatter {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"[")
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"]")
    }

    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.element(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.open(writer, b"{")
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.close(writer, b"}")
    }

    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.element(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Array { first: bool },
    Object { first: bool },
}

/// Order-preserving streaming writer.
///
/// Callers are responsible for balancing `begin_*`/`end_*` calls and for
/// calling [`JsonWriter::key`] before every value inside an object.
#[derive(Debug)]
pub struct JsonWriter<W> {
    out: W,
    formatter: DocumentFormatter,
    frames: Vec<Frame>,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(out: W) -> Self {
        Self::with_depth(out, 0)
    }

    /// A writer whose output is indented as if nested `depth` levels deep.
    pub fn with_depth(out: W, depth: usize) -> Self {
        Self {
            out,
            formatter: DocumentFormatter::with_depth(depth),
            frames: Vec::new(),
        }
    }

    /// Number of open arrays and objects.
    pub fn open_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn before_value(&mut self) -> io::Result<()> {
        if let Some(Frame::Array { first }) = self.frames.last_mut() {
            self.formatter.begin_array_value(&mut self.out, *first)?;
            *first = false;
        }
        Ok(())
    }

    fn after_value(&mut self) -> io::Result<()> {
        match self.frames.last() {
            Some(Frame::Array { .. }) => self.formatter.end_array_value(&mut self.out),
            Some(Frame::Object { .. }) => self.formatter.end_object_value(&mut self.out),
            None => Ok(()),
        }
    }

    pub fn begin_object(&mut self) -> io::Result<()> {
        self.before_value()?;
        self.formatter.begin_object(&mut self.out)?;
        self.frames.push(Frame::Object { first: true });
        Ok(())
    }

    pub fn end_object(&mut self) -> io::Result<()> {
        debug_assert!(matches!(self.frames.last(), Some(Frame::Object { .. })));
        self.frames.pop();
        self.formatter.end_object(&mut self.out)?;
        self.after_value()
    }

    pub fn begin_array(&mut self) -> io::Result<()> {
        self.before_value()?;
        self.formatter.begin_array(&mut self.out)?;
        self.frames.push(Frame::Array { first: true });
        Ok(())
    }

    pub fn end_array(&mut self) -> io::Result<()> {
        debug_assert!(matches!(self.frames.last(), Some(Frame::Array { .. })));
        self.frames.pop();
        self.formatter.end_array(&mut self.out)?;
        self.after_value()
    }

    /// Start a member of the innermost object.
    pub fn key(&mut self, key: &str) -> io::Result<()> {
        let Some(Frame::Object { first }) = self.frames.last_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("key `{key}` written outside of an object"),
            ));
        };
        self.formatter.begin_object_key(&mut self.out, *first)?;
        *first = false;
        serde_json::to_writer(&mut self.out, key)?;
        self.formatter.end_object_key(&mut self.out)?;
        self.formatter.begin_object_value(&mut self.out)
    }

    /// Write any serializable scalar, escaped the way `serde_json` does.
    pub fn scalar<T: Serialize + ?Sized>(&mut self, value: &T) -> io::Result<()> {
        self.before_value()?;
        serde_json::to_writer(&mut self.out, value)?;
        self.after_value()
    }

    pub fn null(&mut self) -> io::Result<()> {
        self.scalar(&())
    }

    pub fn constant(&mut self, value: &Constant) -> io::Result<()> {
        match value {
            Constant::String(s) => self.scalar(s.as_str()),
            Constant::Bool(b) => self.scalar(b),
            Constant::UInt32(v) => self.scalar(v),
            Constant::Int32(v) => self.scalar(v),
            Constant::UInt64(v) => self.scalar(v),
            Constant::Int64(v) => self.scalar(v),
            Constant::Real(v) => self.scalar(v),
        }
    }

    /// Splice pre-rendered JSON as the next value.
    ///
    /// The text must already be laid out for the current depth.
    pub fn raw_value(&mut self, json: &[u8]) -> io::Result<()> {
        self.before_value()?;
        self.out.write_all(json)?;
        self.after_value()
    }

    pub fn field<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> io::Result<()> {
        self.key(key)?;
        self.scalar(value)
    }

    /// Write `key: true` only when `flag` is set.
    pub fn flag(&mut self, key: &str, flag: bool) -> io::Result<()> {
        if flag {
            self.field(key, &true)?;
        }
        Ok(())
    }
}
