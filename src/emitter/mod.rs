//! Document emitter
//!
//! The output is a single JSON array with one `{file, content}` object per
//! successfully parsed file:
//! - [`writer`]: streaming, order-preserving pretty JSON writer
//! - [`types`]: renders [`TypeNode`](crate::parser::ast::TypeNode) trees
//!
//! Each file is rendered into its own buffer and only spliced into the
//! [`Document`] once it parsed completely, so a failing file leaves no
//! trace in the output.

pub mod types;
pub mod writer;

pub use types::write_type_node;
pub use writer::JsonWriter;

use std::io::{self, Write};

/// A writer for one file object, laid out to nest inside a [`Document`].
pub fn file_writer() -> JsonWriter<Vec<u8>> {
    JsonWriter::with_depth(Vec::new(), 1)
}

/// The top-level array of per-file objects.
#[derive(Debug)]
pub struct Document<W> {
    writer: JsonWriter<W>,
    files: usize,
}

impl<W: Write> Document<W> {
    /// Open the top-level array on `sink`.
    pub fn begin(sink: W) -> io::Result<Self> {
        let mut writer = JsonWriter::new(sink);
        writer.begin_array()?;
        Ok(Self { writer, files: 0 })
    }

    /// Append a file object rendered by a [`file_writer`].
    pub fn append(&mut self, file: &[u8]) -> io::Result<()> {
        self.writer.raw_value(file)?;
        self.files += 1;
        Ok(())
    }

    /// Number of files appended so far.
    pub fn files(&self) -> usize {
        self.files
    }

    /// Close the array and hand back the sink.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.end_array()?;
        let mut sink = self.writer.into_inner();
        sink.flush()?;
        Ok(sink)
    }
}
