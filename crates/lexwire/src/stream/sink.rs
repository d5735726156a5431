//! Destinations for flushed command batches.

use std::io::{self, Write};

/// Receives one serialised command batch per flush.
pub trait Sink {
    /// Writes a complete batch.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the batch cannot be delivered.
    fn write_batch(&mut self, batch: &str) -> io::Result<()>;
}

impl Sink for Vec<String> {
    fn write_batch(&mut self, batch: &str) -> io::Result<()> {
        self.push(batch.to_owned());
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn write_batch(&mut self, batch: &str) -> io::Result<()> {
        (**self).write_batch(batch)
    }
}

/// Writes each batch as one newline-terminated line.
#[derive(Debug)]
pub struct IoSink<W> {
    writer: W,
}

impl<W: Write> IoSink<W> {
    /// Wraps a writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for IoSink<W> {
    fn write_batch(&mut self, batch: &str) -> io::Result<()> {
        self.writer.write_all(batch.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_sink_writes_one_line_per_batch() {
        let mut sink = IoSink::new(Vec::new());
        sink.write_batch(r#"[["l",{}]]"#).expect("write");
        sink.write_batch(r#"[["l",{}],["e","boom"]]"#).expect("write");
        let written = String::from_utf8(sink.into_inner()).expect("utf8");
        assert_eq!(written, "[[\"l\",{}]]\n[[\"l\",{}],[\"e\",\"boom\"]]\n");
    }

    #[test]
    fn borrowed_sinks_forward_batches() {
        fn deliver(mut sink: impl Sink) {
            sink.write_batch("[]").expect("write");
        }

        let mut batches: Vec<String> = Vec::new();
        deliver(&mut batches);
        assert_eq!(batches, vec!["[]".to_owned()]);
    }
}
