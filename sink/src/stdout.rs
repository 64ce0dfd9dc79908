use crate::{
    MetricsSink,
    Point,
    SinkError,
};
use std::io::{
    self,
    Stdout,
    Write,
};

/// Prints every point as a line-protocol line, for trying things out without a database.
#[derive(Debug)]
pub struct StdoutSink<W: Write = Stdout> {
    out: W,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> StdoutSink<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> MetricsSink for StdoutSink<W> {
    fn write(&mut self, points: &[Point]) -> Result<(), SinkError> {
        for point in points {
            writeln!(self.out, "{point}")?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdout"
    }
}
