//! Turns scraped channel records into InfluxDB line protocol and ships them somewhere.

#[macro_use]
extern crate tracing;

mod influx;
mod point;
mod stdout;

pub use influx::InfluxSink;
pub use point::{
    points,
    FieldValue,
    Point,
    DOWNSTREAM_MEASUREMENT,
    UPSTREAM_MEASUREMENT,
};
pub use stdout::StdoutSink;

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("request to the time-series database failed")]
    Network(#[from] reqwest::Error),
    #[error("time-series database answered with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to print points")]
    Io(#[from] std::io::Error),
    #[error("invalid write url")]
    Url(#[from] url::ParseError),
}

/// Destination for the points of a scrape cycle.
pub trait MetricsSink {
    fn write(&mut self, points: &[Point]) -> Result<(), SinkError>;

    /// Get the name of this sink
    fn name(&self) -> &'static str;
}
