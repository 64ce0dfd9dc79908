use std::fmt;
use upc_monitor_scraper::{
    ChannelRecordDown,
    ChannelRecordUp,
    ScrapeReport,
};

pub const UPSTREAM_MEASUREMENT: &str = "channelDataUp";
pub const DOWNSTREAM_MEASUREMENT: &str = "channelDataDown";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}i"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

/// One line of InfluxDB line protocol. Points carry no timestamp, the server stamps them on arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub measurement: String,
    pub tags: Vec<(String, String)>,
    pub fields: Vec<(String, FieldValue)>,
}

impl Point {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.tags.push((key.into(), value.to_string()));
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: FieldValue) -> Self {
        self.fields.push((key.into(), value));
        self
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&escape(&self.measurement, &[',', ' ']))?;
        // influx rejects empty tag values
        for (key, value) in self.tags.iter().filter(|(_, value)| !value.is_empty()) {
            write!(f, ",{}={}", escape_key(key), escape_key(value))?;
        }
        for (index, (key, value)) in self.fields.iter().enumerate() {
            let separator = if index == 0 { ' ' } else { ',' };
            write!(f, "{separator}{}={value}", escape_key(key))?;
        }
        Ok(())
    }
}

fn escape_key(raw: &str) -> String {
    escape(raw, &[',', '=', ' '])
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn integer(value: u64) -> FieldValue {
    FieldValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

impl From<&ChannelRecordUp> for Point {
    fn from(record: &ChannelRecordUp) -> Self {
        Point::new(UPSTREAM_MEASUREMENT)
            .tag("transmitter_id", record.transmitter_id)
            .tag("channel_id", record.channel_id)
            .tag("lock_status", record.lock_status)
            .tag("frequency", record.frequency)
            .tag("modulation", &record.modulation)
            .tag("channel_type", &record.channel_type)
            .field("symbol_rate", integer(record.symbol_rate))
            .field("power", FieldValue::Float(record.power))
    }
}

impl From<&ChannelRecordDown> for Point {
    fn from(record: &ChannelRecordDown) -> Self {
        Point::new(DOWNSTREAM_MEASUREMENT)
            .tag("receiver_id", record.receiver_id)
            .tag("channel_id", record.channel_id)
            .tag("lock_status", record.lock_status)
            .tag("frequency", record.frequency)
            .tag("modulation", &record.modulation)
            .field("symbol_rate", integer(record.symbol_rate))
            .field("snr", FieldValue::Float(record.snr))
            .field("power", FieldValue::Float(record.power))
    }
}

/// All points of one cycle, upstream channels first.
pub fn points(report: &ScrapeReport) -> Vec<Point> {
    report
        .upstream
        .records
        .iter()
        .map(Point::from)
        .chain(report.downstream.records.iter().map(Point::from))
        .collect()
}
