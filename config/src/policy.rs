use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
};

/// What the table parser does with a row whose cells fail type conversion.
#[derive(Debug, Default, Clone, Copy, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RowFailurePolicy {
    /// Skip the row, keep parsing and report the row error next to the records.
    #[default]
    Skip,
    /// Give up on the whole page at the first bad row.
    Abort,
}

/// Where scraped points end up.
#[derive(Debug, Default, Clone, Copy, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SinkKind {
    #[default]
    Influx,
    Stdout,
}
