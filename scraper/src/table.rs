use crate::{
    error::{
        RowParseError,
        ScrapeError,
    },
    records::{
        ChannelRecordDown,
        ChannelRecordUp,
        Direction,
        LockStatus,
    },
    tag,
};
use scraper::{
    ElementRef,
    Html,
    Selector,
};
use std::str::FromStr;
use upc_monitor_config::RowFailurePolicy;

lazy_static::lazy_static! {
    static ref TBODY: Selector = Selector::parse("tbody").expect("valid selector");
    static ref TR: Selector = Selector::parse("tr").expect("valid selector");
    static ref TD: Selector = Selector::parse("td").expect("valid selector");
    static ref SCRIPT: Selector = Selector::parse("script").expect("valid selector");
}

/// Records parsed from one status page, in table order, plus the rows that were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Scrape<R> {
    pub records: Vec<R>,
    pub row_errors: Vec<RowParseError>,
}

impl<R> Default for Scrape<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            row_errors: Vec::new(),
        }
    }
}

impl<R> Scrape<R> {
    pub fn skipped(&self) -> usize {
        self.row_errors.len()
    }
}

pub fn parse_downstream(html: &str, policy: RowFailurePolicy) -> Result<Scrape<ChannelRecordDown>, ScrapeError> {
    parse_table(html, policy)
}

pub fn parse_upstream(html: &str, policy: RowFailurePolicy) -> Result<Scrape<ChannelRecordUp>, ScrapeError> {
    parse_table(html, policy)
}

fn parse_table<R: ChannelRow>(html: &str, policy: RowFailurePolicy) -> Result<Scrape<R>, ScrapeError> {
    let document = Html::parse_document(html);
    let tbody = document
        .select(&TBODY)
        .next()
        .ok_or_else(|| ScrapeError::structure(format!("no table body in the {} page", R::DIRECTION)))?;

    let mut scrape = Scrape::default();
    let rows = tbody
        .select(&TR)
        .map(|tr| tr.select(&TD).collect::<Vec<_>>())
        // header rows only carry `th` cells
        .filter(|cells| !cells.is_empty());

    for (index, cells) in rows.enumerate() {
        let row = Row { index, cells };
        match R::from_row(&row) {
            Ok(record) => scrape.records.push(record),
            Err(CellError::Structure(detail)) => return Err(ScrapeError::structure(detail)),
            Err(CellError::Parse(err)) => match policy {
                RowFailurePolicy::Skip => {
                    debug!(direction = %R::DIRECTION, row = err.row, column = err.column, "skipping row");
                    scrape.row_errors.push(err);
                }
                RowFailurePolicy::Abort => return Err(err.into()),
            },
        }
    }

    debug!(
        direction = %R::DIRECTION,
        records = scrape.records.len(),
        skipped = scrape.skipped(),
        "parsed channel table"
    );
    Ok(scrape)
}

enum CellError {
    /// The page does not have the expected shape, the whole page is unusable.
    Structure(String),
    /// The cell is there but its content is not what the column promises.
    Parse(RowParseError),
}

#[derive(Debug, Clone, Copy)]
struct Column {
    index: usize,
    name: &'static str,
    /// The only unit the cell may carry after its number.
    unit: Option<&'static str>,
}

const fn column(index: usize, name: &'static str) -> Column {
    Column { index, name, unit: None }
}

const fn measured(index: usize, name: &'static str, unit: &'static str) -> Column {
    Column {
        index,
        name,
        unit: Some(unit),
    }
}

trait ChannelRow: Sized {
    const DIRECTION: Direction;

    fn from_row(row: &Row<'_>) -> Result<Self, CellError>;
}

mod downstream {
    use super::*;

    pub(super) const RECEIVER_ID: Column = column(0, "receiver_id");
    pub(super) const CHANNEL_ID: Column = column(1, "channel_id");
    pub(super) const LOCK_STATUS: Column = column(2, "lock_status");
    pub(super) const FREQUENCY: Column = measured(3, "frequency", "Hz");
    pub(super) const MODULATION: Column = column(4, "modulation");
    pub(super) const SYMBOL_RATE: Column = measured(5, "symbol_rate", "Ksym/s");
    pub(super) const SNR: Column = measured(6, "snr", "dB");
    pub(super) const POWER: Column = measured(7, "power", "dBmV");
}

mod upstream {
    use super::*;

    pub(super) const TRANSMITTER_ID: Column = column(0, "transmitter_id");
    pub(super) const CHANNEL_ID: Column = column(1, "channel_id");
    pub(super) const LOCK_STATUS: Column = column(2, "lock_status");
    pub(super) const FREQUENCY: Column = measured(3, "frequency", "Hz");
    pub(super) const MODULATION: Column = column(4, "modulation");
    pub(super) const SYMBOL_RATE: Column = measured(5, "symbol_rate", "Ksym/s");
    pub(super) const CHANNEL_TYPE: Column = column(6, "channel_type");
    pub(super) const POWER: Column = measured(7, "power", "dBmV");
}

impl ChannelRow for ChannelRecordDown {
    const DIRECTION: Direction = Direction::Downstream;

    fn from_row(row: &Row<'_>) -> Result<Self, CellError> {
        use downstream::*;
        Ok(Self {
            receiver_id: row.number(RECEIVER_ID)?,
            channel_id: row.number(CHANNEL_ID)?,
            lock_status: row.lock_status(LOCK_STATUS)?,
            frequency: row.number(FREQUENCY)?,
            modulation: row.tag(MODULATION)?,
            symbol_rate: row.parse_value(SYMBOL_RATE, &row.tag(SYMBOL_RATE)?)?,
            snr: row.number(SNR)?,
            power: row.number(POWER)?,
        })
    }
}

impl ChannelRow for ChannelRecordUp {
    const DIRECTION: Direction = Direction::Upstream;

    fn from_row(row: &Row<'_>) -> Result<Self, CellError> {
        use upstream::*;
        Ok(Self {
            transmitter_id: row.number(TRANSMITTER_ID)?,
            channel_id: row.number(CHANNEL_ID)?,
            lock_status: row.lock_status(LOCK_STATUS)?,
            frequency: row.number(FREQUENCY)?,
            // some firmware prints these verbatim, some through i18n
            modulation: row.text_or_tag(MODULATION)?,
            symbol_rate: row.parse_value(SYMBOL_RATE, &row.text_or_tag(SYMBOL_RATE)?)?,
            channel_type: row.tag(CHANNEL_TYPE)?,
            power: row.number(POWER)?,
        })
    }
}

struct Row<'a> {
    index: usize,
    cells: Vec<ElementRef<'a>>,
}

impl<'a> Row<'a> {
    fn cell(&self, column: Column) -> Result<ElementRef<'a>, CellError> {
        self.cells.get(column.index).copied().ok_or_else(|| {
            CellError::Structure(format!(
                "row {} has {} cells, {} is expected in cell {}",
                self.index,
                self.cells.len(),
                column.name,
                column.index
            ))
        })
    }

    fn text(&self, column: Column) -> Result<String, CellError> {
        Ok(self.cell(column)?.text().collect::<String>().trim().to_string())
    }

    fn script(&self, column: Column) -> Result<Option<String>, CellError> {
        Ok(self
            .cell(column)?
            .select(&SCRIPT)
            .next()
            .map(|script| script.text().collect::<String>()))
    }

    /// Decodes the i18n placeholder the cell is rendered from.
    fn tag(&self, column: Column) -> Result<String, CellError> {
        let script = self.script(column)?.ok_or_else(|| {
            CellError::Structure(format!("row {}: {} cell has no script", self.index, column.name))
        })?;
        self.decode(column, &script)
    }

    fn text_or_tag(&self, column: Column) -> Result<String, CellError> {
        match self.script(column)? {
            Some(script) => self.decode(column, &script),
            None => self.text(column),
        }
    }

    fn decode(&self, column: Column, script: &str) -> Result<String, CellError> {
        tag::decode(script)
            .map(str::to_string)
            .map_err(|err| CellError::Structure(format!("row {}: {} cell: {err}", self.index, column.name)))
    }

    fn lock_status(&self, column: Column) -> Result<LockStatus, CellError> {
        let value = self.tag(column)?;
        LockStatus::from_str(&value).map_err(|_| self.parse_error(column, value))
    }

    fn number<T: FromStr>(&self, column: Column) -> Result<T, CellError> {
        let raw = self.text(column)?;
        self.parse_value(column, &raw)
    }

    fn parse_value<T: FromStr>(&self, column: Column, raw: &str) -> Result<T, CellError> {
        numeric_token(raw, column.unit)
            .and_then(|token| token.parse().ok())
            .ok_or_else(|| self.parse_error(column, raw.to_string()))
    }

    fn parse_error(&self, column: Column, raw: String) -> CellError {
        CellError::Parse(RowParseError {
            row: self.index,
            column: column.name,
            raw,
        })
    }
}

/// The number at the start of a cell. A trailing unit is dropped only when it is the column's own
/// unit, so `602 MHz` in a `Hz` column is rejected rather than read as 602.
fn numeric_token<'r>(raw: &'r str, expected_unit: Option<&str>) -> Option<&'r str> {
    let raw = raw.trim();
    let end = raw
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+')))
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(end);
    let unit = unit.trim();
    let unit_matches = unit.is_empty() || expected_unit.is_some_and(|expected| unit.eq_ignore_ascii_case(expected));
    (!number.is_empty() && unit_matches).then_some(number)
}
