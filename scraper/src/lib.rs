//! Scrapes the channel diagnostics of a UPC Connect Box style cable modem.
//!
//! The modem hides its status pages behind a form login and renders most table cells through
//! `i18n("...")` placeholder scripts; [`Fetcher`] deals with the former and the [`table`] parsers
//! with the latter.

#[macro_use]
extern crate tracing;

mod endpoints;
mod error;
mod fetcher;
mod records;
mod session;
pub mod table;
pub mod tag;
mod transport;

pub use endpoints::Endpoints;
pub use error::{
    BoxError,
    RowParseError,
    ScrapeError,
    Stage,
    TransportError,
};
pub use fetcher::{
    Fetcher,
    ScrapeReport,
};
pub use records::{
    ChannelRecordDown,
    ChannelRecordUp,
    Direction,
    LockStatus,
};
pub use session::{
    extract_csrf_token,
    is_login_wall,
    Credentials,
    Probe,
    SessionGate,
    MAX_LOGIN_ATTEMPTS,
};
pub use table::Scrape;
pub use transport::{
    HttpTransport,
    Page,
    Transport,
};
pub use upc_monitor_config::RowFailurePolicy;
