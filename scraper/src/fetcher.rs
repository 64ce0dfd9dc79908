use crate::{
    endpoints::Endpoints,
    error::ScrapeError,
    records::{
        ChannelRecordDown,
        ChannelRecordUp,
        Direction,
    },
    session::{
        Credentials,
        SessionGate,
        MAX_LOGIN_ATTEMPTS,
    },
    table::{
        self,
        Scrape,
    },
    transport::{
        HttpTransport,
        Page,
        Transport,
    },
};
use upc_monitor_config::RowFailurePolicy;
use url::Url;

/// Both channel tables of one scrape cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapeReport {
    pub upstream: Scrape<ChannelRecordUp>,
    pub downstream: Scrape<ChannelRecordDown>,
}

impl ScrapeReport {
    pub fn skipped(&self) -> usize {
        self.upstream.skipped() + self.downstream.skipped()
    }
}

/// Fetches the status pages through the [`SessionGate`] and parses them.
#[derive(Debug)]
pub struct Fetcher<T: Transport = HttpTransport> {
    gate: SessionGate<T>,
    row_policy: RowFailurePolicy,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, endpoints: Endpoints, credentials: Credentials, row_policy: RowFailurePolicy) -> Self {
        Self {
            gate: SessionGate::new(transport, endpoints, credentials),
            row_policy,
        }
    }

    pub fn fetch_downstream(&self) -> Result<Scrape<ChannelRecordDown>, ScrapeError> {
        let url = self.gate.endpoints().status_page(Direction::Downstream);
        let page = self.fetch_page(url)?;
        table::parse_downstream(&page.body, self.row_policy).map_err(|err| err.at(url))
    }

    pub fn fetch_upstream(&self) -> Result<Scrape<ChannelRecordUp>, ScrapeError> {
        let url = self.gate.endpoints().status_page(Direction::Upstream);
        let page = self.fetch_page(url)?;
        table::parse_upstream(&page.body, self.row_policy).map_err(|err| err.at(url))
    }

    /// One full cycle, upstream first. Any error other than a skipped row ends the cycle.
    pub fn scrape(&self) -> Result<ScrapeReport, ScrapeError> {
        let upstream = self.fetch_upstream()?;
        let downstream = self.fetch_downstream()?;
        Ok(ScrapeReport { upstream, downstream })
    }

    /// Gets a protected page, logging in when the login wall shows up instead.
    fn fetch_page(&self, url: &Url) -> Result<Page, ScrapeError> {
        let mut attempts = 0;
        loop {
            let probe = self.gate.probe(url)?;
            if !probe.is_login_wall() {
                return Ok(probe.into_page());
            }
            if attempts == MAX_LOGIN_ATTEMPTS {
                warn!(%url, attempts, "still on the login page after logging in");
                return Err(ScrapeError::Authentication { url: url.clone() });
            }
            info!(%url, "session expired");
            self.gate.login()?;
            attempts += 1;
        }
    }
}
