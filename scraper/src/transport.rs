use crate::error::TransportError;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!("upc-monitor/", env!("CARGO_PKG_VERSION"));

/// A response as far as the scraper cares: where it ended up, its status and the body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub url: Url,
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP access to the modem. Implementations keep the session cookies between calls.
pub trait Transport {
    fn get(&self, url: &Url) -> Result<Page, TransportError>;

    fn post_form(
        &self,
        url: &Url,
        headers: &[(&'static str, String)],
        form: &[(&str, &str)],
    ) -> Result<Page, TransportError>;
}

/// [`Transport`] backed by a blocking reqwest client with a cookie jar.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    fn read(response: reqwest::blocking::Response) -> Result<Page, TransportError> {
        let url = response.url().clone();
        let status = response.status().as_u16();
        let body = response.text()?;
        trace!(%url, status, bytes = body.len(), "received page");
        Ok(Page { url, status, body })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &Url) -> Result<Page, TransportError> {
        debug!(%url, "GET");
        Self::read(self.client.get(url.clone()).send()?)
    }

    fn post_form(
        &self,
        url: &Url,
        headers: &[(&'static str, String)],
        form: &[(&str, &str)],
    ) -> Result<Page, TransportError> {
        debug!(%url, "POST");
        let request = headers
            .iter()
            .fold(self.client.post(url.clone()), |request, (name, value)| {
                request.header(*name, value.as_str())
            });
        Self::read(request.form(form).send()?)
    }
}
