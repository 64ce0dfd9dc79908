use strum::Display;
use url::Url;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The step of a scrape cycle a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Stage {
    Fetch,
    LoginForm,
    LoginSubmit,
}

/// Failures of the underlying HTTP exchange, before any status code is known.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout(#[source] BoxError),
    #[error("connection failed")]
    Connect(#[source] BoxError),
    #[error("request failed")]
    Other(#[source] BoxError),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.into())
        } else if err.is_connect() {
            Self::Connect(err.into())
        } else {
            Self::Other(err.into())
        }
    }
}

/// A single table cell that could not be converted into its typed value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: cannot parse {column} from {raw:?}")]
pub struct RowParseError {
    pub row: usize,
    pub column: &'static str,
    pub raw: String,
}

#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    #[error("unexpected page structure{}: {detail}", located(.url))]
    Structure { url: Option<Url>, detail: String },
    #[error(transparent)]
    Row(#[from] RowParseError),
    #[error("login via {url} failed: {reason}")]
    LoginFailed { url: Url, reason: String },
    #[error("{url} still shows the login page after logging in")]
    Authentication { url: Url },
    #[error("{stage} request to {url} failed")]
    Network {
        stage: Stage,
        url: Url,
        #[source]
        source: TransportError,
    },
    #[error("{stage} request to {url} returned status {status}")]
    HttpStatus { stage: Stage, url: Url, status: u16 },
}

fn located(url: &Option<Url>) -> String {
    url.as_ref().map(|url| format!(" at {url}")).unwrap_or_default()
}

impl ScrapeError {
    pub(crate) fn structure(detail: impl Into<String>) -> Self {
        Self::Structure {
            url: None,
            detail: detail.into(),
        }
    }

    /// Attaches the page URL to errors raised while parsing a page body.
    pub(crate) fn at(self, page: &Url) -> Self {
        match self {
            Self::Structure { url: None, detail } => Self::Structure {
                url: Some(page.clone()),
                detail,
            },
            other => other,
        }
    }

    pub(crate) fn network(stage: Stage, url: &Url) -> impl FnOnce(TransportError) -> Self + '_ {
        move |source| Self::Network {
            stage,
            url: url.clone(),
            source,
        }
    }
}
