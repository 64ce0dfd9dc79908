use crate::records::Direction;
use url::Url;

const DOWNSTREAM_PATH: &str = "status/connection-downstream.asp";
const UPSTREAM_PATH: &str = "status/connection-upstream.asp";
const LOGIN_FORM_PATH: &str = "login.asp";
const LOGIN_SUBMIT_PATH: &str = "goform/login";

/// The pages of the modem web interface, resolved against the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base: Url,
    pub downstream: Url,
    pub upstream: Url,
    pub login_form: Url,
    pub login_submit: Url,
}

impl Endpoints {
    pub fn new(base: &Url) -> Result<Self, url::ParseError> {
        let mut base = base.clone();
        // join() replaces the last segment unless the path is a directory
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.set_query(None);
        base.set_fragment(None);

        Ok(Self {
            downstream: base.join(DOWNSTREAM_PATH)?,
            upstream: base.join(UPSTREAM_PATH)?,
            login_form: base.join(LOGIN_FORM_PATH)?,
            login_submit: base.join(LOGIN_SUBMIT_PATH)?,
            base,
        })
    }

    pub fn status_page(&self, direction: Direction) -> &Url {
        match direction {
            Direction::Downstream => &self.downstream,
            Direction::Upstream => &self.upstream,
        }
    }

    /// Value of the `Origin` header a browser sends with the login form.
    pub fn origin(&self) -> String {
        self.base.origin().ascii_serialization()
    }

    /// Value of the `Referer` header a browser sends with the login form.
    pub fn referer(&self) -> String {
        self.base.to_string()
    }
}
