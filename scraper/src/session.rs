use crate::{
    endpoints::Endpoints,
    error::{
        ScrapeError,
        Stage,
    },
    tag::{
        self,
        LOGIN_AREA_CODE,
    },
    transport::{
        Page,
        Transport,
    },
};
use scraper::{
    node::Node,
    ElementRef,
    Html,
    Selector,
};
use std::fmt;
use upc_monitor_config::DeviceConfig;
use url::Url;

/// How often a page may come back as the login wall and be answered with a login before giving up.
pub const MAX_LOGIN_ATTEMPTS: usize = 1;

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

lazy_static::lazy_static! {
    static ref HEADING: Selector = Selector::parse("h2").expect("valid selector");
    static ref CSRF_INPUT: Selector = Selector::parse(r#"input[name^="CSRFValue"]"#).expect("valid selector");
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl From<&DeviceConfig> for Credentials {
    fn from(device: &DeviceConfig) -> Self {
        Self {
            username: device.username.clone(),
            password: device.password.clone(),
        }
    }
}

/// A fetched page together with the verdict whether it is the login wall.
#[derive(Debug, Clone)]
pub struct Probe {
    page: Page,
    login_wall: bool,
}

impl Probe {
    pub fn is_login_wall(&self) -> bool {
        self.login_wall
    }

    pub fn into_page(self) -> Page {
        self.page
    }
}

/// Tells protected pages from the login wall and logs in when needed.
///
/// The session itself lives in the transport's cookie jar; whether it is still valid is decided
/// anew from every page that comes back.
#[derive(Debug)]
pub struct SessionGate<T> {
    transport: T,
    endpoints: Endpoints,
    credentials: Credentials,
}

impl<T: Transport> SessionGate<T> {
    pub fn new(transport: T, endpoints: Endpoints, credentials: Credentials) -> Self {
        Self {
            transport,
            endpoints,
            credentials,
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetches `url` and checks whether the modem answered with its login page instead.
    pub fn probe(&self, url: &Url) -> Result<Probe, ScrapeError> {
        let page = self.transport.get(url).map_err(ScrapeError::network(Stage::Fetch, url))?;
        let login_wall = is_login_wall(&page.body);
        if !login_wall && !page.is_success() {
            return Err(ScrapeError::HttpStatus {
                stage: Stage::Fetch,
                url: url.clone(),
                status: page.status,
            });
        }
        trace!(%url, login_wall, "probed page");
        Ok(Probe { page, login_wall })
    }

    /// Runs the form login: read the CSRF token from the login page, then post the credentials.
    pub fn login(&self) -> Result<(), ScrapeError> {
        let form_url = &self.endpoints.login_form;
        let submit_url = &self.endpoints.login_submit;
        info!(user = %self.credentials.username, "logging into the modem");

        let form = self
            .transport
            .get(form_url)
            .map_err(ScrapeError::network(Stage::LoginForm, form_url))?;
        if !form.is_success() {
            return Err(ScrapeError::LoginFailed {
                url: form_url.clone(),
                reason: format!("login form returned status {}", form.status),
            });
        }
        let token = extract_csrf_token(&form.body).ok_or_else(|| ScrapeError::LoginFailed {
            url: form_url.clone(),
            reason: "login form carries no CSRF token".to_string(),
        })?;
        debug!(token_len = token.len(), "found CSRF token");

        let headers = [
            ("Accept", BROWSER_ACCEPT.to_string()),
            ("Accept-Language", BROWSER_ACCEPT_LANGUAGE.to_string()),
            ("Origin", self.endpoints.origin()),
            ("Referer", self.endpoints.referer()),
            ("Upgrade-Insecure-Requests", "1".to_string()),
            ("DNT", "1".to_string()),
            ("Sec-GPC", "1".to_string()),
        ];
        let form = [
            ("CSRFValue", token.as_str()),
            ("loginUsername", self.credentials.username.as_str()),
            ("loginPassword", self.credentials.password.as_str()),
            ("logoffUser", "0"),
        ];
        let response = self
            .transport
            .post_form(submit_url, &headers, &form)
            .map_err(ScrapeError::network(Stage::LoginSubmit, submit_url))?;
        if !response.is_success() {
            return Err(ScrapeError::LoginFailed {
                url: submit_url.clone(),
                reason: format!("login returned status {}", response.status),
            });
        }

        debug!(status = response.status, "login submitted");
        Ok(())
    }
}

/// The login page is recognised by its first heading, which holds nothing but the
/// `LOGIN_AREA_LABEL2=` placeholder script.
pub fn is_login_wall(body: &str) -> bool {
    let document = Html::parse_document(body);
    let Some(heading) = document.select(&HEADING).next() else {
        return false;
    };

    let mut scripts = 0;
    for child in heading.children() {
        match child.value() {
            Node::Text(text) if text.trim().is_empty() => {}
            Node::Element(element) if element.name() == "script" => {
                let script = ElementRef::wrap(child)
                    .map(|script| script.text().collect::<String>())
                    .unwrap_or_default();
                if !matches!(tag::bare_code(&script), Ok(code) if code == LOGIN_AREA_CODE) {
                    return false;
                }
                scripts += 1;
            }
            _ => return false,
        }
    }
    scripts == 1
}

/// Value of the hidden `CSRFValue...` input of the login form, if present and not blank.
pub fn extract_csrf_token(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    document
        .select(&CSRF_INPUT)
        .filter_map(|input| input.value().attr("value"))
        .map(str::trim)
        .find(|token| !token.is_empty())
        .map(str::to_string)
}
