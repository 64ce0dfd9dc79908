#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::VecDeque,
    rc::Rc,
};
use upc_monitor_scraper::{
    Credentials,
    Endpoints,
    Fetcher,
    Page,
    RowFailurePolicy,
    Transport,
    TransportError,
};
use url::Url;

pub const DOWNSTREAM: &str = include_str!("../fixtures/downstream.html");
pub const UPSTREAM: &str = include_str!("../fixtures/upstream.html");
pub const LOGIN: &str = include_str!("../fixtures/login.html");

pub const DOWNSTREAM_PATH: &str = "/status/connection-downstream.asp";
pub const UPSTREAM_PATH: &str = "/status/connection-upstream.asp";
pub const LOGIN_FORM_PATH: &str = "/login.asp";
pub const LOGIN_SUBMIT_PATH: &str = "/goform/login";

pub fn base_url() -> Url {
    Url::parse("http://192.168.42.1/").unwrap()
}

pub fn page_url(path: &str) -> Url {
    base_url().join(path).unwrap()
}

pub fn fetcher(transport: &ScriptedTransport, policy: RowFailurePolicy) -> Fetcher<ScriptedTransport> {
    Fetcher::new(
        transport.clone(),
        Endpoints::new(&base_url()).unwrap(),
        Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        },
        policy,
    )
}

#[derive(Debug, Clone)]
pub enum Reply {
    Page(u16, String),
    Timeout,
    Refused,
}

impl Reply {
    pub fn ok(body: &str) -> Self {
        Self::Page(200, body.to_string())
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self::Page(status, body.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: &'static str,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Default)]
struct Script {
    expected: VecDeque<(&'static str, String, Reply)>,
    requests: Vec<Request>,
}

/// Plays back canned replies in order and records what was asked for.
/// Clones share the same script, so a test can keep one while the fetcher owns another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(self, path: &str, reply: Reply) -> Self {
        self.expect("GET", path, reply)
    }

    pub fn on_post(self, path: &str, reply: Reply) -> Self {
        self.expect("POST", path, reply)
    }

    fn expect(self, method: &'static str, path: &str, reply: Reply) -> Self {
        self.script
            .borrow_mut()
            .expected
            .push_back((method, path.to_string(), reply));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.script.borrow().requests.clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests()
            .into_iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }

    pub fn unanswered(&self) -> usize {
        self.script.borrow().expected.len()
    }

    fn answer(&self, request: Request, url: &Url) -> Result<Page, TransportError> {
        let mut script = self.script.borrow_mut();
        let Some((method, path, reply)) = script.expected.pop_front() else {
            panic!("unexpected {} {}", request.method, request.path);
        };
        assert_eq!(
            (method, path.as_str()),
            (request.method, request.path.as_str()),
            "requests out of order"
        );
        script.requests.push(request);
        match reply {
            Reply::Page(status, body) => Ok(Page {
                url: url.clone(),
                status,
                body,
            }),
            Reply::Timeout => Err(TransportError::Timeout("operation timed out".into())),
            Reply::Refused => Err(TransportError::Connect("connection refused".into())),
        }
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &Url) -> Result<Page, TransportError> {
        let request = Request {
            method: "GET",
            path: url.path().to_string(),
            headers: Vec::new(),
            form: Vec::new(),
        };
        self.answer(request, url)
    }

    fn post_form(
        &self,
        url: &Url,
        headers: &[(&'static str, String)],
        form: &[(&str, &str)],
    ) -> Result<Page, TransportError> {
        let request = Request {
            method: "POST",
            path: url.path().to_string(),
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            form: form
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect(),
        };
        self.answer(request, url)
    }
}
