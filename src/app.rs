use eyre::{
    Context as _,
    Result,
};
use std::time::{
    Duration,
    Instant,
};
use upc_monitor_config::{
    Config,
    SinkKind,
};
use upc_monitor_scraper::{
    Credentials,
    Direction,
    Endpoints,
    Fetcher,
    HttpTransport,
    ScrapeReport,
    Transport,
};
use upc_monitor_sink::{
    points,
    InfluxSink,
    MetricsSink,
    StdoutSink,
};

/// What one scrape cycle produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub upstream: usize,
    pub downstream: usize,
    pub skipped: usize,
    pub points: usize,
}

impl CycleSummary {
    fn new(report: &ScrapeReport, points: usize) -> Self {
        Self {
            upstream: report.upstream.records.len(),
            downstream: report.downstream.records.len(),
            skipped: report.skipped(),
            points,
        }
    }
}

pub struct App<T: Transport = HttpTransport> {
    fetcher: Fetcher<T>,
    sink: Box<dyn MetricsSink>,
    poll_interval: Option<Duration>,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let transport = HttpTransport::new(config.device.timeout).wrap_err("Failed to create the HTTP client")?;
        let endpoints = Endpoints::new(&config.device.url)
            .wrap_err_with(|| format!("Invalid device url {}", config.device.url))?;
        let fetcher = Fetcher::new(
            transport,
            endpoints,
            Credentials::from(&config.device),
            config.row_policy,
        );

        let sink: Box<dyn MetricsSink> = match config.sink {
            SinkKind::Influx => Box::new(InfluxSink::new(&config.influx).wrap_err("Failed to set up the InfluxDB sink")?),
            SinkKind::Stdout => Box::new(StdoutSink::new()),
        };
        info!(device = %config.device.url, sink = sink.name(), row_policy = %config.row_policy, "monitor ready");

        Ok(Self::with_parts(fetcher, sink, config.poll_interval))
    }
}

impl<T: Transport> App<T> {
    pub fn with_parts(fetcher: Fetcher<T>, sink: Box<dyn MetricsSink>, poll_interval: Option<Duration>) -> Self {
        Self {
            fetcher,
            sink,
            poll_interval,
        }
    }

    /// Scrapes both channel tables once and hands the records to the sink.
    pub fn cycle(&mut self) -> Result<CycleSummary> {
        let report = self.fetcher.scrape().wrap_err("Failed to scrape the modem")?;

        for (direction, row_errors) in [
            (Direction::Upstream, &report.upstream.row_errors),
            (Direction::Downstream, &report.downstream.row_errors),
        ] {
            for err in row_errors {
                warn!(%direction, row = err.row, column = err.column, raw = %err.raw, "skipped channel row");
            }
        }

        let points = points(&report);
        self.sink
            .write(&points)
            .wrap_err_with(|| format!("Failed to write points to {}", self.sink.name()))?;

        let summary = CycleSummary::new(&report, points.len());
        info!(
            upstream = summary.upstream,
            downstream = summary.downstream,
            skipped = summary.skipped,
            "scrape cycle finished"
        );
        Ok(summary)
    }

    /// Runs a single cycle, or with a poll interval, keeps cycling until the process is stopped.
    /// A failed cycle in the polling loop is logged and retried at the next tick.
    pub fn run(mut self) -> Result<()> {
        let Some(interval) = self.poll_interval else {
            self.cycle()?;
            return Ok(());
        };

        info!(?interval, "polling the modem");
        loop {
            let started = Instant::now();
            if let Err(err) = self.cycle() {
                error!("scrape cycle failed: {err:?}");
            }
            let wait = interval.saturating_sub(started.elapsed());
            trace!(?wait, "waiting for the next cycle");
            std::thread::sleep(wait);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{
        cell::RefCell,
        collections::HashMap,
        rc::Rc,
    };
    use upc_monitor_config::RowFailurePolicy;
    use upc_monitor_scraper::{
        Page,
        TransportError,
    };
    use upc_monitor_sink::{
        Point,
        SinkError,
    };
    use url::Url;

    const DOWNSTREAM: &str = include_str!("../scraper/tests/fixtures/downstream.html");
    const UPSTREAM: &str = include_str!("../scraper/tests/fixtures/upstream.html");

    /// Serves fixed pages by path and 404 for everything else.
    #[derive(Clone, Default)]
    struct Pages {
        pages: HashMap<String, String>,
        requests: Rc<RefCell<Vec<String>>>,
    }

    impl Pages {
        fn with(mut self, path: &str, body: &str) -> Self {
            self.pages.insert(path.to_string(), body.to_string());
            self
        }
    }

    impl Transport for Pages {
        fn get(&self, url: &Url) -> Result<Page, TransportError> {
            self.requests.borrow_mut().push(url.path().to_string());
            let (status, body) = match self.pages.get(url.path()) {
                Some(body) => (200, body.clone()),
                None => (404, String::new()),
            };
            Ok(Page {
                url: url.clone(),
                status,
                body,
            })
        }

        fn post_form(&self, url: &Url, _: &[(&'static str, String)], _: &[(&str, &str)]) -> Result<Page, TransportError> {
            self.get(url)
        }
    }

    #[derive(Default)]
    struct Recorder {
        points: Rc<RefCell<Vec<Point>>>,
        reject: bool,
    }

    impl MetricsSink for Recorder {
        fn write(&mut self, points: &[Point]) -> Result<(), SinkError> {
            if self.reject {
                return Err(SinkError::Status {
                    status: 404,
                    body: "database not found".to_string(),
                });
            }
            self.points.borrow_mut().extend_from_slice(points);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    fn modem() -> Pages {
        Pages::default()
            .with("/status/connection-upstream.asp", UPSTREAM)
            .with("/status/connection-downstream.asp", DOWNSTREAM)
    }

    fn app(pages: Pages, sink: Recorder, poll_interval: Option<Duration>) -> App<Pages> {
        let endpoints = Endpoints::new(&Url::parse("http://192.168.42.1/").unwrap()).unwrap();
        let credentials = Credentials {
            username: "admin".to_string(),
            password: "admin".to_string(),
        };
        let fetcher = Fetcher::new(pages, endpoints, credentials, RowFailurePolicy::Skip);
        App::with_parts(fetcher, Box::new(sink), poll_interval)
    }

    #[test]
    fn cycle_writes_upstream_then_downstream_points() {
        let recorder = Recorder::default();
        let written = recorder.points.clone();

        let summary = app(modem(), recorder, None).cycle().unwrap();

        assert_eq!(
            summary,
            CycleSummary {
                upstream: 3,
                downstream: 4,
                skipped: 0,
                points: 7,
            }
        );
        let measurements = written
            .borrow()
            .iter()
            .map(|point| point.measurement.clone())
            .collect::<Vec<_>>();
        assert_eq!(measurements[..3], ["channelDataUp"; 3]);
        assert_eq!(measurements[3..], ["channelDataDown"; 4]);
    }

    #[test]
    fn skipped_rows_are_counted_but_not_written() {
        let broken = DOWNSTREAM.replace("<td>626000000</td>", "<td>unknown</td>");
        let pages = modem().with("/status/connection-downstream.asp", &broken);
        let recorder = Recorder::default();
        let written = recorder.points.clone();

        let summary = app(pages, recorder, None).cycle().unwrap();

        assert_eq!(summary.downstream, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(written.borrow().len(), 6);
    }

    #[test]
    fn sink_failure_fails_the_cycle() {
        let recorder = Recorder {
            reject: true,
            ..Default::default()
        };

        let err = app(modem(), recorder, None).cycle().unwrap_err();

        assert!(err.to_string().contains("recorder"), "{err}");
    }

    #[test]
    fn scrape_failure_writes_nothing() {
        let pages = Pages::default().with("/status/connection-upstream.asp", UPSTREAM);
        let recorder = Recorder::default();
        let written = recorder.points.clone();

        let err = app(pages, recorder, None).cycle().unwrap_err();

        assert!(err.to_string().contains("scrape"), "{err}");
        assert!(written.borrow().is_empty());
    }

    #[test]
    fn run_without_interval_is_a_single_cycle() {
        let pages = modem();
        let requests = pages.requests.clone();

        app(pages, Recorder::default(), None).run().unwrap();

        assert_eq!(
            *requests.borrow(),
            vec![
                "/status/connection-upstream.asp".to_string(),
                "/status/connection-downstream.asp".to_string(),
            ]
        );
    }
}
