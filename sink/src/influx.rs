use crate::{
    MetricsSink,
    Point,
    SinkError,
};
use upc_monitor_config::InfluxConfig;
use url::Url;

/// Writes points through the InfluxDB 1.x HTTP API (`POST /write?db=...`).
#[derive(Debug)]
pub struct InfluxSink {
    client: reqwest::blocking::Client,
    write_url: Url,
    database: String,
}

impl InfluxSink {
    pub fn new(config: &InfluxConfig) -> Result<Self, SinkError> {
        let client = reqwest::blocking::Client::builder().timeout(config.timeout).build()?;

        let mut base = config.url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut write_url = base.join("write")?;
        {
            let mut query = write_url.query_pairs_mut();
            query.clear().append_pair("db", &config.database);
            if let Some(username) = &config.username {
                query.append_pair("u", username);
            }
            if let Some(password) = &config.password {
                query.append_pair("p", password);
            }
        }

        Ok(Self {
            client,
            write_url,
            database: config.database.clone(),
        })
    }
}

impl MetricsSink for InfluxSink {
    fn write(&mut self, points: &[Point]) -> Result<(), SinkError> {
        if points.is_empty() {
            debug!("nothing to write");
            return Ok(());
        }

        let body = points.iter().map(Point::to_string).collect::<Vec<_>>().join("\n");
        let response = self.client.post(self.write_url.clone()).body(body).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SinkError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        debug!(database = %self.database, points = points.len(), "points written");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "influx"
    }
}
