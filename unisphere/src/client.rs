use crate::{
    stats::is_timestamp_current,
    ApiError,
    Category,
    HealthScore,
    RecencyWindow,
    StatsRequest,
    StatsResponse,
    TopologyItem,
};
use powermax_zabbix_config::{
    MetricSet,
    UnisphereSettings,
};
use reqwest::{
    blocking::{
        Client,
        RequestBuilder,
    },
    header::ACCEPT,
    StatusCode,
};
use serde_json::{
    json,
    Value,
};
use std::{
    cell::RefCell,
    collections::HashMap,
    time::Duration,
};
use url::Url;

/// Operations the collectors need from the array management API.
///
/// Calls are blocking and issued strictly one after another.
pub trait ArrayApi {
    /// Ids of every array registered with Unisphere.
    fn array_list(&self) -> Result<Vec<String>, ApiError>;

    /// Lists the items of `category`. Ports are listed per `director_id`.
    fn list_items(
        &self,
        category: Category,
        array_id: &str,
        director_id: Option<&str>,
    ) -> Result<Vec<TopologyItem>, ApiError>;

    /// Fetches statistics, failing with [`ApiError::RecencyNotMet`] when the latest
    /// snapshot is too old for a [`RecencyWindow::Latest`] request.
    fn fetch_stats(&self, request: &StatsRequest) -> Result<StatsResponse, ApiError>;

    fn health(&self, array_id: &str) -> Result<Vec<HealthScore>, ApiError>;
}

/// Blocking client for the Unisphere for PowerMax REST API.
pub struct UnisphereClient {
    http: Client,
    base_url: Url,
    username: String,
    password: String,
    api_version: String,
    metric_set: MetricSet,
    metric_names: RefCell<HashMap<Category, Vec<String>>>,
}

impl UnisphereClient {
    pub fn new(settings: &UnisphereSettings, metric_set: MetricSet) -> Result<Self, ApiError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .danger_accept_invalid_certs(!settings.verify);

        if let Some(path) = &settings.ca_cert {
            let pem = std::fs::read(path).map_err(|source| ApiError::Certificate {
                path: path.clone(),
                source,
            })?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: settings.base_url()?,
            username: settings.username.clone(),
            password: settings.password.clone(),
            api_version: settings.api_version.clone(),
            metric_set,
            metric_names: RefCell::new(HashMap::new()),
        })
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ApiError> {
        let url = self.base_url.join(path)?;
        trace!(%url, "GET");
        self.send(self.http.get(url.clone()).query(query), &url)
    }

    fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = self.base_url.join(path)?;
        trace!(%url, %body, "POST");
        self.send(self.http.post(url.clone()).json(body), &url)
    }

    fn send(&self, request: RequestBuilder, url: &Url) -> Result<Value, ApiError> {
        let response = request
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .send()?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(url.path().to_string()));
        }

        let text = response.text()?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
                message: error_message(&text),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn array_keys(&self) -> Result<Value, ApiError> {
        self.get("performance/Array/keys", &[])
    }

    fn last_available_timestamp(&self, array_id: &str) -> Result<i64, ApiError> {
        let keys = self.array_keys()?;
        keys.get("arrayInfo")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .find(|info| info.get("symmetrixId").and_then(Value::as_str) == Some(array_id))
            .ok_or_else(|| ApiError::NotFound(format!("performance keys of array {array_id}")))?
            .get("lastAvailableDate")
            .and_then(Value::as_i64)
            .ok_or_else(|| ApiError::MissingField("lastAvailableDate".to_string()))
    }

    /// Turns a window into the `startDate`/`endDate` pair of a metrics query.
    fn resolve_window(&self, request: &StatsRequest) -> Result<(i64, i64), ApiError> {
        match request.window {
            RecencyWindow::Range { start, end } => Ok((start, end)),
            RecencyWindow::Latest { minutes } => {
                let last_available = self.last_available_timestamp(&request.array_id)?;
                if !is_timestamp_current(last_available, minutes, chrono::Utc::now().timestamp_millis()) {
                    return Err(ApiError::RecencyNotMet {
                        array_id: request.array_id.clone(),
                        minutes,
                        last_available,
                    });
                }
                Ok((last_available, last_available))
            }
        }
    }

    fn metric_names(&self, category: Category) -> Result<Vec<String>, ApiError> {
        if let Some(names) = self.metric_names.borrow().get(&category) {
            return Ok(names.clone());
        }

        let query: &[(&str, &str)] = match self.metric_set {
            MetricSet::Kpi => &[("kpi", "true")],
            MetricSet::All => &[],
        };
        let value = self.get(&format!("performance/{category}/metrics"), query)?;
        let names = parse_metric_names(&value)?;
        debug!(%category, metric_set = %self.metric_set, count = names.len(), "Resolved metric names");

        self.metric_names.borrow_mut().insert(category, names.clone());
        Ok(names)
    }
}

impl ArrayApi for UnisphereClient {
    fn array_list(&self) -> Result<Vec<String>, ApiError> {
        let value = self.get(&format!("{}/system/symmetrix", self.api_version), &[])?;
        Ok(string_list(&value, "symmetrixId"))
    }

    fn list_items(
        &self,
        category: Category,
        array_id: &str,
        director_id: Option<&str>,
    ) -> Result<Vec<TopologyItem>, ApiError> {
        let value = if category == Category::Array {
            self.array_keys()?
        } else {
            let mut body = json!({ "symmetrixId": array_id });
            if let Some(director_id) = director_id {
                body["directorId"] = json!(director_id);
            }
            self.post(&format!("performance/{category}/keys"), &body)?
        };

        let mut items = parse_keys(category, director_id, &value)?;
        if category == Category::Array {
            items.retain(|item| item.id == array_id);
        }
        Ok(items)
    }

    fn fetch_stats(&self, request: &StatsRequest) -> Result<StatsResponse, ApiError> {
        let (start, end) = self.resolve_window(request)?;
        let metrics = self.metric_names(request.category)?;
        let body = request.body(start, end, &metrics);
        let value = self.post(&format!("performance/{}/metrics", request.category), &body)?;
        Ok(StatsResponse::from_value(&value)?)
    }

    fn health(&self, array_id: &str) -> Result<Vec<HealthScore>, ApiError> {
        let value = self.get(
            &format!("{}/system/symmetrix/{array_id}/health", self.api_version),
            &[],
        )?;
        match value.get("health_score_metric") {
            Some(scores) => Ok(serde_json::from_value(scores.clone())?),
            None => Ok(Vec::new()),
        }
    }
}

/// Reads the listed items of a `performance/<Category>/keys` response.
pub fn parse_keys(category: Category, parent: Option<&str>, value: &Value) -> Result<Vec<TopologyItem>, ApiError> {
    let fields = category.key_fields();
    let Some(entries) = value.get(fields.info).and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    entries
        .iter()
        .map(|entry| {
            let id = entry
                .get(fields.id)
                .and_then(Value::as_str)
                .ok_or_else(|| ApiError::MissingField(format!("{}.{}", fields.info, fields.id)))?;
            Ok(match parent {
                Some(parent) => TopologyItem::with_parent(category, parent, id),
                None => TopologyItem::new(category, id),
            })
        })
        .collect()
}

fn parse_metric_names(value: &Value) -> Result<Vec<String>, ApiError> {
    value
        .get("metricName")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .ok_or_else(|| ApiError::MissingField("metricName".to_string()))
}

fn string_list(value: &Value, field: &str) -> Vec<String> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Unisphere reports failures as `{"message": "..."}`; fall back to the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{
        io::{
            BufRead,
            BufReader,
            Read,
            Write,
        },
        net::{
            TcpListener,
            TcpStream,
        },
        thread,
    };

    const ARRAY_ID: &str = "000197900123";

    /// Plain HTTP stand-in for Unisphere. Answers one request per connection with the
    /// next canned `(status, body)` and hands back every `(request line, body)` it saw.
    fn serve(responses: Vec<(u16, String)>) -> (UnisphereClient, thread::JoinHandle<Vec<(String, String)>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            responses
                .into_iter()
                .map(|(status, body)| {
                    let (stream, _) = listener.accept().unwrap();
                    let request = read_request(&stream);
                    let response = format!(
                        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
                         Connection: close\r\n\r\n{body}",
                        body.len()
                    );
                    (&stream).write_all(response.as_bytes()).unwrap();
                    request
                })
                .collect()
        });

        let client = UnisphereClient {
            http: Client::builder().no_proxy().build().unwrap(),
            base_url: Url::parse(&format!("http://127.0.0.1:{port}/univmax/restapi/")).unwrap(),
            username: "smc".to_string(),
            password: "smc".to_string(),
            api_version: "100".to_string(),
            metric_set: MetricSet::Kpi,
            metric_names: RefCell::new(HashMap::new()),
        };
        (client, server)
    }

    fn read_request(stream: &TcpStream) -> (String, String) {
        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();

        let mut length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    length = value.trim().parse().unwrap();
                }
            }
        }

        let mut body = vec![0; length];
        reader.read_exact(&mut body).unwrap();
        (request_line.trim_end().to_string(), String::from_utf8(body).unwrap())
    }

    fn array_keys(last_available: i64) -> String {
        json!({
            "arrayInfo": [{
                "symmetrixId": ARRAY_ID,
                "firstAvailableDate": 0,
                "lastAvailableDate": last_available,
            }]
        })
        .to_string()
    }

    fn latest_array_request() -> StatsRequest {
        StatsRequest::for_item(
            &TopologyItem::new(Category::Array, ARRAY_ID),
            ARRAY_ID,
            RecencyWindow::Latest { minutes: 5 },
        )
    }

    #[test]
    fn http_404_is_not_found() {
        let (api, server) = serve(vec![(404, String::new())]);

        let err = api.array_list().unwrap_err();

        assert!(
            matches!(err, ApiError::NotFound(ref path) if path == "/univmax/restapi/100/system/symmetrix"),
            "{err}"
        );
        assert_eq!(server.join().unwrap()[0].0, "GET /univmax/restapi/100/system/symmetrix HTTP/1.1");
    }

    #[test]
    fn other_failures_carry_status_and_message() {
        let (api, server) = serve(vec![(500, r#"{"message": "Internal failure"}"#.to_string())]);

        match api.health(ARRAY_ID).unwrap_err() {
            ApiError::Status { status, url, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Internal failure");
                assert!(url.ends_with("/univmax/restapi/100/system/symmetrix/000197900123/health"), "{url}");
            }
            other => panic!("unexpected error {other}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn stale_snapshot_is_refused_before_querying_metrics() {
        let last_available = chrono::Utc::now().timestamp_millis() - 3_600_000;
        let (api, server) = serve(vec![(200, array_keys(last_available))]);

        let err = api.fetch_stats(&latest_array_request()).unwrap_err();

        assert!(
            matches!(err, ApiError::RecencyNotMet { minutes: 5, last_available: at, .. } if at == last_available),
            "{err}"
        );
        assert_eq!(server.join().unwrap().len(), 1);
    }

    #[test]
    fn current_snapshot_is_queried_and_metric_names_are_cached() {
        let last_available = chrono::Utc::now().timestamp_millis() - 60_000;
        let names = json!({ "metricName": ["HostIOs"] }).to_string();
        let stats = json!({
            "resultList": { "result": [{ "timestamp": last_available, "HostIOs": 12.5 }] }
        })
        .to_string();
        let (api, server) = serve(vec![
            (200, array_keys(last_available)),
            (200, names),
            (200, stats.clone()),
            (200, array_keys(last_available)),
            (200, stats),
        ]);

        let first = api.fetch_stats(&latest_array_request()).unwrap();
        let second = api.fetch_stats(&latest_array_request()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.rows[0].timestamp, last_available);
        assert_eq!(first.rows[0].fields.get("HostIOs"), Some(&json!(12.5)));

        let requests = server.join().unwrap();
        let lines: Vec<_> = requests.iter().map(|(line, _)| line.as_str()).collect();
        assert_eq!(
            lines,
            vec![
                "GET /univmax/restapi/performance/Array/keys HTTP/1.1",
                "GET /univmax/restapi/performance/Array/metrics?kpi=true HTTP/1.1",
                "POST /univmax/restapi/performance/Array/metrics HTTP/1.1",
                "GET /univmax/restapi/performance/Array/keys HTTP/1.1",
                "POST /univmax/restapi/performance/Array/metrics HTTP/1.1",
            ]
        );

        let body: Value = serde_json::from_str(&requests[2].1).unwrap();
        assert_eq!(body["symmetrixId"], json!(ARRAY_ID));
        assert_eq!(body["startDate"], json!(last_available));
        assert_eq!(body["endDate"], json!(last_available));
        assert_eq!(body["metrics"], json!(["HostIOs"]));
    }

    #[test]
    fn parses_director_keys() {
        let value = json!({
            "feDirectorInfo": [
                {"directorId": "FA-1D", "firstAvailableDate": 1, "lastAvailableDate": 2},
                {"directorId": "FA-2D", "firstAvailableDate": 1, "lastAvailableDate": 2},
            ]
        });
        let items = parse_keys(Category::FEDirector, None, &value).unwrap();
        assert_eq!(
            items,
            vec![
                TopologyItem::new(Category::FEDirector, "FA-1D"),
                TopologyItem::new(Category::FEDirector, "FA-2D"),
            ]
        );
    }

    #[test]
    fn ports_remember_their_director() {
        let value = json!({ "fePortInfo": [{"portId": "4"}] });
        let items = parse_keys(Category::FEPort, Some("FA-1D"), &value).unwrap();
        assert_eq!(items, vec![TopologyItem::with_parent(Category::FEPort, "FA-1D", "4")]);
    }

    #[test]
    fn missing_info_field_is_empty() {
        assert_eq!(parse_keys(Category::StorageGroup, None, &json!({})).unwrap(), vec![]);
        assert_eq!(parse_keys(Category::StorageGroup, None, &Value::Null).unwrap(), vec![]);
    }

    #[test]
    fn entry_without_id_is_an_error() {
        let value = json!({ "srpInfo": [{"firstAvailableDate": 1}] });
        assert!(matches!(
            parse_keys(Category::SRP, None, &value),
            Err(ApiError::MissingField(field)) if field == "srpInfo.srpId"
        ));
    }

    #[test]
    fn reads_metric_names_and_array_list() {
        let names = parse_metric_names(&json!({ "metricName": ["HostIOs", "HostMBs"] })).unwrap();
        assert_eq!(names, vec!["HostIOs".to_string(), "HostMBs".to_string()]);
        assert_eq!(
            string_list(&json!({ "symmetrixId": ["000197900123", "000197900456"] }), "symmetrixId"),
            vec!["000197900123".to_string(), "000197900456".to_string()]
        );
    }

    #[test]
    fn error_message_prefers_json_message() {
        assert_eq!(error_message(r#"{"message": "Invalid credentials"}"#), "Invalid credentials");
        assert_eq!(error_message("Service Unavailable\n"), "Service Unavailable");
    }
}
