use crate::{
    agent_config::parse_server_active,
    protocol::{
        encode_request,
        exchange,
    },
    SendResult,
    SenderError,
    ZabbixMetric,
};
use powermax_zabbix_config::ZabbixSettings;
use std::{
    net::{
        TcpStream,
        ToSocketAddrs,
    },
    time::Duration,
};

/// Values per trapper request.
const CHUNK_SIZE: usize = 250;

/// Destination for collected metrics.
pub trait MetricSink {
    /// Delivers one batch. Individual values the server refuses are reported through
    /// [`SendResult::failed`], not as an error. So are values left unsent when the
    /// connection breaks after part of the batch went through.
    fn send(&self, metrics: &[ZabbixMetric]) -> Result<SendResult, SenderError>;
}

/// Blocking Zabbix trapper client. Every batch uses its own connection.
#[derive(Debug, Clone)]
pub struct ZabbixSender {
    server: String,
    port: u16,
    timeout: Duration,
}

impl ZabbixSender {
    pub fn new(server: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            server: server.into(),
            port,
            timeout,
        }
    }

    /// Uses `ServerActive` of the configured agent configuration when there is one.
    pub fn from_settings(settings: &ZabbixSettings) -> Result<Self, SenderError> {
        let timeout = Duration::from_secs(settings.timeout_secs);
        let Some(path) = &settings.agent_config else {
            return Ok(Self::new(settings.server.clone(), settings.port, timeout));
        };

        let contents = std::fs::read_to_string(path).map_err(|source| SenderError::AgentConfig {
            path: path.clone(),
            source,
        })?;
        let (server, port) = parse_server_active(&contents).ok_or_else(|| SenderError::NoServerActive(path.clone()))?;
        debug!(?path, %server, port, "Using trapper from agent configuration");
        Ok(Self::new(server, port, timeout))
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.server, self.port)
    }

    fn connect(&self) -> Result<TcpStream, SenderError> {
        let mut last_error = None;
        for addr in (self.server.as_str(), self.port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_write_timeout(Some(self.timeout))?;
                    return Ok(stream);
                }
                Err(err) => last_error = Some(err),
            }
        }
        Err(SenderError::Connect {
            endpoint: self.endpoint(),
            source: last_error.unwrap_or_else(|| std::io::ErrorKind::AddrNotAvailable.into()),
        })
    }
}

impl MetricSink for ZabbixSender {
    fn send(&self, metrics: &[ZabbixMetric]) -> Result<SendResult, SenderError> {
        let mut result = SendResult::default();
        for (index, chunk) in metrics.chunks(CHUNK_SIZE).enumerate() {
            let chunk_result = self.connect().and_then(|mut stream| {
                let packet = encode_request(chunk, chrono::Utc::now().timestamp())?;
                exchange(&mut stream, &packet)
            });
            match chunk_result {
                Ok(chunk_result) => {
                    trace!(endpoint = %self.endpoint(), chunk = index, ?chunk_result, "Trapper answered");
                    result.merge(chunk_result);
                }
                Err(err) if index == 0 => return Err(err),
                Err(err) => {
                    let unsent = (metrics.len() - index * CHUNK_SIZE) as u64;
                    error!(
                        endpoint = %self.endpoint(),
                        chunk = index,
                        error = %err,
                        delivered = result.total,
                        unsent,
                        "Trapper failed mid-batch"
                    );
                    result.failed += unsent;
                    result.total += unsent;
                    break;
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{
        read_packet,
        HEADER,
    };
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use std::{
        io::Write,
        net::TcpListener,
        thread,
    };
    use temp_dir::TempDir;

    fn settings(agent_config: Option<std::path::PathBuf>) -> ZabbixSettings {
        ZabbixSettings {
            server: "127.0.0.1".to_string(),
            port: 10051,
            agent_config,
            host_template: "PowerMax {arrayid}".to_string(),
            timeout_secs: 5,
        }
    }

    #[test]
    fn sends_batch_to_trapper() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request: Value = serde_json::from_slice(&read_packet(&mut stream).unwrap()).unwrap();

            let body = br#"{"response":"success","info":"processed: 1; failed: 1; total: 2; seconds spent: 0.000100"}"#;
            stream.write_all(HEADER).unwrap();
            stream.write_all(&(body.len() as u64).to_le_bytes()).unwrap();
            stream.write_all(body).unwrap();
            request
        });

        let sender = ZabbixSender::new("127.0.0.1", port, Duration::from_secs(5));
        let metrics = vec![
            ZabbixMetric::new("PowerMax 000197", "dellemc.pmax.perf.array.hostios[000197]", 10.5, 1_700_000_000),
            ZabbixMetric::new("PowerMax 000197", "dellemc.pmax.perf.array.hostmbs[000197]", 2.0, 1_700_000_000),
        ];
        let result = sender.send(&metrics).unwrap();

        assert_eq!(result.processed, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.total, 2);

        let request = server.join().unwrap();
        assert_eq!(request["request"], "sender data");
        assert_eq!(request["data"].as_array().unwrap().len(), 2);
        assert_eq!(request["data"][0]["value"], "10.5");
    }

    #[test]
    fn connection_refused_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let sender = ZabbixSender::new("127.0.0.1", port, Duration::from_secs(1));
        let metric = ZabbixMetric::new("h", "k", 1.0, 0);
        assert!(matches!(sender.send(&[metric]), Err(SenderError::Connect { .. })));
    }

    #[test]
    fn later_chunk_failure_keeps_delivered_totals() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            read_packet(&mut stream).unwrap();
            let body = br#"{"response":"success","info":"processed: 250; failed: 0; total: 250; seconds spent: 0.1"}"#;
            stream.write_all(HEADER).unwrap();
            stream.write_all(&(body.len() as u64).to_le_bytes()).unwrap();
            stream.write_all(body).unwrap();

            // Second chunk: hang up without answering.
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let sender = ZabbixSender::new("127.0.0.1", port, Duration::from_secs(5));
        let metrics: Vec<_> = (0..251)
            .map(|i| ZabbixMetric::new("h", format!("k{i}"), i as f64, 0))
            .collect();
        let result = sender.send(&metrics).unwrap();
        server.join().unwrap();

        assert_eq!(result.processed, 250);
        assert_eq!(result.failed, 1);
        assert_eq!(result.total, 251);
    }

    #[test]
    fn agent_config_overrides_server() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("zabbix_agentd.conf");
        std::fs::write(&path, "ServerActive=zabbix.example.com:10052\n").unwrap();

        let sender = ZabbixSender::from_settings(&settings(Some(path))).unwrap();
        assert_eq!(sender.endpoint(), "zabbix.example.com:10052");

        let sender = ZabbixSender::from_settings(&settings(None)).unwrap();
        assert_eq!(sender.endpoint(), "127.0.0.1:10051");
    }

    #[test]
    fn agent_config_without_server_active_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.child("zabbix_agentd.conf");
        std::fs::write(&path, "Server=127.0.0.1\n").unwrap();
        assert!(matches!(
            ZabbixSender::from_settings(&settings(Some(path))),
            Err(SenderError::NoServerActive(_))
        ));
    }
}
