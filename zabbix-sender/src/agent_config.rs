use crate::DEFAULT_TRAPPER_PORT;

/// Trapper endpoint from the first `ServerActive` entry of a Zabbix agent
/// configuration, e.g. `ServerActive=zabbix.example.com:10051,zabbix-dr.example.com`.
pub fn parse_server_active(contents: &str) -> Option<(String, u16)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .filter(|(name, _)| name.trim() == "ServerActive")
        .filter_map(|(_, value)| value.split(',').map(str::trim).find(|entry| !entry.is_empty()))
        .last()
        .map(parse_endpoint)
}

fn parse_endpoint(entry: &str) -> (String, u16) {
    // [::1]:10051
    if let Some(rest) = entry.strip_prefix('[') {
        if let Some((host, port)) = rest.split_once(']') {
            let port = port.strip_prefix(':').and_then(|p| p.parse().ok());
            return (host.to_string(), port.unwrap_or(DEFAULT_TRAPPER_PORT));
        }
    }

    match entry.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => (
            host.to_string(),
            port.parse().unwrap_or(DEFAULT_TRAPPER_PORT),
        ),
        _ => (entry.to_string(), DEFAULT_TRAPPER_PORT),
    }
}
