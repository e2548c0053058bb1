use crate::{
    SenderError,
    ZabbixMetric,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::io::{
    Read,
    Write,
};

/// `ZBXD` followed by protocol version 1.
pub(crate) const HEADER: &[u8; 5] = b"ZBXD\x01";
const HEADER_LEN: usize = HEADER.len() + 8;
/// Largest payload the trapper itself accepts.
const MAX_PAYLOAD: u64 = 1 << 30;

#[derive(Debug, Serialize)]
struct SenderRequest<'a> {
    request: &'static str,
    data: &'a [ZabbixMetric],
    clock: i64,
}

#[derive(Debug, Deserialize)]
struct SenderResponse {
    response: String,
    #[serde(default)]
    info: String,
}

/// Summary the trapper returns for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SendResult {
    pub processed: u64,
    pub failed: u64,
    pub total: u64,
    pub seconds_spent: f64,
}

impl SendResult {
    /// Parses `processed: 1; failed: 0; total: 1; seconds spent: 0.000055`. Unknown
    /// parts are ignored.
    pub fn parse(info: &str) -> Self {
        let mut result = SendResult::default();
        for part in info.split(';') {
            let Some((name, value)) = part.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match name.trim() {
                "processed" => result.processed = value.parse().unwrap_or_default(),
                "failed" => result.failed = value.parse().unwrap_or_default(),
                "total" => result.total = value.parse().unwrap_or_default(),
                "seconds spent" => result.seconds_spent = value.parse().unwrap_or_default(),
                _ => {}
            }
        }
        result
    }

    pub fn merge(&mut self, other: SendResult) {
        self.processed += other.processed;
        self.failed += other.failed;
        self.total += other.total;
        self.seconds_spent += other.seconds_spent;
    }
}

/// Frames a `sender data` request for `metrics`.
pub fn encode_request(metrics: &[ZabbixMetric], clock: i64) -> Result<Vec<u8>, SenderError> {
    let body = serde_json::to_vec(&SenderRequest {
        request: "sender data",
        data: metrics,
        clock,
    })?;

    let mut packet = Vec::with_capacity(HEADER_LEN + body.len());
    packet.extend_from_slice(HEADER);
    packet.extend_from_slice(&(body.len() as u64).to_le_bytes());
    packet.extend_from_slice(&body);
    Ok(packet)
}

/// Reads one framed packet and returns its payload.
pub fn read_packet(reader: &mut impl Read) -> Result<Vec<u8>, SenderError> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;
    if &header[..HEADER.len()] != HEADER {
        return Err(SenderError::InvalidHeader);
    }

    let mut length = [0u8; 8];
    length.copy_from_slice(&header[HEADER.len()..]);
    let length = u64::from_le_bytes(length);
    let length = usize::try_from(length)
        .ok()
        .filter(|_| length <= MAX_PAYLOAD)
        .ok_or(SenderError::PayloadTooLarge(length))?;
    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload)?;
    Ok(payload)
}

/// Decodes the trapper's answer. Anything but `"response": "success"` is a rejection of
/// the whole batch.
pub fn decode_response(payload: &[u8]) -> Result<SendResult, SenderError> {
    let response: SenderResponse = serde_json::from_slice(payload)?;
    if response.response != "success" {
        return Err(SenderError::Rejected(response.info));
    }
    Ok(SendResult::parse(&response.info))
}

pub(crate) fn exchange(stream: &mut (impl Read + Write), packet: &[u8]) -> Result<SendResult, SenderError> {
    stream.write_all(packet)?;
    stream.flush()?;
    decode_response(&read_packet(stream)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{
        json,
        Value,
    };

    #[test]
    fn frames_request_with_little_endian_length() {
        let metrics = [ZabbixMetric::new(
            "PowerMax 000197",
            "dellemc.pmax.perf.srp.hostios[SRP_1]",
            12.0,
            1_700_000_123,
        )];
        let packet = encode_request(&metrics, 1_700_000_200).unwrap();

        assert_eq!(&packet[..5], b"ZBXD\x01");
        let length = u64::from_le_bytes(packet[5..13].try_into().unwrap()) as usize;
        assert_eq!(length, packet.len() - 13);

        let body: Value = serde_json::from_slice(&packet[13..]).unwrap();
        assert_eq!(
            body,
            json!({
                "request": "sender data",
                "data": [{
                    "host": "PowerMax 000197",
                    "key": "dellemc.pmax.perf.srp.hostios[SRP_1]",
                    "value": "12",
                    "clock": 1_700_000_123,
                }],
                "clock": 1_700_000_200,
            })
        );
    }

    #[test]
    fn reads_back_a_framed_packet() {
        let packet = encode_request(&[], 0).unwrap();
        let payload = read_packet(&mut packet.as_slice()).unwrap();
        assert_eq!(payload, packet[13..].to_vec());
    }

    #[test]
    fn rejects_foreign_header() {
        let mut data: &[u8] = b"HTTP/1.1 400 Bad Request\r\n";
        assert!(matches!(read_packet(&mut data), Err(SenderError::InvalidHeader)));
    }

    #[test]
    fn oversized_length_is_refused_before_reading() {
        let mut data = HEADER.to_vec();
        data.extend_from_slice(&u64::MAX.to_le_bytes());
        let err = read_packet(&mut data.as_slice()).unwrap_err();
        assert!(matches!(err, SenderError::PayloadTooLarge(u64::MAX)));

        let mut data = HEADER.to_vec();
        data.extend_from_slice(&(MAX_PAYLOAD + 1).to_le_bytes());
        assert!(matches!(read_packet(&mut data.as_slice()), Err(SenderError::PayloadTooLarge(_))));
    }

    #[test]
    fn parses_trapper_summary() {
        let result = decode_response(
            br#"{"response":"success","info":"processed: 2; failed: 1; total: 3; seconds spent: 0.000055"}"#,
        )
        .unwrap();
        assert_eq!(
            result,
            SendResult {
                processed: 2,
                failed: 1,
                total: 3,
                seconds_spent: 0.000055,
            }
        );
    }

    #[test]
    fn failed_response_is_rejected() {
        let err = decode_response(br#"{"response":"failed","info":"host not found"}"#).unwrap_err();
        assert!(matches!(err, SenderError::Rejected(info) if info == "host not found"));
    }
}
