use chrono::{DateTime, Local};
use serde_json::Value;
use std::fmt;

use crate::utils::format_timestamp;

/// 单次读取的解析结果：每次读取都被当作一条独立记录
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkRecord {
    Json {
        received_at: DateTime<Local>,
        value: Value,
    },
    Raw {
        received_at: DateTime<Local>,
        text: String,
    },
}

impl ChunkRecord {
    pub fn is_json(&self) -> bool {
        matches!(self, ChunkRecord::Json { .. })
    }

    pub fn received_at(&self) -> &DateTime<Local> {
        match self {
            ChunkRecord::Json { received_at, .. } | ChunkRecord::Raw { received_at, .. } => received_at,
        }
    }
}

impl fmt::Display for ChunkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkRecord::Json { received_at, value } => {
                write!(f, "[{}] Received JSON: {}", format_timestamp(received_at), value)
            }
            ChunkRecord::Raw { text, .. } => write!(f, "Received raw: {}", text.trim_end_matches(['\r', '\n'])),
        }
    }
}

/// UTF-8（有损）解码后尝试按 JSON 解析，失败则保留原文
pub fn interpret_chunk(bytes: &[u8], received_at: DateTime<Local>) -> ChunkRecord {
    let text = String::from_utf8_lossy(bytes);
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => ChunkRecord::Json { received_at, value },
        Err(_) => ChunkRecord::Raw {
            received_at,
            text: text.into_owned(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 15).unwrap()
    }

    #[test]
    fn valid_json_becomes_structured_line() {
        let record = interpret_chunk(br#"{"a":1}"#, at());
        assert_eq!(
            record,
            ChunkRecord::Json {
                received_at: at(),
                value: json!({"a": 1}),
            }
        );
        assert_eq!(record.to_string(), r#"[2024-05-01 12:30:15.000] Received JSON: {"a":1}"#);
    }

    #[test]
    fn malformed_json_is_kept_raw() {
        let record = interpret_chunk(b"{\"a\": 1\n", at());
        assert!(!record.is_json());
        assert_eq!(record.to_string(), "Received raw: {\"a\": 1");
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let record = interpret_chunk(&[0x68, 0x69, 0xff], at());
        match record {
            ChunkRecord::Raw { text, .. } => assert_eq!(text, "hi\u{fffd}"),
            other => panic!("unexpected record {:?}", other),
        }
    }

    #[test]
    fn trailing_newline_still_parses_as_json() {
        let record = interpret_chunk(b"[1, 2, 3]\n", at());
        assert!(record.is_json());
        assert_eq!(record.received_at(), &at());
    }
}
