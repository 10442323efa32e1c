use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The backend reply wrapper: a business status `code` (distinct from the
/// HTTP status), a human-readable `msg`, and the actual payload in `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendEnvelope {
    #[serde(deserialize_with = "code_as_string")]
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Value,
}

// Some deployments emit numeric codes; classification compares strings.
fn code_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(i64),
    }

    Ok(match Code::deserialize(deserializer)? {
        Code::Text(text) => text,
        Code::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_string_code() {
        let envelope: BackendEnvelope =
            serde_json::from_value(json!({ "code": "0000", "msg": "ok", "data": { "id": 1 } }))
                .unwrap();
        assert_eq!(envelope.code, "0000");
        assert_eq!(envelope.msg, "ok");
        assert_eq!(envelope.data["id"], 1);
    }

    #[test]
    fn normalizes_numeric_code() {
        let envelope: BackendEnvelope =
            serde_json::from_value(json!({ "code": 4002, "msg": "expired" })).unwrap();
        assert_eq!(envelope.code, "4002");
        assert!(envelope.data.is_null());
    }

    #[test]
    fn missing_msg_defaults_to_empty() {
        let envelope: BackendEnvelope = serde_json::from_value(json!({ "code": "1000" })).unwrap();
        assert!(envelope.msg.is_empty());
    }
}
