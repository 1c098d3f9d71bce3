use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{AttendanceError, AttendanceResult};

/// The structured record a participant submits when scanning.
///
/// Only `session_code` takes part in validation. The descriptive fields are
/// informational and never override the stored session.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScanPayload {
    #[serde(default, alias = "qrCodeId")]
    pub session_code: Option<String>,
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub unit_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ScanPayload {
    /// Accepts either a JSON object or a string holding an encoded object.
    pub fn parse(raw: &Value) -> AttendanceResult<Self> {
        let object = match raw {
            Value::Object(_) => raw.clone(),
            Value::String(text) => serde_json::from_str::<Value>(text)
                .map_err(|e| AttendanceError::MalformedInput(e.to_string()))?,
            Value::Null => {
                return Err(AttendanceError::MalformedInput("payload is missing".into()));
            }
            _ => {
                return Err(AttendanceError::MalformedInput(
                    "payload must be an object".into(),
                ));
            }
        };

        if !object.is_object() {
            return Err(AttendanceError::MalformedInput(
                "payload must be an object".into(),
            ));
        }

        let mut payload: ScanPayload = serde_json::from_value(object)
            .map_err(|e| AttendanceError::MalformedInput(e.to_string()))?;

        let code = payload
            .session_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AttendanceError::MalformedInput("session code is empty".into()))?
            .to_string();

        payload.session_code = Some(code);
        Ok(payload)
    }

    pub fn code(&self) -> &str {
        self.session_code.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parses_object_and_encoded_string() {
        let object = json!({ "sessionCode": "QR_ABC", "unitCode": "CS301" });
        let parsed = ScanPayload::parse(&object).unwrap();
        assert_eq!(parsed.code(), "QR_ABC");
        assert_eq!(parsed.unit_code.as_deref(), Some("CS301"));

        let encoded = Value::String(r#"{"sessionCode":" QR_DEF ","topic":"joins"}"#.into());
        let parsed = ScanPayload::parse(&encoded).unwrap();
        assert_eq!(parsed.code(), "QR_DEF");
        assert_eq!(parsed.extra.get("topic"), Some(&json!("joins")));
    }

    #[test]
    fn accepts_legacy_code_field() {
        let parsed = ScanPayload::parse(&json!({ "qrCodeId": "QR_OLD" })).unwrap();
        assert_eq!(parsed.code(), "QR_OLD");
    }

    #[test]
    fn rejects_missing_or_blank_code() {
        let cases = [
            json!({}),
            json!({ "sessionCode": "" }),
            json!({ "sessionCode": "   " }),
            json!({ "sessionCode": 42 }),
            json!("not json at all"),
            json!("[1, 2]"),
            json!(17),
            Value::Null,
        ];

        for raw in cases {
            let err = ScanPayload::parse(&raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedInput, "payload {raw}");
        }
    }
}
