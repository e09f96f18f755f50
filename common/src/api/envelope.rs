use serde::{Deserialize, Serialize};

/// Response envelope shared by every control endpoint. `code` zero means
/// success and `data` carries the payload; any other code is a failure
/// described by `msg`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct Envelope<T> {
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            data: Some(data),
            msg: None,
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            code: 1,
            data: None,
            msg: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_omits_msg() {
        let body = serde_json::to_string(&Envelope::ok(7u32)).unwrap();
        assert_eq!(body, r#"{"code":0,"data":7}"#);
    }

    #[test]
    fn test_failure_omits_data() {
        let body = serde_json::to_string(&Envelope::<u32>::failure("nope")).unwrap();
        assert_eq!(body, r#"{"code":1,"msg":"nope"}"#);
    }

    #[test]
    fn test_decode_missing_fields() {
        let env: Envelope<u32> = serde_json::from_str(r#"{"code":0}"#).unwrap();
        assert_eq!(env.code, 0);
        assert!(env.data.is_none());
        assert!(env.msg.is_none());
    }
}
