use crate::error::AnalyzeError;
use serde_json::Value;
use url::Url;

/// A request whose URL parsed as absolute.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    /// As sent by the client; echoed back in the response.
    pub raw_url: String,
    pub url: Url,
}

/// Parse and validate a raw request body.
///
/// A `url` that is missing, `null`, `false`, `0` or empty counts as missing.
/// Any other non-string value is an invalid URL.
pub fn parse_request(body: &[u8]) -> Result<ValidatedRequest, AnalyzeError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| AnalyzeError::Body(e.to_string()))?;

    let url_value = match &value {
        Value::Object(map) => map.get("url"),
        Value::Null => {
            return Err(AnalyzeError::Body("request body must be a JSON object".into()));
        }
        _ => None,
    };

    match url_value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Err(AnalyzeError::MissingUrl),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(AnalyzeError::MissingUrl),
        Some(Value::String(s)) if s.is_empty() => Err(AnalyzeError::MissingUrl),
        Some(Value::String(s)) => validate_url(s),
        Some(other) => Err(AnalyzeError::InvalidUrl {
            input: other.to_string(),
            reason: "url must be a string".into(),
        }),
    }
}

/// Check that `raw` is a well-formed absolute URL.
pub fn validate_url(raw: &str) -> Result<ValidatedRequest, AnalyzeError> {
    match Url::parse(raw) {
        Ok(url) => Ok(ValidatedRequest {
            raw_url: raw.to_string(),
            url,
        }),
        Err(e) => Err(AnalyzeError::InvalidUrl {
            input: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn err(body: &str) -> AnalyzeError {
        parse_request(body.as_bytes()).unwrap_err()
    }

    #[test]
    fn accepts_absolute_url_and_keeps_raw_form() {
        let req = parse_request(br#"{"url": "https://Example.com"}"#).unwrap();
        assert_eq!(req.raw_url, "https://Example.com");
        assert_eq!(req.url.as_str(), "https://example.com/");
    }

    #[test]
    fn missing_like_values_are_required_errors() {
        for body in [
            "{}",
            r#"{"url": null}"#,
            r#"{"url": ""}"#,
            r#"{"url": false}"#,
            r#"{"url": 0}"#,
            r#"{"other": "https://example.com"}"#,
            "[]",
        ] {
            assert!(matches!(err(body), AnalyzeError::MissingUrl), "{body}");
        }
    }

    #[test]
    fn malformed_urls_are_invalid() {
        for body in [
            r#"{"url": "not a url"}"#,
            r#"{"url": "example.com"}"#,
            r#"{"url": "/relative/path"}"#,
            r#"{"url": "http://"}"#,
            r#"{"url": 42}"#,
            r#"{"url": true}"#,
        ] {
            assert!(matches!(err(body), AnalyzeError::InvalidUrl { .. }), "{body}");
        }
    }

    #[test]
    fn non_json_body_is_unclassified() {
        assert!(matches!(err("url=https://example.com"), AnalyzeError::Body(_)));
        assert!(matches!(err("null"), AnalyzeError::Body(_)));
    }
}
