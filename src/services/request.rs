use crate::constants::network::FORM_CONTENT_TYPE;
use crate::constants::request::ACTION_KEY;
use crate::errors::BridgeError;
use std::collections::HashMap;

/// One caller request: the action plus every other parameter, untrusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingRequest {
    pub action: Option<String>,
    pub params: HashMap<String, String>,
}

impl IncomingRequest {
    pub fn new(action: Option<&str>) -> Self {
        Self {
            action: action.map(str::to_string),
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    /// Later pairs override earlier ones with the same name.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut request = Self::default();
        request.extend(pairs);
        request
    }

    pub fn extend<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in pairs {
            if key == ACTION_KEY {
                self.action = Some(value);
            } else {
                self.params.insert(key, value);
            }
        }
    }

    pub fn from_query(query: &str) -> Result<Self, BridgeError> {
        Ok(Self::from_pairs(parse_urlencoded(query)?))
    }

    /// Merges a form-encoded body over the query string.
    pub fn merge_form(&mut self, body: &str) -> Result<(), BridgeError> {
        self.extend(parse_urlencoded(body)?);
        Ok(())
    }

    /// Query string first, then a form-encoded body on top of it. Bodies of
    /// any other content type are ignored.
    pub fn from_http_parts(
        query: Option<&str>,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<Self, BridgeError> {
        let mut request = Self::from_query(query.unwrap_or(""))?;
        if !body.is_empty() && content_type.map(is_form_content_type).unwrap_or(false) {
            let text = std::str::from_utf8(body).map_err(|_| {
                BridgeError::MalformedRequest("form body is not valid UTF-8".to_string())
            })?;
            request.merge_form(text)?;
        }
        Ok(request)
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

fn is_form_content_type(value: &str) -> bool {
    value
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

fn parse_urlencoded(input: &str) -> Result<Vec<(String, String)>, BridgeError> {
    let trimmed = input.trim_start_matches('?');
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    serde_urlencoded::from_str::<Vec<(String, String)>>(trimmed)
        .map_err(|err| BridgeError::MalformedRequest(err.to_string()))
}
