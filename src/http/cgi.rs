use crate::app::App;
use crate::constants::limits::MAX_FORM_BODY_BYTES;
use crate::constants::network::JSON_CONTENT_TYPE;
use crate::errors::BridgeError;
use crate::services::request::IncomingRequest;
use crate::services::response::BridgeResponse;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// The CGI/1.1 meta-variables the bridge reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CgiEnv {
    pub method: String,
    pub query: String,
    pub content_type: Option<String>,
    pub content_length: u64,
}

impl CgiEnv {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            method: var("REQUEST_METHOD")
                .map(|m| m.trim().to_uppercase())
                .unwrap_or_else(|| "GET".to_string()),
            query: var("QUERY_STRING").unwrap_or_default(),
            content_type: var("CONTENT_TYPE").filter(|v| !v.trim().is_empty()),
            content_length: var("CONTENT_LENGTH")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(0),
        }
    }

    fn expects_body(&self) -> bool {
        self.method == "POST" && self.content_length > 0
    }
}

/// Reads at most `CONTENT_LENGTH` bytes of body and builds the request.
pub async fn read_request<R>(env: &CgiEnv, stdin: R) -> Result<IncomingRequest, BridgeError>
where
    R: AsyncRead + Unpin,
{
    let mut body = Vec::new();
    if env.expects_body() {
        if env.content_length > MAX_FORM_BODY_BYTES {
            return Err(BridgeError::MalformedRequest(format!(
                "body exceeds {} bytes",
                MAX_FORM_BODY_BYTES
            )));
        }
        stdin
            .take(env.content_length)
            .read_to_end(&mut body)
            .await
            .map_err(|err| BridgeError::MalformedRequest(err.to_string()))?;
    }
    IncomingRequest::from_http_parts(Some(&env.query), env.content_type.as_deref(), &body)
}

pub fn render(response: &BridgeResponse) -> String {
    format!(
        "Content-Type: {}\r\n\r\n{}\n",
        JSON_CONTENT_TYPE,
        response.to_json_pretty()
    )
}

/// Handles exactly one CGI request and writes the full reply.
pub async fn run<R, W>(
    app: &App,
    env: &CgiEnv,
    stdin: R,
    mut stdout: W,
) -> std::io::Result<BridgeResponse>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let parsed = read_request(env, stdin).await;
    let response = app.bridge.respond(parsed).await;
    stdout.write_all(render(&response).as_bytes()).await?;
    stdout.flush().await?;
    Ok(response)
}
