//! Login redirect listener
//!
//! A one-shot local HTTP server that receives the browser redirect from
//! Monzo's auth page and hands its query parameters back to the login flow.
//! State validation happens in the session manager, not here.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;
use crate::Result;
use crate::error::Error;

const SUCCESS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Monzo Widget | Signed in</title>
    <style>
        body {
            background-color: #14233c;
            color: #f5f5f5;
            font-family: -apple-system, system-ui, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
            margin: 0;
            text-align: center;
        }
        h1 { color: #ff4f40; font-size: 24px; }
        p { color: #b8c2d1; line-height: 1.6; }
    </style>
</head>
<body>
    <div>
        <h1>Almost there</h1>
        <p>Approve access in the Monzo app on your phone,<br>then return to your terminal.</p>
    </div>
</body>
</html>"#;

const ERROR_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Monzo Widget | Sign in failed</title>
    <style>
        body {
            background-color: #14233c;
            color: #f5f5f5;
            font-family: -apple-system, system-ui, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            height: 100vh;
            margin: 0;
            text-align: center;
        }
        h1 { color: #ef4444; font-size: 24px; }
        p { color: #b8c2d1; line-height: 1.6; }
    </style>
</head>
<body>
    <div>
        <h1>Sign in failed</h1>
        <p>Something went wrong during sign in.<br>Check your terminal and try again.</p>
    </div>
</body>
</html>"#;

/// Query parameters of the login redirect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl RedirectParams {
    /// Parse an absolute redirect URI
    pub fn parse(uri: &str) -> Result<Self> {
        let url = Url::parse(uri)?;
        Ok(Self::from_url(&url))
    }

    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                "error_description" => params.error_description = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// The provider's error, if the user denied access or the request was invalid
    pub fn provider_error(&self) -> Option<Error> {
        self.error.as_ref().map(|err| {
            let description = self.error_description.as_deref().unwrap_or("Unknown error");
            Error::Callback(format!("Authorization failed: {} - {}", err, description))
        })
    }
}

/// Bind the callback listener on `127.0.0.1:{port}`
///
/// Bind before sending the user to Monzo so the redirect cannot arrive early.
pub async fn bind_callback(port: u16) -> Result<TcpListener> {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await
        .map_err(|e| Error::Callback(format!("Failed to start callback server on {}: {}", addr, e)))?;

    tracing::info!("Callback server listening on http://{}", addr);
    Ok(listener)
}

/// Serve requests on an already bound listener until the redirect arrives
///
/// Requests carrying neither `code` nor `error` (browser preconnects,
/// `/favicon.ico`) get a 404 and the listener keeps waiting.
pub async fn accept_redirect(listener: TcpListener) -> Result<RedirectParams> {
    loop {
        let (mut socket, _) = listener.accept().await
            .map_err(|e| Error::Callback(format!("Failed to accept connection: {}", e)))?;

        let mut buffer = vec![0u8; 4096];
        let n = match socket.read(&mut buffer).await {
            Ok(n) => n,
            Err(e) => {
                tracing::debug!("Failed to read callback request: {}", e);
                continue;
            }
        };

        let request = String::from_utf8_lossy(&buffer[..n]);
        let params = match parse_request(&request) {
            Ok(params) if params.code.is_some() || params.error.is_some() => params,
            _ => {
                tracing::debug!("Ignoring request without redirect parameters");
                respond(&mut socket, "404 Not Found", "").await;
                continue;
            }
        };

        if params.error.is_none() {
            respond(&mut socket, "200 OK", SUCCESS_HTML).await;
        } else {
            respond(&mut socket, "400 Bad Request", ERROR_HTML).await;
        }
        return Ok(params);
    }
}

async fn respond(socket: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );

    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// Extract redirect parameters from a raw HTTP request
fn parse_request(request: &str) -> Result<RedirectParams> {
    let first_line = request.lines().next()
        .ok_or_else(|| Error::Callback("Empty request".to_string()))?;

    // GET /callback?code=xxx&state=yyy HTTP/1.1
    let parts: Vec<&str> = first_line.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(Error::Callback("Invalid request format".to_string()));
    }

    let full_url = format!("http://localhost{}", parts[1]);
    let url = Url::parse(&full_url)
        .map_err(|e| Error::Callback(format!("Failed to parse callback URL: {}", e)))?;

    Ok(RedirectParams::from_url(&url))
}
