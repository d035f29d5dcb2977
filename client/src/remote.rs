//! HTTP access to the room service.
use std::sync::Arc;

use log::{debug, warn};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, StatusCode, Url};
use snafu::{OptionExt, ResultExt, Snafu};

use codeswap_game::error::RemoteError;
use codeswap_game::model::RoomCode;
use codeswap_game::protocol::{ErrorBody, Mutation, StatusResponse};
use codeswap_game::route::{self, Method};

use crate::settings;

/// The header the server expects the CSRF token in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Snafu)]
pub enum SetupError {
    #[snafu(display("invalid base url {:?}", url))]
    InvalidBaseUrl { url: String },

    #[snafu(display("could not build HTTP client: {}", source))]
    HttpClient { source: reqwest::Error },
}

/// A handle to the room service. Cheap to clone; clones share the connection
/// pool and the cookie jar.
#[derive(Clone)]
pub struct Remote {
    http: Client,
    base: Url,
    jar: Arc<Jar>,
    csrf_cookie: String,
}

impl Remote {
    pub fn new(settings: &settings::Remote) -> Result<Self, SetupError> {
        let base = Url::parse(&settings.base_url)
            .ok()
            .context(InvalidBaseUrlSnafu {
                url: settings.base_url.clone(),
            })?;
        let jar = Arc::new(Jar::default());
        for cookie in &settings.cookies {
            jar.add_cookie_str(cookie, &base);
        }
        let http = Client::builder()
            .cookie_provider(jar.clone())
            .build()
            .context(HttpClientSnafu)?;
        Ok(Remote {
            http,
            base,
            jar,
            csrf_cookie: settings.csrf_cookie.clone(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, RemoteError> {
        self.base.join(path).map_err(|e| RemoteError::Transient {
            reason: format!("bad path {}: {}", path, e),
        })
    }

    /// Fetch the status of a room.
    pub async fn status(&self, room: &RoomCode) -> Result<StatusResponse, RemoteError> {
        let url = self.url(&route::status_path(room))?;
        let response = self.http.get(url).send().await.map_err(transient)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound);
        }
        if !status.is_success() {
            return Err(RemoteError::Transient {
                reason: format!("status poll answered {}", status),
            });
        }
        response.json().await.map_err(transient)
    }

    /// Send a mutating request.
    ///
    /// Any 2xx counts as success and the body is ignored. Other answers are
    /// turned into `Rejected`, carrying the server's `error` message.
    pub async fn send(&self, room: &RoomCode, mutation: &Mutation) -> Result<(), RemoteError> {
        let (method, path) = route::mutation_endpoint(room, mutation);
        let url = self.url(&path)?;
        let request = match method {
            Method::Get => self.http.get(url),
            Method::Post => {
                let request = self.http.post(url);
                let request = match mutation {
                    Mutation::Swap(body) => request.json(body),
                    Mutation::StartGame | Mutation::ExitRoom => request.json(&serde_json::json!({})),
                    Mutation::TimeoutNotice | Mutation::ResetRoom => request,
                };
                match self.csrf_token() {
                    Some(token) => request.header(CSRF_HEADER, token),
                    None => {
                        warn!(
                            "no {} cookie, the server will likely refuse {:?}",
                            self.csrf_cookie, mutation
                        );
                        request
                    }
                }
            }
        };
        let response = request.send().await.map_err(transient)?;
        let status = response.status();
        if status.is_success() {
            debug!("{:?} accepted with {}", mutation, status);
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound);
        }
        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(RemoteError::Rejected {
            status: status.as_u16(),
            message: body.error.unwrap_or_else(|| "Unknown error".into()),
        })
    }

    /// The CSRF token, as currently held in the cookie jar.
    pub fn csrf_token(&self) -> Option<String> {
        let cookies = self.jar.cookies(&self.base)?;
        let cookies = cookies.to_str().ok()?;
        let prefix = format!("{}=", self.csrf_cookie);
        cookies
            .split("; ")
            .find_map(|c| c.strip_prefix(prefix.as_str()))
            .map(str::to_owned)
    }
}

fn transient(e: reqwest::Error) -> RemoteError {
    RemoteError::Transient {
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(cookies: &[&str]) -> Remote {
        Remote::new(&settings::Remote {
            base_url: "http://127.0.0.1:8000".into(),
            csrf_cookie: "csrftoken".into(),
            cookies: cookies.iter().map(|c| c.to_string()).collect(),
        })
        .expect("remote to build")
    }

    #[test]
    fn reads_csrf_token_from_jar() {
        let remote = remote(&["sessionid=s3ss10n", "csrftoken=abc123"]);
        assert_eq!(remote.csrf_token(), Some("abc123".into()));
    }

    #[test]
    fn missing_csrf_cookie() {
        let remote = remote(&["sessionid=s3ss10n"]);
        assert_eq!(remote.csrf_token(), None);
    }

    #[test]
    fn rejects_garbage_base_url() {
        let result = Remote::new(&settings::Remote {
            base_url: "not a url".into(),
            ..settings::Remote::default()
        });
        assert!(matches!(result, Err(SetupError::InvalidBaseUrl { .. })));
    }
}
