use std::fs;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::error::FetchError;

/// Retrieves the text of a description document.
pub trait DocumentFetcher {
    fn fetch(&self, uri: &Url) -> Result<String, FetchError>;
}

impl<F: DocumentFetcher + ?Sized> DocumentFetcher for &F {
    fn fetch(&self, uri: &Url) -> Result<String, FetchError> {
        (**self).fetch(uri)
    }
}

/// Fetches `http`/`https` documents over the network and `file` documents
/// from disk.
pub struct DefaultFetcher {
    client: Client,
    auth_token: Option<String>,
    headers: Vec<(String, String)>,
}

impl DefaultFetcher {
    pub fn new(auth_token: Option<String>, headers: Vec<(String, String)>) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("swagger-pwsh/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Request)?;
        Ok(Self {
            client,
            auth_token,
            headers,
        })
    }

    fn fetch_http(&self, uri: &Url) -> Result<String, FetchError> {
        let mut req = self
            .client
            .get(uri.clone())
            .header("accept", "application/json");

        if let Some(token) = &self.auth_token {
            req = req.header("authorization", format!("Bearer {token}"));
        }

        for (k, v) in &self.headers {
            req = req.header(k, v);
        }

        let resp = req.send().map_err(FetchError::Request)?;
        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        resp.text().map_err(FetchError::Request)
    }
}

impl DocumentFetcher for DefaultFetcher {
    fn fetch(&self, uri: &Url) -> Result<String, FetchError> {
        debug!(%uri, "fetching description document");
        match uri.scheme() {
            "http" | "https" => self.fetch_http(uri),
            "file" => read_file(uri),
            other => Err(FetchError::UnsupportedScheme {
                scheme: other.to_string(),
            }),
        }
    }
}

fn read_file(uri: &Url) -> Result<String, FetchError> {
    let path = uri.to_file_path().map_err(|()| {
        FetchError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("not a local path: {uri}"),
        ))
    })?;
    fs::read_to_string(path).map_err(FetchError::Io)
}
