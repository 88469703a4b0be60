//! Blocking HTTP client (libcurl via the `curl` crate).
//!
//! Used for catalog JSON requests and file downloads. Every call runs in the
//! current thread; async callers wrap it in `spawn_blocking`.

use std::io::{self, Write};
use std::time::Duration;

use url::Url;

use crate::config::HttpConfig;

#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("invalid URL {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed")]
    Curl {
        url: String,
        #[source]
        source: curl::Error,
    },

    #[error("{url} returned HTTP {code}")]
    Status { url: String, code: u32 },

    #[error("writing response body from {url} failed")]
    Write {
        url: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    user_agent: String,
    connect_timeout: Duration,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(cfg: &HttpConfig) -> Self {
        Self {
            user_agent: cfg.user_agent.clone(),
            connect_timeout: cfg.connect_timeout(),
            timeout: cfg.timeout(),
        }
    }

    fn easy(&self, url: &Url) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        Ok(easy)
    }

    /// GET `url` and return the whole body.
    pub fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let target = request_url(url)?;
        let easy = self.easy(&target).map_err(|source| curl_error(url, source))?;
        self.collect(url, easy)
    }

    /// POST `body` as JSON to `url` and return the whole response body.
    pub fn post_json(&self, url: &str, body: &[u8]) -> Result<Vec<u8>, HttpError> {
        let target = request_url(url)?;
        let setup = || -> Result<curl::easy::Easy, curl::Error> {
            let mut easy = self.easy(&target)?;
            easy.post(true)?;
            easy.post_fields_copy(body)?;
            let mut list = curl::easy::List::new();
            list.append("Content-Type: application/json")?;
            list.append("Accept: application/json")?;
            easy.http_headers(list)?;
            Ok(easy)
        };
        let easy = setup().map_err(|source| curl_error(url, source))?;
        self.collect(url, easy)
    }

    /// GET `url`, streaming the body into `out`. Returns the number of bytes written.
    pub fn download_to<W: Write>(&self, url: &str, out: &mut W) -> Result<u64, HttpError> {
        let target = request_url(url)?;
        let mut easy = self.easy(&target).map_err(|source| curl_error(url, source))?;
        let mut written = 0u64;
        let mut write_error: Option<io::Error> = None;

        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match out.write_all(data) {
                    Ok(()) => {
                        written += data.len() as u64;
                        Ok(data.len())
                    }
                    Err(e) => {
                        write_error = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .and_then(|()| transfer.perform())
        };

        if let Some(source) = write_error {
            return Err(HttpError::Write {
                url: url.to_string(),
                source,
            });
        }
        performed.map_err(|source| curl_error(url, source))?;
        check_status(url, &mut easy)?;
        Ok(written)
    }

    fn collect(&self, url: &str, mut easy: curl::easy::Easy) -> Result<Vec<u8>, HttpError> {
        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .and_then(|()| transfer.perform())
                .map_err(|source| curl_error(url, source))?;
        }
        check_status(url, &mut easy)?;
        Ok(body)
    }
}

/// Parses `raw` into the form sent on the wire.
///
/// Catalog download links carry file names verbatim, spaces included; libcurl
/// rejects those, so reserved characters are percent-encoded here.
pub fn request_url(raw: &str) -> Result<Url, HttpError> {
    Url::parse(raw).map_err(|source| HttpError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

fn check_status(url: &str, easy: &mut curl::easy::Easy) -> Result<(), HttpError> {
    let code = easy.response_code().map_err(|source| curl_error(url, source))?;
    if !(200..300).contains(&code) {
        return Err(HttpError::Status {
            url: url.to_string(),
            code,
        });
    }
    Ok(())
}

fn curl_error(url: &str, source: curl::Error) -> HttpError {
    HttpError::Curl {
        url: url.to_string(),
        source,
    }
}
