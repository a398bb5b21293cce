use std::time::Duration;

use log::debug;
use reqwest::{
    header::{self, HeaderMap, HeaderValue},
    Method, StatusCode,
};
use serde::Serialize;

use super::{Backend, Endpoint, Error, Result};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Клиент FRWS поверх HTTP.
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpBackend {
    /// Создаёт новый инстанс клиента.
    ///
    /// `base_url` должен заканчиваться на `/`, `cookie` передаётся в каждом
    /// запросе как есть (`NAME=value`).
    pub fn new(base_url: String, timeout: Duration, cookie: Option<String>) -> Result<Self> {
        let client = builder(timeout, cookie)?.build()?;

        Ok(Self { client, base_url })
    }

    fn request<B: Serialize>(
        &self,
        http_method: Method,
        endpoint: &Endpoint,
        payload: Option<&B>,
    ) -> Result<String> {
        let url = build_url(&self.base_url, &endpoint.path());
        let mut req_builder = self.client.request(http_method.clone(), &url);

        if let Some(b) = payload {
            req_builder = req_builder.json(b)
        }

        debug!("Запрос в FRWS: {} {}", http_method, url);
        let resp = req_builder.send()?;

        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        if !status.is_success() {
            let body = resp.text()?;
            return Err(Error::Status { status, body });
        }

        let body = resp.text()?;

        debug!("Тело ответа на {}: {}", url, body);

        Ok(body)
    }
}

impl Backend for HttpBackend {
    fn get(&self, endpoint: &Endpoint) -> Result<String> {
        self.request::<()>(Method::GET, endpoint, None)
    }

    fn post_json<B: Serialize>(&self, endpoint: &Endpoint, payload: &B) -> Result<String> {
        self.request(Method::POST, endpoint, Some(payload))
    }
}

fn builder(timeout: Duration, cookie: Option<String>) -> Result<reqwest::blocking::ClientBuilder> {
    let mut headers = HeaderMap::new();

    if let Some(c) = cookie {
        let mut value = HeaderValue::from_str(&c)?;
        value.set_sensitive(true);
        headers.insert(header::COOKIE, value);
    }

    Ok(reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout))
}

#[inline]
fn build_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
