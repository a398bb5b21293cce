use reqwest::StatusCode;
use serde::Serialize;

use super::Endpoint;

/// Доступ к FRWS.
/// Каждый вызов завершается один раз: телом ответа либо ошибкой.
pub trait Backend {
    fn get(&self, endpoint: &Endpoint) -> Result<String>;

    fn post_json<B: Serialize>(&self, endpoint: &Endpoint, payload: &B) -> Result<String>;
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Сессия отсутствует или истекла, FRWS ответил 401.
    #[error("unauthorized")]
    Unauthorized,

    #[error("got {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid session cookie")]
    InvalidCookie(#[from] reqwest::header::InvalidHeaderValue),

    #[error("transport")]
    Transport(#[from] reqwest::Error),
}
