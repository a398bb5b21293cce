use std::{fs, io, path::Path};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Состояние приложения.
/// Хранит данные которые нужны между разными запусками приложения.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct State {
    /// Сессия FRWS, если пользователь уже аутентифицирован.
    pub session: Option<Session>,
}

/// Сессия FRWS.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Session {
    /// Значение cookie сессии.
    value: String,

    /// Когда сессия была сохранена.
    saved_at: DateTime<Utc>,
}

impl Session {
    /// Создаёт новый инстанс сессии.
    pub fn new(value: String) -> SessionNewResult {
        let value = value.trim().to_owned();
        if value.is_empty() {
            return Err(SessionNewError::EmptyValue);
        }

        Ok(Self {
            value,
            saved_at: Utc::now(),
        })
    }

    /// Значение для заголовка Cookie.
    /// Если сохранена целая пара с тем же именем cookie, она используется как есть.
    pub fn cookie(&self, name: &str) -> String {
        if self.value.starts_with(&format!("{}=", name)) {
            return self.value.clone();
        }
        format!("{}={}", name, self.value)
    }

    pub fn saved_at(&self) -> DateTime<Utc> {
        self.saved_at
    }
}

pub type SessionNewResult = std::result::Result<Session, SessionNewError>;

#[derive(Debug, thiserror::Error)]
pub enum SessionNewError {
    #[error("value is empty")]
    EmptyValue,
}

/// Загружает состояние приложения из указанного файла.
pub fn load(path: &Path) -> LoadResult {
    if !path.exists() {
        return Ok(State::default());
    }

    let path = path.canonicalize()?;

    let content = fs::read_to_string(path)?;

    let state: State = serde_json::from_str(&content)?;

    Ok(state)
}

pub type LoadResult = std::result::Result<State, LoadError>;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("read state file")]
    ReadFile(#[from] io::Error),

    #[error("deserialize")]
    Deserialize(#[from] serde_json::Error),
}

/// Сохраняет состояние приложения в указанный файл.
pub fn save(state: &State, path: &Path) -> SaveResult {
    let content = serde_json::to_string(state)?;

    fs::create_dir_all(path.parent().unwrap_or(Path::new("")))?;

    fs::write(path, content)?;

    Ok(())
}

pub type SaveResult = std::result::Result<(), SaveError>;

#[derive(thiserror::Error, Debug)]
pub enum SaveError {
    #[error("write state file")]
    WriteFile(#[from] io::Error),

    #[error("serialize")]
    Serialize(#[from] serde_json::Error),
}
