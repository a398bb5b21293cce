use std::{path::PathBuf, time::Duration};

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

use crate::form::{FormSnapshot, ReasonSnapshot};
use resolve_path::PathResolveExt;

#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    /// Адрес, по которому доступен FRWS.
    pub base_url: String,

    /// Путь до файла с состоянием.
    pub state_path: PathBuf,

    /// Таймаут на подключение и на весь запрос, в секундах.
    pub timeout_secs: u64,

    /// Имя cookie, в которой FRWS хранит сессию.
    pub session_cookie: String,

    /// Значения формы регистрации по-умолчанию.
    pub form: FormSnapshot,

    /// Причины перерегистрации по-умолчанию.
    pub reasons: ReasonSnapshot,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/".to_owned(),
            state_path: PathBuf::from("./state.json"),
            timeout_secs: 5,
            session_cookie: "JSESSIONID".to_owned(),
            form: FormSnapshot::default(),
            reasons: ReasonSnapshot::default(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Загружает конфигурацию.
pub fn load(path: PathBuf) -> anyhow::Result<Config> {
    let mut cfg: Config = confy::load_path(path)?;

    normalize(&mut cfg)?;

    Ok(cfg)
}

pub fn normalize(cfg: &mut Config) -> anyhow::Result<()> {
    // Чтобы правильно обработать относительные пути.
    cfg.state_path = cfg.state_path.try_resolve()?.into_owned();

    reqwest::Url::parse(&cfg.base_url).map_err(|e| anyhow!("base_url: {}", e))?;

    // Пути методов FRWS относительные, поэтому адрес должен заканчиваться на "/".
    if !cfg.base_url.ends_with('/') {
        cfg.base_url.push('/');
    }

    if cfg.timeout_secs == 0 {
        return Err(anyhow!("timeout_secs: should be greater than zero"));
    }

    Ok(())
}
