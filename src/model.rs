use anyhow::anyhow;
use serde::Serialize;

use crate::newtype;

/// Номера фискальных реквизитов (тегов) ФФД, которые используются при
/// регистрации и перерегистрации ККТ.
pub mod tag {
    pub const AUTOMATIC_MODE: u32 = 1001;
    pub const OFFLINE_MODE: u32 = 1002;
    pub const PAYMENT_ADDRESS: u32 = 1009;
    pub const OFD_INN: u32 = 1017;
    pub const USER_INN: u32 = 1018;
    pub const CASHIER: u32 = 1021;
    pub const AUTOMAT_NUMBER: u32 = 1036;
    pub const REGISTER_NUMBER: u32 = 1037;
    pub const OFD_NAME: u32 = 1046;
    pub const USER_NAME: u32 = 1048;
    pub const ENCRYPTION: u32 = 1056;
    pub const AGENT_SIGN: u32 = 1057;
    pub const FNS_SITE: u32 = 1060;
    pub const TAX_SYSTEMS: u32 = 1062;
    pub const INTERNET: u32 = 1108;
    pub const SERVICES: u32 = 1109;
    pub const BSO: u32 = 1110;
    pub const SENDER_EMAIL: u32 = 1117;
    pub const LOTTERY: u32 = 1126;
    pub const PAYMENT_PLACE: u32 = 1187;
    pub const GAMBLING: u32 = 1193;
    pub const CHANGE_REASON: u32 = 1205;
    pub const EXCISE: u32 = 1207;
}

/// Данные для регистрации (перерегистрации) ККТ в том виде, в котором их
/// принимает FRWS.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    /// 1 если документ нужно только напечатать (режим проверки), иначе 0.
    pub print_only: u8,

    pub data: RegistrationData,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RegistrationData {
    /// Фискальные реквизиты в порядке следования полей формы.
    pub fiscprops: Vec<FiscalProperty>,
}

/// Один фискальный реквизит.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FiscalProperty {
    pub tag: u32,
    pub value: PropertyValue,
}

impl FiscalProperty {
    pub fn new(tag: u32, value: impl Into<PropertyValue>) -> Self {
        Self {
            tag,
            value: value.into(),
        }
    }
}

/// Значение реквизита: строка из текстового поля либо число для флагов и
/// битовых масок.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(u64),
    Text(String),
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Number(u64::from(value))
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Выбор одного варианта из фиксированного списка.
/// В реквизит уходит бит с номером выбранного варианта.
pub trait Choice: Sized {
    /// Подписи вариантов в порядке их индексов.
    const OPTIONS: &'static [&'static str];

    fn index(&self) -> usize;

    fn from_index(index: usize) -> anyhow::Result<Self>;

    fn bit(&self) -> u64 {
        1 << self.index()
    }
}

pub const TAX_SYSTEM_OPTIONS: &[&str] = &[
    "ОСН",
    "УСН доход",
    "УСН доход минус расход",
    "ЕНВД",
    "ЕСХН",
    "Патентная система",
];

pub const AGENT_SIGN_OPTIONS: &[&str] = &[
    "Банковский платёжный агент",
    "Банковский платёжный субагент",
    "Платёжный агент",
    "Платёжный субагент",
    "Поверенный",
    "Комиссионер",
    "Агент",
];

pub const CHANGE_REASON_OPTIONS: &[&str] = &[
    "Замена ФН",
    "Замена ОФД",
    "Изменение наименования пользователя",
    "Изменение адреса или места расчётов",
    "Перевод из автономного режима в режим передачи данных",
    "Перевод из режима передачи данных в автономный режим",
    "Изменение версии модели ККТ",
    "Изменение перечня систем налогообложения",
    "Изменение номера автоматического устройства",
    "Перевод из автоматического режима в неавтоматический",
    "Перевод из неавтоматического режима в автоматический",
    "Перевод в режим БСО",
    "Перевод из режима БСО",
    "Перевод из режима расчётов в сети Интернет",
    "Перевод в режим расчётов в сети Интернет",
    "Перевод в режим платёжного агента",
    "Перевод из режима платёжного агента",
    "Перевод в режим азартных игр",
    "Перевод из режима азартных игр",
    "Перевод в режим лотерей",
    "Перевод из режима лотерей",
    "Изменение версии ФФД",
];

newtype!(TaxSystem, usize, "usize", tax_system_validate);

fn tax_system_validate(value: &usize) -> anyhow::Result<()> {
    option_validate(*value, TAX_SYSTEM_OPTIONS)
}

newtype!(AgentSign, usize, "usize", agent_sign_validate);

fn agent_sign_validate(value: &usize) -> anyhow::Result<()> {
    option_validate(*value, AGENT_SIGN_OPTIONS)
}

newtype!(ChangeReason, usize, "usize", change_reason_validate);

fn change_reason_validate(value: &usize) -> anyhow::Result<()> {
    option_validate(*value, CHANGE_REASON_OPTIONS)
}

fn option_validate(value: usize, options: &[&str]) -> anyhow::Result<()> {
    if value >= options.len() {
        return Err(anyhow!(
            "option index {} is out of range, expected less than {}",
            value,
            options.len()
        ));
    }

    Ok(())
}

impl Choice for TaxSystem {
    const OPTIONS: &'static [&'static str] = TAX_SYSTEM_OPTIONS;

    fn index(&self) -> usize {
        self.get()
    }

    fn from_index(index: usize) -> anyhow::Result<Self> {
        Self::new(index)
    }
}

impl Choice for AgentSign {
    const OPTIONS: &'static [&'static str] = AGENT_SIGN_OPTIONS;

    fn index(&self) -> usize {
        self.get()
    }

    fn from_index(index: usize) -> anyhow::Result<Self> {
        Self::new(index)
    }
}

impl Choice for ChangeReason {
    const OPTIONS: &'static [&'static str] = CHANGE_REASON_OPTIONS;

    fn index(&self) -> usize {
        self.get()
    }

    fn from_index(index: usize) -> anyhow::Result<Self> {
        Self::new(index)
    }
}

newtype!(DocumentId, String, "String", document_id_validate);

fn document_id_validate(value: &str) -> anyhow::Result<()> {
    if value.is_empty() {
        return Err(anyhow!("shouldn't be empty"));
    }

    if value == "." || value == ".." {
        return Err(anyhow!("shouldn't be a relative path segment"));
    }

    // Любой из этих символов уводит запрос на другой путь.
    if let Some(c) = value.chars().find(|c| matches!(c, '/' | '\\' | '?' | '#' | '%')) {
        return Err(anyhow!("shouldn't contain '{}'", c));
    }

    Ok(())
}
