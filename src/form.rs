use enum_iterator::all;
use serde::{Deserialize, Serialize};

use crate::model::{
    tag, AgentSign, ChangeReason, Choice, FiscalProperty, PropertyValue, RegistrationData,
    RegistrationPayload, TaxSystem,
};

/// Все поля формы регистрации ККТ.
/// Порядок вариантов совпадает с порядком реквизитов в отправляемых данных.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    std::hash::Hash,
    derive_more::Display,
    enum_iterator::Sequence,
)]
pub enum FieldId {
    #[display(fmt = "payment-address")]
    PaymentAddress,
    #[display(fmt = "inn")]
    UserInn,
    #[display(fmt = "cashier")]
    Cashier,
    #[display(fmt = "user-name")]
    UserName,
    #[display(fmt = "payment-place")]
    PaymentPlace,
    #[display(fmt = "register-number")]
    RegisterNumber,
    #[display(fmt = "offline-mode")]
    OfflineMode,
    #[display(fmt = "ofd-inn")]
    OfdInn,
    #[display(fmt = "ofd-name")]
    OfdName,
    #[display(fmt = "fns-site")]
    FnsSite,
    #[display(fmt = "sender-email")]
    SenderEmail,
    #[display(fmt = "encryption")]
    Encryption,
    #[display(fmt = "automatic-mode")]
    AutomaticMode,
    #[display(fmt = "automat-number")]
    AutomatNumber,
    #[display(fmt = "services")]
    Services,
    #[display(fmt = "bso")]
    Bso,
    #[display(fmt = "internet")]
    Internet,
    #[display(fmt = "lottery")]
    Lottery,
    #[display(fmt = "gambling")]
    Gambling,
    #[display(fmt = "excise")]
    Excise,
    #[display(fmt = "tax-system")]
    TaxSystem,
}

/// Вид элемента управления, из которого берётся значение поля.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Text,
    Checkbox,
    Select,
}

/// Когда поле обязательно для заполнения.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Always,
    /// Только если не включён автономный режим.
    Online,
    Optional,
}

impl FieldId {
    pub fn tag(self) -> u32 {
        match self {
            Self::PaymentAddress => tag::PAYMENT_ADDRESS,
            Self::UserInn => tag::USER_INN,
            Self::Cashier => tag::CASHIER,
            Self::UserName => tag::USER_NAME,
            Self::PaymentPlace => tag::PAYMENT_PLACE,
            Self::RegisterNumber => tag::REGISTER_NUMBER,
            Self::OfflineMode => tag::OFFLINE_MODE,
            Self::OfdInn => tag::OFD_INN,
            Self::OfdName => tag::OFD_NAME,
            Self::FnsSite => tag::FNS_SITE,
            Self::SenderEmail => tag::SENDER_EMAIL,
            Self::Encryption => tag::ENCRYPTION,
            Self::AutomaticMode => tag::AUTOMATIC_MODE,
            Self::AutomatNumber => tag::AUTOMAT_NUMBER,
            Self::Services => tag::SERVICES,
            Self::Bso => tag::BSO,
            Self::Internet => tag::INTERNET,
            Self::Lottery => tag::LOTTERY,
            Self::Gambling => tag::GAMBLING,
            Self::Excise => tag::EXCISE,
            Self::TaxSystem => tag::TAX_SYSTEMS,
        }
    }

    pub fn control(self) -> Control {
        match self {
            Self::OfflineMode
            | Self::Encryption
            | Self::AutomaticMode
            | Self::Services
            | Self::Bso
            | Self::Internet
            | Self::Lottery
            | Self::Gambling
            | Self::Excise => Control::Checkbox,
            Self::TaxSystem => Control::Select,
            _ => Control::Text,
        }
    }

    pub fn requirement(self) -> Requirement {
        match self {
            Self::PaymentAddress
            | Self::UserInn
            | Self::Cashier
            | Self::UserName
            | Self::PaymentPlace
            | Self::RegisterNumber => Requirement::Always,
            Self::OfdInn | Self::OfdName | Self::FnsSite | Self::SenderEmail => {
                Requirement::Online
            }
            _ => Requirement::Optional,
        }
    }

    /// Подпись поля для пользователя.
    pub fn label(self) -> &'static str {
        match self {
            Self::PaymentAddress => "Адрес расчётов",
            Self::UserInn => "ИНН пользователя",
            Self::Cashier => "Кассир",
            Self::UserName => "Наименование пользователя",
            Self::PaymentPlace => "Место расчётов",
            Self::RegisterNumber => "Регистрационный номер ККТ",
            Self::OfflineMode => "Автономный режим",
            Self::OfdInn => "ИНН ОФД",
            Self::OfdName => "Наименование ОФД",
            Self::FnsSite => "Адрес сайта ФНС",
            Self::SenderEmail => "Адрес электронной почты отправителя чека",
            Self::Encryption => "Шифрование",
            Self::AutomaticMode => "Автоматический режим",
            Self::AutomatNumber => "Номер автомата",
            Self::Services => "Расчёты за услуги",
            Self::Bso => "Бланки строгой отчётности",
            Self::Internet => "Расчёты в сети Интернет",
            Self::Lottery => "Проведение лотерей",
            Self::Gambling => "Проведение азартных игр",
            Self::Excise => "Продажа подакцизного товара",
            Self::TaxSystem => "Система налогообложения",
        }
    }
}

/// Снимок состояния формы регистрации на момент отправки.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FormSnapshot {
    pub payment_address: String,
    pub user_inn: String,
    pub cashier: String,
    pub user_name: String,
    pub payment_place: String,
    pub register_number: String,
    pub offline_mode: bool,
    pub ofd_inn: String,
    pub ofd_name: String,
    pub fns_site: String,
    pub sender_email: String,
    pub encryption: bool,
    pub automatic_mode: bool,
    pub automat_number: String,
    pub services: bool,
    pub bso: bool,
    pub internet: bool,
    pub lottery: bool,
    pub gambling: bool,
    pub excise: bool,
    pub tax_system: TaxSystem,

    /// Режим проверки: документ только печатается.
    pub check_mode: bool,
}

impl FormSnapshot {
    /// Текст поля, если это текстовое поле.
    pub fn text(&self, field: FieldId) -> Option<&str> {
        let value = match field {
            FieldId::PaymentAddress => &self.payment_address,
            FieldId::UserInn => &self.user_inn,
            FieldId::Cashier => &self.cashier,
            FieldId::UserName => &self.user_name,
            FieldId::PaymentPlace => &self.payment_place,
            FieldId::RegisterNumber => &self.register_number,
            FieldId::OfdInn => &self.ofd_inn,
            FieldId::OfdName => &self.ofd_name,
            FieldId::FnsSite => &self.fns_site,
            FieldId::SenderEmail => &self.sender_email,
            FieldId::AutomatNumber => &self.automat_number,
            _ => return None,
        };
        Some(value)
    }

    pub fn text_mut(&mut self, field: FieldId) -> Option<&mut String> {
        let value = match field {
            FieldId::PaymentAddress => &mut self.payment_address,
            FieldId::UserInn => &mut self.user_inn,
            FieldId::Cashier => &mut self.cashier,
            FieldId::UserName => &mut self.user_name,
            FieldId::PaymentPlace => &mut self.payment_place,
            FieldId::RegisterNumber => &mut self.register_number,
            FieldId::OfdInn => &mut self.ofd_inn,
            FieldId::OfdName => &mut self.ofd_name,
            FieldId::FnsSite => &mut self.fns_site,
            FieldId::SenderEmail => &mut self.sender_email,
            FieldId::AutomatNumber => &mut self.automat_number,
            _ => return None,
        };
        Some(value)
    }

    /// Состояние чекбокса, если это чекбокс.
    pub fn flag(&self, field: FieldId) -> Option<bool> {
        let value = match field {
            FieldId::OfflineMode => self.offline_mode,
            FieldId::Encryption => self.encryption,
            FieldId::AutomaticMode => self.automatic_mode,
            FieldId::Services => self.services,
            FieldId::Bso => self.bso,
            FieldId::Internet => self.internet,
            FieldId::Lottery => self.lottery,
            FieldId::Gambling => self.gambling,
            FieldId::Excise => self.excise,
            _ => return None,
        };
        Some(value)
    }

    pub fn flag_mut(&mut self, field: FieldId) -> Option<&mut bool> {
        let value = match field {
            FieldId::OfflineMode => &mut self.offline_mode,
            FieldId::Encryption => &mut self.encryption,
            FieldId::AutomaticMode => &mut self.automatic_mode,
            FieldId::Services => &mut self.services,
            FieldId::Bso => &mut self.bso,
            FieldId::Internet => &mut self.internet,
            FieldId::Lottery => &mut self.lottery,
            FieldId::Gambling => &mut self.gambling,
            FieldId::Excise => &mut self.excise,
            _ => return None,
        };
        Some(value)
    }

    fn value(&self, field: FieldId) -> PropertyValue {
        if let Some(text) = self.text(field) {
            return text.into();
        }

        if let Some(flag) = self.flag(field) {
            return flag.into();
        }

        self.tax_system.bit().into()
    }

    fn is_required(&self, field: FieldId) -> bool {
        match field.requirement() {
            Requirement::Always => true,
            Requirement::Online => !self.offline_mode,
            Requirement::Optional => false,
        }
    }
}

/// Причины перерегистрации, выбранные на форме.
#[derive(Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ReasonSnapshot {
    pub agent_sign: AgentSign,
    pub change_reason: ChangeReason,
}

pub type CollectResult = std::result::Result<RegistrationPayload, MissingFields>;

/// Не заполнены обязательные поля.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("required fields are empty: {}", join_fields(.0))]
pub struct MissingFields(pub Vec<FieldId>);

impl MissingFields {
    pub fn fields(&self) -> &[FieldId] {
        &self.0
    }
}

fn join_fields(fields: &[FieldId]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Собирает данные для регистрации ККТ.
///
/// Каждое обязательное поле проверяется независимо, поэтому в ошибке
/// перечислены все незаполненные поля сразу.
pub fn collect_register_data(form: &FormSnapshot) -> CollectResult {
    let missing: Vec<FieldId> = all::<FieldId>()
        .filter(|f| form.is_required(*f))
        .filter(|f| form.text(*f).is_some_and(str::is_empty))
        .collect();

    if !missing.is_empty() {
        return Err(MissingFields(missing));
    }

    let fiscprops = all::<FieldId>()
        .map(|f| FiscalProperty {
            tag: f.tag(),
            value: form.value(f),
        })
        .collect();

    Ok(RegistrationPayload {
        print_only: u8::from(form.check_mode),
        data: RegistrationData { fiscprops },
    })
}

/// Собирает данные для перерегистрации ККТ: те же реквизиты, что и при
/// регистрации, плюс признак агента и код причины перерегистрации.
pub fn collect_re_register_data(form: &FormSnapshot, reasons: &ReasonSnapshot) -> CollectResult {
    let mut payload = collect_register_data(form)?;

    payload
        .data
        .fiscprops
        .push(FiscalProperty::new(tag::AGENT_SIGN, reasons.agent_sign.bit()));
    payload
        .data
        .fiscprops
        .push(FiscalProperty::new(tag::CHANGE_REASON, reasons.change_reason.bit()));

    Ok(payload)
}
