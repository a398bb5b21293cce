use enum_iterator::all;
use inquire::{Confirm, Password, Select, Text};

use crate::{
    form::{Control, FieldId, FormSnapshot, ReasonSnapshot},
    model::Choice,
};

/// Запрашивает значения всех полей формы регистрации.
/// Значения из `preset` предлагаются по-умолчанию.
pub fn ask_form(preset: &FormSnapshot) -> anyhow::Result<FormSnapshot> {
    let mut form = preset.clone();

    for field in all::<FieldId>() {
        match field.control() {
            Control::Text => {
                if let Some(value) = form.text_mut(field) {
                    *value = ask_text(field.label(), value)?;
                }
            }
            Control::Checkbox => {
                if let Some(value) = form.flag_mut(field) {
                    *value = ask_flag(field.label(), *value)?;
                }
            }
            Control::Select => {
                form.tax_system = ask_choice(field.label(), form.tax_system)?;
            }
        }
    }

    form.check_mode = ask_flag("Режим проверки (только печать)", form.check_mode)?;

    Ok(form)
}

/// Запрашивает причины перерегистрации.
pub fn ask_reasons(preset: &ReasonSnapshot) -> anyhow::Result<ReasonSnapshot> {
    Ok(ReasonSnapshot {
        agent_sign: ask_choice("Признак агента", preset.agent_sign)?,
        change_reason: ask_choice("Причина перерегистрации", preset.change_reason)?,
    })
}

/// Запрашивает значение cookie сессии, не показывая его на экране.
pub fn ask_session() -> anyhow::Result<String> {
    let value = Password::new("Значение cookie сессии")
        .without_confirmation()
        .prompt()?;

    Ok(value)
}

// Обязательность полей здесь не проверяется: пустые поля отмечает форма
// при отправке.
fn ask_text(title: &str, default: &str) -> anyhow::Result<String> {
    let mut prompt = Text::new(title);

    if !default.is_empty() {
        prompt = prompt.with_default(default);
    }

    Ok(prompt.prompt()?)
}

fn ask_flag(title: &str, default: bool) -> anyhow::Result<bool> {
    Ok(Confirm::new(title).with_default(default).prompt()?)
}

fn ask_choice<C: Choice>(title: &str, current: C) -> anyhow::Result<C> {
    let answer = Select::new(title, C::OPTIONS.to_vec())
        .with_starting_cursor(current.index())
        .raw_prompt()?;

    C::from_index(answer.index)
}
