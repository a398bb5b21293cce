use log::warn;

use crate::{
    form::FieldId,
    view::{Element, Fragment, Region, View},
};

const INFO_LABEL: &str = "Режим проверки: документ только напечатан, данные в ФН не записаны.";

/// Вывод панели управления в терминал.
pub struct TerminalView {
    base_url: String,
}

impl TerminalView {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

impl View for TerminalView {
    fn replace(&mut self, region: Region, fragment: Fragment) {
        println!("[{}]", region);
        println!("{}", fragment.markup());
    }

    fn navigate(&mut self, location: &str) {
        let url = resolve(&self.base_url, location);

        println!("Требуется аутентификация: {}", url);

        match cli_clipboard::set_contents(url) {
            Ok(()) => println!("Адрес скопирован в буфер обмена"),
            Err(e) => warn!("Не удалось скопировать адрес в буфер обмена: {}", e),
        }
    }

    // Отметки выводятся сразу, снимать нечего.
    fn clear_invalid(&mut self) {}

    fn mark_invalid(&mut self, field: FieldId) {
        eprintln!("Не заполнено поле \"{}\" ({})", field.label(), field);
    }

    fn set_visible(&mut self, element: Element, visible: bool) {
        match element {
            Element::InfoLabel if visible => println!("{}", INFO_LABEL),
            Element::InfoLabel => {}
        }
    }
}

/// Абсолютный адрес для перехода относительно адреса FRWS.
fn resolve(base_url: &str, location: &str) -> String {
    reqwest::Url::parse(base_url)
        .and_then(|base| base.join(location))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| location.to_owned())
}
