use crate::form::FieldId;

/// Адрес страницы аутентификации, на которую уводит любой ответ 401.
pub const AUTH_LOCATION: &str = "/auth";

/// Области страницы, в которые выводятся ответы FRWS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Region {
    #[display(fmt = "content")]
    Content,
    #[display(fmt = "document-body")]
    DocumentBody,
    #[display(fmt = "layout")]
    Layout,
    #[display(fmt = "response")]
    Response,
    #[display(fmt = "status")]
    Status,
}

/// Элементы, видимость которых переключается.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Element {
    /// Надпись о режиме проверки после отправки формы.
    #[display(fmt = "info-label")]
    InfoLabel,
}

/// Как выводить тело ответа.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render {
    /// HTML-фрагмент как есть.
    Html,
    /// Отформатированный JSON.
    Json,
    /// Отформатированный JSON внутри блока кода.
    Code,
    /// Отформатированный JSON, если тело разбирается как JSON, иначе HTML.
    JsonOrHtml,
}

/// Содержимое, которое выводится в область.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Html(String),
    Json(String),
    Code(String),
}

impl Fragment {
    pub fn build(render: Render, body: &str) -> Result<Self, serde_json::Error> {
        let fragment = match render {
            Render::Html => Self::Html(body.to_owned()),
            Render::Json => Self::Json(pretty(body)?),
            Render::Code => Self::Code(pretty(body)?),
            Render::JsonOrHtml => match pretty(body) {
                Ok(json) => Self::Json(json),
                Err(_) => Self::Html(body.to_owned()),
            },
        };

        Ok(fragment)
    }

    /// Разметка фрагмента в том виде, в котором она попадает на страницу.
    pub fn markup(&self) -> String {
        match self {
            Self::Html(html) => html.clone(),
            Self::Json(json) => json.clone(),
            Self::Code(json) => format!("<pre><code>{}</code></pre>", json),
        }
    }
}

fn pretty(body: &str) -> Result<String, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    serde_json::to_string_pretty(&value)
}

/// То, куда контроллер выводит результаты.
pub trait View {
    /// Заменяет содержимое области.
    fn replace(&mut self, region: Region, fragment: Fragment);

    /// Уводит пользователя по указанному адресу.
    fn navigate(&mut self, location: &str);

    /// Снимает отметки со всех полей формы.
    fn clear_invalid(&mut self);

    /// Отмечает незаполненное поле формы.
    fn mark_invalid(&mut self, field: FieldId);

    fn set_visible(&mut self, element: Element, visible: bool);
}
