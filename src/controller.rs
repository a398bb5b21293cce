use log::{debug, warn};

use crate::{
    api::{self, Backend, Endpoint},
    form::{self, CollectResult, FieldId, FormSnapshot, ReasonSnapshot},
    model::{DocumentId, RegistrationPayload},
    view::{Element, Fragment, Region, Render, View, AUTH_LOCATION},
};

/// Чем закончилось действие пользователя.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Ответ выведен в область страницы.
    Rendered,

    /// FRWS ответил 401, пользователь отправлен на страницу аутентификации.
    Redirected,

    /// Запрос не отправлялся.
    Skipped,

    /// Форма не отправлена, перечисленные поля отмечены как незаполненные.
    Invalid(Vec<FieldId>),
}

pub type Result = std::result::Result<Outcome, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed")]
    Api(#[from] api::Error),

    #[error("malformed response")]
    MalformedResponse(#[from] serde_json::Error),
}

/// Панель управления FRWS.
/// Каждое действие независимо: отправляет один запрос и выводит ответ в свою
/// область.
pub struct Controller<B, V> {
    backend: B,
    view: V,
}

impl<B: Backend, V: View> Controller<B, V> {
    pub fn new(backend: B, view: V) -> Self {
        Self { backend, view }
    }

    pub fn load_document_list(&mut self) -> Result {
        self.show(Endpoint::DocumentList, Region::Content, Render::Html)
    }

    /// Загружает документ по номеру. Пустой или отсутствующий номер ничего
    /// не запрашивает.
    pub fn load_document_by_id(&mut self, id: Option<&str>) -> Result {
        let Some(raw) = id.filter(|s| !s.is_empty()) else {
            return Ok(Outcome::Skipped);
        };

        let id = match DocumentId::new(raw) {
            Ok(id) => id,
            Err(e) => {
                warn!("Некорректный номер документа {:?}: {}", raw, e);
                return Ok(Outcome::Skipped);
            }
        };

        self.show(Endpoint::Document(id), Region::DocumentBody, Render::JsonOrHtml)
    }

    pub fn load_settings(&mut self) -> Result {
        self.show(Endpoint::Settings, Region::Content, Render::Html)
    }

    pub fn load_management(&mut self) -> Result {
        self.show(Endpoint::Management, Region::Content, Render::Html)
    }

    pub fn load_register_form(&mut self) -> Result {
        self.show(Endpoint::Register, Region::Content, Render::Html)
    }

    pub fn load_register_layout(&mut self) -> Result {
        self.show(Endpoint::RegisterLayout, Region::Layout, Render::Html)
    }

    pub fn load_re_register_layout(&mut self) -> Result {
        self.show(Endpoint::ReRegisterLayout, Region::Layout, Render::Html)
    }

    pub fn open_device(&mut self) -> Result {
        self.show(Endpoint::ManagementOpen, Region::Response, Render::Json)
    }

    pub fn close_device(&mut self) -> Result {
        self.show(Endpoint::ManagementClose, Region::Response, Render::Json)
    }

    pub fn close_archive(&mut self) -> Result {
        self.show(Endpoint::ManagementCloseArchive, Region::Response, Render::Json)
    }

    pub fn fetch_status(&mut self) -> Result {
        self.show(Endpoint::BackendStatus, Region::Status, Render::Code)
    }

    pub fn submit_registration(&mut self, form: &FormSnapshot) -> Result {
        let payload = form::collect_register_data(form);
        self.submit(Endpoint::PostRegisterData, payload, form.check_mode)
    }

    pub fn submit_re_registration(&mut self, form: &FormSnapshot, reasons: &ReasonSnapshot) -> Result {
        let payload = form::collect_re_register_data(form, reasons);
        self.submit(Endpoint::PostReRegisterData, payload, form.check_mode)
    }

    #[cfg(test)]
    pub(crate) fn view(&self) -> &V {
        &self.view
    }

    #[cfg(test)]
    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }

    fn show(&mut self, endpoint: Endpoint, region: Region, render: Render) -> Result {
        let resp = self.backend.get(&endpoint);

        let Some(body) = self.intercept(resp)? else {
            return Ok(Outcome::Redirected);
        };

        let fragment = Fragment::build(render, &body)?;

        debug!("Выводим ответ {} в область {}", endpoint.path(), region);
        self.view.replace(region, fragment);

        Ok(Outcome::Rendered)
    }

    fn submit(&mut self, endpoint: Endpoint, payload: CollectResult, check_mode: bool) -> Result {
        let payload = match self.validate(payload) {
            Ok(p) => p,
            Err(fields) => return Ok(Outcome::Invalid(fields)),
        };

        let resp = self.backend.post_json(&endpoint, &payload);

        let Some(body) = self.intercept(resp)? else {
            return Ok(Outcome::Redirected);
        };

        let fragment = Fragment::build(Render::Json, &body)?;

        self.view.replace(Region::Response, fragment);
        self.view.set_visible(Element::InfoLabel, check_mode);

        Ok(Outcome::Rendered)
    }

    /// Снимает старые отметки и отмечает все незаполненные поля.
    fn validate(
        &mut self,
        payload: CollectResult,
    ) -> std::result::Result<RegistrationPayload, Vec<FieldId>> {
        self.view.clear_invalid();

        payload.map_err(|missing| {
            warn!("Форма не отправлена: {}", missing);
            for f in missing.fields() {
                self.view.mark_invalid(*f);
            }
            missing.0
        })
    }

    /// Общая обработка ответов: 401 уводит на страницу аутентификации и больше
    /// ничего не трогает, остальные ошибки возвращаются как есть.
    fn intercept(&mut self, resp: api::Result<String>) -> std::result::Result<Option<String>, Error> {
        match resp {
            Ok(body) => Ok(Some(body)),
            Err(api::Error::Unauthorized) => {
                warn!("FRWS ответил 401, переходим на {}", AUTH_LOCATION);
                self.view.navigate(AUTH_LOCATION);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use reqwest::StatusCode;
    use serde::Serialize;

    use super::*;
    use crate::form::tests::filled_form;
    use crate::model::{AgentSign, ChangeReason};

    #[derive(Debug, Clone, Copy)]
    enum Reply {
        Body(&'static str),
        Unauthorized,
        Failure,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        method: &'static str,
        path: String,
        body: Option<serde_json::Value>,
    }

    struct FakeBackend {
        reply: Reply,
        calls: RefCell<Vec<Call>>,
    }

    impl FakeBackend {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn respond(&self) -> api::Result<String> {
            match self.reply {
                Reply::Body(b) => Ok(b.to_owned()),
                Reply::Unauthorized => Err(api::Error::Unauthorized),
                Reply::Failure => Err(api::Error::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".to_owned(),
                }),
            }
        }
    }

    impl Backend for FakeBackend {
        fn get(&self, endpoint: &Endpoint) -> api::Result<String> {
            self.calls.borrow_mut().push(Call {
                method: "GET",
                path: endpoint.path(),
                body: None,
            });
            self.respond()
        }

        fn post_json<P: Serialize>(&self, endpoint: &Endpoint, payload: &P) -> api::Result<String> {
            self.calls.borrow_mut().push(Call {
                method: "POST",
                path: endpoint.path(),
                body: Some(serde_json::to_value(payload).unwrap()),
            });
            self.respond()
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Replace(Region, Fragment),
        Navigate(String),
        ClearInvalid,
        MarkInvalid(FieldId),
        SetVisible(Element, bool),
    }

    #[derive(Default)]
    struct RecordingView {
        events: Vec<Event>,
    }

    impl View for RecordingView {
        fn replace(&mut self, region: Region, fragment: Fragment) {
            self.events.push(Event::Replace(region, fragment));
        }

        fn navigate(&mut self, location: &str) {
            self.events.push(Event::Navigate(location.to_owned()));
        }

        fn clear_invalid(&mut self) {
            self.events.push(Event::ClearInvalid);
        }

        fn mark_invalid(&mut self, field: FieldId) {
            self.events.push(Event::MarkInvalid(field));
        }

        fn set_visible(&mut self, element: Element, visible: bool) {
            self.events.push(Event::SetVisible(element, visible));
        }
    }

    type TestController = Controller<FakeBackend, RecordingView>;

    fn controller(reply: Reply) -> TestController {
        Controller::new(FakeBackend::new(reply), RecordingView::default())
    }

    fn events(c: &TestController) -> &[Event] {
        &c.view().events
    }

    #[test]
    fn unauthorized_redirects_from_every_get() {
        let ops: [(fn(&mut TestController) -> Result, &str); 11] = [
            (TestController::load_document_list, "frws/document"),
            (
                |c: &mut TestController| c.load_document_by_id(Some("42")),
                "frws/document/42",
            ),
            (TestController::load_settings, "frws/settings"),
            (TestController::load_management, "frws/management"),
            (TestController::load_register_form, "frws/register"),
            (TestController::load_register_layout, "frws/registerLayout"),
            (TestController::load_re_register_layout, "frws/reRegisterLayout"),
            (TestController::open_device, "frws/management/open"),
            (TestController::close_device, "frws/management/close"),
            (TestController::close_archive, "frws/management/closeArchive"),
            (TestController::fetch_status, "frws/backend/status"),
        ];

        for (op, path) in ops {
            let mut c = controller(Reply::Unauthorized);

            assert_eq!(op(&mut c).unwrap(), Outcome::Redirected, "{}", path);
            assert_eq!(events(&c), &[Event::Navigate("/auth".to_owned())], "{}", path);

            let calls = c.backend().calls();
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].method, "GET");
            assert_eq!(calls[0].path, path);
        }
    }

    #[test]
    fn unauthorized_submit_only_redirects() {
        let mut c = controller(Reply::Unauthorized);

        let outcome = c.submit_registration(&filled_form()).unwrap();

        assert_eq!(outcome, Outcome::Redirected);
        assert_eq!(
            events(&c),
            &[Event::ClearInvalid, Event::Navigate("/auth".to_owned())]
        );
        assert_eq!(c.backend().calls().len(), 1);
    }

    #[test]
    fn unauthorized_re_submit_only_redirects() {
        let mut c = controller(Reply::Unauthorized);

        let outcome = c
            .submit_re_registration(&filled_form(), &ReasonSnapshot::default())
            .unwrap();

        assert_eq!(outcome, Outcome::Redirected);
        assert_eq!(
            events(&c),
            &[Event::ClearInvalid, Event::Navigate("/auth".to_owned())]
        );

        let calls = c.backend().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].path, "frws/postReRegisterData");
    }

    #[test]
    fn empty_document_id_is_skipped() {
        for id in [None, Some("")] {
            let mut c = controller(Reply::Body("{}"));

            assert_eq!(c.load_document_by_id(id).unwrap(), Outcome::Skipped);
            assert!(c.backend().calls().is_empty());
            assert!(events(&c).is_empty());
        }
    }

    #[test]
    fn document_by_id_renders_json_into_document_body() {
        let mut c = controller(Reply::Body(r#"{"docNumber":"42"}"#));

        assert_eq!(c.load_document_by_id(Some("42")).unwrap(), Outcome::Rendered);

        assert_eq!(
            c.backend().calls(),
            vec![Call {
                method: "GET",
                path: "frws/document/42".to_owned(),
                body: None,
            }]
        );
        assert_eq!(
            events(&c),
            &[Event::Replace(
                Region::DocumentBody,
                Fragment::Json("{\n  \"docNumber\": \"42\"\n}".to_owned())
            )]
        );
    }

    #[test]
    fn document_by_id_keeps_html_body() {
        let mut c = controller(Reply::Body("<table></table>"));

        c.load_document_by_id(Some("7")).unwrap();

        assert_eq!(
            events(&c),
            &[Event::Replace(
                Region::DocumentBody,
                Fragment::Html("<table></table>".to_owned())
            )]
        );
    }

    #[test]
    fn fragments_replace_content() {
        let mut c = controller(Reply::Body("<form id=\"settings\"></form>"));

        c.load_settings().unwrap();
        c.load_document_list().unwrap();

        assert_eq!(
            events(&c),
            &[
                Event::Replace(
                    Region::Content,
                    Fragment::Html("<form id=\"settings\"></form>".to_owned())
                ),
                Event::Replace(
                    Region::Content,
                    Fragment::Html("<form id=\"settings\"></form>".to_owned())
                ),
            ]
        );
    }

    #[test]
    fn layouts_go_to_layout_region() {
        let mut c = controller(Reply::Body("<div></div>"));

        c.load_re_register_layout().unwrap();

        assert_eq!(
            events(&c),
            &[Event::Replace(Region::Layout, Fragment::Html("<div></div>".to_owned()))]
        );
    }

    #[test]
    fn status_is_rendered_as_code() {
        let mut c = controller(Reply::Body(r#"{"online":true}"#));

        c.fetch_status().unwrap();

        assert_eq!(
            events(&c),
            &[Event::Replace(
                Region::Status,
                Fragment::Code("{\n  \"online\": true\n}".to_owned())
            )]
        );
    }

    #[test]
    fn management_actions_render_json_response() {
        let mut c = controller(Reply::Body(r#"{"type":"STATUS","modeFR":2}"#));

        c.open_device().unwrap();

        assert_eq!(
            events(&c),
            &[Event::Replace(
                Region::Response,
                Fragment::Json("{\n  \"type\": \"STATUS\",\n  \"modeFR\": 2\n}".to_owned())
            )]
        );
    }

    #[test]
    fn malformed_json_leaves_view_untouched() {
        let mut c = controller(Reply::Body("<html>oops</html>"));

        assert!(matches!(c.close_device(), Err(Error::MalformedResponse(_))));
        assert!(events(&c).is_empty());
    }

    #[test]
    fn other_failures_propagate() {
        let mut c = controller(Reply::Failure);

        assert!(matches!(
            c.load_management(),
            Err(Error::Api(api::Error::Status { .. }))
        ));
        assert!(events(&c).is_empty());
    }

    #[test]
    fn invalid_form_is_not_sent() {
        let mut c = controller(Reply::Body("{}"));
        let mut form = filled_form();
        form.user_inn.clear();
        form.ofd_name.clear();

        let outcome = c.submit_registration(&form).unwrap();

        assert_eq!(outcome, Outcome::Invalid(vec![FieldId::UserInn, FieldId::OfdName]));
        assert!(c.backend().calls().is_empty());
        assert_eq!(
            events(&c),
            &[
                Event::ClearInvalid,
                Event::MarkInvalid(FieldId::UserInn),
                Event::MarkInvalid(FieldId::OfdName),
            ]
        );
    }

    #[test]
    fn marks_are_cleared_on_every_attempt() {
        let mut c = controller(Reply::Body("{}"));
        let mut form = filled_form();
        form.cashier.clear();

        c.submit_registration(&form).unwrap();
        form.cashier = "Петров П.П.".to_owned();
        c.submit_registration(&form).unwrap();

        assert_eq!(
            events(&c),
            &[
                Event::ClearInvalid,
                Event::MarkInvalid(FieldId::Cashier),
                Event::ClearInvalid,
                Event::Replace(Region::Response, Fragment::Json("{}".to_owned())),
                Event::SetVisible(Element::InfoLabel, false),
            ]
        );
    }

    #[test]
    fn registration_posts_payload_and_shows_info_label() {
        let mut c = controller(Reply::Body(r#"{"ok":1}"#));
        let mut form = filled_form();
        form.check_mode = true;

        assert_eq!(c.submit_registration(&form).unwrap(), Outcome::Rendered);

        let expected = serde_json::to_value(form::collect_register_data(&form).unwrap()).unwrap();
        let calls = c.backend().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "POST");
        assert_eq!(calls[0].path, "frws/postRegisterData");
        assert_eq!(calls[0].body.as_ref(), Some(&expected));
        assert_eq!(expected["printOnly"], 1);

        assert_eq!(
            events(&c),
            &[
                Event::ClearInvalid,
                Event::Replace(Region::Response, Fragment::Json("{\n  \"ok\": 1\n}".to_owned())),
                Event::SetVisible(Element::InfoLabel, true),
            ]
        );
    }

    #[test]
    fn info_label_hidden_without_check_mode() {
        let mut c = controller(Reply::Body("{}"));

        c.submit_registration(&filled_form()).unwrap();

        assert_eq!(
            events(&c).last(),
            Some(&Event::SetVisible(Element::InfoLabel, false))
        );
    }

    #[test]
    fn re_registration_posts_reason_tags() {
        let mut c = controller(Reply::Body("{}"));
        let reasons = ReasonSnapshot {
            agent_sign: AgentSign::new(1).unwrap(),
            change_reason: ChangeReason::new(3).unwrap(),
        };

        c.submit_re_registration(&filled_form(), &reasons).unwrap();

        let calls = c.backend().calls();
        assert_eq!(calls[0].path, "frws/postReRegisterData");

        let props = calls[0].body.as_ref().unwrap()["data"]["fiscprops"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(props.len(), 23);
        assert_eq!(props[21], serde_json::json!({ "tag": 1057, "value": 2 }));
        assert_eq!(props[22], serde_json::json!({ "tag": 1205, "value": 8 }));
    }
}
