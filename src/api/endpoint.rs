use crate::model::DocumentId;

/// Методы FRWS, к которым обращается панель управления.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    DocumentList,
    Document(DocumentId),
    Settings,
    Management,
    ManagementOpen,
    ManagementClose,
    ManagementCloseArchive,
    BackendStatus,
    Register,
    RegisterLayout,
    ReRegisterLayout,
    PostRegisterData,
    PostReRegisterData,
}

impl Endpoint {
    /// Путь относительно корня сервиса.
    pub fn path(&self) -> String {
        let path = match self {
            Self::DocumentList => "frws/document",
            Self::Document(id) => return format!("frws/document/{}", id),
            Self::Settings => "frws/settings",
            Self::Management => "frws/management",
            Self::ManagementOpen => "frws/management/open",
            Self::ManagementClose => "frws/management/close",
            Self::ManagementCloseArchive => "frws/management/closeArchive",
            Self::BackendStatus => "frws/backend/status",
            Self::Register => "frws/register",
            Self::RegisterLayout => "frws/registerLayout",
            Self::ReRegisterLayout => "frws/reRegisterLayout",
            Self::PostRegisterData => "frws/postRegisterData",
            Self::PostReRegisterData => "frws/postReRegisterData",
        };
        path.to_owned()
    }
}
