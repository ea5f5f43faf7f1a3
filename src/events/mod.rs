pub mod user;
pub mod workspace;

pub use user::UserAction;
pub use workspace::{
    ClientInfo, VisibilityEvent, WindowHandle, WorkspaceId, WorkspaceSnapshot, WorkspaceTarget,
};

/// Всё, что попадает в цикл координатора: он единственный владелец состояния оверлея
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    VisibilityChanged(VisibilityEvent),
    User(UserAction),
    CopyFinished { ok: bool },
    Shutdown,
}

impl From<VisibilityEvent> for OverlayEvent {
    fn from(event: VisibilityEvent) -> Self {
        OverlayEvent::VisibilityChanged(event)
    }
}

impl From<UserAction> for OverlayEvent {
    fn from(action: UserAction) -> Self {
        OverlayEvent::User(action)
    }
}
