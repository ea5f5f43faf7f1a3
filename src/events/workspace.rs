use serde::{Deserialize, Serialize};
use std::fmt;

/// Идентификатор рабочего стола (у special-столов Hyprland отрицательный)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(pub i32);

impl WorkspaceId {
    /// Подставляется, когда активный стол узнать не удалось
    pub const FALLBACK: WorkspaceId = WorkspaceId(1);
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Куда перемещать окно оверлея
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceTarget {
    Id(WorkspaceId),
    Named(String),
}

impl fmt::Display for WorkspaceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceTarget::Id(id) => write!(f, "{}", id),
            WorkspaceTarget::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Адрес окна во внешнем оконном менеджере
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub String);

impl WindowHandle {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Информация об окне из списка клиентов оконного менеджера
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub address: WindowHandle,
    pub workspace: WorkspaceId,
    pub mapped: bool,
    pub pinned: bool,
    pub class: String,
    pub title: String,
}

impl ClientInfo {
    pub fn new(address: &str, workspace: i32) -> Self {
        Self {
            address: WindowHandle::new(address),
            workspace: WorkspaceId(workspace),
            mapped: true,
            pinned: false,
            class: String::new(),
            title: String::new(),
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.class = class.to_string();
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    #[cfg(test)]
    pub fn with_mapped(mut self, mapped: bool) -> Self {
        self.mapped = mapped;
        self
    }

    #[cfg(test)]
    pub fn with_pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    /// Окно самого оверлея: class совпадает точно либо title содержит идентификатор
    pub fn is_overlay(&self, identifier: &str) -> bool {
        self.class == identifier || self.title.contains(identifier)
    }

    /// Окно занимает рабочий стол `workspace`, если оно там, отображено и не является оверлеем
    pub fn occupies(&self, workspace: WorkspaceId, identifier: &str) -> bool {
        self.workspace == workspace && self.mapped && !self.is_overlay(identifier)
    }
}

impl fmt::Display for ClientInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" ({}) @ {} [{}]", self.title, self.class, self.workspace, self.address)
    }
}

/// Результат одного опроса оконного менеджера
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceSnapshot {
    pub workspace: WorkspaceId,
    pub occupied: bool,
}

impl WorkspaceSnapshot {
    pub fn new(workspace: i32, occupied: bool) -> Self {
        Self {
            workspace: WorkspaceId(workspace),
            occupied,
        }
    }
}

/// Запрос на смену видимости, формируется только на переходах состояния
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityEvent {
    pub workspace: WorkspaceId,
    pub should_show: bool,
    pub timestamp: std::time::Instant,
}

impl VisibilityEvent {
    pub fn new(workspace: WorkspaceId, should_show: bool) -> Self {
        Self {
            workspace,
            should_show,
            timestamp: std::time::Instant::now(),
        }
    }
}

impl fmt::Display for VisibilityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.should_show { "show" } else { "hide" };
        write!(
            f,
            "{} on workspace {} ({}ms ago)",
            action,
            self.workspace,
            self.timestamp.elapsed().as_millis()
        )
    }
}
