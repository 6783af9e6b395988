use crate::panel::PanelId;

/// A chat entry shown in the chat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatInfo {
    pub chat_id: i64,
    pub title: String,
    pub last_message: String,
    pub time: String,
    pub unread: u32,
    pub pinned: bool,
    pub online: bool,
    pub avatar_text: String,
    pub avatar_rgb: (u8, u8, u8),
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: String,
    pub text: String,
    pub time: String,
    pub outgoing: bool,
}

/// A signed-in account and the chats it sees.
#[derive(Debug, Clone)]
pub struct Account {
    pub phone: String,
    pub display_name: String,
    pub chats: Vec<ChatInfo>,
}

/// An open conversation window inside the chat panel.
#[derive(Debug, Clone)]
pub struct ChatWindow {
    pub chat_id: i64,
    pub title: String,
    pub messages: Vec<Message>,
    pub scroll: usize,
}

/// What the chat panel is currently typing into, if anything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Compose(String),
    AddAccount {
        value: String,
        error: Option<String>,
    },
    /// Typing into the chat list filter.
    Search,
}

/// Active modal dialog type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    /// Confirm an action (message, confirmed action tag).
    Confirm {
        message: String,
        action: ConfirmAction,
    },
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    CloseOthers(PanelId),
}

/// Footer message that expires after a number of frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub text: String,
    pub until_frame: u64,
}
