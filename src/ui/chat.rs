//! The "Telegram" panel: accounts, a chat list and open conversations.
//!
//! Chats and messages are generated locally; nothing talks to a server.

use super::{dialogs, theme};
use crate::context::AppContext;
use crate::error::{AccountError, HookError};
use crate::panel::{KeyResponse, Panel, PanelFlags};
use crate::types::{Account, ChatInfo, ChatWindow, InputMode, Message};
use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use regex::Regex;
use tracing::{info, warn};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const CHAT_PANEL: &str = "Telegram";

const PHONE_PATTERN: &str = r"^\+?[1-9][0-9]{6,14}$";

const MOCK_CHATS: [(&str, &str); 10] = [
    ("John Doe", "Hey, how are you?"),
    ("Alice Smith", "Can we meet tomorrow?"),
    ("Work Group", "Meeting at 3 PM"),
    ("Family", "Don't forget dinner tonight!"),
    ("Bob Johnson", "Thanks for your help!"),
    ("Project Team", "New updates available"),
    ("Sarah Connor", "I'll be back"),
    ("Gaming Squad", "Ready for tonight's raid?"),
    ("Book Club", "Next book: 1984"),
    ("Fitness Group", "Morning workout at 6 AM"),
];

pub struct ChatPanel {
    accounts: Vec<Account>,
    current: Option<usize>,
    selected: usize,
    windows: Vec<ChatWindow>,
    open_window: Option<usize>,
    mode: InputMode,
    filter: String,
    phone_re: Regex,
    focused: bool,
}

impl ChatPanel {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            accounts: Vec::new(),
            current: None,
            selected: 0,
            windows: Vec::new(),
            open_window: None,
            mode: InputMode::Normal,
            filter: String::new(),
            phone_re: Regex::new(PHONE_PATTERN)?,
            focused: false,
        })
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn current_account(&self) -> Option<&Account> {
        self.current.and_then(|i| self.accounts.get(i))
    }

    pub fn windows(&self) -> &[ChatWindow] {
        &self.windows
    }

    pub fn open_window(&self) -> Option<&ChatWindow> {
        self.open_window.and_then(|i| self.windows.get(i))
    }

    pub fn mode(&self) -> &InputMode {
        &self.mode
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Narrow the chat list to titles containing `filter`, ignoring case.
    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.selected = 0;
    }

    /// Indices into the current account's chats that pass the filter.
    pub fn visible_chats(&self) -> Vec<usize> {
        let Some(account) = self.current_account() else {
            return Vec::new();
        };
        let needle = self.filter.to_lowercase();
        account
            .chats
            .iter()
            .enumerate()
            .filter(|(_, c)| needle.is_empty() || c.title.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect()
    }

    /// Add an account by phone number. Spaces, dashes and parentheses are
    /// ignored. The first account becomes current.
    pub fn add_account(&mut self, phone: &str) -> Result<(), AccountError> {
        let phone: String = phone
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect();
        if !self.phone_re.is_match(&phone) {
            return Err(AccountError::InvalidPhone(phone));
        }
        if self.accounts.iter().any(|a| a.phone == phone) {
            warn!(%phone, "account already exists");
            return Err(AccountError::Duplicate(phone));
        }

        info!(%phone, "account added");
        self.accounts.push(Account {
            display_name: format!("Account {phone}"),
            phone,
            chats: mock_chats(),
        });
        if self.current.is_none() {
            self.current = Some(self.accounts.len() - 1);
        }
        Ok(())
    }

    /// Remove the current account and close its conversations.
    pub fn remove_current_account(&mut self) -> Option<Account> {
        let idx = self.current?;
        let account = self.accounts.remove(idx);
        info!(phone = %account.phone, "account removed");
        self.windows.clear();
        self.open_window = None;
        self.selected = 0;
        self.current = if self.accounts.is_empty() {
            None
        } else {
            Some(idx.min(self.accounts.len() - 1))
        };
        Some(account)
    }

    pub fn switch_account(&mut self, delta: isize) {
        let Some(idx) = self.current else {
            return;
        };
        let len = self.accounts.len() as isize;
        let next = (idx as isize + delta).rem_euclid(len) as usize;
        if next != idx {
            self.current = Some(next);
            self.selected = 0;
            self.windows.clear();
            self.open_window = None;
        }
    }

    pub fn select(&mut self, delta: isize) {
        let count = self.visible_chats().len();
        if count == 0 {
            return;
        }
        self.selected = (self.selected as isize + delta).clamp(0, count as isize - 1) as usize;
    }

    /// Open a conversation for the selected chat. Returns false when it was
    /// already open, in which case it is brought to front.
    pub fn open_selected_chat(&mut self) -> bool {
        let Some(account_idx) = self.current else {
            return false;
        };
        let Some(&chat_idx) = self.visible_chats().get(self.selected) else {
            return false;
        };
        let Some(chat) = self.accounts[account_idx].chats.get_mut(chat_idx) else {
            return false;
        };
        chat.unread = 0;

        if let Some(existing) = self.windows.iter().position(|w| w.chat_id == chat.chat_id) {
            self.open_window = Some(existing);
            return false;
        }
        self.windows.push(ChatWindow {
            chat_id: chat.chat_id,
            title: chat.title.clone(),
            messages: mock_messages(chat),
            scroll: 0,
        });
        self.open_window = Some(self.windows.len() - 1);
        true
    }

    pub fn close_open_chat(&mut self) {
        let Some(idx) = self.open_window else {
            return;
        };
        self.windows.remove(idx);
        self.open_window = if self.windows.is_empty() {
            None
        } else {
            Some(idx.min(self.windows.len() - 1))
        };
    }

    fn cycle_window(&mut self, delta: isize) {
        if let Some(idx) = self.open_window {
            let len = self.windows.len() as isize;
            self.open_window = Some((idx as isize + delta).rem_euclid(len) as usize);
        }
    }

    /// Append an outgoing message to the open conversation.
    pub fn send(&mut self, text: &str) -> bool {
        let text = text.trim();
        let Some(idx) = self.open_window else {
            return false;
        };
        if text.is_empty() {
            return false;
        }
        let time = Local::now().format("%H:%M").to_string();
        let window = &mut self.windows[idx];
        window.messages.push(Message {
            sender: "Me".to_string(),
            text: text.to_string(),
            time: time.clone(),
            outgoing: true,
        });
        window.scroll = 0;

        let chat_id = window.chat_id;
        if let Some(chat) = self
            .current
            .and_then(|a| self.accounts.get_mut(a))
            .and_then(|a| a.chats.iter_mut().find(|c| c.chat_id == chat_id))
        {
            chat.last_message = text.to_string();
            chat.time = time;
        }
        true
    }

    /// Plain-text copy of the open conversation.
    pub fn transcript(&self) -> Option<String> {
        let window = self.open_window()?;
        let mut out = format!("{}\n", window.title);
        for m in &window.messages {
            out.push_str(&format!("[{}] {}: {}\n", m.time, m.sender, m.text));
        }
        Some(out)
    }

    fn copy_transcript(&self) -> KeyResponse {
        let Some(text) = self.transcript() else {
            return KeyResponse::Status("No chat open".to_string());
        };
        match arboard::Clipboard::new().and_then(|mut c| c.set_text(text)) {
            Ok(()) => KeyResponse::Status("Transcript copied to clipboard".to_string()),
            Err(e) => {
                warn!("clipboard unavailable: {e}");
                KeyResponse::Status("Clipboard unavailable".to_string())
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> KeyResponse {
        match key.code {
            KeyCode::Up => self.select(-1),
            KeyCode::Down => self.select(1),
            KeyCode::Enter => {
                if !self.open_selected_chat() && self.current.is_none() {
                    return KeyResponse::Ignored;
                }
            }
            KeyCode::Char('[') => self.switch_account(-1),
            KeyCode::Char(']') => self.switch_account(1),
            KeyCode::Left => self.cycle_window(-1),
            KeyCode::Right => self.cycle_window(1),
            KeyCode::PageUp => {
                if let Some(w) = self.open_window.and_then(|i| self.windows.get_mut(i)) {
                    w.scroll = (w.scroll + 1).min(w.messages.len().saturating_sub(1));
                }
            }
            KeyCode::PageDown => {
                if let Some(w) = self.open_window.and_then(|i| self.windows.get_mut(i)) {
                    w.scroll = w.scroll.saturating_sub(1);
                }
            }
            KeyCode::Char('a') => {
                self.mode = InputMode::AddAccount {
                    value: String::new(),
                    error: None,
                };
            }
            KeyCode::Char('x') => {
                return match self.remove_current_account() {
                    Some(account) => KeyResponse::Status(format!("Removed {}", account.display_name)),
                    None => KeyResponse::Status("No account to remove".to_string()),
                };
            }
            KeyCode::Char('i') if self.open_window.is_some() => {
                self.mode = InputMode::Compose(String::new());
            }
            KeyCode::Char('w') => self.close_open_chat(),
            KeyCode::Char('y') => return self.copy_transcript(),
            KeyCode::Char('/') if self.current.is_some() => self.mode = InputMode::Search,
            KeyCode::Esc if !self.filter.is_empty() => self.set_filter(""),
            _ => return KeyResponse::Ignored,
        }
        KeyResponse::Consumed
    }

    fn handle_compose_key(&mut self, key: KeyEvent) -> KeyResponse {
        let InputMode::Compose(draft) = &mut self.mode else {
            return KeyResponse::Ignored;
        };
        match key.code {
            KeyCode::Char(c) if !is_chord(&key) => draft.push(c),
            KeyCode::Backspace => {
                draft.pop();
            }
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Enter => {
                let text = std::mem::take(draft);
                self.mode = InputMode::Normal;
                self.send(&text);
            }
            _ => {}
        }
        KeyResponse::Consumed
    }

    fn handle_add_account_key(&mut self, key: KeyEvent) -> KeyResponse {
        let InputMode::AddAccount { value, error } = &mut self.mode else {
            return KeyResponse::Ignored;
        };
        match key.code {
            KeyCode::Char(c) if !is_chord(&key) => {
                value.push(c);
                *error = None;
            }
            KeyCode::Backspace => {
                value.pop();
                *error = None;
            }
            KeyCode::Esc => self.mode = InputMode::Normal,
            KeyCode::Enter => {
                let phone = value.clone();
                match self.add_account(&phone) {
                    Ok(()) => {
                        self.mode = InputMode::Normal;
                        return KeyResponse::Status(format!("Added Account {}", phone.trim()));
                    }
                    Err(e) => {
                        if let InputMode::AddAccount { error, .. } = &mut self.mode {
                            *error = Some(e.to_string());
                        }
                    }
                }
            }
            _ => {}
        }
        KeyResponse::Consumed
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> KeyResponse {
        match key.code {
            KeyCode::Char(c) if !is_chord(&key) => {
                let mut filter = std::mem::take(&mut self.filter);
                filter.push(c);
                self.set_filter(&filter);
            }
            KeyCode::Backspace => {
                let mut filter = std::mem::take(&mut self.filter);
                filter.pop();
                self.set_filter(&filter);
            }
            KeyCode::Up => self.select(-1),
            KeyCode::Down => self.select(1),
            KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Esc => {
                self.set_filter("");
                self.mode = InputMode::Normal;
            }
            _ => {}
        }
        KeyResponse::Consumed
    }

    fn draw_chat_list(&self, f: &mut Frame, area: Rect, transparent: bool) {
        let title = self
            .current_account()
            .map(|a| format!(" {} ", a.display_name))
            .unwrap_or_else(|| " No account ".to_string());
        let block = Block::default()
            .title(Line::from(Span::styled(title, theme::panel_title_style())))
            .borders(Borders::RIGHT)
            .border_style(theme::border_style(self.focused))
            .style(theme::surface(transparent));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let Some(account) = self.current_account() else {
            let hint = vec![
                Line::from(""),
                Line::from(Span::styled("  No accounts yet.", theme::subtitle_style())),
                Line::from(vec![
                    Span::styled("  [a]", theme::key_hint_style()),
                    Span::styled(" Add account", theme::footer_style()),
                ]),
            ];
            f.render_widget(Paragraph::new(hint), inner);
            return;
        };

        let searching = self.mode == InputMode::Search;
        let mut inner = inner;
        if searching || !self.filter.is_empty() {
            let cursor = if searching { "█" } else { "" };
            let search = Line::from(vec![
                Span::styled(" / ", theme::key_hint_style()),
                Span::styled(self.filter.as_str(), Style::default().fg(theme::TEXT)),
                Span::styled(cursor, Style::default().fg(theme::ACCENT)),
            ]);
            f.render_widget(Paragraph::new(search), Rect { height: 1, ..inner });
            inner.y += 1;
            inner.height = inner.height.saturating_sub(1);
        }

        let shown = self.visible_chats();
        if shown.is_empty() {
            f.render_widget(
                Paragraph::new(Span::styled("  No chats match", theme::subtitle_style())),
                inner,
            );
            return;
        }

        let width = inner.width as usize;
        let rows_per_chat = 2;
        let visible = (inner.height as usize / rows_per_chat).max(1);
        let first = self.selected.saturating_sub(visible - 1);

        let mut lines = Vec::new();
        let rows = shown.iter().filter_map(|&c| account.chats.get(c)).enumerate();
        for (i, chat) in rows.skip(first).take(visible) {
            let selected = i == self.selected;
            let name_style = if selected {
                theme::selected_style().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme::TEXT)
            };
            let (r, g, b) = chat.avatar_rgb;
            let mut spans = vec![
                Span::styled(if selected { ">" } else { " " }, name_style),
                Span::styled(
                    format!("{:^4}", chat.avatar_text),
                    Style::default().fg(Color::Rgb(r, g, b)).add_modifier(Modifier::BOLD),
                ),
            ];
            let mut badges = String::new();
            if chat.pinned {
                badges.push_str(" ★");
            }
            if chat.unread > 0 {
                badges.push_str(&format!(" ({})", chat.unread));
            }
            let budget = width.saturating_sub(5 + badges.width() + 2);
            spans.push(Span::styled(truncate(&chat.title, budget), name_style));
            if chat.online {
                spans.push(Span::styled(" ●", Style::default().fg(theme::SUCCESS)));
            }
            spans.push(Span::styled(badges, Style::default().fg(theme::ACCENT)));
            lines.push(Line::from(spans));

            let preview_budget = width.saturating_sub(6 + chat.time.width() + 1);
            lines.push(Line::from(vec![
                Span::raw("      "),
                Span::styled(
                    truncate(&chat.last_message, preview_budget),
                    theme::subtitle_style(),
                ),
                Span::styled(format!(" {}", chat.time), Style::default().fg(theme::TEXT_DIM)),
            ]));
        }
        f.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_conversation(&self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        let Some(window) = self.open_window() else {
            let hint = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Select a chat to start messaging",
                    theme::subtitle_style(),
                )),
            ])
            .alignment(Alignment::Center);
            f.render_widget(hint, area);
            return;
        };

        let position = self.open_window.map_or(0, |i| i + 1);
        let block = Block::default()
            .title(Line::from(vec![
                Span::styled(format!(" {} ", window.title), theme::panel_title_style()),
                Span::styled(
                    format!("{}/{} ", position, self.windows.len()),
                    theme::subtitle_style(),
                ),
            ]))
            .borders(Borders::BOTTOM)
            .border_style(theme::border_style(false));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let composing = matches!(self.mode, InputMode::Compose(_));
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(if composing { 1 } else { 0 }),
            ])
            .split(inner);

        let bubble_width = (rows[0].width as usize * 3 / 4).max(8);
        let lines: Vec<Line> = window
            .messages
            .iter()
            .map(|m| {
                let bg = if m.outgoing { theme::BUBBLE_OUT } else { theme::BUBBLE_IN };
                let body = truncate(&m.text, bubble_width.saturating_sub(m.time.width() + 3));
                let line = Line::from(vec![
                    Span::styled(format!(" {} ", body), Style::default().fg(theme::TEXT).bg(bg)),
                    Span::styled(format!("{} ", m.time), Style::default().fg(theme::TEXT_DIM).bg(bg)),
                ]);
                if m.outgoing {
                    line.alignment(Alignment::Right)
                } else {
                    line
                }
            })
            .collect();

        let height = rows[0].height as usize;
        let end = lines.len().saturating_sub(window.scroll);
        let start = end.saturating_sub(height);
        let visible: Vec<Line> = lines[start..end].to_vec();
        f.render_widget(Paragraph::new(visible), rows[0]);

        if let InputMode::Compose(draft) = &self.mode {
            let cursor = if ctx.frame_index / 15 % 2 == 0 { "█" } else { " " };
            let input = Line::from(vec![
                Span::styled(" > ", Style::default().fg(theme::ACCENT_WARM)),
                Span::styled(draft.as_str(), Style::default().fg(theme::TEXT)),
                Span::styled(cursor, Style::default().fg(theme::ACCENT)),
            ]);
            f.render_widget(Paragraph::new(input), rows[1]);
        }
    }
}

impl Panel for ChatPanel {
    fn name(&self) -> &str {
        CHAT_PANEL
    }

    fn icon(&self) -> &str {
        "📱"
    }

    fn flags(&self) -> PanelFlags {
        PanelFlags::CAN_CLOSE | PanelFlags::CAN_DETACH | PanelFlags::MENU_BAR
    }

    fn on_render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppContext) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(area);
        self.draw_chat_list(frame, cols[0], ctx.transparent);
        self.draw_conversation(frame, cols[1], ctx);

        if let InputMode::AddAccount { value, error } = &self.mode {
            dialogs::draw_input(
                frame,
                area,
                "Add account (phone number)",
                value,
                error.as_deref(),
                ctx.frame_index / 15 % 2 == 0,
            );
        }
    }

    fn on_attach(&mut self) {
        info!(accounts = self.accounts.len(), "chat panel attached");
    }

    fn on_detach(&mut self) -> Result<(), HookError> {
        info!(windows = self.windows.len(), "chat panel detached");
        self.mode = InputMode::Normal;
        Ok(())
    }

    fn on_focus(&mut self) {
        self.focused = true;
    }

    fn on_lost_focus(&mut self) {
        self.focused = false;
        if matches!(self.mode, InputMode::Compose(_)) {
            self.mode = InputMode::Normal;
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> KeyResponse {
        match self.mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Compose(_) => self.handle_compose_key(key),
            InputMode::AddAccount { .. } => self.handle_add_account_key(key),
            InputMode::Search => self.handle_search_key(key),
        }
    }

    fn captures_input(&self) -> bool {
        self.mode != InputMode::Normal
    }

    fn menu_bar(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("a", "Add account"),
            ("x", "Remove account"),
            ("[ ]", "Switch account"),
            ("/", "Search"),
            ("Enter", "Open chat"),
            ("i", "Write"),
            ("y", "Copy"),
            ("w", "Close chat"),
        ]
    }

    fn scroll(&self) -> Option<(usize, usize)> {
        match self.open_window() {
            Some(w) => {
                let len = w.messages.len();
                Some((len.saturating_sub(1 + w.scroll), len))
            }
            None => self
                .current_account()
                .map(|_| (self.selected, self.visible_chats().len())),
        }
    }
}

/// Control and Alt chords are shortcuts, never text.
fn is_chord(key: &KeyEvent) -> bool {
    key.modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// Cut `text` to at most `max_width` columns, ending in an ellipsis when cut.
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w + 1 > max_width {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push('…');
    out
}

fn initials(title: &str) -> String {
    title
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Stable avatar color from the title: hash to a hue, fixed saturation and
/// value.
fn avatar_rgb(title: &str) -> (u8, u8, u8) {
    let hash = title
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
    let hue = (hash % 360) as f32;
    let (s, v) = (0.55_f32, 0.85_f32);
    let c = v * s;
    let x = c * (1.0 - ((hue / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;
    let (r, g, b) = match hue as u32 / 60 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_u8 = |f: f32| ((f + m) * 255.0).round() as u8;
    (to_u8(r), to_u8(g), to_u8(b))
}

fn mock_chats() -> Vec<ChatInfo> {
    MOCK_CHATS
        .iter()
        .enumerate()
        .map(|(i, (title, last))| ChatInfo {
            chat_id: i as i64 + 1,
            title: title.to_string(),
            last_message: last.to_string(),
            time: if i < 3 {
                format!("12:0{i}")
            } else {
                "Yesterday".to_string()
            },
            unread: if i % 3 == 0 { i as u32 + 1 } else { 0 },
            pinned: i < 2,
            online: i % 2 == 0,
            avatar_text: initials(title),
            avatar_rgb: avatar_rgb(title),
        })
        .collect()
}

fn mock_messages(chat: &ChatInfo) -> Vec<Message> {
    let script = [
        (true, "Hi there!", "10:30"),
        (false, "Hello! How are you?", "10:31"),
        (true, "I'm doing great, thanks! How about you?", "10:32"),
        (false, "Pretty good! Working on some new projects.", "10:35"),
        (true, "That sounds interesting!", "10:36"),
        (false, chat.last_message.as_str(), "10:40"),
    ];
    script
        .iter()
        .map(|(outgoing, text, time)| Message {
            sender: if *outgoing { "Me".to_string() } else { chat.title.clone() },
            text: text.to_string(),
            time: time.to_string(),
            outgoing: *outgoing,
        })
        .collect()
}
