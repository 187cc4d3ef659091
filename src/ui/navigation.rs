use crate::backend::wire::DocumentReference;
use crate::session::chat::ChatSession;
use crate::ui::catalog::ModelRef;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    YourModels,
    Discover,
    Chat,
}

impl Screen {
    pub const NAV: [Screen; 3] = [Screen::Home, Screen::YourModels, Screen::Discover];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::YourModels => "your-models",
            Self::Discover => "discover",
            Self::Chat => "chat",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::YourModels => "Your models",
            Self::Discover => "Discover",
            Self::Chat => "Chat",
        }
    }
}

/// Owns the current screen and the chat session, which only lives while the
/// chat screen is showing.
#[derive(Debug)]
pub struct Navigator {
    current: Screen,
    chat: Option<ChatSession>,
    next_session_id: u64,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            current: Screen::Home,
            chat: None,
            next_session_id: 1,
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    /// Chat can only be entered through `start_chat`. Returns whether the screen changed.
    pub fn navigate(&mut self, target: Screen) -> bool {
        if target == Screen::Chat || target == self.current {
            return false;
        }
        if let Some(session) = self.chat.take() {
            info!(session_id = session.id(), "discarding chat session");
        }
        info!(from = self.current.as_str(), to = target.as_str(), "navigating");
        self.current = target;
        true
    }

    pub fn start_chat(
        &mut self,
        model: Option<ModelRef>,
        documents: &[DocumentReference],
    ) -> &mut ChatSession {
        let model = model.unwrap_or_else(ModelRef::unknown);
        let session_id = self.next_session_id;
        self.next_session_id += 1;
        info!(
            session_id,
            model = %model,
            documents = documents.len(),
            "starting chat session"
        );

        self.current = Screen::Chat;
        self.chat.insert(ChatSession::new(session_id, model, documents))
    }

    pub fn chat(&self) -> Option<&ChatSession> {
        self.chat.as_ref()
    }

    /// The live session, only when it is the one `session_id` refers to.
    pub fn chat_for(&mut self, session_id: u64) -> Option<&mut ChatSession> {
        self.chat
            .as_mut()
            .filter(|session| session.id() == session_id)
    }

    pub fn chat_mut(&mut self) -> Option<&mut ChatSession> {
        self.chat.as_mut()
    }
}
