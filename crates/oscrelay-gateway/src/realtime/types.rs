use axum::extract::ws::Message;

/// Prepared text frame cached for broadcasting (serialize once, send N times).
#[derive(Debug, Clone)]
pub struct PreparedMsg {
    text: String,
}

impl PreparedMsg {
    pub fn text(text: String) -> Self {
        Self { text }
    }

    /// Convert to axum::ws::Message for transport.
    pub fn to_ws_message(&self) -> Message {
        Message::Text(self.text.clone())
    }
}
