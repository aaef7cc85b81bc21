use crate::panel::PanelGroup;
use tokio::sync::mpsc;

/// Notifications published by an editing session
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// Panel records changed; renderers should repaint
    LayoutChanged { revision: u64, key: Option<String> },
    ActivePanelChanged { key: String },
    GroupChanged { group: PanelGroup },
    HistoryMoved { cursor: usize, len: usize },
}

/// Typed fan-out to any number of subscribers
///
/// Subscribers whose receiver was dropped are pruned on the next publish.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<mpsc::UnboundedSender<EditorEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<EditorEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn publish(&mut self, event: EditorEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
