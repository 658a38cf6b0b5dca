//! Inspection Queue
//!
//! FIFO of element-inspection requests raised from the client preview.
//! Each queued message becomes one full model turn; the queue is drained
//! strictly in arrival order.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One inspection request captured from the preview pane.
#[derive(Debug, Clone)]
pub struct QueuedInspectionMessage {
    pub id: Uuid,
    /// File the inspected element belongs to.
    pub file_name: String,
    /// Descriptor of the inspected element (tag, selector, snippet).
    pub element: String,
    /// The user's instruction about the element.
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl QueuedInspectionMessage {
    pub fn new(
        file_name: impl Into<String>,
        element: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            file_name: file_name.into(),
            element: element.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Render the user-turn prompt for this inspection.
    pub fn to_prompt(&self) -> String {
        format!(
            "The user selected an element in the preview of `{}`.\nElement: {}\nInstruction: {}",
            self.file_name, self.element, self.message
        )
    }
}

/// FIFO queue of pending inspections.
#[derive(Debug, Default)]
pub struct InspectionQueue {
    items: Mutex<VecDeque<QueuedInspectionMessage>>,
}

impl InspectionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, message: QueuedInspectionMessage) {
        let mut items = match self.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        items.push_back(message);
    }

    /// Remove and return the oldest pending inspection.
    pub fn pop(&self) -> Option<QueuedInspectionMessage> {
        let mut items = match self.items.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        items.pop_front()
    }

    pub fn len(&self) -> usize {
        match self.items.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let queue = InspectionQueue::new();
        queue.enqueue(QueuedInspectionMessage::new("a.html", "<h1>", "first"));
        queue.enqueue(QueuedInspectionMessage::new("a.html", "<p>", "second"));
        queue.enqueue(QueuedInspectionMessage::new("b.html", "<div>", "third"));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop().unwrap().message, "first");
        assert_eq!(queue.pop().unwrap().message, "second");
        assert_eq!(queue.pop().unwrap().message, "third");
        assert!(queue.pop().is_none());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_prompt_carries_file_and_element() {
        let msg = QueuedInspectionMessage::new("index.html", "<button id=\"go\">", "make it blue");
        let prompt = msg.to_prompt();
        assert!(prompt.contains("index.html"));
        assert!(prompt.contains("<button id=\"go\">"));
        assert!(prompt.contains("make it blue"));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = QueuedInspectionMessage::new("a", "e", "m");
        let b = QueuedInspectionMessage::new("a", "e", "m");
        assert_ne!(a.id, b.id);
    }
}
