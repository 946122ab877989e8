//! One-shot, dismissable notifications

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub variant: Variant,
}

/// Pending notifications, oldest first
#[derive(Debug, Default)]
pub struct Notifications {
    next_id: u64,
    pending: VecDeque<Notification>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, title: &str, description: &str, variant: Variant) -> u64 {
        self.next_id += 1;
        self.pending.push_back(Notification {
            id: self.next_id,
            title: title.to_string(),
            description: description.to_string(),
            variant,
        });
        self.next_id
    }

    pub fn success(&mut self, title: &str, description: &str) -> u64 {
        self.push(title, description, Variant::Default)
    }

    /// Destructive notification titled "Erreur"
    pub fn failure(&mut self, description: &str) -> u64 {
        self.push("Erreur", description, Variant::Destructive)
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.pending.len();
        self.pending.retain(|n| n.id != id);
        before != self.pending.len()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Notification> {
        self.pending.iter()
    }

    pub fn latest(&self) -> Option<&Notification> {
        self.pending.back()
    }

    /// Take everything pending, leaving the queue empty
    pub fn drain(&mut self) -> Vec<Notification> {
        self.pending.drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismiss_removes_only_the_target() {
        let mut notifications = Notifications::new();
        let first = notifications.success("Vote enregistré", "ok");
        let second = notifications.failure("Impossible de charger les restaurants");

        assert!(notifications.dismiss(first));
        assert!(!notifications.dismiss(first));
        let latest = notifications.latest().unwrap();
        assert_eq!(latest.id, second);
        assert_eq!(latest.variant, Variant::Destructive);
        assert_eq!(latest.title, "Erreur");
    }

    #[test]
    fn drain_empties_the_queue() {
        let mut notifications = Notifications::new();
        notifications.success("a", "b");
        notifications.success("c", "d");
        assert_eq!(notifications.drain().len(), 2);
        assert!(notifications.is_empty());
    }
}
