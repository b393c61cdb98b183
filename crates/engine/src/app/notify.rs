use serde::Serialize;
use tracing::info;

/// Discrete state changes handed to the presentation layer. The simulation
/// never reads these back.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    AmmoChanged { ammo: u32 },
    HealthChanged { health: f32 },
    Message { text: String },
    GameOver { text: String, color: String },
    AliveCountChanged { alive: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    AmmoChanged,
    HealthChanged,
    Message,
    GameOver,
    AliveCountChanged,
}

impl Notification {
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message { text: text.into() }
    }

    pub fn game_over(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self::GameOver {
            text: text.into(),
            color: color.into(),
        }
    }

    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::AmmoChanged { .. } => NotificationKind::AmmoChanged,
            Self::HealthChanged { .. } => NotificationKind::HealthChanged,
            Self::Message { .. } => NotificationKind::Message,
            Self::GameOver { .. } => NotificationKind::GameOver,
            Self::AliveCountChanged { .. } => NotificationKind::AliveCountChanged,
        }
    }
}

pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

/// Buffers one tick's notifications until the host drains them.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Vec<Notification>,
    total_emitted: u64,
}

impl NotificationQueue {
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.pending)
    }

    pub fn pending(&self) -> &[Notification] {
        &self.pending
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.pending
            .iter()
            .filter(|notification| notification.kind() == kind)
            .count()
    }

    pub fn total_emitted(&self) -> u64 {
        self.total_emitted
    }
}

impl NotificationSink for NotificationQueue {
    fn notify(&mut self, notification: Notification) {
        self.total_emitted = self.total_emitted.saturating_add(1);
        self.pending.push(notification);
    }
}

/// Forwards notifications to the log; used by headless hosts.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&mut self, notification: Notification) {
        match notification {
            Notification::AmmoChanged { ammo } => info!(ammo, "hud_ammo"),
            Notification::HealthChanged { health } => info!(health, "hud_health"),
            Notification::Message { text } => info!(text = text.as_str(), "hud_message"),
            Notification::GameOver { text, color } => {
                info!(text = text.as_str(), color = color.as_str(), "hud_game_over")
            }
            Notification::AliveCountChanged { alive } => info!(alive, "hud_alive_count"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drains_in_emission_order() {
        let mut queue = NotificationQueue::default();
        queue.notify(Notification::AmmoChanged { ammo: 29 });
        queue.notify(Notification::message("Hit Enemy!"));

        let drained = queue.drain();
        assert_eq!(
            drained,
            vec![
                Notification::AmmoChanged { ammo: 29 },
                Notification::message("Hit Enemy!"),
            ]
        );
        assert!(queue.pending().is_empty());
        assert_eq!(queue.total_emitted(), 2);
    }

    #[test]
    fn count_of_filters_by_kind() {
        let mut queue = NotificationQueue::default();
        queue.notify(Notification::HealthChanged { health: 90.0 });
        queue.notify(Notification::HealthChanged { health: 80.0 });
        queue.notify(Notification::game_over("GAME OVER", "red"));

        assert_eq!(queue.count_of(NotificationKind::HealthChanged), 2);
        assert_eq!(queue.count_of(NotificationKind::GameOver), 1);
        assert_eq!(queue.count_of(NotificationKind::Message), 0);
    }

    #[test]
    fn notifications_serialize_with_kind_tag() {
        let value = serde_json::to_value(Notification::AliveCountChanged { alive: 3 })
            .expect("serialize");
        assert_eq!(value["kind"], "alive_count_changed");
        assert_eq!(value["alive"], 3);
    }
}
