use super::input::IntentSnapshot;
use super::notify::Notification;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Finished,
}

/// A frame-stepped simulation driven by the loop runner. Each `tick` runs to
/// completion before the next begins; intents are applied inside the tick.
pub trait Simulation {
    type View;

    fn tick(&mut self, dt_seconds: f32, intent: &IntentSnapshot) -> TickOutcome;
    fn view(&self) -> Self::View;
    fn drain_notifications(&mut self) -> Vec<Notification>;
    fn shutdown(&mut self) {}
}

/// Host-side producer of per-tick intent (keyboard/touch bridge, script, bot
/// pilot).
pub trait IntentSource<V> {
    fn next_intent(&mut self, view: &V) -> IntentSnapshot;
}

/// Replays a fixed list of intents, then idles.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIntents {
    script: Vec<IntentSnapshot>,
    cursor: usize,
}

impl ScriptedIntents {
    pub fn new(script: Vec<IntentSnapshot>) -> Self {
        Self { script, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.script.len().saturating_sub(self.cursor)
    }
}

impl<V> IntentSource<V> for ScriptedIntents {
    fn next_intent(&mut self, _view: &V) -> IntentSnapshot {
        let intent = self
            .script
            .get(self.cursor)
            .copied()
            .unwrap_or_else(IntentSnapshot::empty);
        self.cursor = self.cursor.saturating_add(1);
        intent
    }
}
