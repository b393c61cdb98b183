use glam::Vec3;
use rand::Rng;
use tracing::debug;

use super::player::Player;
use super::{LOOT_WEAPON_PROBABILITY, MEDKIT_HEAL_AMOUNT, WEAPON_AMMO_BONUS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct LootId(pub(crate) u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LootKind {
    Weapon,
    Medkit,
}

impl LootKind {
    pub(crate) fn as_token(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::Medkit => "medkit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum PickupOutcome {
    AmmoGranted { ammo: u32 },
    Healed { health: f32 },
}

impl PickupOutcome {
    pub(crate) fn message(self) -> &'static str {
        match self {
            Self::AmmoGranted { .. } => "Picked up Ammo!",
            Self::Healed { .. } => "Used Medkit!",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LootItem {
    id: LootId,
    kind: LootKind,
    position: Vec3,
    active: bool,
}

impl LootItem {
    pub(crate) fn id(&self) -> LootId {
        self.id
    }

    pub(crate) fn kind(&self) -> LootKind {
        self.kind
    }

    /// Resting position used for proximity checks.
    pub(crate) fn position(&self) -> Vec3 {
        self.position
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    /// Applies the item's effect to `player` once. Picking up an item that is
    /// already inactive does nothing.
    pub(crate) fn pickup(&mut self, player: &mut Player) -> Option<PickupOutcome> {
        if !self.active {
            return None;
        }
        self.active = false;
        let outcome = match self.kind {
            LootKind::Weapon => PickupOutcome::AmmoGranted {
                ammo: player.add_ammo(WEAPON_AMMO_BONUS),
            },
            LootKind::Medkit => PickupOutcome::Healed {
                health: player.heal(MEDKIT_HEAL_AMOUNT),
            },
        };
        debug!(loot_id = self.id.0, kind = self.kind.as_token(), "loot_picked_up");
        Some(outcome)
    }
}

#[derive(Debug, Default)]
pub(crate) struct LootManager {
    items: Vec<LootItem>,
    next_loot_id: u64,
}

impl LootManager {
    pub(crate) fn spawn_loot<R: Rng + ?Sized>(&mut self, position: Vec3, rng: &mut R) -> LootId {
        let kind = if rng.gen_bool(LOOT_WEAPON_PROBABILITY) {
            LootKind::Weapon
        } else {
            LootKind::Medkit
        };
        self.insert(position, kind)
    }

    #[cfg(test)]
    pub(crate) fn spawn_loot_of_kind(&mut self, position: Vec3, kind: LootKind) -> LootId {
        self.insert(position, kind)
    }

    fn insert(&mut self, position: Vec3, kind: LootKind) -> LootId {
        let id = LootId(self.next_loot_id);
        self.next_loot_id = self.next_loot_id.saturating_add(1);
        self.items.push(LootItem {
            id,
            kind,
            position,
            active: true,
        });
        id
    }

    /// Drops every item picked up since the last call. Must run after all
    /// readers of this tick's collection.
    pub(crate) fn prune(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(LootItem::is_active);
        before - self.items.len()
    }

    pub(crate) fn items(&self) -> &[LootItem] {
        &self.items
    }

    pub(crate) fn find_mut(&mut self, id: LootId) -> Option<&mut LootItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub(crate) fn active_count(&self) -> usize {
        self.items.iter().filter(|item| item.active).count()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    use super::*;

    #[test]
    fn spawn_loot_accepts_trait_object_rng() {
        let mut seeded = StdRng::seed_from_u64(9);
        let rng: &mut dyn RngCore = &mut seeded;
        let mut manager = LootManager::default();

        let id = manager.spawn_loot(Vec3::new(4.0, 1.0, -2.0), rng);

        let item = manager.find_mut(id).expect("spawned item");
        assert_eq!(item.position(), Vec3::new(4.0, 1.0, -2.0));
        assert!(item.is_active());
    }

    #[test]
    fn weapon_and_medkit_split_converges_to_half() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut manager = LootManager::default();
        for _ in 0..10_000 {
            manager.spawn_loot(Vec3::ZERO, &mut rng);
        }

        let weapons = manager
            .items()
            .iter()
            .filter(|item| item.kind() == LootKind::Weapon)
            .count();
        let ratio = weapons as f32 / 10_000.0;
        assert!((0.47..=0.53).contains(&ratio), "weapon ratio {ratio}");
    }

    #[test]
    fn ids_are_unique_and_spawn_order_is_kept() {
        let mut manager = LootManager::default();
        let first = manager.spawn_loot_of_kind(Vec3::ZERO, LootKind::Weapon);
        let second = manager.spawn_loot_of_kind(Vec3::X, LootKind::Medkit);

        assert_ne!(first, second);
        let ids = manager.items().iter().map(LootItem::id).collect::<Vec<_>>();
        assert_eq!(ids, vec![first, second]);
    }

    #[test]
    fn update_prunes_only_picked_up_items() {
        let mut manager = LootManager::default();
        let kept = manager.spawn_loot_of_kind(Vec3::ZERO, LootKind::Weapon);
        let taken = manager.spawn_loot_of_kind(Vec3::X, LootKind::Medkit);
        let mut player = Player::detached();

        let outcome = manager
            .find_mut(taken)
            .expect("item")
            .pickup(&mut player);
        assert!(outcome.is_some());
        assert_eq!(manager.items().len(), 2);
        assert_eq!(manager.active_count(), 1);

        assert_eq!(manager.prune(), 1);
        assert_eq!(
            manager.items().iter().map(LootItem::id).collect::<Vec<_>>(),
            vec![kept]
        );
        assert!(manager.find_mut(taken).is_none());
    }

    #[test]
    fn weapon_grants_uncapped_ammo() {
        let mut manager = LootManager::default();
        let id = manager.spawn_loot_of_kind(Vec3::ZERO, LootKind::Weapon);
        let mut player = Player::detached();

        let outcome = manager.find_mut(id).expect("item").pickup(&mut player);

        assert_eq!(outcome, Some(PickupOutcome::AmmoGranted { ammo: 60 }));
        assert_eq!(player.ammo(), 60);
    }

    #[test]
    fn medkit_heal_is_capped_at_max_health() {
        let mut manager = LootManager::default();
        let id = manager.spawn_loot_of_kind(Vec3::ZERO, LootKind::Medkit);
        let mut player = Player::detached();
        player.take_damage(30.0);

        let outcome = manager.find_mut(id).expect("item").pickup(&mut player);

        assert_eq!(outcome, Some(PickupOutcome::Healed { health: 100.0 }));
        assert_eq!(player.health(), 100.0);
    }

    #[test]
    fn pickup_applies_exactly_once() {
        let mut manager = LootManager::default();
        let id = manager.spawn_loot_of_kind(Vec3::ZERO, LootKind::Weapon);
        let mut player = Player::detached();
        let item = manager.find_mut(id).expect("item");

        assert!(item.pickup(&mut player).is_some());
        assert!(item.pickup(&mut player).is_none());
        assert_eq!(player.ammo(), 60);
    }
}
