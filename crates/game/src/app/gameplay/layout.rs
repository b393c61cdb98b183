use engine::{BodyDesc, ColliderShape, PhysicsWorld};
use glam::Vec3;
use rand::Rng;

use super::world::{BodyLookup, EntityRef, SpawnError};
use super::{HOUSE_SCATTER_HALF_EXTENT, LOOT_SPAWN_HEIGHT, TREE_SCATTER_HALF_EXTENT};

const MAX_SCATTERED_STRUCTURES: usize = 4096;
const WALL_HEIGHT: f32 = 6.0;
const WALL_THICKNESS: f32 = 0.5;
const HOUSE_HALF_WIDTH: f32 = 5.0;
const DOOR_PIECE_OFFSET: f32 = 3.0;
const DOOR_PIECE_WIDTH: f32 = 4.0;
const DOOR_LINTEL_HEIGHT: f32 = 2.0;
const DOOR_LINTEL_WIDTH: f32 = 2.0;
const TREE_TRUNK_RADIUS: f32 = 1.0;
const TREE_TRUNK_HEIGHT: f32 = 6.0;

/// Static scatter of houses and tree trunks. Positions are ground-level
/// centers; geometry is only registered as colliders.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct WorldLayout {
    houses: Vec<Vec3>,
    trees: Vec<Vec3>,
}

impl WorldLayout {
    pub(crate) fn generate<R: Rng + ?Sized>(
        house_count: usize,
        tree_count: usize,
        rng: &mut R,
    ) -> Result<Self, SpawnError> {
        check_count("house", house_count)?;
        check_count("tree", tree_count)?;
        Ok(Self {
            houses: scatter(house_count, HOUSE_SCATTER_HALF_EXTENT, rng),
            trees: scatter(tree_count, TREE_SCATTER_HALF_EXTENT, rng),
        })
    }

    pub(crate) fn houses(&self) -> &[Vec3] {
        &self.houses
    }

    pub(crate) fn trees(&self) -> &[Vec3] {
        &self.trees
    }

    pub(crate) fn loot_position(house: Vec3) -> Vec3 {
        Vec3::new(house.x, LOOT_SPAWN_HEIGHT, house.z)
    }

    /// Four walls with a door gap in the front (+Z) wall, as
    /// `(center, half_extents)` pairs.
    pub(crate) fn house_walls(house: Vec3) -> [(Vec3, Vec3); 5] {
        let mid_height = WALL_HEIGHT * 0.5;
        let half_thickness = WALL_THICKNESS * 0.5;
        let front_z = house.z + HOUSE_HALF_WIDTH;
        let front_piece = Vec3::new(DOOR_PIECE_WIDTH * 0.5, mid_height, half_thickness);
        [
            (
                Vec3::new(house.x, mid_height, house.z - HOUSE_HALF_WIDTH),
                Vec3::new(HOUSE_HALF_WIDTH, mid_height, half_thickness),
            ),
            (
                Vec3::new(house.x - HOUSE_HALF_WIDTH, mid_height, house.z),
                Vec3::new(half_thickness, mid_height, HOUSE_HALF_WIDTH),
            ),
            (
                Vec3::new(house.x + HOUSE_HALF_WIDTH, mid_height, house.z),
                Vec3::new(half_thickness, mid_height, HOUSE_HALF_WIDTH),
            ),
            (
                Vec3::new(house.x - DOOR_PIECE_OFFSET, mid_height, front_z),
                front_piece,
            ),
            (
                Vec3::new(house.x + DOOR_PIECE_OFFSET, mid_height, front_z),
                front_piece,
            ),
        ]
    }

    pub(crate) fn door_lintel(house: Vec3) -> (Vec3, Vec3) {
        (
            Vec3::new(
                house.x,
                WALL_HEIGHT - DOOR_LINTEL_HEIGHT * 0.5,
                house.z + HOUSE_HALF_WIDTH,
            ),
            Vec3::new(
                DOOR_LINTEL_WIDTH * 0.5,
                DOOR_LINTEL_HEIGHT * 0.5,
                WALL_THICKNESS * 0.5,
            ),
        )
    }

    /// Adds every wall and trunk as a static body. Returns the number added.
    pub(crate) fn register_colliders(
        &self,
        physics: &mut dyn PhysicsWorld,
        lookup: &mut BodyLookup,
    ) -> Result<usize, SpawnError> {
        let mut added = 0usize;
        for house in &self.houses {
            if !house.is_finite() {
                return Err(SpawnError::NonFinitePosition {
                    entity: "house",
                    position: *house,
                });
            }
            let walls = Self::house_walls(*house);
            for (center, half_extents) in walls.into_iter().chain([Self::door_lintel(*house)]) {
                let body = physics.add_body(BodyDesc::fixed(
                    center,
                    ColliderShape::Cuboid { half_extents },
                ));
                lookup.insert(body, EntityRef::Static);
                added += 1;
            }
        }
        for tree in &self.trees {
            if !tree.is_finite() {
                return Err(SpawnError::NonFinitePosition {
                    entity: "tree",
                    position: *tree,
                });
            }
            let body = physics.add_body(BodyDesc::fixed(
                Vec3::new(tree.x, TREE_TRUNK_HEIGHT * 0.5, tree.z),
                ColliderShape::Cylinder {
                    radius: TREE_TRUNK_RADIUS,
                    half_height: TREE_TRUNK_HEIGHT * 0.5,
                },
            ));
            lookup.insert(body, EntityRef::Static);
            added += 1;
        }
        Ok(added)
    }
}

fn check_count(entity: &'static str, count: usize) -> Result<(), SpawnError> {
    if count > MAX_SCATTERED_STRUCTURES {
        return Err(SpawnError::TooMany {
            entity,
            count,
            limit: MAX_SCATTERED_STRUCTURES,
        });
    }
    Ok(())
}

fn scatter<R: Rng + ?Sized>(count: usize, half_extent: f32, rng: &mut R) -> Vec<Vec3> {
    (0..count)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-half_extent..half_extent),
                0.0,
                rng.gen_range(-half_extent..half_extent),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use engine::SimplePhysicsWorld;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn scatter_stays_inside_extents() {
        let mut rng = StdRng::seed_from_u64(99);
        let layout = WorldLayout::generate(15, 50, &mut rng).expect("layout");

        assert_eq!(layout.houses().len(), 15);
        assert_eq!(layout.trees().len(), 50);
        assert!(layout
            .houses()
            .iter()
            .all(|house| house.x.abs() <= HOUSE_SCATTER_HALF_EXTENT
                && house.z.abs() <= HOUSE_SCATTER_HALF_EXTENT));
        assert!(layout
            .trees()
            .iter()
            .all(|tree| tree.x.abs() <= TREE_SCATTER_HALF_EXTENT
                && tree.z.abs() <= TREE_SCATTER_HALF_EXTENT));
    }

    #[test]
    fn oversized_layout_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let result = WorldLayout::generate(MAX_SCATTERED_STRUCTURES + 1, 0, &mut rng);
        assert!(matches!(
            result,
            Err(SpawnError::TooMany { entity: "house", .. })
        ));
    }

    #[test]
    fn house_walls_leave_a_door_gap() {
        let house = Vec3::new(10.0, 0.0, -20.0);
        let walls = WorldLayout::house_walls(house);

        let front = walls
            .iter()
            .filter(|(center, _)| (center.z - (house.z + HOUSE_HALF_WIDTH)).abs() < 1e-5)
            .collect::<Vec<_>>();
        assert_eq!(front.len(), 2);
        let gap_left = front[0].0.x + front[0].1.x;
        let gap_right = front[1].0.x - front[1].1.x;
        assert!((gap_right - gap_left - 2.0).abs() < 1e-5);

        let (lintel, lintel_half) = WorldLayout::door_lintel(house);
        assert_eq!(lintel.y + lintel_half.y, WALL_HEIGHT);
    }

    #[test]
    fn colliders_are_static_and_registered() {
        let mut rng = StdRng::seed_from_u64(5);
        let layout = WorldLayout::generate(2, 3, &mut rng).expect("layout");
        let mut physics = SimplePhysicsWorld::default();
        let mut lookup = BodyLookup::default();

        let added = layout
            .register_colliders(&mut physics, &mut lookup)
            .expect("register");

        assert_eq!(added, 2 * 6 + 3);
        assert_eq!(physics.body_count(), added);
        assert_eq!(lookup.len(), added);
    }

    #[test]
    fn loot_sits_inside_the_house_at_fixed_height() {
        let position = WorldLayout::loot_position(Vec3::new(4.0, 0.0, 7.0));
        assert_eq!(position, Vec3::new(4.0, LOOT_SPAWN_HEIGHT, 7.0));
    }
}
