use glam::{Vec2, Vec3};

use super::ray::intersect_shape;
use super::{BodyDesc, BodyHandle, ColliderShape, PhysicsWorld, Ray, RayHit, RigidBody};

pub const DEFAULT_GRAVITY: Vec3 = Vec3::new(0.0, -9.82, 0.0);

/// Minimal rigid-body world: gravity, linear damping, a ground plane at
/// y = 0 and horizontal push-out from static colliders. No body-body
/// response between dynamic bodies.
#[derive(Debug)]
pub struct SimplePhysicsWorld {
    gravity: Vec3,
    next_handle: u64,
    bodies: Vec<(BodyHandle, RigidBody)>,
}

impl Default for SimplePhysicsWorld {
    fn default() -> Self {
        Self::with_gravity(DEFAULT_GRAVITY)
    }
}

impl SimplePhysicsWorld {
    pub fn with_gravity(gravity: Vec3) -> Self {
        Self {
            gravity,
            next_handle: 0,
            bodies: Vec::new(),
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.gravity
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn index_of(&self, handle: BodyHandle) -> Option<usize> {
        self.bodies
            .binary_search_by_key(&handle, |(existing, _)| *existing)
            .ok()
    }

    fn integrate(&self, body: &mut RigidBody, dt: f32) {
        body.velocity += self.gravity * dt;
        let damping = (1.0 - body.linear_damping).clamp(0.0, 1.0);
        body.velocity *= damping.powf(dt);
        body.position += body.velocity * dt;

        let rest_height = body.shape().lower_extent();
        if body.position.y < rest_height {
            body.position.y = rest_height;
            if body.velocity.y < 0.0 {
                body.velocity.y = 0.0;
            }
        }
    }
}

impl PhysicsWorld for SimplePhysicsWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle = self.next_handle.saturating_add(1);
        self.bodies.push((handle, RigidBody::from_desc(desc)));
        handle
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.index_of(handle).map(|index| &self.bodies[index].1)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.index_of(handle).map(|index| &mut self.bodies[index].1)
    }

    fn step(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let statics = self
            .bodies
            .iter()
            .filter(|(_, body)| body.is_static())
            .map(|(_, body)| (body.position, body.shape()))
            .collect::<Vec<_>>();

        let mut bodies = std::mem::take(&mut self.bodies);
        for (_, body) in bodies.iter_mut().filter(|(_, body)| !body.is_static()) {
            self.integrate(body, dt);
            for (static_position, static_shape) in &statics {
                push_out_of_static(body, *static_position, *static_shape);
            }
        }
        self.bodies = bodies;
    }

    fn cast_ray(&self, ray: &Ray) -> Vec<RayHit> {
        let mut hits = self
            .bodies
            .iter()
            .filter_map(|(handle, body)| {
                intersect_shape(ray, body.position, body.shape()).map(|distance| RayHit {
                    body: *handle,
                    distance,
                    point: ray.point_at(distance),
                })
            })
            .collect::<Vec<_>>();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn push_out_of_static(body: &mut RigidBody, static_position: Vec3, static_shape: ColliderShape) {
    let body_half_height = body.shape().lower_extent();
    let static_half_height = static_shape.lower_extent();
    let vertical_gap = (body.position.y - static_position.y).abs();
    if vertical_gap >= body_half_height + static_half_height {
        return;
    }

    let radius = body.shape().horizontal_radius();
    let center = Vec2::new(body.position.x, body.position.z);
    let static_center = Vec2::new(static_position.x, static_position.z);

    let push = match static_shape {
        ColliderShape::Sphere { radius: other } | ColliderShape::Cylinder { radius: other, .. } => {
            let offset = center - static_center;
            let distance = offset.length();
            let min_distance = radius + other;
            if distance >= min_distance {
                return;
            }
            let normal = offset.try_normalize().unwrap_or(Vec2::X);
            normal * (min_distance - distance)
        }
        ColliderShape::Cuboid { half_extents } => {
            let half = Vec2::new(half_extents.x, half_extents.z);
            let local = center - static_center;
            let closest = local.clamp(-half, half);
            let offset = local - closest;
            let distance = offset.length();
            if distance > f32::EPSILON {
                if distance >= radius {
                    return;
                }
                offset / distance * (radius - distance)
            } else {
                // Center is inside the footprint: leave along the shallowest axis.
                let depth_x = half.x - local.x.abs() + radius;
                let depth_z = half.y - local.y.abs() + radius;
                if depth_x < depth_z {
                    Vec2::new(depth_x.copysign(local.x), 0.0)
                } else {
                    Vec2::new(0.0, depth_z.copysign(local.y))
                }
            }
        }
    };

    body.position.x += push.x;
    body.position.z += push.y;

    let normal = push.normalize_or_zero();
    let horizontal = Vec2::new(body.velocity.x, body.velocity.z);
    let into_wall = horizontal.dot(normal);
    if into_wall < 0.0 {
        let corrected = horizontal - normal * into_wall;
        body.velocity.x = corrected.x;
        body.velocity.z = corrected.y;
    }
}
