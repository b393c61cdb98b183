use glam::Vec3;

use super::{BodyHandle, ColliderShape, PhysicsError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3, max_distance: f32) -> Result<Self, PhysicsError> {
        let direction = direction.try_normalize().ok_or(PhysicsError::DegenerateRay)?;
        if !origin.is_finite() {
            return Err(PhysicsError::DegenerateRay);
        }
        Ok(Self {
            origin,
            direction,
            max_distance: if max_distance.is_nan() {
                f32::INFINITY
            } else {
                max_distance.max(0.0)
            },
        })
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
    }

    pub fn point_at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub body: BodyHandle,
    pub distance: f32,
    pub point: Vec3,
}

/// Entry distance of `ray` into `shape` centered at `center`, or `None` on a
/// miss. A ray starting inside the shape reports distance zero.
pub fn intersect_shape(ray: &Ray, center: Vec3, shape: ColliderShape) -> Option<f32> {
    let local_origin = ray.origin - center;
    let (enter, exit) = match shape {
        ColliderShape::Sphere { radius } => sphere_interval(local_origin, ray.direction, radius)?,
        ColliderShape::Cylinder {
            radius,
            half_height,
        } => cylinder_interval(local_origin, ray.direction, radius, half_height)?,
        ColliderShape::Cuboid { half_extents } => {
            slab_interval(local_origin, ray.direction, half_extents)?
        }
    };

    if exit < 0.0 || enter > exit {
        return None;
    }
    let distance = enter.max(0.0);
    (distance <= ray.max_distance).then_some(distance)
}

fn sphere_interval(origin: Vec3, direction: Vec3, radius: f32) -> Option<(f32, f32)> {
    let b = origin.dot(direction);
    let c = origin.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    Some((-b - root, -b + root))
}

fn cylinder_interval(
    origin: Vec3,
    direction: Vec3,
    radius: f32,
    half_height: f32,
) -> Option<(f32, f32)> {
    let (side_enter, side_exit) = {
        let a = direction.x * direction.x + direction.z * direction.z;
        let b = origin.x * direction.x + origin.z * direction.z;
        let c = origin.x * origin.x + origin.z * origin.z - radius * radius;
        if a <= f32::EPSILON {
            // Parallel to the axis: inside the tube everywhere or nowhere.
            if c > 0.0 {
                return None;
            }
            (f32::NEG_INFINITY, f32::INFINITY)
        } else {
            let discriminant = b * b - a * c;
            if discriminant < 0.0 {
                return None;
            }
            let root = discriminant.sqrt();
            ((-b - root) / a, (-b + root) / a)
        }
    };

    let (cap_enter, cap_exit) = axis_interval(origin.y, direction.y, half_height)?;
    Some((side_enter.max(cap_enter), side_exit.min(cap_exit)))
}

fn slab_interval(origin: Vec3, direction: Vec3, half_extents: Vec3) -> Option<(f32, f32)> {
    let (x_enter, x_exit) = axis_interval(origin.x, direction.x, half_extents.x)?;
    let (y_enter, y_exit) = axis_interval(origin.y, direction.y, half_extents.y)?;
    let (z_enter, z_exit) = axis_interval(origin.z, direction.z, half_extents.z)?;
    Some((
        x_enter.max(y_enter).max(z_enter),
        x_exit.min(y_exit).min(z_exit),
    ))
}

fn axis_interval(origin: f32, direction: f32, half_extent: f32) -> Option<(f32, f32)> {
    if direction.abs() <= f32::EPSILON {
        if origin.abs() > half_extent {
            return None;
        }
        return Some((f32::NEG_INFINITY, f32::INFINITY));
    }
    let t0 = (-half_extent - origin) / direction;
    let t1 = (half_extent - origin) / direction;
    Some((t0.min(t1), t0.max(t1)))
}
