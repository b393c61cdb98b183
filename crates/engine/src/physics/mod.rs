//! Rigid-body seam consumed by the simulation core.
//!
//! The core only reads and writes body position/velocity and asks for ray
//! intersections; integration and collision response belong to whichever
//! [`PhysicsWorld`] the host wires in. [`SimplePhysicsWorld`] is the
//! reference implementation used headless and in tests.

mod ray;
mod world;

use glam::Vec3;
use thiserror::Error;

pub use ray::{intersect_shape, Ray, RayHit};
pub use world::{SimplePhysicsWorld, DEFAULT_GRAVITY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    /// Upright cylinder centered on the body position.
    Cylinder { radius: f32, half_height: f32 },
    Cuboid { half_extents: Vec3 },
}

impl ColliderShape {
    /// Distance from the body center down to the lowest point of the shape.
    pub fn lower_extent(&self) -> f32 {
        match *self {
            Self::Sphere { radius } => radius,
            Self::Cylinder { half_height, .. } => half_height,
            Self::Cuboid { half_extents } => half_extents.y,
        }
    }

    /// Horizontal radius used for push-out against static geometry.
    pub fn horizontal_radius(&self) -> f32 {
        match *self {
            Self::Sphere { radius } => radius,
            Self::Cylinder { radius, .. } => radius,
            Self::Cuboid { half_extents } => half_extents.x.max(half_extents.z),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub position: Vec3,
    /// Zero mass marks a static body.
    pub mass: f32,
    pub shape: ColliderShape,
    pub linear_damping: f32,
    pub fixed_rotation: bool,
}

impl BodyDesc {
    pub fn dynamic(position: Vec3, mass: f32, shape: ColliderShape) -> Self {
        Self {
            position,
            mass,
            shape,
            linear_damping: 0.01,
            fixed_rotation: false,
        }
    }

    pub fn fixed(position: Vec3, shape: ColliderShape) -> Self {
        Self {
            position,
            mass: 0.0,
            shape,
            linear_damping: 0.0,
            fixed_rotation: true,
        }
    }

    pub fn with_linear_damping(mut self, linear_damping: f32) -> Self {
        self.linear_damping = linear_damping;
        self
    }

    pub fn with_fixed_rotation(mut self, fixed_rotation: bool) -> Self {
        self.fixed_rotation = fixed_rotation;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RigidBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub fixed_rotation: bool,
    pub linear_damping: f32,
    mass: f32,
    shape: ColliderShape,
}

impl RigidBody {
    pub fn from_desc(desc: BodyDesc) -> Self {
        Self {
            position: desc.position,
            velocity: Vec3::ZERO,
            fixed_rotation: desc.fixed_rotation,
            linear_damping: desc.linear_damping,
            mass: desc.mass.max(0.0),
            shape: desc.shape,
        }
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn shape(&self) -> ColliderShape {
        self.shape
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhysicsError {
    #[error("no rigid body registered for handle {0:?}")]
    UnknownBody(BodyHandle),
    #[error("ray direction must be non-zero and finite")]
    DegenerateRay,
}

pub trait PhysicsWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle;
    fn body(&self, handle: BodyHandle) -> Option<&RigidBody>;
    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody>;
    fn step(&mut self, dt: f32);
    /// Every collider the ray crosses, nearest first, one hit per body.
    fn cast_ray(&self, ray: &Ray) -> Vec<RayHit>;

    fn try_body(&self, handle: BodyHandle) -> Result<&RigidBody, PhysicsError> {
        self.body(handle).ok_or(PhysicsError::UnknownBody(handle))
    }

    fn try_body_mut(&mut self, handle: BodyHandle) -> Result<&mut RigidBody, PhysicsError> {
        self.body_mut(handle).ok_or(PhysicsError::UnknownBody(handle))
    }
}
