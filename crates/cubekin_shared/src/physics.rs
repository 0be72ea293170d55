use glam::{IVec3, Vec3};

use crate::block::BlockType;
use crate::world::WorldStore;

/// Blocks are unit cubes centred on their integer coordinate, so cell
/// boundaries sit at half-integers.
const CELL_CENTER_OFFSET: f32 = 0.5;

#[derive(Debug, Copy, Clone)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    pub fn around(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Inclusive on every face.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub fn normal_ivec3(&self) -> IVec3 {
        match self {
            Face::PosX => IVec3::X,
            Face::NegX => IVec3::NEG_X,
            Face::PosY => IVec3::Y,
            Face::NegY => IVec3::NEG_Y,
            Face::PosZ => IVec3::Z,
            Face::NegZ => IVec3::NEG_Z,
        }
    }

    // Face crossed when stepping into a cell along `axis` in direction `step`.
    fn entered(axis: usize, step: i32) -> Self {
        match (axis, step > 0) {
            (0, true) => Face::NegX,
            (0, false) => Face::PosX,
            (1, true) => Face::NegY,
            (1, false) => Face::PosY,
            (_, true) => Face::NegZ,
            (_, false) => Face::PosZ,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RaycastHit {
    pub block: IVec3,
    pub kind: BlockType,
    pub face: Face,
    pub distance: f32,
}

impl RaycastHit {
    pub fn adjacent(&self) -> IVec3 {
        self.block + self.face.normal_ivec3()
    }
}

/// Amanatides-Woo traversal over centred unit cells. Yields every cell the ray
/// enters after the one containing its origin, with the face it entered through
/// and the distance along the ray at the crossing.
#[derive(Debug, Copy, Clone)]
pub struct RaycastIter {
    current: IVec3,
    step: IVec3,
    t_max: Vec3,
    t_delta: Vec3,
    max_distance: f32,
    finished: bool,
}

impl RaycastIter {
    fn new(ray: &Ray, max_distance: f32) -> Self {
        let direction = ray.direction.normalize_or_zero();
        let shifted = ray.origin + Vec3::splat(CELL_CENTER_OFFSET);
        let current = shifted.floor().as_ivec3();

        let mut step = IVec3::ZERO;
        let mut t_max = Vec3::splat(f32::INFINITY);
        let mut t_delta = Vec3::splat(f32::INFINITY);
        for axis in 0..3 {
            let d = direction[axis];
            if d == 0.0 {
                continue;
            }
            step[axis] = if d > 0.0 { 1 } else { -1 };
            let boundary = if d > 0.0 {
                current[axis] as f32 + 1.0
            } else {
                current[axis] as f32
            };
            t_max[axis] = (boundary - shifted[axis]) / d;
            t_delta[axis] = 1.0 / d.abs();
        }

        Self {
            current,
            step,
            t_max,
            t_delta,
            max_distance: max_distance.max(0.0),
            finished: direction == Vec3::ZERO,
        }
    }
}

impl Iterator for RaycastIter {
    type Item = (IVec3, Face, f32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let axis = if self.t_max.x <= self.t_max.y && self.t_max.x <= self.t_max.z {
            0
        } else if self.t_max.y <= self.t_max.z {
            1
        } else {
            2
        };
        let distance = self.t_max[axis];
        if !distance.is_finite() || distance > self.max_distance {
            self.finished = true;
            return None;
        }

        self.current[axis] += self.step[axis];
        self.t_max[axis] += self.t_delta[axis];
        Some((self.current, Face::entered(axis, self.step[axis]), distance))
    }
}

pub fn raycast_blocks(ray: &Ray, max_distance: f32) -> RaycastIter {
    RaycastIter::new(ray, max_distance)
}

pub fn raycast_world(world: &WorldStore, ray: &Ray, max_distance: f32) -> Option<RaycastHit> {
    raycast_blocks(ray, max_distance).find_map(|(cell, face, distance)| {
        world.get(cell).map(|block| RaycastHit {
            block: cell,
            kind: block.kind,
            face,
            distance,
        })
    })
}
