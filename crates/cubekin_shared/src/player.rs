use std::f32::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use glam::{IVec3, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::BlockType;
use crate::inventory::{Inventory, HOTBAR_SIZE};
use crate::physics::{raycast_world, Ray, AABB};
use crate::world::WorldStore;

pub const PLAYER_HEIGHT: f32 = 1.8;
pub const DEFAULT_REACH: f32 = 128.0;
pub const DEFAULT_MOUSE_SENSITIVITY: f32 = 0.002;
const HORIZONTAL_DAMPING: f32 = 10.0;
const GRAVITY: f32 = 980.0;
const MOVE_ACCELERATION: f32 = 400.0;
const JUMP_IMPULSE: f32 = 10.0;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
/// Half extents of the volume around the camera that placement may not fill.
const PLAYER_CLEARANCE: Vec3 = Vec3::new(0.5, 1.5, 0.5);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MoveFlags: u8 {
        const FORWARD  = 0b0000_0001;
        const BACKWARD = 0b0000_0010;
        const LEFT     = 0b0000_0100;
        const RIGHT    = 0b0000_1000;
    }
}

impl Default for MoveFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl MoveFlags {
    fn axis(self, positive: MoveFlags, negative: MoveFlags) -> f32 {
        f32::from(u8::from(self.contains(positive))) - f32::from(u8::from(self.contains(negative)))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Survival => "survival",
            GameMode::Creative => "creative",
            GameMode::Adventure => "adventure",
        }
    }

    fn collects_drops(self) -> bool {
        matches!(self, GameMode::Survival | GameMode::Adventure)
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "survival" => Ok(GameMode::Survival),
            "creative" => Ok(GameMode::Creative),
            "adventure" => Ok(GameMode::Adventure),
            other => Err(format!("unknown game mode '{other}'")),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlacementRejection {
    EmptySlot,
    NotPlaceable(BlockType),
    OverlapsPlayer,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InteractionOutcome {
    Broken { position: IVec3, kind: BlockType },
    Placed { position: IVec3, kind: BlockType },
    Rejected(PlacementRejection),
    NoTarget,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Camera (eye) position; feet are `PLAYER_HEIGHT` below.
    pub position: Vec3,
    /// x is strafe (right positive), z is forward, both in look-relative axes.
    pub velocity: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub selected_hotbar: usize,
    pub game_mode: GameMode,
    pub can_jump: bool,
}

impl PlayerState {
    pub fn new(position: Vec3, game_mode: GameMode) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            selected_hotbar: 0,
            game_mode,
            can_jump: false,
        }
    }

    /// Yaw 0 looks down -z.
    pub fn look_direction(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        Vec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
    }

    pub fn forward_horizontal(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(-sin_yaw, 0.0, -cos_yaw)
    }

    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_yaw, 0.0, -sin_yaw)
    }
}

pub struct PlayerController {
    pub state: PlayerState,
    pub inventory: Inventory,
    reach: f32,
}

impl PlayerController {
    pub fn new(position: Vec3, game_mode: GameMode, reach: f32) -> Self {
        let mut inventory = Inventory::new();
        if game_mode == GameMode::Creative {
            inventory.fill_creative_hotbar();
        }
        Self {
            state: PlayerState::new(position, game_mode),
            inventory,
            reach: reach.max(0.0),
        }
    }

    pub fn spawn_on(world: &WorldStore, x: i32, z: i32, game_mode: GameMode, reach: f32) -> Self {
        let ground = world.ground_height(x, z) as f32 + PLAYER_HEIGHT;
        Self::new(Vec3::new(x as f32, ground, z as f32), game_mode, reach)
    }

    pub fn look(&mut self, delta: Vec2, sensitivity: f32) {
        self.state.yaw -= delta.x * sensitivity;
        self.state.pitch =
            (self.state.pitch - delta.y * sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn select_hotbar(&mut self, index: usize) {
        if index < HOTBAR_SIZE {
            self.state.selected_hotbar = index;
        }
    }

    pub fn jump(&mut self) -> bool {
        if !self.state.can_jump {
            return false;
        }
        self.state.velocity.y += JUMP_IMPULSE;
        self.state.can_jump = false;
        true
    }

    pub fn tick(&mut self, world: &WorldStore, dt: f32, moves: MoveFlags) {
        let dt = dt.max(0.0);
        let state = &mut self.state;

        state.velocity.x -= state.velocity.x * HORIZONTAL_DAMPING * dt;
        state.velocity.z -= state.velocity.z * HORIZONTAL_DAMPING * dt;
        state.velocity.y -= GRAVITY * dt;

        let direction = Vec2::new(
            moves.axis(MoveFlags::RIGHT, MoveFlags::LEFT),
            moves.axis(MoveFlags::FORWARD, MoveFlags::BACKWARD),
        )
        .normalize_or_zero();
        if moves.intersects(MoveFlags::FORWARD | MoveFlags::BACKWARD) {
            state.velocity.z += direction.y * MOVE_ACCELERATION * dt;
        }
        if moves.intersects(MoveFlags::LEFT | MoveFlags::RIGHT) {
            state.velocity.x += direction.x * MOVE_ACCELERATION * dt;
        }

        let planar =
            state.right() * state.velocity.x + state.forward_horizontal() * state.velocity.z;
        state.position += planar * dt;
        state.position.y += state.velocity.y * dt;

        let floor = world.ground_height(
            state.position.x.floor() as i32,
            state.position.z.floor() as i32,
        ) as f32
            + PLAYER_HEIGHT;
        if state.position.y < floor {
            state.position.y = floor;
            state.velocity.y = 0.0;
            state.can_jump = true;
        } else {
            state.can_jump = false;
        }
    }

    pub fn look_ray(&self) -> Ray {
        Ray {
            origin: self.state.position,
            direction: self.state.look_direction(),
        }
    }

    pub fn break_block(&mut self, world: &mut WorldStore) -> InteractionOutcome {
        let Some(hit) = raycast_world(world, &self.look_ray(), self.reach) else {
            return InteractionOutcome::NoTarget;
        };

        world.remove(hit.block);
        if self.state.game_mode.collects_drops() {
            self.inventory.add_item(hit.kind, 1);
        }
        InteractionOutcome::Broken {
            position: hit.block,
            kind: hit.kind,
        }
    }

    pub fn place_block(&mut self, world: &mut WorldStore) -> InteractionOutcome {
        let Some(hit) = raycast_world(world, &self.look_ray(), self.reach) else {
            return InteractionOutcome::NoTarget;
        };

        let selected = self.state.selected_hotbar;
        let kind = match (self.inventory.selected_item(selected), self.state.game_mode) {
            (Some(item), _) => item,
            (None, GameMode::Creative) => BlockType::DEFAULT_HOTBAR[selected % HOTBAR_SIZE],
            (None, _) => return self.reject(PlacementRejection::EmptySlot),
        };
        if !kind.is_placeable() {
            return self.reject(PlacementRejection::NotPlaceable(kind));
        }

        let target = hit.adjacent();
        let clearance = AABB::around(self.state.position, PLAYER_CLEARANCE);
        if clearance.contains_point(target.as_vec3()) {
            return self.reject(PlacementRejection::OverlapsPlayer);
        }

        if self.state.game_mode == GameMode::Survival {
            self.inventory.take_from_selected(selected);
        }
        world.place(target, kind);
        InteractionOutcome::Placed {
            position: target,
            kind,
        }
    }

    fn reject(&self, reason: PlacementRejection) -> InteractionOutcome {
        debug!("Placement rejected: {reason:?}");
        InteractionOutcome::Rejected(reason)
    }
}
