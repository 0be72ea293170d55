use std::f32::consts::TAU;

use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::world::WorldStore;

pub const MOB_MAX_COUNT: usize = 20;
pub const MOB_SPAWN_INTERVAL_MS: f32 = 10_000.0;
pub const MOB_SPAWN_RADIUS: f32 = 15.0;
pub const MOB_CHASE_RANGE: f32 = 32.0;
pub const MOB_ATTACK_RANGE: f32 = 2.0;

const HOSTILE_WANDER_SECS: f32 = 2.0;
const PASSIVE_WANDER_SECS: f32 = 3.0;
// Per-tick distance is `speed * SPEED_SCALE * dt`.
const SPEED_SCALE: f32 = 1000.0;
const MOB_RNG_SALT: u64 = 0x5EED_0F_0B_u64;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobType {
    Zombie,
    Creeper,
    Cow,
    Pig,
    Chicken,
}

impl MobType {
    pub const ALL: [MobType; 5] = [
        Self::Zombie,
        Self::Creeper,
        Self::Cow,
        Self::Pig,
        Self::Chicken,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Zombie => "zombie",
            Self::Creeper => "creeper",
            Self::Cow => "cow",
            Self::Pig => "pig",
            Self::Chicken => "chicken",
        }
    }
}

pub struct MobProperties {
    pub glyph: &'static str,
    pub max_health: f32,
    pub speed: f32,
    pub hostile: bool,
}

pub fn mob_properties(mob_type: MobType) -> MobProperties {
    match mob_type {
        MobType::Zombie => MobProperties {
            glyph: "🧟",
            max_health: 20.0,
            speed: 0.02,
            hostile: true,
        },
        MobType::Creeper => MobProperties {
            glyph: "💥",
            max_health: 20.0,
            speed: 0.015,
            hostile: true,
        },
        MobType::Cow => MobProperties {
            glyph: "🐄",
            max_health: 10.0,
            speed: 0.01,
            hostile: false,
        },
        MobType::Pig => MobProperties {
            glyph: "🐷",
            max_health: 10.0,
            speed: 0.01,
            hostile: false,
        },
        MobType::Chicken => MobProperties {
            glyph: "🐔",
            max_health: 4.0,
            speed: 0.015,
            hostile: false,
        },
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mob {
    pub mob_type: MobType,
    pub position: Vec3,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub hostile: bool,
    /// Horizontal unit vector used while wandering.
    pub wander_direction: Vec3,
    /// Seconds since `wander_direction` last changed.
    pub last_move: f32,
    pub yaw: f32,
}

impl Mob {
    pub fn new(mob_type: MobType, position: Vec3, wander_direction: Vec3) -> Self {
        let props = mob_properties(mob_type);
        Self {
            mob_type,
            position,
            health: props.max_health,
            max_health: props.max_health,
            speed: props.speed,
            hostile: props.hostile,
            wander_direction,
            last_move: 0.0,
            yaw: 0.0,
        }
    }

    pub fn glyph(&self) -> &'static str {
        mob_properties(self.mob_type).glyph
    }

    fn wander_interval(&self) -> f32 {
        if self.hostile {
            HOSTILE_WANDER_SECS
        } else {
            PASSIVE_WANDER_SECS
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MobEvent {
    Attack {
        index: usize,
        mob_type: MobType,
        distance: f32,
    },
}

pub fn random_horizontal_direction(rng: &mut impl Rng) -> Vec3 {
    let angle = rng.gen_range(0.0..TAU);
    Vec3::new(angle.cos(), 0.0, angle.sin())
}

/// Yaw that makes a camera-style forward vector `(-sin, 0, -cos)` point along `direction`.
pub fn yaw_towards(direction: Vec3) -> f32 {
    (-direction.x).atan2(-direction.z)
}

pub struct MobSimulation {
    mobs: Vec<Mob>,
    spawn_timer_ms: f32,
    spawn_interval_ms: f32,
    max_mobs: usize,
    rng: StdRng,
}

impl MobSimulation {
    pub fn new(seed: u64, spawn_interval_ms: f32, max_mobs: usize) -> Self {
        Self {
            mobs: Vec::new(),
            spawn_timer_ms: 0.0,
            spawn_interval_ms: spawn_interval_ms.max(1.0),
            max_mobs: max_mobs.min(MOB_MAX_COUNT),
            rng: StdRng::seed_from_u64(seed ^ MOB_RNG_SALT),
        }
    }

    pub fn mobs(&self) -> &[Mob] {
        &self.mobs
    }

    pub fn len(&self) -> usize {
        self.mobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mobs.is_empty()
    }

    pub fn max_mobs(&self) -> usize {
        self.max_mobs
    }

    /// Refused mobs are dropped.
    pub fn insert(&mut self, mob: Mob) -> bool {
        if self.mobs.len() >= self.max_mobs {
            debug!("Mob cap {} reached, dropping {}", self.max_mobs, mob.mob_type.name());
            return false;
        }
        self.mobs.push(mob);
        true
    }

    pub fn tick(&mut self, dt: f32, player_pos: Vec3, world: &WorldStore) -> Vec<MobEvent> {
        let dt = dt.max(0.0);
        let mut events = Vec::new();

        for (index, mob) in self.mobs.iter_mut().enumerate() {
            let step_len = mob.speed * SPEED_SCALE * dt;
            let to_player = player_pos - mob.position;
            let distance = to_player.length();

            let step = if mob.hostile && distance < MOB_CHASE_RANGE {
                if distance < MOB_ATTACK_RANGE {
                    events.push(MobEvent::Attack {
                        index,
                        mob_type: mob.mob_type,
                        distance,
                    });
                }
                to_player.normalize_or_zero() * step_len
            } else {
                mob.last_move += dt;
                if mob.last_move > mob.wander_interval() {
                    mob.wander_direction = random_horizontal_direction(&mut self.rng);
                    mob.last_move = 0.0;
                }
                mob.wander_direction * step_len
            };

            mob.position += step;

            let ground_y = world.ground_height(
                mob.position.x.floor() as i32,
                mob.position.z.floor() as i32,
            ) as f32
                + 1.0;
            if mob.position.y < ground_y {
                mob.position.y = ground_y;
            }

            let facing = Vec3::new(step.x, 0.0, step.z);
            if facing.length_squared() > f32::EPSILON {
                mob.yaw = yaw_towards(facing);
            }
        }

        self.spawn_timer_ms += dt * 1000.0;
        if self.spawn_timer_ms > self.spawn_interval_ms {
            self.spawn_timer_ms = 0.0;
            self.try_spawn_near(player_pos, world);
        }

        events
    }

    fn try_spawn_near(&mut self, player_pos: Vec3, world: &WorldStore) {
        if self.mobs.len() >= self.max_mobs {
            return;
        }

        let x = player_pos.x + self.rng.gen_range(-MOB_SPAWN_RADIUS..MOB_SPAWN_RADIUS);
        let z = player_pos.z + self.rng.gen_range(-MOB_SPAWN_RADIUS..MOB_SPAWN_RADIUS);
        let y = world.ground_height(x.floor() as i32, z.floor() as i32) as f32 + 1.0;
        let mob_type = MobType::ALL[self.rng.gen_range(0..MobType::ALL.len())];
        let direction = random_horizontal_direction(&mut self.rng);

        info!("Spawned {} at ({x:.1}, {y:.1}, {z:.1})", mob_type.name());
        self.mobs.push(Mob::new(mob_type, Vec3::new(x, y, z), direction));
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec3, Vec3};

    use super::{
        yaw_towards, Mob, MobEvent, MobSimulation, MobType, MOB_MAX_COUNT, MOB_SPAWN_INTERVAL_MS,
    };
    use crate::block::BlockType;
    use crate::world::WorldStore;

    fn flat_world(height: i32) -> WorldStore {
        let mut world = WorldStore::new();
        for x in -40..40 {
            for z in -40..40 {
                world.place(IVec3::new(x, height, z), BlockType::Grass);
            }
        }
        world
    }

    #[test]
    fn population_never_exceeds_cap() {
        let world = flat_world(5);
        let mut sim = MobSimulation::new(7, MOB_SPAWN_INTERVAL_MS, MOB_MAX_COUNT);

        for _ in 0..400 {
            sim.tick(11.0, Vec3::new(0.0, 6.8, 0.0), &world);
            assert!(sim.len() <= MOB_MAX_COUNT);
        }
        assert_eq!(sim.len(), MOB_MAX_COUNT);
    }

    #[test]
    fn configured_cap_is_bounded_by_hard_limit() {
        let sim = MobSimulation::new(1, MOB_SPAWN_INTERVAL_MS, 500);
        assert_eq!(sim.max_mobs(), MOB_MAX_COUNT);
    }

    #[test]
    fn spawn_timer_waits_for_full_interval() {
        let world = flat_world(5);
        let mut sim = MobSimulation::new(3, MOB_SPAWN_INTERVAL_MS, MOB_MAX_COUNT);

        sim.tick(9.0, Vec3::ZERO, &world);
        assert!(sim.is_empty());
        sim.tick(1.5, Vec3::ZERO, &world);
        assert_eq!(sim.len(), 1);

        let mob = &sim.mobs()[0];
        assert_eq!(mob.position.y, 6.0);
        assert!(mob.position.x.abs() < 15.0 && mob.position.z.abs() < 15.0);
    }

    #[test]
    fn hostile_mob_chases_and_reports_attack() {
        let world = flat_world(0);
        let mut sim = MobSimulation::new(11, MOB_SPAWN_INTERVAL_MS, MOB_MAX_COUNT);
        sim.insert(Mob::new(MobType::Zombie, Vec3::new(1.5, 1.0, 0.0), Vec3::X));

        let events = sim.tick(0.01, Vec3::new(0.0, 1.0, 0.0), &world);
        assert!(matches!(
            events.as_slice(),
            [MobEvent::Attack {
                index: 0,
                mob_type: MobType::Zombie,
                ..
            }]
        ));
        assert!(sim.mobs()[0].position.x < 1.5);
    }

    #[test]
    fn passive_mob_keeps_direction_until_interval_elapses() {
        let world = flat_world(0);
        let mut sim = MobSimulation::new(5, MOB_SPAWN_INTERVAL_MS, MOB_MAX_COUNT);
        sim.insert(Mob::new(MobType::Cow, Vec3::new(0.0, 1.0, 0.0), Vec3::X));

        sim.tick(0.5, Vec3::new(100.0, 1.0, 100.0), &world);
        let mob = &sim.mobs()[0];
        assert_eq!(mob.wander_direction, Vec3::X);
        assert!((mob.position.x - 5.0).abs() < 1e-4);
        assert!((mob.last_move - 0.5).abs() < 1e-6);
    }

    #[test]
    fn blocked_spawn_still_restarts_the_interval() {
        let world = flat_world(5);
        let mut sim = MobSimulation::new(4, MOB_SPAWN_INTERVAL_MS, 1);
        assert!(sim.insert(Mob::new(MobType::Pig, Vec3::new(0.0, 6.0, 0.0), Vec3::X)));

        sim.tick(10.5, Vec3::new(100.0, 6.8, 100.0), &world);
        assert_eq!(sim.len(), 1);
        assert_eq!(sim.spawn_timer_ms, 0.0);

        // With room again, the next spawn needs a whole new interval.
        sim.max_mobs = 2;
        sim.tick(9.0, Vec3::new(100.0, 6.8, 100.0), &world);
        assert_eq!(sim.len(), 1);
        sim.tick(1.5, Vec3::new(100.0, 6.8, 100.0), &world);
        assert_eq!(sim.len(), 2);
        assert_eq!(sim.spawn_timer_ms, 0.0);
    }

    #[test]
    fn hostile_mob_out_of_range_wanders_on_a_shorter_timer() {
        let world = flat_world(0);
        let far_player = Vec3::new(100.0, 1.0, 100.0);
        let mut sim = MobSimulation::new(12, MOB_SPAWN_INTERVAL_MS, MOB_MAX_COUNT);
        sim.insert(Mob::new(MobType::Zombie, Vec3::new(0.0, 1.0, 0.0), Vec3::X));
        sim.insert(Mob::new(MobType::Cow, Vec3::new(0.0, 1.0, 5.0), Vec3::X));

        sim.tick(1.5, far_player, &world);
        let zombie = &sim.mobs()[0];
        assert_eq!(zombie.wander_direction, Vec3::X);
        assert!((zombie.position.x - 30.0).abs() < 1e-3);

        sim.tick(0.6, far_player, &world);
        let zombie = &sim.mobs()[0];
        assert_eq!(zombie.last_move, 0.0);
        assert_eq!(zombie.wander_direction.y, 0.0);
        assert!((zombie.wander_direction.length() - 1.0).abs() < 1e-5);

        let cow = &sim.mobs()[1];
        assert_eq!(cow.wander_direction, Vec3::X);
        assert!((cow.last_move - 2.1).abs() < 1e-5);
    }

    #[test]
    fn mobs_face_the_way_they_move() {
        let world = flat_world(0);
        let mut sim = MobSimulation::new(2, MOB_SPAWN_INTERVAL_MS, MOB_MAX_COUNT);
        sim.insert(Mob::new(MobType::Cow, Vec3::new(0.0, 1.0, 0.0), Vec3::X));
        sim.insert(Mob::new(MobType::Zombie, Vec3::new(10.0, 1.0, 0.0), Vec3::Z));

        sim.tick(0.1, Vec3::new(0.0, 1.0, 0.0), &world);
        for (mob, expected) in sim.mobs().iter().zip([Vec3::X, Vec3::NEG_X]) {
            assert_eq!(mob.yaw, yaw_towards(expected));
            let forward = Vec3::new(-mob.yaw.sin(), 0.0, -mob.yaw.cos());
            assert!((forward - expected).length() < 1e-5);
        }

        let before: Vec<f32> = sim.mobs().iter().map(|m| m.yaw).collect();
        sim.tick(0.0, Vec3::new(0.0, 1.0, 0.0), &world);
        let after: Vec<f32> = sim.mobs().iter().map(|m| m.yaw).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn mobs_never_sink_below_their_column() {
        let world = flat_world(8);
        let mut sim = MobSimulation::new(9, MOB_SPAWN_INTERVAL_MS, MOB_MAX_COUNT);
        sim.insert(Mob::new(MobType::Pig, Vec3::new(0.0, 2.0, 0.0), Vec3::Z));

        sim.tick(0.1, Vec3::new(100.0, 0.0, 100.0), &world);
        assert_eq!(sim.mobs()[0].position.y, 9.0);
    }
}
