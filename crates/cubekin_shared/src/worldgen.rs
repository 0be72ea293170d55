use glam::{IVec3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::block::BlockType;
use crate::mob::{random_horizontal_direction, Mob, MobType};
use crate::world::WorldStore;

pub const DEFAULT_HALF_EXTENT: i32 = 50;
const BASE_HEIGHT: f64 = 10.0;
const SUBSURFACE_DEPTH: i32 = 3;
const TRUNK_HEIGHT: i32 = 4;
const INITIAL_COW_COUNT: usize = 5;
const INITIAL_MOB_RADIUS: f32 = 20.0;

const HEIGHT_SALT: u64 = 0x4845_4947_4854;
const SURFACE_SALT: u64 = 0x5355_5246;
const STRUCTURE_SALT: u64 = 0x5354_5255_4354;
const POPULATION_SALT: u64 = 0x504F_5055_4C41;

const LEAF_OFFSETS: [IVec3; 14] = [
    IVec3::new(0, 4, 0),
    IVec3::new(0, 5, 0),
    IVec3::new(-1, 4, 0),
    IVec3::new(1, 4, 0),
    IVec3::new(0, 4, -1),
    IVec3::new(0, 4, 1),
    IVec3::new(-1, 4, -1),
    IVec3::new(1, 4, -1),
    IVec3::new(-1, 4, 1),
    IVec3::new(1, 4, 1),
    IVec3::new(-1, 5, 0),
    IVec3::new(1, 5, 0),
    IVec3::new(0, 5, -1),
    IVec3::new(0, 5, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    Plains,
    Forest,
    Desert,
    Mountains,
}

impl Biome {
    fn structure_chance(self) -> f64 {
        match self {
            Biome::Forest => 0.03,
            Biome::Plains => 0.01,
            Biome::Desert => 0.02,
            Biome::Mountains => 0.005,
        }
    }

    fn subsurface_block(self) -> BlockType {
        match self {
            Biome::Desert => BlockType::Sand,
            _ => BlockType::Dirt,
        }
    }
}

pub fn biome_at(x: i32, z: i32) -> Biome {
    let (fx, fz) = (x as f64, z as f64);
    let distance = (fx * fx + fz * fz).sqrt();
    let noise = (fx * 0.05).sin() * (fz * 0.05).cos();

    if distance < 15.0 {
        Biome::Plains
    } else if noise > 0.3 {
        Biome::Forest
    } else if noise < -0.3 {
        Biome::Desert
    } else if distance > 30.0 {
        Biome::Mountains
    } else {
        Biome::Plains
    }
}

/// Numeric seed strings are used as-is; anything else is hashed (FNV-1a) so the
/// same text always produces the same world.
pub fn seed_from_str(text: &str) -> u64 {
    let text = text.trim();
    if let Ok(seed) = text.parse::<u64>() {
        return seed;
    }
    if let Ok(seed) = text.parse::<i64>() {
        return seed as u64;
    }

    text.bytes().fold(0xCBF2_9CE4_8422_2325_u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01B3)
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationStats {
    pub columns: usize,
    pub trees: usize,
    pub cacti: usize,
}

#[derive(Debug, Clone)]
pub struct TerrainGenerator {
    pub seed: u64,
}

impl TerrainGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn column_rng(&self, x: i32, z: i32, salt: u64) -> StdRng {
        let hash = self
            .seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add((x as u64).wrapping_mul(2654435761))
            .wrapping_add((z as u64).wrapping_mul(40503));
        StdRng::seed_from_u64(hash ^ salt)
    }

    pub fn terrain_height(&self, x: i32, z: i32, biome: Biome) -> i32 {
        let (fx, fz) = (x as f64, z as f64);
        let octave1 = (fx * 0.1).sin() * (fz * 0.1).cos() * 3.0;
        let octave2 = (fx * 0.05).sin() * (fz * 0.05).cos() * 5.0;
        let octave3 = ((fx + fz) * 0.02).sin() * 2.0;
        let mut height = BASE_HEIGHT + octave1 + octave2 + octave3;

        let mut rng = self.column_rng(x, z, HEIGHT_SALT);
        height += match biome {
            Biome::Mountains => 8.0 + rng.gen::<f64>() * 5.0,
            Biome::Desert => rng.gen::<f64>() * 2.0 - 1.0,
            Biome::Forest => 2.0 + rng.gen::<f64>() * 3.0,
            Biome::Plains => 0.0,
        };

        height.floor() as i32
    }

    pub fn generate(&self, world: &mut WorldStore, half_extent: i32) -> GenerationStats {
        let mut stats = GenerationStats::default();

        for x in -half_extent..half_extent {
            for z in -half_extent..half_extent {
                let biome = biome_at(x, z);
                let height = self.terrain_height(x, z, biome);
                self.fill_column(world, x, z, height, biome);
                stats.columns += 1;

                let mut rng = self.column_rng(x, z, STRUCTURE_SALT);
                if rng.gen::<f64>() < biome.structure_chance() {
                    let base = IVec3::new(x, height + 1, z);
                    match biome {
                        Biome::Forest if rng.gen::<f64>() < 0.8 => {
                            place_tree(world, base);
                            stats.trees += 1;
                        }
                        Biome::Plains if rng.gen::<f64>() < 0.3 => {
                            place_tree(world, base);
                            stats.trees += 1;
                        }
                        Biome::Desert if rng.gen::<f64>() < 0.1 => {
                            place_cactus(world, base, &mut rng);
                            stats.cacti += 1;
                        }
                        _ => {}
                    }
                }
            }
        }

        info!(
            "Generated {} columns ({} blocks, {} trees, {} cacti) with seed {}",
            stats.columns,
            world.len(),
            stats.trees,
            stats.cacti,
            self.seed
        );
        stats
    }

    fn fill_column(&self, world: &mut WorldStore, x: i32, z: i32, height: i32, biome: Biome) {
        let surface = match biome {
            Biome::Desert => BlockType::Sand,
            Biome::Mountains => {
                let mut rng = self.column_rng(x, z, SURFACE_SALT);
                if rng.gen::<f64>() < 0.7 {
                    BlockType::Stone
                } else {
                    BlockType::Gravel
                }
            }
            Biome::Plains | Biome::Forest => BlockType::Grass,
        };

        for y in 0..=height {
            let kind = if y == height {
                surface
            } else if y >= height - SUBSURFACE_DEPTH {
                biome.subsurface_block()
            } else {
                BlockType::Stone
            };
            world.place(IVec3::new(x, y, z), kind);
        }
    }

    /// Passive starting herd scattered around the origin. Call after `generate`
    /// so each cow lands on top of the terrain.
    pub fn initial_mobs(&self, world: &WorldStore) -> Vec<Mob> {
        let mut rng = StdRng::seed_from_u64(self.seed ^ POPULATION_SALT);
        (0..INITIAL_COW_COUNT)
            .map(|_| {
                let x = rng.gen_range(-INITIAL_MOB_RADIUS..INITIAL_MOB_RADIUS);
                let z = rng.gen_range(-INITIAL_MOB_RADIUS..INITIAL_MOB_RADIUS);
                let y = world.ground_height(x.floor() as i32, z.floor() as i32) as f32 + 1.0;
                let direction = random_horizontal_direction(&mut rng);
                Mob::new(MobType::Cow, Vec3::new(x, y, z), direction)
            })
            .collect()
    }
}

pub fn place_tree(world: &mut WorldStore, base: IVec3) {
    for dy in 0..TRUNK_HEIGHT {
        world.place(base + IVec3::new(0, dy, 0), BlockType::Wood);
    }
    for offset in LEAF_OFFSETS {
        world.place(base + offset, BlockType::Leaves);
    }
}

fn place_cactus(world: &mut WorldStore, base: IVec3, rng: &mut StdRng) {
    let height = rng.gen_range(2..=4);
    for dy in 0..height {
        world.place(base + IVec3::new(0, dy, 0), BlockType::Cactus);
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec3;

    use super::{biome_at, place_tree, seed_from_str, Biome, TerrainGenerator};
    use crate::block::BlockType;
    use crate::mob::MobType;
    use crate::world::WorldStore;

    #[test]
    fn biome_thresholds() {
        assert_eq!(biome_at(0, 0), Biome::Plains);
        assert_eq!(biome_at(10, 10), Biome::Plains);
        // sin(1.5) * cos(0) > 0.3
        assert_eq!(biome_at(30, 0), Biome::Forest);
        assert_eq!(biome_at(-30, 0), Biome::Desert);
        // noise is 0 on the z axis, distance > 30
        assert_eq!(biome_at(0, 40), Biome::Mountains);
        assert_eq!(biome_at(0, 20), Biome::Plains);
    }

    #[test]
    fn terrain_height_is_deterministic() {
        let generator = TerrainGenerator::new(1234);
        for (x, z) in [(0, 0), (-50, 49), (33, -12), (45, 45)] {
            let biome = biome_at(x, z);
            let first = generator.terrain_height(x, z, biome);
            assert_eq!(first, generator.terrain_height(x, z, biome));
            assert_eq!(first, TerrainGenerator::new(1234).terrain_height(x, z, biome));
        }
    }

    #[test]
    fn origin_is_grass_topped_plains_at_height_ten() {
        let generator = TerrainGenerator::new(42);
        let mut world = WorldStore::new();
        generator.generate(&mut world, 4);

        assert_eq!(biome_at(0, 0), Biome::Plains);
        assert_eq!(generator.terrain_height(0, 0, Biome::Plains), 10);
        assert_eq!(world.get(IVec3::new(0, 10, 0)).map(|b| b.kind), Some(BlockType::Grass));
        assert_eq!(world.get(IVec3::new(0, 9, 0)).map(|b| b.kind), Some(BlockType::Dirt));
        assert_eq!(world.get(IVec3::new(0, 7, 0)).map(|b| b.kind), Some(BlockType::Dirt));
        assert_eq!(world.get(IVec3::new(0, 6, 0)).map(|b| b.kind), Some(BlockType::Stone));
        assert_eq!(world.get(IVec3::new(0, 0, 0)).map(|b| b.kind), Some(BlockType::Stone));
    }

    #[test]
    fn same_seed_generates_identical_worlds() {
        let mut first = WorldStore::new();
        let mut second = WorldStore::new();
        let stats_a = TerrainGenerator::new(99).generate(&mut first, 40);
        let stats_b = TerrainGenerator::new(99).generate(&mut second, 40);

        assert_eq!(stats_a, stats_b);
        assert_eq!(first.len(), second.len());
        for block in first.iter() {
            assert_eq!(second.get(block.position), Some(block));
        }
    }

    #[test]
    fn generation_covers_half_open_bounds() {
        let mut world = WorldStore::new();
        let stats = TerrainGenerator::new(5).generate(&mut world, 3);
        assert_eq!(stats.columns, 36);
        assert!(world.contains(IVec3::new(-3, 0, -3)));
        assert!(world.contains(IVec3::new(2, 0, 2)));
        assert!(!world.contains(IVec3::new(3, 0, 0)));
    }

    #[test]
    fn tree_has_trunk_and_fourteen_leaves() {
        let mut world = WorldStore::new();
        place_tree(&mut world, IVec3::new(0, 11, 0));

        let wood = world.iter().filter(|b| b.kind == BlockType::Wood).count();
        let leaves = world.iter().filter(|b| b.kind == BlockType::Leaves).count();
        assert_eq!(wood, 4);
        assert_eq!(leaves, 14);
        assert_eq!(world.ground_height(0, 0), 16);
    }

    #[test]
    fn initial_population_is_five_cows_on_the_ground() {
        let generator = TerrainGenerator::new(8);
        let mut world = WorldStore::new();
        generator.generate(&mut world, 25);

        let mobs = generator.initial_mobs(&world);
        assert_eq!(mobs.len(), 5);
        for mob in &mobs {
            assert_eq!(mob.mob_type, MobType::Cow);
            assert!(mob.position.x.abs() <= 20.0 && mob.position.z.abs() <= 20.0);
            let (x, z) = (mob.position.x.floor() as i32, mob.position.z.floor() as i32);
            let ground = world.ground_height(x, z);
            assert_eq!(mob.position.y, ground as f32 + 1.0);
        }
    }

    #[test]
    fn seed_strings_parse_or_hash() {
        assert_eq!(seed_from_str("12345"), 12345);
        assert_eq!(seed_from_str(" -1 "), u64::MAX);
        assert_eq!(seed_from_str("hello"), seed_from_str("hello"));
        assert_ne!(seed_from_str("hello"), seed_from_str("world"));
    }
}
