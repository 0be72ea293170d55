use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use cubekin_shared::block::BlockType;
use cubekin_shared::daynight::LightingState;
use cubekin_shared::inventory::{ItemStack, CRAFTING_SIZE, HOTBAR_SIZE, MAIN_SIZE};
use cubekin_shared::mob::{Mob, MobType};
use cubekin_shared::player::PlayerController;
use cubekin_shared::world::WorldStore;
use glam::{IVec3, Mat4, Vec3};

use crate::camera::Camera;

/// One cube as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BlockInstance {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub block_type: u32,
    pub _pad: u32,
}
const _: [(); 32] = [(); std::mem::size_of::<BlockInstance>()];

impl BlockInstance {
    pub fn new(position: IVec3, kind: BlockType) -> Self {
        Self {
            position: position.as_vec3().to_array(),
            color: kind.color_rgb(),
            block_type: kind as u32,
            _pad: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBlock {
    pub position: IVec3,
    pub kind: BlockType,
    pub color: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneEntity {
    pub position: Vec3,
    pub mob_type: MobType,
    pub glyph: &'static str,
    pub yaw: f32,
}

impl From<&Mob> for SceneEntity {
    fn from(mob: &Mob) -> Self {
        Self {
            position: mob.position,
            mob_type: mob.mob_type,
            glyph: mob.glyph(),
            yaw: mob.yaw,
        }
    }
}

/// Block lists shared between frames until the world changes.
#[derive(Debug, Default)]
pub struct BlockSceneCache {
    revision: Option<u64>,
    blocks: Arc<Vec<SceneBlock>>,
    instances: Arc<Vec<BlockInstance>>,
}

impl BlockSceneCache {
    /// Returns `true` when the block lists had to be rebuilt.
    pub fn refresh(&mut self, world: &WorldStore) -> bool {
        if self.revision == Some(world.revision()) {
            return false;
        }

        let mut blocks = Vec::with_capacity(world.len());
        let mut instances = Vec::with_capacity(world.len());
        for block in world.iter() {
            blocks.push(SceneBlock {
                position: block.position,
                kind: block.kind,
                color: block.kind.color(),
            });
            instances.push(BlockInstance::new(block.position, block.kind));
        }
        self.blocks = Arc::new(blocks);
        self.instances = Arc::new(instances);
        self.revision = Some(world.revision());
        true
    }
}

/// Everything the renderer and UI read for one frame.
#[derive(Debug, Clone)]
pub struct SceneView {
    pub blocks: Arc<Vec<SceneBlock>>,
    pub instances: Arc<Vec<BlockInstance>>,
    pub entities: Vec<SceneEntity>,
    pub camera: Camera,
    pub view_projection: Mat4,
    pub lighting: LightingState,
    pub hotbar: [Option<ItemStack>; HOTBAR_SIZE],
    pub main: [Option<ItemStack>; MAIN_SIZE],
    pub selected_slot: usize,
    pub crafting: [Option<ItemStack>; CRAFTING_SIZE],
    pub crafting_result: Option<ItemStack>,
}

impl SceneView {
    pub fn build(
        world: &WorldStore,
        cache: &mut BlockSceneCache,
        mobs: &[Mob],
        player: &PlayerController,
        camera: &Camera,
        lighting: LightingState,
    ) -> Self {
        cache.refresh(world);

        let inventory = &player.inventory;
        Self {
            blocks: Arc::clone(&cache.blocks),
            instances: Arc::clone(&cache.instances),
            entities: mobs.iter().map(SceneEntity::from).collect(),
            camera: camera.clone(),
            view_projection: camera.view_projection_matrix(),
            lighting,
            hotbar: inventory.hotbar,
            main: inventory.main,
            selected_slot: player.state.selected_hotbar,
            crafting: inventory.crafting,
            crafting_result: inventory.crafting_result(),
        }
    }

    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.instances.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cubekin_shared::block::BlockType;
    use cubekin_shared::daynight::LightingState;
    use cubekin_shared::inventory::ItemStack;
    use cubekin_shared::mob::{Mob, MobType};
    use cubekin_shared::player::{GameMode, PlayerController, DEFAULT_REACH};
    use cubekin_shared::world::WorldStore;
    use glam::{IVec3, Vec3};

    use super::{BlockInstance, BlockSceneCache, SceneView};
    use crate::camera::Camera;

    #[test]
    fn scene_mirrors_world_mobs_and_inventory() {
        let mut world = WorldStore::new();
        world.place(IVec3::new(0, 9, 0), BlockType::Grass);
        world.place(IVec3::new(1, 9, 0), BlockType::Stick);

        let mut cow = Mob::new(MobType::Cow, Vec3::new(2.0, 10.0, 2.0), Vec3::X);
        cow.yaw = 1.25;

        let mut player =
            PlayerController::spawn_on(&world, 0, 0, GameMode::Survival, DEFAULT_REACH);
        player.inventory.hotbar[0] = Some(ItemStack::new(BlockType::Wood, 4));
        player.inventory.crafting[0] = Some(ItemStack::new(BlockType::Wood, 1));
        player.select_hotbar(3);

        let mut camera = Camera::default();
        camera.follow(&player.state);
        let mut cache = BlockSceneCache::default();
        let scene = SceneView::build(
            &world,
            &mut cache,
            &[cow],
            &player,
            &camera,
            LightingState::at(0.5),
        );

        assert_eq!(scene.blocks.len(), 2);
        assert_eq!(scene.instances.len(), 2);
        let stick = scene
            .blocks
            .iter()
            .find(|b| b.kind == BlockType::Stick)
            .expect("stick in scene");
        assert_eq!(stick.color, 0xFF_FF_FF);

        assert_eq!(scene.entities.len(), 1);
        assert_eq!(scene.entities[0].glyph, "🐄");
        assert_eq!(scene.entities[0].yaw, 1.25);

        assert_eq!(scene.selected_slot, 3);
        assert_eq!(scene.hotbar[0], Some(ItemStack::new(BlockType::Wood, 4)));
        assert!(scene.crafting_result.is_none());
        assert_eq!(scene.camera.position, player.state.position);
    }

    #[test]
    fn instance_buffer_is_tightly_packed() {
        let mut world = WorldStore::new();
        world.place(IVec3::new(3, 4, 5), BlockType::Stone);
        let player = PlayerController::new(Vec3::ZERO, GameMode::Creative, DEFAULT_REACH);
        let mut cache = BlockSceneCache::default();
        let scene = SceneView::build(
            &world,
            &mut cache,
            &[],
            &player,
            &Camera::default(),
            LightingState::at(0.0),
        );

        assert_eq!(scene.instance_bytes().len(), std::mem::size_of::<BlockInstance>());
        assert_eq!(scene.instances[0].position, [3.0, 4.0, 5.0]);
        assert_eq!(scene.instances[0].block_type, BlockType::Stone as u32);
    }

    #[test]
    fn block_lists_are_reused_until_the_world_changes() {
        let mut world = WorldStore::new();
        world.place(IVec3::new(0, 0, 0), BlockType::Stone);
        let player = PlayerController::new(Vec3::ZERO, GameMode::Survival, DEFAULT_REACH);
        let camera = Camera::default();
        let mut cache = BlockSceneCache::default();
        let noon = LightingState::at(0.5);

        let first = SceneView::build(&world, &mut cache, &[], &player, &camera, noon);
        assert!(!cache.refresh(&world));
        let second = SceneView::build(&world, &mut cache, &[], &player, &camera, noon);
        assert!(Arc::ptr_eq(&first.instances, &second.instances));
        assert!(Arc::ptr_eq(&first.blocks, &second.blocks));

        world.place(IVec3::new(1, 0, 0), BlockType::Dirt);
        let third = SceneView::build(&world, &mut cache, &[], &player, &camera, noon);
        assert!(!Arc::ptr_eq(&first.instances, &third.instances));
        assert_eq!(third.instances.len(), 2);
        assert_eq!(first.instances.len(), 1);
    }
}
