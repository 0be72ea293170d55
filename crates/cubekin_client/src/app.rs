use std::sync::Arc;
use std::time::{Duration, Instant};

use cubekin_core::events::{channel, EventReceiver, EventSender};
use cubekin_core::jobs::JobSystem;
use cubekin_shared::daynight::{DayNightCycle, LightingState};
use cubekin_shared::mob::{MobEvent, MobSimulation};
use cubekin_shared::player::{GameMode, InteractionOutcome, PlayerController};
use cubekin_shared::world::WorldStore;
use cubekin_shared::worldgen::{seed_from_str, TerrainGenerator};
use tracing::{debug, info, warn};

use crate::camera::Camera;
use crate::input::InputSnapshot;
use crate::persistence::{
    PersistenceEvent, WorldApi, WorldMeta, WorldRecord, WorldSaver, WorldType,
};
use crate::scene::{BlockSceneCache, SceneView};
use crate::settings::GameSettings;

pub const DEFAULT_WORLD_NAME: &str = "My World";

/// Owns every piece of a running session. Nothing is global.
pub struct Game {
    settings: GameSettings,
    world_name: String,
    seed_text: String,
    world: WorldStore,
    player: PlayerController,
    mobs: MobSimulation,
    day_night: DayNightCycle,
    lighting: LightingState,
    camera: Camera,
    scene_cache: BlockSceneCache,
    saver: Option<WorldSaver>,
    persistence_tx: EventSender<PersistenceEvent>,
    persistence_rx: EventReceiver<PersistenceEvent>,
    pending_saves: usize,
    last_saved: Option<WorldRecord>,
}

impl Game {
    /// Generates the world from `seed_text` and drops the player at the origin.
    pub fn new(
        settings: GameSettings,
        world_name: &str,
        seed_text: &str,
        game_mode: GameMode,
    ) -> Self {
        let settings = settings.sanitize();
        let seed = seed_from_str(seed_text);
        let generator = TerrainGenerator::new(seed);

        let started = Instant::now();
        let mut world = WorldStore::new();
        let stats = generator.generate(&mut world, settings.world_half_extent);
        info!(
            "World '{world_name}' ready: {} blocks, {} trees, {} cacti in {:.2?}",
            world.len(),
            stats.trees,
            stats.cacti,
            started.elapsed()
        );

        let mut mobs =
            MobSimulation::new(seed, settings.mob_spawn_interval_ms, settings.max_mobs);
        for mob in generator.initial_mobs(&world) {
            mobs.insert(mob);
        }

        let player = PlayerController::spawn_on(&world, 0, 0, game_mode, settings.reach);
        let mut camera = Camera::default();
        camera.follow(&player.state);

        let day_night = DayNightCycle::new(settings.day_length_ms);
        let lighting = day_night.lighting();
        let (persistence_tx, persistence_rx) = channel();

        Self {
            settings,
            world_name: world_name.to_string(),
            seed_text: seed_text.to_string(),
            world,
            player,
            mobs,
            day_night,
            lighting,
            camera,
            scene_cache: BlockSceneCache::default(),
            saver: None,
            persistence_tx,
            persistence_rx,
            pending_saves: 0,
            last_saved: None,
        }
    }

    pub fn attach_persistence(&mut self, api: Arc<dyn WorldApi>, jobs: Arc<JobSystem>) {
        self.saver = Some(WorldSaver::new(api, jobs, self.persistence_tx.clone()));
    }

    pub fn world(&self) -> &WorldStore {
        &self.world
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn mobs(&self) -> &MobSimulation {
        &self.mobs
    }

    pub fn lighting(&self) -> &LightingState {
        &self.lighting
    }

    pub fn last_saved(&self) -> Option<&WorldRecord> {
        self.last_saved.as_ref()
    }

    pub fn world_meta(&self) -> WorldMeta {
        WorldMeta {
            name: self.world_name.clone(),
            world_type: WorldType::Singleplayer,
            seed: self.seed_text.clone(),
        }
    }

    /// Advances one frame and returns what to draw.
    pub fn frame(&mut self, dt: f32, input: &InputSnapshot) -> SceneView {
        self.poll_persistence();
        self.update_player(dt, input);

        for event in self.mobs.tick(dt, self.player.state.position, &self.world) {
            let MobEvent::Attack {
                index,
                mob_type,
                distance,
            } = event;
            info!("{} #{index} attacks player at {distance:.2}", mob_type.name());
        }

        self.lighting = self.day_night.tick(dt);
        self.camera.follow(&self.player.state);

        if input.save {
            self.request_save();
        }

        SceneView::build(
            &self.world,
            &mut self.scene_cache,
            self.mobs.mobs(),
            &self.player,
            &self.camera,
            self.lighting,
        )
    }

    fn update_player(&mut self, dt: f32, input: &InputSnapshot) {
        let player = &mut self.player;
        player.look(input.mouse_delta, self.settings.mouse_sensitivity);
        if let Some(index) = input.hotbar_select {
            player.select_hotbar(index);
        }

        for &slot in &input.crafting_clicks {
            player.inventory.move_to_crafting(slot);
        }
        if input.craft && player.inventory.craft().is_none() {
            debug!("Crafting grid matches no recipe");
        }

        if input.jump {
            player.jump();
        }
        player.tick(&self.world, dt, input.moves);

        if input.break_block {
            log_outcome(player.break_block(&mut self.world));
        }
        if input.place_block {
            log_outcome(player.place_block(&mut self.world));
        }
    }

    /// Queues a save on the job pool. A no-op while offline.
    pub fn request_save(&mut self) {
        let Some(saver) = &self.saver else {
            debug!("Persistence disabled, not saving '{}'", self.world_name);
            return;
        };
        saver.request_save(self.world_meta());
        self.pending_saves += 1;
    }

    pub fn pending_saves(&self) -> usize {
        self.pending_saves
    }

    fn poll_persistence(&mut self) {
        for event in self.persistence_rx.drain() {
            self.handle_persistence_event(event);
        }
    }

    fn handle_persistence_event(&mut self, event: PersistenceEvent) {
        self.pending_saves = self.pending_saves.saturating_sub(1);
        match event {
            PersistenceEvent::Saved(record) => {
                info!("Saved world '{}' (id {})", record.name, record.id);
                self.last_saved = Some(record);
            }
            PersistenceEvent::Failed { world_name, error } => {
                warn!("Failed to save world '{world_name}': {error}");
            }
        }
    }

    /// Blocks until queued saves report back or `timeout` passes. Returns
    /// `true` when nothing is left in flight.
    pub fn wait_for_saves(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.pending_saves > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match self.persistence_rx.recv_timeout(remaining) {
                Some(event) => self.handle_persistence_event(event),
                None => break,
            }
        }
        self.pending_saves == 0
    }
}

fn log_outcome(outcome: InteractionOutcome) {
    match outcome {
        InteractionOutcome::Broken { position, kind } => {
            debug!("Broke {} at {position}", kind.name());
        }
        InteractionOutcome::Placed { position, kind } => {
            debug!("Placed {} at {position}", kind.name());
        }
        InteractionOutcome::Rejected(_) | InteractionOutcome::NoTarget => {}
    }
}
