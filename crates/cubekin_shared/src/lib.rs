pub mod block;
pub mod daynight;
pub mod inventory;
pub mod mob;
pub mod physics;
pub mod player;
pub mod recipe;
pub mod world;
pub mod worldgen;
