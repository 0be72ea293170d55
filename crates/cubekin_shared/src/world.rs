use glam::IVec3;
use rustc_hash::FxHashMap;

use crate::block::BlockType;

/// Highest y searched when looking for the surface of a column.
pub const GROUND_SCAN_CEILING: i32 = 50;
/// Reported for columns with nothing in `0..=GROUND_SCAN_CEILING`.
pub const EMPTY_COLUMN_HEIGHT: i32 = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockType,
    pub position: IVec3,
}

#[derive(Clone, Debug, Default)]
pub struct WorldStore {
    blocks: FxHashMap<IVec3, BlockType>,
    // Bumped on every change so cached render data can tell it is stale.
    revision: u64,
}

impl WorldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, position: IVec3, kind: BlockType) -> Option<BlockType> {
        self.revision += 1;
        self.blocks.insert(position, kind)
    }

    pub fn remove(&mut self, position: IVec3) -> Option<BlockType> {
        let removed = self.blocks.remove(&position);
        if removed.is_some() {
            self.revision += 1;
        }
        removed
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, position: IVec3) -> Option<Block> {
        self.blocks
            .get(&position)
            .map(|&kind| Block { kind, position })
    }

    pub fn contains(&self, position: IVec3) -> bool {
        self.blocks.contains_key(&position)
    }

    pub fn ground_height(&self, x: i32, z: i32) -> i32 {
        (0..=GROUND_SCAN_CEILING)
            .rev()
            .find(|&y| self.contains(IVec3::new(x, y, z)))
            .unwrap_or(EMPTY_COLUMN_HEIGHT)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Block> + '_ {
        self.blocks
            .iter()
            .map(|(&position, &kind)| Block { kind, position })
    }
}
