use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::block::BlockType;
use crate::recipe::match_crafting_grid;

pub const HOTBAR_SIZE: usize = 9;
pub const MAIN_SIZE: usize = 27;
pub const CRAFTING_SIZE: usize = 9;
/// Stack size handed out by the creative hotbar. Stacks themselves are unbounded.
pub const CREATIVE_STACK_SIZE: u32 = 64;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: BlockType,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: BlockType, count: u32) -> Self {
        Self { item, count }
    }
}

/// Takes one unit out of `slot`, clearing it when the stack runs out.
fn take_one(slot: &mut Option<ItemStack>) -> Option<BlockType> {
    let stack = slot.as_mut()?;
    let item = stack.item;
    stack.count = stack.count.saturating_sub(1);
    if stack.count == 0 {
        *slot = None;
    }
    Some(item)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub hotbar: [Option<ItemStack>; HOTBAR_SIZE],
    pub main: [Option<ItemStack>; MAIN_SIZE],
    pub crafting: [Option<ItemStack>; CRAFTING_SIZE],
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hotbar_slot(&self, index: usize) -> Option<&ItemStack> {
        self.hotbar.get(index).and_then(Option::as_ref)
    }

    pub fn selected_item(&self, index: usize) -> Option<BlockType> {
        self.hotbar_slot(index).map(|stack| stack.item)
    }

    pub fn take_from_selected(&mut self, index: usize) -> Option<BlockType> {
        self.hotbar.get_mut(index).and_then(take_one)
    }

    /// First matching hotbar stack, then first empty hotbar slot, then the same
    /// two passes over main storage. The whole count lands in one slot. With no
    /// room anywhere the items are discarded and `false` is returned.
    pub fn add_item(&mut self, item: BlockType, count: u32) -> bool {
        if count == 0 {
            return true;
        }

        for slots in [&mut self.hotbar[..], &mut self.main[..]] {
            if let Some(stack) = slots.iter_mut().flatten().find(|stack| stack.item == item) {
                stack.count += count;
                return true;
            }
            if let Some(slot) = slots.iter_mut().find(|slot| slot.is_none()) {
                *slot = Some(ItemStack::new(item, count));
                return true;
            }
        }

        debug!("Inventory full, dropping {count} {}", item.name());
        false
    }

    pub fn count_item(&self, item: BlockType) -> u32 {
        self.hotbar
            .iter()
            .chain(self.main.iter())
            .flatten()
            .filter(|stack| stack.item == item)
            .map(|stack| stack.count)
            .sum()
    }

    pub fn is_full(&self) -> bool {
        self.hotbar.iter().chain(self.main.iter()).all(Option::is_some)
    }

    pub fn fill_creative_hotbar(&mut self) {
        for (slot, item) in self.hotbar.iter_mut().zip(BlockType::ALL) {
            *slot = Some(ItemStack::new(item, CREATIVE_STACK_SIZE));
        }
    }

    pub fn crafting_pattern(&self) -> [Option<BlockType>; CRAFTING_SIZE] {
        self.crafting.map(|slot| slot.map(|stack| stack.item))
    }

    pub fn crafting_result(&self) -> Option<ItemStack> {
        match_crafting_grid(&self.crafting_pattern())
    }

    /// Consumes one unit from every occupied crafting slot and stores the
    /// result. Leaves everything untouched when no recipe matches.
    pub fn craft(&mut self) -> Option<ItemStack> {
        let result = self.crafting_result()?;
        for slot in &mut self.crafting {
            take_one(slot);
        }
        self.add_item(result.item, result.count);
        debug!("Crafted {} {}", result.count, result.item.name());
        Some(result)
    }

    /// Clicking an empty crafting slot pulls one unit from the first occupied
    /// hotbar slot (or main slot if the hotbar is empty). Clicking an occupied
    /// one returns its contents to the inventory.
    pub fn move_to_crafting(&mut self, index: usize) -> bool {
        let Some(target) = self.crafting.get(index).copied() else {
            return false;
        };

        if let Some(stack) = target {
            self.crafting[index] = None;
            self.add_item(stack.item, stack.count);
            return true;
        }

        let source = self
            .hotbar
            .iter_mut()
            .chain(self.main.iter_mut())
            .find(|slot| slot.is_some());
        match source.and_then(take_one) {
            Some(item) => {
                self.crafting[index] = Some(ItemStack::new(item, 1));
                true
            }
            None => false,
        }
    }

    pub fn set_crafting_slot(&mut self, index: usize, stack: Option<ItemStack>) {
        if let Some(slot) = self.crafting.get_mut(index) {
            *slot = stack;
        }
    }
}
