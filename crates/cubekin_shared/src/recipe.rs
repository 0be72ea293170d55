use crate::block::BlockType;
use crate::inventory::{ItemStack, CRAFTING_SIZE};

const WOOD: Option<BlockType> = Some(BlockType::Wood);
const PLANKS: Option<BlockType> = Some(BlockType::Planks);
const STICK: Option<BlockType> = Some(BlockType::Stick);
const STONE: Option<BlockType> = Some(BlockType::Stone);
const COBBLESTONE: Option<BlockType> = Some(BlockType::Cobblestone);

/// `pattern` covers the leading slots of the 3x3 grid in row-major order;
/// every slot past its end must be empty.
#[derive(Copy, Clone, Debug)]
pub struct RecipeDef {
    pub pattern: &'static [Option<BlockType>],
    pub output: ItemStack,
}

pub const RECIPES: &[RecipeDef] = &[
    RecipeDef {
        pattern: &[WOOD, WOOD, WOOD, WOOD],
        output: ItemStack {
            item: BlockType::Planks,
            count: 4,
        },
    },
    RecipeDef {
        pattern: &[PLANKS, PLANKS, PLANKS, PLANKS],
        output: ItemStack {
            item: BlockType::Stick,
            count: 4,
        },
    },
    RecipeDef {
        pattern: &[STICK, STICK, STICK, STICK, PLANKS, PLANKS, PLANKS, PLANKS, PLANKS],
        output: ItemStack {
            item: BlockType::CraftingTable,
            count: 1,
        },
    },
    RecipeDef {
        pattern: &[STONE, STONE, STONE, STONE],
        output: ItemStack {
            item: BlockType::Cobblestone,
            count: 4,
        },
    },
    RecipeDef {
        pattern: &[COBBLESTONE, COBBLESTONE, COBBLESTONE, COBBLESTONE],
        output: ItemStack {
            item: BlockType::StoneBricks,
            count: 4,
        },
    },
];

pub fn match_crafting_grid(grid: &[Option<BlockType>; CRAFTING_SIZE]) -> Option<ItemStack> {
    RECIPES
        .iter()
        .find(|recipe| matches_exact(recipe, grid))
        .map(|recipe| recipe.output)
}

fn matches_exact(recipe: &RecipeDef, grid: &[Option<BlockType>]) -> bool {
    if recipe.pattern.len() > grid.len() {
        return false;
    }
    let (head, tail) = grid.split_at(recipe.pattern.len());
    head == recipe.pattern && tail.iter().all(Option::is_none)
}

#[cfg(test)]
mod tests {
    use super::match_crafting_grid;
    use crate::block::BlockType;

    #[test]
    fn four_wood_in_leading_slots_make_planks() {
        let mut grid = [None; 9];
        grid[..4].fill(Some(BlockType::Wood));
        let result = match_crafting_grid(&grid).expect("planks recipe");
        assert_eq!((result.item, result.count), (BlockType::Planks, 4));
    }

    #[test]
    fn full_grid_of_sticks_and_planks_makes_crafting_table() {
        let mut grid = [Some(BlockType::Planks); 9];
        grid[..4].fill(Some(BlockType::Stick));
        let result = match_crafting_grid(&grid).expect("crafting table recipe");
        assert_eq!((result.item, result.count), (BlockType::CraftingTable, 1));
    }

    #[test]
    fn shifted_pattern_does_not_match() {
        let mut grid = [None; 9];
        grid[1..5].fill(Some(BlockType::Stone));
        assert!(match_crafting_grid(&grid).is_none());
    }

    #[test]
    fn extra_items_break_the_match() {
        let mut grid = [None; 9];
        grid[..4].fill(Some(BlockType::Cobblestone));
        assert_eq!(
            match_crafting_grid(&grid).map(|s| s.item),
            Some(BlockType::StoneBricks)
        );

        grid[8] = Some(BlockType::Dirt);
        assert!(match_crafting_grid(&grid).is_none());
    }
}
