use serde::{Deserialize, Serialize};

pub const DEFAULT_GLYPH: &str = "⬜";
pub const DEFAULT_COLOR: u32 = 0xFF_FF_FF;

/// Every block and item kind. Items share the block namespace, so a stack of
/// `Stick` and a placed `Stone` are described by the same type.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Grass,
    Dirt,
    Stone,
    Wood,
    Leaves,
    Sand,
    Gravel,
    Cobblestone,
    Planks,
    Stick,
    CraftingTable,
    StoneBricks,
    Cactus,
    Glass,
    IronOre,
    CoalOre,
    GoldOre,
    DiamondOre,
    Water,
    Lava,
    Ice,
    Snow,
    Clay,
    Wool,
}

#[derive(Copy, Clone, Debug)]
pub struct BlockProperties {
    pub name: &'static str,
    pub display_name: &'static str,
    pub glyph: &'static str,
    /// `None` renders with [`DEFAULT_COLOR`].
    pub color: Option<u32>,
}

const fn props(
    name: &'static str,
    display_name: &'static str,
    glyph: &'static str,
    color: Option<u32>,
) -> BlockProperties {
    BlockProperties {
        name,
        display_name,
        glyph,
        color,
    }
}

// Indexed by `BlockType as usize`.
const BLOCK_TABLE: [BlockProperties; BlockType::COUNT] = [
    props("grass", "Grass Block", "🟩", Some(0x7C_B3_42)),
    props("dirt", "Dirt", "🟫", Some(0x8D_6E_63)),
    props("stone", "Stone", "⬜", Some(0x75_75_75)),
    props("wood", "Wood", "🟤", Some(0x8D_6E_63)),
    props("leaves", "Leaves", "🍃", Some(0x55_8B_2F)),
    props("sand", "Sand", "🟨", Some(0xFD_D8_35)),
    props("gravel", "Gravel", "⚫", Some(0x9E_9E_9E)),
    props("cobblestone", "Cobblestone", "⬛", Some(0x61_61_61)),
    props("planks", "Wooden Planks", "🟧", Some(0xD7_CC_C8)),
    props("stick", "Stick", "🪵", None),
    props("crafting_table", "Crafting Table", "🪵", None),
    props("stone_bricks", "Stone Bricks", "🧱", None),
    props("cactus", "Cactus", "🌵", Some(0x4C_AF_50)),
    props("glass", "Glass", "🪟", Some(0x81_D4_FA)),
    props("iron_ore", "Iron Ore", "⚙️", Some(0x9E_9E_9E)),
    props("coal_ore", "Coal Ore", "⚫", Some(0x21_21_21)),
    props("gold_ore", "Gold Ore", "🟨", Some(0xFF_D7_00)),
    props("diamond_ore", "Diamond Ore", "💎", Some(0x00_BC_D4)),
    props("water", "Water", "💧", Some(0x21_96_F3)),
    props("lava", "Lava", "🌋", Some(0xFF_57_22)),
    props("ice", "Ice", "🧊", Some(0xB3_E5_FC)),
    props("snow", "Snow", "❄️", Some(0xFF_FF_FF)),
    props("clay", "Clay", "🟫", Some(0x8D_6E_63)),
    props("wool", "Wool", "🐑", Some(0xF5_F5_F5)),
];

impl BlockType {
    pub const COUNT: usize = 24;

    pub const ALL: [BlockType; Self::COUNT] = [
        Self::Grass,
        Self::Dirt,
        Self::Stone,
        Self::Wood,
        Self::Leaves,
        Self::Sand,
        Self::Gravel,
        Self::Cobblestone,
        Self::Planks,
        Self::Stick,
        Self::CraftingTable,
        Self::StoneBricks,
        Self::Cactus,
        Self::Glass,
        Self::IronOre,
        Self::CoalOre,
        Self::GoldOre,
        Self::DiamondOre,
        Self::Water,
        Self::Lava,
        Self::Ice,
        Self::Snow,
        Self::Clay,
        Self::Wool,
    ];

    pub const DEFAULT_HOTBAR: [BlockType; 9] = [
        Self::Grass,
        Self::Dirt,
        Self::Stone,
        Self::Wood,
        Self::Leaves,
        Self::Sand,
        Self::Gravel,
        Self::Cobblestone,
        Self::Planks,
    ];

    pub fn properties(self) -> &'static BlockProperties {
        &BLOCK_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.properties().name
    }

    pub fn display_name(self) -> &'static str {
        self.properties().display_name
    }

    pub fn glyph(self) -> &'static str {
        self.properties().glyph
    }

    pub fn color(self) -> u32 {
        self.properties().color.unwrap_or(DEFAULT_COLOR)
    }

    pub fn color_rgb(self) -> [f32; 3] {
        let color = self.color();
        [
            ((color >> 16) & 0xFF) as f32 / 255.0,
            ((color >> 8) & 0xFF) as f32 / 255.0,
            (color & 0xFF) as f32 / 255.0,
        ]
    }

    pub fn is_placeable(self) -> bool {
        self != Self::Stick
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

pub fn glyph_for_name(name: &str) -> &'static str {
    BlockType::from_name(name).map_or(DEFAULT_GLYPH, BlockType::glyph)
}

pub fn color_for_name(name: &str) -> u32 {
    BlockType::from_name(name).map_or(DEFAULT_COLOR, BlockType::color)
}
