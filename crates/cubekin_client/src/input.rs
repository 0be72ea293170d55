use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};

use cubekin_shared::inventory::{CRAFTING_SIZE, HOTBAR_SIZE};
use cubekin_shared::player::MoveFlags;
use glam::Vec2;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Backward,
    Left,
    Right,
    Jump,
    /// Number row, zero-based.
    Hotbar(usize),
    Pause,
}

impl FromStr for Key {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "w" | "forward" => Ok(Key::Forward),
            "s" | "backward" => Ok(Key::Backward),
            "a" | "left" => Ok(Key::Left),
            "d" | "right" => Ok(Key::Right),
            "space" | "jump" => Ok(Key::Jump),
            "escape" | "pause" => Ok(Key::Pause),
            digit => match digit.parse::<usize>() {
                Ok(n) if (1..=HOTBAR_SIZE).contains(&n) => Ok(Key::Hotbar(n - 1)),
                _ => Err(format!("unknown key '{value}'")),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

/// Written by host event callbacks between frames.
#[derive(Debug, Default)]
pub struct InputState {
    pressed_keys: FxHashSet<Key>,
    mouse_delta: Vec2,
    jump_pressed: bool,
    break_clicked: bool,
    place_clicked: bool,
    hotbar_select: Option<usize>,
    crafting_clicks: Vec<usize>,
    craft_clicked: bool,
    save_requested: bool,
}

/// One frame's worth of input, taken under a single lock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub moves: MoveFlags,
    pub mouse_delta: Vec2,
    pub jump: bool,
    pub break_block: bool,
    pub place_block: bool,
    pub hotbar_select: Option<usize>,
    pub crafting_clicks: Vec<usize>,
    pub craft: bool,
    pub save: bool,
}

impl InputState {
    pub fn press_key(&mut self, key: Key) {
        let newly_pressed = self.pressed_keys.insert(key);
        match key {
            Key::Jump if newly_pressed => self.jump_pressed = true,
            Key::Hotbar(index) if index < HOTBAR_SIZE => self.hotbar_select = Some(index),
            Key::Pause => self.save_requested = true,
            _ => {}
        }
    }

    pub fn release_key(&mut self, key: Key) {
        self.pressed_keys.remove(&key);
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed_keys.contains(&key)
    }

    pub fn add_mouse_delta(&mut self, delta: Vec2) {
        self.mouse_delta += delta;
    }

    pub fn click(&mut self, button: MouseButton) {
        match button {
            MouseButton::Left => self.break_clicked = true,
            MouseButton::Right => self.place_clicked = true,
        }
    }

    pub fn click_crafting_slot(&mut self, index: usize) {
        if index < CRAFTING_SIZE {
            self.crafting_clicks.push(index);
        }
    }

    pub fn click_crafting_result(&mut self) {
        self.craft_clicked = true;
    }

    /// Text form of host events, one per line:
    /// `press <key>`, `release <key>`, `tap <key>`, `look <dx> <dy>`,
    /// `break`, `place`, `craft-slot <n>`, `craft`, `save`.
    pub fn apply_command(&mut self, line: &str) -> Result<(), String> {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Ok(());
        };
        let mut next_arg = |what: &str| {
            parts
                .next()
                .ok_or_else(|| format!("'{command}' expects {what}"))
        };

        match command {
            "press" => self.press_key(next_arg("a key")?.parse()?),
            "release" => self.release_key(next_arg("a key")?.parse()?),
            "tap" => {
                let key = next_arg("a key")?.parse()?;
                self.press_key(key);
                self.release_key(key);
            }
            "look" => {
                let dx = parse_number::<f32>(next_arg("two numbers")?)?;
                let dy = parse_number::<f32>(next_arg("two numbers")?)?;
                self.add_mouse_delta(Vec2::new(dx, dy));
            }
            "break" => self.click(MouseButton::Left),
            "place" => self.click(MouseButton::Right),
            "craft-slot" => self.click_crafting_slot(parse_number(next_arg("a slot index")?)?),
            "craft" => self.click_crafting_result(),
            "save" => self.save_requested = true,
            other => return Err(format!("unknown command '{other}'")),
        }
        Ok(())
    }

    /// Held keys carry over; everything edge-triggered is cleared.
    pub fn take_snapshot(&mut self) -> InputSnapshot {
        let mut moves = MoveFlags::empty();
        for (key, flag) in [
            (Key::Forward, MoveFlags::FORWARD),
            (Key::Backward, MoveFlags::BACKWARD),
            (Key::Left, MoveFlags::LEFT),
            (Key::Right, MoveFlags::RIGHT),
        ] {
            moves.set(flag, self.is_pressed(key));
        }

        InputSnapshot {
            moves,
            mouse_delta: std::mem::take(&mut self.mouse_delta),
            jump: std::mem::take(&mut self.jump_pressed),
            break_block: std::mem::take(&mut self.break_clicked),
            place_block: std::mem::take(&mut self.place_clicked),
            hotbar_select: self.hotbar_select.take(),
            crafting_clicks: std::mem::take(&mut self.crafting_clicks),
            craft: std::mem::take(&mut self.craft_clicked),
            save: std::mem::take(&mut self.save_requested),
        }
    }
}

fn parse_number<T: FromStr>(value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("invalid number '{value}'"))
}

pub type SharedInput = Arc<Mutex<InputState>>;

pub fn shared_input() -> SharedInput {
    Arc::new(Mutex::new(InputState::default()))
}

/// A panicked writer leaves the buffer readable, so a poisoned lock is recovered.
pub fn snapshot(input: &SharedInput) -> InputSnapshot {
    input
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take_snapshot()
}
