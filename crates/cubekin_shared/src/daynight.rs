use std::f32::consts::TAU;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DAY_LENGTH_MS: f32 = 120_000.0;
/// Noon.
pub const INITIAL_TIME_OF_DAY: f32 = 0.5;
const CELESTIAL_RADIUS: f32 = 200.0;

const DAY_SKY: [f32; 3] = [0.53, 0.81, 0.92];
const DUSK_SKY: [f32; 3] = [1.0, 0.5, 0.3];
const NIGHT_SKY: [f32; 3] = [0.05, 0.05, 0.15];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkyPhase {
    Day,
    Dusk,
    Night,
}

impl SkyPhase {
    fn from_day_factor(day_factor: f32) -> Self {
        if day_factor > 0.5 {
            SkyPhase::Day
        } else if day_factor > 0.0 {
            SkyPhase::Dusk
        } else {
            SkyPhase::Night
        }
    }

    pub fn sky_color(self) -> [f32; 3] {
        match self {
            SkyPhase::Day => DAY_SKY,
            SkyPhase::Dusk => DUSK_SKY,
            SkyPhase::Night => NIGHT_SKY,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightingState {
    pub time_of_day: f32,
    pub day_factor: f32,
    pub sun_position: Vec3,
    pub moon_position: Vec3,
    pub sun_intensity: f32,
    pub moon_intensity: f32,
    pub ambient_intensity: f32,
    pub phase: SkyPhase,
    pub sky_color: [f32; 3],
    pub fog_color: [f32; 3],
}

impl LightingState {
    pub fn at(time_of_day: f32) -> Self {
        let angle = time_of_day * TAU;
        let sun_position = Vec3::new(
            angle.cos() * CELESTIAL_RADIUS,
            angle.sin() * CELESTIAL_RADIUS,
            (angle * 0.5).sin() * CELESTIAL_RADIUS,
        );
        let day_factor = angle.sin().max(0.0);
        let phase = SkyPhase::from_day_factor(day_factor);

        Self {
            time_of_day,
            day_factor,
            sun_position,
            moon_position: -sun_position,
            sun_intensity: day_factor * 0.8,
            moon_intensity: (1.0 - day_factor) * 0.3,
            ambient_intensity: 0.3 + day_factor * 0.3,
            phase,
            sky_color: phase.sky_color(),
            fog_color: phase.sky_color(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DayNightCycle {
    time_of_day: f32,
    day_length_ms: f32,
}

impl Default for DayNightCycle {
    fn default() -> Self {
        Self::new(DEFAULT_DAY_LENGTH_MS)
    }
}

impl DayNightCycle {
    pub fn new(day_length_ms: f32) -> Self {
        Self {
            time_of_day: INITIAL_TIME_OF_DAY,
            day_length_ms: day_length_ms.max(1.0),
        }
    }

    pub fn time_of_day(&self) -> f32 {
        self.time_of_day
    }

    pub fn set_time_of_day(&mut self, time_of_day: f32) {
        self.time_of_day = time_of_day.rem_euclid(1.0);
    }

    pub fn tick(&mut self, dt: f32) -> LightingState {
        let advanced = self.time_of_day + dt.max(0.0) * 1000.0 / self.day_length_ms;
        self.time_of_day = advanced.rem_euclid(1.0);
        self.lighting()
    }

    pub fn lighting(&self) -> LightingState {
        LightingState::at(self.time_of_day)
    }
}
