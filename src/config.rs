use std::f32::consts::PI;

use thiserror::Error;

use crate::weapons::{Reserve, WeaponSpec};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("weapon table is empty")]
    NoWeapons,
    #[error("weapon `{0}` has zero magazine capacity")]
    ZeroCapacity(String),
    #[error("field of view must be in (0, pi), got {0}")]
    FieldOfView(f32),
    #[error("ray count must be at least 1")]
    ZeroRays,
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("armor ratio must be within [0, 1], got {0}")]
    ArmorRatio(f32),
    #[error("target kill count must be at least 1")]
    ZeroKillTarget,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Horizontal field of view in radians.
    pub fov: f32,
    /// Number of rays per frame; `None` casts one per framebuffer column.
    pub ray_count: Option<usize>,
    pub max_distance: f32,
    /// Camera height above the floor, in map units.
    pub eye_height: f32,
    pub wall_height: f32,
    /// Floor closer than this stays at full brightness.
    pub shade_near: f32,
    pub shade_min: f32,
    pub tall_sprite_height: f32,
    pub short_sprite_height: f32,
    /// How far a sprite's bottom edge hangs below the horizon, as a fraction
    /// of its projected height.
    pub tall_sprite_drop: f32,
    pub short_sprite_drop: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov: PI / 3.0,
            ray_count: None,
            max_distance: 24.0,
            eye_height: 0.5,
            wall_height: 1.0,
            shade_near: 2.0,
            shade_min: 0.18,
            tall_sprite_height: 1.0,
            short_sprite_height: 0.45,
            tall_sprite_drop: 0.1,
            short_sprite_drop: 0.6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub target_kills: u32,
    pub active_enemies: usize,

    pub player_speed: f32,
    /// rad/s
    pub turn_speed: f32,
    pub player_health: f32,
    pub player_armor: f32,
    /// Look-ahead in the direction of motion used by the cell test.
    pub collision_margin: f32,

    pub enemy_speed: f32,
    pub enemy_health: f32,
    pub contact_radius: f32,
    pub contact_dps: f32,
    /// Share of incoming contact damage taken by armor while any remains.
    pub armor_ratio: f32,
    pub death_duration: f32,

    /// Half-width of the hit-scan cone, radians.
    pub hit_angle: f32,

    pub spawn_min_player_dist: f32,
    pub spawn_min_enemy_dist: f32,
    pub spawn_attempts: u32,

    pub muzzle_flash: f32,
    pub damage_flash: f32,
    pub ambient_interval: f32,

    /// Fixed seed for spawn placement; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            target_kills: 100,
            active_enemies: 5,
            player_speed: 3.0,
            turn_speed: 2.6,
            player_health: 100.0,
            player_armor: 100.0,
            collision_margin: 0.2,
            enemy_speed: 1.3,
            enemy_health: 100.0,
            contact_radius: 0.6,
            contact_dps: 25.0,
            armor_ratio: 0.6,
            death_duration: 0.6,
            hit_angle: 0.08,
            spawn_min_player_dist: 6.0,
            spawn_min_enemy_dist: 2.5,
            spawn_attempts: 40,
            muzzle_flash: 0.08,
            damage_flash: 0.25,
            ambient_interval: 4.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub render: RenderConfig,
    pub sim: SimConfig,
    pub weapons: Vec<WeaponSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            sim: SimConfig::default(),
            weapons: default_weapons(),
        }
    }
}

pub fn default_weapons() -> Vec<WeaponSpec> {
    vec![
        WeaponSpec {
            name: "Pistol".into(),
            capacity: 12,
            reserve: Reserve::Infinite,
            reload_time: 1.1,
            damage: 34.0,
        },
        WeaponSpec {
            name: "Shotgun".into(),
            capacity: 6,
            reserve: Reserve::Finite(36),
            reload_time: 2.0,
            damage: 100.0,
        },
        WeaponSpec {
            name: "Rifle".into(),
            capacity: 30,
            reserve: Reserve::Finite(150),
            reload_time: 1.6,
            damage: 25.0,
        },
    ]
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.weapons.is_empty() {
            return Err(ConfigError::NoWeapons);
        }
        if let Some(w) = self.weapons.iter().find(|w| w.capacity == 0) {
            return Err(ConfigError::ZeroCapacity(w.name.clone()));
        }

        let r = &self.render;
        if !(r.fov > 0.0 && r.fov < PI) {
            return Err(ConfigError::FieldOfView(r.fov));
        }
        if r.ray_count == Some(0) {
            return Err(ConfigError::ZeroRays);
        }

        let s = &self.sim;
        let positive = [
            ("max_distance", r.max_distance),
            ("eye_height", r.eye_height),
            ("wall_height", r.wall_height),
            ("shade_near", r.shade_near),
            ("player_speed", s.player_speed),
            ("turn_speed", s.turn_speed),
            ("player_health", s.player_health),
            ("enemy_speed", s.enemy_speed),
            ("enemy_health", s.enemy_health),
            ("death_duration", s.death_duration),
            ("hit_angle", s.hit_angle),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        if !(0.0..=1.0).contains(&s.armor_ratio) {
            return Err(ConfigError::ArmorRatio(s.armor_ratio));
        }
        if s.target_kills == 0 {
            return Err(ConfigError::ZeroKillTarget);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GameConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_fov() {
        let mut cfg = GameConfig::default();
        cfg.render.fov = PI;
        assert_eq!(cfg.validate(), Err(ConfigError::FieldOfView(PI)));
    }

    #[test]
    fn rejects_empty_weapon_table() {
        let mut cfg = GameConfig::default();
        cfg.weapons.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::NoWeapons));
    }

    #[test]
    fn rejects_armor_ratio_out_of_range() {
        let mut cfg = GameConfig::default();
        cfg.sim.armor_ratio = 1.5;
        assert_eq!(cfg.validate(), Err(ConfigError::ArmorRatio(1.5)));
    }

    #[test]
    fn rejects_zero_kill_target() {
        let mut cfg = GameConfig::default();
        cfg.sim.target_kills = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroKillTarget));
    }
}
