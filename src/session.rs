use rand::rngs::StdRng;

use crate::audio::AudioCue;
use crate::config::{ConfigError, GameConfig};
use crate::entities::{Decoration, Enemy, Player};
use crate::weapons::Armory;
use crate::world::Level;

/// Facing at spawn: looking down +X.
pub const SPAWN_ANGLE: f32 = 0.0;

/// All mutable state of one play-through.
///
/// Only the simulation phase of [`crate::game::Game::update`] writes to it;
/// the render phase reads it afterwards.
#[derive(Debug)]
pub struct Session {
    pub player: Player,
    pub armory: Armory,
    pub enemies: Vec<Enemy>,
    pub decorations: Vec<Decoration>,
    pub kills: u32,
    /// Seconds left on the muzzle flash overlay.
    pub muzzle_flash: f32,
    /// Seconds left on the damage flash overlay.
    pub damage_flash: f32,
    pub ambient_timer: f32,
    pub cues: Vec<AudioCue>,
    pub rng: StdRng,
}

impl Session {
    pub fn new(level: &Level, cfg: &GameConfig, rng: StdRng) -> Result<Self, ConfigError> {
        let sim = &cfg.sim;
        Ok(Self {
            player: Player::new(level.spawn, SPAWN_ANGLE, sim.player_health, sim.player_armor),
            armory: Armory::new(&cfg.weapons)?,
            enemies: Vec::with_capacity(sim.active_enemies),
            decorations: level
                .decorations
                .iter()
                .map(|p| Decoration {
                    pos: p.pos,
                    kind: p.kind,
                })
                .collect(),
            kills: 0,
            muzzle_flash: 0.0,
            damage_flash: 0.0,
            ambient_timer: sim.ambient_interval,
            cues: Vec::new(),
            rng,
        })
    }

    /// Back to the spawn pose with fresh counters and a restocked armory;
    /// the RNG stream carries on.
    pub fn reset(&mut self, level: &Level, cfg: &GameConfig) {
        let sim = &cfg.sim;
        self.player = Player::new(level.spawn, SPAWN_ANGLE, sim.player_health, sim.player_armor);
        self.armory.restock();
        self.enemies.clear();
        self.decorations = level
            .decorations
            .iter()
            .map(|p| Decoration {
                pos: p.pos,
                kind: p.kind,
            })
            .collect();
        self.kills = 0;
        self.muzzle_flash = 0.0;
        self.damage_flash = 0.0;
        self.ambient_timer = sim.ambient_interval;
        self.cues.clear();
    }

    pub fn alive_enemies(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    #[inline]
    pub fn cue(&mut self, cue: AudioCue) {
        self.cues.push(cue);
    }
}
