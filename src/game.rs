use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::assets::{AssetProvider, BARREL, ENEMY, PILLAR};
use crate::audio::{AudioCue, AudioSink};
use crate::camera::Camera;
use crate::caster::DepthBuffer;
use crate::config::{ConfigError, GameConfig};
use crate::entities::DecorationKind;
use crate::input::{Command, InputState};
use crate::renderer::{Tint, View, pack_rgb, render_frame};
use crate::session::Session;
use crate::sim;
use crate::sprites::{Billboard, SpriteClass};
use crate::weapons::Reserve;
use crate::world::Level;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Menu,
    Playing,
    Terminal(Outcome),
}

/// Values handed to the presentation layer each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Hud {
    pub state: GameState,
    pub health_pct: u32,
    pub armor_pct: u32,
    pub kills: u32,
    pub target: u32,
    pub weapon: String,
    pub magazine: u32,
    pub capacity: u32,
    pub reserve: Reserve,
    pub reloading: bool,
}

impl fmt::Display for Hud {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            GameState::Menu => return write!(f, "Press Enter to start"),
            GameState::Terminal(Outcome::Won) => {
                return write!(f, "Victory! {} kills. Enter to play again", self.kills);
            }
            GameState::Terminal(Outcome::Lost) => {
                return write!(f, "You died with {} kills. Enter to retry", self.kills);
            }
            GameState::Playing => {}
        }
        write!(
            f,
            "HP {}%  AR {}%  Kills {}/{}  {} {}/",
            self.health_pct, self.armor_pct, self.kills, self.target, self.weapon, self.magazine
        )?;
        match self.reserve {
            Reserve::Infinite => write!(f, "inf")?,
            Reserve::Finite(n) => write!(f, "{n}")?,
        }
        if self.reloading {
            write!(f, "  reloading")?;
        }
        Ok(())
    }
}

pub struct Game {
    config: GameConfig,
    level: Level,
    state: GameState,
    session: Session,
}

impl Game {
    /// Validates `config` and starts at the menu. Seeds from
    /// `config.sim.seed` when set.
    pub fn new(config: GameConfig, level: Level) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.sim.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let session = Session::new(&level, &config, rng)?;
        Ok(Self {
            config,
            level,
            state: GameState::Menu,
            session,
        })
    }

    #[inline]
    pub fn state(&self) -> GameState {
        self.state
    }

    #[inline]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Direct access for scripted setups; normal play goes through `update`.
    #[inline]
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Reset all session data, fill the arena with enemies and start playing.
    pub fn new_session(&mut self) {
        self.session.reset(&self.level, &self.config);
        // Each call spends its own attempt budget; failures just leave fewer
        for _ in 0..self.config.sim.active_enemies {
            sim::maintain_spawns(&mut self.session, &self.level.map, &self.config);
        }
        self.state = GameState::Playing;
        info!(
            target_kills = self.config.sim.target_kills,
            active = self.config.sim.active_enemies,
            spawned = self.session.alive_enemies(),
            "session started"
        );
    }

    /// Run one frame of simulation.
    ///
    /// While playing the order is fixed: timers, player input, enemies and
    /// contact damage, loss check, spawning, win check. Outside of play only
    /// `Confirm` is looked at.
    pub fn update(&mut self, dt: f32, input: &mut InputState) {
        let commands = input.drain();

        if self.state != GameState::Playing {
            if commands.contains(&Command::Confirm) {
                self.new_session();
            }
            return;
        }

        let dt = dt.max(0.0);
        let cfg = &self.config;
        let s = &mut self.session;

        sim::tick_timers(s, &cfg.sim, dt);

        s.player.intents = input.intents();
        for cmd in commands {
            match cmd {
                Command::Fire => {
                    sim::fire(s, &cfg.sim);
                }
                Command::Reload => sim::reload(s),
                Command::SelectWeapon(slot) => sim::select_weapon(s, slot),
                _ => {}
            }
        }
        sim::move_player(&mut s.player, &self.level.map, &cfg.sim, dt);

        sim::advance_enemies(s, &self.level.map, &cfg.sim, dt);

        if s.player.is_dead() {
            s.cue(AudioCue::Defeat);
            self.state = GameState::Terminal(Outcome::Lost);
            info!(kills = s.kills, "player died");
            return;
        }

        sim::maintain_spawns(s, &self.level.map, cfg);

        if s.kills >= cfg.sim.target_kills {
            s.cue(AudioCue::Victory);
            self.state = GameState::Terminal(Outcome::Won);
            info!(kills = s.kills, "kill target reached");
        }
    }

    /// Hand queued cues to `sink` in the order they were raised.
    pub fn flush_audio(&mut self, sink: &mut dyn AudioSink) {
        for cue in self.session.cues.drain(..) {
            sink.play(cue);
        }
    }

    pub fn camera(&self) -> Camera {
        let p = &self.session.player;
        Camera::new(p.pos, p.angle, self.config.render.fov)
    }

    /// Snapshot of what the renderer needs; decorations first, then enemies.
    pub fn view(&self) -> View<'_> {
        let s = &self.session;
        let mut billboards = Vec::with_capacity(s.decorations.len() + s.enemies.len());

        billboards.extend(s.decorations.iter().map(|d| Billboard {
            pos: d.pos,
            class: d.kind.sprite_class(),
            texture: match d.kind {
                DecorationKind::Tall => PILLAR,
                DecorationKind::Short => BARREL,
            },
            scale: 1.0,
            opacity: 1.0,
        }));
        billboards.extend(s.enemies.iter().filter(|e| !e.is_dead()).map(|e| {
            let k = e.shrink();
            Billboard {
                pos: e.pos,
                class: SpriteClass::Tall,
                texture: ENEMY,
                scale: k,
                opacity: k,
            }
        }));

        View {
            camera: self.camera(),
            map: &self.level.map,
            billboards,
            tint: self.tint(),
        }
    }

    fn tint(&self) -> Option<Tint> {
        let s = &self.session;
        let sim = &self.config.sim;
        match self.state {
            GameState::Menu => Some(Tint {
                color: 0,
                strength: 0.6,
            }),
            GameState::Terminal(Outcome::Won) => Some(Tint {
                color: pack_rgb(40, 160, 60),
                strength: 0.35,
            }),
            GameState::Terminal(Outcome::Lost) => Some(Tint {
                color: pack_rgb(140, 0, 0),
                strength: 0.55,
            }),
            GameState::Playing if s.damage_flash > 0.0 => Some(Tint {
                color: pack_rgb(200, 20, 20),
                strength: 0.4 * s.damage_flash / sim.damage_flash.max(f32::EPSILON),
            }),
            GameState::Playing if s.muzzle_flash > 0.0 => Some(Tint {
                color: pack_rgb(255, 220, 120),
                strength: 0.25 * s.muzzle_flash / sim.muzzle_flash.max(f32::EPSILON),
            }),
            GameState::Playing => None,
        }
    }

    /// Render the current state. `depth` is caller-owned scratch that is
    /// rewritten every call.
    pub fn render(
        &self,
        buf: &mut [u32],
        width: usize,
        height: usize,
        depth: &mut DepthBuffer,
        assets: &dyn AssetProvider,
    ) {
        let view = self.view();
        render_frame(buf, width, height, &view, &self.config.render, depth, assets);
    }

    pub fn hud(&self) -> Hud {
        let s = &self.session;
        let sim = &self.config.sim;
        let weapon = s.armory.current();
        let pct = |v: f32, max: f32| {
            if max > 0.0 {
                (v / max * 100.0).round().clamp(0.0, 100.0) as u32
            } else {
                0
            }
        };
        Hud {
            state: self.state,
            health_pct: pct(s.player.health, sim.player_health),
            armor_pct: pct(s.player.armor, sim.player_armor),
            kills: s.kills,
            target: sim.target_kills,
            weapon: weapon.spec().name.clone(),
            magazine: weapon.magazine(),
            capacity: weapon.spec().capacity,
            reserve: weapon.reserve(),
            reloading: weapon.is_reloading(),
        }
    }
}
