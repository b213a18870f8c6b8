use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use gridshot::assets::ProceduralAssets;
use gridshot::audio::LogAudio;
use gridshot::caster::DepthBuffer;
use gridshot::config::GameConfig;
use gridshot::game::Game;
use gridshot::input::{InputState, command_for_key, command_for_mouse};
use gridshot::present::{StretchLut, blit_stretch, internal_size};
use gridshot::weapons::WeaponSpec;
use gridshot::world::Level;

/// Internal render height; width follows the window aspect.
const INTERNAL_HEIGHT: usize = 360;

#[derive(Parser, Debug)]
#[command(version, about = "Grid-based raycasting shooter")]
struct CliArgs {
    /// ASCII level file (`#`/1-9 walls, `.` floor, `P` spawn, `T`/`s` props).
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,
    /// Kills needed to win.
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    kills: u32,
    /// Enemies kept alive at the same time.
    #[arg(long, default_value_t = 5)]
    enemies: usize,
    /// Horizontal field of view in degrees.
    #[arg(long, default_value_t = 60.0)]
    fov: f32,
    /// Rays cast per frame (defaults to one per internal column).
    #[arg(long)]
    rays: Option<usize>,
    /// Maximum render distance in map cells.
    #[arg(long, default_value_t = 24.0)]
    max_distance: f32,
    /// Player walk speed, cells per second.
    #[arg(long, default_value_t = 3.0)]
    speed: f32,
    /// Turn speed, radians per second.
    #[arg(long, default_value_t = 2.6)]
    turn_speed: f32,
    /// Enemy walk speed, cells per second.
    #[arg(long, default_value_t = 1.3)]
    enemy_speed: f32,
    /// Fixed RNG seed for spawn placement.
    #[arg(long)]
    seed: Option<u64>,
    /// Weapon slot, repeatable; replaces the default arsenal. RESERVE may be `inf`.
    #[arg(long = "weapon", value_name = "NAME:CAP:RESERVE:RELOAD:DAMAGE")]
    weapons: Vec<WeaponSpec>,
}

impl CliArgs {
    fn into_config(self) -> (GameConfig, Option<PathBuf>) {
        let mut cfg = GameConfig::default();
        cfg.sim.target_kills = self.kills;
        cfg.sim.active_enemies = self.enemies;
        cfg.sim.player_speed = self.speed;
        cfg.sim.turn_speed = self.turn_speed;
        cfg.sim.enemy_speed = self.enemy_speed;
        cfg.sim.seed = self.seed;
        cfg.render.fov = self.fov.to_radians();
        cfg.render.ray_count = self.rays;
        cfg.render.max_distance = self.max_distance;
        if !self.weapons.is_empty() {
            cfg.weapons = self.weapons;
        }
        (cfg, self.map)
    }
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    game: Game,
    assets: ProceduralAssets,
    audio: LogAudio,
    input: InputState,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,
    last_title: String,

    // Internal low-res buffer and its depth buffer
    fb_small: Vec<u32>,
    fb_w: usize,
    fb_h: usize,
    depth: DepthBuffer,

    lut: StretchLut,
    last_tick: Instant,
}

impl App {
    fn new(game: Game) -> Self {
        let (fb_w, fb_h) = internal_size(800, 600, INTERNAL_HEIGHT);
        Self {
            window: None,
            surface: None,
            game,
            assets: ProceduralAssets::default(),
            audio: LogAudio,
            input: InputState::new(),

            frame_counter: 0,
            last_fps_print: Instant::now(),
            last_title: String::new(),

            fb_small: vec![0; fb_w * fb_h],
            fb_w,
            fb_h,
            depth: DepthBuffer::new(),

            lut: StretchLut::default(),
            last_tick: Instant::now(),
        }
    }

    fn tick(&mut self) {
        // Cap dt to avoid huge jumps if the app was paused
        let now = Instant::now();
        let dt = now
            .duration_since(self.last_tick)
            .min(Duration::from_millis(100));
        self.last_tick = now;

        self.game.update(dt.as_secs_f32(), &mut self.input);
        self.game.flush_audio(&mut self.audio);
    }

    fn rebuild_internal_fb_and_lut(&mut self, dst_w: usize, dst_h: usize) {
        let (w, h) = internal_size(dst_w, dst_h, INTERNAL_HEIGHT);
        if w != self.fb_w || h != self.fb_h {
            self.fb_w = w;
            self.fb_h = h;
            self.fb_small = vec![0u32; w * h];
        }
        self.lut = StretchLut::new(dst_w, dst_h, self.fb_w, self.fb_h);
    }

    fn update_title(&mut self) {
        let title = format!("gridshot | {}", self.game.hud());
        if title != self.last_title {
            if let Some(window) = &self.window {
                window.set_title(&title);
            }
            self.last_title = title;
        }
    }

    fn redraw(&mut self, id: WindowId) -> Result<()> {
        let size = match (&self.window, &self.surface) {
            (Some(w), Some(_)) if w.id() == id => w.inner_size(),
            _ => return Ok(()),
        };

        let (Some(nw), Some(nh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(()); // Minimized window, skip drawing
        };
        let (dw, dh) = (size.width as usize, size.height as usize);
        if self.lut.dst_width() != dw || self.lut.dst_height() != dh {
            self.rebuild_internal_fb_and_lut(dw, dh);
        }

        // Simulation has finished for this frame; everything below only reads it
        self.game.render(
            &mut self.fb_small,
            self.fb_w,
            self.fb_h,
            &mut self.depth,
            &self.assets,
        );

        let surface = self.surface.as_mut().context("surface vanished")?;
        surface
            .resize(nw, nh)
            .map_err(|e| anyhow::anyhow!("resize surface: {e}"))?;
        let mut buf = surface
            .buffer_mut()
            .map_err(|e| anyhow::anyhow!("map surface buffer: {e}"))?;
        blit_stretch(&mut buf, &self.fb_small, self.fb_w, &self.lut);
        buf.present()
            .map_err(|e| anyhow::anyhow!("present frame: {e}"))?;
        Ok(())
    }

    fn count_frame(&mut self) {
        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            let fps = self.frame_counter as f32 / elapsed;
            tracing::debug!(fps, "frame rate");
            self.frame_counter = 0;
            self.last_fps_print = now;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("gridshot")
            .with_inner_size(LogicalSize::new(960.0, 540.0));

        let setup = || -> Result<_> {
            let window = Rc::new(
                event_loop
                    .create_window(attributes)
                    .context("create window")?,
            );
            let context = softbuffer::Context::new(window.clone())
                .map_err(|e| anyhow::anyhow!("softbuffer context: {e}"))?;
            let surface = softbuffer::Surface::new(&context, window.clone())
                .map_err(|e| anyhow::anyhow!("softbuffer surface: {e}"))?;
            Ok((window, surface))
        };

        match setup() {
            Ok((window, surface)) => {
                let size = window.inner_size();
                self.rebuild_internal_fb_and_lut(size.width as usize, size.height as usize);
                window.request_redraw();
                self.surface = Some(surface);
                self.window = Some(window);
                self.last_tick = Instant::now();
                info!(width = self.fb_w, height = self.fb_h, "window ready");
            }
            Err(e) => {
                error!("{e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested, exiting");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key,
                        state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let PhysicalKey::Code(code) = physical_key else {
                    return;
                };
                if code == KeyCode::Escape && state == ElementState::Pressed {
                    event_loop.exit();
                    return;
                }
                if let Some(cmd) = command_for_key(code) {
                    match state {
                        ElementState::Pressed => self.input.press(cmd, repeat),
                        ElementState::Released => self.input.release(cmd),
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let (ElementState::Pressed, Some(cmd)) = (state, command_for_mouse(button)) {
                    self.input.press(cmd, false);
                }
            }

            WindowEvent::Focused(false) => self.input.clear(),

            WindowEvent::RedrawRequested => {
                self.tick();
                if let Err(e) = self.redraw(id) {
                    error!("{e:#}");
                    event_loop.exit();
                    return;
                }
                self.update_title();
                self.count_frame();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_internal_fb_and_lut(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gridshot=info")),
        )
        .init();

    let (config, map_path) = CliArgs::parse().into_config();

    let level = match map_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("read map {}", path.display()))?;
            Level::parse(&text).with_context(|| format!("parse map {}", path.display()))?
        }
        None => Level::builtin(),
    };
    info!(
        width = level.map.width(),
        height = level.map.height(),
        decorations = level.decorations.len(),
        "level loaded"
    );

    let event_loop = EventLoop::new().context("create event loop")?;
    // Games redraw continuously
    event_loop.set_control_flow(ControlFlow::Poll);

    let game = Game::new(config, level).context("invalid configuration")?;
    let mut app = App::new(game);
    event_loop.run_app(&mut app).context("event loop")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridshot::weapons::Reserve;

    #[test]
    fn weapon_flags_replace_the_arsenal() {
        let args = CliArgs::try_parse_from([
            "gridshot",
            "--turn-speed",
            "4",
            "--weapon",
            "Pistol:12:inf:0.9:25",
            "--weapon",
            "Cannon:1:5:3:400",
        ])
        .unwrap();
        let (cfg, map) = args.into_config();
        assert!(map.is_none());
        assert_eq!(cfg.sim.turn_speed, 4.0);
        assert_eq!(cfg.weapons.len(), 2);
        assert_eq!(cfg.weapons[1].name, "Cannon");
        assert_eq!(cfg.weapons[1].reserve, Reserve::Finite(5));
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn defaults_keep_the_builtin_arsenal() {
        let (cfg, _) = CliArgs::try_parse_from(["gridshot"]).unwrap().into_config();
        assert_eq!(cfg.weapons, GameConfig::default().weapons);
        assert_eq!(cfg.sim.turn_speed, GameConfig::default().sim.turn_speed);
    }

    #[test]
    fn malformed_weapon_flag_is_a_usage_error() {
        assert!(CliArgs::try_parse_from(["gridshot", "--weapon", "Pistol:12"]).is_err());
    }
}
