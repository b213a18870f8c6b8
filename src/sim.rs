use rand::Rng;
use tracing::{debug, trace};

use crate::audio::AudioCue;
use crate::camera::{direction, normalize_angle};
use crate::config::{GameConfig, SimConfig};
use crate::entities::{Enemy, Player};
use crate::session::Session;
use crate::weapons::FireResult;
use crate::world::GridMap;

/// Longest sub-step `try_move` takes; below one cell so no wall is skipped.
const MAX_SUBSTEP: f32 = 0.25;

/// Move `pos` by `delta`, one axis at a time.
///
/// Each axis is accepted only if the destination cell (tested `margin`
/// ahead in the direction of travel) is empty, so a blocked axis never
/// stops motion along the other. Long moves are split into sub-steps so
/// every cell along the way gets tested.
pub fn try_move(map: &GridMap, pos: [f32; 2], delta: [f32; 2], margin: f32) -> [f32; 2] {
    let longest = delta[0].abs().max(delta[1].abs());
    if !longest.is_finite() {
        return pos;
    }
    let steps = (longest / MAX_SUBSTEP).ceil().max(1.0) as usize;
    let step = [delta[0] / steps as f32, delta[1] / steps as f32];

    let mut out = pos;
    for _ in 0..steps {
        if step[0] != 0.0 {
            let ahead = out[0] + step[0] + margin.copysign(step[0]);
            if map.is_open_at([ahead, out[1]]) {
                out[0] += step[0];
            }
        }
        if step[1] != 0.0 {
            let ahead = out[1] + step[1] + margin.copysign(step[1]);
            if map.is_open_at([out[0], ahead]) {
                out[1] += step[1];
            }
        }
    }
    out
}

/// Turn and walk the player according to their held intents.
pub fn move_player(player: &mut Player, map: &GridMap, cfg: &SimConfig, dt: f32) {
    let i = player.intents;

    let mut yaw_delta = 0.0;
    if i.turn_left {
        yaw_delta -= 1.0;
    }
    if i.turn_right {
        yaw_delta += 1.0;
    }
    player.angle = normalize_angle(player.angle + yaw_delta * cfg.turn_speed * dt);

    let mut fwd: f32 = 0.0;
    let mut strafe: f32 = 0.0;
    if i.forward {
        fwd += 1.0;
    }
    if i.backward {
        fwd -= 1.0;
    }
    if i.strafe_right {
        strafe += 1.0;
    }
    if i.strafe_left {
        strafe -= 1.0;
    }
    if fwd == 0.0 && strafe == 0.0 {
        return;
    }

    // Normalize diagonal speed
    let inv = 1.0 / (fwd * fwd + strafe * strafe).sqrt();
    let [c, s] = direction(player.angle);
    // Right-hand perpendicular of the facing vector
    let right = [-s, c];
    let step = cfg.player_speed * dt * inv;
    let delta = [
        (c * fwd + right[0] * strafe) * step,
        (s * fwd + right[1] * strafe) * step,
    ];
    player.pos = try_move(map, player.pos, delta, cfg.collision_margin);
}

/// Walk living enemies toward the player and apply contact damage.
///
/// Returns the total damage dealt this step, before armor.
pub fn advance_enemies(session: &mut Session, map: &GridMap, cfg: &SimConfig, dt: f32) -> f32 {
    let target = session.player.pos;
    let mut damage = 0.0;

    for enemy in session.enemies.iter_mut().filter(|e| e.is_alive()) {
        let dx = target[0] - enemy.pos[0];
        let dy = target[1] - enemy.pos[1];
        let dist = (dx * dx + dy * dy).sqrt();

        // Close the gap but stop short of standing inside the camera
        let hold = 0.5 * cfg.contact_radius;
        if dist > hold {
            let step = (cfg.enemy_speed * dt).min(dist - hold);
            let delta = [dx / dist * step, dy / dist * step];
            enemy.pos = try_move(map, enemy.pos, delta, cfg.collision_margin);
        }

        let dx = target[0] - enemy.pos[0];
        let dy = target[1] - enemy.pos[1];
        if (dx * dx + dy * dy).sqrt() < cfg.contact_radius {
            damage += cfg.contact_dps * dt;
        }
    }

    if damage > 0.0 {
        session.player.take_damage(damage, cfg.armor_ratio);
        if session.damage_flash <= 0.0 {
            session.cue(AudioCue::PlayerHurt);
        }
        session.damage_flash = cfg.damage_flash;
    }
    damage
}

/// Index of the enemy a shot from `player` would hit: the nearest living
/// one within `hit_angle` of the facing direction.
pub fn hitscan_target(player: &Player, enemies: &[Enemy], hit_angle: f32) -> Option<usize> {
    let [fx, fy] = direction(player.angle);
    enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_alive())
        .filter_map(|(i, e)| {
            let dx = e.pos[0] - player.pos[0];
            let dy = e.pos[1] - player.pos[1];
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < f32::EPSILON {
                return Some((i, 0.0));
            }
            let rel = normalize_angle(dy.atan2(dx) - player.angle);
            // Behind the player never counts, whatever the threshold
            (rel.abs() <= hit_angle && dx * fx + dy * fy > 0.0).then_some((i, dist))
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShotOutcome {
    Miss,
    Hit { enemy: usize, killed: bool },
    /// No round left the barrel.
    NotFired(FireResult),
}

/// Pull the trigger on the selected weapon and resolve the hit.
pub fn fire(session: &mut Session, cfg: &SimConfig) -> ShotOutcome {
    let result = session.armory.current_mut().try_fire();
    let damage = match result {
        FireResult::Fired { damage } => damage,
        FireResult::Reloading => {
            session.cue(AudioCue::ReloadStart);
            return ShotOutcome::NotFired(result);
        }
        FireResult::Dry => {
            session.cue(AudioCue::DryFire);
            return ShotOutcome::NotFired(result);
        }
        FireResult::Busy => return ShotOutcome::NotFired(result),
    };

    session.cue(AudioCue::Shot);
    session.muzzle_flash = cfg.muzzle_flash;

    let Some(idx) = hitscan_target(&session.player, &session.enemies, cfg.hit_angle) else {
        return ShotOutcome::Miss;
    };

    let killed = session.enemies[idx].apply_damage(damage);
    if killed {
        session.kills += 1;
        session.cue(AudioCue::EnemyDown);
        debug!(kills = session.kills, "enemy down");
    } else {
        session.cue(AudioCue::EnemyHit);
    }
    ShotOutcome::Hit { enemy: idx, killed }
}

pub fn reload(session: &mut Session) {
    if session.armory.current_mut().request_reload() {
        session.cue(AudioCue::ReloadStart);
    }
}

pub fn select_weapon(session: &mut Session, slot: usize) {
    if session.armory.select(slot) {
        session.cue(AudioCue::WeaponSwitch);
    }
}

/// Advance every countdown: reload, flashes, death animations, ambient cue.
/// Enemies whose death animation has finished are dropped.
pub fn tick_timers(session: &mut Session, cfg: &SimConfig, dt: f32) {
    if session.armory.tick(dt) {
        session.cue(AudioCue::ReloadDone);
    }

    session.muzzle_flash = (session.muzzle_flash - dt).max(0.0);
    session.damage_flash = (session.damage_flash - dt).max(0.0);

    for enemy in &mut session.enemies {
        enemy.tick(dt);
    }
    session.enemies.retain(|e| !e.is_dead());

    if cfg.ambient_interval > 0.0 {
        session.ambient_timer -= dt;
        if session.ambient_timer <= 0.0 {
            session.ambient_timer += cfg.ambient_interval;
            session.cue(AudioCue::AmbientTick);
        }
    }
}

/// Top the living enemy count back up toward `active_enemies`, one spawn
/// per call. Gives up quietly when no cell passes within the attempt budget.
pub fn maintain_spawns(session: &mut Session, map: &GridMap, cfg: &GameConfig) -> bool {
    let sim = &cfg.sim;
    if session.kills >= sim.target_kills || session.alive_enemies() >= sim.active_enemies {
        return false;
    }
    if map.width() < 3 || map.height() < 3 {
        return false;
    }

    let min_player_sq = sim.spawn_min_player_dist * sim.spawn_min_player_dist;
    let min_enemy_sq = sim.spawn_min_enemy_dist * sim.spawn_min_enemy_dist;
    let player = session.player.pos;

    for _ in 0..sim.spawn_attempts {
        let cx = session.rng.gen_range(1..map.width() - 1);
        let cy = session.rng.gen_range(1..map.height() - 1);
        if map.is_wall(cx as i32, cy as i32) {
            continue;
        }
        let p = [cx as f32 + 0.5, cy as f32 + 0.5];
        if dist_sq(p, player) < min_player_sq {
            continue;
        }
        if session
            .enemies
            .iter()
            .any(|e| dist_sq(p, e.pos) < min_enemy_sq)
        {
            continue;
        }

        session
            .enemies
            .push(Enemy::new(p, sim.enemy_health, sim.death_duration));
        debug!(x = p[0], y = p[1], alive = session.alive_enemies(), "enemy spawned");
        return true;
    }

    trace!(attempts = sim.spawn_attempts, "no spawn cell found this frame");
    false
}

#[inline]
fn dist_sq(a: [f32; 2], b: [f32; 2]) -> f32 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}
