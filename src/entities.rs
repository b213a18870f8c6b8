use crate::sprites::SpriteClass;

/// Held movement intents, set from input once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intents {
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub strafe_left: bool,
    pub strafe_right: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub pos: [f32; 2],
    /// Facing, radians in (-pi, pi].
    pub angle: f32,
    pub intents: Intents,
    pub health: f32,
    pub armor: f32,
}

impl Player {
    pub fn new(pos: [f32; 2], angle: f32, health: f32, armor: f32) -> Self {
        Self {
            pos,
            angle,
            intents: Intents::default(),
            health,
            armor,
        }
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Take `amount` damage, `armor_ratio` of it soaked by armor while any is
    /// left. Armor that runs out passes the remainder through to health.
    pub fn take_damage(&mut self, amount: f32, armor_ratio: f32) {
        if amount <= 0.0 {
            return;
        }
        let to_armor = (amount * armor_ratio).min(self.armor);
        self.armor -= to_armor;
        self.health = (self.health - (amount - to_armor)).max(0.0);
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyState {
    Alive,
    Dying { remaining: f32 },
    Dead,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub pos: [f32; 2],
    pub health: f32,
    state: EnemyState,
    death_duration: f32,
}

impl Enemy {
    pub fn new(pos: [f32; 2], health: f32, death_duration: f32) -> Self {
        Self {
            pos,
            health,
            state: EnemyState::Alive,
            death_duration,
        }
    }

    #[inline]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == EnemyState::Alive
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    /// Returns `true` exactly once: on the hit that takes the enemy from
    /// Alive to Dying. Hits on dying or dead enemies do nothing.
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.state != EnemyState::Alive {
            return false;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.health = 0.0;
            self.state = EnemyState::Dying {
                remaining: self.death_duration,
            };
            return true;
        }
        false
    }

    /// Advance the death countdown.
    pub fn tick(&mut self, dt: f32) {
        if let EnemyState::Dying { remaining } = self.state {
            let remaining = remaining - dt;
            self.state = if remaining <= 0.0 {
                EnemyState::Dead
            } else {
                EnemyState::Dying { remaining }
            };
        }
    }

    /// Size factor for rendering: 1 while alive, linear to 0 while dying.
    pub fn shrink(&self) -> f32 {
        match self.state {
            EnemyState::Alive => 1.0,
            EnemyState::Dying { remaining } => (remaining / self.death_duration).clamp(0.0, 1.0),
            EnemyState::Dead => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecorationKind {
    Tall,
    Short,
}

impl DecorationKind {
    pub fn sprite_class(self) -> SpriteClass {
        match self {
            DecorationKind::Tall => SpriteClass::Tall,
            DecorationKind::Short => SpriteClass::Short,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decoration {
    pub pos: [f32; 2],
    pub kind: DecorationKind,
}
