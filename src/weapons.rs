use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::config::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reserve {
    Infinite,
    Finite(u32),
}

impl Reserve {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Reserve::Finite(0)
    }

    /// Remove up to `wanted` rounds, returning how many were taken.
    fn take(&mut self, wanted: u32) -> u32 {
        match self {
            Reserve::Infinite => wanted,
            Reserve::Finite(n) => {
                let taken = wanted.min(*n);
                *n -= taken;
                taken
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeaponSpec {
    pub name: String,
    pub capacity: u32,
    pub reserve: Reserve,
    /// Seconds.
    pub reload_time: f32,
    pub damage: f32,
}

#[derive(Debug, Error, PartialEq)]
pub enum WeaponParseError {
    #[error("expected NAME:CAPACITY:RESERVE:RELOAD:DAMAGE, got {0} fields")]
    FieldCount(usize),
    #[error("weapon name is empty")]
    EmptyName,
    #[error("bad {field} value `{value}`")]
    BadNumber { field: &'static str, value: String },
}

/// Parses `name:capacity:reserve:reload:damage`; reserve is a count or `inf`.
impl FromStr for WeaponSpec {
    type Err = WeaponParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').map(str::trim).collect();
        let [name, capacity, reserve, reload, damage] = fields[..] else {
            return Err(WeaponParseError::FieldCount(fields.len()));
        };
        if name.is_empty() {
            return Err(WeaponParseError::EmptyName);
        }

        fn number<T: FromStr>(field: &'static str, value: &str) -> Result<T, WeaponParseError> {
            value.parse().map_err(|_| WeaponParseError::BadNumber {
                field,
                value: value.to_owned(),
            })
        }
        let reserve = match reserve {
            "inf" | "infinite" => Reserve::Infinite,
            n => Reserve::Finite(number("reserve", n)?),
        };

        Ok(WeaponSpec {
            name: name.to_owned(),
            capacity: number("capacity", capacity)?,
            reserve,
            reload_time: number("reload", reload)?,
            damage: number("damage", damage)?,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FireResult {
    Fired { damage: f32 },
    /// Trigger pulled during a reload.
    Busy,
    /// Magazine was empty; a reload was started instead.
    Reloading,
    /// Magazine and reserve are both empty.
    Dry,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Weapon {
    spec: WeaponSpec,
    magazine: u32,
    reserve: Reserve,
    /// Seconds left on a pending reload.
    reload: Option<f32>,
}

impl Weapon {
    pub fn new(spec: WeaponSpec) -> Self {
        Self {
            magazine: spec.capacity,
            reserve: spec.reserve,
            reload: None,
            spec,
        }
    }

    #[inline]
    pub fn spec(&self) -> &WeaponSpec {
        &self.spec
    }

    #[inline]
    pub fn magazine(&self) -> u32 {
        self.magazine
    }

    #[inline]
    pub fn reserve(&self) -> Reserve {
        self.reserve
    }

    #[inline]
    pub fn is_reloading(&self) -> bool {
        self.reload.is_some()
    }

    pub fn try_fire(&mut self) -> FireResult {
        if self.is_reloading() {
            return FireResult::Busy;
        }
        if self.magazine == 0 {
            return if self.request_reload() {
                FireResult::Reloading
            } else {
                FireResult::Dry
            };
        }
        self.magazine -= 1;
        FireResult::Fired {
            damage: self.spec.damage,
        }
    }

    /// Schedule a reload. No-op (returns `false`) while already reloading,
    /// with a full magazine, or with nothing in reserve.
    pub fn request_reload(&mut self) -> bool {
        if self.is_reloading() || self.magazine >= self.spec.capacity || self.reserve.is_empty() {
            return false;
        }
        self.reload = Some(self.spec.reload_time);
        debug!(weapon = %self.spec.name, "reload started");
        true
    }

    pub fn cancel_reload(&mut self) {
        if self.reload.take().is_some() {
            debug!(weapon = %self.spec.name, "reload cancelled");
        }
    }

    /// Advance a pending reload. Returns `true` on the frame it completes.
    pub fn tick(&mut self, dt: f32) -> bool {
        let Some(remaining) = self.reload else {
            return false;
        };
        let remaining = remaining - dt;
        if remaining > 0.0 {
            self.reload = Some(remaining);
            return false;
        }
        self.reload = None;
        let wanted = self.spec.capacity - self.magazine;
        self.magazine += self.reserve.take(wanted);
        debug!(weapon = %self.spec.name, magazine = self.magazine, "reload finished");
        true
    }
}

/// The fixed set of weapons carried, exactly one of them selected.
#[derive(Clone, Debug)]
pub struct Armory {
    weapons: Vec<Weapon>,
    selected: usize,
}

impl Armory {
    pub fn new(specs: &[WeaponSpec]) -> Result<Self, ConfigError> {
        if specs.is_empty() {
            return Err(ConfigError::NoWeapons);
        }
        Ok(Self {
            weapons: specs.iter().cloned().map(Weapon::new).collect(),
            selected: 0,
        })
    }

    /// Full magazines and reserves again, first slot in hand.
    pub fn restock(&mut self) {
        for w in &mut self.weapons {
            *w = Weapon::new(w.spec.clone());
        }
        self.selected = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    #[inline]
    pub fn selected_index(&self) -> usize {
        self.selected
    }

    #[inline]
    pub fn current(&self) -> &Weapon {
        &self.weapons[self.selected]
    }

    #[inline]
    pub fn current_mut(&mut self) -> &mut Weapon {
        &mut self.weapons[self.selected]
    }

    /// Switch weapons, cancelling a reload in progress on the old one.
    /// Returns `false` for an unknown slot or the one already in hand.
    pub fn select(&mut self, slot: usize) -> bool {
        if slot >= self.weapons.len() || slot == self.selected {
            return false;
        }
        self.weapons[self.selected].cancel_reload();
        self.selected = slot;
        debug!(weapon = %self.current().spec.name, "weapon selected");
        true
    }

    pub fn tick(&mut self, dt: f32) -> bool {
        self.current_mut().tick(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rifle(reserve: Reserve) -> Weapon {
        Weapon::new(WeaponSpec {
            name: "Rifle".into(),
            capacity: 10,
            reserve,
            reload_time: 1.0,
            damage: 20.0,
        })
    }

    #[test]
    fn weapon_spec_parses_from_cli_form() {
        let spec: WeaponSpec = "Shotgun:6:24:1.5:55".parse().unwrap();
        assert_eq!(spec.name, "Shotgun");
        assert_eq!(spec.capacity, 6);
        assert_eq!(spec.reserve, Reserve::Finite(24));
        assert_eq!(spec.reload_time, 1.5);
        assert_eq!(spec.damage, 55.0);

        let spec: WeaponSpec = "Pistol:12:inf:0.9:25".parse().unwrap();
        assert_eq!(spec.reserve, Reserve::Infinite);
    }

    #[test]
    fn malformed_weapon_specs_are_rejected() {
        assert_eq!(
            "Pistol:12:inf".parse::<WeaponSpec>(),
            Err(WeaponParseError::FieldCount(3))
        );
        assert_eq!(
            ":12:inf:0.9:25".parse::<WeaponSpec>(),
            Err(WeaponParseError::EmptyName)
        );
        assert_eq!(
            "Pistol:twelve:inf:0.9:25".parse::<WeaponSpec>(),
            Err(WeaponParseError::BadNumber {
                field: "capacity",
                value: "twelve".into()
            })
        );
        assert!(matches!(
            "Pistol:12:-3:0.9:25".parse::<WeaponSpec>(),
            Err(WeaponParseError::BadNumber { field: "reserve", .. })
        ));
    }

    fn empty_mag(w: &mut Weapon, shots: u32) {
        for _ in 0..shots {
            assert!(matches!(w.try_fire(), FireResult::Fired { .. }));
        }
    }

    #[test]
    fn fires_until_empty_then_auto_reloads() {
        let mut w = rifle(Reserve::Finite(25));
        empty_mag(&mut w, 10);
        assert_eq!(w.try_fire(), FireResult::Reloading);
        assert_eq!(w.try_fire(), FireResult::Busy);
        assert!(w.tick(1.0));
        assert_eq!(w.magazine(), 10);
        assert_eq!(w.reserve(), Reserve::Finite(15));
    }

    #[test]
    fn double_reload_request_refills_once() {
        let mut w = rifle(Reserve::Finite(25));
        empty_mag(&mut w, 4);
        assert!(w.request_reload());
        assert!(!w.request_reload());
        assert!(!w.tick(0.5));
        assert!(w.tick(0.6));
        assert!(!w.tick(5.0));
        assert_eq!(w.magazine(), 10);
        assert_eq!(w.reserve(), Reserve::Finite(21));
    }

    #[test]
    fn reload_is_bounded_by_reserve() {
        let mut w = rifle(Reserve::Finite(3));
        empty_mag(&mut w, 10);
        w.request_reload();
        w.tick(1.0);
        assert_eq!(w.magazine(), 3);
        assert_eq!(w.reserve(), Reserve::Finite(0));
        empty_mag(&mut w, 3);
        assert_eq!(w.try_fire(), FireResult::Dry);
    }

    #[test]
    fn full_magazine_does_not_reload() {
        let mut w = rifle(Reserve::Infinite);
        assert!(!w.request_reload());
        assert!(!w.is_reloading());
    }

    #[test]
    fn infinite_reserve_never_runs_out() {
        let mut w = rifle(Reserve::Infinite);
        for _ in 0..5 {
            empty_mag(&mut w, 10);
            assert!(w.request_reload());
            assert!(w.tick(1.0));
        }
        assert_eq!(w.reserve(), Reserve::Infinite);
    }

    #[test]
    fn switching_cancels_pending_reload() {
        let specs = crate::config::default_weapons();
        let mut armory = Armory::new(&specs).unwrap();
        empty_mag(armory.current_mut(), 3);
        assert!(armory.current_mut().request_reload());
        assert!(armory.select(1));
        assert!(armory.select(0));
        assert!(!armory.current().is_reloading());
        assert_eq!(armory.current().magazine(), specs[0].capacity - 3);
        assert!(!armory.select(0));
        assert!(!armory.select(99));
    }

    #[test]
    fn empty_table_is_rejected() {
        assert_eq!(Armory::new(&[]).unwrap_err(), ConfigError::NoWeapons);
    }

    #[test]
    fn restock_refills_everything() {
        let specs = crate::config::default_weapons();
        let mut armory = Armory::new(&specs).unwrap();
        armory.select(1);
        empty_mag(armory.current_mut(), 4);
        armory.restock();
        assert_eq!(armory.selected_index(), 0);
        armory.select(1);
        assert_eq!(armory.current().magazine(), specs[1].capacity);
        assert_eq!(armory.current().reserve(), specs[1].reserve);
    }
}
