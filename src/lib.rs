//! Grid-based first-person shooter on a 2.5D raycasting renderer.

pub mod assets;
pub mod audio;
pub mod camera;
pub mod caster;
pub mod config;
pub mod entities;
pub mod floor;
pub mod game;
pub mod input;
pub mod present;
pub mod renderer;
pub mod session;
pub mod sim;
pub mod sprites;
pub mod weapons;
pub mod world;
