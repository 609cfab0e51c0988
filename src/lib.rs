//! Creature AI core for a dinosaur park sandbox, driven by a small hecs host.

pub mod app;
pub mod behavior;
pub mod config;
pub mod creature;
pub mod debug;
pub mod ecs;
pub mod error;
pub mod perception;
pub mod spatial;
pub mod steering;
pub mod vector;
