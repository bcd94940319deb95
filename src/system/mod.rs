//! Core system components for motor control and mining
pub mod command;
pub mod commutation;
pub mod control;
pub mod event;
pub mod motor;
pub mod resources;
pub mod state;
