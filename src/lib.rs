//! Soccer Party Server - two-player phone-controlled soccer
//!
//! One device runs the authoritative match simulation (the host) while two
//! phone browsers act as motion controllers. This crate provides both halves
//! of the real-time path:
//! - the relay server (`relay` binary): rooms, slot binding, and message
//!   routing between controllers and their host
//! - the host engine (`host` binary): fixed-step physics for two players and
//!   a ball, scoring, and the loop driver that couples it to the relay

pub mod app;
pub mod config;
pub mod game;
pub mod host;
pub mod http;
pub mod room;
pub mod util;
pub mod ws;
