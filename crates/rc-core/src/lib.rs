//! rc-core: room-chain arrangement engine
//!
//! Places a chain of rectangular rooms joined by directional transfer points
//! so that no two rooms overlap. The search is an explicit-stack depth-first
//! backtracker ([`queue::BuildQueue`]) driven by pluggable placement
//! generators ([`arrange`]) which a config-driven [`picker::Picker`] stitches
//! into one long chain.
//!
//! All randomness flows through a single seeded [`GameRng`], so the same seed
//! and configuration always produce the same layout.

pub mod arrange;
pub mod geom;
pub mod layout;
pub mod picker;
pub mod queue;

mod ascii;
mod consts;
mod error;
mod rng;

pub use consts::*;
pub use error::{ConfigError, GenError, GeomError};
pub use layout::{GeneratorConfig, Layout, generate};
pub use rng::GameRng;
