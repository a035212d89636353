//! Default dimensions and tuning constants.

use crate::geom::Size;

/// Room size used when a config does not name one
pub const DEFAULT_ROOM: Size = Size::new(6, 4);

/// Tunnel size used when a config does not name one.
///
/// Width is the breadth across the direction of travel, height the length
/// along it.
pub const DEFAULT_TUNNEL: Size = Size::new(2, 3);

/// Most sub-chains a single branch slot can fan out into
pub const MAX_BRANCHES: usize = 3;

/// Seed used when the caller does not supply one
pub const DEFAULT_SEED: &str = "roomchain";
