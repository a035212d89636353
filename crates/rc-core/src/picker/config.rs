//! Chain configuration and its validated, flattened form.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ROOM, DEFAULT_TUNNEL, MAX_BRANCHES};
use crate::error::ConfigError;
use crate::geom::{Dir, Size};

/// Index of a node in a [`Plan`], assigned in pre-order
pub type NodeId = u32;

/// Which arrangement a node places, with its sizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    Simple {
        #[serde(default = "default_room")]
        room: Size,
    },
    Tunnel {
        #[serde(default = "default_room")]
        room: Size,
        #[serde(default = "default_tunnel")]
        tunnel: Size,
    },
    Branch {
        #[serde(default = "default_room")]
        room: Size,
        #[serde(default = "default_tunnel")]
        tunnel: Size,
        branches: Vec<NodeConfig>,
    },
}

/// One node of the chain description as the user writes it.
///
/// ```json
/// { "type": "simple", "count": 3, "followed_by": { "type": "tunnel" } }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Consecutive slots this node fills
    #[serde(default = "default_count")]
    pub count: u32,
    /// Force every exit of this node's rooms this way
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Dir>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followed_by: Option<Box<NodeConfig>>,
}

fn default_room() -> Size {
    DEFAULT_ROOM
}

fn default_tunnel() -> Size {
    DEFAULT_TUNNEL
}

fn default_count() -> u32 {
    1
}

impl NodeConfig {
    fn of(kind: NodeKind, count: u32) -> Self {
        Self {
            kind,
            count,
            direction: None,
            followed_by: None,
        }
    }

    pub fn simple(room: Size, count: u32) -> Self {
        Self::of(NodeKind::Simple { room }, count)
    }

    pub fn tunnel(room: Size, tunnel: Size, count: u32) -> Self {
        Self::of(NodeKind::Tunnel { room, tunnel }, count)
    }

    pub fn branch(room: Size, tunnel: Size, branches: Vec<NodeConfig>) -> Self {
        Self::of(
            NodeKind::Branch {
                room,
                tunnel,
                branches,
            },
            1,
        )
    }

    /// Force exits toward `dir`
    pub fn toward(mut self, dir: Dir) -> Self {
        self.direction = Some(dir);
        self
    }

    /// Continue with `next` once this node's slots are placed
    pub fn then(mut self, next: NodeConfig) -> Self {
        self.followed_by = Some(Box::new(next));
        self
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self::simple(DEFAULT_ROOM, 8)
    }
}

/// Placement shape of a validated node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Simple { room: Size },
    Tunnel { room: Size, tunnel: Size },
    Branch { room: Size, tunnel: Size, heads: Vec<NodeId> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanNode {
    pub id: NodeId,
    pub shape: Shape,
    pub count: u32,
    pub direction: Option<Dir>,
    pub followed_by: Option<NodeId>,
}

/// A validated chain configuration with nodes addressable by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    nodes: Vec<PlanNode>,
}

impl Plan {
    /// Validate and flatten `root`; node 0 is the root
    pub fn from_config(root: &NodeConfig) -> Result<Self, ConfigError> {
        let mut slots = Vec::new();
        flatten(root, &mut slots)?;
        let nodes = slots.into_iter().flatten().collect();
        Ok(Self { nodes })
    }

    /// Panics on an id this plan never assigned
    pub fn node(&self, id: NodeId) -> &PlanNode {
        match self.nodes.get(id as usize) {
            Some(node) => node,
            None => panic!("plan has no node {id}"),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &PlanNode> {
        self.nodes.iter()
    }
}

fn flatten(config: &NodeConfig, slots: &mut Vec<Option<PlanNode>>) -> Result<NodeId, ConfigError> {
    let id = slots.len() as NodeId;
    slots.push(None);

    if config.count == 0 {
        return Err(ConfigError::ZeroCount { node: id });
    }

    let shape = match &config.kind {
        NodeKind::Simple { room } => {
            check_size(id, "room", *room)?;
            Shape::Simple { room: *room }
        }
        NodeKind::Tunnel { room, tunnel } => {
            check_size(id, "room", *room)?;
            check_size(id, "tunnel", *tunnel)?;
            Shape::Tunnel {
                room: *room,
                tunnel: *tunnel,
            }
        }
        NodeKind::Branch {
            room,
            tunnel,
            branches,
        } => {
            check_size(id, "room", *room)?;
            check_size(id, "tunnel", *tunnel)?;
            if branches.is_empty() || branches.len() > MAX_BRANCHES {
                return Err(ConfigError::BranchCount {
                    node: id,
                    count: branches.len(),
                    max: MAX_BRANCHES,
                });
            }
            if config.count != 1 {
                return Err(ConfigError::BranchRepeat {
                    node: id,
                    count: config.count,
                });
            }
            if config.followed_by.is_some() {
                return Err(ConfigError::BranchFollowedBy { node: id });
            }
            let heads = branches
                .iter()
                .map(|sub| flatten(sub, slots))
                .collect::<Result<Vec<_>, _>>()?;
            Shape::Branch {
                room: *room,
                tunnel: *tunnel,
                heads,
            }
        }
    };

    let followed_by = match config.followed_by.as_deref() {
        Some(next) => Some(flatten(next, slots)?),
        None => None,
    };

    slots[id as usize] = Some(PlanNode {
        id,
        shape,
        count: config.count,
        direction: config.direction,
        followed_by,
    });
    Ok(id)
}

fn check_size(node: NodeId, what: &'static str, size: Size) -> Result<(), ConfigError> {
    if size.is_positive() {
        Ok(())
    } else {
        Err(ConfigError::EmptySize {
            node,
            what,
            width: size.width,
            height: size.height,
        })
    }
}
