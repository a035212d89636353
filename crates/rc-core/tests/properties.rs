//! Property tests over random seeds and chain shapes

use proptest::prelude::*;

use rc_core::geom::Size;
use rc_core::picker::{NodeConfig, NodeKind};
use rc_core::{GeneratorConfig, generate};

fn size() -> impl Strategy<Value = Size> {
    (1..5i32, 1..5i32).prop_map(|(w, h)| Size::new(w, h))
}

fn linear(max_count: u32) -> impl Strategy<Value = NodeConfig> {
    prop_oneof![
        (size(), 1..max_count).prop_map(|(room, count)| NodeConfig::simple(room, count)),
        (size(), size(), 1..max_count).prop_map(|(room, tunnel, count)| NodeConfig::tunnel(room, tunnel, count)),
    ]
}

/// Branch room at least as wide as its tunnels, so any two exit tunnels on
/// adjacent sides stay clear of each other
fn branch() -> impl Strategy<Value = NodeConfig> {
    let room = (3..6i32, 3..6i32).prop_map(|(w, h)| Size::new(w, h));
    let tunnel = (1..4i32, 1..4i32).prop_map(|(breadth, length)| Size::new(breadth, length));
    (room, tunnel, prop::collection::vec(linear(4), 1..4))
        .prop_map(|(room, tunnel, subs)| NodeConfig::branch(room, tunnel, subs))
}

fn chain() -> impl Strategy<Value = NodeConfig> {
    prop_oneof![3 => linear(12), 1 => branch()]
}

fn total(chain: &NodeConfig) -> usize {
    let own = match &chain.kind {
        NodeKind::Branch { branches, .. } => 1 + branches.iter().map(total).sum::<usize>(),
        _ => chain.count as usize,
    };
    own + chain.followed_by.as_deref().map_or(0, total)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn generation_is_deterministic(seed in "[a-z0-9]{1,8}", chain in chain()) {
        let config = GeneratorConfig { seed, chain, ..GeneratorConfig::default() };
        let first = generate(&config).unwrap();
        let second = generate(&config).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn layouts_never_overlap(seed in "[a-z0-9]{1,8}", head in linear(12), tail in chain()) {
        let chain = head.then(tail);
        let expected = total(&chain);
        let config = GeneratorConfig { seed, chain, ..GeneratorConfig::default() };
        let layout = generate(&config).unwrap();
        prop_assert_eq!(layout.len(), expected);
        prop_assert!(layout.overlapping_pairs().is_empty());
        for (id, record) in &layout.records {
            let room = record.room().unwrap();
            prop_assert!(room.width > 0 && room.height > 0);
            for exit in &record.exits {
                let dest = exit.dest.unwrap();
                prop_assert!(dest > *id);
                let next = &layout.records[&dest];
                prop_assert!(next.entrances.iter().any(|e| e.dest == Some(*id)));
            }
            if record.pending_exits.is_some() {
                prop_assert_eq!(record.branch_done, Some(true));
            }
        }
    }
}
