//! Property tests for the closure and skeleton engine on random acyclic orders.

use std::collections::BTreeSet;

use lpo::analysis::incidence_matrix::IncidenceMatrix;
use lpo::analysis::minimal_elements::minimal_elements;
use lpo::analysis::skeleton::{extract_skeleton, transitive_reduction};
use lpo::analysis::transitive_closure::{
    closure_matrix, is_transitively_closed, transitive_closure, transitive_closure_with,
    ClosureOptions, ClosureStrategy,
};
use lpo::{Event, LPOError, LPO};
use proptest::prelude::*;

fn event_name(i: usize) -> String {
    format!("e{i:02}")
}

/// Random DAG: arcs only go from lower to higher index
fn arb_dag() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..10).prop_flat_map(|n| {
        let candidates: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        let len = candidates.len();
        (
            Just(n),
            proptest::collection::vec(any::<bool>(), len).prop_map(move |take| {
                candidates
                    .iter()
                    .zip(take)
                    .filter(|(_, keep)| *keep)
                    .map(|(pair, _)| *pair)
                    .collect::<Vec<_>>()
            }),
        )
    })
}

fn build(n: usize, arcs: &[(usize, usize)]) -> LPO {
    let mut lpo = LPO::new("random");
    for i in 0..n {
        lpo.add_event(Event::new(event_name(i), format!("label {i}"))).unwrap();
    }
    for (from, to) in arcs {
        lpo.add_generating_arc(event_name(*from), event_name(*to)).unwrap();
    }
    lpo
}

fn pairs<'a>(arcs: impl Iterator<Item = &'a lpo::Arc>) -> BTreeSet<(String, String)> {
    arcs.map(|arc| (arc.source.to_string(), arc.target.to_string()))
        .collect()
}

/// Covering relation of the order generated by `arcs`
fn covering_relation(n: usize, arcs: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let generating = IncidenceMatrix::from_generating_arcs(&build(n, arcs));
    let closure = closure_matrix(&generating, ClosureStrategy::Warshall).unwrap();
    transitive_reduction(&closure).pairs().collect()
}

proptest! {
    #[test]
    fn closure_is_idempotent((n, arcs) in arb_dag()) {
        let mut lpo = build(n, &arcs);
        transitive_closure(&mut lpo).unwrap();
        let once = lpo.clone();
        let report = transitive_closure(&mut lpo).unwrap();
        prop_assert_eq!(report.added, 0);
        prop_assert_eq!(report.removed, 0);
        prop_assert_eq!(lpo, once);
    }

    #[test]
    fn closure_is_transitive((n, arcs) in arb_dag()) {
        let mut lpo = build(n, &arcs);
        transitive_closure(&mut lpo).unwrap();
        prop_assert!(is_transitively_closed(&lpo));

        let closure = pairs(lpo.arcs().iter());
        for (a, b) in &closure {
            for (b2, c) in &closure {
                if b == b2 {
                    prop_assert!(closure.contains(&(a.clone(), c.clone())));
                }
            }
        }
        // one arc per pair, never reflexive
        prop_assert_eq!(closure.len(), lpo.arcs().len());
        prop_assert!(lpo.arcs().iter().all(|arc| arc.source != arc.target));
    }

    #[test]
    fn generating_flags_survive_closure((n, arcs) in arb_dag()) {
        let mut lpo = build(n, &arcs);
        let generating = pairs(lpo.generating_arcs());
        transitive_closure(&mut lpo).unwrap();
        prop_assert_eq!(pairs(lpo.generating_arcs()), generating);
        for (from, to) in &arcs {
            prop_assert!(lpo.precedes(&event_name(*from).into(), &event_name(*to).into()));
        }
    }

    #[test]
    fn minimal_elements_unaffected_by_closure((n, arcs) in arb_dag()) {
        let mut lpo = build(n, &arcs);
        let before = minimal_elements(&lpo);
        let expected: BTreeSet<String> = (0..n)
            .filter(|i| !arcs.iter().any(|(_, to)| to == i))
            .map(event_name)
            .collect();
        let found: BTreeSet<String> = before.iter().map(|id| id.to_string()).collect();
        prop_assert_eq!(found, expected);

        transitive_closure(&mut lpo).unwrap();
        prop_assert_eq!(minimal_elements(&lpo), before);
    }

    #[test]
    fn skeleton_of_closure_is_covering_relation((n, arcs) in arb_dag()) {
        let covering = covering_relation(n, &arcs);
        let mut lpo = build(n, &covering);
        transitive_closure(&mut lpo).unwrap();
        extract_skeleton(&mut lpo);

        let expected: BTreeSet<(String, String)> = covering
            .iter()
            .map(|(from, to)| (event_name(*from), event_name(*to)))
            .collect();
        prop_assert_eq!(pairs(lpo.skeleton_arcs()), expected);
    }

    #[test]
    fn skeleton_regenerates_closure((n, arcs) in arb_dag()) {
        let mut lpo = build(n, &arcs);
        transitive_closure(&mut lpo).unwrap();
        extract_skeleton(&mut lpo);

        let mut from_skeleton = build(0, &[]);
        for event in lpo.events() {
            from_skeleton.add_event(event.clone()).unwrap();
        }
        for arc in lpo.skeleton_arcs() {
            from_skeleton.add_generating_arc(arc.source.clone(), arc.target.clone()).unwrap();
        }
        transitive_closure(&mut from_skeleton).unwrap();
        prop_assert_eq!(pairs(from_skeleton.arcs().iter()), pairs(lpo.arcs().iter()));
    }

    #[test]
    fn strategies_agree((n, arcs) in arb_dag()) {
        let mut warshall = build(n, &arcs);
        let mut propagation = warshall.clone();
        let options = |strategy| ClosureOptions { strategy };
        transitive_closure_with(&mut warshall, options(ClosureStrategy::Warshall)).unwrap();
        transitive_closure_with(&mut propagation, options(ClosureStrategy::Propagation)).unwrap();
        prop_assert_eq!(warshall, propagation);
    }

    #[test]
    fn back_arc_creates_cycle((n, arcs) in arb_dag(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!arcs.is_empty());
        let (from, to) = arcs[pick.index(arcs.len())];
        let mut lpo = build(n, &arcs);
        lpo.add_generating_arc(event_name(to), event_name(from)).unwrap();
        let before = lpo.clone();
        for strategy in [ClosureStrategy::Warshall, ClosureStrategy::Propagation] {
            let result = transitive_closure_with(&mut lpo, ClosureOptions { strategy });
            prop_assert!(matches!(result, Err(LPOError::Cycle { .. })), "{:?}", result);
            prop_assert_eq!(&lpo, &before);
        }
    }
}
