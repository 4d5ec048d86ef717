use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::incidence_matrix::IncidenceMatrix;
use crate::core::lpo::LPO;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Result of [`extract_skeleton`]
pub struct SkeletonReport {
    /// Arcs flagged as skeleton arcs
    pub skeleton: usize,
    /// Arcs implied by a path over some intermediate event
    pub redundant: usize,
}

/// (u, v) is irredundant iff u ≠ v and no event w ∉ {u, v} has both (u, w) and (w, v) in the
/// closure
fn is_irredundant(
    closure: &IncidenceMatrix,
    columns: &IncidenceMatrix,
    u: usize,
    v: usize,
) -> bool {
    u != v
        && closure
            .row(u)
            .intersection(columns.row(v))
            .all(|w| w == u || w == v)
}

/// Transitive reduction (covering relation) of a closure matrix
///
/// `closure` must be transitively closed and acyclic; this is not checked.
pub fn transitive_reduction(closure: &IncidenceMatrix) -> IncidenceMatrix {
    let columns = closure.transpose();
    let mut reduced = closure.empty_like();
    for (u, v) in closure.pairs() {
        if is_irredundant(closure, &columns, u, v) {
            reduced.set(u, v, true);
        }
    }
    reduced
}

/// Flag the skeleton arcs of `lpo`
///
/// The arcs of `lpo` have to represent a transitive closure (e.g., after
/// [`transitive_closure`](super::transitive_closure::transitive_closure)); acyclicity is not
/// re-checked. Every arc is relabelled: `skeleton` is set iff there is no two-step path between
/// its source and target. No arcs are added or removed.
#[instrument(skip_all, fields(lpo = %lpo.name, arcs = lpo.arcs().len()))]
pub fn extract_skeleton(lpo: &mut LPO) -> SkeletonReport {
    let closure = IncidenceMatrix::from_all_arcs(lpo);
    let columns = closure.transpose();
    let mut report = SkeletonReport::default();
    for arc in lpo.arcs_mut() {
        arc.skeleton = match (closure.index_of(&arc.source), closure.index_of(&arc.target)) {
            (Some(u), Some(v)) => is_irredundant(&closure, &columns, u, v),
            _ => false,
        };
        if arc.skeleton {
            report.skeleton += 1;
        } else {
            report.redundant += 1;
        }
    }
    debug!(
        skeleton = report.skeleton,
        redundant = report.redundant,
        "skeleton extracted"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::transitive_closure::{closure_matrix, transitive_closure, ClosureStrategy};

    #[test]
    fn skeleton_of_abcd() {
        let mut lpo = crate::lpo!("abcd"; "a" => "b", "b" => "c", "d" => "c");
        transitive_closure(&mut lpo).unwrap();
        let report = extract_skeleton(&mut lpo);
        assert_eq!(
            report,
            SkeletonReport {
                skeleton: 3,
                redundant: 1
            }
        );
        for arc in lpo.arcs() {
            let redundant = arc.source.as_str() == "a" && arc.target.as_str() == "c";
            assert_eq!(arc.skeleton, !redundant, "{arc:?}");
        }
        assert_eq!(lpo.arcs().len(), 4);
    }

    #[test]
    fn redundant_generating_arc_is_not_skeleton() {
        // the user declared a -> c although it is implied by a -> b -> c
        let mut lpo = crate::lpo!("abc"; "a" => "b", "b" => "c", "a" => "c");
        transitive_closure(&mut lpo).unwrap();
        extract_skeleton(&mut lpo);
        let a_c = lpo
            .arcs()
            .iter()
            .find(|arc| arc.source.as_str() == "a" && arc.target.as_str() == "c")
            .unwrap();
        assert!(a_c.generating);
        assert!(!a_c.skeleton);
        assert_eq!(lpo.skeleton_arcs().count(), 2);
    }

    #[test]
    fn skeleton_arcs_need_not_start_at_minimal_elements() {
        let mut lpo = crate::lpo!("chain"; "a" => "b", "b" => "c", "c" => "d");
        transitive_closure(&mut lpo).unwrap();
        extract_skeleton(&mut lpo);
        let skeleton: Vec<(&str, &str)> = lpo
            .skeleton_arcs()
            .map(|arc| (arc.source.as_str(), arc.target.as_str()))
            .collect();
        assert_eq!(skeleton, vec![("a", "b"), ("b", "c"), ("c", "d")]);
        // a -> c and a -> d start at the minimal element but are redundant
        assert_eq!(lpo.arcs().len(), 6);
    }

    #[test]
    fn reduction_of_closure_matrix_is_generating_covering_relation() {
        let lpo = crate::lpo!("diamond"; "a" => "b", "a" => "c", "b" => "d", "c" => "d");
        let generating = IncidenceMatrix::from_generating_arcs(&lpo);
        let closure = closure_matrix(&generating, ClosureStrategy::Warshall).unwrap();
        assert_eq!(closure.count_ones(), 5);
        assert_eq!(transitive_reduction(&closure), generating);
    }

    #[test]
    fn skeleton_is_stable() {
        let mut lpo = crate::lpo!("abcd"; "a" => "b", "b" => "c", "d" => "c");
        transitive_closure(&mut lpo).unwrap();
        let first = extract_skeleton(&mut lpo);
        let flagged = lpo.clone();
        assert_eq!(extract_skeleton(&mut lpo), first);
        assert_eq!(lpo, flagged);
    }
}
