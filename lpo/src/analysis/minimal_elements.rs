use std::collections::{BTreeSet, HashSet};

use fixedbitset::FixedBitSet;

use super::incidence_matrix::IncidenceMatrix;
use crate::core::lpo::{EventID, LPO};

/// Events that are not the target of any generating arc (the roots of the order)
///
/// Only the generating relation is considered, so the result is the same before and after the
/// closure was computed.
pub fn minimal_elements(lpo: &LPO) -> BTreeSet<EventID> {
    let targets: HashSet<&EventID> = lpo.generating_arcs().map(|arc| &arc.target).collect();
    lpo.event_ids()
        .filter(|id| !targets.contains(id))
        .cloned()
        .collect()
}

/// Events that are not the source of any generating arc
pub fn maximal_elements(lpo: &LPO) -> BTreeSet<EventID> {
    let sources: HashSet<&EventID> = lpo.generating_arcs().map(|arc| &arc.source).collect();
    lpo.event_ids()
        .filter(|id| !sources.contains(id))
        .cloned()
        .collect()
}

/// Indices of all columns of `matrix` without any set cell (in ascending order)
pub fn minimal_elements_of(matrix: &IncidenceMatrix) -> Vec<usize> {
    let mut has_predecessor = FixedBitSet::with_capacity(matrix.len());
    for i in 0..matrix.len() {
        has_predecessor.union_with(matrix.row(i));
    }
    has_predecessor.toggle_range(..);
    has_predecessor.ones().collect()
}
