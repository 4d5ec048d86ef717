use std::collections::{hash_map::Entry, HashMap};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::incidence_matrix::IncidenceMatrix;
use super::minimal_elements::minimal_elements_of;
use crate::core::lpo::{Arc, LPOError, LPO};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Algorithm used to compute the reachability matrix
pub enum ClosureStrategy {
    /// Warshall's triple loop over bitset rows
    #[default]
    Warshall,
    /// Depth-first propagation of successor sets, starting at the minimal elements
    Propagation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Options for [`transitive_closure_with`]
pub struct ClosureOptions {
    /// Algorithm used to compute the reachability matrix
    pub strategy: ClosureStrategy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Summary of the changes [`transitive_closure`] made to the arcs of an [`LPO`]
pub struct ClosureReport {
    /// Arcs that were kept (one per pair of the closure)
    pub retained: usize,
    /// Derived arcs that were added
    pub added: usize,
    /// Arcs that were dropped (duplicates or pairs outside of the closure)
    pub removed: usize,
}

impl ClosureReport {
    /// Number of arcs after the closure was applied
    pub fn arc_count(&self) -> usize {
        self.retained + self.added
    }
}

fn cycle_at(matrix: &IncidenceMatrix, i: usize) -> LPOError {
    LPOError::Cycle {
        event: matrix.event_ids()[i].clone(),
    }
}

fn warshall(generating: &IncidenceMatrix) -> Result<IncidenceMatrix, LPOError> {
    let mut closure = generating.clone();
    let n = closure.len();
    for k in 0..n {
        let row_k = closure.row(k).clone();
        for i in 0..n {
            if closure.get(i, k) {
                closure.row_mut(i).union_with(&row_k);
            }
        }
    }
    // An event reaches itself iff it lies on a cycle
    match (0..n).find(|&i| closure.get(i, i)) {
        Some(i) => Err(cycle_at(&closure, i)),
        None => Ok(closure),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    OnStack,
    Done,
}

fn propagation(generating: &IncidenceMatrix) -> Result<IncidenceMatrix, LPOError> {
    let n = generating.len();
    let mut closure = generating.clone();
    let mut state = vec![VisitState::Unvisited; n];

    // Roots first; the remaining start nodes only matter if some event is not reachable from a
    // root, which implies a cycle.
    let starts = minimal_elements_of(generating).into_iter().chain(0..n);
    for start in starts {
        if state[start] != VisitState::Unvisited {
            continue;
        }
        state[start] = VisitState::OnStack;
        let mut stack: Vec<(usize, std::vec::IntoIter<usize>)> = vec![(
            start,
            generating.successors(start).collect::<Vec<_>>().into_iter(),
        )];
        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            match frame.1.next() {
                Some(next) => match state[next] {
                    VisitState::Unvisited => {
                        state[next] = VisitState::OnStack;
                        stack.push((
                            next,
                            generating.successors(next).collect::<Vec<_>>().into_iter(),
                        ));
                    }
                    VisitState::OnStack => return Err(cycle_at(generating, next)),
                    VisitState::Done => {}
                },
                None => {
                    stack.pop();
                    // All successors are done: their rows hold everything they reach
                    let successors: Vec<usize> = generating.successors(node).collect();
                    for successor in successors {
                        let reached = closure.row(successor).clone();
                        closure.row_mut(node).union_with(&reached);
                    }
                    state[node] = VisitState::Done;
                }
            }
        }
    }
    Ok(closure)
}

/// Compute the reachability matrix of a generating incidence matrix
///
/// Cell (i, j) of the result is true iff j is reachable from i via one or more generating arcs.
/// Fails with [`LPOError::Cycle`] if some event reaches itself (including self-loops).
pub fn closure_matrix(
    generating: &IncidenceMatrix,
    strategy: ClosureStrategy,
) -> Result<IncidenceMatrix, LPOError> {
    match strategy {
        ClosureStrategy::Warshall => warshall(generating),
        ClosureStrategy::Propagation => propagation(generating),
    }
}

/// Replace the arcs of `lpo` by the transitive closure of its generating relation
///
/// See [`transitive_closure_with`]; uses the default [`ClosureOptions`].
pub fn transitive_closure(lpo: &mut LPO) -> Result<ClosureReport, LPOError> {
    transitive_closure_with(lpo, ClosureOptions::default())
}

/// Replace the arcs of `lpo` by the transitive closure of its generating relation
///
/// Afterwards there is exactly one arc per pair (u, v) with v reachable from u; its `generating`
/// flag is true iff the pair is part of the generating relation. Existing arcs are kept (preferring
/// one flagged as generating if a pair occurs several times), missing pairs are added as derived
/// arcs with sequential ids, all other arcs are removed. All `skeleton` flags are reset.
///
/// If the generating relation contains a cycle, [`LPOError::Cycle`] is returned and `lpo` is left
/// unchanged.
#[instrument(skip_all, fields(lpo = %lpo.name, events = lpo.event_count()))]
pub fn transitive_closure_with(
    lpo: &mut LPO,
    options: ClosureOptions,
) -> Result<ClosureReport, LPOError> {
    let generating = IncidenceMatrix::from_generating_arcs(lpo);
    let closure = closure_matrix(&generating, options.strategy)?;

    let mut chosen: HashMap<(usize, usize), usize> = HashMap::new();
    for (position, arc) in lpo.arcs().iter().enumerate() {
        let (Some(i), Some(j)) = (closure.index_of(&arc.source), closure.index_of(&arc.target))
        else {
            continue;
        };
        if i == j || !closure.get(i, j) {
            continue;
        }
        match chosen.entry((i, j)) {
            Entry::Vacant(entry) => {
                entry.insert(position);
            }
            Entry::Occupied(mut entry) => {
                if arc.generating && !lpo.arcs()[*entry.get()].generating {
                    entry.insert(position);
                }
            }
        }
    }

    let kept: Vec<(usize, (usize, usize))> = chosen
        .iter()
        .map(|(&pair, &position)| (position, pair))
        .sorted_unstable()
        .collect();

    let before = lpo.arcs().len();
    let mut arcs: Vec<Arc> = kept
        .iter()
        .map(|&(position, (i, j))| {
            let mut arc = lpo.arcs()[position].clone();
            arc.generating = generating.get(i, j);
            arc.skeleton = false;
            arc
        })
        .collect();
    let retained = arcs.len();

    for (i, j) in closure.pairs() {
        if i == j || chosen.contains_key(&(i, j)) {
            continue;
        }
        arcs.push(Arc::new(
            lpo.next_arc_id(),
            closure.event_ids()[i].clone(),
            closure.event_ids()[j].clone(),
            generating.get(i, j),
        ));
    }

    let report = ClosureReport {
        retained,
        added: arcs.len() - retained,
        removed: before - retained,
    };
    lpo.replace_arcs(arcs);
    debug!(
        retained = report.retained,
        added = report.added,
        removed = report.removed,
        "transitive closure applied"
    );
    Ok(report)
}

/// Check whether the arcs of `lpo` are transitively closed
///
/// True iff for all arcs (a, b) and (b, c) there also is an arc (a, c).
pub fn is_transitively_closed(lpo: &LPO) -> bool {
    let matrix = IncidenceMatrix::from_all_arcs(lpo);
    let closed = matrix
        .pairs()
        .all(|(i, j)| matrix.row(j).is_subset(matrix.row(i)));
    closed
}
