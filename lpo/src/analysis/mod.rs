//! Closure and skeleton computation on [`LPO`]s
//!
//! The pipeline is: [`incidence_matrix`] → [`minimal_elements`] / [`transitive_closure`] →
//! [`skeleton`]. [`derive_views`] runs the mutating steps in order.
use tracing::instrument;

use crate::core::lpo::{LPOError, LPO};

/// Dense boolean incidence/reachability matrices
pub mod incidence_matrix;
/// Roots (and sinks) of the generating relation
pub mod minimal_elements;
/// Skeleton (transitive reduction) extraction
pub mod skeleton;
/// Transitive closure of the generating relation
pub mod transitive_closure;

use skeleton::{extract_skeleton, SkeletonReport};
use transitive_closure::{transitive_closure, ClosureReport};

/// Compute the transitive closure of `lpo` and flag its skeleton arcs
///
/// Fails (leaving `lpo` unchanged) if the generating relation contains a cycle.
#[instrument(skip_all, fields(lpo = %lpo.name))]
pub fn derive_views(lpo: &mut LPO) -> Result<(ClosureReport, SkeletonReport), LPOError> {
    let closure = transitive_closure(lpo)?;
    let skeleton = extract_skeleton(lpo);
    Ok((closure, skeleton))
}
