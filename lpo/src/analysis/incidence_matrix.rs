use std::collections::HashMap;

use fixedbitset::FixedBitSet;

use crate::core::lpo::{Arc, EventID, LPO};

///
/// Dense boolean adjacency matrix over the events of an [`LPO`]
///
/// Rows and columns are indexed by the position of an event in [`LPO::events`] at the time the
/// matrix was built. The matrix owns all of its data: it is a snapshot that is not affected by
/// later changes to the order.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceMatrix {
    event_ids: Vec<EventID>,
    index: HashMap<EventID, usize>,
    rows: Vec<FixedBitSet>,
}

impl IncidenceMatrix {
    /// All-false matrix over the given event ordering
    pub fn new(event_ids: Vec<EventID>) -> Self {
        let n = event_ids.len();
        let index = event_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self {
            event_ids,
            index,
            rows: vec![FixedBitSet::with_capacity(n); n],
        }
    }

    /// Cell (i, j) is true iff there is a generating arc from event i to event j
    pub fn from_generating_arcs(lpo: &LPO) -> Self {
        Self::from_arcs(lpo, |arc| arc.generating)
    }

    /// Cell (i, j) is true iff there is any arc from event i to event j
    ///
    /// After the closure was computed this is the closure matrix.
    pub fn from_all_arcs(lpo: &LPO) -> Self {
        Self::from_arcs(lpo, |_| true)
    }

    fn from_arcs(lpo: &LPO, include: impl Fn(&Arc) -> bool) -> Self {
        let mut matrix = Self::new(lpo.event_ids().cloned().collect());
        for arc in lpo.arcs().iter().filter(|arc| include(arc)) {
            if let (Some(i), Some(j)) =
                (matrix.index_of(&arc.source), matrix.index_of(&arc.target))
            {
                matrix.rows[i].insert(j);
            }
        }
        matrix
    }

    /// All-false matrix with the same event ordering
    pub fn empty_like(&self) -> Self {
        Self::new(self.event_ids.clone())
    }

    /// Number of events (rows/columns)
    pub fn len(&self) -> usize {
        self.event_ids.len()
    }

    /// True if the matrix has no rows
    pub fn is_empty(&self) -> bool {
        self.event_ids.is_empty()
    }

    /// Event ordering used to index this matrix
    pub fn event_ids(&self) -> &[EventID] {
        &self.event_ids
    }

    /// Row/column index of an event
    pub fn index_of(&self, id: &EventID) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Event at row/column `i`
    pub fn event_id(&self, i: usize) -> Option<&EventID> {
        self.event_ids.get(i)
    }

    /// Value of cell (i, j); false if out of range
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.rows.get(i).is_some_and(|row| row.contains(j))
    }

    /// Set cell (i, j)
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of range.
    pub fn set(&mut self, i: usize, j: usize, value: bool) {
        self.rows[i].set(j, value);
    }

    /// Row `i` as bitset of column indices
    pub fn row(&self, i: usize) -> &FixedBitSet {
        &self.rows[i]
    }

    pub(crate) fn row_mut(&mut self, i: usize) -> &mut FixedBitSet {
        &mut self.rows[i]
    }

    /// Columns `j` with cell (i, j) set
    pub fn successors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows[i].ones()
    }

    /// Rows `i` with cell (i, j) set
    pub fn predecessors(&self, j: usize) -> impl Iterator<Item = usize> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, row)| row.contains(j))
            .map(|(i, _)| i)
    }

    /// All set cells (i, j), row by row
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.ones().map(move |j| (i, j)))
    }

    /// All set cells as pairs of [`EventID`]s
    pub fn id_pairs(&self) -> impl Iterator<Item = (&EventID, &EventID)> + '_ {
        self.pairs()
            .map(|(i, j)| (&self.event_ids[i], &self.event_ids[j]))
    }

    /// Number of set cells
    pub fn count_ones(&self) -> usize {
        self.rows.iter().map(|row| row.count_ones(..)).sum()
    }

    /// Transposed matrix (rows become columns)
    pub fn transpose(&self) -> Self {
        let mut transposed = self.empty_like();
        for (i, j) in self.pairs() {
            transposed.rows[j].insert(i);
        }
        transposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::lpo::Arc;

    #[test]
    fn only_generating_arcs_are_seeded() {
        let mut lpo = crate::lpo!("abcd"; "a" => "b", "b" => "c", "d" => "c");
        lpo.add_arc(Arc::new("derived", "a", "c", false)).unwrap();

        let matrix = IncidenceMatrix::from_generating_arcs(&lpo);
        assert_eq!(matrix.len(), 4);
        let ids: Vec<&str> = matrix.event_ids().iter().map(EventID::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);

        let (a, b, c, d) = (0, 1, 2, 3);
        assert!(matrix.get(a, b) && matrix.get(b, c) && matrix.get(d, c));
        assert!(!matrix.get(a, c));
        assert_eq!(matrix.count_ones(), 3);
        assert!(!matrix.get(17, 0));

        let all = IncidenceMatrix::from_all_arcs(&lpo);
        assert!(all.get(a, c));
        assert_eq!(all.count_ones(), 4);
    }

    #[test]
    fn matrix_is_a_snapshot() {
        let mut lpo = crate::lpo!("ab"; "a" => "b");
        let matrix = IncidenceMatrix::from_generating_arcs(&lpo);
        lpo.add_generating_arc("b", "a").unwrap();
        assert!(!matrix.get(1, 0));
        assert_eq!(matrix.count_ones(), 1);
    }

    #[test]
    fn neighbours_and_transpose() {
        let lpo = crate::lpo!("abcd"; "a" => "b", "b" => "c", "d" => "c");
        let matrix = IncidenceMatrix::from_generating_arcs(&lpo);
        let c = matrix.index_of(&"c".into()).unwrap();
        assert_eq!(matrix.predecessors(c).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(matrix.successors(0).collect::<Vec<_>>(), vec![1]);

        let transposed = matrix.transpose();
        assert_eq!(transposed.successors(c).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(transposed.transpose(), matrix);

        let pairs: Vec<(&str, &str)> = matrix
            .id_pairs()
            .map(|(from, to)| (from.as_str(), to.as_str()))
            .collect();
        assert_eq!(pairs, vec![("a", "b"), ("b", "c"), ("d", "c")]);
    }
}
