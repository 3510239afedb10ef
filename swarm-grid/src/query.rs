//! Fixed-capacity neighbourhood query result.

use crate::topology::{CellIndex, NEIGHBORHOOD};
use crate::ObjectId;

/// Object ids gathered from a cell's neighbourhood.
///
/// Holds up to `9 * cell_capacity` ids in storage allocated once by
/// [`QueryResult::new`].  Every `find` call resets it before filling, so the
/// contents only describe the most recent query.
#[derive(Clone, Debug, Default)]
pub struct QueryResult {
    items: Box<[ObjectId]>,
    len: usize,
    at_border: bool,
    cell: CellIndex,
}

impl QueryResult {
    /// Buffer sized for a grid whose buckets hold `cell_capacity` ids.
    pub fn new(cell_capacity: usize) -> Self {
        Self {
            items: vec![0; cell_capacity * NEIGHBORHOOD].into_boxed_slice(),
            len: 0,
            at_border: false,
            cell: CellIndex::default(),
        }
    }

    #[inline]
    pub(crate) fn reset(&mut self, cell: CellIndex, at_border: bool) {
        self.len = 0;
        self.cell = cell;
        self.at_border = at_border;
    }

    /// Copy as many of `ids` as still fit; returns how many were copied.
    #[inline]
    pub(crate) fn extend_from(&mut self, ids: &[ObjectId]) -> usize {
        let n = ids.len().min(self.items.len() - self.len);
        self.items[self.len..self.len + n].copy_from_slice(&ids[..n]);
        self.len += n;
        n
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the result reached [`capacity`](Self::capacity).
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.items.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[ObjectId] {
        &self.items[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ObjectId> {
        self.as_slice().iter()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.as_slice().contains(&id)
    }

    /// Border flag of the queried cell.
    #[inline]
    pub fn at_border(&self) -> bool {
        self.at_border
    }

    /// The cell whose neighbourhood was gathered.
    #[inline]
    pub fn cell(&self) -> CellIndex {
        self.cell
    }
}

impl<'a> IntoIterator for &'a QueryResult {
    type Item = &'a ObjectId;
    type IntoIter = std::slice::Iter<'a, ObjectId>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let r = QueryResult::new(3);
        assert_eq!(r.capacity(), 27);
        assert!(r.is_empty());
        assert!(!r.is_full());
        assert_eq!(r.as_slice(), &[] as &[ObjectId]);
    }

    #[test]
    fn test_extend_caps_at_capacity() {
        let mut r = QueryResult::new(1);
        assert_eq!(r.extend_from(&[1, 2, 3, 4]), 4);
        assert_eq!(r.extend_from(&[5, 6, 7, 8, 9, 10]), 5);
        assert!(r.is_full());
        assert_eq!(r.extend_from(&[11]), 0);
        assert_eq!(r.as_slice(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_reset_invalidates_contents() {
        let mut r = QueryResult::new(2);
        r.extend_from(&[7, 8]);
        r.reset(CellIndex(4), true);
        assert!(r.is_empty());
        assert!(!r.contains(7));
        assert!(r.at_border());
        assert_eq!(r.cell(), CellIndex(4));
    }

    #[test]
    fn test_default_has_no_room() {
        let mut r = QueryResult::default();
        assert_eq!(r.capacity(), 0);
        assert_eq!(r.extend_from(&[1]), 0);
        assert!(r.is_empty());
    }
}
