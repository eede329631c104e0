//! Polygon cell storage.
//!
//! Cells are stored the way visualization pipelines hand them over: a flat
//! connectivity list of point ids plus an offsets list where cell `i` spans
//! `connectivity[offsets[i]..offsets[i + 1]]`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a point referenced by a cell.
///
/// Signed and 64 bits wide to match the id type of the host pipelines that
/// produce these meshes. Negative ids are representable (and invalid).
pub type CellId = i64;

/// An ordered list of polygonal cells.
///
/// The declared cell count is `offsets.len() - 1`. A well-formed array has
/// non-decreasing offsets that stay within the connectivity list; arrays
/// built through [`CellArray::push_cell`] are always well-formed.
///
/// # Example
///
/// ```
/// use mesh_types::CellArray;
///
/// let mut cells = CellArray::new();
/// cells.push_cell(&[0, 1, 2]);
/// cells.push_cell(&[0, 2, 3, 4]);
///
/// assert_eq!(cells.cell_count(), 2);
/// assert_eq!(cells.cell(1), Some(&[0, 2, 3, 4][..]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CellArray {
    offsets: Vec<usize>,
    connectivity: Vec<CellId>,
}

impl Default for CellArray {
    fn default() -> Self {
        Self::new()
    }
}

impl CellArray {
    /// Create an empty cell array.
    #[must_use]
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            connectivity: Vec::new(),
        }
    }

    /// Create an empty cell array with room for `cells` cells of
    /// `ids_per_cell` ids each.
    #[must_use]
    pub fn with_capacity(cells: usize, ids_per_cell: usize) -> Self {
        let mut offsets = Vec::with_capacity(cells + 1);
        offsets.push(0);
        Self {
            offsets,
            connectivity: Vec::with_capacity(cells.saturating_mul(ids_per_cell)),
        }
    }

    /// Build a cell array directly from its offsets and connectivity lists.
    ///
    /// No validation is performed. Use this when adopting buffers produced
    /// elsewhere; malformed offsets are detected lazily by [`CellArray::iter`],
    /// which stops at the first cell it cannot resolve.
    #[must_use]
    pub const fn from_raw_parts(offsets: Vec<usize>, connectivity: Vec<CellId>) -> Self {
        Self {
            offsets,
            connectivity,
        }
    }

    /// Build a triangle-only cell array.
    ///
    /// ```
    /// use mesh_types::CellArray;
    ///
    /// let cells = CellArray::from_triangles(&[[0, 1, 2], [0, 2, 3]]);
    /// assert_eq!(cells.cell_count(), 2);
    /// assert_eq!(cells.connectivity().len(), 6);
    /// ```
    #[must_use]
    pub fn from_triangles(triangles: &[[CellId; 3]]) -> Self {
        let mut cells = Self::with_capacity(triangles.len(), 3);
        for tri in triangles {
            cells.push_cell(tri);
        }
        cells
    }

    /// Append a cell and return its index.
    pub fn push_cell(&mut self, ids: &[CellId]) -> usize {
        self.connectivity.extend_from_slice(ids);
        self.offsets.push(self.connectivity.len());
        self.offsets.len() - 2
    }

    /// The number of cells this array declares.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Whether the array declares no cells.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cell_count() == 0
    }

    /// Point ids of cell `index`, or `None` if the index is past the end or
    /// the cell's offsets are malformed.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&[CellId]> {
        let start = *self.offsets.get(index)?;
        let end = *self.offsets.get(index + 1)?;
        if start > end {
            return None;
        }
        self.connectivity.get(start..end)
    }

    /// Iterate over the cells in order.
    ///
    /// Iteration ends early at the first cell whose offsets are decreasing or
    /// point past the connectivity list, so a corrupt array yields fewer
    /// cells than [`CellArray::cell_count`] declares.
    #[must_use]
    pub fn iter(&self) -> Cells<'_> {
        Cells {
            array: self,
            next: 0,
        }
    }

    /// The offsets list (`cell_count() + 1` entries when well-formed).
    #[must_use]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// The flat connectivity list.
    #[must_use]
    pub fn connectivity(&self) -> &[CellId] {
        &self.connectivity
    }
}

impl<'a> IntoIterator for &'a CellArray {
    type Item = &'a [CellId];
    type IntoIter = Cells<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the cells of a [`CellArray`].
#[derive(Debug, Clone)]
pub struct Cells<'a> {
    array: &'a CellArray,
    next: usize,
}

impl<'a> Iterator for Cells<'a> {
    type Item = &'a [CellId];

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.array.cell_count() {
            return None;
        }
        if let Some(cell) = self.array.cell(self.next) {
            self.next += 1;
            Some(cell)
        } else {
            // Fuse: a malformed cell ends the traversal for good.
            self.next = usize::MAX;
            None
        }
    }
}

impl std::iter::FusedIterator for Cells<'_> {}
