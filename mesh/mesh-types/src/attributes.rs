//! Named data arrays attached to a mesh.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named array of fixed-width tuples.
///
/// Values are stored flat: tuple `i` occupies
/// `values[i * components..(i + 1) * components]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataArray {
    /// Array name, unique within its collection.
    pub name: String,
    /// Number of components per tuple (1 for scalars, 3 for vectors).
    pub components: usize,
    /// Flat tuple storage.
    pub values: Vec<f64>,
}

impl DataArray {
    /// Create an array from flat values.
    #[must_use]
    pub fn new(name: impl Into<String>, components: usize, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            components,
            values,
        }
    }

    /// Create a single-component array.
    ///
    /// ```
    /// use mesh_types::DataArray;
    ///
    /// let temps = DataArray::scalars("temperature", vec![20.0, 21.5, 19.0]);
    /// assert_eq!(temps.tuple_count(), 3);
    /// ```
    #[must_use]
    pub fn scalars(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, 1, values)
    }

    /// Create a three-component array.
    #[must_use]
    pub fn vectors(name: impl Into<String>, values: &[[f64; 3]]) -> Self {
        Self::new(name, 3, values.iter().flatten().copied().collect())
    }

    /// Number of complete tuples.
    #[must_use]
    pub fn tuple_count(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.values.len() / self.components
        }
    }
}

/// A collection of named [`DataArray`]s.
///
/// Used both for per-element attributes (one tuple per point or per cell)
/// and, through [`FieldData`], for whole-mesh metadata.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AttributeData {
    arrays: Vec<DataArray>,
}

/// Whole-mesh metadata, not tied to individual points or cells.
pub type FieldData = AttributeData;

impl AttributeData {
    /// Create an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { arrays: Vec::new() }
    }

    /// Add an array, replacing any existing array with the same name.
    ///
    /// ```
    /// use mesh_types::{AttributeData, DataArray};
    ///
    /// let mut data = AttributeData::new();
    /// data.add_array(DataArray::scalars("id", vec![1.0]));
    /// data.add_array(DataArray::scalars("id", vec![2.0]));
    ///
    /// assert_eq!(data.len(), 1);
    /// assert_eq!(data.array("id").map(|a| a.values[0]), Some(2.0));
    /// ```
    pub fn add_array(&mut self, array: DataArray) {
        if let Some(existing) = self.arrays.iter_mut().find(|a| a.name == array.name) {
            *existing = array;
        } else {
            self.arrays.push(array);
        }
    }

    /// Look up an array by name.
    #[must_use]
    pub fn array(&self, name: &str) -> Option<&DataArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Number of arrays.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    /// Whether the collection holds no arrays.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// Iterate over the arrays in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &DataArray> {
        self.arrays.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_array_layout() {
        let normals = DataArray::vectors("normals", &[[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]);
        assert_eq!(normals.components, 3);
        assert_eq!(normals.tuple_count(), 2);
        assert_eq!(normals.values[3..], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn zero_component_array_has_no_tuples() {
        let array = DataArray::new("empty", 0, vec![1.0, 2.0]);
        assert_eq!(array.tuple_count(), 0);
    }

    #[test]
    fn add_replaces_by_name() {
        let mut data = AttributeData::new();
        data.add_array(DataArray::scalars("a", vec![1.0]));
        data.add_array(DataArray::scalars("b", vec![2.0]));
        data.add_array(DataArray::scalars("a", vec![3.0]));

        assert_eq!(data.len(), 2);
        assert_eq!(data.array("a").map(|a| a.values.clone()), Some(vec![3.0]));
        assert!(data.array("c").is_none());
    }

    #[test]
    fn iteration_keeps_insertion_order() {
        let mut data = AttributeData::new();
        data.add_array(DataArray::scalars("z", vec![]));
        data.add_array(DataArray::scalars("a", vec![]));

        let names: Vec<&str> = data.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a"]);
    }
}
