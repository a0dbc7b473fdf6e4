/// Error types for the matrix algebra, material parsing and mesh baking
use std::fmt;

/// A matrix was constructed from a slice that did not hold exactly 16 elements
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeError {
    pub len: usize,
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Matrix4 requires 16 elements, received {}", self.len)
    }
}

impl std::error::Error for ShapeError {}

/// A material block that was skipped while parsing a material library.
///
/// These never abort a load; the remaining blocks are still parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialError {
    /// `newmtl` without a `Kd` line
    MissingColor { name: String },
    /// `Kd` line without a `newmtl` name
    MissingName,
    /// `Kd` with fewer than three numeric components
    InvalidColor { name: String },
    /// A second definition of an already declared name
    Duplicate { name: String },
}

impl fmt::Display for MaterialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterialError::MissingColor { name } => {
                write!(f, "material '{}' has no diffuse color (Kd)", name)
            }
            MaterialError::MissingName => {
                write!(f, "material block has a diffuse color but no newmtl name")
            }
            MaterialError::InvalidColor { name } => {
                write!(f, "material '{}' has a malformed Kd line", name)
            }
            MaterialError::Duplicate { name } => {
                write!(f, "material '{}' is declared more than once", name)
            }
        }
    }
}

impl std::error::Error for MaterialError {}

/// Failure to turn a parsed geometry document into drawable parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BakeError {
    /// A `usemtl` named a material missing from the library
    UnresolvedMaterial { name: String },
    /// A triangle referenced a vertex beyond the vertex table (0-based index)
    VertexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for BakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BakeError::UnresolvedMaterial { name } => {
                write!(f, "usemtl references undefined material '{}'", name)
            }
            BakeError::VertexOutOfRange { index, len } => write!(
                f,
                "face references vertex {} but only {} vertices are defined",
                index + 1,
                len
            ),
        }
    }
}

impl std::error::Error for BakeError {}
