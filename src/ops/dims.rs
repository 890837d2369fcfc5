// src/ops/dims.rs
// Expansion of MEX dimension specifications.
//
// Users describe per-axis block/stride sizes with a shorthand of length 2 or
// 3, where -1 means "use the whole corresponding image dimension". Before
// anything reaches the kernel the shorthand is expanded to exactly three
// values aligned to the spatial axes [height, width, depth]. Instead of
// carrying the -1 sentinel around, the crate models both sides with explicit
// sum types and converts to the raw i32 shorthand only at the boundaries.

use std::fmt;

/// One axis of a tensor shape. `Dynamic` marks an axis whose size is not
/// known at graph construction time (an unbound batch, a dynamic spatial
/// dimension).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    Known(usize),
    Dynamic,
}

impl Dim {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, Dim::Dynamic)
    }

    pub fn as_known(&self) -> Option<usize> {
        match self {
            Dim::Known(n) => Some(*n),
            Dim::Dynamic => None,
        }
    }

    /// Raw wire value: -1 stands for a dynamic axis.
    pub fn to_raw(self) -> i32 {
        match self {
            Dim::Known(n) => n as i32,
            Dim::Dynamic => -1,
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Known(n) => write!(f, "{}", n),
            Dim::Dynamic => write!(f, "?"),
        }
    }
}

/// One entry of a user dimension specification: either an explicit size or
/// `Full`, the typed form of the -1 "use the full image dimension" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecDim {
    Size(usize),
    Full,
}

impl SpecDim {
    /// Parses the raw shorthand value. -1 is the only sentinel; every other
    /// non-negative value passes through as an explicit size (zero is valid,
    /// it is the default padding).
    pub fn from_raw(value: i32) -> Result<Self, String> {
        match value {
            -1 => Ok(SpecDim::Full),
            v if v >= 0 => Ok(SpecDim::Size(v as usize)),
            v => Err(format!(
                "Invalid dimension specification value {}, expected -1 or a non-negative size",
                v
            )),
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            SpecDim::Size(n) => n as i32,
            SpecDim::Full => -1,
        }
    }
}

/// Expands a MEX dimension specification against an image shape.
///
/// The specification can be 2 or 3 long and is processed in two steps:
/// 1. If it is of length 2, `Full` is prepended to it
/// 2. Each `Full` entry is replaced with the whole corresponding image
///    dimension
///
/// `image_shape` must be of length 3 (`[height, width, depth]`, batch
/// absent) or 4 (`[batch, height, width, depth]`). A `Full` entry resolving
/// against a `Dynamic` image axis stays `Dynamic`; that is a valid result,
/// not an error. Inputs are never mutated.
pub fn expand_dim_specification(
    image_shape: &[Dim],
    dim_spec: &[SpecDim],
) -> Result<[Dim; 3], String> {
    if dim_spec.len() != 2 && dim_spec.len() != 3 {
        return Err(format!(
            "Bad dimensions specification, should be a list of two or three, got {:?}",
            dim_spec
        ));
    }
    if image_shape.len() != 3 && image_shape.len() != 4 {
        return Err(format!(
            "Bad image shape, should be of length three or four, got {:?}",
            image_shape
        ));
    }

    // Normalize the shape to length 4 (batch axis first, possibly unknown).
    let mut shape = [Dim::Dynamic; 4];
    shape[4 - image_shape.len()..].copy_from_slice(image_shape);

    // Normalize the spec to length 3, the implicit leading axis is Full.
    let mut spec = [SpecDim::Full; 3];
    spec[3 - dim_spec.len()..].copy_from_slice(dim_spec);

    let mut expanded = [Dim::Dynamic; 3];
    for i in 0..3 {
        expanded[i] = match spec[i] {
            // +1 skips the batch axis of the normalized shape.
            SpecDim::Full => shape[i + 1],
            SpecDim::Size(n) => Dim::Known(n),
        };
    }
    Ok(expanded)
}

/// Raw-shorthand convenience used by the operator glue: parses the i32
/// shorthand, expands it, and requires every resolved axis to be concrete
/// (kernel attributes cannot carry dynamic sizes).
pub fn expand_raw(image_shape: &[Dim], dim_spec: &[i32]) -> Result<[i32; 3], String> {
    let spec = dim_spec
        .iter()
        .map(|&v| SpecDim::from_raw(v))
        .collect::<Result<Vec<_>, String>>()?;

    let expanded = expand_dim_specification(image_shape, &spec)?;

    let mut out = [0i32; 3];
    for (i, dim) in expanded.iter().enumerate() {
        out[i] = dim.as_known().map(|n| n as i32).ok_or_else(|| {
            format!(
                "Cannot resolve dimension specification {:?} against shape {:?}: axis {} is dynamic",
                dim_spec, image_shape, i
            )
        })?;
    }
    Ok(out)
}
