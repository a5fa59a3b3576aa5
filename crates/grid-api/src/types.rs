//! Value types crossing the grid API boundary.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use ionc::ffi::{pad_fixed, InteropMetadata, METADATA_SIZE};

/// Detected metadata dialect of a NetCDF dataset.
///
/// Discriminants mirror the native header's bit-set style; unknown values
/// coming over the boundary collapse to [`DataSetConvention::Other`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(i32)]
pub enum DataSetConvention {
    Null = 0,
    Cf = 1,
    Ugrid = 2,
    Sgrid = 4,
    Other = 8,
    Test = 16,
}

impl DataSetConvention {
    pub fn from_native(value: i32) -> Self {
        Self::try_from(value).unwrap_or(Self::Other)
    }
}

/// Topological location a variable is defined on.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(i32)]
pub enum LocationType {
    None = 0,
    Node = 1,
    Edge = 2,
    Face = 4,
    Volume = 8,
}

/// Mesh dimensionality selector for the multi-mesh enumeration calls.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoPrimitive,
    TryFromPrimitive,
)]
#[repr(i32)]
pub enum UGridMeshType {
    Any = 0,
    Mesh1D = 1,
    Mesh2D = 2,
    Mesh3D = 3,
}

/// Dataset open mode. NF90 reuses integer values across modes (NOWRITE and
/// CLOBBER are both 0), so the mapping lives in [`OpenMode::to_nf90`] instead
/// of the discriminants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenMode {
    #[default]
    ReadOnly,
    ReadWrite,
    Replace,
}

impl OpenMode {
    pub fn to_nf90(self) -> i32 {
        match self {
            OpenMode::ReadOnly => 0,
            OpenMode::ReadWrite => 1,
            OpenMode::Replace => 0,
        }
    }
}

/// Global attributes written once when a grid file is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UGridGlobalMetaData {
    pub institution: String,
    pub source: String,
    pub references: String,
    pub version: String,
    pub model_name: String,
}

impl UGridGlobalMetaData {
    pub fn new(
        model_name: impl Into<String>,
        source: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            institution: "Unknown".into(),
            source: source.into(),
            references: "Unknown".into(),
            version: version.into(),
            model_name: model_name.into(),
        }
    }

    /// Pads every field into the fixed-width record the native side expects.
    pub fn to_interop(&self) -> InteropMetadata {
        InteropMetadata {
            institution: pad_fixed::<METADATA_SIZE>(&self.institution),
            source: pad_fixed::<METADATA_SIZE>(&self.source),
            references: pad_fixed::<METADATA_SIZE>(&self.references),
            version: pad_fixed::<METADATA_SIZE>(&self.version),
            modelname: pad_fixed::<METADATA_SIZE>(&self.model_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_native_convention_becomes_other() {
        assert_eq!(DataSetConvention::from_native(2), DataSetConvention::Ugrid);
        assert_eq!(DataSetConvention::from_native(99), DataSetConvention::Other);
        assert_eq!(DataSetConvention::from_native(-3), DataSetConvention::Other);
    }

    #[test]
    fn open_modes_map_to_nf90_values() {
        assert_eq!(OpenMode::ReadOnly.to_nf90(), 0);
        assert_eq!(OpenMode::ReadWrite.to_nf90(), 1);
        assert_eq!(OpenMode::Replace.to_nf90(), 0);
    }

    #[test]
    fn metadata_pads_to_interop_record() {
        let meta = UGridGlobalMetaData::new("My Model", "My Source", "1.0");
        let interop = meta.to_interop();
        let text: String = interop.modelname[..8]
            .iter()
            .map(|&c| c as u8 as char)
            .collect();
        assert_eq!(text, "My Model");
        assert!(interop.modelname[8..].iter().all(|&c| c as u8 == b' '));
    }
}
