//! Fallback convention detection for files the native open path rejects.
//!
//! Older _net.nc files predate the io_netcdf convention bookkeeping; for
//! those the `Conventions` global attribute is read directly through the
//! netcdf library and classified here. Anything unreadable or unrecognized
//! is `Other`, never an error: the caller only needs to know which code path
//! to take.

use tracing::debug;

use crate::constants::UG_CONV_MIN_VERSION;
use crate::types::DataSetConvention;

/// Classifies the file at `path` by its `Conventions` attribute.
pub fn legacy_convention(path: &str) -> DataSetConvention {
    match conventions_attribute(path) {
        Some(text) => classify(&text),
        None => {
            debug!(path, "no readable Conventions attribute, treating as legacy");
            DataSetConvention::Other
        }
    }
}

fn conventions_attribute(path: &str) -> Option<String> {
    let file = netcdf::open(path).ok()?;
    let attribute = file.attribute("Conventions")?;
    match attribute.value().ok()? {
        netcdf::AttributeValue::Str(text) => Some(text),
        _ => None,
    }
}

fn classify(text: &str) -> DataSetConvention {
    if let Some(version) = ugrid_version(text) {
        if version >= UG_CONV_MIN_VERSION {
            return DataSetConvention::Ugrid;
        }
        return DataSetConvention::Other;
    }
    if text.contains("SGRID") {
        return DataSetConvention::Sgrid;
    }
    if text.starts_with("CF") {
        return DataSetConvention::Cf;
    }
    DataSetConvention::Other
}

/// Extracts the version from a `UGRID-x.y` marker, NaN when unversioned.
fn ugrid_version(text: &str) -> Option<f64> {
    let start = text.find("UGRID")?;
    let rest = &text[start + "UGRID".len()..];
    let digits: String = rest
        .chars()
        .skip_while(|c| *c == '-')
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    Some(digits.parse().unwrap_or(f64::NAN))
}
