//! Coordinate-system interface types.
//!
//! The full EPSG registry lives in an external coordinate-system library;
//! this module carries only what the grid files themselves store: the code,
//! a name, the geographic/projected split and the ellipsoid parameters
//! written into the NetCDF attributes.

/// A coordinate reference system as stored in a grid file.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSystem {
    pub epsg: i32,
    pub name: String,
    pub is_geographic: bool,
    pub semi_major_axis: f64,
    pub semi_minor_axis: f64,
    pub inverse_flattening: f64,
    pub proj4: Option<String>,
    pub wkt: Option<String>,
}

impl CoordinateSystem {
    pub fn wgs84() -> Self {
        Self {
            epsg: 4326,
            name: "WGS 84".into(),
            is_geographic: true,
            semi_major_axis: 6378137.0,
            semi_minor_axis: 6356752.314245,
            inverse_flattening: 298.257223563,
            proj4: Some("+proj=longlat +datum=WGS84 +no_defs".into()),
            wkt: None,
        }
    }

    /// Amersfoort / RD New, the usual projected system of Dutch models.
    pub fn rd_new() -> Self {
        Self {
            epsg: 28992,
            name: "Amersfoort / RD New".into(),
            is_geographic: false,
            semi_major_axis: 6377397.155,
            semi_minor_axis: 6356078.962818,
            inverse_flattening: 299.1528128,
            proj4: Some("+proj=sterea +lat_0=52.15616055555555 +lon_0=5.38763888888889 +k=0.9999079 +x_0=155000 +y_0=463000 +ellps=bessel +units=m +no_defs".into()),
            wkt: None,
        }
    }

    /// Interprets an EPSG code read from a grid file. Code 0 means "no
    /// coordinate system written"; unknown nonzero codes are kept as generic
    /// projected systems so the code at least round-trips.
    pub fn from_epsg(code: i32) -> Option<Self> {
        match code {
            0 => None,
            4326 => Some(Self::wgs84()),
            28992 => Some(Self::rd_new()),
            _ => Some(Self {
                epsg: code,
                name: format!("EPSG:{code}"),
                is_geographic: false,
                semi_major_axis: 6378137.0,
                semi_minor_axis: 6356752.314245,
                inverse_flattening: 298.257223563,
                proj4: None,
                wkt: None,
            }),
        }
    }
}
