use geo::{Coord, MapCoordsInPlace};

const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude where the square Web Mercator map ends.
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// The reference system geometries are written in. Input is always
/// WGS84; the transform is applied right before a feature is stored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputSrs {
    Wgs84,
    WebMercator,
}

impl OutputSrs {
    pub fn from_epsg(code: u32) -> Result<Self, String> {
        match code {
            4326 => Ok(Self::Wgs84),
            3857 => Ok(Self::WebMercator),
            _ => Err(format!(
                "Unknown output SRS EPSG:{code} (supported: 4326, 3857)"
            )),
        }
    }

    pub fn epsg(&self) -> u32 {
        match self {
            Self::Wgs84 => 4326,
            Self::WebMercator => 3857,
        }
    }

    pub fn transform_coord(&self, coord: Coord<f64>) -> Coord<f64> {
        match self {
            Self::Wgs84 => coord,
            Self::WebMercator => {
                let lat = coord.y.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
                Coord {
                    x: EARTH_RADIUS * coord.x.to_radians(),
                    y: EARTH_RADIUS
                        * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
                            .tan()
                            .ln(),
                }
            }
        }
    }

    /// Transforms a finished geometry in place.
    pub fn transform(&self, geometry: &mut impl MapCoordsInPlace<f64>) {
        if *self == Self::Wgs84 {
            return;
        }
        geometry.map_coords_in_place(|coord| self.transform_coord(coord));
    }
}
