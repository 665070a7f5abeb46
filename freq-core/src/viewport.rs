use serde::{Deserialize, Serialize};

/// A WGS84 point in Leaflet's `{lat, lng}` shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Map bounding box, serialized the way Leaflet's `LatLngBounds` stringifies
/// so the server can read it unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(rename = "_southWest")]
    pub south_west: LatLng,
    #[serde(rename = "_northEast")]
    pub north_east: LatLng,
}

impl Bounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south_west: LatLng { lat: south, lng: west },
            north_east: LatLng { lat: north, lng: east },
        }
    }

    /// Whole world, the initial view before the map reports its bounds.
    pub fn world() -> Self {
        Self::new(-90.0, -180.0, 90.0, 180.0)
    }

    /// Inclusive containment of a `(lon, lat)` coordinate pair.
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        lat >= self.south_west.lat
            && lat <= self.north_east.lat
            && lon >= self.south_west.lng
            && lon <= self.north_east.lng
    }

    /// `west,south,east,north`, as `toBBoxString()` produces.
    pub fn to_bbox_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.south_west.lng, self.south_west.lat, self.north_east.lng, self.north_east.lat
        )
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Form fields of the `/locations/` bounding-box request.
    pub fn corner_params(&self) -> Vec<(String, String)> {
        vec![
            ("SWlat".to_string(), self.south_west.lat.to_string()),
            ("SWlng".to_string(), self.south_west.lng.to_string()),
            ("NElat".to_string(), self.north_east.lat.to_string()),
            ("NElng".to_string(), self.north_east.lng.to_string()),
        ]
    }
}

/// What part of the map is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapViewport {
    pub bounds: Bounds,
    pub zoom: u8,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            bounds: Bounds::world(),
            zoom: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_json_matches_leaflet() {
        let bounds = Bounds::new(51.1, 2.8, 53.0, 7.6);
        let json: serde_json::Value = serde_json::from_str(&bounds.to_json()).unwrap();
        assert_eq!(json["_southWest"]["lat"], 51.1);
        assert_eq!(json["_northEast"]["lng"], 7.6);
    }

    #[test]
    fn test_bbox_string_order() {
        let bounds = Bounds::new(51.5, 2.5, 53.5, 7.5);
        assert_eq!(bounds.to_bbox_string(), "2.5,51.5,7.5,53.5");
    }

    #[test]
    fn test_contains_is_inclusive() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 10.0);
        assert!(bounds.contains(0.0, 10.0));
        assert!(bounds.contains(5.0, 5.0));
        assert!(!bounds.contains(10.5, 5.0));
        assert!(!bounds.contains(5.0, -0.1));
    }

    #[test]
    fn test_corner_params() {
        let params = Bounds::new(1.0, 2.0, 3.0, 4.0).corner_params();
        assert_eq!(params[0], ("SWlat".to_string(), "1".to_string()));
        assert_eq!(params[3], ("NElng".to_string(), "4".to_string()));
    }
}
