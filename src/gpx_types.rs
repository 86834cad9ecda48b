use chrono::{DateTime, Utc};
use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// Name and description shared by everything that can sit at the top level of
/// a GPX file, so callers can list waypoints, routes and tracks together.
pub trait GpxFeature {
    fn name(&self) -> &str;
    fn description(&self) -> Option<&str>;
}

/// The root of a GPX file: who made it, plus its waypoints, routes and tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl Document {
    pub fn new(
        creator: Option<String>,
        waypoints: Vec<Waypoint>,
        routes: Vec<Route>,
        tracks: Vec<Track>,
    ) -> Self {
        Self {
            creator,
            waypoints,
            routes,
            tracks,
        }
    }

    /// Every waypoint, route and track, in that order.
    pub fn features(&self) -> Vec<&dyn GpxFeature> {
        let waypoints = self.waypoints.iter().map(|w| w as &dyn GpxFeature);
        let routes = self.routes.iter().map(|r| r as &dyn GpxFeature);
        let tracks = self.tracks.iter().map(|t| t as &dyn GpxFeature);
        waypoints.chain(routes).chain(tracks).collect()
    }
}

/// A named point of interest (`<wpt>`).
///
/// Text fields are written as given but read back trimmed, so surrounding
/// whitespace does not survive a round trip. Blank optional text is not written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level, if known.
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    /// Marker symbol code shown on the map.
    #[serde(default)]
    pub symbol: Option<String>,
}

impl Waypoint {
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        elevation: Option<f64>,
        description: Option<String>,
        symbol: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            elevation,
            description,
            symbol,
        }
    }

    pub fn from_coordinate(
        name: impl Into<String>,
        coordinate: Coord<f64>,
        elevation: Option<f64>,
        description: Option<String>,
        symbol: Option<String>,
    ) -> Self {
        Self::new(
            name,
            coordinate.y,
            coordinate.x,
            elevation,
            description,
            symbol,
        )
    }

    pub fn coordinate(&self) -> Coord<f64> {
        to_coord(self.latitude, self.longitude)
    }

    pub fn set_coordinate(&mut self, coordinate: Coord<f64>) {
        self.latitude = coordinate.y;
        self.longitude = coordinate.x;
    }
}

impl GpxFeature for Waypoint {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A recorded path (`<trk>`), split into segments wherever logging stopped.
///
/// An empty `<name/>` reads as `""`; only a missing `<name>` is an error.
/// Text is read back trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub segments: Vec<Segment>,
}

impl Track {
    pub fn new(name: impl Into<String>, description: Option<String>, segments: Vec<Segment>) -> Self {
        Self {
            name: name.into(),
            description,
            segments,
        }
    }

    /// All points of all segments, in path order.
    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> {
        self.segments.iter().flat_map(|segment| segment.points.iter())
    }
}

impl GpxFeature for Track {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A GPX track segment (`<trkseg>`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    #[serde(default)]
    pub points: Vec<TrackPoint>,
}

impl Segment {
    pub fn new(points: Vec<TrackPoint>) -> Self {
        Self { points }
    }
}

/// A single recorded position (`<trkpt>`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
}

impl TrackPoint {
    pub fn new(
        latitude: f64,
        longitude: f64,
        elevation: Option<f64>,
        time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
            time,
        }
    }

    pub fn from_coordinate(
        coordinate: Coord<f64>,
        elevation: Option<f64>,
        time: Option<DateTime<Utc>>,
    ) -> Self {
        Self::new(coordinate.y, coordinate.x, elevation, time)
    }

    pub fn coordinate(&self) -> Coord<f64> {
        to_coord(self.latitude, self.longitude)
    }

    pub fn set_coordinate(&mut self, coordinate: Coord<f64>) {
        self.latitude = coordinate.y;
        self.longitude = coordinate.x;
    }
}

/// A planned path of travel (`<rte>`).
///
/// An empty `<name/>` reads as `""`; only a missing `<name>` is an error.
/// Text is read back trimmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub route_points: Vec<RoutePoint>,
}

impl Route {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        route_points: Vec<RoutePoint>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            route_points,
        }
    }

    pub fn from_coordinates(
        name: impl Into<String>,
        description: Option<String>,
        coordinates: impl IntoIterator<Item = Coord<f64>>,
    ) -> Self {
        let route_points = coordinates
            .into_iter()
            .map(RoutePoint::from_coordinate)
            .collect();
        Self::new(name, description, route_points)
    }
}

impl GpxFeature for Route {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// A route point (`<rtept>`); position only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl RoutePoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn from_coordinate(coordinate: Coord<f64>) -> Self {
        Self::new(coordinate.y, coordinate.x)
    }

    pub fn coordinate(&self) -> Coord<f64> {
        to_coord(self.latitude, self.longitude)
    }

    pub fn set_coordinate(&mut self, coordinate: Coord<f64>) {
        self.latitude = coordinate.y;
        self.longitude = coordinate.x;
    }
}

// geo-types puts longitude on x and latitude on y.
fn to_coord(latitude: f64, longitude: f64) -> Coord<f64> {
    Coord {
        x: longitude,
        y: latitude,
    }
}
