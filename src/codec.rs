//! Mapping between the GPX model and [`XmlNode`] trees.
//!
//! Placement of every field is fixed:
//!
//! | Entity     | Attributes   | Required children | Optional children            |
//! |------------|--------------|-------------------|------------------------------|
//! | `wpt`      | `lat`, `lon` | `name`            | `ele`, `desc`, `sym`         |
//! | `trkpt`    | `lat`, `lon` |                   | `ele`, `time`                |
//! | `rtept`    | `lat`, `lon` |                   |                              |
//! | `trk`      |              | `name`            | `desc`, repeated `trkseg`    |
//! | `trkseg`   |              |                   | repeated `trkpt`             |
//! | `rte`      |              | `name`            | `desc`, repeated `rtept`     |
//! | `gpx`      | `creator`    |                   | repeated `wpt`, `rte`, `trk` |
//!
//! Children are written in the order of the table. Absent optional fields are
//! left out entirely.

use crate::error::{GpxError, Result};
use crate::gpx_types::*;
use crate::time::{format_timestamp, parse_timestamp};
use crate::xml::XmlNode;

/// A GPX entity that can be read from and written to an element node.
pub trait GpxElement: Sized {
    /// Element name, e.g. `wpt` or `trkseg`.
    const TAG: &'static str;

    /// Build the entity from its element. Fails on the first required field
    /// that is absent or unparsable.
    fn decode(node: &XmlNode) -> Result<Self>;

    fn encode(&self) -> XmlNode;
}

impl GpxElement for Document {
    const TAG: &'static str = "gpx";

    fn decode(node: &XmlNode) -> Result<Self> {
        let document = Document {
            creator: node.attribute("creator").map(str::to_string),
            waypoints: decode_children(node)?,
            routes: decode_children(node)?,
            tracks: decode_children(node)?,
        };
        log::debug!(
            "Decoded GPX document: {} waypoints, {} routes, {} tracks",
            document.waypoints.len(),
            document.routes.len(),
            document.tracks.len()
        );
        Ok(document)
    }

    fn encode(&self) -> XmlNode {
        let mut element = XmlNode::new(Self::TAG);
        if let Some(creator) = &self.creator {
            element.set_attribute("creator", creator.as_str());
        }
        element.append_children(self.waypoints.iter().map(Waypoint::encode));
        element.append_children(self.routes.iter().map(Route::encode));
        element.append_children(self.tracks.iter().map(Track::encode));
        element
    }
}

impl GpxElement for Waypoint {
    const TAG: &'static str = "wpt";

    fn decode(node: &XmlNode) -> Result<Self> {
        let (latitude, longitude) = parse_lat_lon(node)?;
        Ok(Waypoint {
            name: required_text(node, "name")?,
            latitude,
            longitude,
            elevation: optional_number(node, "ele"),
            description: optional_text(node, "desc"),
            symbol: optional_text(node, "sym"),
        })
    }

    fn encode(&self) -> XmlNode {
        let mut element = point_element(Self::TAG, self.latitude, self.longitude);
        element.append_child(XmlNode::with_text("name", self.name.as_str()));
        append_optional(&mut element, "ele", self.elevation.map(|e| e.to_string()));
        append_optional(&mut element, "desc", self.description.clone());
        append_optional(&mut element, "sym", self.symbol.clone());
        element
    }
}

impl GpxElement for Track {
    const TAG: &'static str = "trk";

    fn decode(node: &XmlNode) -> Result<Self> {
        Ok(Track {
            name: required_text(node, "name")?,
            description: optional_text(node, "desc"),
            segments: decode_children(node)?,
        })
    }

    fn encode(&self) -> XmlNode {
        let mut element = XmlNode::new(Self::TAG);
        element.append_child(XmlNode::with_text("name", self.name.as_str()));
        append_optional(&mut element, "desc", self.description.clone());
        element.append_children(self.segments.iter().map(Segment::encode));
        element
    }
}

impl GpxElement for Segment {
    const TAG: &'static str = "trkseg";

    fn decode(node: &XmlNode) -> Result<Self> {
        Ok(Segment {
            points: decode_children(node)?,
        })
    }

    fn encode(&self) -> XmlNode {
        let mut element = XmlNode::new(Self::TAG);
        element.append_children(self.points.iter().map(TrackPoint::encode));
        element
    }
}

impl GpxElement for TrackPoint {
    const TAG: &'static str = "trkpt";

    fn decode(node: &XmlNode) -> Result<Self> {
        let (latitude, longitude) = parse_lat_lon(node)?;
        Ok(TrackPoint {
            latitude,
            longitude,
            elevation: optional_number(node, "ele"),
            time: node.child_value("time").and_then(lenient_timestamp),
        })
    }

    fn encode(&self) -> XmlNode {
        let mut element = point_element(Self::TAG, self.latitude, self.longitude);
        append_optional(&mut element, "ele", self.elevation.map(|e| e.to_string()));
        append_optional(&mut element, "time", self.time.as_ref().map(format_timestamp));
        element
    }
}

impl GpxElement for Route {
    const TAG: &'static str = "rte";

    fn decode(node: &XmlNode) -> Result<Self> {
        Ok(Route {
            name: required_text(node, "name")?,
            description: optional_text(node, "desc"),
            route_points: decode_children(node)?,
        })
    }

    fn encode(&self) -> XmlNode {
        let mut element = XmlNode::new(Self::TAG);
        element.append_child(XmlNode::with_text("name", self.name.as_str()));
        append_optional(&mut element, "desc", self.description.clone());
        element.append_children(self.route_points.iter().map(RoutePoint::encode));
        element
    }
}

impl GpxElement for RoutePoint {
    const TAG: &'static str = "rtept";

    fn decode(node: &XmlNode) -> Result<Self> {
        let (latitude, longitude) = parse_lat_lon(node)?;
        Ok(RoutePoint {
            latitude,
            longitude,
        })
    }

    fn encode(&self) -> XmlNode {
        point_element(Self::TAG, self.latitude, self.longitude)
    }
}

/// Decode every child tagged `T::TAG`, in document order.
fn decode_children<T: GpxElement>(node: &XmlNode) -> Result<Vec<T>> {
    node.children_named(T::TAG).map(T::decode).collect()
}

/// Read the `lat`/`lon` attributes of a point element. Longitude is checked first.
fn parse_lat_lon(node: &XmlNode) -> Result<(f64, f64)> {
    let longitude = required_number_attribute(node, "lon", "longitude")?;
    let latitude = required_number_attribute(node, "lat", "latitude")?;
    Ok((latitude, longitude))
}

fn required_number_attribute(node: &XmlNode, attribute: &str, field: &str) -> Result<f64> {
    node.attribute(attribute)
        .and_then(|value| value.parse::<f64>().ok())
        .ok_or_else(|| GpxError::missing(field))
}

/// Text of a required child element. An empty element is present and reads as "".
fn required_text(node: &XmlNode, name: &str) -> Result<String> {
    node.child(name)
        .map(|child| child.text.clone())
        .ok_or_else(|| GpxError::missing(name))
}

fn optional_text(node: &XmlNode, name: &str) -> Option<String> {
    node.child_value(name).map(str::to_string)
}

fn optional_number(node: &XmlNode, name: &str) -> Option<f64> {
    node.child_value(name)
        .and_then(|value| value.parse::<f64>().ok())
}

// A bad timestamp drops the time, never the point.
fn lenient_timestamp(text: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let time = parse_timestamp(text);
    if time.is_none() {
        log::warn!("Ignoring malformed <time> value {text:?}");
    }
    time
}

fn point_element(tag: &str, latitude: f64, longitude: f64) -> XmlNode {
    let mut element = XmlNode::new(tag);
    element.set_attribute("lat", latitude.to_string());
    element.set_attribute("lon", longitude.to_string());
    element
}

/// Blank values are skipped like `None`: an empty element would read back as absent.
fn append_optional(element: &mut XmlNode, name: &str, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        element.append_child(XmlNode::with_text(name, value));
    }
}
