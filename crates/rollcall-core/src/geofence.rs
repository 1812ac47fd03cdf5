//! Geofence boundary shapes and containment evaluation.
//!
//! A class may register one boundary, either a circle (center + radius) or a
//! polygon. The evaluator decides whether a reported coordinate falls inside
//! that boundary; it is one half of the dual-factor presence check.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::directory::ClassDirectory;
use crate::error::{Result, RollcallError};
use crate::geo;
use crate::types::{ClassId, GeoPoint};

/// A geofence boundary registered for a class.
///
/// Serialized with a `type` tag, so an unknown shape tag is rejected when the
/// boundary is deserialized rather than discovered at evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GeofenceShape {
    /// A circular boundary around a center point.
    Circle {
        /// Center of the circle.
        center: GeoPoint,
        /// Radius in meters.
        radius_m: f64,
    },
    /// A polygonal boundary described by an ordered vertex sequence.
    /// The last vertex connects back to the first.
    Polygon {
        /// Ordered polygon vertices; at least 3 are required to evaluate.
        vertices: Vec<GeoPoint>,
    },
}

/// Decides whether a coordinate is inside a class's registered boundary.
#[derive(Clone)]
pub struct GeofenceEvaluator {
    directory: Arc<dyn ClassDirectory>,
}

impl GeofenceEvaluator {
    /// Create an evaluator backed by the given class directory.
    pub fn new(directory: Arc<dyn ClassDirectory>) -> Self {
        Self { directory }
    }

    /// Whether `(lat, lon)` is inside the geofence registered for the class.
    ///
    /// # Errors
    ///
    /// - [`RollcallError::GeofenceNotConfigured`] when the class has no
    ///   registered boundary.
    /// - [`RollcallError::UnsupportedShape`] when the boundary cannot be
    ///   evaluated (a polygon with fewer than 3 vertices).
    pub fn is_within(&self, class_id: ClassId, lat: f64, lon: f64) -> Result<bool> {
        let Some(shape) = self.directory.geofence(class_id)? else {
            return Err(RollcallError::GeofenceNotConfigured(class_id));
        };

        match shape {
            GeofenceShape::Circle { center, radius_m } => {
                let distance =
                    geo::distance_meters(lat, lon, center.latitude, center.longitude);
                Ok(distance <= radius_m)
            }
            GeofenceShape::Polygon { vertices } => {
                if vertices.len() < 3 {
                    return Err(RollcallError::UnsupportedShape {
                        class_id,
                        detail: format!("polygon with {} vertices", vertices.len()),
                    });
                }
                Ok(geo::point_in_polygon(lat, lon, &vertices))
            }
        }
    }
}
