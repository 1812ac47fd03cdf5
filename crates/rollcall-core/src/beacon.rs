//! Beacon presence matching.
//!
//! The second half of the dual-factor presence check: does any beacon UUID
//! the student's device detected match a beacon registered for the class?

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::directory::ClassDirectory;
use crate::types::ClassId;

/// Beacon identifiers are opaque, but transport input still gets a shape
/// check: printable identifier characters, 1 to 64 of them.
static BEACON_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9:_-]{1,64}$").expect("valid beacon id regex"));

/// Whether a string is plausible as a beacon identifier.
///
/// This is a boundary-level sanity check, not authentication; beacon ids
/// are not signed tokens.
#[must_use]
pub fn is_plausible_beacon_id(id: &str) -> bool {
    BEACON_ID_RE.is_match(id)
}

/// Matches detected beacon UUIDs against a class's registered beacons.
#[derive(Clone)]
pub struct BeaconMatcher {
    directory: Arc<dyn ClassDirectory>,
}

impl BeaconMatcher {
    /// Create a matcher backed by the given class directory.
    pub fn new(directory: Arc<dyn ClassDirectory>) -> Self {
        Self { directory }
    }

    /// Whether any detected UUID exactly matches a registered beacon.
    ///
    /// Absence of beacons is a normal outcome: an empty detected list or an
    /// empty registry yields `false`, never an error. Directory failures are
    /// logged and also degrade to `false` rather than aborting the check.
    #[must_use]
    pub fn is_present(&self, class_id: ClassId, detected_uuids: &[String]) -> bool {
        let registered = match self.directory.registered_beacons(class_id) {
            Ok(registered) => registered,
            Err(err) => {
                warn!(class_id, error = %err, "failed to fetch registered beacons");
                return false;
            }
        };

        let matched = detected_uuids.iter().any(|uuid| registered.contains(uuid));
        if matched {
            debug!(class_id, "beacon presence confirmed");
        }
        matched
    }
}
