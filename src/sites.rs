//! Site location lookup table.
//!
//! Maps a parking site identifier to its geographic position. The table is
//! built once at startup and stays read-only for the lifetime of the process;
//! an unknown site identifier is a recoverable lookup miss, never a panic.
//!
//! # Example
//!
//! ```rust
//! use gatesync::sites::SiteLocationTable;
//!
//! let table = SiteLocationTable::new().with_site("test-parking", 43.0, 11.0);
//! let position = table.lookup("test-parking").unwrap();
//! assert_eq!(position.latitude, 43.0);
//! assert!(table.lookup("somewhere-else").is_none());
//! ```

use std::collections::HashMap;

/// Parking sites of the deployed installation.
///
/// Positions are stored as `(latitude, longitude)`; the transformer swaps the
/// axes when it builds the broker-facing point.
const BUILTIN_SITES: &[(&str, f64, f64)] = &[
    ("atam-off-street-parking-cadorna", 43.465313, 11.872549),
    ("atam-off-street-parking-san-donato", 43.462014, 11.864127),
    ("atam-off-street-parking-baldaccio", 43.465313, 11.872549),
    ("atam-off-street-parking-mecenate", 43.455705, 11.880767),
];

/// Geographic position of a parking site, in storage axis order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SitePosition {
    /// Latitude in decimal degrees.
    pub latitude: f64,

    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Fixed mapping from a parking site identifier to its position.
#[derive(Debug, Clone)]
pub struct SiteLocationTable {
    sites: HashMap<String, SitePosition>,
}

impl SiteLocationTable {
    /// Creates an empty table. Mostly useful in tests; production code uses
    /// [`SiteLocationTable::default`] for the deployed sites.
    pub fn new() -> Self {
        Self {
            sites: HashMap::new(),
        }
    }

    /// Adds a site, replacing any previous entry with the same identifier.
    pub fn with_site(mut self, site_id: &str, latitude: f64, longitude: f64) -> Self {
        self.sites.insert(
            site_id.to_string(),
            SitePosition {
                latitude,
                longitude,
            },
        );
        self
    }

    /// Looks up the position of a site identifier.
    ///
    /// Returns `None` when the site is not in the table; callers decide how
    /// to recover.
    pub fn lookup(&self, site_id: &str) -> Option<SitePosition> {
        self.sites.get(site_id).copied()
    }

    /// Number of sites in the table.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl Default for SiteLocationTable {
    /// The deployed site table.
    fn default() -> Self {
        let mut table = Self::new();
        for (site_id, latitude, longitude) in BUILTIN_SITES {
            table = table.with_site(site_id, *latitude, *longitude);
        }
        table
    }
}
