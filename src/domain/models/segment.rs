//! Segment Domain Model
//!
//! A segment binds a network to one transport: a VLAN tag on a physical
//! network, an overlay identifier, or a plain flat/local attachment.

use std::fmt;
use std::str::FromStr;

use super::network::NetworkId;

/// Caller-supplied or driver-resolved segment description.
///
/// Fields left as `None` by the caller may be filled in by the owning driver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentSpec {
    pub network_type: String,
    pub physical_network: Option<String>,
    pub segment_id: Option<u32>,
}

impl SegmentSpec {
    #[must_use]
    pub fn new(network_type: &str, physical_network: Option<&str>, segment_id: Option<u32>) -> Self {
        Self {
            network_type: network_type.to_string(),
            physical_network: physical_network.map(str::to_string),
            segment_id,
        }
    }

    /// Reservation key identifying this concrete segment
    #[must_use]
    pub fn key(&self) -> SegmentKey {
        SegmentKey {
            network_type: self.network_type.clone(),
            physical_network: self.physical_network.clone(),
            segment_id: self.segment_id,
        }
    }
}

/// Key under which a concrete segment is marked in-use.
///
/// At most one network may hold a reservation for a given key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentKey {
    pub network_type: String,
    pub physical_network: Option<String>,
    pub segment_id: Option<u32>,
}

impl SegmentKey {
    #[must_use]
    pub fn new(network_type: &str, physical_network: Option<&str>, segment_id: Option<u32>) -> Self {
        Self {
            network_type: network_type.to_string(),
            physical_network: physical_network.map(str::to_string),
            segment_id,
        }
    }
}

impl fmt::Display for SegmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.network_type,
            self.physical_network.as_deref().unwrap_or("-"),
            self.segment_id.map_or_else(|| "-".to_string(), |id| id.to_string())
        )
    }
}

/// Persisted binding of a network to a resolved segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSegment {
    pub network_id: NetworkId,
    pub segment_index: u32,
    pub network_type: String,
    pub physical_network: Option<String>,
    pub segment_id: Option<u32>,
    pub mtu: Option<u32>,
}

impl NetworkSegment {
    #[must_use]
    pub fn new(network_id: NetworkId, segment_index: u32, spec: SegmentSpec, mtu: Option<u32>) -> Self {
        Self {
            network_id,
            segment_index,
            network_type: spec.network_type,
            physical_network: spec.physical_network,
            segment_id: spec.segment_id,
            mtu,
        }
    }
}

/// Inclusive range of segment identifiers a driver may hand out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentRange {
    pub min: u32,
    pub max: u32,
}

impl SegmentRange {
    /// Create a range, rejecting inverted bounds
    ///
    /// # Errors
    ///
    /// Returns a message if `min > max`.
    pub fn new(min: u32, max: u32) -> Result<Self, String> {
        if min > max {
            return Err(format!("range start {min} is greater than range end {max}"));
        }
        Ok(Self { min, max })
    }
}

impl FromStr for SegmentRange {
    type Err = String;

    /// Parse `min:max`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid range '{s}', expected 'min:max'"))?;
        let min = min
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid range start in '{s}': {e}"))?;
        let max = max
            .trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid range end in '{s}': {e}"))?;
        Self::new(min, max)
    }
}

impl fmt::Display for SegmentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_range_parse() {
        let range: SegmentRange = "100:200".parse().unwrap();
        assert_eq!(range, SegmentRange { min: 100, max: 200 });
        assert_eq!(" 7 : 7 ".parse::<SegmentRange>().unwrap(), SegmentRange { min: 7, max: 7 });
    }

    #[test]
    fn test_segment_range_rejects_inverted_bounds() {
        assert!("200:100".parse::<SegmentRange>().is_err());
        assert!("abc".parse::<SegmentRange>().is_err());
        assert!("1:x".parse::<SegmentRange>().is_err());
    }

    #[test]
    fn test_segment_key_display() {
        let key = SegmentKey::new("vlan", Some("physnetA"), Some(100));
        assert_eq!(key.to_string(), "vlan/physnetA/100");

        let key = SegmentKey::new("vxlan", None, Some(5000));
        assert_eq!(key.to_string(), "vxlan/-/5000");
    }

    #[test]
    fn test_spec_key_matches_fields() {
        let spec = SegmentSpec::new("flat", Some("physnet1"), None);
        assert_eq!(spec.key(), SegmentKey::new("flat", Some("physnet1"), None));
    }
}
