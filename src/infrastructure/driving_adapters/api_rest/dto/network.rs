//! Network DTOs
//!
//! Data transfer objects for network API endpoints. Provider attributes use
//! the `provider:` key prefix and the external flag is `router:external`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::application::segments::is_external;
use crate::domain::models::network::{CreateNetworkData, NetworkView};
use crate::domain::models::segment::SegmentSpec;

lazy_static! {
    /// Printable network names: a leading alphanumeric, then alphanumerics, space, `.`, `_`, `-`
    static ref NETWORK_NAME_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 ._-]*$").expect("valid regex");

    /// Network type identifiers such as `vlan` or `vxlan`
    static ref NETWORK_TYPE_REGEX: Regex = Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid regex");
}

fn validate_network_name(name: &str) -> Result<(), ValidationError> {
    if NETWORK_NAME_REGEX.is_match(name) {
        Ok(())
    } else {
        let mut error = ValidationError::new("network_name");
        error.message = Some(
            "name must start with a letter or digit and contain only letters, digits, spaces, '.', '_' or '-'"
                .into(),
        );
        Err(error)
    }
}

fn validate_network_type(network_type: &str) -> Result<(), ValidationError> {
    if NETWORK_TYPE_REGEX.is_match(network_type) {
        Ok(())
    } else {
        let mut error = ValidationError::new("network_type");
        error.message = Some("network_type must be a lowercase identifier".into());
        Err(error)
    }
}

/// Interpret a loosely-typed `router:external` value.
///
/// Booleans map directly, numbers are true when non-zero and the strings
/// `"true"`/`"false"` are accepted in any case. Anything else is unset.
#[must_use]
pub fn parse_external_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(number) => number.as_f64().map(|n| n != 0.0),
        Value::String(text) if text.eq_ignore_ascii_case("true") => Some(true),
        Value::String(text) if text.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// One entry of a multi-segment network
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Validate)]
pub struct SegmentDto {
    #[serde(rename = "provider:network_type")]
    #[validate(length(min = 1, max = 32, message = "network_type must be between 1 and 32 characters"))]
    #[validate(custom(function = "validate_network_type"))]
    pub network_type: String,

    #[serde(rename = "provider:physical_network", default)]
    #[validate(length(min = 1, max = 64, message = "physical_network must be between 1 and 64 characters"))]
    pub physical_network: Option<String>,

    #[serde(rename = "provider:segmentation_id", default)]
    pub segmentation_id: Option<u32>,
}

impl From<SegmentDto> for SegmentSpec {
    fn from(dto: SegmentDto) -> Self {
        Self {
            network_type: dto.network_type,
            physical_network: dto.physical_network,
            segment_id: dto.segmentation_id,
        }
    }
}

impl From<SegmentSpec> for SegmentDto {
    fn from(spec: SegmentSpec) -> Self {
        Self {
            network_type: spec.network_type,
            physical_network: spec.physical_network,
            segmentation_id: spec.segment_id,
        }
    }
}

/// DTO for creating a new network
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "validate_provider_attributes"))]
pub struct CreateNetworkDto {
    #[validate(length(min = 1, max = 255, message = "name must be between 1 and 255 characters"))]
    #[validate(custom(function = "validate_network_name"))]
    pub name: String,

    #[serde(rename = "router:external", default)]
    pub router_external: Option<Value>,

    #[serde(rename = "provider:network_type", default)]
    #[validate(length(min = 1, max = 32, message = "network_type must be between 1 and 32 characters"))]
    #[validate(custom(function = "validate_network_type"))]
    pub provider_network_type: Option<String>,

    #[serde(rename = "provider:physical_network", default)]
    #[validate(length(min = 1, max = 64, message = "physical_network must be between 1 and 64 characters"))]
    pub provider_physical_network: Option<String>,

    #[serde(rename = "provider:segmentation_id", default)]
    pub provider_segmentation_id: Option<u32>,

    #[serde(default)]
    #[validate(length(max = 16, message = "segments can have at most 16 items"))]
    #[validate(nested)]
    pub segments: Vec<SegmentDto>,
}

/// Single provider attributes and `segments` are mutually exclusive and a
/// segment may not be listed twice.
fn validate_provider_attributes(dto: &CreateNetworkDto) -> Result<(), ValidationError> {
    let has_single = dto.provider_network_type.is_some()
        || dto.provider_physical_network.is_some()
        || dto.provider_segmentation_id.is_some();

    if has_single && !dto.segments.is_empty() {
        let mut error = ValidationError::new("provider_attributes");
        error.message = Some("provider attributes and segments cannot both be set".into());
        return Err(error);
    }
    if has_single && dto.provider_network_type.is_none() {
        let mut error = ValidationError::new("provider_attributes");
        error.message = Some("provider:network_type is required with other provider attributes".into());
        return Err(error);
    }

    let mut seen = HashSet::with_capacity(dto.segments.len());
    if !dto.segments.iter().all(|segment| seen.insert(segment)) {
        let mut error = ValidationError::new("segments");
        error.message = Some("duplicate segment found in segments list".into());
        return Err(error);
    }
    Ok(())
}

impl CreateNetworkDto {
    /// The external flag, if the request carried a recognizable one
    #[must_use]
    pub fn external(&self) -> Option<bool> {
        self.router_external.as_ref().and_then(parse_external_flag)
    }

    /// Convert into domain input for `tenant_id`. Call after `validate()`.
    #[must_use]
    pub fn into_create_data(self, tenant_id: String) -> CreateNetworkData {
        let external = self.external();
        let segments = match self.provider_network_type {
            Some(network_type) => vec![SegmentSpec {
                network_type,
                physical_network: self.provider_physical_network,
                segment_id: self.provider_segmentation_id,
            }],
            None => self.segments.into_iter().map(SegmentSpec::from).collect(),
        };

        CreateNetworkData {
            name: self.name,
            tenant_id,
            external,
            segments,
        }
    }
}

/// Network response DTO
#[derive(Debug, Clone, Serialize)]
pub struct NetworkResponseDto {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    #[serde(rename = "router:external")]
    pub router_external: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(flatten)]
    pub provider: Option<SegmentDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub segments: Vec<SegmentDto>,
    pub created_at: DateTime<Utc>,
}

impl From<NetworkView> for NetworkResponseDto {
    fn from(view: NetworkView) -> Self {
        let router_external = is_external(&view);
        let NetworkView {
            network,
            provider,
            segments,
        } = view;

        Self {
            id: network.id().to_string(),
            tenant_id: network.tenant_id().to_string(),
            name: network.name().to_string(),
            router_external,
            mtu: network.mtu(),
            provider: provider.map(SegmentDto::from),
            segments: segments.into_iter().map(SegmentDto::from).collect(),
            created_at: network.created_at(),
        }
    }
}
