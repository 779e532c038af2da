//! External Network Classifier
//!
//! External networks represent connectivity outside the managed domain and
//! never receive segments.

use crate::domain::models::network::ExternalAttribute;

/// True only when the external attribute is present and set.
/// Unset or false attributes classify the network as internal.
#[must_use]
pub fn is_external<N: ExternalAttribute + ?Sized>(network: &N) -> bool {
    matches!(network.external_attr(), Some(true))
}
