//! Network Dict Extender
//!
//! Attaches provider attributes, projected from persisted segments, to the
//! outward representation of internal networks. External networks have no
//! segments and are passed through untouched.

use std::sync::Arc;

use super::classifier::is_external;
use crate::domain::gateways::NetworkStore;
use crate::domain::models::network::{NetworkId, NetworkView};
use crate::domain::models::segment::{NetworkSegment, SegmentSpec};
use crate::shared::errors::RepositoryError;

pub struct NetworkDictExtender {
    store: Arc<dyn NetworkStore>,
}

impl NetworkDictExtender {
    #[must_use]
    pub fn new(store: Arc<dyn NetworkStore>) -> Self {
        Self { store }
    }

    /// Extend `networks` in place, preserving their order.
    ///
    /// The store is not queried at all when every input network is external.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if reading segments fails.
    pub async fn extend_networks_dict_provider(
        &self,
        mut networks: Vec<NetworkView>,
    ) -> Result<Vec<NetworkView>, RepositoryError> {
        let internal: Vec<NetworkId> = networks
            .iter()
            .filter(|view| !is_external(*view))
            .map(|view| *view.network.id())
            .collect();
        if internal.is_empty() {
            return Ok(networks);
        }

        let mut segments = self.store.find_segments(&internal).await?;
        for view in networks.iter_mut().filter(|view| !is_external(*view)) {
            if let Some(network_segments) = segments.remove(view.network.id()) {
                project_provider_attributes(view, network_segments);
            }
        }

        Ok(networks)
    }
}

fn project_provider_attributes(view: &mut NetworkView, segments: Vec<NetworkSegment>) {
    let mut specs: Vec<SegmentSpec> = segments
        .into_iter()
        .map(|segment| SegmentSpec {
            network_type: segment.network_type,
            physical_network: segment.physical_network,
            segment_id: segment.segment_id,
        })
        .collect();

    if specs.len() == 1 {
        view.provider = specs.pop();
        view.segments.clear();
    } else {
        view.provider = None;
        view.segments = specs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::gateways::network_store::MockNetworkStore;
    use crate::domain::models::network::{CreateNetworkData, Network};
    use std::collections::HashMap;

    fn view(name: &str, external: Option<bool>) -> NetworkView {
        NetworkView::from(Network::new(&CreateNetworkData {
            name: name.to_string(),
            tenant_id: "tenant".to_string(),
            external,
            segments: vec![],
        }))
    }

    fn segment(network_id: NetworkId, index: u32, spec: SegmentSpec) -> NetworkSegment {
        NetworkSegment::new(network_id, index, spec, Some(1500))
    }

    #[tokio::test]
    async fn should_not_query_store_when_all_networks_are_external() {
        let mut store = MockNetworkStore::new();
        store.expect_find_segments().never();
        let extender = NetworkDictExtender::new(Arc::new(store));

        let input = vec![view("ext1", Some(true)), view("ext2", Some(true))];
        let output = extender
            .extend_networks_dict_provider(input.clone())
            .await
            .unwrap();

        assert_eq!(output, input);
    }

    #[tokio::test]
    async fn should_not_query_store_for_empty_input() {
        let mut store = MockNetworkStore::new();
        store.expect_find_segments().never();
        let extender = NetworkDictExtender::new(Arc::new(store));

        let output = extender.extend_networks_dict_provider(vec![]).await.unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn should_extend_only_internal_networks() {
        let external = view("ext", Some(true));
        let unset = view("unset", None);
        let internal = view("internal", Some(false));
        let (unset_id, internal_id, external_id) =
            (*unset.network.id(), *internal.network.id(), *external.network.id());

        let mut store = MockNetworkStore::new();
        store
            .expect_find_segments()
            .times(1)
            .withf(move |ids| ids.to_vec() == vec![unset_id, internal_id])
            .returning(move |_| {
                let mut segments = HashMap::new();
                segments.insert(
                    unset_id,
                    vec![segment(unset_id, 0, SegmentSpec::new("vlan", Some("physnetA"), Some(100)))],
                );
                segments.insert(
                    internal_id,
                    vec![segment(internal_id, 0, SegmentSpec::new("vxlan", None, Some(5000)))],
                );
                // never requested, must never be attached
                segments.insert(
                    external_id,
                    vec![segment(external_id, 0, SegmentSpec::new("vlan", Some("physnetA"), Some(1)))],
                );
                Ok(segments)
            });
        let extender = NetworkDictExtender::new(Arc::new(store));

        let output = extender
            .extend_networks_dict_provider(vec![external, unset, internal])
            .await
            .unwrap();

        assert_eq!(output[0].network.name(), "ext");
        assert_eq!(output[0].provider, None);
        assert!(output[0].segments.is_empty());
        assert_eq!(
            output[1].provider,
            Some(SegmentSpec::new("vlan", Some("physnetA"), Some(100)))
        );
        assert_eq!(output[2].provider, Some(SegmentSpec::new("vxlan", None, Some(5000))));
    }

    #[tokio::test]
    async fn should_expose_multiple_segments_as_list() {
        let internal = view("multi", None);
        let id = *internal.network.id();

        let mut store = MockNetworkStore::new();
        store.expect_find_segments().returning(move |_| {
            let mut segments = HashMap::new();
            segments.insert(
                id,
                vec![
                    segment(id, 0, SegmentSpec::new("vlan", Some("physnetA"), Some(100))),
                    segment(id, 1, SegmentSpec::new("vxlan", None, Some(5000))),
                ],
            );
            Ok(segments)
        });
        let extender = NetworkDictExtender::new(Arc::new(store));

        let output = extender
            .extend_networks_dict_provider(vec![internal])
            .await
            .unwrap();

        assert_eq!(output[0].provider, None);
        assert_eq!(
            output[0].segments,
            vec![
                SegmentSpec::new("vlan", Some("physnetA"), Some(100)),
                SegmentSpec::new("vxlan", None, Some(5000)),
            ]
        );
    }
}
