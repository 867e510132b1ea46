//! Default registry wiring.

use crate::codec::StoreCodec;
use crate::collection::Collection;
use crate::traits::StateStore;
use idp_data_core::{
    RegistryError, VersionRegistry, MITREID_CONNECT_1_0, MITREID_CONNECT_1_1, MITREID_CONNECT_1_2,
};
use std::sync::Arc;

/// Builds the registry of every supported version over one store.
///
/// Versions 1.0 and 1.1 are import-only; 1.2 is current and exports every
/// collection.
pub fn default_registry(store: Arc<dyn StateStore>) -> Result<VersionRegistry, RegistryError> {
    VersionRegistry::builder()
        .register(Arc::new(StoreCodec::new(
            MITREID_CONNECT_1_0,
            &Collection::ALL,
            Arc::clone(&store),
        )))
        .register(Arc::new(StoreCodec::new(
            MITREID_CONNECT_1_1,
            &Collection::ALL,
            Arc::clone(&store),
        )))
        .register(Arc::new(
            StoreCodec::new(MITREID_CONNECT_1_2, &Collection::ALL, store).exporting(),
        ))
        .current(MITREID_CONNECT_1_2)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use idp_data_core::{SectionCodec, SUPPORTED_VERSIONS};

    #[test]
    fn test_default_registry_binds_every_version() {
        let registry = default_registry(Arc::new(MemoryStore::new())).unwrap();
        for version in SUPPORTED_VERSIONS {
            assert!(registry.contains(version), "missing {version}");
        }
        assert_eq!(registry.current_version(), MITREID_CONNECT_1_2);
        assert_eq!(registry.exporter().version(), MITREID_CONNECT_1_2);
    }
}
