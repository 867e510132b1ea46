//! Storage backend traits.

use crate::collection::Collection;
use crate::error::StoreError;
use crate::EntityJson;

/// Persisted server state, as seen by the section codecs.
///
/// Implementations must be safe to share between concurrent import and
/// export calls; they are not required to isolate those calls from each
/// other.
pub trait StateStore: Send + Sync {
    /// Adds one entity to a collection.
    fn insert(&self, collection: Collection, entity: EntityJson) -> Result<(), StoreError>;

    /// Calls `visit` for every entity of a collection, in insertion order.
    ///
    /// Stops at the first error returned by `visit`. Implementations should
    /// not hold locks that block [`insert`](Self::insert) while `visit`
    /// runs, since export visitors write to a remote sink.
    fn visit(
        &self,
        collection: Collection,
        visit: &mut dyn FnMut(&EntityJson) -> Result<(), StoreError>,
    ) -> Result<(), StoreError>;

    /// Number of entities in a collection.
    fn len(&self, collection: Collection) -> usize;

    /// Returns true if no collection holds any entity.
    fn is_empty(&self) -> bool {
        Collection::ALL.iter().all(|c| self.len(*c) == 0)
    }
}
