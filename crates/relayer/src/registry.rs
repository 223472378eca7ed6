//! Registry for keeping track of [`ChainHandle`]s indexed by their [`PathEnd`].
//!
//! The controller only ever sees path end descriptors; the registry is how a
//! descriptor coming back across the bridge is turned into the live handle
//! the relayer already owns.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::chain::handle::ChainHandle;
use crate::path_end::PathEnd;
use crate::util::lock::{RwArc, RwLockExt};

#[derive(Debug)]
pub struct ChainRegistry<Handle> {
    handles: RwArc<HashMap<PathEnd, Handle>>,
}

impl<Handle> Default for ChainRegistry<Handle> {
    fn default() -> Self {
        Self {
            handles: RwArc::new_lock(HashMap::new()),
        }
    }
}

impl<Handle: ChainHandle> ChainRegistry<Handle> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handle` under its path end descriptor and returns that descriptor.
    ///
    /// The first handle registered for a descriptor stays: registering another
    /// handle with an identical descriptor leaves the existing entry untouched.
    pub fn register(&self, handle: &Handle) -> PathEnd {
        let path_end = handle.path_end();
        let mut handles = self.handles.acquire_write();

        if handles.contains_key(&path_end) {
            trace!(%path_end, "chain already registered");
        } else {
            debug!(%path_end, "registering chain");
            handles.insert(path_end.clone(), handle.clone());
        }

        path_end
    }

    pub fn resolve(&self, path_end: &PathEnd) -> Option<Handle> {
        self.handles.acquire_read().get(path_end).cloned()
    }

    /// Return the size of the registry, i.e., the number of distinct path ends.
    pub fn len(&self) -> usize {
        self.handles.acquire_read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::ChainRegistry;
    use crate::chain::handle::ChainHandle;
    use crate::chain::mock::{Behaviour, MockChain};
    use crate::path_end::PathEnd;
    use test_log::test;

    #[test]
    fn resolves_registered_handle() {
        let registry = ChainRegistry::new();
        let chain = MockChain::new(PathEnd::new("A").with_channel("transfer", "channel-0"));

        let path_end = registry.register(&chain);

        assert_eq!(path_end, chain.path_end());
        let resolved = registry.resolve(&path_end).expect("chain was registered");
        resolved.send_msgs(&[]).unwrap();
        assert_eq!(chain.submission_count(), 1);
    }

    #[test]
    fn first_registration_wins() {
        let registry = ChainRegistry::new();
        let first = MockChain::new(PathEnd::new("A"));
        let second = MockChain::with_behaviour(
            PathEnd::new("A"),
            Behaviour::Fail {
                reason: "second".to_string(),
            },
        );

        let first_end = registry.register(&first);
        let second_end = registry.register(&second);

        assert_eq!(first_end, second_end);
        assert_eq!(registry.len(), 1);

        let resolved = registry.resolve(&second_end).unwrap();
        assert!(resolved.send_msgs(&[]).is_ok());
        assert_eq!(first.submission_count(), 1);
        assert_eq!(second.submission_count(), 0);
    }

    #[test]
    fn unknown_descriptor_does_not_resolve() {
        let registry = ChainRegistry::<MockChain>::new();
        registry.register(&MockChain::new(PathEnd::new("A").with_client("client-0")));

        assert!(registry.resolve(&PathEnd::new("A")).is_none());
        assert!(registry.resolve(&PathEnd::new("B")).is_none());
    }
}
