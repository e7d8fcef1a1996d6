use crate::scene::NodeKey;

/// A named, ordered collection of root nodes presented to the engine.
///
/// The scene owns its roots exclusively; membership is maintained by
/// [`NodeGraph`](crate::scene::NodeGraph) together with each root's
/// [`NodeParent::Scene`](crate::scene::NodeParent::Scene) back-link.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub(crate) name: String,
    pub(crate) roots: Vec<NodeKey>,
}

impl Scene {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roots: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    #[inline]
    #[must_use]
    pub fn contains_root(&self, node: NodeKey) -> bool {
        self.roots.contains(&node)
    }

    pub(crate) fn remove_root(&mut self, node: NodeKey) -> bool {
        if let Some(pos) = self.roots.iter().position(|&r| r == node) {
            self.roots.remove(pos);
            true
        } else {
            false
        }
    }
}
