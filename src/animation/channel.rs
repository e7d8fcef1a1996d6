use crate::animation::sampler::AnimationOutput;
use crate::scene::NodeKey;

/// Node property a channel writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

impl TargetPath {
    /// Whether `output` carries the value kind this property takes.
    #[must_use]
    pub fn accepts(self, output: &AnimationOutput) -> bool {
        matches!(
            (self, output),
            (TargetPath::Translation | TargetPath::Scale, AnimationOutput::Vec3(_))
                | (TargetPath::Rotation, AnimationOutput::Quat(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Target {
    pub node: NodeKey,
    pub path: TargetPath,
}

/// Binds the sampler at index `sampler` of its animation to `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel {
    pub sampler: usize,
    pub target: Target,
}

impl Channel {
    #[must_use]
    pub fn new(sampler: usize, node: NodeKey, path: TargetPath) -> Self {
        Self {
            sampler,
            target: Target { node, path },
        }
    }
}
