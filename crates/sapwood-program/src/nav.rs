//! How a step finds its node among the siblings left over by the previous one.

/// Navigation for a single step of a block.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Nav {
    /// The node the matcher was handed. Only the first step of a top-level
    /// pattern stays.
    Stay,
    /// Any later sibling; whatever lies in between is skipped.
    #[default]
    Search,
    /// The next sibling, skipping anonymous nodes only.
    Adjacent,
}

impl Nav {
    fn strictness(self) -> u8 {
        match self {
            Self::Search => 0,
            Self::Adjacent => 1,
            Self::Stay => 2,
        }
    }

    /// Whether the gap before the node is constrained.
    pub fn is_anchored(self) -> bool {
        !matches!(self, Self::Search)
    }

    /// Combine the navigation of an enclosing step with the navigation of
    /// the first step inside it. The stricter one wins.
    pub fn restrict(self, inner: Nav) -> Nav {
        if inner.strictness() > self.strictness() {
            inner
        } else {
            self
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stay => "stay",
            Self::Search => "search",
            Self::Adjacent => "adjacent",
        }
    }
}
