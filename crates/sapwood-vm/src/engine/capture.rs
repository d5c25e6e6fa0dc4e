use sapwood_program::CaptureId;
use sapwood_syntax::Node;

/// A node bound to a capture name by a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capture<'q, 't> {
    pub node: Node<'t>,
    pub index: CaptureId,
    /// Name without the `@`.
    pub name: &'q str,
}

/// One solution of one pattern.
///
/// Captures are ordered by node position, outer nodes before the nodes they
/// contain, then by capture index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryMatch<'q, 't> {
    pub pattern_index: usize,
    pub captures: Vec<Capture<'q, 't>>,
}

impl<'q, 't> QueryMatch<'q, 't> {
    /// Nodes bound to `index`, in order. Quantified captures bind several.
    pub fn nodes_for_capture(&self, index: CaptureId) -> impl Iterator<Item = Node<'t>> + '_ {
        self.captures
            .iter()
            .filter(move |c| c.index == index)
            .map(|c| c.node)
    }

    /// First node bound to the capture called `name`.
    pub fn capture(&self, name: &str) -> Option<Node<'t>> {
        let name = name.strip_prefix('@').unwrap_or(name);
        self.captures.iter().find(|c| c.name == name).map(|c| c.node)
    }
}
