use crate::core::source::TextRange;

/// Stable identity of a node: its index in pre-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a function's body lives in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionBody {
    /// `{ ... }`, range covers both braces.
    Block(TextRange),
    /// Expression body of an arrow function.
    Concise(TextRange),
    /// Overload signatures and `declare` functions.
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionNode {
    /// Declared name, binding name, or the method key for class members.
    pub name: Option<String>,
    pub default_export: bool,
    /// True if the function returns or evaluates to JSX.
    pub returns_markup: bool,
    pub class_member: bool,
    pub body: FunctionBody,
    /// Range from the first to the last parameter.
    pub params: Option<TextRange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassNode {
    pub name: Option<String>,
    /// Dotted path of the `extends` expression, e.g. `React.Component`.
    pub super_class: Option<String>,
    pub has_render: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallNode {
    /// Dotted path of the callee, e.g. `t` or `this.props.t`.
    pub callee: Option<String>,
    /// Range of the only argument, when the call has exactly one.
    pub sole_argument: Option<TextRange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// `"..."` or `'...'`
    String { quote: char },
    /// Untagged template literal.
    Template,
    /// String value of a JSX attribute.
    Attribute,
    /// A run of JSX text and expression containers inside one element.
    ElementText,
}

impl LiteralKind {
    /// True if escape sequences in the raw text are decoded by the language.
    pub fn has_escapes(self) -> bool {
        matches!(self, LiteralKind::String { .. } | LiteralKind::Template)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralPart {
    /// Raw literal text, excluding quotes or backticks.
    Text(TextRange),
    /// An embedded expression: `${expr}` or `{expr}`.
    Slot {
        node: NodeId,
        /// Range including the `${`/`{` and `}` delimiters.
        outer: TextRange,
        /// Range of the expression itself.
        inner: TextRange,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralNode {
    pub kind: LiteralKind,
    pub parts: Vec<LiteralPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Module,
    Function(FunctionNode),
    Class(ClassNode),
    Call(CallNode),
    /// Import/export declarations, `require()` and `import()` calls.
    ModuleReference,
    Literal(LiteralNode),
    Slot,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub range: TextRange,
    pub parent: Option<NodeId>,
    /// One past the index of the last descendant.
    pub(crate) subtree_end: usize,
}

/// Index-based arena of the nodes the engine cares about.
///
/// Nodes are stored in pre-order so every subtree is a contiguous index range.
/// Parent links are only used for read-only ancestor walks.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Iterate over the strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// True if `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor.0 < node.0 && node.0 < self.nodes[ancestor.0].subtree_end
    }

    /// Iterate over the strict descendants of `id` in document order.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        (id.0 + 1..self.nodes[id.0].subtree_end).map(NodeId)
    }

    /// Iterate over every node in document order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(idx, node)| (NodeId(idx), node))
    }

    /// Descendant literals of `id` that have no literal ancestor below `id`.
    pub fn outermost_literals(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut idx = id.0 + 1;
        let end = self.nodes[id.0].subtree_end;
        while idx < end {
            let node = &self.nodes[idx];
            if matches!(node.kind, NodeKind::Literal(_)) {
                found.push(NodeId(idx));
                idx = node.subtree_end;
            } else {
                idx += 1;
            }
        }
        found
    }

    pub fn literal(&self, id: NodeId) -> Option<&LiteralNode> {
        match &self.nodes[id.0].kind {
            NodeKind::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    pub fn function(&self, id: NodeId) -> Option<&FunctionNode> {
        match &self.nodes[id.0].kind {
            NodeKind::Function(function) => Some(function),
            _ => None,
        }
    }
}

pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
