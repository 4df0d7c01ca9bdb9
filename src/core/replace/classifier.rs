//! Context classification of literal candidates.

use std::collections::HashMap;

use crate::core::policy::{ContextKind, ContextPolicy, FrameworkPolicy, Requirements};
use crate::core::tree::{ClassNode, FunctionNode, NodeId, NodeKind, SyntaxTree};
use crate::utils::{is_hook_name, is_pascal_case};

/// Classify a function by naming convention and shape.
pub fn classify_function(function: &FunctionNode) -> ContextKind {
    let named_component = function.name.as_deref().is_some_and(is_pascal_case);
    if function.returns_markup && (named_component || function.default_export) {
        return ContextKind::Component;
    }
    if function.name.as_deref().is_some_and(is_hook_name) {
        return ContextKind::CustomHook;
    }
    ContextKind::PlainFunction
}

fn classify_class(class: &ClassNode, framework: &FrameworkPolicy) -> ContextKind {
    let is_component = class
        .super_class
        .as_deref()
        .is_some_and(|base| framework.is_component_base(base));
    if is_component && class.has_render {
        ContextKind::ClassComponent
    } else {
        ContextKind::PlainFunction
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: ContextKind,
    /// Function or class that decided the context, `None` at module level.
    pub owner: Option<NodeId>,
}

/// Walks ancestor links to the nearest deciding function or class.
///
/// Class members and anonymous callbacks are transparent: a literal inside
/// `items.map(item => ...)` belongs to whatever encloses the callback.
/// Results are memoized per owner and policies per context kind.
pub struct ContextClassifier<'a> {
    tree: &'a SyntaxTree,
    framework: &'a FrameworkPolicy,
    owners: HashMap<NodeId, ContextKind>,
    policies: HashMap<ContextKind, ContextPolicy>,
    requirements: Requirements,
}

impl<'a> ContextClassifier<'a> {
    pub fn new(tree: &'a SyntaxTree, framework: &'a FrameworkPolicy) -> Self {
        Self {
            tree,
            framework,
            owners: HashMap::new(),
            policies: HashMap::new(),
            requirements: Requirements::default(),
        }
    }

    fn owner_of(&self, node: NodeId) -> Option<NodeId> {
        self.tree
            .ancestors(node)
            .find(|&id| match &self.tree.node(id).kind {
                NodeKind::Function(function) => {
                    !function.class_member && (function.name.is_some() || function.default_export)
                }
                NodeKind::Class(_) => true,
                _ => false,
            })
    }

    pub fn classify(&mut self, node: NodeId) -> Classification {
        let Some(owner) = self.owner_of(node) else {
            return Classification {
                kind: ContextKind::ModuleLevel,
                owner: None,
            };
        };

        if let Some(&kind) = self.owners.get(&owner) {
            return Classification {
                kind,
                owner: Some(owner),
            };
        }

        let kind = match &self.tree.node(owner).kind {
            NodeKind::Function(function) => classify_function(function),
            NodeKind::Class(class) => classify_class(class, self.framework),
            _ => ContextKind::ModuleLevel,
        };
        self.owners.insert(owner, kind);
        Classification {
            kind,
            owner: Some(owner),
        }
    }

    pub fn policy(&mut self, kind: ContextKind) -> &ContextPolicy {
        let framework = self.framework;
        self.policies
            .entry(kind)
            .or_insert_with(|| framework.resolve(kind))
    }

    /// Record the imports and setup calls `kind` needs. Called once a call has
    /// actually been synthesized in that context.
    pub fn require(&mut self, kind: ContextKind) {
        let policy = self.policy(kind).clone();
        self.requirements.add(&policy);
    }

    pub fn into_requirements(self) -> Requirements {
        self.requirements
    }
}
