//! Builds the [`SyntaxTree`] arena from an swc module in a single pre-order pass.

use std::collections::HashMap;

use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BinaryOp, BlockStmtOrExpr, CallExpr, Callee, Class, ClassDecl, ClassMember,
    ClassMethod, DefaultDecl, ExportAll, ExportDefaultDecl, ExportDefaultExpr, Expr, FnDecl,
    FnExpr, Function, ImportDecl, JSXAttr, JSXAttrValue, JSXElement, JSXElementChild, JSXExpr,
    JSXFragment, Lit, MemberProp, MethodProp, Module, NamedExport, Pat, PrivateMethod, PropName,
    ReturnStmt, Str, TaggedTpl, Tpl, TsImportEqualsDecl, VarDeclarator,
};
use swc_ecma_visit::{Visit, VisitWith};

use super::arena::{
    CallNode, ClassNode, FunctionBody, FunctionNode, LiteralKind, LiteralNode, LiteralPart, Node,
    NodeId, NodeKind, SyntaxTree,
};
use crate::core::parsers::{ParsedSource, jsx::span_to_range};
use crate::core::source::TextRange;

/// Call wrappers whose function argument takes the binding name of the call.
const COMPONENT_WRAPPERS: &[&str] = &[
    "memo",
    "forwardRef",
    "observer",
    "React.memo",
    "React.forwardRef",
];

pub fn build_tree(parsed: &ParsedSource, source: &str) -> SyntaxTree {
    let mut builder = TreeBuilder::new(source, parsed.start_pos);
    parsed.module.visit_with(&mut builder);
    builder.finish()
}

/// Naming facts about a function, registered by the parent node before the
/// function itself is visited.
#[derive(Debug, Default)]
struct FunctionMeta {
    name: Option<String>,
    default_export: bool,
    class_member: bool,
}

struct TreeBuilder<'a> {
    source: &'a str,
    start_pos: BytePos,
    nodes: Vec<Node>,
    stack: Vec<NodeId>,
    /// Enclosing function nodes, innermost last.
    functions: Vec<NodeId>,
    /// Keyed by the `lo` of the function or arrow span.
    function_meta: HashMap<BytePos, FunctionMeta>,
    /// Keyed by the `lo` of the class span.
    class_names: HashMap<BytePos, String>,
}

impl<'a> TreeBuilder<'a> {
    fn new(source: &'a str, start_pos: BytePos) -> Self {
        Self {
            source,
            start_pos,
            nodes: Vec::new(),
            stack: Vec::new(),
            functions: Vec::new(),
            function_meta: HashMap::new(),
            class_names: HashMap::new(),
        }
    }

    fn finish(mut self) -> SyntaxTree {
        if self.nodes.is_empty() {
            let root = self.open(NodeKind::Module, TextRange::new(0, self.source.len()));
            self.close(root);
        }
        SyntaxTree { nodes: self.nodes }
    }

    fn range(&self, span: Span) -> TextRange {
        span_to_range(self.start_pos, span)
    }

    fn open(&mut self, kind: NodeKind, range: TextRange) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            range,
            parent: self.stack.last().copied(),
            subtree_end: id.0 + 1,
        });
        self.stack.push(id);
        id
    }

    fn close(&mut self, id: NodeId) {
        let popped = self.stack.pop();
        debug_assert_eq!(popped, Some(id), "unbalanced tree builder");
        self.nodes[id.0].subtree_end = self.nodes.len();
    }

    fn leaf(&mut self, kind: NodeKind, range: TextRange) -> NodeId {
        let id = self.open(kind, range);
        self.close(id);
        id
    }

    fn meta_for(&mut self, lo: BytePos) -> &mut FunctionMeta {
        self.function_meta.entry(lo).or_default()
    }

    fn enter_function(
        &mut self,
        lo: BytePos,
        range: TextRange,
        body: FunctionBody,
        params: Option<TextRange>,
        returns_markup: bool,
    ) -> NodeId {
        let meta = self.function_meta.remove(&lo).unwrap_or_default();
        let id = self.open(
            NodeKind::Function(FunctionNode {
                name: meta.name,
                default_export: meta.default_export,
                returns_markup,
                class_member: meta.class_member,
                body,
                params,
            }),
            range,
        );
        self.functions.push(id);
        id
    }

    /// An anonymous callback that returns markup makes its enclosing
    /// function return markup too: `items.map(item => <li />)`.
    fn exit_function(&mut self, id: NodeId) {
        self.functions.pop();
        let transparent_markup = match &self.nodes[id.0].kind {
            NodeKind::Function(function) => {
                function.returns_markup
                    && function.name.is_none()
                    && !function.default_export
                    && !function.class_member
            }
            _ => false,
        };
        if transparent_markup {
            self.mark_returns_markup();
        }
        self.close(id);
    }

    fn params_range(&self, spans: impl Iterator<Item = Span>) -> Option<TextRange> {
        let spans: Vec<Span> = spans.collect();
        let first = spans.first()?;
        let last = spans.last()?;
        Some(TextRange::new(
            self.range(*first).start,
            self.range(*last).end,
        ))
    }

    fn add_string(&mut self, s: &Str) {
        let range = self.range(s.span);
        let quote = self.source[range.start..].chars().next().unwrap_or('"');
        let inner = TextRange::new(
            (range.start + 1).min(range.end),
            range.end.saturating_sub(1).max(range.start),
        );
        self.leaf(
            NodeKind::Literal(LiteralNode {
                kind: LiteralKind::String { quote },
                parts: vec![LiteralPart::Text(inner)],
            }),
            range,
        );
    }

    /// Records a run of JSX text and expression children as one literal.
    fn add_element_run(&mut self, run: &[JSXElementChild]) {
        let (Some(first), Some(last)) = (run.first(), run.last()) else {
            return;
        };
        let range = TextRange::new(self.range(first.span()).start, self.range(last.span()).end);
        let id = self.open(
            NodeKind::Literal(LiteralNode {
                kind: LiteralKind::ElementText,
                parts: Vec::new(),
            }),
            range,
        );

        let mut parts = Vec::with_capacity(run.len());
        for child in run {
            match child {
                JSXElementChild::JSXText(text) => {
                    parts.push(LiteralPart::Text(self.range(text.span)));
                }
                JSXElementChild::JSXExprContainer(container) => {
                    if let JSXExpr::Expr(expr) = &container.expr {
                        let inner = self.range(expr.span());
                        let slot = self.open(NodeKind::Slot, inner);
                        expr.visit_with(self);
                        self.close(slot);
                        parts.push(LiteralPart::Slot {
                            node: slot,
                            outer: self.range(container.span),
                            inner,
                        });
                    }
                }
                other => other.visit_with(self),
            }
        }

        if let NodeKind::Literal(literal) = &mut self.nodes[id.0].kind {
            literal.parts = parts;
        }
        self.close(id);
    }

    fn visit_jsx_children(&mut self, children: &[JSXElementChild]) {
        let mut idx = 0;
        while idx < children.len() {
            let run_start = idx;
            while idx < children.len() && is_run_member(&children[idx]) {
                idx += 1;
            }

            let run = &children[run_start..idx];
            if run.iter().any(|child| self.is_text_child(child)) {
                self.add_element_run(run);
            } else {
                for child in run {
                    child.visit_with(self);
                }
            }

            if let Some(child) = children.get(idx) {
                child.visit_with(self);
                idx += 1;
            }
        }
    }

    fn is_text_child(&self, child: &JSXElementChild) -> bool {
        match child {
            JSXElementChild::JSXText(text) => {
                let range = self.range(text.span);
                !self.source[range.start..range.end].trim().is_empty()
            }
            _ => false,
        }
    }

    fn mark_returns_markup(&mut self) {
        if let Some(&id) = self.functions.last()
            && let NodeKind::Function(function) = &mut self.nodes[id.0].kind
        {
            function.returns_markup = true;
        }
    }
}

fn is_run_member(child: &JSXElementChild) -> bool {
    match child {
        JSXElementChild::JSXText(_) => true,
        JSXElementChild::JSXExprContainer(container) => matches!(container.expr, JSXExpr::Expr(_)),
        _ => false,
    }
}

/// Dotted path of an expression such as `this.props.t`, if it is one.
pub(crate) fn expr_path(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::This(_) => Some("this".to_string()),
        Expr::Paren(paren) => expr_path(&paren.expr),
        Expr::Member(member) => {
            let MemberProp::Ident(prop) = &member.prop else {
                return None;
            };
            Some(format!("{}.{}", expr_path(&member.obj)?, prop.sym))
        }
        _ => None,
    }
}

/// True if evaluating `expr` can produce JSX.
fn is_markup(expr: &Expr) -> bool {
    match expr {
        Expr::JSXElement(_) | Expr::JSXFragment(_) => true,
        Expr::Paren(paren) => is_markup(&paren.expr),
        Expr::Cond(cond) => is_markup(&cond.cons) || is_markup(&cond.alt),
        Expr::Bin(bin) => {
            matches!(
                bin.op,
                BinaryOp::LogicalAnd | BinaryOp::LogicalOr | BinaryOp::NullishCoalescing
            ) && (is_markup(&bin.left) || is_markup(&bin.right))
        }
        _ => false,
    }
}

/// Span `lo` of the function an initializer defines, looking through
/// parentheses and component wrappers such as `memo(...)`.
fn function_target(expr: &Expr) -> Option<BytePos> {
    match expr {
        Expr::Arrow(arrow) => Some(arrow.span.lo),
        Expr::Fn(fn_expr) => Some(fn_expr.function.span.lo),
        Expr::Paren(paren) => function_target(&paren.expr),
        Expr::Call(call) => {
            let Callee::Expr(callee) = &call.callee else {
                return None;
            };
            let path = expr_path(callee)?;
            if !COMPONENT_WRAPPERS.contains(&path.as_str()) {
                return None;
            }
            function_target(&call.args.first()?.expr)
        }
        _ => None,
    }
}

fn prop_name(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => s.value.as_str().map(|s| s.to_string()),
        _ => None,
    }
}

fn is_module_call(call: &CallExpr) -> bool {
    match &call.callee {
        Callee::Import(_) => true,
        Callee::Expr(expr) => matches!(&**expr, Expr::Ident(ident) if ident.sym.as_str() == "require"),
        Callee::Super(_) => false,
    }
}

impl Visit for TreeBuilder<'_> {
    fn visit_module(&mut self, node: &Module) {
        let root = self.open(NodeKind::Module, TextRange::new(0, self.source.len()));
        node.visit_children_with(self);
        self.close(root);
    }

    // ============================================================
    // Literals
    // ============================================================

    fn visit_expr(&mut self, node: &Expr) {
        match node {
            Expr::Lit(Lit::Str(s)) => self.add_string(s),
            _ => node.visit_children_with(self),
        }
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        let range = self.range(node.span);
        let id = self.open(
            NodeKind::Literal(LiteralNode {
                kind: LiteralKind::Template,
                parts: Vec::new(),
            }),
            range,
        );

        let mut parts = Vec::with_capacity(node.exprs.len() * 2 + 1);
        let mut cursor = (range.start + 1).min(range.end);
        for expr in &node.exprs {
            let inner = self.range(expr.span());
            let slot_start = self.source[cursor..inner.start]
                .rfind("${")
                .map(|idx| cursor + idx)
                .unwrap_or(inner.start);
            let slot_end = self.source[inner.end..]
                .find('}')
                .map(|idx| inner.end + idx + 1)
                .unwrap_or(inner.end);

            parts.push(LiteralPart::Text(TextRange::new(cursor, slot_start)));
            let slot = self.open(NodeKind::Slot, inner);
            expr.visit_with(self);
            self.close(slot);
            parts.push(LiteralPart::Slot {
                node: slot,
                outer: TextRange::new(slot_start, slot_end),
                inner,
            });
            cursor = slot_end;
        }
        let text_end = range.end.saturating_sub(1).max(cursor);
        parts.push(LiteralPart::Text(TextRange::new(cursor, text_end)));

        if let NodeKind::Literal(literal) = &mut self.nodes[id.0].kind {
            literal.parts = parts;
        }
        self.close(id);
    }

    fn visit_tagged_tpl(&mut self, node: &TaggedTpl) {
        // Tagged templates are not translatable text, but their expressions are code.
        node.tag.visit_with(self);
        for expr in &node.tpl.exprs {
            expr.visit_with(self);
        }
    }

    fn visit_jsx_attr(&mut self, node: &JSXAttr) {
        match &node.value {
            Some(JSXAttrValue::Str(s)) => {
                let range = self.range(s.span);
                let inner = TextRange::new(
                    (range.start + 1).min(range.end),
                    range.end.saturating_sub(1).max(range.start),
                );
                self.leaf(
                    NodeKind::Literal(LiteralNode {
                        kind: LiteralKind::Attribute,
                        parts: vec![LiteralPart::Text(inner)],
                    }),
                    range,
                );
            }
            _ => node.visit_children_with(self),
        }
    }

    fn visit_jsx_element(&mut self, node: &JSXElement) {
        node.opening.visit_with(self);
        self.visit_jsx_children(&node.children);
        if let Some(closing) = &node.closing {
            closing.visit_with(self);
        }
    }

    fn visit_jsx_fragment(&mut self, node: &JSXFragment) {
        self.visit_jsx_children(&node.children);
    }

    // ============================================================
    // Functions and classes
    // ============================================================

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        let name = node.ident.sym.to_string();
        self.meta_for(node.function.span.lo).name = Some(name);
        node.function.visit_with(self);
    }

    fn visit_fn_expr(&mut self, node: &FnExpr) {
        if let Some(ident) = &node.ident {
            let meta = self.meta_for(node.function.span.lo);
            meta.name.get_or_insert_with(|| ident.sym.to_string());
        }
        node.function.visit_with(self);
    }

    fn visit_function(&mut self, node: &Function) {
        let body = match &node.body {
            Some(block) => FunctionBody::Block(self.range(block.span)),
            None => FunctionBody::None,
        };
        let params = self.params_range(node.params.iter().map(|param| param.span));
        let id = self.enter_function(node.span.lo, self.range(node.span), body, params, false);
        node.visit_children_with(self);
        self.exit_function(id);
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        let (body, returns_markup) = match &*node.body {
            BlockStmtOrExpr::BlockStmt(block) => (FunctionBody::Block(self.range(block.span)), false),
            BlockStmtOrExpr::Expr(expr) => {
                (FunctionBody::Concise(self.range(expr.span())), is_markup(expr))
            }
        };
        let params = self.params_range(node.params.iter().map(|pat| pat.span()));
        let id = self.enter_function(
            node.span.lo,
            self.range(node.span),
            body,
            params,
            returns_markup,
        );
        node.visit_children_with(self);
        self.exit_function(id);
    }

    fn visit_class_method(&mut self, node: &ClassMethod) {
        let meta = self.meta_for(node.function.span.lo);
        meta.name = prop_name(&node.key);
        meta.class_member = true;
        node.visit_children_with(self);
    }

    fn visit_private_method(&mut self, node: &PrivateMethod) {
        let meta = self.meta_for(node.function.span.lo);
        meta.name = Some(format!("#{}", node.key.name));
        meta.class_member = true;
        node.visit_children_with(self);
    }

    fn visit_method_prop(&mut self, node: &MethodProp) {
        self.meta_for(node.function.span.lo).name = prop_name(&node.key);
        node.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, node: &ClassDecl) {
        self.class_names
            .insert(node.class.span.lo, node.ident.sym.to_string());
        node.class.visit_with(self);
    }

    fn visit_class(&mut self, node: &Class) {
        let has_render = node.body.iter().any(|member| match member {
            ClassMember::Method(method) => prop_name(&method.key).as_deref() == Some("render"),
            _ => false,
        });
        let name = self.class_names.remove(&node.span.lo);
        let id = self.open(
            NodeKind::Class(ClassNode {
                name,
                super_class: node.super_class.as_deref().and_then(expr_path),
                has_render,
            }),
            self.range(node.span),
        );
        node.visit_children_with(self);
        self.close(id);
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if let Pat::Ident(binding) = &node.name
            && let Some(init) = &node.init
        {
            let name = binding.id.sym.to_string();
            if let Some(lo) = function_target(init) {
                self.meta_for(lo).name.get_or_insert(name);
            } else if let Expr::Class(class) = &**init {
                self.class_names.entry(class.class.span.lo).or_insert(name);
            }
        }
        node.visit_children_with(self);
    }

    fn visit_export_default_decl(&mut self, node: &ExportDefaultDecl) {
        if let DefaultDecl::Fn(fn_expr) = &node.decl {
            self.meta_for(fn_expr.function.span.lo).default_export = true;
        }
        node.visit_children_with(self);
    }

    fn visit_export_default_expr(&mut self, node: &ExportDefaultExpr) {
        if let Some(lo) = function_target(&node.expr) {
            self.meta_for(lo).default_export = true;
        }
        node.visit_children_with(self);
    }

    fn visit_return_stmt(&mut self, node: &ReturnStmt) {
        if node.arg.as_deref().is_some_and(is_markup) {
            self.mark_returns_markup();
        }
        node.visit_children_with(self);
    }

    // ============================================================
    // Calls and module references
    // ============================================================

    fn visit_call_expr(&mut self, node: &CallExpr) {
        let range = self.range(node.span);
        if is_module_call(node) {
            let id = self.open(NodeKind::ModuleReference, range);
            node.visit_children_with(self);
            self.close(id);
            return;
        }

        let callee = match &node.callee {
            Callee::Expr(expr) => expr_path(expr),
            _ => None,
        };
        let sole_argument = match node.args.as_slice() {
            [arg] if arg.spread.is_none() => Some(self.range(arg.expr.span())),
            _ => None,
        };
        let id = self.open(
            NodeKind::Call(CallNode {
                callee,
                sole_argument,
            }),
            range,
        );
        node.visit_children_with(self);
        self.close(id);
    }

    fn visit_import_decl(&mut self, node: &ImportDecl) {
        self.leaf(NodeKind::ModuleReference, self.range(node.span));
    }

    fn visit_named_export(&mut self, node: &NamedExport) {
        self.leaf(NodeKind::ModuleReference, self.range(node.span));
    }

    fn visit_export_all(&mut self, node: &ExportAll) {
        self.leaf(NodeKind::ModuleReference, self.range(node.span));
    }

    fn visit_ts_import_equals_decl(&mut self, node: &TsImportEqualsDecl) {
        self.leaf(NodeKind::ModuleReference, self.range(node.span));
    }
}
