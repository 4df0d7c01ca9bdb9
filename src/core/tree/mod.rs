//! Syntax tree arena.
//!
//! The swc AST is walked once and the nodes the replacement engine needs
//! (functions, classes, calls, module references, literal candidates and their
//! embedded expression slots) are copied into a flat, pre-order arena. Nodes
//! are identified by [`NodeId`]; ancestor checks are index comparisons.

mod arena;
mod builder;

pub use arena::{
    CallNode, ClassNode, FunctionBody, FunctionNode, LiteralKind, LiteralNode, LiteralPart, Node,
    NodeId, NodeKind, SyntaxTree,
};
pub use builder::build_tree;
pub(crate) use builder::expr_path;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use swc_common::SourceMap;

    use super::*;
    use crate::core::parsers::parse_source;

    fn tree(code: &str, path: &str) -> SyntaxTree {
        let parsed = parse_source(code.to_string(), path, Arc::new(SourceMap::default())).unwrap();
        build_tree(&parsed, code)
    }

    fn functions(tree: &SyntaxTree) -> Vec<&FunctionNode> {
        tree.iter()
            .filter_map(|(id, _)| tree.function(id))
            .collect()
    }

    fn literals(tree: &SyntaxTree) -> Vec<(NodeId, &LiteralNode)> {
        tree.iter()
            .filter_map(|(id, _)| tree.literal(id).map(|lit| (id, lit)))
            .collect()
    }

    #[test]
    fn test_root_covers_source() {
        let code = "const a = 1;\n";
        let tree = tree(code, "a.ts");
        let root = tree.node(NodeId::ROOT);
        assert_eq!(root.kind, NodeKind::Module);
        assert_eq!(root.range.end, code.len());
    }

    #[test]
    fn test_function_names() {
        let code = r#"
            function Plain() {}
            const Arrow = () => <div />;
            const Memo = memo(() => <span />);
            const Ref = React.forwardRef(function Inner(props, ref) { return <b ref={ref} />; });
            export default function () { return null; }
        "#;
        let tree = tree(code, "names.jsx");
        let functions = functions(&tree);

        let names: Vec<Option<&str>> = functions.iter().map(|f| f.name.as_deref()).collect();
        assert_eq!(
            names,
            vec![Some("Plain"), Some("Arrow"), Some("Memo"), Some("Ref"), None]
        );

        assert!(!functions[0].returns_markup);
        assert!(functions[1].returns_markup);
        assert!(functions[2].returns_markup);
        assert!(functions[3].returns_markup);
        assert!(functions[4].default_export);
    }

    #[test]
    fn test_conditional_return_counts_as_markup() {
        let code = "function Item({ ok }) { if (!ok) return null; return ok ? <p /> : <span />; }";
        let tree = tree(code, "a.jsx");
        assert!(functions(&tree)[0].returns_markup);
    }

    #[test]
    fn test_markup_from_callback_counts_for_owner() {
        let code = r#"
            function List({ items }) { return items.map(item => <li>{item}</li>); }
            function names(items) { return items.map(item => item.name); }
        "#;
        let tree = tree(code, "list.jsx");
        let functions = functions(&tree);
        assert_eq!(functions[0].name.as_deref(), Some("List"));
        assert!(functions[0].returns_markup);
        assert!(!functions[2].returns_markup);
    }

    #[test]
    fn test_class_members() {
        let code = r#"
            class Page extends React.Component {
                render() { return <div />; }
            }
        "#;
        let tree = tree(code, "page.jsx");
        let class = tree
            .iter()
            .find_map(|(_, node)| match &node.kind {
                NodeKind::Class(class) => Some(class),
                _ => None,
            })
            .unwrap();

        assert_eq!(class.name.as_deref(), Some("Page"));
        assert_eq!(class.super_class.as_deref(), Some("React.Component"));
        assert!(class.has_render);

        let render = functions(&tree)[0];
        assert_eq!(render.name.as_deref(), Some("render"));
        assert!(render.class_member);
    }

    #[test]
    fn test_string_literal_parts() {
        let code = "const m = '___Hello___';";
        let tree = tree(code, "a.ts");
        let literals = literals(&tree);

        assert_eq!(literals.len(), 1);
        let (id, literal) = literals[0];
        assert_eq!(literal.kind, LiteralKind::String { quote: '\'' });
        assert_eq!(&code[tree.node(id).range.start..tree.node(id).range.end], "'___Hello___'");
        match literal.parts[0] {
            LiteralPart::Text(range) => assert_eq!(&code[range.start..range.end], "___Hello___"),
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[test]
    fn test_template_slots() {
        let code = "const m = `___Hi ${ user.name } and ${count}___`;";
        let tree = tree(code, "a.ts");
        let (_, literal) = literals(&tree)[0];

        let rendered: Vec<&str> = literal
            .parts
            .iter()
            .map(|part| match part {
                LiteralPart::Text(range) => &code[range.start..range.end],
                LiteralPart::Slot { outer, .. } => &code[outer.start..outer.end],
            })
            .collect();
        assert_eq!(
            rendered,
            vec!["___Hi ", "${ user.name }", " and ", "${count}", "___"]
        );

        if let LiteralPart::Slot { inner, .. } = literal.parts[1] {
            assert_eq!(&code[inner.start..inner.end], "user.name");
        }
    }

    #[test]
    fn test_tagged_template_is_not_a_literal() {
        let code = "const q = sql`___select___ ${'___inner___'}`;";
        let tree = tree(code, "a.ts");
        let literals = literals(&tree);
        assert_eq!(literals.len(), 1);
        assert!(matches!(literals[0].1.kind, LiteralKind::String { .. }));
    }

    #[test]
    fn test_element_text_runs() {
        let code = "const a = <p>\n  ___A___ {name} ___B___\n  <b>bold</b>\n  {icon}\n</p>;";
        let tree = tree(code, "a.jsx");
        let runs: Vec<(NodeId, &LiteralNode)> = literals(&tree)
            .into_iter()
            .filter(|(_, lit)| lit.kind == LiteralKind::ElementText)
            .collect();

        // `<p>` holds one run before `<b>`, `<b>` holds "bold"; the trailing
        // `{icon}` run has no text and is not a candidate.
        assert_eq!(runs.len(), 2);
        let (first_id, first) = runs[0];
        assert_eq!(first.parts.len(), 3);
        let range = tree.node(first_id).range;
        assert_eq!(&code[range.start..range.end], "\n  ___A___ {name} ___B___\n  ");
    }

    #[test]
    fn test_attribute_literal() {
        let code = r#"const a = <input placeholder="___Name___" value={"x"} />;"#;
        let tree = tree(code, "a.jsx");
        let kinds: Vec<LiteralKind> = literals(&tree).iter().map(|(_, lit)| lit.kind).collect();
        assert_eq!(
            kinds,
            vec![LiteralKind::Attribute, LiteralKind::String { quote: '"' }]
        );
    }

    #[test]
    fn test_module_references_and_ancestry() {
        let code = r#"
            import x from "___a___";
            const y = require("___b___");
            const z = t("___c___");
        "#;
        let tree = tree(code, "a.js");
        let literals = literals(&tree);
        assert_eq!(literals.len(), 2);

        let (require_arg, _) = literals[0];
        assert!(
            tree.ancestors(require_arg)
                .any(|id| tree.node(id).kind == NodeKind::ModuleReference)
        );

        let (call_arg, _) = literals[1];
        let parent = tree.parent(call_arg).unwrap();
        match &tree.node(parent).kind {
            NodeKind::Call(call) => {
                assert_eq!(call.callee.as_deref(), Some("t"));
                assert_eq!(call.sole_argument, Some(tree.node(call_arg).range));
            }
            other => panic!("unexpected parent: {other:?}"),
        }
        assert!(tree.is_ancestor(NodeId::ROOT, call_arg));
        assert!(!tree.is_ancestor(call_arg, parent));
    }

    #[test]
    fn test_outermost_literals() {
        let code = "const a = `${`${'x'}`} ${'y'}`;";
        let tree = tree(code, "a.ts");
        let (outer, _) = literals(&tree)[0];
        let nested = tree.outermost_literals(outer);
        assert_eq!(nested.len(), 2);
        assert!(nested.iter().all(|id| tree.is_ancestor(outer, *id)));
    }
}
