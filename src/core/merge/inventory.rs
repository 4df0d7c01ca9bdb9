//! Inventory of the import declarations already present in a file.

use swc_ecma_ast::{
    Expr, ImportSpecifier as AstImportSpecifier, Lit, ModuleDecl, ModuleExportName, ModuleItem,
    Stmt,
};

use crate::core::parsers::ParsedSource;
use crate::core::source::TextRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingSpecifier {
    /// Exported name, `default` for default specifiers.
    pub imported: String,
    pub local: String,
    pub range: TextRange,
    pub type_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingImport {
    pub range: TextRange,
    pub module: String,
    pub quote: char,
    pub type_only: bool,
    pub default: Option<ExistingSpecifier>,
    pub namespace: Option<ExistingSpecifier>,
    pub named: Vec<ExistingSpecifier>,
}

impl ExistingImport {
    pub fn is_side_effect(&self) -> bool {
        self.default.is_none() && self.namespace.is_none() && self.named.is_empty()
    }

    /// Declarations new specifiers may be added to.
    pub fn is_mergeable(&self) -> bool {
        !self.type_only && self.namespace.is_none() && !self.is_side_effect()
    }

    pub fn specifiers(&self) -> impl Iterator<Item = &ExistingSpecifier> {
        self.default
            .iter()
            .chain(self.namespace.iter())
            .chain(self.named.iter())
    }

    pub fn binds(&self, local: &str) -> bool {
        self.specifiers().any(|spec| spec.local == local)
    }

    /// True if this declaration already binds `local` to `imported` as a value.
    pub fn provides(&self, imported: &str, local: &str, is_default: bool) -> bool {
        if self.type_only {
            return false;
        }
        if is_default {
            return self.default.as_ref().is_some_and(|spec| spec.local == local);
        }
        self.named
            .iter()
            .any(|spec| !spec.type_only && spec.imported == imported && spec.local == local)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInventory {
    pub imports: Vec<ExistingImport>,
    /// End of the leading directive prologue such as `"use client";`.
    pub directives_end: Option<usize>,
    /// Quote of the first import's module specifier.
    pub quote: char,
    pub semicolons: bool,
}

fn export_name(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::Ident(ident) => ident.sym.to_string(),
        ModuleExportName::Str(s) => s.value.to_string_lossy().to_string(),
    }
}

pub fn collect_imports(parsed: &ParsedSource, source: &str) -> ImportInventory {
    let mut imports = Vec::new();
    let mut directives_end = None;
    let mut in_prologue = true;

    for item in &parsed.module.body {
        match item {
            ModuleItem::Stmt(Stmt::Expr(stmt))
                if in_prologue && matches!(&*stmt.expr, Expr::Lit(Lit::Str(_))) =>
            {
                directives_end = Some(parsed.range(stmt.span).end);
            }
            ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) => {
                in_prologue = false;
                let range = parsed.range(decl.span);
                let src = parsed.range(decl.src.span);
                let mut import = ExistingImport {
                    range,
                    module: decl.src.value.to_string_lossy().to_string(),
                    quote: source[src.start..].chars().next().unwrap_or('"'),
                    type_only: decl.type_only,
                    default: None,
                    namespace: None,
                    named: Vec::new(),
                };

                for specifier in &decl.specifiers {
                    match specifier {
                        AstImportSpecifier::Named(named) => {
                            let local = named.local.sym.to_string();
                            import.named.push(ExistingSpecifier {
                                imported: named
                                    .imported
                                    .as_ref()
                                    .map(export_name)
                                    .unwrap_or_else(|| local.clone()),
                                local,
                                range: parsed.range(named.span),
                                type_only: named.is_type_only,
                            });
                        }
                        AstImportSpecifier::Default(default) => {
                            import.default = Some(ExistingSpecifier {
                                imported: "default".to_string(),
                                local: default.local.sym.to_string(),
                                range: parsed.range(default.span),
                                type_only: false,
                            });
                        }
                        AstImportSpecifier::Namespace(ns) => {
                            import.namespace = Some(ExistingSpecifier {
                                imported: "*".to_string(),
                                local: ns.local.sym.to_string(),
                                range: parsed.range(ns.span),
                                type_only: false,
                            });
                        }
                    }
                }
                imports.push(import);
            }
            _ => in_prologue = false,
        }
    }

    let quote = imports.first().map(|import| import.quote).unwrap_or('"');
    let semicolons = imports
        .first()
        .map(|import| source[import.range.start..import.range.end].trim_end().ends_with(';'))
        .unwrap_or(true);

    ImportInventory {
        imports,
        directives_end,
        quote,
        semicolons,
    }
}
