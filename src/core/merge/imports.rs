//! Import declaration merging.

use std::collections::HashMap;

use super::ImportConflict;
use super::inventory::{ExistingImport, ExistingSpecifier, ImportInventory};
use crate::core::patch::TextEdit;
use crate::core::policy::{ImportRequirement, ImportSpecifier};
use crate::core::source::TextRange;

/// Planned changes to one existing declaration.
#[derive(Debug, Default)]
struct DeclarationPlan {
    /// Local names to drop.
    removed: Vec<String>,
    default: Option<String>,
    named: Vec<ImportSpecifier>,
}

impl DeclarationPlan {
    fn adds(&self, spec: &ImportSpecifier, is_default: bool) -> bool {
        if is_default {
            self.default.as_deref() == Some(spec.local())
        } else {
            self.named.contains(spec)
        }
    }
}

/// A declaration that does not exist yet.
#[derive(Debug)]
struct NewDeclaration {
    module: String,
    default: Option<String>,
    named: Vec<ImportSpecifier>,
}

pub struct ImportMerge<'a> {
    source: &'a str,
    file_path: &'a str,
    inventory: &'a ImportInventory,
    conflict: ImportConflict,
    plans: HashMap<usize, DeclarationPlan>,
    created: Vec<NewDeclaration>,
    added: usize,
}

fn specifier_text(spec: &ImportSpecifier) -> String {
    match &spec.alias {
        Some(alias) if alias != &spec.name => format!("{} as {}", spec.name, alias),
        _ => spec.name.clone(),
    }
}

fn existing_text(spec: &ExistingSpecifier) -> String {
    let name = if spec.imported == spec.local {
        spec.local.clone()
    } else {
        format!("{} as {}", spec.imported, spec.local)
    };
    if spec.type_only {
        format!("type {name}")
    } else {
        name
    }
}

impl<'a> ImportMerge<'a> {
    pub fn new(
        source: &'a str,
        file_path: &'a str,
        inventory: &'a ImportInventory,
        conflict: ImportConflict,
    ) -> Self {
        Self {
            source,
            file_path,
            inventory,
            conflict,
            plans: HashMap::new(),
            created: Vec::new(),
            added: 0,
        }
    }

    /// Plan every requirement, then return the edits and the number of
    /// specifiers added.
    pub fn merge(mut self, requirements: &[ImportRequirement]) -> (Vec<TextEdit>, usize) {
        for requirement in requirements {
            for spec in &requirement.specifiers {
                self.require(
                    &requirement.source_module,
                    spec,
                    requirement.is_default_import,
                );
            }
        }
        let edits = self.edits();
        (edits, self.added)
    }

    fn imports(&self) -> &'a [ExistingImport] {
        &self.inventory.imports
    }

    fn is_removed(&self, idx: usize, local: &str) -> bool {
        self.plans
            .get(&idx)
            .is_some_and(|plan| plan.removed.iter().any(|name| name == local))
    }

    fn provided(&self, module: &str, spec: &ImportSpecifier, is_default: bool) -> bool {
        let local = spec.local();
        let imports = self.imports();
        let existing = imports.iter().enumerate().any(|(idx, import)| {
            import.module == module
                && import.provides(&spec.name, local, is_default)
                && !self.is_removed(idx, local)
        });
        let planned = self
            .plans
            .iter()
            .any(|(idx, plan)| imports[*idx].module == module && plan.adds(spec, is_default));
        let created = self.created.iter().any(|decl| {
            decl.module == module
                && if is_default {
                    decl.default.as_deref() == Some(local)
                } else {
                    decl.named.contains(spec)
                }
        });
        existing || planned || created
    }

    fn require(&mut self, module: &str, spec: &ImportSpecifier, is_default: bool) {
        if self.provided(module, spec, is_default) {
            return;
        }

        let local = spec.local();
        let imports = self.imports();
        let colliding: Vec<usize> = imports
            .iter()
            .enumerate()
            .filter(|(idx, import)| import.binds(local) && !self.is_removed(*idx, local))
            .map(|(idx, _)| idx)
            .collect();

        let blocked = colliding
            .iter()
            .find(|&&idx| self.conflict == ImportConflict::Skip || imports[idx].module == module);
        if let Some(&idx) = blocked {
            tracing::warn!(
                file = self.file_path,
                name = local,
                existing = %imports[idx].module,
                required = module,
                "import name already bound, leaving existing import untouched"
            );
            return;
        }
        for idx in colliding {
            self.plans
                .entry(idx)
                .or_default()
                .removed
                .push(local.to_string());
        }

        self.add(module, spec, is_default);
        self.added += 1;
    }

    fn add(&mut self, module: &str, spec: &ImportSpecifier, is_default: bool) {
        let local = spec.local().to_string();
        let target = self.imports().iter().enumerate().position(|(idx, import)| {
            let plan = self.plans.get(&idx);
            import.module == module
                && import.is_mergeable()
                && !(is_default
                    && (import.default.is_some() || plan.is_some_and(|plan| plan.default.is_some())))
        });

        if let Some(idx) = target {
            let plan = self.plans.entry(idx).or_default();
            if is_default {
                plan.default = Some(local);
            } else {
                plan.named.push(spec.clone());
            }
            return;
        }

        let open = self.created.iter_mut().find(|decl| {
            decl.module == module && !(is_default && decl.default.is_some())
        });
        match open {
            Some(decl) if is_default => decl.default = Some(local),
            Some(decl) => decl.named.push(spec.clone()),
            None => self.created.push(NewDeclaration {
                module: module.to_string(),
                default: is_default.then_some(local),
                named: if is_default { Vec::new() } else { vec![spec.clone()] },
            }),
        }
    }

    fn declaration_text(
        &self,
        module: &str,
        quote: char,
        default: Option<&str>,
        namespace: Option<&str>,
        named: &[String],
    ) -> String {
        let mut clauses = Vec::new();
        if let Some(default) = default {
            clauses.push(default.to_string());
        }
        if let Some(namespace) = namespace {
            clauses.push(format!("* as {namespace}"));
        }
        if !named.is_empty() {
            clauses.push(format!("{{ {} }}", named.join(", ")));
        }
        let semicolon = if self.inventory.semicolons { ";" } else { "" };
        format!(
            "import {} from {quote}{module}{quote}{semicolon}",
            clauses.join(", ")
        )
    }

    /// Range of a declaration plus its line terminator.
    fn removal_range(&self, range: TextRange) -> TextRange {
        let rest = &self.source[range.end..];
        let extra = if rest.starts_with("\r\n") {
            2
        } else if rest.starts_with('\n') {
            1
        } else {
            0
        };
        TextRange::new(range.start, range.end + extra)
    }

    fn edits(&self) -> Vec<TextEdit> {
        let imports = self.imports();
        let mut edits = Vec::new();
        let mut deleted = vec![false; imports.len()];

        let mut planned: Vec<(&usize, &DeclarationPlan)> = self.plans.iter().collect();
        planned.sort_by_key(|(idx, _)| **idx);

        for (&idx, plan) in planned {
            let import = &imports[idx];
            if plan.removed.is_empty() {
                edits.extend(self.append_edits(import, plan));
                continue;
            }

            let keep = |spec: &&ExistingSpecifier| !plan.removed.contains(&spec.local);
            let default = import
                .default
                .iter()
                .filter(keep)
                .map(|spec| spec.local.clone())
                .next()
                .or_else(|| plan.default.clone());
            let namespace = import
                .namespace
                .iter()
                .filter(keep)
                .map(|spec| spec.local.clone())
                .next();
            let mut named: Vec<String> =
                import.named.iter().filter(keep).map(existing_text).collect();
            named.extend(plan.named.iter().map(specifier_text));

            if default.is_none() && namespace.is_none() && named.is_empty() {
                deleted[idx] = true;
                edits.push(TextEdit::delete(self.removal_range(import.range)));
                continue;
            }
            let mut text = self.declaration_text(
                &import.module,
                import.quote,
                default.as_deref(),
                namespace.as_deref(),
                &named,
            );
            if import.type_only {
                text = text.replacen("import ", "import type ", 1);
            }
            edits.push(TextEdit::replace(import.range, text));
        }

        if !self.created.is_empty() {
            let declarations: Vec<String> = self
                .created
                .iter()
                .map(|decl| {
                    let named: Vec<String> = decl.named.iter().map(specifier_text).collect();
                    self.declaration_text(
                        &decl.module,
                        self.inventory.quote,
                        decl.default.as_deref(),
                        None,
                        &named,
                    )
                })
                .collect();

            let anchor = imports
                .iter()
                .enumerate()
                .rev()
                .find(|(idx, _)| !deleted[*idx])
                .map(|(_, import)| import.range.end)
                .or(self.inventory.directives_end);
            let edit = match anchor {
                Some(at) => TextEdit::insert(
                    at,
                    declarations
                        .iter()
                        .map(|decl| format!("\n{decl}"))
                        .collect::<String>(),
                ),
                None => TextEdit::insert(
                    0,
                    declarations
                        .iter()
                        .map(|decl| format!("{decl}\n"))
                        .collect::<String>(),
                ),
            };
            edits.push(edit);
        }

        edits
    }

    /// Insertions that extend a declaration in place, keeping its formatting.
    fn append_edits(&self, import: &ExistingImport, plan: &DeclarationPlan) -> Vec<TextEdit> {
        let mut edits = Vec::new();
        if let Some(default) = &plan.default {
            let at = match import.named.first() {
                Some(_) => self.source[import.range.start..import.range.end]
                    .find('{')
                    .map(|idx| import.range.start + idx),
                None => None,
            };
            if let Some(at) = at {
                edits.push(TextEdit::insert(at, format!("{default}, ")));
            }
        }

        if plan.named.is_empty() {
            return edits;
        }
        let names: Vec<String> = plan.named.iter().map(specifier_text).collect();
        if let Some(last) = import.named.last() {
            let text: String = names.iter().map(|name| format!(", {name}")).collect();
            edits.push(TextEdit::insert(last.range.end, text));
        } else if let Some(default) = &import.default {
            edits.push(TextEdit::insert(
                default.range.end,
                format!(", {{ {} }}", names.join(", ")),
            ));
        }
        edits
    }
}
