//! Call and import policies.
//!
//! A policy says how the translation call is spelled in a given context and
//! what has to be imported or initialised for that spelling to work. The set
//! of frameworks is closed: supporting a new one means adding a [`Framework`]
//! variant and its arm in [`FrameworkPolicy::resolve`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    /// react-i18next
    #[default]
    React,
    /// vue-i18n
    Vue,
    /// A global function that needs no import.
    Global,
}

impl std::fmt::Display for Framework {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Framework::React => write!(f, "react"),
            Framework::Vue => write!(f, "vue"),
            Framework::Global => write!(f, "global"),
        }
    }
}

/// Syntactic context a literal was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    Component,
    CustomHook,
    ClassComponent,
    PlainFunction,
    ModuleLevel,
}

impl ContextKind {
    /// Contexts in which the translation function is bound by a setup call.
    pub fn needs_setup(self) -> bool {
        matches!(self, ContextKind::Component | ContextKind::CustomHook)
    }
}

/// How the translation call is spelled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CallPolicy {
    /// A local binding created by the setup call, e.g. `t(...)`.
    Function { name: String },
    /// A method reached through `this`, e.g. `this.props.t(...)`.
    ThisMethod { path: String },
    /// A member of an imported instance, e.g. `i18n.t(...)`.
    Qualified { path: String },
    /// An ambient or imported free function.
    Global { name: String },
}

impl CallPolicy {
    pub fn callee(&self) -> &str {
        match self {
            CallPolicy::Function { name } | CallPolicy::Global { name } => name,
            CallPolicy::ThisMethod { path } | CallPolicy::Qualified { path } => path,
        }
    }
}

/// What must exist in the file for the call to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImportPolicy {
    /// Import `hook` from `module` and bind `bound` with a setup call.
    Hook {
        module: String,
        hook: String,
        bound: String,
    },
    /// `import local from "module"`
    Default { module: String, local: String },
    /// `import { name } from "module"`
    Named { module: String, name: String },
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportSpecifier {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportSpecifier {
    /// Name the specifier binds in the importing file.
    pub fn local(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportRequirement {
    pub source_module: String,
    pub specifiers: Vec<ImportSpecifier>,
    pub is_default_import: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SetupCallRequirement {
    /// Hook to call, e.g. `useTranslation`.
    pub callee_name: String,
    /// Variable the hook result binds, e.g. `t`.
    pub bound_variable: String,
    pub is_destructured: bool,
    /// Statement inserted into the function body.
    pub statement: String,
}

/// Resolved policy for one context kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextPolicy {
    pub call: CallPolicy,
    pub import: ImportPolicy,
}

impl ContextPolicy {
    pub fn import_requirement(&self) -> Option<ImportRequirement> {
        match &self.import {
            ImportPolicy::Hook { module, hook, .. } => Some(ImportRequirement {
                source_module: module.clone(),
                specifiers: vec![ImportSpecifier {
                    name: hook.clone(),
                    alias: None,
                }],
                is_default_import: false,
            }),
            ImportPolicy::Default { module, local } => Some(ImportRequirement {
                source_module: module.clone(),
                specifiers: vec![ImportSpecifier {
                    name: local.clone(),
                    alias: None,
                }],
                is_default_import: true,
            }),
            ImportPolicy::Named { module, name } => Some(ImportRequirement {
                source_module: module.clone(),
                specifiers: vec![ImportSpecifier {
                    name: name.clone(),
                    alias: None,
                }],
                is_default_import: false,
            }),
            ImportPolicy::None => None,
        }
    }

    pub fn setup_requirement(&self) -> Option<SetupCallRequirement> {
        match &self.import {
            ImportPolicy::Hook { hook, bound, .. } => Some(SetupCallRequirement {
                callee_name: hook.clone(),
                bound_variable: bound.clone(),
                is_destructured: true,
                statement: format!("const {{ {bound} }} = {hook}();"),
            }),
            _ => None,
        }
    }
}

/// Imports and setup calls a file needs, each listed once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirements {
    pub imports: Vec<ImportRequirement>,
    pub setups: Vec<SetupCallRequirement>,
}

impl Requirements {
    pub fn add(&mut self, policy: &ContextPolicy) {
        if let Some(import) = policy.import_requirement()
            && !self.imports.contains(&import)
        {
            self.imports.push(import);
        }
        if let Some(setup) = policy.setup_requirement()
            && !self.setups.contains(&setup)
        {
            self.setups.push(setup);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.setups.is_empty()
    }
}

/// Framework-specific policy selection.
#[derive(Debug, Clone)]
pub struct FrameworkPolicy {
    pub framework: Framework,
    /// Call name for [`Framework::Global`].
    pub global_function: String,
    /// Replaces the module of module-level imports.
    pub module_import_source: Option<String>,
}

impl FrameworkPolicy {
    pub fn new(framework: Framework) -> Self {
        Self {
            framework,
            global_function: "t".to_string(),
            module_import_source: None,
        }
    }

    /// True if a class extending `super_class` is a class component.
    pub fn is_component_base(&self, super_class: &str) -> bool {
        const REACT_BASES: &[&str] = &[
            "Component",
            "PureComponent",
            "React.Component",
            "React.PureComponent",
        ];
        match self.framework {
            Framework::React => REACT_BASES.contains(&super_class),
            Framework::Vue => super_class == "Vue",
            Framework::Global => REACT_BASES.contains(&super_class) || super_class == "Vue",
        }
    }

    pub fn resolve(&self, context: ContextKind) -> ContextPolicy {
        match self.framework {
            Framework::React => self.resolve_with(
                context,
                "react-i18next",
                "useTranslation",
                "this.props.t",
                "i18next",
                "i18n.t",
            ),
            Framework::Vue => self.resolve_with(
                context,
                "vue-i18n",
                "useI18n",
                "this.$t",
                "@/i18n",
                "i18n.global.t",
            ),
            Framework::Global => ContextPolicy {
                call: CallPolicy::Global {
                    name: self.global_function.clone(),
                },
                import: match &self.module_import_source {
                    Some(module) => ImportPolicy::Named {
                        module: module.clone(),
                        name: self.global_function.clone(),
                    },
                    None => ImportPolicy::None,
                },
            },
        }
    }

    fn resolve_with(
        &self,
        context: ContextKind,
        hook_module: &str,
        hook: &str,
        this_path: &str,
        instance_module: &str,
        instance_path: &str,
    ) -> ContextPolicy {
        match context {
            ContextKind::Component | ContextKind::CustomHook => ContextPolicy {
                call: CallPolicy::Function {
                    name: "t".to_string(),
                },
                import: ImportPolicy::Hook {
                    module: hook_module.to_string(),
                    hook: hook.to_string(),
                    bound: "t".to_string(),
                },
            },
            ContextKind::ClassComponent => ContextPolicy {
                call: CallPolicy::ThisMethod {
                    path: this_path.to_string(),
                },
                import: ImportPolicy::None,
            },
            ContextKind::PlainFunction | ContextKind::ModuleLevel => ContextPolicy {
                call: CallPolicy::Qualified {
                    path: instance_path.to_string(),
                },
                import: ImportPolicy::Default {
                    module: self
                        .module_import_source
                        .clone()
                        .unwrap_or_else(|| instance_module.to_string()),
                    local: "i18n".to_string(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_react_component_policy() {
        let policy = FrameworkPolicy::new(Framework::React).resolve(ContextKind::Component);
        assert_eq!(policy.call.callee(), "t");

        let import = policy.import_requirement().unwrap();
        assert_eq!(import.source_module, "react-i18next");
        assert_eq!(import.specifiers[0].local(), "useTranslation");
        assert!(!import.is_default_import);

        let setup = policy.setup_requirement().unwrap();
        assert_eq!(setup.statement, "const { t } = useTranslation();");
    }

    #[test]
    fn test_react_class_component_uses_props() {
        let policy = FrameworkPolicy::new(Framework::React).resolve(ContextKind::ClassComponent);
        assert_eq!(policy.call.callee(), "this.props.t");
        assert!(policy.import_requirement().is_none());
        assert!(policy.setup_requirement().is_none());
    }

    #[test]
    fn test_module_level_default_import() {
        let mut framework = FrameworkPolicy::new(Framework::Vue);
        let policy = framework.resolve(ContextKind::ModuleLevel);
        assert_eq!(policy.call.callee(), "i18n.global.t");
        let import = policy.import_requirement().unwrap();
        assert_eq!(import.source_module, "@/i18n");
        assert!(import.is_default_import);

        framework.module_import_source = Some("~/plugins/i18n".to_string());
        let import = framework
            .resolve(ContextKind::PlainFunction)
            .import_requirement()
            .unwrap();
        assert_eq!(import.source_module, "~/plugins/i18n");
    }

    #[test]
    fn test_global_policy() {
        let mut framework = FrameworkPolicy::new(Framework::Global);
        framework.global_function = "__".to_string();

        let policy = framework.resolve(ContextKind::Component);
        assert_eq!(policy.call.callee(), "__");
        assert!(policy.import_requirement().is_none());
        assert!(policy.setup_requirement().is_none());

        framework.module_import_source = Some("./lang".to_string());
        let import = framework
            .resolve(ContextKind::ModuleLevel)
            .import_requirement()
            .unwrap();
        assert_eq!(import.specifiers[0].name, "__");
        assert!(!import.is_default_import);
    }

    #[test]
    fn test_component_bases() {
        let react = FrameworkPolicy::new(Framework::React);
        assert!(react.is_component_base("React.PureComponent"));
        assert!(!react.is_component_base("Vue"));

        let vue = FrameworkPolicy::new(Framework::Vue);
        assert!(vue.is_component_base("Vue"));
        assert!(!vue.is_component_base("Component"));
    }
}
