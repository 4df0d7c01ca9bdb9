use pretty_assertions::assert_eq;

use super::*;
use crate::core::policy::{ContextKind, Framework, FrameworkPolicy};

fn requirements(kinds: &[ContextKind]) -> Requirements {
    let framework = FrameworkPolicy::new(Framework::React);
    let mut requirements = Requirements::default();
    for &kind in kinds {
        requirements.add(&framework.resolve(kind));
    }
    requirements
}

fn merge(code: &str, kinds: &[ContextKind], conflict: ImportConflict) -> MergeOutcome {
    merge_requirements(code.to_string(), "App.jsx", &requirements(kinds), conflict)
}

#[test]
fn test_specifier_merged_into_existing_declaration() {
    let code = r#"import { Trans } from "react-i18next";

export function App() {
  return <p>{t("Hello")}</p>;
}
"#;
    let outcome = merge(code, &[ContextKind::Component], ImportConflict::Skip);
    assert_eq!(
        outcome.code,
        r#"import { Trans, useTranslation } from "react-i18next";

export function App() {
  const { t } = useTranslation();
  return <p>{t("Hello")}</p>;
}
"#
    );
    assert_eq!(outcome.code.matches("from \"react-i18next\"").count(), 1);
    assert_eq!(outcome.imports_added, 1);
    assert_eq!(outcome.setups_added, 1);
}

#[test]
fn test_new_declaration_after_last_import_and_concise_body() {
    let code = r#"import React from 'react';
import './app.css';

const App = () => <h1>{t("Hi")}</h1>;
"#;
    let outcome = merge(code, &[ContextKind::Component], ImportConflict::Skip);
    assert_eq!(
        outcome.code,
        r#"import React from 'react';
import './app.css';
import { useTranslation } from 'react-i18next';

const App = () => {
  const { t } = useTranslation();
  return <h1>{t("Hi")}</h1>;
};
"#
    );
}

#[test]
fn test_new_declaration_after_directive() {
    let code = r#""use client";

export default function Page() {
  return <main>{t("Hi")}</main>;
}
"#;
    let outcome = merge(code, &[ContextKind::Component], ImportConflict::Skip);
    assert_eq!(
        outcome.code,
        r#""use client";
import { useTranslation } from "react-i18next";

export default function Page() {
  const { t } = useTranslation();
  return <main>{t("Hi")}</main>;
}
"#
    );
}

#[test]
fn test_first_declaration_in_file() {
    let code = "export const title = i18n.t(\"Title\");\n";
    let outcome = merge(code, &[ContextKind::ModuleLevel], ImportConflict::Skip);
    assert_eq!(
        outcome.code,
        "import i18n from \"i18next\";\nexport const title = i18n.t(\"Title\");\n"
    );
    assert_eq!(outcome.setups_added, 0);
}

#[test]
fn test_default_added_before_named_specifiers() {
    let code = r#"import { changeLanguage } from "i18next";
export const title = i18n.t("Title");
"#;
    let outcome = merge(code, &[ContextKind::ModuleLevel], ImportConflict::Skip);
    assert_eq!(
        outcome.code,
        r#"import i18n, { changeLanguage } from "i18next";
export const title = i18n.t("Title");
"#
    );
}

#[test]
fn test_existing_import_and_setup_are_kept() {
    let code = r#"import { useTranslation } from "react-i18next";
function useTitle() {
  const { t } = useTranslation();
  return t("Title");
}
"#;
    let outcome = merge(code, &[ContextKind::CustomHook], ImportConflict::Skip);
    assert_eq!(outcome.code, code);
    assert_eq!(outcome.imports_added, 0);
    assert_eq!(outcome.setups_added, 0);
}

#[test]
fn test_conflict_skip_keeps_existing_import() {
    let code = r#"import { useTranslation } from "./i18n";
function useTitle() {
  return t("Title");
}
"#;
    let outcome = merge(code, &[ContextKind::CustomHook], ImportConflict::Skip);
    assert_eq!(
        outcome.code,
        r#"import { useTranslation } from "./i18n";
function useTitle() {
  const { t } = useTranslation();
  return t("Title");
}
"#
    );
    assert_eq!(outcome.imports_added, 0);
}

#[test]
fn test_conflict_override_replaces_declaration() {
    let code = r#"import { useTranslation } from "./i18n";
function useTitle() {
  return t("Title");
}
"#;
    let outcome = merge(code, &[ContextKind::CustomHook], ImportConflict::Override);
    assert_eq!(
        outcome.code,
        r#"import { useTranslation } from "react-i18next";
function useTitle() {
  const { t } = useTranslation();
  return t("Title");
}
"#
    );
    assert_eq!(outcome.imports_added, 1);
}

#[test]
fn test_conflict_override_keeps_other_specifiers() {
    let code = r#"import { format, useTranslation } from "./i18n";
export function App() {
  return <p>{t("Hi")}</p>;
}
"#;
    let outcome = merge(code, &[ContextKind::Component], ImportConflict::Override);
    assert_eq!(
        outcome.code,
        r#"import { format } from "./i18n";
import { useTranslation } from "react-i18next";
export function App() {
  const { t } = useTranslation();
  return <p>{t("Hi")}</p>;
}
"#
    );
}

#[test]
fn test_assigned_binding_needs_no_setup_or_import() {
    let code = r#"function App() {
  const t = useFixedT();
  return <p>{t("Hello")}</p>;
}
"#;
    let outcome = merge(code, &[ContextKind::Component], ImportConflict::Skip);
    assert_eq!(outcome.code, code);
    assert_eq!(outcome.setups_added, 0);
    assert_eq!(outcome.imports_added, 0);
}

#[test]
fn test_parameter_binding_needs_no_setup_or_import() {
    let code = r#"export function App({ t }) {
  return <p>{t("Hello")}</p>;
}
"#;
    let outcome = merge(code, &[ContextKind::Component], ImportConflict::Skip);
    assert_eq!(outcome.code, code);
    assert_eq!(outcome.setups_added, 0);
    assert_eq!(outcome.imports_added, 0);
}

#[test]
fn test_existing_setup_still_gets_its_import() {
    let code = r#"function App() {
  const { t } = useTranslation();
  return <p>{t("Hello")}</p>;
}
"#;
    let outcome = merge(code, &[ContextKind::Component], ImportConflict::Skip);
    assert_eq!(
        outcome.code,
        format!("import {{ useTranslation }} from \"react-i18next\";\n{code}")
    );
    assert_eq!(outcome.setups_added, 0);
    assert_eq!(outcome.imports_added, 1);
}

#[test]
fn test_nested_component_left_alone() {
    let code = r#"function App() {
  const Inner = () => <b>{t("A")}</b>;
  return <div><Inner /></div>;
}
"#;
    let outcome = merge(code, &[ContextKind::Component], ImportConflict::Skip);
    assert_eq!(
        outcome.code,
        r#"import { useTranslation } from "react-i18next";
function App() {
  const { t } = useTranslation();
  const Inner = () => <b>{t("A")}</b>;
  return <div><Inner /></div>;
}
"#
    );
    assert_eq!(outcome.setups_added, 1);
}

#[test]
fn test_single_line_body() {
    let code = "function App() { return <p>{t(\"x\")}</p>; }\n";
    let outcome = merge(code, &[ContextKind::Component], ImportConflict::Skip);
    assert!(outcome.code.ends_with(
        "function App() { const { t } = useTranslation(); return <p>{t(\"x\")}</p>; }\n"
    ));
}

#[test]
fn test_parse_failure_leaves_code_unchanged() {
    let code = "const = ;";
    let outcome = merge(code, &[ContextKind::Component], ImportConflict::Skip);
    assert_eq!(outcome.code, code);
    assert_eq!(outcome.imports_added, 0);
}

#[test]
fn test_global_policy_needs_nothing() {
    let framework = FrameworkPolicy::new(Framework::Global);
    let mut requirements = Requirements::default();
    requirements.add(&framework.resolve(ContextKind::Component));
    let code = "function App() { return <p>{t(\"x\")}</p>; }\n";
    let outcome = merge_requirements(
        code.to_string(),
        "App.jsx",
        &requirements,
        ImportConflict::Skip,
    );
    assert_eq!(outcome.code, code);
}
