//! Rewrites the legacy React `Component.defaultProps = { ... }` idiom into
//! destructuring defaults at the component's `const { ... } = props`
//! declaration.
//!
//! Defaults that match a destructured field become pattern defaults
//! (`{ a = 1 }`); the rest are emitted as nullish-coalescing fallback
//! assignments (`props.b ??= 2;` or `rest.b ??= 2;` when the pattern has a
//! rest binding) right after the declaration. The `defaultProps` assignment
//! itself is removed.
//!
//! ```rust,no_run
//! use destructure_props::{migrate_source, MigrationOptions};
//!
//! let output = migrate_source(
//!   "function Foo(props) { const { a } = props; return a; }\n\
//!    Foo.defaultProps = { a: 1 };",
//!   &MigrationOptions::default(),
//! )?;
//! println!("{}", output.code);
//! # Ok::<(), destructure_props::MigrateError>(())
//! ```

mod extract;
mod locator;
mod merge;
mod value_shape;

use std::collections::HashSet;

use destructure_props_swc_runner::runner::{
  jsx_syntax, run_transform, RunTransformError, RunTransformOptions,
};
use indexmap::IndexMap;
use serde::Deserialize;
use swc_core::atoms::Atom;
use swc_core::ecma::ast::{
  BlockStmt, BlockStmtOrExpr, DefaultDecl, ExportDefaultDecl, Expr, FnDecl, Module, VarDeclarator,
};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::extract::DefaultMap;
use crate::locator::match_var_component;

pub use crate::locator::{locate_components, ComponentCandidate};
pub use crate::value_shape::{DefaultValue, UnsupportedValueShape};

/// Quote style for string literals the codemod has to re-render.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
  #[default]
  Single,
  Double,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PrintOptions {
  pub quote: QuoteStyle,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct MigrationOptions {
  pub print_options: PrintOptions,
}

/// Defaults that were extracted but never applied because the component has
/// no matching `const { ... } = props` declaration.
#[derive(Debug, PartialEq, Eq)]
pub struct UnappliedDefaults {
  pub component: Atom,
  pub props: Vec<Atom>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
  /// Components whose defaults were folded into a destructuring pattern
  /// and/or emitted as fallback assignments.
  pub transformed: Vec<Atom>,
  pub unapplied: Vec<UnappliedDefaults>,
}

#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
  #[error(transparent)]
  Run(#[from] RunTransformError),
  #[error(transparent)]
  UnsupportedValueShape(#[from] UnsupportedValueShape),
}

#[derive(Debug)]
pub struct MigrationOutput {
  pub code: String,
  pub report: MigrationReport,
}

/// Migrate one file's source text. Returns the reprinted file, or an error
/// when parsing fails or a default value cannot be relocated; no output is
/// produced for a failed file.
pub fn migrate_source(
  code: &str,
  options: &MigrationOptions,
) -> Result<MigrationOutput, MigrateError> {
  let output = run_transform(
    RunTransformOptions {
      code,
      syntax: Some(jsx_syntax()),
    },
    |_context, module| migrate_module(module, options),
  )?;
  let report = output.transform_result?;
  Ok(MigrationOutput {
    code: output.output_code,
    report,
  })
}

/// Migrate an already parsed module in place.
pub fn migrate_module(
  module: &mut Module,
  options: &MigrationOptions,
) -> Result<MigrationReport, UnsupportedValueShape> {
  let candidates = locate_components(module);
  if candidates.is_empty() {
    return Ok(MigrationReport::default());
  }

  let names: HashSet<Atom> = candidates
    .iter()
    .map(|candidate| candidate.name.clone())
    .collect();
  let extracted = extract::strip_default_props(module, &names);
  if extracted.is_empty() {
    return Ok(MigrationReport::default());
  }

  let mut pending: IndexMap<Atom, Vec<DefaultMap>> = IndexMap::new();
  for found in extracted {
    pending.entry(found.component).or_default().push(found.props);
  }

  let mut applier = DefaultApplier {
    pending,
    quote: options.print_options.quote,
    error: None,
    report: MigrationReport::default(),
  };
  module.visit_mut_with(&mut applier);
  if let Some(error) = applier.error {
    return Err(error);
  }
  Ok(applier.report)
}

/// Walks the module a second time and applies each component's pending
/// default maps to the component's body, in source order.
struct DefaultApplier {
  pending: IndexMap<Atom, Vec<DefaultMap>>,
  quote: QuoteStyle,
  error: Option<UnsupportedValueShape>,
  report: MigrationReport,
}

impl DefaultApplier {
  fn apply(&mut self, name: &Atom, mut body: Option<&mut BlockStmt>) {
    let Some(maps) = self.pending.shift_remove(name) else {
      return;
    };
    let mut applied_any = false;
    for mut map in maps {
      let before = map.len();
      if let Some(body) = body.as_deref_mut() {
        if let Err(error) = merge::merge_into_body(body, &mut map, self.quote) {
          self.error = Some(error);
          return;
        }
      }
      // an empty defaultProps object still counts: its assignment is gone
      applied_any |= before == 0 || map.len() < before;
      if !map.is_empty() {
        let props: Vec<Atom> = map.keys().cloned().collect();
        tracing::warn!(
          component = %name,
          props = ?props,
          "no matching props destructuring declaration; defaults were dropped with the defaultProps assignment"
        );
        self.report.unapplied.push(UnappliedDefaults {
          component: name.clone(),
          props,
        });
      }
    }
    if applied_any {
      self.report.transformed.push(name.clone());
    }
  }
}

impl VisitMut for DefaultApplier {
  fn visit_mut_fn_decl(&mut self, n: &mut FnDecl) {
    if self.error.is_some() {
      return;
    }
    let name = n.ident.sym.clone();
    self.apply(&name, n.function.body.as_mut());
    if self.error.is_none() {
      n.visit_mut_children_with(self);
    }
  }

  fn visit_mut_export_default_decl(&mut self, n: &mut ExportDefaultDecl) {
    if self.error.is_some() {
      return;
    }
    if let DefaultDecl::Fn(function) = &mut n.decl {
      if let Some(name) = &function.ident {
        let name = name.sym.clone();
        self.apply(&name, function.function.body.as_mut());
      }
    }
    if self.error.is_none() {
      n.visit_mut_children_with(self);
    }
  }

  fn visit_mut_var_declarator(&mut self, n: &mut VarDeclarator) {
    if self.error.is_some() {
      return;
    }
    let name = match_var_component(n).map(|(ident, _)| ident.sym.clone());
    if let Some(name) = name {
      self.apply(&name, component_arrow_body(n));
    }
    if self.error.is_none() {
      n.visit_mut_children_with(self);
    }
  }
}

/// The block body of the arrow behind `const Name = () => {...}` or
/// `const Name = forwardRef(() => {...})`; expression-bodied arrows have no
/// statement list to merge into.
fn component_arrow_body(declarator: &mut VarDeclarator) -> Option<&mut BlockStmt> {
  let arrow = match declarator.init.as_deref_mut()? {
    Expr::Arrow(arrow) => arrow,
    Expr::Call(call) => {
      let argument = call.args.first_mut()?;
      match &mut *argument.expr {
        Expr::Arrow(arrow) => arrow,
        _ => return None,
      }
    }
    _ => return None,
  };
  match &mut *arrow.body {
    BlockStmtOrExpr::BlockStmt(block) => Some(block),
    BlockStmtOrExpr::Expr(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use indoc::indoc;
  use pretty_assertions::assert_str_eq;

  use super::*;

  fn migrate(code: &str) -> MigrationOutput {
    migrate_source(code, &MigrationOptions::default()).unwrap()
  }

  /// Canonicalize expected sources through the same parse/print pipeline so
  /// assertions are not sensitive to emitter formatting choices.
  fn reprint(code: &str) -> String {
    run_transform(
      RunTransformOptions {
        code,
        syntax: Some(jsx_syntax()),
      },
      |_context, _module| (),
    )
    .unwrap()
    .output_code
  }

  fn atoms(names: &[&str]) -> Vec<Atom> {
    names.iter().map(|name| Atom::from(*name)).collect()
  }

  #[test]
  fn merges_destructured_defaults_and_falls_back_to_props() {
    let output = migrate(indoc! {r"
      function Foo(props) {
          const { a } = props;
          return a;
      }
      Foo.defaultProps = { a: 1, b: 'x' };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        function Foo(props) {
            const { a = 1 } = props;
            props.b ??= 'x';
            return a;
        }
      "})
    );
    assert_eq!(output.report.transformed, atoms(&["Foo"]));
    assert_eq!(output.report.unapplied, vec![]);
  }

  #[test]
  fn fallbacks_target_the_rest_binding_when_present() {
    let output = migrate(indoc! {r"
      function Foo(props) {
          const { a, ...rest } = props;
          return rest;
      }
      Foo.defaultProps = { a: 1, b: 2 };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        function Foo(props) {
            const { a = 1, ...rest } = props;
            rest.b ??= 2;
            return rest;
        }
      "})
    );
  }

  #[test]
  fn transforms_export_default_function_components() {
    let output = migrate(indoc! {r"
      export default function Foo(props) {
          const { a } = props;
          return a;
      }
      Foo.defaultProps = { a: 1 };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        export default function Foo(props) {
            const { a = 1 } = props;
            return a;
        }
      "})
    );
    assert_eq!(output.report.transformed, atoms(&["Foo"]));
  }

  #[test]
  fn transforms_forward_ref_components() {
    let output = migrate(indoc! {r"
      const Foo = forwardRef((props, ref) => {
          const { size } = props;
          return <div ref={ref} size={size} />;
      });
      Foo.defaultProps = { size: 'md' };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        const Foo = forwardRef((props, ref) => {
            const { size = 'md' } = props;
            return <div ref={ref} size={size} />;
        });
      "})
    );
    assert_eq!(output.report.transformed, atoms(&["Foo"]));
  }

  #[test]
  fn leaves_lowercase_functions_untouched() {
    let code = indoc! {r"
      function useFoo(props) {
          const { a } = props;
          return a;
      }
      useFoo.defaultProps = { a: 1 };
    "};
    let output = migrate(code);
    assert_str_eq!(output.code, reprint(code));
    assert_eq!(output.report, MigrationReport::default());
  }

  #[test]
  fn is_idempotent_once_default_props_are_gone() {
    let first = migrate(indoc! {r"
      function Foo(props) {
          const { a } = props;
          return a;
      }
      Foo.defaultProps = { a: 1, b: 'x' };
    "});
    let second = migrate(&first.code);
    assert_str_eq!(second.code, first.code);
    assert_eq!(second.report, MigrationReport::default());
  }

  #[test]
  fn explicit_undefined_defaults_emit_nothing() {
    let output = migrate(indoc! {r"
      function Foo(props) {
          const { a } = props;
          return a;
      }
      Foo.defaultProps = { a: undefined, b: undefined, c: 1 };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        function Foo(props) {
            const { a } = props;
            props.c ??= 1;
            return a;
        }
      "})
    );
  }

  #[test]
  fn fallbacks_keep_default_props_order() {
    let output = migrate(indoc! {r"
      function Foo(props) {
          const { a } = props;
          return a;
      }
      Foo.defaultProps = { b: 2, c: 3, a: 1 };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        function Foo(props) {
            const { a = 1 } = props;
            props.b ??= 2;
            props.c ??= 3;
            return a;
        }
      "})
    );
  }

  #[test]
  fn preserves_local_aliases() {
    let output = migrate(indoc! {r"
      function Foo(props) {
          const { a: alpha } = props;
          return alpha;
      }
      Foo.defaultProps = { a: 1 };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        function Foo(props) {
            const { a: alpha = 1 } = props;
            return alpha;
        }
      "})
    );
  }

  #[test]
  fn replaces_an_existing_pattern_default() {
    let output = migrate(indoc! {r"
      function Foo(props) {
          const { a = 2 } = props;
          return a;
      }
      Foo.defaultProps = { a: 1 };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        function Foo(props) {
            const { a = 1 } = props;
            return a;
        }
      "})
    );
  }

  #[test]
  fn relocates_every_recognized_value_shape() {
    let output = migrate(indoc! {r"
      function Foo(props) {
          const {} = props;
          return null;
      }
      Foo.defaultProps = {
          m: colors.primary,
          c: make(),
          f: () => 1,
          o: { x: 1 },
          l: [1, 2],
          n: new Map(),
          t: big ? 'a' : 'b',
          s: 1 + 2,
          u: -1,
          g: function fallback() { return 1; }
      };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        function Foo(props) {
            const {} = props;
            props.m ??= colors.primary;
            props.c ??= make();
            props.f ??= () => 1;
            props.o ??= { x: 1 };
            props.l ??= [1, 2];
            props.n ??= new Map();
            props.t ??= big ? 'a' : 'b';
            props.s ??= 1 + 2;
            props.u ??= -1;
            props.g ??= function fallback() { return 1; };
            return null;
        }
      "})
    );
  }

  #[test]
  fn relocates_jsx_defaults_into_the_pattern() {
    let output = migrate(indoc! {r"
      function Foo(props) {
          const { icon } = props;
          return icon;
      }
      Foo.defaultProps = { icon: <Icon size={1} /> };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        function Foo(props) {
            const { icon = <Icon size={1} /> } = props;
            return icon;
        }
      "})
    );
  }

  #[test]
  fn applies_multiple_assignments_in_source_order() {
    let output = migrate(indoc! {r"
      function Foo(props) {
          const { a, b } = props;
          return a + b;
      }
      Foo.defaultProps = { a: 1 };
      Foo.defaultProps = { b: 2 };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        function Foo(props) {
            const { a = 1, b = 2 } = props;
            return a + b;
        }
      "})
    );
  }

  #[test]
  fn finds_destructure_declarations_in_nested_blocks() {
    let output = migrate(indoc! {r"
      function Foo(props) {
          if (props) {
              const { a } = props;
              return a;
          }
          return null;
      }
      Foo.defaultProps = { a: 1 };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        function Foo(props) {
            if (props) {
                const { a = 1 } = props;
                return a;
            }
            return null;
        }
      "})
    );
  }

  #[test]
  fn unsupported_value_shapes_fail_the_whole_file() {
    let error = migrate_source(
      indoc! {r"
        function Foo(props) {
            const { a } = props;
            return a;
        }
        Foo.defaultProps = { a: `template` };
      "},
      &MigrationOptions::default(),
    )
    .unwrap_err();
    match error {
      MigrateError::UnsupportedValueShape(error) => {
        assert_eq!(error.kind, "template literal");
      }
      other => panic!("expected UnsupportedValueShape, got {other:?}"),
    }
  }

  #[test]
  fn reports_components_without_a_matching_destructure() {
    let output = migrate(indoc! {r"
      function Foo(props) {
          return props.a;
      }
      Foo.defaultProps = { a: 1 };
    "});
    assert_str_eq!(
      output.code,
      reprint(indoc! {r"
        function Foo(props) {
            return props.a;
        }
      "})
    );
    assert_eq!(output.report.transformed, atoms(&[]));
    assert_eq!(
      output.report.unapplied,
      vec![UnappliedDefaults {
        component: "Foo".into(),
        props: atoms(&["a"]),
      }]
    );
  }

  #[test]
  fn quote_option_controls_relocated_strings() {
    let options = MigrationOptions {
      print_options: PrintOptions {
        quote: QuoteStyle::Double,
      },
    };
    let output = migrate_source(
      indoc! {r"
        function Foo(props) {
            const { a } = props;
            return a;
        }
        Foo.defaultProps = { b: 'x' };
      "},
      &options,
    )
    .unwrap();
    assert_str_eq!(
      output.code,
      reprint(indoc! {r#"
        function Foo(props) {
            const { a } = props;
            props.b ??= "x";
            return a;
        }
      "#})
    );
  }

  #[test]
  fn options_deserialize_from_camel_case() {
    let options: MigrationOptions =
      serde_json::from_str(r#"{ "printOptions": { "quote": "double" } }"#).unwrap();
    assert_eq!(options.print_options.quote, QuoteStyle::Double);
    let options: MigrationOptions = serde_json::from_str("{}").unwrap();
    assert_eq!(options.print_options.quote, QuoteStyle::Single);
  }
}
