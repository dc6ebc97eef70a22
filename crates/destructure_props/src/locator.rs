use std::collections::HashSet;

use swc_core::atoms::{atom, Atom};
use swc_core::ecma::ast::{
  ArrowExpr, CallExpr, DefaultDecl, ExportDefaultDecl, Expr, FnDecl, Ident, Module, VarDeclarator,
};
use swc_core::ecma::visit::{Visit, VisitWith};

/// A named function-like declaration that may own a `defaultProps`
/// assignment.
///
/// The uppercase-first-letter rule on the resolved name is the only thing
/// separating components from plain functions and hooks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentCandidate {
  pub name: Atom,
  /// The function is the callback of a `forwardRef(...)` call and takes its
  /// name from the enclosing variable declaration.
  pub is_forward_wrapped: bool,
}

pub fn is_component_name(ident: &Ident) -> bool {
  ident
    .sym
    .chars()
    .next()
    .map(|c| c.is_uppercase())
    .unwrap_or(false)
}

/// Match `const Name = () => ...` or `const Name = forwardRef(() => ...)`,
/// returning the binding identifier and whether the arrow was wrapped.
pub(crate) fn match_var_component(declarator: &VarDeclarator) -> Option<(&Ident, bool)> {
  let name = &declarator.name.as_ident()?.id;
  match declarator.init.as_deref()? {
    Expr::Arrow(_) => Some((name, false)),
    Expr::Call(call) => match_forward_ref_callback(call).map(|_| (name, true)),
    _ => None,
  }
}

/// The arrow callback of a `forwardRef(...)` call, if this call is one.
pub(crate) fn match_forward_ref_callback(call: &CallExpr) -> Option<&ArrowExpr> {
  let callee = call.callee.as_expr()?.as_ident()?;
  if callee.sym != atom!("forwardRef") {
    return None;
  }
  let argument = call.args.first()?;
  if argument.spread.is_some() {
    return None;
  }
  argument.expr.as_arrow()
}

/// Collect every component candidate in the module, in source order.
pub fn locate_components(module: &Module) -> Vec<ComponentCandidate> {
  let mut collector = ComponentCollector::default();
  module.visit_with(&mut collector);
  collector.candidates
}

#[derive(Default)]
struct ComponentCollector {
  candidates: Vec<ComponentCandidate>,
  seen: HashSet<Atom>,
}

impl ComponentCollector {
  fn add(&mut self, name: &Ident, is_forward_wrapped: bool) {
    if !is_component_name(name) {
      return;
    }
    if self.seen.insert(name.sym.clone()) {
      self.candidates.push(ComponentCandidate {
        name: name.sym.clone(),
        is_forward_wrapped,
      });
    }
  }
}

impl Visit for ComponentCollector {
  fn visit_fn_decl(&mut self, n: &FnDecl) {
    self.add(&n.ident, false);
    n.visit_children_with(self);
  }

  // `export default function Foo() {}` is not a `FnDecl` in SWC, but it
  // still binds `Foo` at module scope
  fn visit_export_default_decl(&mut self, n: &ExportDefaultDecl) {
    if let DefaultDecl::Fn(function) = &n.decl {
      if let Some(name) = &function.ident {
        self.add(name, false);
      }
    }
    n.visit_children_with(self);
  }

  fn visit_var_declarator(&mut self, n: &VarDeclarator) {
    if let Some((name, is_forward_wrapped)) = match_var_component(n) {
      self.add(name, is_forward_wrapped);
    }
    n.visit_children_with(self);
  }
}

#[cfg(test)]
mod tests {
  use destructure_props_swc_runner::runner::jsx_syntax;
  use destructure_props_swc_runner::test_utils::{run_test_transform, RunTransformOptions};
  use pretty_assertions::assert_eq;

  use super::*;

  fn locate(code: &str) -> Vec<ComponentCandidate> {
    run_test_transform(
      RunTransformOptions {
        code,
        syntax: Some(jsx_syntax()),
      },
      |_ctx, module| locate_components(module),
    )
    .transform_result
  }

  fn candidate(name: &str, is_forward_wrapped: bool) -> ComponentCandidate {
    ComponentCandidate {
      name: name.into(),
      is_forward_wrapped,
    }
  }

  #[test]
  fn finds_named_function_declarations() {
    let found = locate("function Foo(props) { return null; }");
    assert_eq!(found, vec![candidate("Foo", false)]);
  }

  #[test]
  fn finds_export_default_function_declarations() {
    let found = locate("export default function Foo(props) { return null; }");
    assert_eq!(found, vec![candidate("Foo", false)]);
  }

  #[test]
  fn ignores_anonymous_export_default_functions() {
    let found = locate("export default function(props) { return null; }");
    assert_eq!(found, vec![]);
  }

  #[test]
  fn finds_arrow_functions_bound_to_a_name() {
    let found = locate("const Bar = (props) => <div />;");
    assert_eq!(found, vec![candidate("Bar", false)]);
  }

  #[test]
  fn finds_forward_ref_wrapped_arrows() {
    let found = locate("const Baz = forwardRef((props, ref) => <div ref={ref} />);");
    assert_eq!(found, vec![candidate("Baz", true)]);
  }

  #[test]
  fn ignores_lowercase_names() {
    let found = locate("function useFoo() { return 1; }\nconst helper = () => 2;");
    assert_eq!(found, vec![]);
  }

  #[test]
  fn ignores_unbound_function_expressions() {
    let found = locate("register(function Named() { return null; });");
    assert_eq!(found, vec![]);
  }

  #[test]
  fn keeps_source_order_and_deduplicates() {
    let found = locate(
      "function A() { return null; }\nconst B = () => null;\nfunction A() { return null; }",
    );
    assert_eq!(found, vec![candidate("A", false), candidate("B", false)]);
  }
}
