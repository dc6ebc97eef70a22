use std::collections::HashSet;

use indexmap::IndexMap;
use swc_core::atoms::{atom, Atom};
use swc_core::ecma::ast::{
  AssignOp, AssignTarget, Expr, KeyValueProp, MemberProp, Module, ModuleItem, Prop, PropName,
  PropOrSpread, SimpleAssignTarget, Stmt,
};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

/// Defaults of one `defaultProps` object literal, in source order.
pub type DefaultMap = IndexMap<Atom, Box<Expr>>;

/// Defaults drained from one `Component.defaultProps = { ... }` assignment.
/// One value per assignment keeps multiple assignments to the same
/// component from contaminating each other.
#[derive(Debug)]
pub struct ExtractedDefaults {
  pub component: Atom,
  pub props: DefaultMap,
}

/// Remove every `Name.defaultProps = { ... }` statement whose `Name` is a
/// located component and return the drained defaults, in source order.
pub fn strip_default_props(
  module: &mut Module,
  components: &HashSet<Atom>,
) -> Vec<ExtractedDefaults> {
  let mut extractor = DefaultPropsExtractor {
    components,
    extracted: vec![],
  };
  module.visit_mut_with(&mut extractor);
  extractor.extracted
}

struct DefaultPropsExtractor<'a> {
  components: &'a HashSet<Atom>,
  extracted: Vec<ExtractedDefaults>,
}

impl DefaultPropsExtractor<'_> {
  fn match_and_drain(&self, stmt: &mut Stmt) -> Option<ExtractedDefaults> {
    let Stmt::Expr(expr_stmt) = stmt else {
      return None;
    };
    let Expr::Assign(assign) = &mut *expr_stmt.expr else {
      return None;
    };
    if assign.op != AssignOp::Assign {
      return None;
    }
    let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &assign.left else {
      return None;
    };
    let Expr::Ident(object) = &*member.obj else {
      return None;
    };
    let MemberProp::Ident(member_name) = &member.prop else {
      return None;
    };
    if member_name.sym != atom!("defaultProps") || !self.components.contains(&object.sym) {
      return None;
    }
    let Expr::Object(literal) = &mut *assign.right else {
      return None;
    };

    let mut props = DefaultMap::default();
    for entry in literal.props.drain(..) {
      let PropOrSpread::Prop(entry) = entry else {
        continue;
      };
      match *entry {
        Prop::KeyValue(KeyValueProp {
          key: PropName::Ident(key),
          value,
        }) => {
          props.insert(key.sym, value);
        }
        Prop::Shorthand(ident) => {
          let key = ident.sym.clone();
          props.insert(key, Box::new(Expr::Ident(ident)));
        }
        // getters, setters, methods and non-identifier keys are not
        // init-style defaults
        _ => {}
      }
    }
    Some(ExtractedDefaults {
      component: object.sym.clone(),
      props,
    })
  }
}

impl VisitMut for DefaultPropsExtractor<'_> {
  fn visit_mut_module_items(&mut self, items: &mut Vec<ModuleItem>) {
    items.retain_mut(|item| {
      if let ModuleItem::Stmt(stmt) = item {
        if let Some(found) = self.match_and_drain(stmt) {
          self.extracted.push(found);
          return false;
        }
      }
      item.visit_mut_children_with(self);
      true
    });
  }

  fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
    stmts.retain_mut(|stmt| {
      if let Some(found) = self.match_and_drain(stmt) {
        self.extracted.push(found);
        return false;
      }
      stmt.visit_mut_children_with(self);
      true
    });
  }
}
