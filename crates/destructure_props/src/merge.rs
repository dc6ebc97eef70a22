use swc_core::atoms::{atom, Atom};
use swc_core::common::DUMMY_SP;
use swc_core::ecma::ast::{
  AssignExpr, AssignOp, AssignPat, AssignTarget, BlockStmt, Decl, Expr, ExprStmt, Ident,
  IdentName, Invalid, MemberExpr, MemberProp, ObjectPatProp, Pat, PropName, SimpleAssignTarget,
  Stmt, VarDeclKind, VarDeclarator,
};
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

use crate::extract::DefaultMap;
use crate::value_shape::{DefaultValue, UnsupportedValueShape};
use crate::QuoteStyle;

/// Fold a component's defaults into its `const { ... } = props` declaration
/// and flush whatever is left as `target.prop ??= value;` statements right
/// after it.
///
/// The map is drained progressively: entries folded into the pattern are
/// claimed first, the remainder is flushed in `defaultProps` order. When no
/// matching declaration exists the map is left untouched for the caller to
/// report.
pub fn merge_into_body(
  body: &mut BlockStmt,
  defaults: &mut DefaultMap,
  quote: QuoteStyle,
) -> Result<(), UnsupportedValueShape> {
  let mut merger = DestructureMerger {
    defaults,
    quote,
    error: None,
  };
  body.visit_mut_with(&mut merger);
  match merger.error {
    Some(error) => Err(error),
    None => Ok(()),
  }
}

struct DestructureMerger<'a> {
  defaults: &'a mut DefaultMap,
  quote: QuoteStyle,
  error: Option<UnsupportedValueShape>,
}

impl DestructureMerger<'_> {
  /// Claim one default by key. `Ok(None)` covers both "no default for this
  /// key" and the explicit-`undefined` default, which is consumed without
  /// emitting anything.
  fn claim(&mut self, key: &Atom) -> Result<Option<Expr>, UnsupportedValueShape> {
    let Some(value) = self.defaults.shift_remove(key) else {
      return Ok(None);
    };
    DefaultValue::classify(*value).rebuild(self.quote)
  }

  fn merge_declarator(
    &mut self,
    declarator: &mut VarDeclarator,
  ) -> Result<Vec<Stmt>, UnsupportedValueShape> {
    let Pat::Object(pattern) = &mut declarator.name else {
      return Ok(vec![]);
    };

    let mut rest_target: Option<Ident> = None;
    for field in pattern.props.iter_mut() {
      match field {
        ObjectPatProp::Rest(rest) => {
          if let Pat::Ident(binding) = &*rest.arg {
            rest_target = Some(binding.id.clone());
          }
        }
        ObjectPatProp::Assign(field) => {
          let key = field.key.id.sym.clone();
          let Some(value) = self.claim(&key)? else {
            continue;
          };
          field.value = Some(Box::new(value));
        }
        ObjectPatProp::KeyValue(field) => {
          let PropName::Ident(key) = &field.key else {
            continue;
          };
          let key = key.sym.clone();
          let Some(value) = self.claim(&key)? else {
            continue;
          };
          // the local alias stays; only the default changes
          match &mut *field.value {
            Pat::Assign(existing) => existing.right = Box::new(value),
            _ => {
              let alias =
                std::mem::replace(&mut *field.value, Pat::Invalid(Invalid { span: DUMMY_SP }));
              *field.value = Pat::Assign(AssignPat {
                span: DUMMY_SP,
                left: Box::new(alias),
                right: Box::new(value),
              });
            }
          }
        }
      }
    }

    let props_ident = match declarator.init.as_deref() {
      Some(Expr::Ident(ident)) => ident.clone(),
      _ => Ident::new_no_ctxt(atom!("props"), DUMMY_SP),
    };
    let target = rest_target.unwrap_or(props_ident);

    let mut fallback_stmts = Vec::with_capacity(self.defaults.len());
    for (prop, value) in std::mem::take(self.defaults) {
      let Some(value) = DefaultValue::classify(*value).rebuild(self.quote)? else {
        continue;
      };
      fallback_stmts.push(fallback_statement(&target, prop, value));
    }
    Ok(fallback_stmts)
  }

  /// Merge into the statement at `index` if it is a `props` destructuring
  /// declaration; returns how many fallback statements were spliced in.
  fn try_merge_at(
    &mut self,
    stmts: &mut Vec<Stmt>,
    index: usize,
  ) -> Result<Option<usize>, UnsupportedValueShape> {
    let Some(declarator_index) = match_props_destructure(&stmts[index]) else {
      return Ok(None);
    };
    let fallback_stmts = {
      let Stmt::Decl(Decl::Var(declaration)) = &mut stmts[index] else {
        return Ok(None);
      };
      self.merge_declarator(&mut declaration.decls[declarator_index])?
    };
    let inserted = fallback_stmts.len();
    stmts.splice(index + 1..index + 1, fallback_stmts);
    Ok(Some(inserted))
  }
}

impl VisitMut for DestructureMerger<'_> {
  fn visit_mut_stmts(&mut self, stmts: &mut Vec<Stmt>) {
    let mut index = 0;
    while index < stmts.len() {
      if self.error.is_some() || self.defaults.is_empty() {
        return;
      }
      match self.try_merge_at(stmts, index) {
        Ok(Some(inserted)) => index += inserted + 1,
        Ok(None) => {
          stmts[index].visit_mut_children_with(self);
          index += 1;
        }
        Err(error) => {
          self.error = Some(error);
          return;
        }
      }
    }
  }
}

/// The first declarator of a `const` declaration destructuring an object
/// pattern from an initializer literally named `props`, if any.
fn match_props_destructure(stmt: &Stmt) -> Option<usize> {
  let Stmt::Decl(Decl::Var(declaration)) = stmt else {
    return None;
  };
  if declaration.kind != VarDeclKind::Const {
    return None;
  }
  declaration.decls.iter().position(|declarator| {
    matches!(declarator.name, Pat::Object(_))
      && matches!(
        declarator.init.as_deref(),
        Some(Expr::Ident(init)) if init.sym == atom!("props")
      )
  })
}

fn fallback_statement(target: &Ident, prop: Atom, value: Expr) -> Stmt {
  let mut target = target.clone();
  target.span = DUMMY_SP;
  let member = MemberExpr {
    span: DUMMY_SP,
    obj: Box::new(Expr::Ident(target)),
    prop: MemberProp::Ident(IdentName {
      span: DUMMY_SP,
      sym: prop,
    }),
  };
  Stmt::Expr(ExprStmt {
    span: DUMMY_SP,
    expr: Box::new(Expr::Assign(AssignExpr {
      span: DUMMY_SP,
      op: AssignOp::NullishAssign,
      left: AssignTarget::Simple(SimpleAssignTarget::Member(member)),
      right: Box::new(value),
    })),
  })
}
