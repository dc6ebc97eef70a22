use swc_core::atoms::atom;
use swc_core::common::{Span, Spanned, DUMMY_SP};
use swc_core::ecma::ast::{
  Bool, Expr, Lit, MemberProp, Null, Number, Str,
};

use crate::QuoteStyle;

/// Raised when a default value does not match any relocatable shape.
/// Fatal for the whole file; a partially migrated component is worse than
/// an explicit abort.
#[derive(Debug, thiserror::Error)]
#[error("unsupported defaultProps value: {kind}")]
pub struct UnsupportedValueShape {
  pub kind: &'static str,
  pub span: Span,
  /// The offending expression, kept for caller diagnostics.
  pub node: Box<Expr>,
}

/// Closed set of expression shapes that can be copied into a new lexical
/// position without changing meaning. Anything outside this set may capture
/// evaluation context (`this`, surrounding scope tricks) and is refused
/// rather than relocated.
#[derive(Debug)]
pub enum DefaultValue {
  /// String, number, boolean or `null` literal.
  Literal(Lit),
  Jsx(Box<swc_core::ecma::ast::JSXElement>),
  /// `object.property` where the object is a plain identifier.
  Member(swc_core::ecma::ast::MemberExpr),
  Arrow(swc_core::ecma::ast::ArrowExpr),
  /// Function expression carrying its own name.
  NamedFunction(swc_core::ecma::ast::FnExpr),
  /// `new Callee(...)` with an identifier callee.
  New(swc_core::ecma::ast::NewExpr),
  Object(swc_core::ecma::ast::ObjectLit),
  Array(swc_core::ecma::ast::ArrayLit),
  /// The identifier `undefined`: the prop already defaults to it, so no
  /// default needs to be emitted anywhere.
  Undefined,
  Ident(swc_core::ecma::ast::Ident),
  Call(swc_core::ecma::ast::CallExpr),
  Conditional(swc_core::ecma::ast::CondExpr),
  Binary(swc_core::ecma::ast::BinExpr),
  Unary(swc_core::ecma::ast::UnaryExpr),
  Unsupported(Box<Expr>),
}

impl DefaultValue {
  pub fn classify(expr: Expr) -> DefaultValue {
    match expr {
      // SWC keeps explicit paren nodes; they carry no meaning here
      Expr::Paren(paren) => DefaultValue::classify(*paren.expr),
      Expr::Lit(lit @ (Lit::Str(_) | Lit::Num(_) | Lit::Bool(_) | Lit::Null(_))) => {
        DefaultValue::Literal(lit)
      }
      Expr::JSXElement(element) => DefaultValue::Jsx(element),
      Expr::Member(member)
        if member.obj.is_ident() && matches!(member.prop, MemberProp::Ident(_)) =>
      {
        DefaultValue::Member(member)
      }
      Expr::Arrow(arrow) => DefaultValue::Arrow(arrow),
      Expr::Fn(function) if function.ident.is_some() => DefaultValue::NamedFunction(function),
      Expr::New(new_expr) if new_expr.callee.is_ident() => DefaultValue::New(new_expr),
      Expr::Object(object) => DefaultValue::Object(object),
      Expr::Array(array) => DefaultValue::Array(array),
      Expr::Ident(ident) if ident.sym == atom!("undefined") => DefaultValue::Undefined,
      Expr::Ident(ident) => DefaultValue::Ident(ident),
      Expr::Call(call) => DefaultValue::Call(call),
      Expr::Cond(conditional) => DefaultValue::Conditional(conditional),
      Expr::Bin(binary) => DefaultValue::Binary(binary),
      Expr::Unary(unary) => DefaultValue::Unary(unary),
      other => DefaultValue::Unsupported(Box::new(other)),
    }
  }

  /// Build a detached copy of the classified expression, ready to be placed
  /// at a new tree location. `Ok(None)` is the explicit-`undefined` signal:
  /// emit nothing for this prop.
  pub fn rebuild(self, quote: QuoteStyle) -> Result<Option<Expr>, UnsupportedValueShape> {
    let expr = match self {
      DefaultValue::Literal(lit) => Expr::Lit(rebuild_literal(lit, quote)),
      DefaultValue::Jsx(mut element) => {
        element.span = DUMMY_SP;
        Expr::JSXElement(element)
      }
      DefaultValue::Member(mut member) => {
        member.span = DUMMY_SP;
        if let Expr::Ident(object) = &mut *member.obj {
          object.span = DUMMY_SP;
        }
        Expr::Member(member)
      }
      DefaultValue::Arrow(mut arrow) => {
        arrow.span = DUMMY_SP;
        Expr::Arrow(arrow)
      }
      DefaultValue::NamedFunction(mut function) => {
        function.function.span = DUMMY_SP;
        if let Some(name) = &mut function.ident {
          name.span = DUMMY_SP;
        }
        Expr::Fn(function)
      }
      DefaultValue::New(mut new_expr) => {
        new_expr.span = DUMMY_SP;
        if let Expr::Ident(callee) = &mut *new_expr.callee {
          callee.span = DUMMY_SP;
        }
        Expr::New(new_expr)
      }
      DefaultValue::Object(mut object) => {
        object.span = DUMMY_SP;
        Expr::Object(object)
      }
      DefaultValue::Array(mut array) => {
        array.span = DUMMY_SP;
        Expr::Array(array)
      }
      DefaultValue::Undefined => return Ok(None),
      DefaultValue::Ident(mut ident) => {
        ident.span = DUMMY_SP;
        Expr::Ident(ident)
      }
      DefaultValue::Call(mut call) => {
        call.span = DUMMY_SP;
        Expr::Call(call)
      }
      DefaultValue::Conditional(mut conditional) => {
        conditional.span = DUMMY_SP;
        Expr::Cond(conditional)
      }
      DefaultValue::Binary(mut binary) => {
        binary.span = DUMMY_SP;
        Expr::Bin(binary)
      }
      DefaultValue::Unary(mut unary) => {
        unary.span = DUMMY_SP;
        Expr::Unary(unary)
      }
      DefaultValue::Unsupported(node) => {
        return Err(UnsupportedValueShape {
          kind: expr_kind(&node),
          span: node.span(),
          node,
        })
      }
    };
    Ok(Some(expr))
  }
}

fn rebuild_literal(lit: Lit, quote: QuoteStyle) -> Lit {
  match lit {
    Lit::Str(string) => Lit::Str(Str {
      span: DUMMY_SP,
      raw: Some(render_str_raw(&string.value, quote).into()),
      value: string.value,
    }),
    Lit::Num(number) => Lit::Num(Number {
      span: DUMMY_SP,
      value: number.value,
      raw: None,
    }),
    Lit::Bool(boolean) => Lit::Bool(Bool {
      span: DUMMY_SP,
      value: boolean.value,
    }),
    Lit::Null(_) => Lit::Null(Null { span: DUMMY_SP }),
    // classify only admits the four shapes above
    other => other,
  }
}

/// Quote and escape a relocated string literal per the configured style.
fn render_str_raw(value: &str, quote: QuoteStyle) -> String {
  let quote_char = match quote {
    QuoteStyle::Single => '\'',
    QuoteStyle::Double => '"',
  };
  let mut raw = String::with_capacity(value.len() + 2);
  raw.push(quote_char);
  for c in value.chars() {
    match c {
      '\\' => raw.push_str("\\\\"),
      '\n' => raw.push_str("\\n"),
      '\r' => raw.push_str("\\r"),
      '\t' => raw.push_str("\\t"),
      c if c == quote_char => {
        raw.push('\\');
        raw.push(c);
      }
      c => raw.push(c),
    }
  }
  raw.push(quote_char);
  raw
}

fn expr_kind(expr: &Expr) -> &'static str {
  match expr {
    Expr::Tpl(_) => "template literal",
    Expr::TaggedTpl(_) => "tagged template",
    Expr::Seq(_) => "sequence expression",
    Expr::This(_) => "this expression",
    Expr::Class(_) => "class expression",
    Expr::Fn(_) => "anonymous function expression",
    Expr::Member(_) => "member expression",
    Expr::New(_) => "new expression",
    Expr::Await(_) => "await expression",
    Expr::Yield(_) => "yield expression",
    Expr::Assign(_) => "assignment expression",
    Expr::OptChain(_) => "optional chain",
    Expr::Lit(Lit::Regex(_)) => "regular expression literal",
    Expr::Lit(Lit::BigInt(_)) => "bigint literal",
    Expr::JSXFragment(_) => "JSX fragment",
    _ => "expression",
  }
}
