use std::string::FromUtf8Error;

use swc_core::common::comments::{Comments, SingleThreadedComments};
use swc_core::common::input::StringInput;
use swc_core::common::sync::Lrc;
use swc_core::common::{FileName, Globals, Mark, SourceMap, GLOBALS};
use swc_core::ecma::ast::Module;
use swc_core::ecma::codegen::text_writer::JsWriter;
use swc_core::ecma::codegen::Emitter;
use swc_core::ecma::parser::lexer::Lexer;
use swc_core::ecma::parser::{EsSyntax, Parser, Syntax};
use swc_core::ecma::transforms::base::resolver;
use swc_core::ecma::visit::{VisitMut, VisitMutWith};

/// ES syntax with JSX enabled, the parse mode for React sources.
pub fn jsx_syntax() -> Syntax {
  Syntax::Es(EsSyntax {
    jsx: true,
    ..Default::default()
  })
}

pub struct RunContext {
  /// Source-map in use
  pub source_map: Lrc<SourceMap>,
  /// Global mark from SWC resolver
  pub global_mark: Mark,
  /// Unresolved mark from SWC resolver
  pub unresolved_mark: Mark,
}

pub struct RunTransformOptions<'a> {
  pub code: &'a str,
  /// Parse syntax; `None` means plain ES without JSX.
  pub syntax: Option<Syntax>,
}

impl<'a> RunTransformOptions<'a> {
  pub fn new(code: &'a str) -> Self {
    RunTransformOptions { code, syntax: None }
  }
}

pub struct RunTransformOutput<R> {
  pub output_code: String,
  pub transform_result: R,
}

pub struct RunVisitResult<V> {
  pub output_code: String,
  #[allow(unused)]
  pub visitor: V,
}

#[derive(Debug, thiserror::Error)]
pub enum RunTransformError {
  #[error("Failed to parse module")]
  SwcParse(swc_core::ecma::parser::error::Error),
  #[error("IO Error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Invalid utf-8 output: {0}")]
  InvalidUtf8Output(#[from] FromUtf8Error),
}

/// Runner of SWC transformations
///
/// * Parse `code` with SWC, collecting comments so they survive reprinting
/// * Run resolver, then the caller's transform over the module
/// * Codegen and return the output alongside the transform's result
pub fn run_transform<R>(
  options: RunTransformOptions,
  transform: impl FnOnce(RunContext, &mut Module) -> R,
) -> Result<RunTransformOutput<R>, RunTransformError> {
  let source_map = Lrc::new(SourceMap::default());
  let source_file = source_map.new_source_file(Lrc::new(FileName::Anon), options.code.into());
  let comments = SingleThreadedComments::default();

  let lexer = Lexer::new(
    options.syntax.unwrap_or_default(),
    Default::default(),
    StringInput::from(&*source_file),
    Some(&comments),
  );

  let mut parser = Parser::new_from(lexer);
  let mut module = parser
    .parse_module()
    .map_err(RunTransformError::SwcParse)?;

  GLOBALS.set(
    &Globals::new(),
    || -> Result<RunTransformOutput<R>, RunTransformError> {
      let global_mark = Mark::new();
      let unresolved_mark = Mark::new();
      module.visit_mut_with(&mut resolver(unresolved_mark, global_mark, false));

      let context = RunContext {
        source_map: source_map.clone(),
        global_mark,
        unresolved_mark,
      };
      let transform_result = transform(context, &mut module);

      let mut output_buffer = vec![];
      let writer = JsWriter::new(source_map.clone(), "\n", &mut output_buffer, None);
      let mut emitter = Emitter {
        cfg: Default::default(),
        cm: source_map.clone(),
        comments: Some(&comments as &dyn Comments),
        wr: writer,
      };
      emitter.emit_module(&module)?;
      let output_code = String::from_utf8(output_buffer)?;

      Ok(RunTransformOutput {
        output_code,
        transform_result,
      })
    },
  )
}

/// Run a `VisitMut` over parsed code and return the printed result.
pub fn run_visit<V: VisitMut>(
  options: RunTransformOptions,
  make_visit: impl FnOnce(RunContext) -> V,
) -> Result<RunVisitResult<V>, RunTransformError> {
  let RunTransformOutput {
    output_code,
    transform_result: visitor,
  } = run_transform(options, |context, module: &mut Module| {
    let mut visit = make_visit(context);
    module.visit_mut_with(&mut visit);
    visit
  })?;
  Ok(RunVisitResult {
    output_code,
    visitor,
  })
}

#[cfg(test)]
mod tests {
  use swc_core::ecma::ast::{Lit, Str};
  use swc_core::ecma::visit::VisitMut;

  use super::*;

  #[test]
  fn test_run_visit() {
    struct Visitor;
    impl VisitMut for Visitor {
      fn visit_mut_lit(&mut self, n: &mut Lit) {
        *n = Lit::Str(Str::from("replacement"));
      }
    }

    let code = r#"console.log('test!')"#;
    let RunVisitResult { output_code, .. } =
      run_visit(RunTransformOptions::new(code), |_: RunContext| Visitor).unwrap();
    assert_eq!(
      output_code,
      r#"console.log("replacement");
"#
    );
  }

  #[test]
  fn test_comments_survive_reprinting() {
    struct Noop;
    impl VisitMut for Noop {}

    let code = "// leading\nconst a = 1;\n";
    let RunVisitResult { output_code, .. } =
      run_visit(RunTransformOptions::new(code), |_: RunContext| Noop).unwrap();
    assert_eq!(output_code, "// leading\nconst a = 1;\n");
  }
}
