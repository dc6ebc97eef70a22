use swc_core::ecma::ast::Module;
use swc_core::ecma::visit::VisitMut;

use crate::runner::{run_transform, run_visit};
pub use crate::runner::{RunContext, RunTransformOptions, RunTransformOutput, RunVisitResult};

/// Helper to test SWC transformations.
///
/// Same as [`run_transform`] but panics on parse or print failures.
pub fn run_test_transform<R>(
  options: RunTransformOptions,
  transform: impl FnOnce(RunContext, &mut Module) -> R,
) -> RunTransformOutput<R> {
  run_transform(options, transform).unwrap()
}

/// Same as [`run_visit`] but panics on parse or print failures.
pub fn run_test_visit<V: VisitMut>(
  options: RunTransformOptions,
  make_visit: impl FnOnce(RunContext) -> V,
) -> RunVisitResult<V> {
  run_visit(options, make_visit).unwrap()
}
