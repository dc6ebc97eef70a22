use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use destructure_props::{migrate_source, MigrationOptions, MigrationOutput, PrintOptions, QuoteStyle};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QuoteArg {
  Single,
  Double,
}

impl From<QuoteArg> for QuoteStyle {
  fn from(quote: QuoteArg) -> Self {
    match quote {
      QuoteArg::Single => QuoteStyle::Single,
      QuoteArg::Double => QuoteStyle::Double,
    }
  }
}

/// Rewrites React `Component.defaultProps = {...}` assignments into props
/// destructuring defaults.
#[derive(Debug, Parser)]
#[command(name = "destructure-props", version)]
struct Args {
  /// Files or directories to transform. Globs like src/**/*.jsx are expanded
  paths: Vec<String>,
  /// Bypass the git safety check and run on a dirty working tree
  #[arg(long)]
  force: bool,
  /// Report what would change without writing any file
  #[arg(long)]
  dry: bool,
  /// Print transformed files to stdout
  #[arg(long)]
  print: bool,
  /// Quote style for string literals the codemod has to re-render
  #[arg(long, value_enum, default_value_t = QuoteArg::Single)]
  quote: QuoteArg,
  /// Accepted for compatibility with earlier releases; React import
  /// detection is not performed
  #[arg(long = "explicit-require", default_value_t = true, action = clap::ArgAction::Set)]
  explicit_require: bool,
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  if args.paths.is_empty() {
    bail!("no files or directories given");
  }
  if !args.explicit_require {
    tracing::warn!("--explicit-require has no effect; every matching file is transformed");
  }
  // A dry run writes nothing, so a dirty tree cannot be damaged
  if !args.dry {
    check_git_status(args.force)?;
  }

  let files = collect_files(&args.paths)?;
  if files.is_empty() {
    bail!("no .js or .jsx files found under {}", args.paths.join(" "));
  }

  let options = MigrationOptions {
    print_options: PrintOptions {
      quote: args.quote.into(),
    },
  };

  let mut changed = 0usize;
  let mut failed = 0usize;
  for file in &files {
    match migrate_file(file, &options, &args) {
      Ok(true) => changed += 1,
      Ok(false) => {}
      Err(error) => {
        tracing::error!(file = %file.display(), "{error:#}");
        failed += 1;
      }
    }
  }

  tracing::info!(
    "{} of {} files {}, {} failed",
    changed,
    files.len(),
    if args.dry { "would change" } else { "changed" },
    failed
  );
  if failed > 0 {
    bail!("{failed} of {} files failed", files.len());
  }
  Ok(())
}

/// Migrate one file on disk. Returns whether the file content changed;
/// unchanged files are never rewritten.
fn migrate_file(path: &Path, options: &MigrationOptions, args: &Args) -> anyhow::Result<bool> {
  let source = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read {}", path.display()))?;
  let MigrationOutput { code, report } = migrate_source(&source, options)
    .with_context(|| format!("failed to transform {}", path.display()))?;

  for unapplied in &report.unapplied {
    tracing::warn!(
      file = %path.display(),
      component = %unapplied.component,
      props = ?unapplied.props,
      "defaultProps removed without a matching props destructuring declaration"
    );
  }
  if report.transformed.is_empty() && report.unapplied.is_empty() {
    return Ok(false);
  }

  if args.print {
    println!("{code}");
  }
  if !args.dry {
    std::fs::write(path, &code).with_context(|| format!("failed to write {}", path.display()))?;
  }
  tracing::info!(
    file = %path.display(),
    components = ?report.transformed,
    "migrated defaultProps"
  );
  Ok(true)
}

/// Refuse to rewrite files in a dirty git working tree unless forced.
/// Running outside a git repository counts as clean, matching the usual
/// codemod convention.
fn check_git_status(force: bool) -> anyhow::Result<()> {
  let output = match Command::new("git").arg("status").arg("--porcelain").output() {
    Ok(output) => output,
    Err(error) => {
      tracing::debug!("could not run git: {error}");
      return Ok(());
    }
  };
  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.to_lowercase().contains("not a git repository") {
      return Ok(());
    }
    tracing::debug!("git status failed: {}", stderr.trim());
    return Ok(());
  }
  if output.stdout.is_empty() {
    return Ok(());
  }
  if force {
    tracing::warn!("git working tree is not clean, forcibly continuing");
    return Ok(());
  }
  bail!("git working tree is not clean; stash or commit your changes, or pass --force");
}

fn is_js_source(path: &Path) -> bool {
  matches!(
    path.extension().and_then(|extension| extension.to_str()),
    Some("js" | "jsx")
  )
}

/// Expand the positional arguments into a sorted, deduplicated list of
/// JavaScript files. Arguments containing `*` go through glob expansion,
/// directories are walked recursively, plain files are taken as given.
fn collect_files(paths: &[String]) -> anyhow::Result<Vec<PathBuf>> {
  let mut files = Vec::new();
  for raw in paths {
    if raw.contains('*') {
      for entry in glob::glob(raw).with_context(|| format!("invalid glob pattern {raw}"))? {
        let entry = entry?;
        if entry.is_file() && is_js_source(&entry) {
          files.push(entry);
        }
      }
      continue;
    }

    let path = PathBuf::from(raw);
    if path.is_dir() {
      for entry in jwalk::WalkDir::new(&path) {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path.is_file() && is_js_source(&entry_path) {
          files.push(entry_path);
        }
      }
    } else if path.is_file() {
      files.push(path);
    } else {
      bail!("no such file or directory: {raw}");
    }
  }
  files.sort();
  files.dedup();
  Ok(files)
}
