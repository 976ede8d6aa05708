//! Script minification through oxc.

use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

use super::MinifyFailure;

pub(super) fn minify_js(source: &[u8]) -> Result<Vec<u8>, MinifyFailure> {
  let text = std::str::from_utf8(source)?;

  let allocator = Allocator::default();
  // Page scripts are classic scripts, not modules.
  let source_type = SourceType::cjs();
  let parsed = Parser::new(&allocator, text, source_type).parse();
  if let Some(error) = parsed.errors.first() {
    return Err(MinifyFailure::Parse(error.to_string()));
  }

  let mut program = parsed.program;
  // No mangling: tags on the same page share globals, and renaming them
  // would break references from other scripts.
  let options = MinifierOptions {
    mangle: None,
    compress: Some(CompressOptions::smallest()),
  };
  let minified = Minifier::new(options).minify(&allocator, &mut program);

  let code = Codegen::new()
    .with_options(CodegenOptions {
      minify: true,
      comments: CommentOptions::disabled(),
      ..CodegenOptions::default()
    })
    .with_scoping(minified.scoping)
    .build(&program)
    .code;

  Ok(code.into_bytes())
}
