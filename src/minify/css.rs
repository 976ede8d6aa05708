//! Stylesheet minification through lightningcss.

use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

use super::MinifyFailure;

pub(super) fn minify_css(source: &[u8]) -> Result<Vec<u8>, MinifyFailure> {
  let text = std::str::from_utf8(source)?;

  let stylesheet = StyleSheet::parse(text, ParserOptions::default())
    .map_err(|err| MinifyFailure::Parse(err.to_string()))?;

  let output = stylesheet
    .to_css(PrinterOptions {
      minify: true,
      ..PrinterOptions::default()
    })
    .map_err(|err| MinifyFailure::Print(err.to_string()))?;

  Ok(output.code.into_bytes())
}
