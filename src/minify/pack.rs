//! Best-effort script obfuscation via base64 packing.

use base64::{Engine as _, engine::general_purpose};

/// Wrap minified script bytes in a self-decoding `eval(atob(…))` bootstrap.
///
/// This is a packer, not a real obfuscator: the transform is trivially
/// reversible and never mis-parses its input. `atob` decodes to a Latin-1
/// byte string, so only sources whose bytes survive that round trip are
/// reproduced faithfully; the stage is opt-in and explicitly best-effort.
pub fn pack_script(source: &[u8]) -> Vec<u8> {
  let encoded = general_purpose::STANDARD.encode(source);
  format!("eval(atob(\"{encoded}\"));").into_bytes()
}
