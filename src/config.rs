//! This source code is licensed under the MIT license found in the
//! LICENSE file in the root directory of this source tree.

/// Digest-time configuration. CVS had exactly one knob that reaches this
/// layer: whether to suppress the warning log (`nowarn`). Configuration for
/// the lexer or the commit-fusion stage belongs to a different layer.
#[derive(Clone, Copy, Debug)]
pub struct DigestConfig {
    pub nowarn: bool,
}

impl Default for DigestConfig {
    fn default() -> Self {
        DigestConfig { nowarn: false }
    }
}
