use thiserror::Error;

use crate::options::OptionTag;

/// Errors of the reply option table accessors.
///
/// Every variant means the peer sent something the hammer cannot react to,
/// so callers skip the message instead of bailing out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Option {0} is missing")]
    MissingOption(OptionTag),
    #[error("Option {tag} is {actual} bytes long, expected at least {expected}")]
    ShortOption {
        tag: OptionTag,
        expected: usize,
        actual: usize,
    },
}
