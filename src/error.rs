use std::path::PathBuf;

/// Errors raised while building rigs, chains or loading their descriptions.
///
/// Numerical degeneracy is not an error: a CCD update that cannot pick a
/// direction is skipped and reported through [`crate::ik::BoneUpdate`].
#[derive(Debug, thiserror::Error)]
pub enum IkError {
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("bone {bone} has parent {parent}; parents must precede their children")]
    ParentOrder { bone: usize, parent: usize },

    #[error("rig must contain at least one bone")]
    EmptyRig,

    #[error("chain must contain at least one bone")]
    EmptyChain,

    #[error("chain bone {ancestor} is not an ancestor of bone {bone}")]
    BrokenChain { bone: usize, ancestor: usize },

    #[error("chain was built for a different hierarchy ({expected} bones, rig has {found})")]
    RigMismatch { expected: usize, found: usize },

    #[error("unknown bone '{0}'")]
    UnknownBone(String),

    #[error("duplicate bone name '{0}'")]
    DuplicateBone(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse description: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IkError>;

pub(crate) fn check_index(what: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(IkError::IndexOutOfRange { what, index, len })
    }
}
