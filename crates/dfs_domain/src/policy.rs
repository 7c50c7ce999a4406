/// What `create_file` and `copy` do when the target already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    #[default]
    Reject,
    Overwrite,
}

impl WritePolicy {
    pub fn from_overwrite(overwrite: bool) -> Self {
        if overwrite {
            Self::Overwrite
        } else {
            Self::Reject
        }
    }

    pub fn overwrite(&self) -> bool {
        matches!(self, Self::Overwrite)
    }
}

/// What `copy` does when the target's parent directory is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentPolicy {
    /// Fail with InvalidArgument.
    #[default]
    Reject,
    CreateMissing,
}

impl ParentPolicy {
    pub fn from_create_missing(create_missing: bool) -> Self {
        if create_missing {
            Self::CreateMissing
        } else {
            Self::Reject
        }
    }
}
