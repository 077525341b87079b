use crate::models::Vote;

/// Direction requested by a `POST /vote` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Down,
    Neutral,
    Up,
}

impl VoteDirection {
    /// `None` for the neutral direction, which is never stored.
    pub fn upvoted(self) -> Option<bool> {
        match self {
            Self::Up => Some(true),
            Self::Down => Some(false),
            Self::Neutral => None,
        }
    }
}

impl TryFrom<i64> for VoteDirection {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Down),
            0 => Ok(Self::Neutral),
            1 => Ok(Self::Up),
            other => Err(other),
        }
    }
}

/// Result of reconciling a vote request against the stored vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    Created(Vote),
    Updated(Vote),
    /// Same direction as the stored vote; nothing was written.
    Unchanged(Vote),
    Removed,
}

impl VoteOutcome {
    pub fn vote(&self) -> Option<&Vote> {
        match self {
            Self::Created(v) | Self::Updated(v) | Self::Unchanged(v) => Some(v),
            Self::Removed => None,
        }
    }
}
