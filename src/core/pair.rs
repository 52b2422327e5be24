use crate::core::error::EngineError;

/// Which slot of a canonical pair a user occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairSide {
    Low,
    High,
}

impl PairSide {
    pub fn opposite(self) -> PairSide {
        match self {
            PairSide::Low => PairSide::High,
            PairSide::High => PairSide::Low,
        }
    }
}

/// Canonical identity of an unordered user pair.
///
/// The two ids are held with the lexicographically smaller one first, so
/// `(A, B)` and `(B, A)` produce the same key. Construction rejects
/// self-pairs, which keeps the `low < high` invariant strict.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    low: String,
    high: String,
}

impl PairKey {
    pub fn new(a: &str, b: &str) -> Result<Self, EngineError> {
        if a == b {
            return Err(EngineError::InvalidActor);
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self {
            low: low.to_string(),
            high: high.to_string(),
        })
    }

    pub fn low(&self) -> &str {
        &self.low
    }

    pub fn high(&self) -> &str {
        &self.high
    }

    /// Slot the given user occupies, or `None` for a stranger to this pair.
    pub fn side_of(&self, user_id: &str) -> Option<PairSide> {
        if user_id == self.low {
            Some(PairSide::Low)
        } else if user_id == self.high {
            Some(PairSide::High)
        } else {
            None
        }
    }

    /// Id of the user on the given side.
    pub fn id_on(&self, side: PairSide) -> &str {
        match side {
            PairSide::Low => &self.low,
            PairSide::High => &self.high,
        }
    }
}
