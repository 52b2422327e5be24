// Core engine exports
pub mod error;
pub mod exclusion;
pub mod fast_match;
pub mod pair;
pub mod resolution;

pub use error::EngineError;
pub use exclusion::ExclusionLedger;
pub use fast_match::FastMatchEngine;
pub use pair::{PairKey, PairSide};
pub use resolution::MatchResolutionEngine;
