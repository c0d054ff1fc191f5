use crate::types::{in_world, BlockPos};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

const LIQUID_KEYWORDS: [&str; 3] = ["water", "lava", "liquid"];

/// One sampled block from a world scan, normalized from either wire encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockSample {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub code: SmolStr,
    /// Solid flag as reported by the game.
    pub solid: bool,
    /// Derived from the code; not part of the wire format.
    pub liquid: bool,
}

impl fmt::Display for BlockSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ ({}, {}, {})", self.code, self.x, self.y, self.z)?;
        if self.liquid {
            write!(f, " [liquid]")
        } else if self.solid {
            write!(f, " [solid]")
        } else {
            Ok(())
        }
    }
}

impl BlockSample {
    /// Creates a sample, deriving the liquid flag from `code`.
    pub fn new(pos: BlockPos, code: impl Into<SmolStr>, solid: bool) -> Self {
        let code = code.into();
        let liquid = is_liquid_code(&code);
        BlockSample {
            x: pos.0,
            y: pos.1,
            z: pos.2,
            code,
            solid,
            liquid,
        }
    }

    /// Solid block with the given code.
    pub fn solid(pos: BlockPos, code: impl Into<SmolStr>) -> Self {
        Self::new(pos, code, true)
    }

    /// Non-solid block with the given code.
    pub fn non_solid(pos: BlockPos, code: impl Into<SmolStr>) -> Self {
        Self::new(pos, code, false)
    }

    pub fn position(&self) -> BlockPos {
        (self.x, self.y, self.z)
    }

    pub fn below(&self) -> BlockPos {
        (self.x, self.y.saturating_sub(1), self.z)
    }

    /// Samples outside the world bounds are ignored by every model.
    pub fn is_in_world(&self) -> bool {
        in_world(self.position())
    }

    pub fn code_lower(&self) -> String {
        self.code.to_lowercase()
    }
}

/// Liquid detection is a case-insensitive substring match on the code.
pub fn is_liquid_code(code: &str) -> bool {
    let lower = code.to_lowercase();
    LIQUID_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// `""`, `"air"` and namespaced `"game:air"` all denote empty space.
pub fn is_air_code(code: &str) -> bool {
    let path = code.rsplit(':').next().unwrap_or(code);
    path.is_empty() || path.eq_ignore_ascii_case("air")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liquid_flag_is_derived() {
        assert!(BlockSample::non_solid((0, 0, 0), "game:water-still-7").liquid);
        assert!(BlockSample::non_solid((0, 0, 0), "game:Lava-flowing-3").liquid);
        assert!(BlockSample::non_solid((0, 0, 0), "mod:liquidmetal").liquid);
        assert!(!BlockSample::solid((0, 0, 0), "game:soil-medium-none").liquid);
    }

    #[test]
    fn test_air_code_detection() {
        assert!(is_air_code(""));
        assert!(is_air_code("air"));
        assert!(is_air_code("game:air"));
        assert!(!is_air_code("game:plankstairs-oak-down-west-free"));
        assert!(!is_air_code("game:fairylight"));
    }

    #[test]
    fn test_display() {
        let block = BlockSample::solid((1, 2, 3), "game:rock-granite");
        assert_eq!(block.to_string(), "game:rock-granite @ (1, 2, 3) [solid]");
    }
}
