//! Block classification.
//!
//! Classification is an ordered table of rules evaluated per sample; the
//! first matching rule decides. Samples no rule claims fall back to their
//! reported solid flag. Adding a block family means adding a table entry.

use crate::block::BlockSample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the planner treats a sampled block. Exactly one applies per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Water, lava and other liquids. A hazard, never walkable.
    Liquid,
    /// Reported solid, but the agent walks through it (plain leaves).
    PassableDespiteSolid,
    /// Reported non-solid, but still blocks movement (fences, doors, slabs...).
    /// Collides like a solid block, never serves as a floor.
    HiddenCollision,
    /// Ordinary solid block.
    Solid,
    /// Reported non-solid and unclaimed by any rule (air, plants, loose items).
    Open,
}

impl Classification {
    /// Whether the block occupies its cell for collision purposes.
    pub fn blocks_movement(self) -> bool {
        matches!(self, Classification::Solid | Classification::HiddenCollision)
    }

    /// Whether the block may be a walkable surface.
    pub fn is_surface_candidate(self) -> bool {
        self == Classification::Solid
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Classification::Liquid => "liquid",
            Classification::PassableDespiteSolid => "passable",
            Classification::HiddenCollision => "hidden-collision",
            Classification::Solid => "solid",
            Classification::Open => "open",
        };
        f.write_str(name)
    }
}

/// A family of block codes recognised by case-insensitive substrings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordFamily {
    pub name: &'static str,
    /// At least one must appear in the code.
    pub any_of: &'static [&'static str],
    /// Every one must also appear.
    pub all_of: &'static [&'static str],
    /// None may appear.
    pub none_of: &'static [&'static str],
}

impl KeywordFamily {
    pub const fn new(name: &'static str, any_of: &'static [&'static str]) -> Self {
        KeywordFamily {
            name,
            any_of,
            all_of: &[],
            none_of: &[],
        }
    }

    pub const fn requiring(self, all_of: &'static [&'static str]) -> Self {
        KeywordFamily { all_of, ..self }
    }

    pub const fn excluding(self, none_of: &'static [&'static str]) -> Self {
        KeywordFamily { none_of, ..self }
    }

    /// `code_lower` must already be lowercase.
    pub fn matches(&self, code_lower: &str) -> bool {
        self.any_of.iter().any(|kw| code_lower.contains(kw))
            && self.all_of.iter().all(|kw| code_lower.contains(kw))
            && !self.none_of.iter().any(|kw| code_lower.contains(kw))
    }
}

/// Leaves are walk-through unless woody or branchy.
pub const PASSABLE_FAMILIES: &[KeywordFamily] =
    &[KeywordFamily::new("leaves", &["leaves"]).excluding(&["woody", "branchy"])];

/// Blocks the game reports as non-solid that still collide with the agent.
pub const HIDDEN_COLLISION_FAMILIES: &[KeywordFamily] = &[
    KeywordFamily::new("fence", &["fence"]),
    KeywordFamily::new("door", &["door", "gate"]),
    KeywordFamily::new("chiseled", &["chiseled", "microblock"]),
    KeywordFamily::new("storage", &["chest", "storagevessel", "crate", "barrel"]),
    KeywordFamily::new(
        "crafting",
        &["anvil", "quern", "workbench", "clayoven", "toolrack"],
    ),
    KeywordFamily::new("bed", &["bed-"]),
    KeywordFamily::new("signpost", &["signpost"]),
    KeywordFamily::new("slab-stairs", &["slab", "stairs"]),
    KeywordFamily::new("ground-lantern", &["lantern"]).requiring(&["-up"]),
    KeywordFamily::new("wagon", &["wagon"]),
];

/// What a rule tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// The sample's derived liquid flag.
    Liquid,
    /// The code matches any family in the list.
    AnyFamily(&'static [KeywordFamily]),
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationRule {
    pub name: &'static str,
    pub predicate: Predicate,
    /// Restricts the rule to samples whose reported solid flag equals this.
    pub reported_solid: Option<bool>,
    pub class: Classification,
}

impl ClassificationRule {
    pub fn matches(&self, sample: &BlockSample, code_lower: &str) -> bool {
        if let Some(solid) = self.reported_solid {
            if sample.solid != solid {
                return false;
            }
        }
        match self.predicate {
            Predicate::Liquid => sample.liquid,
            Predicate::AnyFamily(families) => families.iter().any(|f| f.matches(code_lower)),
        }
    }

    /// Name of the first family this rule matched, for diagnostics.
    pub fn matched_family(&self, code_lower: &str) -> Option<&'static str> {
        match self.predicate {
            Predicate::Liquid => None,
            Predicate::AnyFamily(families) => families
                .iter()
                .find(|f| f.matches(code_lower))
                .map(|f| f.name),
        }
    }
}

pub const DEFAULT_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        name: "liquid",
        predicate: Predicate::Liquid,
        reported_solid: None,
        class: Classification::Liquid,
    },
    ClassificationRule {
        name: "passable-leaves",
        predicate: Predicate::AnyFamily(PASSABLE_FAMILIES),
        reported_solid: Some(true),
        class: Classification::PassableDespiteSolid,
    },
    ClassificationRule {
        name: "hidden-collision",
        predicate: Predicate::AnyFamily(HIDDEN_COLLISION_FAMILIES),
        reported_solid: Some(false),
        class: Classification::HiddenCollision,
    },
];

/// Outcome of classifying one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub class: Classification,
    /// Deciding rule, `None` for the reported-flag fallback.
    pub rule: Option<&'static str>,
    pub family: Option<&'static str>,
}

/// Ordered rule table with a reported-flag fallback.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<ClassificationRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier {
            rules: DEFAULT_RULES.to_vec(),
        }
    }
}

impl Classifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table: every sample falls back to its reported flag.
    pub fn empty() -> Self {
        Classifier { rules: Vec::new() }
    }

    /// Appends a rule, evaluated after the existing ones.
    pub fn with_rule(mut self, rule: ClassificationRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn classify(&self, sample: &BlockSample) -> Classification {
        self.explain(sample).class
    }

    /// Classifies and reports which rule and family decided.
    pub fn explain(&self, sample: &BlockSample) -> Verdict {
        let code_lower = sample.code_lower();
        match self
            .rules
            .iter()
            .find(|rule| rule.matches(sample, &code_lower))
        {
            Some(rule) => Verdict {
                class: rule.class,
                rule: Some(rule.name),
                family: rule.matched_family(&code_lower),
            },
            None => Verdict {
                class: if sample.solid {
                    Classification::Solid
                } else {
                    Classification::Open
                },
                rule: None,
                family: None,
            },
        }
    }
}

/// Classifies with the default table.
pub fn classify(sample: &BlockSample) -> Classification {
    Classifier::default().classify(sample)
}
