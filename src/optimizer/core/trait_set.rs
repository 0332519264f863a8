use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use strum_macros::{AsRefStr, Display};

/// A calling convention names the execution strategy able to produce a node's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Convention(&'static str);

impl Convention {
    /// Abstract plans, as produced by the planner. Nothing can execute them.
    pub const NONE: Convention = Convention("NONE");
    /// Plans executed by the native execution engine.
    pub const NATIVE: Convention = Convention("NATIVE");
    /// Plans realized as generated tuple iterators.
    pub const ITERATOR: Convention = Convention("ITERATOR");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Convention {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum SortDirection {
    #[strum(serialize = "ASC")]
    Asc,
    #[strum(serialize = "DESC")]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldCollation {
    pub field: usize,
    pub direction: SortDirection,
}

impl FieldCollation {
    pub fn asc(field: usize) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: usize) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

impl fmt::Display for FieldCollation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr)]
pub enum TraitKind {
    CallingConvention,
    Collation,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TraitValue {
    Convention(Convention),
    Collation(Vec<FieldCollation>),
}

impl TraitValue {
    pub fn kind(&self) -> TraitKind {
        match self {
            TraitValue::Convention(_) => TraitKind::CallingConvention,
            TraitValue::Collation(_) => TraitKind::Collation,
        }
    }

    /// Whether a producer carrying `self` can feed a consumer requiring `required`.
    fn satisfies(&self, required: &TraitValue) -> bool {
        match (self, required) {
            // sorted on (a, b) is also sorted on (a)
            (TraitValue::Collation(actual), TraitValue::Collation(required)) => {
                actual.starts_with(required)
            }
            (actual, required) => actual == required,
        }
    }
}

impl fmt::Display for TraitValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TraitValue::Convention(c) => write!(f, "{}", c),
            TraitValue::Collation(fields) => write!(f, "[{}]", fields.iter().join(", ")),
        }
    }
}

/// Physical properties attached to a plan node, one value per [`TraitKind`].
///
/// A trait set always carries a calling convention. It is never changed in place: the `with_*`
/// methods return a new set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraitSet {
    traits: BTreeMap<TraitKind, TraitValue>,
}

impl TraitSet {
    pub fn new(convention: Convention) -> Self {
        let mut traits = BTreeMap::new();
        traits.insert(
            TraitKind::CallingConvention,
            TraitValue::Convention(convention),
        );
        Self { traits }
    }

    pub fn convention(&self) -> Convention {
        match self.traits.get(&TraitKind::CallingConvention) {
            Some(TraitValue::Convention(c)) => *c,
            _ => unreachable!("trait set without calling convention"),
        }
    }

    pub fn get(&self, kind: TraitKind) -> Option<&TraitValue> {
        self.traits.get(&kind)
    }

    pub fn with(&self, value: TraitValue) -> Self {
        let mut traits = self.traits.clone();
        traits.insert(value.kind(), value);
        Self { traits }
    }

    pub fn with_convention(&self, convention: Convention) -> Self {
        self.with(TraitValue::Convention(convention))
    }

    pub fn with_collation(&self, collation: Vec<FieldCollation>) -> Self {
        self.with(TraitValue::Collation(collation))
    }

    /// Returns true if, for every kind `desired` constrains, this set carries a value that
    /// satisfies it. Kinds absent from `desired` are unconstrained.
    pub fn satisfies(&self, desired: &TraitSet) -> bool {
        desired
            .traits
            .iter()
            .all(|(kind, required)| match self.traits.get(kind) {
                Some(actual) => actual.satisfies(required),
                None => matches!(required, TraitValue::Collation(fields) if fields.is_empty()),
            })
    }
}

impl fmt::Display for TraitSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.traits.values().join("."))
    }
}
