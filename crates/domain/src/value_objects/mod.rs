//! Value objects - immutable, validated domain values

mod names;
mod stats;

pub use names::{MoveName, SpeciesName, Username};
pub(crate) use stats::NamedStatSlots;
pub use stats::{
    BaseStats, Stat, StatBlock, StatSlot, MAX_EFFORT_PER_STAT, MAX_TOTAL_EFFORT,
    STAT_COUNT,
};
