//! Stat, StatSlot and StatBlock - base stats and effort value allocation
//!
//! Every tracked pokemon has six stat slots in a fixed order. Each slot pairs
//! the species' base value (copied at creation, never changed) with a mutable
//! effort value. Every 4 effort points translate to 1 stat point in game, and
//! the caps below are the canonical game limits.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Maximum effort value a single stat can hold.
pub const MAX_EFFORT_PER_STAT: u16 = 255;

/// Maximum effort value summed across all six stats.
pub const MAX_TOTAL_EFFORT: u16 = 510;

/// Number of stat slots.
pub const STAT_COUNT: usize = 6;

/// The six stat slots, in allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl Stat {
    /// All stats in the fixed order used for positional effort input.
    pub const ALL: [Stat; STAT_COUNT] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::SpecialAttack,
        Stat::SpecialDefense,
        Stat::Speed,
    ];

    /// Position of this stat in `ALL`.
    pub const fn index(self) -> usize {
        match self {
            Stat::Hp => 0,
            Stat::Attack => 1,
            Stat::Defense => 2,
            Stat::SpecialAttack => 3,
            Stat::SpecialDefense => 4,
            Stat::Speed => 5,
        }
    }

    /// Name used by the species data provider (`stats[].stat.name`).
    pub const fn provider_name(self) -> &'static str {
        match self {
            Stat::Hp => "hp",
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::SpecialAttack => "special-attack",
            Stat::SpecialDefense => "special-defense",
            Stat::Speed => "speed",
        }
    }

    /// Snake-case key, used for storage column names.
    pub const fn key(self) -> &'static str {
        match self {
            Stat::Hp => "hp",
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::SpecialAttack => "special_attack",
            Stat::SpecialDefense => "special_defense",
            Stat::Speed => "speed",
        }
    }

    /// Map a provider stat name onto a slot. Unrecognized categories
    /// (e.g. "accuracy") return `None` and are ignored by callers.
    pub fn from_provider_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.provider_name() == name)
    }
}

/// Clamp a requested effort value into `[0, MAX_EFFORT_PER_STAT]`.
fn clamp_effort(value: i64) -> u16 {
    value.clamp(0, i64::from(MAX_EFFORT_PER_STAT)) as u16
}

/// Base values for the six stats, as reported by the species provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats([u16; STAT_COUNT]);

impl BaseStats {
    pub fn new(values: [u16; STAT_COUNT]) -> Self {
        Self(values)
    }

    /// Build from provider `(stat name, base value)` pairs.
    ///
    /// Unknown stat names are skipped; missing stats stay at 0.
    pub fn from_provider_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, u16)>) -> Self {
        let mut values = [0; STAT_COUNT];
        for (name, value) in pairs {
            if let Some(stat) = Stat::from_provider_name(name) {
                values[stat.index()] = value;
            }
        }
        Self(values)
    }

    pub fn get(&self, stat: Stat) -> u16 {
        self.0[stat.index()]
    }

    pub fn values(&self) -> [u16; STAT_COUNT] {
        self.0
    }
}

/// One stat slot: immutable base value plus mutable effort value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSlot {
    pub base: u16,
    pub effort: u16,
}

impl StatSlot {
    pub fn new(base: u16, effort: u16) -> Self {
        Self { base, effort }
    }
}

/// The six stat slots of a roster entry, indexed by [`Stat`].
///
/// Serialize-only: a block read from outside goes through
/// `TryFrom<NamedStatSlots>`, which checks the effort caps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(into = "NamedStatSlots")]
pub struct StatBlock {
    slots: [StatSlot; STAT_COUNT],
}

impl StatBlock {
    /// Fresh block: base values copied, all effort at 0.
    pub fn from_base(base: BaseStats) -> Self {
        let mut slots = [StatSlot::default(); STAT_COUNT];
        for stat in Stat::ALL {
            slots[stat.index()] = StatSlot::new(base.get(stat), 0);
        }
        Self { slots }
    }

    /// Reconstruct from storage (database hydration)
    pub fn from_slots(slots: [StatSlot; STAT_COUNT]) -> Self {
        Self { slots }
    }

    pub fn get(&self, stat: Stat) -> StatSlot {
        self.slots[stat.index()]
    }

    pub fn slots(&self) -> &[StatSlot; STAT_COUNT] {
        &self.slots
    }

    pub fn base_values(&self) -> [u16; STAT_COUNT] {
        self.slots.map(|s| s.base)
    }

    pub fn effort_values(&self) -> [u16; STAT_COUNT] {
        self.slots.map(|s| s.effort)
    }

    /// Sum of the six effort values.
    pub fn total_effort(&self) -> u16 {
        self.slots.iter().map(|s| s.effort).sum()
    }

    /// Check the per-stat and total effort caps.
    pub fn validate_effort(&self) -> Result<(), DomainError> {
        if let Some(stat) = Stat::ALL
            .into_iter()
            .find(|s| self.get(*s).effort > MAX_EFFORT_PER_STAT)
        {
            return Err(DomainError::validation(format!(
                "{} effort exceeds {MAX_EFFORT_PER_STAT}",
                stat.provider_name()
            )));
        }
        let total: u32 = self.slots.iter().map(|s| u32::from(s.effort)).sum();
        if total > u32::from(MAX_TOTAL_EFFORT) {
            return Err(DomainError::validation(format!(
                "total effort {total} exceeds {MAX_TOTAL_EFFORT}"
            )));
        }
        Ok(())
    }

    /// Allocate effort values greedily in stat order.
    ///
    /// `values` is read positionally (hp, attack, defense, special attack,
    /// special defense, speed); missing trailing positions count as 0 and
    /// extra positions are ignored. Each request is clamped to `[0, 255]`.
    /// When a request would push the running total past 510, that slot gets
    /// whatever is left and allocation stops; the slots after it hold 0.
    ///
    /// Returns the new total.
    pub fn distribute_effort(&mut self, values: &[i64]) -> u16 {
        let mut running_total: u16 = 0;
        let mut stopped_at = None;

        for (i, slot) in self.slots.iter_mut().enumerate() {
            let requested = clamp_effort(values.get(i).copied().unwrap_or(0));
            if running_total + requested > MAX_TOTAL_EFFORT {
                slot.effort = MAX_TOTAL_EFFORT - running_total;
                running_total = MAX_TOTAL_EFFORT;
                stopped_at = Some(i);
                break;
            }
            slot.effort = requested;
            running_total += requested;
        }

        if let Some(i) = stopped_at {
            for slot in &mut self.slots[i + 1..] {
                slot.effort = 0;
            }
        }

        running_total
    }
}

/// Serialized form of [`StatBlock`]: one named field per stat.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NamedStatSlots {
    hp: StatSlot,
    attack: StatSlot,
    defense: StatSlot,
    special_attack: StatSlot,
    special_defense: StatSlot,
    speed: StatSlot,
}

impl TryFrom<NamedStatSlots> for StatBlock {
    type Error = DomainError;

    fn try_from(n: NamedStatSlots) -> Result<Self, Self::Error> {
        let block = Self::from_slots([
            n.hp,
            n.attack,
            n.defense,
            n.special_attack,
            n.special_defense,
            n.speed,
        ]);
        block.validate_effort()?;
        Ok(block)
    }
}

impl From<StatBlock> for NamedStatSlots {
    fn from(b: StatBlock) -> Self {
        let [hp, attack, defense, special_attack, special_defense, speed] = b.slots;
        Self {
            hp,
            attack,
            defense,
            special_attack,
            special_defense,
            speed,
        }
    }
}
