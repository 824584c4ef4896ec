//! Core types used throughout the system
//!
//! Semantic aliases and small closed enums shared by every module. They
//! exist so call sites read `UserId` / `InstanceId` instead of bare
//! integers, and so the few places that must special-case a rarity or
//! wear band have one shared definition.

/// Stable opaque user identifier, assigned at registration. Never reused.
pub type UserId = i64;

/// Globally unique skin instance identifier, assigned at mint. Never reused.
pub type InstanceId = i64;

/// Catalog definition identifier (immutable, seeded once).
pub type DefinitionId = i64;

/// Case identifier (immutable, seeded once).
pub type CaseId = i64;

/// Market listing identifier.
pub type ListingId = i64;

/// Trade offer identifier.
pub type TradeId = i64;

/// Rarity tier, ascending. `SkinDefinition::rarity` is fixed at seed time;
/// a `SkinInstance` always copies its definition's rarity at mint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    Consumer,
    Industrial,
    MilSpec,
    Restricted,
    Classified,
    Covert,
    Contraband,
}

impl Rarity {
    pub const ALL: [Rarity; 7] = [
        Rarity::Consumer,
        Rarity::Industrial,
        Rarity::MilSpec,
        Rarity::Restricted,
        Rarity::Classified,
        Rarity::Covert,
        Rarity::Contraband,
    ];

    /// Rarity multiplier used in `current_price = base_price * rarity_mult * wear_mult`.
    pub fn multiplier(self) -> f64 {
        match self {
            Rarity::Consumer => 0.1,
            Rarity::Industrial => 0.15,
            Rarity::MilSpec => 0.3,
            Rarity::Restricted => 0.5,
            Rarity::Classified => 0.75,
            Rarity::Covert => 1.0,
            Rarity::Contraband => 1.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rarity::Consumer => "Consumer",
            Rarity::Industrial => "Industrial",
            Rarity::MilSpec => "Mil-Spec",
            Rarity::Restricted => "Restricted",
            Rarity::Classified => "Classified",
            Rarity::Covert => "Covert",
            Rarity::Contraband => "Contraband",
        }
    }

    pub fn from_db(v: i64) -> Option<Self> {
        Some(match v {
            0 => Rarity::Consumer,
            1 => Rarity::Industrial,
            2 => Rarity::MilSpec,
            3 => Rarity::Restricted,
            4 => Rarity::Classified,
            5 => Rarity::Covert,
            6 => Rarity::Contraband,
            _ => return None,
        })
    }

    pub fn to_db(self) -> i64 {
        match self {
            Rarity::Consumer => 0,
            Rarity::Industrial => 1,
            Rarity::MilSpec => 2,
            Rarity::Restricted => 3,
            Rarity::Classified => 4,
            Rarity::Covert => 5,
            Rarity::Contraband => 6,
        }
    }
}

/// Named wear bands. Only used for display / reporting; the stored value
/// is always the raw `wear: f64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WearBand {
    FactoryNew,
    MinimalWear,
    FieldTested,
    WellWorn,
    BattleScarred,
}

impl WearBand {
    /// Band boundaries from spec: FN [0.00,0.07) MW [0.07,0.15) FT [0.15,0.37)
    /// WW [0.37,0.45) BS [0.45,1.00].
    pub fn from_wear(wear: f64) -> Self {
        if wear < 0.07 {
            WearBand::FactoryNew
        } else if wear < 0.15 {
            WearBand::MinimalWear
        } else if wear < 0.37 {
            WearBand::FieldTested
        } else if wear < 0.45 {
            WearBand::WellWorn
        } else {
            WearBand::BattleScarred
        }
    }

    /// Wear multiplier used in `current_price = base_price * rarity_mult * wear_mult`.
    pub fn multiplier(self) -> f64 {
        match self {
            WearBand::FactoryNew => 1.00,
            WearBand::MinimalWear => 0.92,
            WearBand::FieldTested => 0.78,
            WearBand::WellWorn => 0.65,
            WearBand::BattleScarred => 0.52,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WearBand::FactoryNew => "Factory New",
            WearBand::MinimalWear => "Minimal Wear",
            WearBand::FieldTested => "Field-Tested",
            WearBand::WellWorn => "Well-Worn",
            WearBand::BattleScarred => "Battle-Scarred",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_roundtrips_through_db_encoding() {
        for r in Rarity::ALL {
            assert_eq!(Rarity::from_db(r.to_db()), Some(r));
        }
    }

    #[test]
    fn wear_band_boundaries_are_left_inclusive() {
        assert_eq!(WearBand::from_wear(0.0), WearBand::FactoryNew);
        assert_eq!(WearBand::from_wear(0.069999), WearBand::FactoryNew);
        assert_eq!(WearBand::from_wear(0.07), WearBand::MinimalWear);
        assert_eq!(WearBand::from_wear(0.15), WearBand::FieldTested);
        assert_eq!(WearBand::from_wear(0.37), WearBand::WellWorn);
        assert_eq!(WearBand::from_wear(0.45), WearBand::BattleScarred);
        assert_eq!(WearBand::from_wear(1.0), WearBand::BattleScarred);
    }
}
