//! The case-opening random rolls: rarity tier, wear, StatTrak, pattern
//! seed (spec.md §4.5 steps 4/6/7/8). Preserved exactly per spec.md §9
//! ("the `Rarity-first then filter` roll... preserve exactly").

use rand::Rng;

use crate::core_types::Rarity;

/// Draw a uniform `[0, 100)` roll and map it to a rarity tier by
/// descending threshold, falling through to the next-lower tier if the
/// selected one isn't present in `available` (spec.md §4.5 step 4).
/// `available` must be non-empty; the final fallback is the
/// highest-rarity tier actually present.
pub fn roll_rarity(roll: f64, available: &[Rarity]) -> Rarity {
    debug_assert!(!available.is_empty());

    let tier = if roll < 0.26 {
        Rarity::Contraband
    } else if roll < 0.90 {
        Rarity::Covert
    } else if roll < 4.10 {
        Rarity::Classified
    } else if roll < 20.08 {
        Rarity::Restricted
    } else {
        Rarity::MilSpec
    };

    // Descending tiers at or below `tier`, in order, so the fallback
    // lands on the next-lower present tier rather than jumping straight
    // to whatever happens to be first in `available`.
    const DESCENDING: [Rarity; 7] = [
        Rarity::Contraband,
        Rarity::Covert,
        Rarity::Classified,
        Rarity::Restricted,
        Rarity::MilSpec,
        Rarity::Industrial,
        Rarity::Consumer,
    ];

    DESCENDING
        .iter()
        .copied()
        .skip_while(|&r| r != tier)
        .find(|r| available.contains(r))
        .or_else(|| DESCENDING.iter().copied().rev().find(|r| available.contains(r)))
        .expect("available is non-empty")
}

/// Draw `roll` itself: uniform `[0, 100)` (step 4 draws the die; `roll_rarity` consumes it).
pub fn roll_rarity_value(rng: &mut impl Rng) -> f64 {
    rng.gen_range(0.0..100.0)
}

/// Wear draw: `i` uniform in `[0, 2^31-1]`, `wear = i / (2^31-1)`,
/// truncated to 10 decimal places (spec.md §4.5 step 6).
pub fn roll_wear(rng: &mut impl Rng) -> f64 {
    let max: u32 = (1u32 << 31) - 1;
    let i = rng.gen_range(0..=max);
    let wear = i as f64 / max as f64;
    (wear * 1e10).trunc() / 1e10
}

/// StatTrak draw: Bernoulli p=0.10, forced false for Contraband (spec.md
/// §4.5 step 7).
pub fn roll_stattrak(rng: &mut impl Rng, rarity: Rarity) -> bool {
    if rarity == Rarity::Contraband {
        return false;
    }
    rng.gen_bool(0.10)
}

/// Pattern seed draw: uniform `[0, 999]` (spec.md §4.5 step 8).
pub fn roll_pattern_seed(rng: &mut impl Rng) -> i64 {
    rng.gen_range(0..=999)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_pick_expected_tier_when_all_present() {
        let all = Rarity::ALL;
        assert_eq!(roll_rarity(0.0, &all), Rarity::Contraband);
        assert_eq!(roll_rarity(0.25, &all), Rarity::Contraband);
        assert_eq!(roll_rarity(0.26, &all), Rarity::Covert);
        assert_eq!(roll_rarity(0.89, &all), Rarity::Covert);
        assert_eq!(roll_rarity(0.90, &all), Rarity::Classified);
        assert_eq!(roll_rarity(4.09, &all), Rarity::Classified);
        assert_eq!(roll_rarity(4.10, &all), Rarity::Restricted);
        assert_eq!(roll_rarity(20.07, &all), Rarity::Restricted);
        assert_eq!(roll_rarity(20.08, &all), Rarity::MilSpec);
        assert_eq!(roll_rarity(99.99, &all), Rarity::MilSpec);
    }

    #[test]
    fn falls_through_to_next_lower_present_tier() {
        let available = [Rarity::MilSpec, Rarity::Restricted];
        // Rolls Contraband but only Restricted/Mil-Spec are present.
        assert_eq!(roll_rarity(0.1, &available), Rarity::Restricted);
    }

    #[test]
    fn falls_back_to_highest_present_tier_when_nothing_below_matches() {
        let available = [Rarity::Consumer];
        assert_eq!(roll_rarity(0.1, &available), Rarity::Consumer);
    }

    #[test]
    fn wear_draw_is_in_unit_range_and_truncated() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let w = roll_wear(&mut rng);
            assert!((0.0..=1.0).contains(&w));
            let scaled = w * 1e10;
            assert!((scaled - scaled.round()).abs() < 1e-6);
        }
    }

    #[test]
    fn contraband_is_never_stattrak() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            assert!(!roll_stattrak(&mut rng, Rarity::Contraband));
        }
    }

    #[test]
    fn pattern_seed_in_bounds() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let seed = roll_pattern_seed(&mut rng);
            assert!((0..=999).contains(&seed));
        }
    }
}
