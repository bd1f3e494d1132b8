//! Dominant-drive expression.
//!
//! The creature has no language. What it *can* do is express its dominant
//! drive: a cry of distress when starving, a startled sound when afraid, a
//! questioning coo when lonely or curious. The drive-priority decision is
//! structural; the sound attached to it is presentation flavor, picked at
//! random from small per-kind tables like a baby's varied babble.

use rand::Rng;
use rust_decimal::Decimal;

use hatchling_types::{Expression, ExpressionKind, SurvivalState};

/// Hunger level above which distress dominates everything (70).
fn distress_threshold() -> Decimal {
    Decimal::from(70)
}

/// Fear level above which fear dominates (60).
fn fear_threshold() -> Decimal {
    Decimal::from(60)
}

/// Loneliness level above which seeking dominates (60).
fn seeking_threshold() -> Decimal {
    Decimal::from(60)
}

/// Comfort level required for contentment (70), together with energy above 50.
fn content_comfort_threshold() -> Decimal {
    Decimal::from(70)
}

/// Energy level required for contentment (50).
fn content_energy_threshold() -> Decimal {
    Decimal::from(50)
}

/// Curiosity level above which the creature expresses curiosity (60).
fn curious_threshold() -> Decimal {
    Decimal::from(60)
}

/// Derive the creature's expression from a survival state snapshot.
///
/// Drives are checked in a fixed priority order -- the first threshold
/// crossed wins: hunger, fear, loneliness, contentment (comfort plus
/// energy), curiosity, then neutral.
pub fn express(state: &SurvivalState, rng: &mut impl Rng) -> Expression {
    let (kind, intensity) = if state.hunger > distress_threshold() {
        (ExpressionKind::Distress, state.hunger)
    } else if state.fear > fear_threshold() {
        (ExpressionKind::Fear, state.fear)
    } else if state.loneliness > seeking_threshold() {
        (ExpressionKind::Seeking, state.loneliness)
    } else if state.comfort > content_comfort_threshold()
        && state.energy > content_energy_threshold()
    {
        (ExpressionKind::Content, state.comfort)
    } else if state.curiosity > curious_threshold() {
        (ExpressionKind::Curious, state.curiosity)
    } else {
        (ExpressionKind::Neutral, Decimal::from(50))
    };

    Expression {
        kind,
        intensity,
        sound: primitive_sound(kind, rng),
    }
}

/// Pick a primitive vocalization for an expression kind.
///
/// Not words -- cries and coos, communication before language.
fn primitive_sound(kind: ExpressionKind, rng: &mut impl Rng) -> String {
    let options: &[&str] = match kind {
        ExpressionKind::Distress => &["waa", "aaa", "uuu", "ehh"],
        ExpressionKind::Fear => &["!", "!!", "ah!", "eek"],
        ExpressionKind::Seeking => &["?", "mm?", "aah?", "ooh?"],
        ExpressionKind::Content => &["~", "mm~", "aah~", "ooh~"],
        ExpressionKind::Curious => &["?", "ooh", "hmm", "aah"],
        ExpressionKind::Neutral => &["...", ".", "~"],
    };
    let index = rng.random_range(0..options.len());
    options.get(index).copied().unwrap_or("...").to_owned()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use hatchling_types::LifeId;

    use super::*;

    fn quiet_state() -> SurvivalState {
        SurvivalState {
            life_id: LifeId::new(),
            is_alive: true,
            cause_of_death: None,
            energy: Decimal::ONE_HUNDRED,
            integrity: Decimal::ONE_HUNDRED,
            stability: Decimal::ONE_HUNDRED,
            hunger: Decimal::ZERO,
            fear: Decimal::ZERO,
            comfort: Decimal::from(50),
            loneliness: Decimal::ZERO,
            curiosity: Decimal::from(50),
            existence_ms: 0,
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn hunger_dominates_everything() {
        let mut state = quiet_state();
        state.hunger = Decimal::from(80);
        state.fear = Decimal::from(90);
        let expr = express(&state, &mut rng());
        assert_eq!(expr.kind, ExpressionKind::Distress);
        assert_eq!(expr.intensity, Decimal::from(80));
    }

    #[test]
    fn fear_beats_loneliness() {
        let mut state = quiet_state();
        state.fear = Decimal::from(70);
        state.loneliness = Decimal::from(90);
        let expr = express(&state, &mut rng());
        assert_eq!(expr.kind, ExpressionKind::Fear);
    }

    #[test]
    fn loneliness_expresses_seeking() {
        let mut state = quiet_state();
        state.loneliness = Decimal::from(65);
        let expr = express(&state, &mut rng());
        assert_eq!(expr.kind, ExpressionKind::Seeking);
    }

    #[test]
    fn contentment_needs_comfort_and_energy() {
        let mut state = quiet_state();
        state.comfort = Decimal::from(80);
        state.energy = Decimal::from(60);
        let expr = express(&state, &mut rng());
        assert_eq!(expr.kind, ExpressionKind::Content);
    }

    #[test]
    fn comfort_without_energy_is_not_content() {
        let mut state = quiet_state();
        state.comfort = Decimal::from(80);
        state.energy = Decimal::from(40);
        state.curiosity = Decimal::from(30);
        let expr = express(&state, &mut rng());
        assert_eq!(expr.kind, ExpressionKind::Neutral);
    }

    #[test]
    fn high_curiosity_expresses_curiosity() {
        let mut state = quiet_state();
        state.curiosity = Decimal::from(80);
        let expr = express(&state, &mut rng());
        assert_eq!(expr.kind, ExpressionKind::Curious);
    }

    #[test]
    fn quiet_state_is_neutral() {
        let expr = express(&quiet_state(), &mut rng());
        assert_eq!(expr.kind, ExpressionKind::Neutral);
        assert_eq!(expr.intensity, Decimal::from(50));
    }

    #[test]
    fn every_kind_produces_a_sound() {
        let mut rng = rng();
        for kind in [
            ExpressionKind::Distress,
            ExpressionKind::Fear,
            ExpressionKind::Seeking,
            ExpressionKind::Content,
            ExpressionKind::Curious,
            ExpressionKind::Neutral,
        ] {
            let sound = primitive_sound(kind, &mut rng);
            assert!(!sound.is_empty());
        }
    }
}
