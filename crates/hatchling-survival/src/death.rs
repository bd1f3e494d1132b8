//! Death conditions for the survival core.
//!
//! The creature is alive while all three resources are above zero. The
//! first resource to bottom out names the cause, checked in a fixed
//! order so the reported cause is deterministic when several resources
//! reach zero in the same tick.

use hatchling_types::DeathCause;
use rust_decimal::Decimal;

/// Check whether any resource has been exhausted.
///
/// Returns `Some(cause)` for the first depleted resource in the order
/// energy, integrity, stability; `None` while all three are positive.
/// This only inspects the values -- it does not mutate anything.
pub fn check_death(
    energy: Decimal,
    integrity: Decimal,
    stability: Decimal,
) -> Option<DeathCause> {
    if energy <= Decimal::ZERO {
        return Some(DeathCause::EnergyDepletion);
    }
    if integrity <= Decimal::ZERO {
        return Some(DeathCause::IntegrityFailure);
    }
    if stability <= Decimal::ZERO {
        return Some(DeathCause::StabilityCollapse);
    }
    None
}
