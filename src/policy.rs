use crate::config::{AuraPolicy, AuraRule, ClassProfile};
use crate::constants::{AURA_REFRESH_FLOOR_MS, SELF_HEAL_BELOW_PCT};
use crate::types::{AuraDuration, SpellId, UnitId, UnitState};
use crate::world::{GameWorld, WorldResult};

pub fn needs_cast(rule: &AuraRule, current: Option<AuraDuration>) -> bool {
    match (current, rule.policy) {
        (None, _) => true,
        (Some(_), AuraPolicy::CastIfMissing) => false,
        (Some(AuraDuration::Permanent), AuraPolicy::RefreshBeforeExpiry) => false,
        (Some(AuraDuration::RemainingMs(remaining)), AuraPolicy::RefreshBeforeExpiry) => {
            remaining <= AURA_REFRESH_FLOOR_MS
        }
    }
}

/// Auras from `profile` that `unit` should (re)cast now, in profile order.
pub fn auras_to_refresh<W: GameWorld + ?Sized>(
    world: &W,
    unit: UnitId,
    profile: &ClassProfile,
) -> WorldResult<Vec<SpellId>> {
    let mut casts = Vec::new();
    for rule in &profile.auras {
        if needs_cast(rule, world.aura(unit, rule.aura)?) {
            casts.push(rule.aura);
        }
    }
    Ok(casts)
}

pub fn self_heal(profile: Option<&ClassProfile>, state: &UnitState) -> Option<SpellId> {
    let spell = profile?.self_heal?;
    state.health_below_pct(SELF_HEAL_BELOW_PCT).then_some(spell)
}

pub fn melee_spell(profile: Option<&ClassProfile>) -> Option<SpellId> {
    profile?.melee_spell
}
