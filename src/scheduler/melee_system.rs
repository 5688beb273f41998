use super::*;

impl<H: Host> TickContext<'_, H> {
    /// Fast bucket for a living player. Healing comes before target cleanup.
    pub(super) fn melee_round(
        &mut self,
        record: &mut SessionRecord,
        state: &UnitState,
    ) -> WorldResult<()> {
        let profile = self.config.profile(state.class);
        let heal = policy::self_heal(profile, state);
        let melee = policy::melee_spell(profile);

        if let Some(spell) = heal {
            debug!(player = ?record.player_id, ?spell, "self heal");
            self.cast_on_self(record, spell)?;
        }

        self.discard_dead_target(record);

        if let (Some(target), Some(spell)) = (record.target, melee) {
            match self.host.cast_spell(record.unit, target, spell) {
                Ok(()) => self.events.push(ControllerEvent::SpellCast {
                    player_id: record.player_id,
                    spell,
                    target,
                }),
                Err(error) => self.recover_target_error(record, error)?,
            }
        }

        if record.target.is_none() {
            self.acquire(record)?;
        }

        if state.stopped {
            self.face_and_attack(record, state)?;
        }
        Ok(())
    }

    fn face_and_attack(
        &mut self,
        record: &mut SessionRecord,
        state: &UnitState,
    ) -> WorldResult<()> {
        let Some(target) = record.target else {
            return Ok(());
        };
        let target_position = match self.host.unit(target) {
            Ok(target_state) => target_state.position,
            Err(error) => return self.recover_target_error(record, error),
        };
        let angle = angle_to(&state.position, &target_position);

        if let Err(error) = self.host.begin_attack(record.unit, target) {
            return self.recover_target_error(record, error);
        }
        if !has_in_arc(state.orientation, angle, FRONT_ARC) {
            self.host.set_facing(record.unit, angle)?;
        }
        Ok(())
    }
}
