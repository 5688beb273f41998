use super::*;

impl<H: Host> TickContext<'_, H> {
    /// Slow bucket for a living player: buffs, target upkeep, then closing in.
    pub(super) fn engage(
        &mut self,
        record: &mut SessionRecord,
        state: &UnitState,
    ) -> WorldResult<()> {
        self.refresh_auras(record, state)?;
        self.refresh_target(record)?;

        let Some(target) = record.target else {
            return Ok(());
        };
        let target_position = match self.host.unit(target) {
            Ok(target_state) => target_state.position,
            Err(error) => return self.recover_target_error(record, error),
        };
        if state.position.distance_2d(&target_position) <= ENGAGE_RANGE {
            return Ok(());
        }

        let (x, y) = approach_point(&target_position);
        let z = self.host.ground_height(state.map, x, y, target_position.z);
        let destination = Position::new(x, y, z);
        self.host.clear_movement(record.movement)?;
        self.host.move_to_point(record.movement, state.map, destination)?;
        debug!(player = ?record.player_id, ?target, ?destination, "closing on target");
        self.events.push(ControllerEvent::MoveIssued {
            player_id: record.player_id,
            destination,
        });

        let engaged = match self.host.attackers(target) {
            Ok(attackers) => attackers.contains(&record.unit),
            Err(error) => return self.recover_target_error(record, error),
        };
        if engaged {
            return Ok(());
        }
        if let Err(error) = self.host.begin_attack(record.unit, target) {
            return self.recover_target_error(record, error);
        }
        self.events.push(ControllerEvent::AttackStarted {
            player_id: record.player_id,
            target,
        });
        Ok(())
    }

    fn refresh_auras(&mut self, record: &SessionRecord, state: &UnitState) -> WorldResult<()> {
        let config = self.config;
        let Some(profile) = config.profile(state.class) else {
            return Ok(());
        };
        for spell in policy::auras_to_refresh(&*self.host, record.unit, profile)? {
            debug!(player = ?record.player_id, ?spell, "refreshing aura");
            self.cast_on_self(record, spell)?;
        }
        Ok(())
    }
}
