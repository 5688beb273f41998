use tracing::info;

use super::*;

impl<H: Host> TickContext<'_, H> {
    /// Dead but not yet released: leave combat and ask the connection to
    /// release the spirit, once per death.
    pub(super) fn force_release(&mut self, record: &mut SessionRecord) -> WorldResult<()> {
        self.host.stop_combat(record.unit)?;
        if let Some(message) = record.outbound.request(OutboundKind::RepopRequest) {
            info!(player = ?record.player_id, "requesting spirit release");
            self.host.enqueue(record.player_id, message);
            self.events.push(ControllerEvent::RepopRequested {
                player_id: record.player_id,
            });
        }
        Ok(())
    }

    pub(super) fn recover_stuck_ghost(
        &mut self,
        record: &mut SessionRecord,
        state: &UnitState,
    ) -> WorldResult<()> {
        if !is_stuck(state, record.recovery_point) {
            return Ok(());
        }
        info!(player = ?record.player_id, "ghost stuck near graveyard, forcing respawn");
        self.host.repop_at_graveyard(record.unit)?;
        self.events.push(ControllerEvent::ForcedRespawn {
            player_id: record.player_id,
        });
        Ok(())
    }
}
