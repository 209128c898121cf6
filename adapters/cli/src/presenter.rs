use bunny_hop_core::{Affordance, Cell, GameState, Heading, Instruction, TokenHandle, Turn};
use bunny_hop_session::{Animation, Cue, Presenter};
use glam::DVec2;
use tracing::{debug, info};

/// Presenter that reports every request through `tracing`.
#[derive(Debug, Default)]
pub(crate) struct TracePresenter {
    last_feedback: Option<(GameState, Affordance)>,
}

impl TracePresenter {
    /// Most recent feedback delivered by the session.
    pub(crate) fn last_feedback(&self) -> Option<(GameState, Affordance)> {
        self.last_feedback
    }
}

impl Presenter for TracePresenter {
    fn place_actor(&mut self, position: DVec2, yaw: f64) {
        debug!(x = position.x, z = position.y, yaw, "place actor");
    }

    fn step_actor(&mut self, from: DVec2, to: DVec2) {
        info!(
            from_x = from.x,
            from_z = from.y,
            to_x = to.x,
            to_z = to.y,
            "actor hops"
        );
    }

    fn turn_actor(&mut self, heading: Heading, turn: Turn) {
        info!(?heading, ?turn, "actor turns");
    }

    fn snap_actor(&mut self, position: DVec2) {
        debug!(x = position.x, z = position.y, "snap actor");
    }

    fn set_actor_visible(&mut self, visible: bool) {
        debug!(visible, "actor visibility");
    }

    fn place_goal(&mut self, cell: Cell) {
        debug!(x = cell.x(), z = cell.z(), "place goal");
    }

    fn set_goal_visible(&mut self, visible: bool) {
        debug!(visible, "goal visibility");
    }

    fn place_platforms(&mut self, cells: &[Cell]) {
        debug!(platforms = cells.len(), "place platforms");
    }

    fn show_token(&mut self, token: TokenHandle, instruction: Instruction, height: f64) {
        debug!(
            token = token.get(),
            symbol = %instruction.symbol(),
            height,
            "show token"
        );
    }

    fn hide_token(&mut self, token: TokenHandle, rest_height: f64) {
        debug!(token = token.get(), rest_height, "hide token");
    }

    fn feedback(&mut self, state: GameState, affordance: Affordance) {
        info!(?state, button = affordance.label(), "feedback");
        self.last_feedback = Some((state, affordance));
    }

    fn cue(&mut self, cue: Cue) {
        debug!(cue = cue.name(), "cue");
    }

    fn animate(&mut self, animation: Animation) {
        info!(?animation, "animate");
    }
}
