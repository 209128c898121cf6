use bunny_hop_core::{Affordance, Cell, GameState, Heading, Instruction, TokenHandle, Turn};
use glam::DVec2;

/// Sound effects the session asks the presentation layer to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cue {
    /// An instruction was authored or the primary action was pressed.
    Click,
    /// The remove action was pressed.
    Remove,
    /// The actor hopped forward.
    Jump,
    /// The goal was reached.
    Complete,
    /// The actor dropped into a danger cell.
    Drop,
    /// The program ran out without a verdict.
    Fail,
}

impl Cue {
    /// Name of the audio clip associated with the cue.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Remove => "remove",
            Self::Jump => "jump",
            Self::Complete => "complete",
            Self::Drop => "drop",
            Self::Fail => "fail",
        }
    }
}

/// Canned animations the session asks the presentation layer to play.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Animation {
    /// Celebration hops on the goal cell.
    Celebrate,
    /// The actor falls into the cell at `position` and disappears.
    Fall {
        /// Ground-plane position of the fall.
        position: DVec2,
    },
}

/// Presentation collaborator driven by the session.
///
/// The session writes target poses and requests side effects; implementors
/// own every visual and audio resource and decide how to animate towards the
/// requested state.
pub trait Presenter {
    /// Places the actor without animation, facing `yaw` radians.
    fn place_actor(&mut self, position: DVec2, yaw: f64);
    /// Animates a forward hop between two ground positions.
    fn step_actor(&mut self, from: DVec2, to: DVec2);
    /// Animates a quarter turn ending on `heading`.
    fn turn_actor(&mut self, heading: Heading, turn: Turn);
    /// Moves the actor exactly onto `position`, discarding residual drift.
    fn snap_actor(&mut self, position: DVec2);
    /// Shows or hides the actor.
    fn set_actor_visible(&mut self, visible: bool);
    /// Places the goal marker on `cell`.
    fn place_goal(&mut self, cell: Cell);
    /// Shows or hides the goal marker.
    fn set_goal_visible(&mut self, visible: bool);
    /// Lays out one platform per path cell, hiding any platform left over.
    fn place_platforms(&mut self, cells: &[Cell]);
    /// Shows `token` labelled with `instruction` at the given slot height.
    fn show_token(&mut self, token: TokenHandle, instruction: Instruction, height: f64);
    /// Returns `token` to its rest height and hides it.
    fn hide_token(&mut self, token: TokenHandle, rest_height: f64);
    /// Updates the primary action button for the given state.
    fn feedback(&mut self, state: GameState, affordance: Affordance);
    /// Plays a sound effect.
    fn cue(&mut self, cue: Cue);
    /// Plays a canned animation.
    fn animate(&mut self, animation: Animation);
}

/// Presenter that ignores every request, for headless sessions.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn place_actor(&mut self, _position: DVec2, _yaw: f64) {}

    fn step_actor(&mut self, _from: DVec2, _to: DVec2) {}

    fn turn_actor(&mut self, _heading: Heading, _turn: Turn) {}

    fn snap_actor(&mut self, _position: DVec2) {}

    fn set_actor_visible(&mut self, _visible: bool) {}

    fn place_goal(&mut self, _cell: Cell) {}

    fn set_goal_visible(&mut self, _visible: bool) {}

    fn place_platforms(&mut self, _cells: &[Cell]) {}

    fn show_token(&mut self, _token: TokenHandle, _instruction: Instruction, _height: f64) {}

    fn hide_token(&mut self, _token: TokenHandle, _rest_height: f64) {}

    fn feedback(&mut self, _state: GameState, _affordance: Affordance) {}

    fn cue(&mut self, _cue: Cue) {}

    fn animate(&mut self, _animation: Animation) {}
}
