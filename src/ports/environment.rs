//! Environment and route planner ports - what the agent needs from the world
//!
//! The agent never reaches into a world implementation directly. It senses,
//! acts and asks for headings through these traits, so a grid world and a
//! scripted test double are interchangeable.

use rand::rngs::StdRng;

use crate::{
    Result,
    geometry::{Location, Pose},
    types::{Action, Heading, Inputs},
};

/// The world as seen by the primary vehicle.
///
/// # Examples
///
/// ```no_run
/// use smartcab::{ports::Environment, types::Action};
///
/// fn idle_once<E: Environment>(env: &mut E) -> smartcab::Result<f64> {
///     env.act(Action::None)
/// }
/// ```
pub trait Environment {
    /// The ordered set of actions the world accepts.
    fn valid_actions(&self) -> &[Action];

    /// Light and neighbouring traffic at the primary vehicle's intersection.
    fn sense(&self) -> Inputs;

    /// Steps left before the trial deadline; negative once it has passed.
    fn deadline(&self) -> i64;

    /// Apply `action` for the primary vehicle and return the step reward.
    ///
    /// # Errors
    ///
    /// Implementations return [`crate::Error::InvalidAction`] for an action
    /// outside [`Environment::valid_actions`].
    fn act(&mut self, action: Action) -> Result<f64>;

    /// Current location and direction of the primary vehicle.
    fn pose(&self) -> Pose;

    /// Draw a destination using the caller's random source.
    fn random_destination(&self, rng: &mut StdRng) -> Location;
}

/// Supplies the next relative heading toward a destination.
pub trait RoutePlanner: Send {
    /// Set a new destination.
    fn route_to(&mut self, destination: Location);

    /// The destination currently routed to, if any.
    fn destination(&self) -> Option<Location>;

    /// Heading to take from `pose`; `None` once the destination is reached
    /// or when no destination is set.
    fn next_waypoint(&self, pose: &Pose) -> Option<Heading>;
}
