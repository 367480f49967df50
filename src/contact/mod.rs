//! Persistent contacts between fixture pairs, and their manifolds.

pub use self::contact::{Contact, ContactFixture, ContactFlags, TouchTransition};
pub use self::contact_dispatcher::{ContactDispatcher, ManifoldGenerator, ResolvedGenerator};
pub use self::contact_graph::{ContactEdge, ContactGraph, ContactHandle};
pub use self::manifold::{
    mix_friction, mix_restitution, ContactFeatureType, ContactId, Manifold, ManifoldPoint,
    ManifoldType, WorldManifold, MAX_MANIFOLD_POINTS,
};

mod contact;
mod contact_dispatcher;
mod contact_graph;
mod manifold;
