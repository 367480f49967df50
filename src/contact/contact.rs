use crate::contact::{
    mix_friction, mix_restitution, ContactDispatcher, Manifold, ManifoldGenerator,
    WorldManifold,
};
use crate::math::{Isometry, Real};
use crate::motion::Sweep;
use crate::query::gjk::{self, SimplexCache};
use crate::query::{time_of_impact, ToiInput, ToiState};
use crate::settings::Settings;
use crate::shape::Shape;

bitflags::bitflags! {
    /// Flags describing the state of a [`Contact`].
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    pub struct ContactFlags: u8 {
        /// The contact is enabled for the current step. Set back by every update.
        const ENABLED = 1 << 0;
        /// The shapes are touching.
        const TOUCHING = 1 << 1;
        /// The contact must be filtered again because a fixture filter changed.
        const FILTER = 1 << 2;
        /// A bullet contact had a time-of-impact event.
        const BULLET_HIT = 1 << 3;
        /// The contact has a valid time of impact.
        const TOI = 1 << 4;
    }
}

/// The identity and material of one side of a contact.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ContactFixture {
    /// An identifier of the fixture, unique among the fixtures of the simulation.
    pub id: usize,
    /// The index of the body this fixture is attached to.
    pub body: usize,
    /// The index of the child of the fixture shape involved in the contact.
    pub child: usize,
    /// The friction coefficient of the fixture.
    pub friction: Real,
    /// The restitution coefficient of the fixture.
    pub restitution: Real,
    /// Sensors detect overlaps but never generate contact points.
    pub is_sensor: bool,
}

impl ContactFixture {
    /// A non-sensor fixture descriptor.
    pub fn new(id: usize, body: usize, child: usize, friction: Real, restitution: Real) -> Self {
        Self {
            id,
            body,
            child,
            friction,
            restitution,
            is_sensor: false,
        }
    }

    /// This descriptor turned into a sensor.
    #[must_use]
    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self
    }
}

/// The change of touching state reported by [`Contact::update`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TouchTransition {
    /// The shapes started touching during this update.
    Began,
    /// The shapes were touching and still are.
    Persisted,
    /// The shapes stopped touching during this update.
    Ended,
    /// The shapes were not touching and still are not.
    Separated,
}

impl TouchTransition {
    fn new(was_touching: bool, touching: bool) -> Self {
        match (was_touching, touching) {
            (false, true) => TouchTransition::Began,
            (true, true) => TouchTransition::Persisted,
            (true, false) => TouchTransition::Ended,
            (false, false) => TouchTransition::Separated,
        }
    }

    /// Are the shapes touching after the update?
    #[inline]
    pub fn is_touching(self) -> bool {
        matches!(self, TouchTransition::Began | TouchTransition::Persisted)
    }
}

/// The contact between two fixture children.
///
/// A contact exists for each pair of overlapping fat AABBs in the broad-phase (except if
/// filtered), so a contact may exist without any contact point.
#[derive(Clone, Debug)]
pub struct Contact {
    fixture_a: ContactFixture,
    fixture_b: ContactFixture,
    radius_a: Real,
    radius_b: Real,
    generator: ManifoldGenerator,
    manifold: Manifold,
    friction: Real,
    restitution: Real,
    tangent_speed: Real,
    flags: ContactFlags,
    simplex_cache: SimplexCache,
    toi: Real,
    toi_count: usize,
}

impl Contact {
    /// Creates the contact between two fixtures.
    ///
    /// Returns `None` if no manifold generator is registered for this pair of shape types.
    /// The fixtures are swapped if only the generator of the reversed pair exists, so
    /// [`Contact::fixture_a`] is not necessarily `fixture_a`.
    pub fn new(
        dispatcher: &ContactDispatcher,
        fixture_a: ContactFixture,
        shape_a: &Shape,
        fixture_b: ContactFixture,
        shape_b: &Shape,
    ) -> Option<Self> {
        let resolved = dispatcher.resolve(shape_a.shape_type(), shape_b.shape_type())?;

        let (fixture_a, radius_a, fixture_b, radius_b) = if resolved.swapped {
            (fixture_b, shape_b.radius(), fixture_a, shape_a.radius())
        } else {
            (fixture_a, shape_a.radius(), fixture_b, shape_b.radius())
        };

        Some(Self {
            fixture_a,
            fixture_b,
            radius_a,
            radius_b,
            generator: resolved.generator,
            manifold: Manifold::new(),
            friction: mix_friction(fixture_a.friction, fixture_b.friction),
            restitution: mix_restitution(fixture_a.restitution, fixture_b.restitution),
            tangent_speed: 0.0,
            flags: ContactFlags::ENABLED,
            simplex_cache: SimplexCache::default(),
            toi: 1.0,
            toi_count: 0,
        })
    }

    /// The first fixture of this contact.
    #[inline]
    pub fn fixture_a(&self) -> &ContactFixture {
        &self.fixture_a
    }

    /// The second fixture of this contact.
    #[inline]
    pub fn fixture_b(&self) -> &ContactFixture {
        &self.fixture_b
    }

    /// The skin radii of the shapes of fixtures A and B, as of the last update.
    #[inline]
    pub fn radii(&self) -> (Real, Real) {
        (self.radius_a, self.radius_b)
    }

    /// The contact manifold.
    #[inline]
    pub fn manifold(&self) -> &Manifold {
        &self.manifold
    }

    /// The contact manifold, mutably.
    ///
    /// Modifying the manifold is only meaningful before the solver reads it.
    #[inline]
    pub fn manifold_mut(&mut self) -> &mut Manifold {
        &mut self.manifold
    }

    /// The world manifold, given the transforms of both bodies.
    pub fn world_manifold(&self, xf_a: &Isometry<Real>, xf_b: &Isometry<Real>) -> WorldManifold {
        self.manifold
            .world_manifold(xf_a, self.radius_a, xf_b, self.radius_b)
    }

    /// The state flags of this contact.
    #[inline]
    pub fn flags(&self) -> ContactFlags {
        self.flags
    }

    /// Enables or disables this contact.
    ///
    /// This only lasts until the next [`Contact::update`] (the current step, or
    /// sub-step in continuous collision).
    pub fn set_enabled(&mut self, enabled: bool) {
        self.flags.set(ContactFlags::ENABLED, enabled);
    }

    /// Is this contact enabled?
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.flags.contains(ContactFlags::ENABLED)
    }

    /// Are the shapes touching?
    #[inline]
    pub fn is_touching(&self) -> bool {
        self.flags.contains(ContactFlags::TOUCHING)
    }

    /// Flags this contact for filtering. Filtering happens during the next step.
    pub fn flag_for_filtering(&mut self) {
        self.flags.insert(ContactFlags::FILTER);
    }

    /// Clears the filtering flag, once the filter has been evaluated.
    pub fn clear_filter_flag(&mut self) {
        self.flags.remove(ContactFlags::FILTER);
    }

    /// Does this contact need filtering?
    #[inline]
    pub fn needs_filtering(&self) -> bool {
        self.flags.contains(ContactFlags::FILTER)
    }

    /// Sets or clears the bullet-hit flag.
    pub fn set_bullet_hit(&mut self, hit: bool) {
        self.flags.set(ContactFlags::BULLET_HIT, hit);
    }

    /// Did a bullet hit through this contact during the current step?
    #[inline]
    pub fn is_bullet_hit(&self) -> bool {
        self.flags.contains(ContactFlags::BULLET_HIT)
    }

    /// The simplex cache warm-starting the distance queries of this contact.
    #[inline]
    pub fn simplex_cache(&self) -> &SimplexCache {
        &self.simplex_cache
    }

    /// Records a valid time of impact for this contact.
    pub fn set_toi(&mut self, toi: Real) {
        self.toi = toi;
        self.flags.insert(ContactFlags::TOI);
    }

    /// Invalidates the time of impact, resets the sub-step counter and the bullet-hit
    /// flag. Called at the beginning of each step.
    pub fn clear_toi(&mut self) {
        self.flags.remove(ContactFlags::TOI | ContactFlags::BULLET_HIT);
        self.toi = 1.0;
        self.toi_count = 0;
    }

    /// Number of time-of-impact sub-steps this contact went through during the current
    /// step.
    #[inline]
    pub fn toi_count(&self) -> usize {
        self.toi_count
    }

    /// Marks the end of a time-of-impact sub-step solved for this contact.
    ///
    /// The time of impact must be computed again before the next sub-step.
    pub fn finish_sub_step(&mut self) {
        self.flags.remove(ContactFlags::TOI);
        self.toi_count += 1;
    }

    /// Computes the time of impact of this contact, as a fraction of the whole step.
    ///
    /// The sweeps are the motions of bodies A and B. The sweep lagging behind is
    /// advanced so that both start at the same `alpha0`. Returns the cached value if it
    /// is still valid, and `None` for sensors or once the contact went through more than
    /// `max_sub_steps` sub-steps. A contact that does not touch during the sweep gets a
    /// time of impact of 1.
    pub fn compute_toi(
        &mut self,
        shape_a: &Shape,
        sweep_a: &mut Sweep,
        shape_b: &Shape,
        sweep_b: &mut Sweep,
        settings: &Settings,
    ) -> Option<Real> {
        if self.fixture_a.is_sensor || self.fixture_b.is_sensor {
            return None;
        }

        // Prevent excessive sub-stepping.
        if self.toi_count > settings.max_sub_steps {
            return None;
        }

        if let Some(toi) = self.valid_toi() {
            return Some(toi);
        }

        // Put the sweeps onto the same time interval.
        let alpha0 = sweep_a.alpha0.max(sweep_b.alpha0);
        if sweep_a.alpha0 < alpha0 {
            sweep_a.advance(alpha0);
        } else if sweep_b.alpha0 < alpha0 {
            sweep_b.advance(alpha0);
        }

        let input = ToiInput {
            proxy_a: shape_a.distance_proxy(self.fixture_a.child),
            proxy_b: shape_b.distance_proxy(self.fixture_b.child),
            sweep_a: *sweep_a,
            sweep_b: *sweep_b,
            t_max: 1.0,
        };
        let output = time_of_impact(&input, settings);

        // Beta is the fraction of the remaining portion of the step.
        let alpha = if output.state == ToiState::Touching {
            (alpha0 + (1.0 - alpha0) * output.t).min(1.0)
        } else {
            1.0
        };

        self.set_toi(alpha);
        Some(alpha)
    }

    /// The time of impact, if it is valid.
    #[inline]
    pub fn valid_toi(&self) -> Option<Real> {
        self.flags.contains(ContactFlags::TOI).then_some(self.toi)
    }

    /// Overrides the default friction mixture. Persists until set or reset.
    pub fn set_friction(&mut self, friction: Real) {
        self.friction = friction;
    }

    /// The friction coefficient.
    #[inline]
    pub fn friction(&self) -> Real {
        self.friction
    }

    /// Resets the friction mixture to the default value.
    pub fn reset_friction(&mut self) {
        self.friction = mix_friction(self.fixture_a.friction, self.fixture_b.friction);
    }

    /// Overrides the default restitution mixture. Persists until set or reset.
    pub fn set_restitution(&mut self, restitution: Real) {
        self.restitution = restitution;
    }

    /// The restitution coefficient.
    #[inline]
    pub fn restitution(&self) -> Real {
        self.restitution
    }

    /// Resets the restitution mixture to the default value.
    pub fn reset_restitution(&mut self) {
        self.restitution = mix_restitution(self.fixture_a.restitution, self.fixture_b.restitution);
    }

    /// Sets the desired tangent speed for a conveyor belt behavior, in meters per second.
    pub fn set_tangent_speed(&mut self, speed: Real) {
        self.tangent_speed = speed;
    }

    /// The desired tangent speed, in meters per second.
    #[inline]
    pub fn tangent_speed(&self) -> Real {
        self.tangent_speed
    }

    /// Updates the contact manifold and touching status.
    ///
    /// The shapes must be the shapes of fixtures A and B (after any swap made at
    /// creation), at the body transforms `xf_a` and `xf_b`. The AABBs of the shapes are
    /// not assumed to overlap. The impulses of new points are copied from the old points
    /// with the same [`ContactId`](crate::contact::ContactId), to warm start the solver.
    pub fn update(
        &mut self,
        shape_a: &Shape,
        xf_a: &Isometry<Real>,
        shape_b: &Shape,
        xf_b: &Isometry<Real>,
        settings: &Settings,
    ) -> TouchTransition {
        // Re-enable this contact.
        self.flags.insert(ContactFlags::ENABLED);
        self.radius_a = shape_a.radius();
        self.radius_b = shape_b.radius();

        let was_touching = self.is_touching();
        let touching;

        if self.fixture_a.is_sensor || self.fixture_b.is_sensor {
            touching = gjk::test_overlap_with_cache(
                shape_a,
                self.fixture_a.child,
                shape_b,
                self.fixture_b.child,
                xf_a,
                xf_b,
                &mut self.simplex_cache,
                settings,
            );

            // Sensors don't generate manifolds.
            self.manifold.clear();
        } else {
            let old_manifold = core::mem::take(&mut self.manifold);

            (self.generator)(
                &mut self.manifold,
                shape_a,
                xf_a,
                self.fixture_a.child,
                shape_b,
                xf_b,
                self.fixture_b.child,
            );
            touching = self.manifold.point_count() > 0;

            for new_point in &mut self.manifold.points {
                new_point.normal_impulse = 0.0;
                new_point.tangent_impulse = 0.0;

                let key = new_point.id.key();
                if let Some(old_point) = old_manifold.points.iter().find(|p| p.id.key() == key) {
                    new_point.normal_impulse = old_point.normal_impulse;
                    new_point.tangent_impulse = old_point.tangent_impulse;
                }
            }
        }

        self.flags.set(ContactFlags::TOUCHING, touching);
        TouchTransition::new(was_touching, touching)
    }
}
