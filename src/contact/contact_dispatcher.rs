use crate::contact::Manifold;
use crate::math::{Isometry, Real};
use crate::shape::{Shape, ShapeType};
use hashbrown::HashMap;

/// A function computing the manifold between the children of two shapes.
///
/// Arguments are the manifold to fill, then the shape, world transform and child index of
/// each side. The generated manifold must describe shape A relative to shape B, with
/// the normal pointing from A to B. Accumulated impulses are ignored and reset by the
/// caller.
pub type ManifoldGenerator = fn(
    manifold: &mut Manifold,
    shape_a: &Shape,
    xf_a: &Isometry<Real>,
    child_a: usize,
    shape_b: &Shape,
    xf_b: &Isometry<Real>,
    child_b: usize,
);

/// A manifold generator resolved for an ordered pair of shapes.
#[derive(Copy, Clone, Debug)]
pub struct ResolvedGenerator {
    /// The generator to call.
    pub generator: ManifoldGenerator,
    /// If `true`, the generator expects the two shapes in the reverse order.
    pub swapped: bool,
}

/// The table of manifold generators, keyed by pair of shape types.
///
/// A generator registered for `(A, B)` also serves `(B, A)` after the two fixtures are
/// swapped, unless a generator is registered for `(B, A)` too.
#[derive(Clone, Debug, Default)]
pub struct ContactDispatcher {
    generators: HashMap<(ShapeType, ShapeType), ManifoldGenerator>,
}

impl ContactDispatcher {
    /// Creates a dispatcher without any generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the generator for shapes of type `type_a` against shapes of type `type_b`.
    ///
    /// Replaces and returns any generator previously registered for the same pair.
    pub fn register(
        &mut self,
        type_a: ShapeType,
        type_b: ShapeType,
        generator: ManifoldGenerator,
    ) -> Option<ManifoldGenerator> {
        self.generators.insert((type_a, type_b), generator)
    }

    /// Finds the generator handling shapes of type `type_a` against `type_b`.
    pub fn resolve(&self, type_a: ShapeType, type_b: ShapeType) -> Option<ResolvedGenerator> {
        if let Some(generator) = self.generators.get(&(type_a, type_b)) {
            Some(ResolvedGenerator {
                generator: *generator,
                swapped: false,
            })
        } else {
            self.generators
                .get(&(type_b, type_a))
                .map(|generator| ResolvedGenerator {
                    generator: *generator,
                    swapped: true,
                })
        }
    }
}
