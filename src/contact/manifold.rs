use crate::math::{Isometry, Point, Real, Vector, DEFAULT_EPSILON};
use arrayvec::ArrayVec;

/// The maximum number of points of a contact manifold.
pub const MAX_MANIFOLD_POINTS: usize = 2;

/// The kind of geometric feature involved in a contact point.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ContactFeatureType {
    /// A vertex.
    #[default]
    Vertex = 0,
    /// An edge (a face in 2D).
    Face = 1,
}

/// Identifies a contact point by the features that intersect to form it.
///
/// Contact ids are persistent across steps as long as the same features touch. They are
/// used to carry accumulated impulses from one manifold to the next.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ContactId {
    /// Feature index on shape A.
    pub index_a: u8,
    /// Feature index on shape B.
    pub index_b: u8,
    /// Feature type on shape A.
    pub type_a: ContactFeatureType,
    /// Feature type on shape B.
    pub type_b: ContactFeatureType,
}

impl ContactId {
    /// Creates a new contact id.
    pub fn new(
        index_a: u8,
        type_a: ContactFeatureType,
        index_b: u8,
        type_b: ContactFeatureType,
    ) -> Self {
        Self {
            index_a,
            index_b,
            type_a,
            type_b,
        }
    }

    /// The packed key of this id, used for fast comparison.
    #[inline]
    pub fn key(&self) -> u32 {
        self.index_a as u32
            | (self.index_b as u32) << 8
            | (self.type_a as u32) << 16
            | (self.type_b as u32) << 24
    }

    /// The same id with the roles of shapes A and B exchanged.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self {
            index_a: self.index_b,
            index_b: self.index_a,
            type_a: self.type_b,
            type_b: self.type_a,
        }
    }
}

/// The meaning of `local_point`, `local_normal` and the point anchors of a [`Manifold`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ManifoldType {
    /// Two circles: `local_point` is the center of circle A, the single point anchor is
    /// the center of circle B, and the normal is unused.
    #[default]
    Circles,
    /// A face of shape A: `local_point` and `local_normal` describe the reference face
    /// in the frame of A, point anchors are the clip points of shape B in the frame of B.
    FaceA,
    /// A face of shape B: same as `FaceA` with the roles of both shapes exchanged.
    FaceB,
}

/// A manifold point is a contact point belonging to a contact manifold.
///
/// The local point usage depends on the manifold type:
/// - `Circles`: the local center of circle B,
/// - `FaceA`: the local center of circle B or the clip point of polygon B,
/// - `FaceB`: the clip point of polygon A.
///
/// The impulses are used for warm starting.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ManifoldPoint {
    /// Usage depends on the manifold type.
    pub local_point: Point<Real>,
    /// The non-penetration impulse.
    pub normal_impulse: Real,
    /// The friction impulse.
    pub tangent_impulse: Real,
    /// Uniquely identifies a contact point between two shapes.
    pub id: ContactId,
}

impl ManifoldPoint {
    /// A new manifold point with zero accumulated impulses.
    pub fn new(local_point: Point<Real>, id: ContactId) -> Self {
        Self {
            local_point,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            id,
        }
    }
}

/// A contact manifold describes how two shapes touch, with up to two points.
///
/// Points are stored in local coordinates so they stay valid while the bodies move
/// within a step, which matters for continuous collision.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Manifold {
    /// The contact points.
    pub points: ArrayVec<ManifoldPoint, MAX_MANIFOLD_POINTS>,
    /// Not used for `ManifoldType::Circles`.
    pub local_normal: Vector<Real>,
    /// Usage depends on the manifold type.
    pub local_point: Point<Real>,
    /// The manifold type.
    pub manifold_type: ManifoldType,
}

impl Manifold {
    /// An empty manifold.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of contact points.
    #[inline]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Removes every contact point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Computes the world-space normal, contact points and separations of this manifold.
    ///
    /// The normal points from shape A to shape B. Each world point lies midway between
    /// the two skin surfaces.
    pub fn world_manifold(
        &self,
        xf_a: &Isometry<Real>,
        radius_a: Real,
        xf_b: &Isometry<Real>,
        radius_b: Real,
    ) -> WorldManifold {
        let mut result = WorldManifold::default();

        if self.points.is_empty() {
            return result;
        }

        match self.manifold_type {
            ManifoldType::Circles => {
                let point_a = xf_a * self.local_point;
                let point_b = xf_b * self.points[0].local_point;
                let mut normal = Vector::x();

                if na::distance_squared(&point_a, &point_b) > DEFAULT_EPSILON * DEFAULT_EPSILON {
                    normal = (point_b - point_a).normalize();
                }

                let c_a = point_a + normal * radius_a;
                let c_b = point_b - normal * radius_b;

                result.normal = normal;
                result.points.push(na::center(&c_a, &c_b));
                result.separations.push((c_b - c_a).dot(&normal));
            }
            ManifoldType::FaceA => {
                let normal = xf_a.rotation * self.local_normal;
                let plane_point = xf_a * self.local_point;

                for point in &self.points {
                    let clip_point = xf_b * point.local_point;
                    let c_a = clip_point
                        + normal * (radius_a - (clip_point - plane_point).dot(&normal));
                    let c_b = clip_point - normal * radius_b;

                    result.points.push(na::center(&c_a, &c_b));
                    result.separations.push((c_b - c_a).dot(&normal));
                }

                result.normal = normal;
            }
            ManifoldType::FaceB => {
                let normal = xf_b.rotation * self.local_normal;
                let plane_point = xf_b * self.local_point;

                for point in &self.points {
                    let clip_point = xf_a * point.local_point;
                    let c_b = clip_point
                        + normal * (radius_b - (clip_point - plane_point).dot(&normal));
                    let c_a = clip_point - normal * radius_a;

                    result.points.push(na::center(&c_a, &c_b));
                    result.separations.push((c_a - c_b).dot(&normal));
                }

                // Ensure the normal points from A to B.
                result.normal = -normal;
            }
        }

        result
    }
}

/// A manifold in world space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldManifold {
    /// World vector pointing from A to B.
    pub normal: Vector<Real>,
    /// World contact points, midway between the two skins.
    pub points: ArrayVec<Point<Real>, MAX_MANIFOLD_POINTS>,
    /// A negative value indicates overlap, in meters.
    pub separations: ArrayVec<Real, MAX_MANIFOLD_POINTS>,
}

/// Friction mixing law: either fixture can drive the friction to zero.
///
/// For example, anything slides on ice.
#[inline]
pub fn mix_friction(friction1: Real, friction2: Real) -> Real {
    (friction1 * friction2).sqrt()
}

/// Restitution mixing law: anything bounces off an elastic surface.
///
/// For example, a superball bounces on anything.
#[inline]
pub fn mix_restitution(restitution1: Real, restitution2: Real) -> Real {
    restitution1.max(restitution2)
}

#[cfg(test)]
mod test {
    use super::{
        mix_friction, mix_restitution, ContactFeatureType, ContactId, Manifold, ManifoldPoint,
        ManifoldType,
    };
    use crate::math::{Isometry, Point, Vector};

    #[test]
    fn circles_world_manifold() {
        let mut manifold = Manifold::new();
        manifold.manifold_type = ManifoldType::Circles;
        manifold.local_point = Point::origin();
        manifold
            .points
            .push(ManifoldPoint::new(Point::origin(), ContactId::default()));

        let xf_a = Isometry::translation(0.0, 0.0);
        let xf_b = Isometry::translation(0.0, 1.5);
        let world = manifold.world_manifold(&xf_a, 1.0, &xf_b, 1.0);

        assert_relative_eq!(world.normal, Vector::y());
        assert_relative_eq!(world.separations[0], -0.5);
        assert_relative_eq!(world.points[0], Point::new(0.0, 0.75));
    }

    #[test]
    fn face_b_normal_points_from_a_to_b() {
        let mut manifold = Manifold::new();
        manifold.manifold_type = ManifoldType::FaceB;
        // Bottom face of B, in the frame of B.
        manifold.local_normal = -Vector::y();
        manifold.local_point = Point::new(0.0, -1.0);
        manifold.points.push(ManifoldPoint::new(
            Point::new(0.0, 1.1),
            ContactId::default(),
        ));

        let xf_a = Isometry::identity();
        let xf_b = Isometry::translation(0.0, 2.0);
        let world = manifold.world_manifold(&xf_a, 0.0, &xf_b, 0.0);

        assert_relative_eq!(world.normal, Vector::y());
        assert_relative_eq!(world.separations[0], -0.1, epsilon = 1.0e-6);
    }

    #[test]
    fn mixing_laws_and_ids() {
        assert_relative_eq!(mix_friction(0.4, 0.9), 0.6, epsilon = 1.0e-6);
        assert_eq!(mix_friction(0.0, 1.0), 0.0);
        assert_eq!(mix_restitution(0.2, 0.7), 0.7);

        let id = ContactId::new(1, ContactFeatureType::Vertex, 3, ContactFeatureType::Face);
        assert_ne!(id.key(), id.swapped().key());
        assert_eq!(id.swapped().swapped(), id);
        assert_eq!(id.key(), 1 | 3 << 8 | 1 << 24);
    }
}
