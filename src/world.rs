//! Deterministic fixed-point collision world.
//!
//! [`CollisionWorld`] is a flat list of layered colliders answering raycasts in
//! [`Fix`] arithmetic. Colliders are tested in insertion order and ties go to the
//! earlier one, so queries are reproducible bit for bit. The world can be filled by
//! hand or synced every fixed step from [`FixedCollider`] components by the
//! [`FixedWorldBackend`].

use bevy::prelude::*;

use crate::backend::{CharacterPhysicsBackend, SpatialQuery};
use crate::body::{Body2d, BoxCollider2d, ControllerBody, FixedTransform};
use crate::collision::{Aabb, RaycastHit};
use crate::controller::CharacterController2d;
use crate::events::ControllerEvents;
use crate::intent::MovementIntent;
use crate::layer::LayerMask;
use crate::math::{Fix, FixVec2};
use crate::systems::{advance_controller, fixed_delta_time};
use crate::CharacterControllerSet;

/// Convex polygon with counter-clockwise winding.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvexPolygon {
    points: Vec<FixVec2>,
}

impl ConvexPolygon {
    /// Build from at least three points in either winding.
    ///
    /// Returns `None` for fewer than three points or zero area. Convexity is not
    /// checked; concave input gives wrong hits.
    pub fn new(points: impl IntoIterator<Item = FixVec2>) -> Option<Self> {
        let mut points: Vec<FixVec2> = points.into_iter().collect();
        if points.len() < 3 {
            return None;
        }
        let twice_area = edges(&points).fold(Fix::ZERO, |sum, (a, b)| sum + a.perp_dot(b));
        if twice_area == Fix::ZERO {
            return None;
        }
        if twice_area < Fix::ZERO {
            points.reverse();
        }
        Some(Self { points })
    }

    /// Vertices in counter-clockwise order.
    pub fn points(&self) -> &[FixVec2] {
        &self.points
    }

    fn contains_strictly(&self, point: FixVec2) -> bool {
        self.points.len() >= 3 && edges(&self.points).all(|(a, b)| (b - a).perp_dot(point - a) > Fix::ZERO)
    }
}

fn edges(points: &[FixVec2]) -> impl Iterator<Item = (FixVec2, FixVec2)> + '_ {
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&a, &b)| (a, b))
}

/// Geometry of a [`WorldCollider`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColliderShape {
    /// Axis-aligned box.
    Box(Aabb),
    /// Two-sided line segment.
    Segment {
        /// First end point.
        a: FixVec2,
        /// Second end point.
        b: FixVec2,
    },
    /// Convex polygon.
    Polygon(ConvexPolygon),
}

impl ColliderShape {
    /// Box of `size` centered on `center`.
    pub fn rect(center: FixVec2, size: FixVec2) -> Self {
        Self::Box(Aabb::from_center_size(center, size))
    }

    /// Segment from `a` to `b`.
    pub fn segment(a: FixVec2, b: FixVec2) -> Self {
        Self::Segment { a, b }
    }

    /// Convex polygon; see [`ConvexPolygon::new`].
    pub fn polygon(points: impl IntoIterator<Item = FixVec2>) -> Option<Self> {
        ConvexPolygon::new(points).map(Self::Polygon)
    }

    /// Bounding box.
    pub fn bounds(&self) -> Aabb {
        match self {
            Self::Box(aabb) => *aabb,
            Self::Segment { a, b } => Aabb::new(*a, *b),
            Self::Polygon(polygon) => {
                let Some(&first) = polygon.points.first() else {
                    return Aabb::default();
                };
                polygon
                    .points
                    .iter()
                    .fold(Aabb::new(first, first), |bounds, &p| bounds.union(&Aabb::new(p, p)))
            }
        }
    }

    /// Shape moved by `delta`.
    pub fn translated(&self, delta: FixVec2) -> Self {
        match self {
            Self::Box(aabb) => Self::Box(aabb.translated(delta)),
            Self::Segment { a, b } => Self::Segment {
                a: *a + delta,
                b: *b + delta,
            },
            Self::Polygon(polygon) => Self::Polygon(ConvexPolygon {
                points: polygon.points.iter().map(|&p| p + delta).collect(),
            }),
        }
    }

    /// Distance and surface normal of the first intersection with the ray.
    ///
    /// A ray starting inside a box or polygon hits at distance zero with the normal
    /// pointing back along the ray.
    pub fn raycast(&self, origin: FixVec2, direction: FixVec2, max_distance: Fix) -> Option<(Fix, FixVec2)> {
        if direction == FixVec2::ZERO || max_distance < Fix::ZERO {
            return None;
        }
        match self {
            Self::Box(aabb) => raycast_box(aabb, origin, direction, max_distance),
            Self::Segment { a, b } => {
                let t = raycast_segment(*a, *b, origin, direction, max_distance)?;
                let mut normal = (*b - *a).perp().normalize_or_zero();
                if normal.dot(direction) > Fix::ZERO {
                    normal = -normal;
                }
                Some((t, normal))
            }
            Self::Polygon(polygon) => raycast_polygon(polygon, origin, direction, max_distance),
        }
    }
}

fn raycast_box(aabb: &Aabb, origin: FixVec2, direction: FixVec2, max_distance: Fix) -> Option<(Fix, FixVec2)> {
    let mut t_enter = Fix::MIN;
    let mut t_exit = Fix::MAX;
    let mut normal = FixVec2::ZERO;

    let axes = [
        (origin.x, direction.x, aabb.min.x, aabb.max.x, FixVec2::X),
        (origin.y, direction.y, aabb.min.y, aabb.max.y, FixVec2::Y),
    ];
    for (o, d, lo, hi, axis) in axes {
        if d == Fix::ZERO {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let t_lo = (lo - o).checked_div(d)?;
        let t_hi = (hi - o).checked_div(d)?;
        let (near, far, face) = if d > Fix::ZERO {
            (t_lo, t_hi, -axis)
        } else {
            (t_hi, t_lo, axis)
        };
        if near > t_enter {
            t_enter = near;
            normal = face;
        }
        t_exit = t_exit.min(far);
    }

    if t_enter > t_exit || t_exit <= Fix::ZERO {
        return None;
    }
    if t_enter < Fix::ZERO {
        return Some((Fix::ZERO, -direction));
    }
    (t_enter <= max_distance).then_some((t_enter, normal))
}

/// Ray parameter where the ray crosses segment `a..b`, if within `0..=max_distance`.
fn raycast_segment(a: FixVec2, b: FixVec2, origin: FixVec2, direction: FixVec2, max_distance: Fix) -> Option<Fix> {
    let edge = b - a;
    let denom = direction.perp_dot(edge);
    if denom == Fix::ZERO {
        return None;
    }
    let to_start = a - origin;
    let t = to_start.perp_dot(edge).checked_div(denom)?;
    let s = to_start.perp_dot(direction).checked_div(denom)?;
    (t >= Fix::ZERO && t <= max_distance && s >= Fix::ZERO && s <= Fix::ONE).then_some(t)
}

fn raycast_polygon(
    polygon: &ConvexPolygon,
    origin: FixVec2,
    direction: FixVec2,
    max_distance: Fix,
) -> Option<(Fix, FixVec2)> {
    if polygon.contains_strictly(origin) {
        return Some((Fix::ZERO, -direction));
    }
    let mut best: Option<(Fix, FixVec2)> = None;
    for (a, b) in edges(&polygon.points) {
        // Counter-clockwise winding puts the outside on the right of each edge.
        let outward = -(b - a).perp();
        if outward.dot(direction) >= Fix::ZERO {
            continue;
        }
        let Some(t) = raycast_segment(a, b, origin, direction, max_distance) else {
            continue;
        };
        if best.is_none_or(|(best_t, _)| t < best_t) {
            best = Some((t, outward.normalize_or_zero()));
        }
    }
    best
}

/// One collider in a [`CollisionWorld`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldCollider {
    /// Entity reported in hits.
    pub entity: Entity,
    /// World-space geometry.
    pub shape: ColliderShape,
    /// Layer index, 0..32.
    pub layer: u8,
    /// Trigger volumes are invisible to raycasts and only reported as overlaps.
    pub is_trigger: bool,
    synced: bool,
}

impl WorldCollider {
    /// A solid collider.
    pub fn solid(entity: Entity, shape: ColliderShape, layer: u8) -> Self {
        Self {
            entity,
            shape,
            layer,
            is_trigger: false,
            synced: false,
        }
    }

    /// A trigger volume.
    pub fn trigger(entity: Entity, shape: ColliderShape, layer: u8) -> Self {
        Self {
            is_trigger: true,
            ..Self::solid(entity, shape, layer)
        }
    }
}

/// Flat list of colliders queried in insertion order.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::Entity;
/// use fp_character_controller::prelude::*;
///
/// let wall = Entity::from_raw(3);
/// let mut world = CollisionWorld::new();
/// world.insert(WorldCollider::solid(
///     wall,
///     ColliderShape::rect(FixVec2::from_num(5, 0), FixVec2::from_num(2, 10)),
///     1,
/// ));
///
/// let hit = world
///     .raycast(FixVec2::ZERO, FixVec2::X, Fix::from_num(10), LayerMask::layer(1))
///     .unwrap();
/// assert_eq!(hit.distance, Fix::from_num(4));
/// assert_eq!(hit.normal, FixVec2::NEG_X);
/// assert_eq!(hit.entity, Some(wall));
///
/// // Other layers are ignored.
/// assert!(world.raycast(FixVec2::ZERO, FixVec2::X, Fix::from_num(10), LayerMask::layer(0)).is_none());
/// ```
#[derive(Resource, Debug, Clone, Default)]
pub struct CollisionWorld {
    colliders: Vec<WorldCollider>,
}

impl CollisionWorld {
    /// Empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collider after every existing one.
    pub fn insert(&mut self, collider: WorldCollider) {
        self.colliders.push(collider);
    }

    /// Remove every collider of `entity`, returning how many there were.
    pub fn remove(&mut self, entity: Entity) -> usize {
        let before = self.colliders.len();
        self.colliders.retain(|collider| collider.entity != entity);
        before - self.colliders.len()
    }

    /// Remove every collider.
    pub fn clear(&mut self) {
        self.colliders.clear();
    }

    /// Number of colliders.
    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    /// Whether the world has no colliders.
    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Colliders in query order.
    pub fn colliders(&self) -> &[WorldCollider] {
        &self.colliders
    }

    /// A query view that ignores the colliders of `entity`.
    pub fn excluding(&self, entity: Entity) -> ExcludingEntity<'_> {
        ExcludingEntity {
            world: self,
            entity,
        }
    }

    /// Nearest solid hit on a layer in `mask`.
    pub fn raycast(&self, origin: FixVec2, direction: FixVec2, max_distance: Fix, mask: LayerMask) -> Option<RaycastHit> {
        self.raycast_filtered(origin, direction, max_distance, mask, None)
    }

    /// Trigger volumes on a layer in `mask` whose bounds overlap `bounds`, sorted by
    /// entity.
    pub fn overlapping_triggers(&self, bounds: Aabb, mask: LayerMask) -> Vec<Entity> {
        let mut triggers: Vec<Entity> = self
            .colliders
            .iter()
            .filter(|c| c.is_trigger && mask.contains_layer(c.layer) && c.shape.bounds().intersects(&bounds))
            .map(|c| c.entity)
            .collect();
        triggers.sort();
        triggers.dedup();
        triggers
    }

    fn raycast_filtered(
        &self,
        origin: FixVec2,
        direction: FixVec2,
        max_distance: Fix,
        mask: LayerMask,
        exclude: Option<Entity>,
    ) -> Option<RaycastHit> {
        let mut best: Option<RaycastHit> = None;
        for collider in &self.colliders {
            if collider.is_trigger || !mask.contains_layer(collider.layer) || exclude == Some(collider.entity) {
                continue;
            }
            let Some((distance, normal)) = collider.shape.raycast(origin, direction, max_distance) else {
                continue;
            };
            if best.is_none_or(|hit| distance < hit.distance) {
                let point = origin + direction * distance;
                best = Some(RaycastHit::new(point, normal, distance, Some(collider.entity)));
            }
        }
        best
    }

    /// Replace the colliders added by the sync system, keeping hand-inserted ones.
    fn replace_synced(&mut self, synced: impl IntoIterator<Item = WorldCollider>) {
        self.colliders.retain(|collider| !collider.synced);
        self.colliders.extend(synced.into_iter().map(|collider| WorldCollider {
            synced: true,
            ..collider
        }));
    }
}

impl SpatialQuery for CollisionWorld {
    fn raycast(&self, origin: FixVec2, direction: FixVec2, max_distance: Fix, mask: LayerMask) -> Option<RaycastHit> {
        self.raycast_filtered(origin, direction, max_distance, mask, None)
    }
}

/// [`CollisionWorld`] view that skips one entity, usually the controller itself.
#[derive(Debug, Clone, Copy)]
pub struct ExcludingEntity<'a> {
    world: &'a CollisionWorld,
    entity: Entity,
}

impl SpatialQuery for ExcludingEntity<'_> {
    fn raycast(&self, origin: FixVec2, direction: FixVec2, max_distance: Fix, mask: LayerMask) -> Option<RaycastHit> {
        self.world
            .raycast_filtered(origin, direction, max_distance, mask, Some(self.entity))
    }
}

/// Collider component synced into the [`CollisionWorld`] every fixed step.
///
/// The shape is in local space and offset by the entity's [`FixedTransform`]
/// translation, if it has one. Scale is not applied.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct FixedCollider {
    /// Local geometry.
    pub shape: ColliderShape,
    /// Layer index, 0..32.
    pub layer: u8,
    /// Whether this is a trigger volume.
    pub is_trigger: bool,
}

impl FixedCollider {
    /// A solid collider.
    pub fn solid(shape: ColliderShape, layer: u8) -> Self {
        Self {
            shape,
            layer,
            is_trigger: false,
        }
    }

    /// A trigger volume.
    pub fn trigger(shape: ColliderShape, layer: u8) -> Self {
        Self {
            shape,
            layer,
            is_trigger: true,
        }
    }
}

/// Deterministic backend over [`CollisionWorld`].
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use fp_character_controller::prelude::*;
///
/// App::new()
///     .add_plugins(MinimalPlugins)
///     .add_plugins(CharacterController2dPlugin::<FixedWorldBackend>::default())
///     .run();
/// ```
pub struct FixedWorldBackend;

impl CharacterPhysicsBackend for FixedWorldBackend {
    fn plugin() -> impl Plugin {
        FixedWorldBackendPlugin
    }
}

/// Plugin that sets up the collision world systems.
pub struct FixedWorldBackendPlugin;

impl Plugin for FixedWorldBackendPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CollisionWorld>();

        app.add_systems(
            FixedUpdate,
            sync_collision_world.in_set(CharacterControllerSet::Preparation),
        );
        app.add_systems(
            FixedUpdate,
            step_fixed_world_controllers.in_set(CharacterControllerSet::Movement),
        );
    }
}

/// Rebuild the synced part of the world from [`FixedCollider`] components in
/// ascending entity order.
pub fn sync_collision_world(
    mut world: ResMut<CollisionWorld>,
    q_colliders: Query<(Entity, &FixedCollider, Option<&FixedTransform>)>,
) {
    let mut colliders: Vec<_> = q_colliders.iter().collect();
    colliders.sort_by_key(|(entity, ..)| *entity);

    world.replace_synced(colliders.into_iter().map(|(entity, collider, transform)| {
        let offset = transform.map_or(FixVec2::ZERO, |t| t.translation);
        WorldCollider {
            is_trigger: collider.is_trigger,
            ..WorldCollider::solid(entity, collider.shape.translated(offset), collider.layer)
        }
    }));
}

/// Step every controller against the collision world in ascending entity order.
pub fn step_fixed_world_controllers(
    world: Res<CollisionWorld>,
    time: Res<Time<Fixed>>,
    mut q_controllers: Query<(
        Entity,
        &mut CharacterController2d,
        &mut FixedTransform,
        &BoxCollider2d,
        Option<&mut MovementIntent>,
    )>,
    mut events: ControllerEvents,
) {
    let delta_time = fixed_delta_time(&time);
    let mut entities: Vec<Entity> = q_controllers.iter().map(|(entity, ..)| entity).collect();
    entities.sort();

    for entity in entities {
        let Ok((entity, mut controller, mut transform, collider, intent)) = q_controllers.get_mut(entity) else {
            continue;
        };
        let query = world.excluding(entity);
        let mut body = Body2d::new(&mut *transform, collider);
        advance_controller(entity, &mut controller, &mut body, intent, &query, delta_time, &mut events);

        let overlaps = world.overlapping_triggers(body.bounds(), controller.config().trigger_mask);
        let changes = controller.update_triggers(overlaps.into_iter().filter(|&trigger| trigger != entity));
        events.write_triggers(entity, &changes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f64, y: f64) -> FixVec2 {
        FixVec2::from_num(x, y)
    }

    fn fx(x: f64) -> Fix {
        Fix::from_num(x)
    }

    fn e(index: u32) -> Entity {
        Entity::from_raw(index)
    }

    #[test]
    fn box_hit_from_each_side() {
        let shape = ColliderShape::rect(v(0.0, 0.0), v(2.0, 2.0));

        assert_eq!(shape.raycast(v(-3.0, 0.0), FixVec2::X, fx(5.0)), Some((fx(2.0), FixVec2::NEG_X)));
        assert_eq!(shape.raycast(v(3.0, 0.5), FixVec2::NEG_X, fx(5.0)), Some((fx(2.0), FixVec2::X)));
        assert_eq!(shape.raycast(v(0.0, 4.0), FixVec2::NEG_Y, fx(5.0)), Some((fx(3.0), FixVec2::Y)));
        assert_eq!(shape.raycast(v(0.5, -2.0), FixVec2::Y, fx(5.0)), Some((fx(1.0), FixVec2::NEG_Y)));
    }

    #[test]
    fn box_miss_cases() {
        let shape = ColliderShape::rect(v(0.0, 0.0), v(2.0, 2.0));

        // Too short, pointing away, passing beside.
        assert!(shape.raycast(v(-3.0, 0.0), FixVec2::X, fx(1.5)).is_none());
        assert!(shape.raycast(v(-3.0, 0.0), FixVec2::NEG_X, fx(10.0)).is_none());
        assert!(shape.raycast(v(-3.0, 1.5), FixVec2::X, fx(10.0)).is_none());
        // Leaving from the surface.
        assert!(shape.raycast(v(0.0, 1.0), FixVec2::Y, fx(10.0)).is_none());
    }

    #[test]
    fn ray_inside_box_hits_at_zero() {
        let shape = ColliderShape::rect(v(0.0, 0.0), v(2.0, 2.0));
        assert_eq!(shape.raycast(v(0.5, 0.5), FixVec2::X, fx(3.0)), Some((Fix::ZERO, FixVec2::NEG_X)));
    }

    #[test]
    fn diagonal_box_hit() {
        let shape = ColliderShape::rect(v(4.0, 4.0), v(2.0, 2.0));
        let direction = v(1.0, 1.0).normalize_or_zero();
        let (distance, normal) = shape.raycast(FixVec2::ZERO, direction, fx(10.0)).unwrap();

        assert!((distance.to_num::<f64>() - 3.0 * std::f64::consts::SQRT_2).abs() < 1e-3);
        // Enters through the corner; x is tested first and wins the tie.
        assert_eq!(normal, FixVec2::NEG_X);
    }

    #[test]
    fn segment_normal_faces_ray() {
        let shape = ColliderShape::segment(v(0.0, -1.0), v(0.0, 1.0));

        let (distance, normal) = shape.raycast(v(-2.0, 0.0), FixVec2::X, fx(5.0)).unwrap();
        assert_eq!(distance, fx(2.0));
        assert_eq!(normal, FixVec2::NEG_X);

        let (_, normal) = shape.raycast(v(2.0, 0.5), FixVec2::NEG_X, fx(5.0)).unwrap();
        assert_eq!(normal, FixVec2::X);

        assert!(shape.raycast(v(-2.0, 2.0), FixVec2::X, fx(5.0)).is_none());
        assert!(shape.raycast(v(-2.0, 0.0), FixVec2::Y, fx(5.0)).is_none());
    }

    #[test]
    fn ramp_polygon_reports_slope_normal() {
        // 45 degree ramp rising to the right.
        let ramp = ColliderShape::polygon([v(0.0, 0.0), v(4.0, 4.0), v(4.0, 0.0)]).unwrap();
        let (distance, normal) = ramp.raycast(v(3.0, 5.0), FixVec2::NEG_Y, fx(10.0)).unwrap();

        assert_eq!(distance, fx(2.0));
        assert!((normal.x.to_num::<f64>() + std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-3);
        assert!((normal.y.to_num::<f64>() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-3);
    }

    #[test]
    fn polygon_winding_is_normalized() {
        let clockwise = ConvexPolygon::new([v(0.0, 0.0), v(0.0, 1.0), v(1.0, 0.0)]).unwrap();
        assert_eq!(clockwise.points()[0], v(1.0, 0.0));
        assert!(ConvexPolygon::new([v(0.0, 0.0), v(1.0, 1.0)]).is_none());
        assert!(ConvexPolygon::new([v(0.0, 0.0), v(1.0, 1.0), v(2.0, 2.0)]).is_none());
    }

    #[test]
    fn nearest_hit_wins_and_ties_go_to_first_inserted() {
        let mut world = CollisionWorld::new();
        world.insert(WorldCollider::solid(e(1), ColliderShape::rect(v(10.0, 0.0), v(2.0, 2.0)), 0));
        world.insert(WorldCollider::solid(e(2), ColliderShape::rect(v(5.0, 0.0), v(2.0, 2.0)), 0));
        world.insert(WorldCollider::solid(e(3), ColliderShape::segment(v(4.0, -1.0), v(4.0, 1.0)), 0));

        let hit = world.raycast(FixVec2::ZERO, FixVec2::X, fx(20.0), LayerMask::ALL).unwrap();
        assert_eq!(hit.entity, Some(e(2)));
        assert_eq!(hit.point, v(4.0, 0.0));

        let hit = world.excluding(e(2)).raycast(FixVec2::ZERO, FixVec2::X, fx(20.0), LayerMask::ALL).unwrap();
        assert_eq!(hit.entity, Some(e(3)));
    }

    #[test]
    fn triggers_are_not_solid() {
        let mut world = CollisionWorld::new();
        world.insert(WorldCollider::trigger(e(9), ColliderShape::rect(v(3.0, 0.0), v(2.0, 2.0)), 2));
        world.insert(WorldCollider::trigger(e(4), ColliderShape::rect(v(0.0, 0.0), v(1.0, 1.0)), 3));

        assert!(world.raycast(FixVec2::ZERO, FixVec2::X, fx(10.0), LayerMask::ALL).is_none());

        let bounds = Aabb::new(v(-1.0, -1.0), v(2.5, 1.0));
        assert_eq!(world.overlapping_triggers(bounds, LayerMask::ALL), vec![e(4), e(9)]);
        assert_eq!(world.overlapping_triggers(bounds, LayerMask::layer(2)), vec![e(9)]);
    }

    #[test]
    fn sync_keeps_hand_inserted_colliders() {
        let mut world = CollisionWorld::new();
        world.insert(WorldCollider::solid(e(1), ColliderShape::rect(v(0.0, 0.0), v(1.0, 1.0)), 0));
        world.replace_synced([WorldCollider::solid(e(2), ColliderShape::rect(v(5.0, 0.0), v(1.0, 1.0)), 0)]);
        world.replace_synced([WorldCollider::solid(e(3), ColliderShape::rect(v(5.0, 0.0), v(1.0, 1.0)), 0)]);

        let entities: Vec<Entity> = world.colliders().iter().map(|c| c.entity).collect();
        assert_eq!(entities, vec![e(1), e(3)]);
        assert_eq!(world.remove(e(1)), 1);
        assert_eq!(world.len(), 1);
    }
}
