//! Raycast collision resolution.
//!
//! [`CharacterController2d::move_by`] takes the displacement requested for one step and
//! resolves it against the world in three passes, all cast from the collider bounds
//! inset by the skin width:
//!
//! 1. **Descent probe.** When moving down while grounded, a ray from the middle of the
//!    bottom edge looks for a downhill slope and bends the displacement along it.
//! 2. **Horizontal sweep.** A fan of rays from the leading edge clamps `dx` at walls.
//!    The bottom ray also recognizes climbable slopes and turns the run into a climb.
//! 3. **Vertical sweep.** A fan of rays from the top or bottom edge, shifted by the
//!    resolved `dx`, clamps `dy` at floors and ceilings.
//!
//! Every quantity is a [`Fix`], so the same inputs produce the same outputs on every
//! platform.

use bevy::log::{debug, trace};
use bevy::prelude::*;
use thiserror::Error;

use crate::backend::SpatialQuery;
use crate::body::ControllerBody;
use crate::collision::{Aabb, RaycastHit};
use crate::config::{ConfigError, ControllerConfig};
use crate::layer::LayerMask;
use crate::math::{angle_between, tan_deg, Fix, FixVec2};
use crate::state::CollisionState;
use crate::triggers::{TriggerEvent, TriggerTracker};

/// Slack added to the skin width when deciding a ray hit is a direct impact.
pub const SKIN_WIDTH_FUDGE: Fix = Fix::lit("0.001");

/// `tan(75°)`. The descent probe reaches this far below the bottom edge per unit of
/// half width, enough to find any slope up to 75° under the footprint.
const SLOPE_PROBE_TANGENT: Fix = Fix::lit("3.7320508");

const RIGHT_ANGLE: Fix = Fix::lit("90");

/// Distance between neighbouring rays of each fan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaySpacing {
    /// Gap along x between the rays of the vertical sweep.
    pub horizontal: Fix,
    /// Gap along y between the rays of the horizontal sweep.
    pub vertical: Fix,
}

impl RaySpacing {
    fn new(collider_size: FixVec2, config: &ControllerConfig) -> Self {
        let margin = config.skin_width * 2;
        let usable_width = (collider_size.x.abs() - margin).max(Fix::ZERO);
        let usable_height = (collider_size.y.abs() - margin).max(Fix::ZERO);
        Self {
            horizontal: usable_width / gaps(config.total_vertical_rays),
            vertical: usable_height / gaps(config.total_horizontal_rays),
        }
    }
}

fn gaps(rays: usize) -> Fix {
    Fix::from_num(rays.saturating_sub(1).max(1))
}

/// Ray start points for one step: the collider bounds inset by the skin width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RaycastOrigins {
    top_left: FixVec2,
    bottom_left: FixVec2,
    bottom_right: FixVec2,
}

impl RaycastOrigins {
    fn new(bounds: Aabb, skin_width: Fix) -> Self {
        let inset = bounds.expand(-(skin_width * 2));
        Self {
            top_left: FixVec2::new(inset.min.x, inset.max.y),
            bottom_left: inset.min,
            bottom_right: FixVec2::new(inset.max.x, inset.min.y),
        }
    }
}

/// What a call to [`CharacterController2d::move_by`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Displacement actually applied to the body.
    pub displacement: FixVec2,
    /// Surfaces hit during the step, horizontal sweep first.
    pub hits: Vec<RaycastHit>,
}

/// [`CharacterController2d::warp_to_grounded`] ran out of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WarpError {
    /// No ground below within the step budget.
    #[error("no ground found after moving down {steps} steps")]
    NoGround {
        /// Unit steps taken.
        steps: usize,
    },
}

/// A raycast kinematic character controller.
///
/// The controller owns its validated [`ControllerConfig`], the ray spacing derived from
/// the collider size, and the [`CollisionState`] of the last step. The body and the
/// world are passed in on every call, so one controller can be driven from Bevy
/// systems or from plain code.
///
/// # Example
///
/// ```rust
/// use fp_character_controller::prelude::*;
/// use bevy::prelude::Entity;
///
/// let mut world = CollisionWorld::new();
/// world.insert(WorldCollider::solid(
///     Entity::from_raw(1),
///     ColliderShape::Box(Aabb::new(FixVec2::from_num(-10, -1), FixVec2::from_num(10, 0))),
///     0,
/// ));
///
/// let mut transform = FixedTransform::from_translation(FixVec2::from_num(0, 1));
/// let collider = BoxCollider2d::new(FixVec2::from_num(1, 2));
/// let mut body = Body2d::new(&mut transform, &collider);
///
/// let mut controller =
///     CharacterController2d::new(ControllerConfig::default(), body.collider_size()).unwrap();
/// let outcome = controller.move_by(&world, &mut body, FixVec2::from_num(0, -1), Fix::ONE);
///
/// assert_eq!(outcome.displacement, FixVec2::ZERO);
/// assert!(controller.is_grounded());
/// ```
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct CharacterController2d {
    config: ControllerConfig,
    #[reflect(ignore)]
    collider_size: FixVec2,
    #[reflect(ignore)]
    spacing: RaySpacing,
    state: CollisionState,
    #[reflect(ignore)]
    velocity: FixVec2,
    ignore_one_way_platforms: bool,
    #[reflect(ignore)]
    triggers: TriggerTracker,
}

impl CharacterController2d {
    /// Build a controller for a collider of the given effective size.
    pub fn new(config: ControllerConfig, collider_size: FixVec2) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        let spacing = RaySpacing::new(collider_size, &config);
        Ok(Self {
            config,
            collider_size,
            spacing,
            state: CollisionState::default(),
            velocity: FixVec2::ZERO,
            ignore_one_way_platforms: false,
            triggers: TriggerTracker::default(),
        })
    }

    /// Build a controller sized for `body`.
    pub fn for_body<B: ControllerBody + ?Sized>(
        config: ControllerConfig,
        body: &B,
    ) -> Result<Self, ConfigError> {
        Self::new(config, body.collider_size())
    }

    /// The validated configuration in use.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Replace the configuration between steps. On error the old one stays in place.
    pub fn set_config(&mut self, config: ControllerConfig) -> Result<(), ConfigError> {
        self.config = config.validated()?;
        self.spacing = RaySpacing::new(self.collider_size, &self.config);
        debug!("controller reconfigured, ray spacing {:?}", self.spacing);
        Ok(())
    }

    /// Recompute ray spacing after the collider size or scale changed.
    pub fn recalculate_ray_spacing(&mut self, collider_size: FixVec2) {
        self.collider_size = collider_size;
        self.spacing = RaySpacing::new(collider_size, &self.config);
    }

    /// Effective collider size the ray spacing was computed for.
    pub fn collider_size(&self) -> FixVec2 {
        self.collider_size
    }

    /// Current ray spacing.
    pub fn ray_spacing(&self) -> RaySpacing {
        self.spacing
    }

    /// Contacts from the last step.
    pub fn collision_state(&self) -> &CollisionState {
        &self.state
    }

    /// Whether the last step ended on the ground.
    pub fn is_grounded(&self) -> bool {
        self.state.below
    }

    /// Applied displacement divided by the step duration of the last step that had
    /// one. The vertical part is zero while climbing a slope.
    pub fn velocity(&self) -> FixVec2 {
        self.velocity
    }

    /// Pass through one-way platforms during the next call to `move_by` only.
    pub fn set_ignore_one_way_platforms(&mut self, ignore: bool) {
        self.ignore_one_way_platforms = ignore;
    }

    /// Whether the next step will pass through one-way platforms.
    pub fn ignores_one_way_platforms(&self) -> bool {
        self.ignore_one_way_platforms
    }

    /// Feed the triggers currently overlapping the body and get enter / stay / exit
    /// events in ascending entity order.
    ///
    /// The caller filters by [`ControllerConfig::trigger_mask`].
    pub fn update_triggers(&mut self, overlaps: impl IntoIterator<Item = Entity>) -> Vec<TriggerEvent> {
        self.triggers.update(overlaps)
    }

    /// Move `body` by `requested`, stopping at anything in the way.
    ///
    /// Returns the displacement actually applied and the surfaces hit. A positive
    /// `delta_time` also updates [`velocity`](Self::velocity).
    pub fn move_by<Q, B>(
        &mut self,
        query: &Q,
        body: &mut B,
        requested: FixVec2,
        delta_time: Fix,
    ) -> MoveOutcome
    where
        Q: SpatialQuery + ?Sized,
        B: ControllerBody + ?Sized,
    {
        let was_grounded = self.state.below;
        self.state.reset();
        self.state.was_grounded_last_frame = was_grounded;

        let mut step = Step {
            query,
            config: &self.config,
            spacing: self.spacing,
            state: &mut self.state,
            origins: RaycastOrigins::new(body.bounds(), self.config.skin_width),
            ignore_one_way: self.ignore_one_way_platforms,
            climbing: false,
            hits: Vec::new(),
        };

        let mut delta = requested;
        if delta.y < Fix::ZERO && was_grounded {
            step.descend_slope(&mut delta);
        }
        if delta.x != Fix::ZERO {
            step.move_horizontally(&mut delta, body);
        }
        if delta.y != Fix::ZERO {
            step.move_vertically(&mut delta);
        }
        let Step { climbing, hits, .. } = step;

        body.translate(delta);

        if delta_time > Fix::ZERO {
            if let Some(velocity) = delta.checked_div(delta_time) {
                self.velocity = velocity;
            }
        }
        // The climb rise is synthetic; it must never show up as vertical speed.
        if climbing {
            self.velocity.y = Fix::ZERO;
        }

        self.state.became_grounded_this_frame = !was_grounded && self.state.below;
        self.ignore_one_way_platforms = false;

        trace!(
            "requested {} applied {} hits {} [{}]",
            requested,
            delta,
            hits.len(),
            self.state
        );

        MoveOutcome {
            displacement: delta,
            hits,
        }
    }

    /// Move straight down one unit at a time until grounded.
    ///
    /// Returns the number of steps taken. Hits along the way are discarded.
    pub fn warp_to_grounded<Q, B>(
        &mut self,
        query: &Q,
        body: &mut B,
        max_steps: usize,
    ) -> Result<usize, WarpError>
    where
        Q: SpatialQuery + ?Sized,
        B: ControllerBody + ?Sized,
    {
        for step in 1..=max_steps {
            self.move_by(query, body, FixVec2::NEG_Y, Fix::ZERO);
            if self.is_grounded() {
                return Ok(step);
            }
        }
        Err(WarpError::NoGround { steps: max_steps })
    }
}

/// Scratch state of a single `move_by` call.
struct Step<'a, Q: ?Sized> {
    query: &'a Q,
    config: &'a ControllerConfig,
    spacing: RaySpacing,
    state: &'a mut CollisionState,
    origins: RaycastOrigins,
    ignore_one_way: bool,
    climbing: bool,
    hits: Vec<RaycastHit>,
}

impl<Q: SpatialQuery + ?Sized> Step<'_, Q> {
    fn cast(&self, origin: FixVec2, direction: FixVec2, distance: Fix, mask: LayerMask) -> Option<RaycastHit> {
        self.query.raycast(origin, direction, distance, mask)
    }

    fn skin(&self) -> Fix {
        self.config.skin_width
    }

    /// Platform layers without the one-way ones.
    fn solid_mask(&self) -> LayerMask {
        self.config
            .platform_mask
            .without(self.config.one_way_platform_mask)
    }

    /// Full platform mask when grounded last step, solid layers otherwise.
    fn grounded_mask(&self) -> LayerMask {
        if self.state.was_grounded_last_frame {
            self.config.platform_mask
        } else {
            self.solid_mask()
        }
    }

    fn descend_slope(&mut self, delta: &mut FixVec2) {
        let bottom_left = self.origins.bottom_left;
        let bottom_right = self.origins.bottom_right;
        let center_x = (bottom_left.x + bottom_right.x) / Fix::lit("2");
        let origin = FixVec2::new(center_x, bottom_left.y);
        let distance = SLOPE_PROBE_TANGENT * (bottom_right.x - center_x);

        let Some(hit) = self.cast(origin, FixVec2::NEG_Y, distance, self.config.platform_mask) else {
            return;
        };
        let angle = angle_between(hit.normal, FixVec2::Y);
        if angle == Fix::ZERO {
            return;
        }
        // Downhill when the surface leans the way we are going.
        if hit.normal.x.signum() != delta.x.signum() {
            return;
        }

        let multiplier = self.config.slope_speed_multiplier.evaluate(-angle);
        delta.y += hit.point.y - origin.y - self.skin();

        let share = angle / RIGHT_ANGLE;
        let along = delta.x * multiplier;
        // The vertical share uses |along| so walking right downhill never pushes up.
        delta.x += along * (Fix::ONE - share);
        delta.y -= along.abs() * share;

        self.state.moving_down_slope = true;
        self.state.slope_angle = angle;
    }

    fn move_horizontally<B: ControllerBody + ?Sized>(&mut self, delta: &mut FixVec2, body: &mut B) {
        let skin = self.skin();
        let going_right = delta.x > Fix::ZERO;
        let mut ray_distance = delta.x.abs() + skin;
        let (direction, initial) = if going_right {
            (FixVec2::X, self.origins.bottom_right)
        } else {
            (FixVec2::NEG_X, self.origins.bottom_left)
        };

        for i in 0..self.config.total_horizontal_rays {
            let ray = FixVec2::new(initial.x, initial.y + self.spacing.vertical * Fix::from_num(i));
            // Only the bottom ray may land on one-way platforms, so a grounded
            // character can walk up a one-way slope.
            let mask = if i == 0 {
                self.grounded_mask()
            } else {
                self.solid_mask()
            };
            let Some(hit) = self.cast(ray, direction, ray_distance, mask) else {
                continue;
            };

            if i == 0 && self.climb_slope(delta, angle_between(hit.normal, FixVec2::Y)) {
                self.hits.push(hit);
                // Landing on a slope from the air: stay flush with its surface.
                if !self.state.was_grounded_last_frame {
                    let flush = delta.x.signum() * (hit.distance - skin);
                    body.translate(FixVec2::new(flush, Fix::ZERO));
                }
                break;
            }

            delta.x = hit.point.x - ray.x;
            ray_distance = delta.x.abs();
            if going_right {
                delta.x -= skin;
                self.state.right = true;
            } else {
                delta.x += skin;
                self.state.left = true;
            }
            self.hits.push(hit);

            if ray_distance < skin + SKIN_WIDTH_FUDGE {
                break;
            }
        }
    }

    /// Turn a horizontal run into a climb when the bottom ray hit a walkable slope.
    ///
    /// Returns `false` for walls, which the caller clamps like any other hit.
    fn climb_slope(&mut self, delta: &mut FixVec2, angle: Fix) -> bool {
        if angle.round() >= RIGHT_ANGLE {
            return false;
        }

        if angle > self.config.slope_limit {
            delta.x = Fix::ZERO;
            return true;
        }
        // A jump in progress keeps its own trajectory.
        if delta.y >= self.config.jumping_threshold {
            return true;
        }

        delta.x *= self.config.slope_speed_multiplier.evaluate(angle);
        delta.y = tan_deg(angle).saturating_mul(delta.x).abs();

        let going_right = delta.x > Fix::ZERO;
        let origin = if going_right {
            self.origins.bottom_right
        } else {
            self.origins.bottom_left
        };
        if *delta != FixVec2::ZERO {
            if let Some(hit) = self.cast(origin, delta.normalize_or_zero(), delta.length(), self.grounded_mask()) {
                *delta = hit.point - origin;
                if going_right {
                    delta.x -= self.skin();
                } else {
                    delta.x += self.skin();
                }
            }
        }

        self.climbing = true;
        self.state.below = true;
        self.state.slope_angle = -angle;
        true
    }

    fn move_vertically(&mut self, delta: &mut FixVec2) {
        let skin = self.skin();
        let going_up = delta.y > Fix::ZERO;
        let mut ray_distance = delta.y.abs() + skin;
        let (direction, mut initial) = if going_up {
            (FixVec2::Y, self.origins.top_left)
        } else {
            (FixVec2::NEG_Y, self.origins.bottom_left)
        };
        initial.x += delta.x;

        let mask = if (going_up && !self.state.was_grounded_last_frame) || self.ignore_one_way {
            self.solid_mask()
        } else {
            self.config.platform_mask
        };

        for i in 0..self.config.total_vertical_rays {
            let ray = FixVec2::new(initial.x + self.spacing.horizontal * Fix::from_num(i), initial.y);
            let Some(hit) = self.cast(ray, direction, ray_distance, mask) else {
                continue;
            };

            delta.y = hit.point.y - ray.y;
            ray_distance = delta.y.abs();
            if going_up {
                delta.y -= skin;
                self.state.above = true;
            } else {
                delta.y += skin;
                self.state.below = true;
            }
            self.hits.push(hit);

            // Cresting a slope can leave a falling step resolved upward; treat it as
            // a climb so the residual rise does not unground the next step.
            if !going_up && delta.y > Fix::ZERO {
                self.climbing = true;
            }

            if ray_distance < skin + SKIN_WIDTH_FUDGE {
                break;
            }
        }
    }
}
