//! Platformer Example
//!
//! A character in a small level built from fixed-point colliders:
//! - A floor with walls on both sides
//! - A one-way platform in the middle
//! - A 30° ramp on the right
//! - A trigger zone on the left that tints the player while inside
//!
//! ## Controls
//! - **A/D** or **Left/Right**: Move horizontally
//! - **W/Up/Space**: Jump
//! - **S/Down** + jump: Drop through the one-way platform
//!
//! The camera follows the player.

use bevy::prelude::*;
use fp_character_controller::prelude::*;
use fp_character_controller::systems::fixed_delta_time;

// ==================== Constants ====================

const PX_PER_UNIT: f32 = 32.0;

const RUN_SPEED: Fix = Fix::lit("8");
const JUMP_SPEED: Fix = Fix::lit("13");
const GRAVITY: Fix = Fix::lit("-32");

const SOLID_LAYER: u8 = 0;
const ONE_WAY_LAYER: u8 = 1;
const TRIGGER_LAYER: u8 = 2;

const PLAYER_COLOR: Color = Color::srgb(0.9, 0.6, 0.2);
const ZONE_PLAYER_COLOR: Color = Color::srgb(0.3, 0.9, 0.5);

// ==================== Main ====================

#[derive(Component, Default)]
struct Player {
    velocity: FixVec2,
}

fn v(x: f64, y: f64) -> FixVec2 {
    FixVec2::from_num(x, y)
}

fn player_config() -> ControllerConfig {
    ControllerConfig::default()
        .with_platform_mask(LayerMask::layer(SOLID_LAYER))
        .with_one_way_platform_mask(LayerMask::layer(ONE_WAY_LAYER))
        .with_trigger_mask(LayerMask::layer(TRIGGER_LAYER))
        .with_slope_limit(Fix::from_num(40))
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Platformer - Fixed-Point Character Controller".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(CharacterController2dPlugin::<FixedWorldBackend>::default())
        .insert_resource(Time::<Fixed>::from_hz(64.0))
        .add_systems(Startup, setup)
        .add_systems(
            FixedUpdate,
            player_intent.before(CharacterControllerSet::Movement),
        )
        .add_systems(Update, (tint_in_trigger_zone, camera_follow))
        .run();
}

// ==================== Setup ====================

fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / PX_PER_UNIT,
            ..OrthographicProjection::default_2d()
        }),
    ));

    let ground = Color::srgb(0.3, 0.3, 0.3);
    // Floor and walls
    spawn_block(&mut commands, v(0.0, -0.5), v(40.0, 1.0), SOLID_LAYER, ground);
    spawn_block(&mut commands, v(-20.5, 6.0), v(1.0, 14.0), SOLID_LAYER, ground);
    spawn_block(&mut commands, v(20.5, 6.0), v(1.0, 14.0), SOLID_LAYER, ground);

    // One-way platform
    spawn_block(
        &mut commands,
        v(-3.0, 3.5),
        v(6.0, 0.5),
        ONE_WAY_LAYER,
        Color::srgb(0.4, 0.5, 0.7),
    );

    spawn_ramp(&mut commands, &mut meshes, &mut materials);

    // Trigger zone
    let zone = ColliderShape::rect(v(-14.0, 1.5), v(3.0, 3.0));
    commands.spawn((
        FixedCollider::trigger(zone, TRIGGER_LAYER),
        Sprite::from_color(Color::srgba(0.3, 0.9, 0.5, 0.25), Vec2::new(3.0, 3.0)),
        Transform::from_xyz(-14.0, 1.5, -1.0),
    ));

    // Player
    commands.spawn((
        Player::default(),
        player_config(),
        FixedTransform::from_translation(v(0.0, 2.0)),
        BoxCollider2d::new(v(1.0, 2.0)),
        MovementIntent::default(),
        Sprite::from_color(PLAYER_COLOR, Vec2::new(1.0, 2.0)),
        Transform::from_xyz(0.0, 2.0, 1.0),
    ));

    commands.spawn((
        Text::new("A/D: Move | W/Space: Jump | S + Jump: Drop through platform"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

/// Axis-aligned block in world space with a matching sprite.
fn spawn_block(commands: &mut Commands, center: FixVec2, size: FixVec2, layer: u8, color: Color) {
    let render_center = center.to_vec2();
    commands.spawn((
        FixedCollider::solid(ColliderShape::rect(center, size), layer),
        Sprite::from_color(color, size.to_vec2()),
        Transform::from_translation(render_center.extend(0.0)),
    ));
}

/// 30° ramp rising to the right against the right wall.
fn spawn_ramp(
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<ColorMaterial>>,
) {
    let points = [v(6.0, 0.0), v(20.0, 0.0), v(20.0, 8.083)];
    let Some(shape) = ColliderShape::polygon(points) else {
        warn!("ramp polygon is degenerate, skipping it");
        return;
    };

    let [a, b, c] = points.map(FixVec2::to_vec2);
    commands.spawn((
        FixedCollider::solid(shape, SOLID_LAYER),
        Mesh2d(meshes.add(Triangle2d::new(a, b, c))),
        MeshMaterial2d(materials.add(Color::srgb(0.35, 0.3, 0.25))),
        Transform::default(),
    ));
}

// ==================== Systems ====================

/// Turn keyboard input into this step's displacement.
fn player_intent(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time<Fixed>>,
    mut q_player: Query<(&mut Player, &mut MovementIntent, Option<&CharacterController2d>)>,
) {
    let dt = fixed_delta_time(&time);

    for (mut player, mut intent, controller) in &mut q_player {
        let state = controller.map(|c| *c.collision_state()).unwrap_or_default();

        let mut direction = Fix::ZERO;
        if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
            direction -= Fix::ONE;
        }
        if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
            direction += Fix::ONE;
        }
        player.velocity.x = direction * RUN_SPEED;

        if state.below || (state.above && player.velocity.y > Fix::ZERO) {
            player.velocity.y = Fix::ZERO;
        }

        let jump = keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp, KeyCode::Space]);
        let down = keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]);
        if state.below && jump {
            if down {
                intent.drop_through_one_way_platforms();
            } else {
                player.velocity.y = JUMP_SPEED;
            }
        }

        player.velocity.y += GRAVITY * dt;
        intent.set_displacement(player.velocity * dt);
    }
}

fn tint_in_trigger_zone(
    mut entered: EventReader<TriggerEntered>,
    mut exited: EventReader<TriggerExited>,
    mut q_sprites: Query<&mut Sprite, With<Player>>,
) {
    for event in entered.read() {
        if let Ok(mut sprite) = q_sprites.get_mut(event.controller) {
            sprite.color = ZONE_PLAYER_COLOR;
        }
    }
    for event in exited.read() {
        if let Ok(mut sprite) = q_sprites.get_mut(event.controller) {
            sprite.color = PLAYER_COLOR;
        }
    }
}

fn camera_follow(
    q_player: Query<&Transform, (With<Player>, Without<Camera2d>)>,
    mut q_camera: Query<&mut Transform, With<Camera2d>>,
) {
    let (Ok(player), Ok(mut camera)) = (q_player.single(), q_camera.single_mut()) else {
        return;
    };
    camera.translation.x = player.translation.x;
    camera.translation.y = player.translation.y;
}
