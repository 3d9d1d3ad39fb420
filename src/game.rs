//! Pong demo scene.
//!
//! Two AI paddles, a ball riding a Rigidbody with a CircleCollider, walls
//! and goal zones with static BoxColliders, a score board TileMap that gets
//! one block per goal, a camera with an audio listener and a parallax
//! background. Built only on the public engine API and run headless by the
//! binary.

use log::info;

use crate::components::audiolistener::AudioListener;
use crate::components::boxcollider::BoxCollider;
use crate::components::camera::Camera;
use crate::components::circlecollider::CircleCollider;
use crate::components::component::{init, Component, Lifecycle};
use crate::components::parallax::ParallaxBackground;
use crate::components::rigidbody::Rigidbody;
use crate::components::sprite::Sprite;
use crate::components::tilemap::TileMap;
use crate::error::{EngineError, EngineResult};
use crate::events::collision::COLLISION;
use crate::events::EventPayload;
use crate::math::{Angle, Vector2};
use crate::resources::gameconfig::GameConfig;
use crate::world::context::Context;
use crate::world::ids::{ComponentId, GameObjectId};
use crate::world::World;

pub const WINNING_SCORE: u32 = 5;
const PADDLE_SIZE: Vector2 = Vector2::new(8.0, 48.0);
const PADDLE_MARGIN: f64 = 24.0;
const PADDLE_SPEED: f64 = 180.0;
const BALL_RADIUS: f64 = 4.0;
const BALL_SPEED: f64 = 220.0;
const WALL_THICKNESS: f64 = 16.0;
const SCORE_TILE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Handles to the pieces of a built arena.
#[derive(Debug, Clone, Copy)]
pub struct Arena {
    pub root: GameObjectId,
    pub ball: GameObjectId,
    pub left_paddle: GameObjectId,
    pub right_paddle: GameObjectId,
    pub scoreboard: ComponentId,
    pub camera: ComponentId,
}

// ==================== SCORE BOARD ====================

/// Goal counter mirrored into the TileMap on the same game object.
#[derive(Debug, Default)]
pub struct ScoreBoard {
    pub left: u32,
    pub right: u32,
}

impl ScoreBoard {
    /// Count a goal for `side`. Requests unload once a side wins.
    fn score(&mut self, side: Side, ctx: &mut Context<'_>) -> EngineResult<()> {
        let column = match side {
            Side::Left => {
                self.left += 1;
                self.left - 1
            }
            Side::Right => {
                self.right += 1;
                self.right - 1
            }
        };
        let tilemap = ctx
            .world
            .get_component::<TileMap>(ctx.game_object)
            .ok_or_else(|| EngineError::hook("score board has no TileMap"))?;
        let map = ctx.world.component_mut::<TileMap>(tilemap)?;
        let x = match side {
            Side::Left => column,
            Side::Right => map.width.saturating_sub(column + 1),
        };
        map.set_tile(x, 0, Some(SCORE_TILE));
        info!("goal for {:?}: {} - {}", side, self.left, self.right);
        if self.left >= WINNING_SCORE || self.right >= WINNING_SCORE {
            info!("{:?} wins", side);
            ctx.world.request_unload();
        }
        Ok(())
    }
}

impl Component for ScoreBoard {}

// ==================== PADDLE ====================

/// AI paddle tracking the ball vertically.
#[derive(Debug)]
pub struct Paddle {
    pub speed: f64,
    /// Vertical travel limit, centre to centre.
    pub reach: f64,
    ball: Option<GameObjectId>,
}

impl Paddle {
    pub fn new(speed: f64, reach: f64) -> Self {
        Self {
            speed,
            reach,
            ball: None,
        }
    }
}

fn track_ball(paddle: &mut Paddle, ctx: &mut Context<'_>) -> EngineResult<()> {
    let Some(ball) = paddle.ball else {
        return Ok(());
    };
    let target = ctx.world.to_global(ball)?.position.y;
    let current = ctx.transform()?.position().y;
    let max_step = paddle.speed * ctx.delta();
    let step = (target - current).clamp(-max_step, max_step);
    if step.abs() > f64::EPSILON {
        let y = (current + step).clamp(-paddle.reach, paddle.reach);
        ctx.transform_mut()?.position_mut().y = y;
    }
    Ok(())
}

impl Component for Paddle {
    fn lifecycle() -> Lifecycle<Self> {
        Lifecycle::new().update(track_ball)
    }
}

// ==================== BALL ====================

#[derive(Debug)]
pub struct Ball {
    pub speed: f64,
    rng: fastrand::Rng,
    scoreboard: Option<ComponentId>,
}

impl Ball {
    pub fn new(speed: f64, seed: u64) -> Self {
        Self {
            speed,
            rng: fastrand::Rng::with_seed(seed),
            scoreboard: None,
        }
    }

    /// Random direction within 45° of the horizontal.
    fn serve_velocity(&mut self) -> Vector2 {
        let spread = (self.rng.f64() - 0.5) * 90.0;
        let heading = if self.rng.bool() { 0.0 } else { 180.0 };
        Vector2::from_angle(Angle::from_degrees(heading + spread), self.speed)
    }
}

fn rigidbody_of(ctx: &Context<'_>) -> EngineResult<ComponentId> {
    ctx.world
        .get_component::<Rigidbody>(ctx.game_object)
        .ok_or_else(|| EngineError::hook("ball has no Rigidbody"))
}

fn serve(ball: &mut Ball, ctx: &mut Context<'_>) -> EngineResult<()> {
    let velocity = ball.serve_velocity();
    let rb = rigidbody_of(ctx)?;
    ctx.world.component_mut::<Rigidbody>(rb)?.set_velocity(velocity);
    Ok(())
}

fn bounce(ball: &mut Ball, ctx: &mut Context<'_>, payload: &EventPayload) -> EngineResult<()> {
    let EventPayload::Collision(hit) = payload else {
        return Ok(());
    };
    let other = ctx.world.name(hit.other_object).unwrap_or_default().to_string();
    let rb = rigidbody_of(ctx)?;
    let goal = match other.as_str() {
        "goal_left" => Some(Side::Right),
        "goal_right" => Some(Side::Left),
        _ => None,
    };
    if let Some(side) = goal {
        if let Some(board) = ball.scoreboard {
            ctx.world
                .with_component::<ScoreBoard, _, _>(board, |board, board_ctx| board.score(side, board_ctx))?;
        }
        ctx.transform_mut()?.set_position(Vector2::ZERO);
        let velocity = ball.serve_velocity();
        ctx.world.component_mut::<Rigidbody>(rb)?.set_velocity(velocity);
        return Ok(());
    }
    let body = ctx.world.component_mut::<Rigidbody>(rb)?;
    let v = body.velocity;
    body.velocity = match other.as_str() {
        "wall_top" => Vector2::new(v.x, v.y.abs()),
        "wall_bottom" => Vector2::new(v.x, -v.y.abs()),
        "left_paddle" => Vector2::new(v.x.abs(), v.y),
        "right_paddle" => Vector2::new(-v.x.abs(), v.y),
        _ => v,
    };
    Ok(())
}

impl Component for Ball {
    fn lifecycle() -> Lifecycle<Self> {
        Lifecycle::new().start(serve).on(COLLISION, bounce)
    }
}

// ==================== SETUP ====================

fn static_box(world: &mut World, parent: GameObjectId, name: &str, position: Vector2, size: Vector2) -> EngineResult<GameObjectId> {
    let go = world.create_child(parent, name)?;
    world.transform_mut(go)?.set_position(position);
    world.add_component(go, BoxCollider::new(size))?;
    Ok(go)
}

/// Build the arena centred on the world origin.
pub fn setup(world: &mut World, config: &GameConfig, seed: u64) -> EngineResult<Arena> {
    let (width, height) = (config.render_width, config.render_height);
    let (half_w, half_h) = (f64::from(width) * 0.5, f64::from(height) * 0.5);
    let root = world.create_game_object("arena")?;

    let background = world.create_child(root, "background")?;
    world.add_component(background, ParallaxBackground::new("stars", Vector2::new(0.2, 0.2)))?;

    let camera_go = world.create_child(root, "camera")?;
    let camera = world.add_component(camera_go, Camera::new(Vector2::new(f64::from(width), f64::from(height))))?;
    world.add_component(camera_go, AudioListener::new(0.8))?;

    let wall_size = Vector2::new(f64::from(width), WALL_THICKNESS);
    let offset = half_h + WALL_THICKNESS * 0.5;
    static_box(world, root, "wall_top", Vector2::new(0.0, -offset), wall_size)?;
    static_box(world, root, "wall_bottom", Vector2::new(0.0, offset), wall_size)?;

    let goal_size = Vector2::new(WALL_THICKNESS, f64::from(height));
    let offset = half_w + WALL_THICKNESS * 0.5;
    static_box(world, root, "goal_left", Vector2::new(-offset, 0.0), goal_size)?;
    static_box(world, root, "goal_right", Vector2::new(offset, 0.0), goal_size)?;

    let scoreboard_go = world.create_child(root, "scoreboard")?;
    world.transform_mut(scoreboard_go)?.set_position(Vector2::new(-half_w, -half_h));
    let columns = WINNING_SCORE * 2 + 1;
    world.add_component(scoreboard_go, TileMap::new("score", 8.0, columns, 1).with_z_index(10))?;
    let scoreboard = world.add_component(scoreboard_go, ScoreBoard::default())?;

    let ball = world.create_child(root, "ball")?;
    world.add_component(ball, Rigidbody::with_physics(0.0, Some(BALL_SPEED * 2.0)))?;
    world.add_component(ball, CircleCollider::new(BALL_RADIUS))?;
    world.add_component(ball, Sprite::new("ball", BALL_RADIUS * 2.0, BALL_RADIUS * 2.0).with_z_index(1))?;
    world.add_component_with(
        ball,
        Ball::new(BALL_SPEED, seed),
        vec![init(move |b: &mut Ball, _| {
            b.scoreboard = Some(scoreboard);
            Ok(())
        })],
    )?;

    let reach = half_h - PADDLE_SIZE.y * 0.5;
    let mut paddles = [root; 2];
    for (i, (name, x)) in [("left_paddle", -half_w + PADDLE_MARGIN), ("right_paddle", half_w - PADDLE_MARGIN)]
        .into_iter()
        .enumerate()
    {
        let paddle = static_box(world, root, name, Vector2::new(x, 0.0), PADDLE_SIZE)?;
        world.add_component(paddle, Sprite::new("paddle", PADDLE_SIZE.x, PADDLE_SIZE.y))?;
        world.add_component_with(
            paddle,
            Paddle::new(PADDLE_SPEED, reach),
            vec![init(move |p: &mut Paddle, _| {
                p.ball = Some(ball);
                Ok(())
            })],
        )?;
        paddles[i] = paddle;
    }

    info!("arena {}x{} ready (seed {})", width, height, seed);
    Ok(Arena {
        root,
        ball,
        left_paddle: paddles[0],
        right_paddle: paddles[1],
        scoreboard,
        camera,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::kind::{Category, ComponentKind};

    #[test]
    fn arena_has_every_piece() {
        let mut world = World::new();
        let arena = setup(&mut world, &GameConfig::new(), 7).unwrap();
        assert_eq!(world.find("arena/ball").unwrap(), Some(arena.ball));
        assert_eq!(world.query_components(arena.ball, Category::Collider).len(), 1);
        assert!(world.get_component::<Ball>(arena.ball).is_some());
        assert_eq!(world.components_of_kind(ComponentKind::Camera), vec![arena.camera]);
        assert_eq!(world.find_all("arena/wall_top").unwrap().len(), 1);
    }

    #[test]
    fn scoring_fills_the_board_and_ends_the_match() {
        let mut world = World::new();
        let arena = setup(&mut world, &GameConfig::new(), 7).unwrap();
        for _ in 0..WINNING_SCORE {
            world
                .with_component::<ScoreBoard, _, _>(arena.scoreboard, |board, ctx| board.score(Side::Left, ctx))
                .unwrap();
        }
        let owner = world.component_owner(arena.scoreboard).unwrap();
        let map_id = world.get_component::<TileMap>(owner).unwrap();
        let map = world.component::<TileMap>(map_id).unwrap();
        assert_eq!(map.tiles().len(), WINNING_SCORE as usize);
        assert!(world.unload_requested());
    }
}
