//! Match simulation: two players, a ball, and the goal rules

use serde_json::json;

use crate::ws::protocol::{ActionKind, FeedbackTarget, PlayerSlot};

use super::physics::{self, *};
use super::InputState;

/// Authoritative physics state for one player.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Which way the sprite faces; follows the last nonzero direction.
    pub facing: f32,
    pub grounded: bool,
    /// Ticks remaining on the kick animation offset.
    pub kick_anim: u32,
}

impl PlayerState {
    fn kickoff(slot: PlayerSlot) -> Self {
        let dir = slot.goal_direction();
        Self {
            x: FIELD_WIDTH / 2.0 - dir * KICKOFF_OFFSET,
            y: GROUND_Y,
            vx: 0.0,
            vy: 0.0,
            facing: dir,
            grounded: true,
            kick_anim: 0,
        }
    }
}

/// Ball physics state. `rotation` is visual spin with no physics effect.
#[derive(Debug, Clone)]
pub struct BallState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub radius: f32,
    pub rotation: f32,
}

impl BallState {
    pub(crate) fn kickoff() -> Self {
        Self {
            x: FIELD_WIDTH / 2.0,
            y: KICKOFF_BALL_Y,
            vx: 0.0,
            vy: 0.0,
            radius: BALL_RADIUS,
            rotation: 0.0,
        }
    }
}

/// Something a tick or action produced that the controllers must hear about.
#[derive(Debug, Clone)]
pub enum SimEvent {
    /// Client-side cue (haptics/audio) addressed per the relay's rules.
    Feedback {
        target: FeedbackTarget,
        kind: &'static str,
        data: serde_json::Value,
    },
    /// A goal ended the round.
    GameOver { winner: PlayerSlot },
}

/// Host-authoritative match simulation.
///
/// Movement input arrives latched in [`InputState`]; one-shot actions are
/// applied immediately through [`Simulation::apply_action`]. Physics only
/// integrates while `active` is set, which drops on a goal and returns after
/// the kickoff delay.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub players: [PlayerState; 2],
    pub ball: BallState,
    pub inputs: [InputState; 2],
    pub scores: [u32; 2],
    pub active: bool,
    /// Ticks until kickoff after a goal; zero when no reset is pending.
    pub reset_timer: u32,
}

impl Simulation {
    pub fn new() -> Self {
        Self {
            players: [
                PlayerState::kickoff(PlayerSlot::One),
                PlayerState::kickoff(PlayerSlot::Two),
            ],
            ball: BallState::kickoff(),
            inputs: [InputState::default(), InputState::default()],
            scores: [0, 0],
            active: false,
            reset_timer: 0,
        }
    }

    /// Place everyone at kickoff and start integrating.
    pub fn start(&mut self) {
        self.reset_positions();
        self.active = true;
    }

    /// Latch a movement direction. `active == false` clears the latch
    /// (move-stop); a nonzero direction also turns the player around.
    pub fn set_direction(&mut self, slot: PlayerSlot, direction: f32, active: bool) {
        let dir = if active {
            direction.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        self.inputs[slot.index()].dir = dir;
        if dir != 0.0 {
            self.players[slot.index()].facing = dir;
        }
    }

    /// Apply a one-shot action immediately. Ignored while the match is
    /// frozen between goals.
    pub fn apply_action(&mut self, slot: PlayerSlot, kind: ActionKind) -> Vec<SimEvent> {
        let mut events = Vec::new();
        if !self.active {
            return events;
        }

        match kind {
            ActionKind::Jump => {
                let player = &mut self.players[slot.index()];
                if player.grounded {
                    player.vy = JUMP_IMPULSE;
                    player.grounded = false;
                }
            }
            ActionKind::Kick => self.try_kick(slot, &mut events),
            ActionKind::AirHit => self.try_air_hit(slot, &mut events),
        }

        events
    }

    /// Advance the simulation one fixed step.
    pub fn tick(&mut self) -> Vec<SimEvent> {
        let mut events = Vec::new();

        for player in &mut self.players {
            player.kick_anim = player.kick_anim.saturating_sub(1);
        }

        if !self.active {
            if self.reset_timer > 0 {
                self.reset_timer -= 1;
                if self.reset_timer == 0 {
                    self.reset_positions();
                    self.active = true;
                }
            }
            return events;
        }

        self.step_players();
        self.step_ball();

        if self.resolve_goals(&mut events) {
            // Simulation froze on a goal; skip contact resolution this tick.
            return events;
        }

        // Each player presents two volumes, resolved independently: head at a
        // full radius above the feet, body slightly lower and smaller. A ball
        // overlapping both in one tick takes the impulse twice.
        for idx in 0..2 {
            let (px, py, pvx) = {
                let p = &self.players[idx];
                (p.x, p.y, p.vx)
            };
            physics::resolve_circle_collision(
                &mut self.ball,
                px,
                py - PLAYER_RADIUS,
                PLAYER_RADIUS,
                pvx,
            );
            physics::resolve_circle_collision(&mut self.ball, px, py - BODY_LIFT, BODY_RADIUS, pvx);
        }

        events
    }

    fn step_players(&mut self) {
        for idx in 0..2 {
            let dir = self.inputs[idx].dir;
            let player = &mut self.players[idx];

            if dir != 0.0 {
                player.vx += dir * MOVE_ACCEL;
                player.vx = player.vx.clamp(-MOVE_SPEED_MAX, MOVE_SPEED_MAX);
                player.facing = dir;
            } else {
                player.vx *= IDLE_DRAG;
            }

            player.x += player.vx;
            player.vy += GRAVITY;
            player.y += player.vy;

            if player.y > GROUND_Y {
                player.y = GROUND_Y;
                player.vy = 0.0;
                player.grounded = true;
            }

            player.x = player.x.clamp(FIELD_MARGIN, FIELD_WIDTH - FIELD_MARGIN);
        }
    }

    fn step_ball(&mut self) {
        let ball = &mut self.ball;

        ball.vy += GRAVITY * BALL_GRAVITY_SCALE;
        ball.x += ball.vx;
        ball.y += ball.vy;
        ball.rotation += ball.vx * BALL_SPIN_RATE;

        // Ground: bounce with restitution and rolling friction, snapping
        // tiny rebounds to rest.
        if ball.y > GROUND_Y - ball.radius {
            ball.y = GROUND_Y - ball.radius;
            ball.vx *= BALL_FRICTION;
            ball.vy *= -BALL_BOUNCE;
            if ball.vy.abs() < BALL_REST_THRESHOLD {
                ball.vy = 0.0;
            }
        }

        // Ceiling: perfect reflection.
        if ball.y < ball.radius {
            ball.y = ball.radius;
            ball.vy *= -1.0;
        }
    }

    /// Goal mouths, crossbars, and post tips. Returns true when a goal was
    /// scored and the tick must end early.
    fn resolve_goals(&mut self, events: &mut Vec<SimEvent>) -> bool {
        let goal_top = GROUND_Y - GOAL_HEIGHT;

        // Left goal mouth: in past the post and below the crossbar.
        if self.ball.x < GOAL_WIDTH && self.ball.y > goal_top + self.ball.radius {
            self.score(PlayerSlot::Two, events);
            return true;
        }

        // Left crossbar.
        if self.ball.x < GOAL_WIDTH + self.ball.radius
            && (self.ball.y - goal_top).abs() < self.ball.radius
        {
            self.ball.vy *= -BAR_BOUNCE;
            self.ball.y = if self.ball.y < goal_top {
                goal_top - self.ball.radius
            } else {
                goal_top + self.ball.radius
            };
        }

        // Left post tip.
        if (self.ball.x - GOAL_WIDTH).abs() < self.ball.radius && self.ball.y < goal_top {
            self.ball.vx *= -BAR_BOUNCE;
            self.ball.x = GOAL_WIDTH + self.ball.radius;
        }

        let right_post = FIELD_WIDTH - GOAL_WIDTH;

        // Right goal mouth.
        if self.ball.x > right_post && self.ball.y > goal_top + self.ball.radius {
            self.score(PlayerSlot::One, events);
            return true;
        }

        // Right crossbar.
        if self.ball.x > right_post - self.ball.radius
            && (self.ball.y - goal_top).abs() < self.ball.radius
        {
            self.ball.vy *= -BAR_BOUNCE;
            self.ball.y = if self.ball.y < goal_top {
                goal_top - self.ball.radius
            } else {
                goal_top + self.ball.radius
            };
        }

        // Right post tip.
        if (self.ball.x - right_post).abs() < self.ball.radius && self.ball.y < goal_top {
            self.ball.vx *= -BAR_BOUNCE;
            self.ball.x = right_post - self.ball.radius;
        }

        false
    }

    fn score(&mut self, winner: PlayerSlot, events: &mut Vec<SimEvent>) {
        self.active = false;
        self.scores[winner.index()] += 1;
        self.reset_timer = RESET_DELAY_TICKS;

        events.push(SimEvent::Feedback {
            target: FeedbackTarget::All,
            kind: "goal",
            data: json!({ "winner": winner.number() }),
        });
        events.push(SimEvent::GameOver { winner });
    }

    fn try_kick(&mut self, slot: PlayerSlot, events: &mut Vec<SimEvent>) {
        if !self.in_strike_range(slot) {
            return;
        }
        let player = &self.players[slot.index()];
        if !(player.grounded || player.y > GROUND_Y - KICK_GROUND_SLACK) {
            return;
        }
        self.land_strike(slot, KICK_POWER * slot.goal_direction(), 0.0, events);
    }

    fn try_air_hit(&mut self, slot: PlayerSlot, events: &mut Vec<SimEvent>) {
        if !self.in_strike_range(slot) {
            return;
        }
        self.land_strike(
            slot,
            AIR_HIT_POWER_X * slot.goal_direction(),
            AIR_HIT_POWER_Y,
            events,
        );
    }

    fn in_strike_range(&self, slot: PlayerSlot) -> bool {
        let player = &self.players[slot.index()];
        let dx = self.ball.x - player.x;
        let dy = self.ball.y - (player.y - STRIKE_ORIGIN_LIFT);
        (dx * dx + dy * dy).sqrt() < STRIKE_RANGE
    }

    /// A landed strike replaces the ball's velocity outright.
    fn land_strike(&mut self, slot: PlayerSlot, vx: f32, vy: f32, events: &mut Vec<SimEvent>) {
        self.ball.vx = vx;
        self.ball.vy = vy;
        self.players[slot.index()].kick_anim = KICK_ANIM_TICKS;

        events.push(SimEvent::Feedback {
            target: FeedbackTarget::All,
            kind: "ball-hit",
            data: json!({ "speed": 10 }),
        });
    }

    fn reset_positions(&mut self) {
        self.ball.x = FIELD_WIDTH / 2.0;
        self.ball.y = KICKOFF_BALL_Y;
        self.ball.vx = 0.0;
        self.ball.vy = 0.0;

        for slot in [PlayerSlot::One, PlayerSlot::Two] {
            let player = &mut self.players[slot.index()];
            player.x = FIELD_WIDTH / 2.0 - slot.goal_direction() * KICKOFF_OFFSET;
            player.y = GROUND_Y;
            player.vx = 0.0;
            player.vy = 0.0;
            player.grounded = true;
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
