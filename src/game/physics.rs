//! Field geometry and physics constants
//!
//! All motion constants are per-tick units: one tick corresponds to one
//! display frame of the original 60 Hz presentation.

use crate::util::time::TICK_RATE;

use super::sim::BallState;

// Field geometry
pub const FIELD_WIDTH: f32 = 1800.0;
pub const FIELD_HEIGHT: f32 = 600.0;
/// Vertical coordinate of the ground line; players stand at this `y`.
pub const GROUND_Y: f32 = 500.0;
/// Horizontal clamp keeping players inside the field.
pub const FIELD_MARGIN: f32 = 50.0;
pub const PLAYER_RADIUS: f32 = 40.0;
pub const BALL_RADIUS: f32 = 25.0;
pub const GOAL_WIDTH: f32 = 100.0;
pub const GOAL_HEIGHT: f32 = 180.0;

// Player movement
pub const GRAVITY: f32 = 0.7;
pub const MOVE_ACCEL: f32 = 1.5;
pub const MOVE_SPEED_MAX: f32 = 9.0;
/// Horizontal velocity decay per tick while no direction is held.
pub const IDLE_DRAG: f32 = 0.8;
pub const JUMP_IMPULSE: f32 = -16.0;

// Ball flight
/// The ball falls lighter than the players.
pub const BALL_GRAVITY_SCALE: f32 = 0.8;
pub const BALL_BOUNCE: f32 = 0.6;
pub const BALL_FRICTION: f32 = 0.98;
/// Vertical speeds below this snap to zero on the ground to stop jitter.
pub const BALL_REST_THRESHOLD: f32 = 1.0;
/// Visual spin per unit of horizontal velocity.
pub const BALL_SPIN_RATE: f32 = 0.1;
/// Restitution for crossbar and post-tip bounces.
pub const BAR_BOUNCE: f32 = 0.8;

// Striking
/// Reach of kick and air-hit, measured from the strike origin.
pub const STRIKE_RANGE: f32 = 130.0;
/// The strike origin sits this far above the player's feet.
pub const STRIKE_ORIGIN_LIFT: f32 = 30.0;
/// A grounded kick is also allowed this close above the ground line.
pub const KICK_GROUND_SLACK: f32 = 10.0;
pub const KICK_POWER: f32 = 13.0;
pub const AIR_HIT_POWER_X: f32 = 14.0;
pub const AIR_HIT_POWER_Y: f32 = -13.0;

// Player-ball contact
/// Body collision volume, offset above the feet; the head volume reuses
/// [`PLAYER_RADIUS`] at a full-radius offset.
pub const BODY_RADIUS: f32 = 30.0;
pub const BODY_LIFT: f32 = 25.0;
/// Fraction of the player's horizontal velocity transferred to the ball.
pub const CONTACT_VEL_TRANSFER: f32 = 0.5;
/// Fixed radial impulse along the collision normal.
pub const CONTACT_IMPULSE: f32 = 5.0;
pub const CONTACT_DAMP: f32 = 0.9;

// Match flow
pub const KICKOFF_OFFSET: f32 = 200.0;
pub const KICKOFF_BALL_Y: f32 = 200.0;
/// Pause between a goal and the next kickoff.
pub const RESET_DELAY_TICKS: u32 = 2 * TICK_RATE;
/// Duration of the kick animation offset (150 ms).
pub const KICK_ANIM_TICKS: u32 = TICK_RATE * 150 / 1000;

/// Push the ball out of a circular collision volume and impart velocity.
///
/// The ball is moved along the center-to-center normal by the penetration
/// depth, gains half the pusher's horizontal velocity plus a fixed radial
/// impulse, then has both components damped. Callers resolve each volume
/// independently; a ball overlapping two volumes in one tick is pushed and
/// impulsed twice.
pub fn resolve_circle_collision(
    ball: &mut BallState,
    center_x: f32,
    center_y: f32,
    radius: f32,
    pusher_vx: f32,
) {
    let dx = ball.x - center_x;
    let dy = ball.y - center_y;
    let dist_sq = dx * dx + dy * dy;
    let min_dist = radius + ball.radius;

    if dist_sq >= min_dist * min_dist {
        return;
    }

    let dist = dist_sq.sqrt();
    let angle = dy.atan2(dx);
    let overlap = min_dist - dist;

    ball.x += angle.cos() * overlap;
    ball.y += angle.sin() * overlap;

    ball.vx += pusher_vx * CONTACT_VEL_TRANSFER;
    ball.vx += angle.cos() * CONTACT_IMPULSE;
    ball.vy += angle.sin() * CONTACT_IMPULSE;

    ball.vx *= CONTACT_DAMP;
    ball.vy *= CONTACT_DAMP;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_overlapping_ball_is_untouched() {
        let mut ball = BallState::kickoff();
        ball.x = 200.0;
        ball.y = 100.0;

        resolve_circle_collision(&mut ball, 0.0, 0.0, PLAYER_RADIUS, 5.0);

        assert_eq!(ball.x, 200.0);
        assert_eq!(ball.y, 100.0);
        assert_eq!(ball.vx, 0.0);
        assert_eq!(ball.vy, 0.0);
    }

    #[test]
    fn overlap_pushes_ball_out_along_the_normal() {
        let mut ball = BallState::kickoff();
        // Directly right of the volume center, penetrating 15 units deep.
        ball.x = 50.0;
        ball.y = 0.0;

        resolve_circle_collision(&mut ball, 0.0, 0.0, PLAYER_RADIUS, 0.0);

        // Pushed out to exactly touching distance.
        assert!((ball.x - (PLAYER_RADIUS + BALL_RADIUS)).abs() < 1e-3);
        assert_eq!(ball.y, 0.0);
        // Radial impulse along +x, then damped.
        assert!((ball.vx - CONTACT_IMPULSE * CONTACT_DAMP).abs() < 1e-3);
        assert!(ball.vy.abs() < 1e-3);
    }

    #[test]
    fn pusher_velocity_transfers_to_the_ball() {
        let mut ball = BallState::kickoff();
        ball.x = 50.0;
        ball.y = 0.0;

        resolve_circle_collision(&mut ball, 0.0, 0.0, PLAYER_RADIUS, 8.0);

        let expected = (8.0 * CONTACT_VEL_TRANSFER + CONTACT_IMPULSE) * CONTACT_DAMP;
        assert!((ball.vx - expected).abs() < 1e-3);
    }
}
