use crate::vector::Vector2;

use super::{seek, SteeringContext, SteeringOutput};

/// Push away from allies inside `separation_radius`, closer ones harder.
///
/// Each ally contributes `normalize(position - ally) / distance`; the
/// average is rescaled to `max_force`. Allies sitting exactly on the agent
/// contribute nothing.
pub fn separation<Id: Copy>(ctx: &SteeringContext<'_, Id>) -> SteeringOutput {
    let me = ctx.agent.position;
    let mut sum = Vector2::ZERO;
    let mut count = 0u32;

    for ally in ctx.perception.allies() {
        let delta = me - ally.position;
        let dist = delta.length();
        if dist > ctx.config.separation_radius || dist == 0.0 {
            continue;
        }
        sum += delta.normalize() / dist;
        count += 1;
    }

    if count == 0 {
        return SteeringOutput::ZERO;
    }
    let avg = sum / count as f64;
    if avg.is_zero() {
        return SteeringOutput::ZERO;
    }
    SteeringOutput::linear(avg.normalize() * ctx.config.max_force)
}

/// Seek the centroid of allies within `flock_radius`.
pub fn cohesion<Id: Copy>(ctx: &SteeringContext<'_, Id>) -> SteeringOutput {
    let mut center = Vector2::ZERO;
    let mut count = 0u32;
    for ally in ctx.perception.allies() {
        if ally.distance <= ctx.config.flock_radius {
            center += ally.position;
            count += 1;
        }
    }
    if count == 0 {
        return SteeringOutput::ZERO;
    }
    let center = center / count as f64;
    seek(&ctx.agent, center, ctx.config).limit(ctx.config.max_force)
}

/// Match the average heading of allies within `flock_radius`.
pub fn alignment<Id: Copy>(ctx: &SteeringContext<'_, Id>) -> SteeringOutput {
    let mut heading = Vector2::ZERO;
    let mut count = 0u32;
    for ally in ctx.perception.allies() {
        if ally.distance <= ctx.config.flock_radius {
            heading += ally.velocity;
            count += 1;
        }
    }
    if count == 0 {
        return SteeringOutput::ZERO;
    }
    let avg = heading / count as f64;
    SteeringOutput::linear((avg - ctx.agent.velocity).limit(ctx.config.max_force))
}
