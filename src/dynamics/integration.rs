use crate::dynamics::{BodyPosition, BodyVelocity};
use crate::settings::{Settings, TimeStep};

/// Integrates positions over one step, clamping the per-step translation and rotation.
///
/// Velocities exceeding `max_translation` or `max_rotation` per step are scaled down in
/// place, so the stored velocity matches the motion actually performed.
pub fn integrate_positions(
    step: &TimeStep,
    settings: &Settings,
    positions: &mut [BodyPosition],
    velocities: &mut [BodyVelocity],
) {
    let h = step.dt;

    for (pos, vel) in positions.iter_mut().zip(velocities.iter_mut()) {
        // Check for large velocities.
        let translation = vel.v * h;
        if translation.norm_squared() > settings.max_translation_squared() {
            let ratio = settings.max_translation / translation.norm();
            vel.v *= ratio;
        }

        let rotation = h * vel.w;
        if rotation * rotation > settings.max_rotation_squared() {
            let ratio = settings.max_rotation / rotation.abs();
            vel.w *= ratio;
        }

        pos.c += vel.v * h;
        pos.a += h * vel.w;
    }
}
