use crate::math::Real;
use crate::motion::Sweep;
use crate::query::gjk::{
    distance_with_workspace, DistanceInput, DistanceProxy, DistanceWorkspace, SimplexCache,
};
use crate::query::time_of_impact::SeparationFunction;
use crate::settings::Settings;

/// Maximum number of iterations of the one-dimensional root finder.
const MAX_ROOT_ITERATIONS: usize = 50;

/// Input of the time of impact computation.
#[derive(Copy, Clone, Debug)]
pub struct ToiInput<'a> {
    /// The first proxy.
    pub proxy_a: DistanceProxy<'a>,
    /// The second proxy.
    pub proxy_b: DistanceProxy<'a>,
    /// The motion of the first proxy.
    pub sweep_a: Sweep,
    /// The motion of the second proxy.
    pub sweep_b: Sweep,
    /// The sweep interval is `[0, t_max]`.
    pub t_max: Real,
}

/// The state in which the time of impact computation terminated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum ToiState {
    /// The computation did not complete.
    Unknown,
    /// The iteration caps were reached before convergence. `t` is the best
    /// conservative estimate.
    Failed,
    /// The proxies overlap at the beginning of the sweep.
    Overlapped,
    /// The proxies touch (within the target separation) at time `t`.
    Touching,
    /// The proxies never come closer than the target separation on `[0, t_max]`.
    Separated,
}

/// Output of the time of impact computation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ToiOutput {
    /// How the computation terminated.
    pub state: ToiState,
    /// The time of impact, in `[0, t_max]`.
    pub t: Real,
    /// Number of conservative advancement steps.
    pub iterations: usize,
    /// Total number of root finder iterations.
    pub root_iterations: usize,
    /// Largest number of root finder iterations of a single root search.
    pub max_root_iterations: usize,
}

/// Computes the upper bound on the time before two moving proxies penetrate.
///
/// Time is the fraction of the sweep interval `[0, t_max]`. Uses conservative
/// advancement along separating axes. The proxies are considered touching once
/// their core shapes are `total_radius - 3 * linear_slop` apart, so they are kept
/// from overlapping by a fraction of the skin.
pub fn time_of_impact(input: &ToiInput, settings: &Settings) -> ToiOutput {
    time_of_impact_with_workspace(input, &mut DistanceWorkspace::new(), settings)
}

/// Computes the time of impact of two moving proxies, using the given distance workspace.
pub fn time_of_impact_with_workspace(
    input: &ToiInput,
    workspace: &mut DistanceWorkspace,
    settings: &Settings,
) -> ToiOutput {
    let mut output = ToiOutput {
        state: ToiState::Unknown,
        t: input.t_max,
        iterations: 0,
        root_iterations: 0,
        max_root_iterations: 0,
    };

    let proxy_a = input.proxy_a;
    let proxy_b = input.proxy_b;

    let mut sweep_a = input.sweep_a;
    let mut sweep_b = input.sweep_b;

    sweep_a.normalize();
    sweep_b.normalize();

    let t_max = input.t_max;

    let total_radius = proxy_a.radius + proxy_b.radius;
    let target = settings
        .linear_slop
        .max(total_radius - 3.0 * settings.linear_slop);
    let tolerance = 0.25 * settings.linear_slop;
    assert!(target > tolerance);

    let mut t1 = 0.0;
    let mut cache = SimplexCache::default();

    let mut distance_input = DistanceInput {
        proxy_a,
        proxy_b,
        transform_a: sweep_a.transform_at(t1),
        transform_b: sweep_b.transform_at(t1),
        use_radii: false,
    };

    loop {
        distance_input.transform_a = sweep_a.transform_at(t1);
        distance_input.transform_b = sweep_b.transform_at(t1);

        let distance_output =
            distance_with_workspace(&distance_input, &mut cache, workspace, settings);

        // Overlapping cores: continuous collision cannot help.
        if distance_output.distance <= 0.0 {
            output.state = ToiState::Overlapped;
            output.t = 0.0;
            break;
        }

        if distance_output.distance < target + tolerance {
            output.state = ToiState::Touching;
            output.t = t1;
            break;
        }

        let (mut fcn, _) =
            SeparationFunction::new(&cache, proxy_a, &sweep_a, proxy_b, &sweep_b, t1);

        // Push back the deepest point, at most once per polygon vertex.
        let mut done = false;
        let mut t2 = t_max;
        let mut push_back_iter = 0;

        loop {
            let mut s2 = fcn.find_min_separation(t2);

            if s2 > target + tolerance {
                output.state = ToiState::Separated;
                output.t = t_max;
                done = true;
                break;
            }

            if s2 > target - tolerance {
                t1 = t2;
                break;
            }

            let mut s1 = fcn.evaluate(t1);

            // The root finder ran out of iterations on a previous push back.
            if s1 < target - tolerance {
                output.state = ToiState::Failed;
                output.t = t1;
                done = true;
                break;
            }

            if s1 <= target + tolerance {
                output.state = ToiState::Touching;
                output.t = t1;
                done = true;
                break;
            }

            // Solve s(t) = target on [t1, t2].
            let mut root_iter_count = 0;
            let mut a1 = t1;
            let mut a2 = t2;

            loop {
                // Alternate bisection (even) and secant (odd) steps.
                let t = if root_iter_count & 1 == 1 {
                    a1 + (target - s1) * (a2 - a1) / (s2 - s1)
                } else {
                    0.5 * (a1 + a2)
                };

                root_iter_count += 1;

                let s = fcn.evaluate(t);

                if (s - target).abs() < tolerance {
                    t2 = t;
                    break;
                }

                if s > target {
                    a1 = t;
                    s1 = s;
                } else {
                    a2 = t;
                    s2 = s;
                }

                if root_iter_count == MAX_ROOT_ITERATIONS {
                    break;
                }
            }

            output.root_iterations += root_iter_count;
            output.max_root_iterations = output.max_root_iterations.max(root_iter_count);

            push_back_iter += 1;

            if push_back_iter == settings.max_polygon_vertices {
                break;
            }
        }

        output.iterations += 1;

        if done {
            break;
        }

        if output.iterations == settings.max_toi_iterations {
            output.state = ToiState::Failed;
            output.t = t1;
            break;
        }
    }

    if output.state == ToiState::Failed {
        log::debug!(
            "time of impact did not converge: t = {}, {} iterations, {} root iterations",
            output.t,
            output.iterations,
            output.root_iterations
        );
    }

    output
}
