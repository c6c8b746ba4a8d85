//! Point-mass trajectory integration.

use nalgebra::Vector2;
use crate::atmosphere::EnvironmentData;
use crate::drag::{get_drag_coefficient, DragTable};
use crate::inputs::{FiringData, SolverParams, SolverScheme};
use crate::integrator::{Derivative, RungeKutta4};
use crate::BallisticsError;

/// One simulation sample
///
/// Positions and velocities are 2D: x is horizontal distance downrange,
/// y is height above the ground datum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryDataPoint {
    pub velocity: Vector2<f64>,
    pub position: Vector2<f64>,
    /// Elapsed time (s)
    pub t: f64,
}

impl TrajectoryDataPoint {
    /// State at `t = 0`: at the muzzle, moving at muzzle velocity along the zero angle
    pub fn from_firing(firing: &FiringData) -> Self {
        let mut point = Self {
            velocity: Vector2::zeros(),
            position: Vector2::zeros(),
            t: 0.0,
        };
        point.initialize(firing);
        point
    }

    pub fn initialize(&mut self, firing: &FiringData) -> &mut Self {
        let (sin, cos) = firing.zero_angle_rad.sin_cos();
        self.t = 0.0;
        self.position = Vector2::new(0.0, firing.height_m);
        self.velocity = Vector2::new(
            firing.muzzle_velocity_ms * cos,
            firing.muzzle_velocity_ms * sin,
        );
        self
    }

    pub fn distance(&self) -> f64 {
        self.position.x
    }

    pub fn height(&self) -> f64 {
        self.position.y
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    pub fn kinetic_energy(&self, mass_kg: f64) -> f64 {
        0.5 * mass_kg * self.velocity.norm_squared()
    }
}

/// `0.5 * rho * A / m`, the constant part of the quadratic drag deceleration
pub fn drag_factor(firing: &FiringData, environment: &EnvironmentData) -> f64 {
    0.5 * environment.air_density * firing.bullet.cross_sectional_area() / firing.bullet.mass_kg()
}

/// `dV/dt = -k * Cd(V) * V²` along the flight path
#[derive(Debug, Clone)]
struct FlightSpeedDerivative<'a> {
    table: &'a DragTable,
    drag_factor: f64,
    temperature_k: f64,
}

impl Derivative for FlightSpeedDerivative<'_> {
    fn dydt(&self, v: f64, _t: f64) -> f64 {
        -self.drag_factor * get_drag_coefficient(self.table, v, self.temperature_k) * v * v
    }
}

/// Step-by-step trajectory integrator.
///
/// With [`SolverScheme::HybridRk4`] drag only changes the scalar flight
/// speed, which is integrated on its own. Each step that speed is decomposed
/// along the previous step's direction of travel and gravity is added to the
/// vertical component. [`SolverScheme::Euler`] instead steps both velocity
/// components directly. Either way the position follows by semi-implicit
/// Euler.
///
/// The step size is not checked against the drag and gravity time scales;
/// a step that is too coarse silently loses accuracy.
#[derive(Debug, Clone)]
pub struct TrajectorySolver<'a> {
    state: TrajectoryDataPoint,
    last_velocity: Vector2<f64>,
    flight_speed: RungeKutta4<FlightSpeedDerivative<'a>>,
    environment: EnvironmentData,
    params: SolverParams,
}

impl<'a> TrajectorySolver<'a> {
    pub fn new(
        table: &'a DragTable,
        firing: &FiringData,
        environment: &EnvironmentData,
        params: &SolverParams,
    ) -> Self {
        let state = TrajectoryDataPoint::from_firing(firing);
        let derivative = FlightSpeedDerivative {
            table,
            drag_factor: drag_factor(firing, environment),
            temperature_k: environment.temperature_k,
        };

        Self {
            state,
            last_velocity: state.velocity,
            flight_speed: RungeKutta4::new(firing.muzzle_velocity_ms, params.time_step, derivative),
            environment: *environment,
            params: *params,
        }
    }

    /// Advance one time step
    pub fn advance(&mut self) {
        match self.params.scheme {
            SolverScheme::HybridRk4 => self.advance_hybrid(),
            SolverScheme::Euler => self.advance_euler(),
        }
        self.state.t += self.params.time_step;
    }

    fn advance_hybrid(&mut self) {
        let dt = self.params.time_step;
        let speed = self.flight_speed.advance();

        let angle_of_attack = self.last_velocity.y.atan2(self.last_velocity.x);
        let (sin, cos) = angle_of_attack.sin_cos();
        self.state.velocity = Vector2::new(
            speed * cos,
            speed * sin + self.environment.gravity * dt,
        );
        self.state.position += self.state.velocity * dt;

        self.last_velocity = self.state.velocity;
    }

    /// Drag acts on the horizontal component only, from its own Mach number;
    /// gravity accumulates on the vertical one.
    fn advance_euler(&mut self) {
        let dt = self.params.time_step;
        let drag = self.flight_speed.derivative();
        let vx = self.state.velocity.x;

        self.state.velocity.x += drag.dydt(vx, self.state.t) * dt;
        self.state.velocity.y += self.environment.gravity * dt;
        self.state.position += self.state.velocity * dt;

        self.last_velocity = self.state.velocity;
    }

    /// Out of time or below the ground datum
    pub fn completed(&self) -> bool {
        self.terminated() || self.state.position.y < 0.0
    }

    /// Out of time
    pub fn terminated(&self) -> bool {
        self.state.t >= self.params.max_time
    }

    /// Start over from `firing`, exactly as a freshly built solver would
    pub fn reset(&mut self, firing: &FiringData) {
        self.state.initialize(firing);
        self.last_velocity = self.state.velocity;
        self.flight_speed.derivative_mut().drag_factor = drag_factor(firing, &self.environment);
        self.flight_speed.reset_to(firing.muzzle_velocity_ms);
    }

    pub fn state(&self) -> &TrajectoryDataPoint {
        &self.state
    }

    /// Speed along the flight path: the RK4-integrated scalar for the hybrid
    /// scheme, the velocity magnitude for Euler
    pub fn flight_speed(&self) -> f64 {
        match self.params.scheme {
            SolverScheme::HybridRk4 => self.flight_speed.value(),
            SolverScheme::Euler => self.state.speed(),
        }
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }
}

/// Solve a full trajectory.
///
/// Samples are appended once per step until the solver completes or, when
/// `params.max_x` is non-zero, the horizontal distance reaches it. The
/// first sample is one step after the muzzle; the `t = 0` state is not
/// included. A muzzle below the ground datum yields no samples.
pub fn solve_trajectory(
    table: &DragTable,
    firing: &FiringData,
    environment: &EnvironmentData,
    params: &SolverParams,
) -> Result<Vec<TrajectoryDataPoint>, BallisticsError> {
    params.validate()?;
    environment.validate()?;
    firing.validate()?;

    let mut solver = TrajectorySolver::new(table, firing, environment, params);
    let expected_steps = (params.max_time / params.time_step).ceil() as usize;
    let mut points = Vec::with_capacity(expected_steps.min(100_000));

    while !solver.completed() && (params.max_x == 0.0 || solver.state().position.x < params.max_x) {
        solver.advance();
        points.push(*solver.state());
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::G7_DRAG_TABLE;
    use crate::inputs::BulletData;
    use approx::assert_relative_eq;

    fn test_environment() -> EnvironmentData {
        EnvironmentData::new(292.0, 101325.0, -9.81)
    }

    fn test_firing() -> FiringData {
        FiringData::new(BulletData::default()).with_height(1.0)
    }

    fn drag_free_table() -> DragTable {
        DragTable::new(vec![0.0, 10.0], vec![0.0, 0.0]).unwrap()
    }

    #[test]
    fn test_initial_state_from_firing() {
        let firing = test_firing().with_zero_angle(0.1);
        let point = TrajectoryDataPoint::from_firing(&firing);

        assert_eq!(point.t, 0.0);
        assert_eq!(point.position, Vector2::new(0.0, 1.0));
        assert_relative_eq!(point.velocity.x, 871.42 * 0.1_f64.cos());
        assert_relative_eq!(point.velocity.y, 871.42 * 0.1_f64.sin());
        assert_relative_eq!(point.speed(), 871.42, epsilon = 1e-9);
    }

    #[test]
    fn test_kinetic_energy() {
        let firing = test_firing();
        let point = TrajectoryDataPoint::from_firing(&firing);
        assert_relative_eq!(
            point.kinetic_energy(firing.bullet.mass_kg()),
            firing.muzzle_energy_j(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_drag_factor() {
        let k = drag_factor(&test_firing(), &test_environment());
        // 0.5 * 1.20886 * 4.5604e-5 / 0.0100438
        assert_relative_eq!(k, 2.7444e-3, epsilon = 1e-6);
    }

    #[test]
    fn test_first_step_without_drag() {
        let table = drag_free_table();
        let firing = test_firing();
        let env = test_environment();
        let params = SolverParams::default();
        let mut solver = TrajectorySolver::new(&table, &firing, &env, &params);

        solver.advance();
        let state = solver.state();
        let dt = params.time_step;

        // Flat shot: speed unchanged, gravity adds to vy, position follows new velocity
        assert_relative_eq!(state.velocity.x, 871.42, epsilon = 1e-12);
        assert_relative_eq!(state.velocity.y, -9.81 * dt, epsilon = 1e-12);
        assert_relative_eq!(state.position.x, 871.42 * dt, epsilon = 1e-12);
        assert_relative_eq!(state.position.y, 1.0 - 9.81 * dt * dt, epsilon = 1e-12);
        assert_relative_eq!(state.t, dt);
    }

    #[test]
    fn test_second_step_uses_previous_direction() {
        let table = drag_free_table();
        let firing = test_firing();
        let env = test_environment();
        let params = SolverParams::default();
        let mut solver = TrajectorySolver::new(&table, &firing, &env, &params);

        solver.advance();
        let first = *solver.state();
        solver.advance();
        let second = solver.state();

        let angle = first.velocity.y.atan2(first.velocity.x);
        assert_relative_eq!(second.velocity.x, 871.42 * angle.cos(), epsilon = 1e-9);
        assert_relative_eq!(
            second.velocity.y,
            871.42 * angle.sin() - 9.81 * params.time_step,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_drag_slows_flight_speed() {
        let firing = test_firing();
        let env = test_environment();
        let params = SolverParams::default();
        let mut solver = TrajectorySolver::new(&G7_DRAG_TABLE, &firing, &env, &params);

        let mut last_speed = solver.flight_speed();
        for _ in 0..50 {
            solver.advance();
            let speed = solver.flight_speed();
            assert!(speed < last_speed, "speed should decrease: {speed} >= {last_speed}");
            last_speed = speed;
        }
        assert!(last_speed > 600.0 && last_speed < 750.0, "speed after 0.5 s: {last_speed}");
    }

    #[test]
    fn test_completed_on_ground_impact() {
        let firing = test_firing();
        let env = test_environment();
        let params = SolverParams::default();
        let mut solver = TrajectorySolver::new(&G7_DRAG_TABLE, &firing, &env, &params);

        while !solver.completed() {
            solver.advance();
        }
        assert!(solver.state().height() < 0.0);
        assert!(!solver.terminated());
    }

    #[test]
    fn test_terminated_on_time_limit() {
        // Straight up, far more time than the limit allows to come back down
        let firing = test_firing().with_zero_angle(std::f64::consts::FRAC_PI_2);
        let env = test_environment();
        let params = SolverParams {
            max_time: 0.5,
            ..SolverParams::default()
        };
        let mut solver = TrajectorySolver::new(&G7_DRAG_TABLE, &firing, &env, &params);

        while !solver.completed() {
            solver.advance();
        }
        assert!(solver.terminated());
        assert!(solver.state().height() > 0.0);
        let t = solver.state().t;
        assert!(t >= 0.5 && t < 0.5 + params.time_step + 1e-9, "stopped at t = {t}");
    }

    #[test]
    fn test_reset_matches_fresh_solver() {
        let firing = test_firing().with_zero_angle(0.002);
        let env = test_environment();
        let params = SolverParams::default();

        let mut reused = TrajectorySolver::new(&G7_DRAG_TABLE, &firing, &env, &params);
        for _ in 0..30 {
            reused.advance();
        }
        reused.reset(&firing);

        let mut fresh = TrajectorySolver::new(&G7_DRAG_TABLE, &firing, &env, &params);
        for _ in 0..30 {
            reused.advance();
            fresh.advance();
            assert_eq!(reused.state(), fresh.state());
        }
    }

    #[test]
    fn test_reset_picks_up_new_firing_data() {
        let env = test_environment();
        let params = SolverParams::default();
        let slow = test_firing().with_muzzle_velocity(600.0);
        let mut solver = TrajectorySolver::new(&G7_DRAG_TABLE, &test_firing(), &env, &params);
        solver.advance();
        solver.reset(&slow);

        assert_eq!(solver.flight_speed(), 600.0);
        assert_eq!(solver.state().velocity.x, 600.0);

        let mut fresh = TrajectorySolver::new(&G7_DRAG_TABLE, &slow, &env, &params);
        solver.advance();
        fresh.advance();
        assert_eq!(solver.state(), fresh.state());
    }

    #[test]
    fn test_euler_first_steps() {
        let table = DragTable::new(vec![0.0, 10.0], vec![0.25, 0.25]).unwrap();
        let firing = test_firing().with_zero_angle(0.01);
        let env = test_environment();
        let params = SolverParams {
            scheme: SolverScheme::Euler,
            ..SolverParams::default()
        };
        let mut solver = TrajectorySolver::new(&table, &firing, &env, &params);

        let dt = params.time_step;
        let k = drag_factor(&firing, &env);
        let vx0 = 871.42 * 0.01_f64.cos();
        let vy0 = 871.42 * 0.01_f64.sin();

        solver.advance();
        let vx1 = vx0 - k * 0.25 * vx0 * vx0 * dt;
        let vy1 = vy0 - 9.81 * dt;
        let first = *solver.state();
        assert_relative_eq!(first.velocity.x, vx1, epsilon = 1e-9);
        assert_relative_eq!(first.velocity.y, vy1, epsilon = 1e-12);
        assert_relative_eq!(first.position.x, vx1 * dt, epsilon = 1e-12);
        assert_relative_eq!(first.position.y, 1.0 + vy1 * dt, epsilon = 1e-12);
        assert_relative_eq!(first.t, dt);

        // Gravity keeps accumulating on vy; drag never touches it
        solver.advance();
        let vx2 = vx1 - k * 0.25 * vx1 * vx1 * dt;
        let second = solver.state();
        assert_relative_eq!(second.velocity.x, vx2, epsilon = 1e-9);
        assert_relative_eq!(second.velocity.y, vy0 - 2.0 * 9.81 * dt, epsilon = 1e-12);
        assert_relative_eq!(second.position.x, (vx1 + vx2) * dt, epsilon = 1e-9);
        assert_relative_eq!(solver.flight_speed(), second.speed());
    }

    #[test]
    fn test_euler_reset_matches_fresh_solver() {
        let firing = test_firing().with_zero_angle(0.002);
        let env = test_environment();
        let params = SolverParams {
            scheme: SolverScheme::Euler,
            ..SolverParams::default()
        };

        let mut reused = TrajectorySolver::new(&G7_DRAG_TABLE, &firing, &env, &params);
        for _ in 0..30 {
            reused.advance();
        }
        reused.reset(&firing);

        let mut fresh = TrajectorySolver::new(&G7_DRAG_TABLE, &firing, &env, &params);
        for _ in 0..30 {
            reused.advance();
            fresh.advance();
            assert_eq!(reused.state(), fresh.state());
        }
    }

    #[test]
    fn test_solve_trajectory_stops_at_max_x() {
        let params = SolverParams::default().with_max_x(300.0);
        let points = solve_trajectory(&G7_DRAG_TABLE, &test_firing(), &test_environment(), &params).unwrap();

        let last = points.last().unwrap();
        assert!(last.distance() >= 300.0);
        let before_last = points[points.len() - 2];
        assert!(before_last.distance() < 300.0);
    }

    #[test]
    fn test_solve_trajectory_below_ground_is_empty() {
        let firing = test_firing().with_height(-0.5);
        let points = solve_trajectory(&G7_DRAG_TABLE, &firing, &test_environment(), &SolverParams::default()).unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_solve_trajectory_rejects_bad_params() {
        let params = SolverParams {
            time_step: -0.01,
            ..SolverParams::default()
        };
        let result = solve_trajectory(&G7_DRAG_TABLE, &test_firing(), &test_environment(), &params);
        assert!(matches!(result, Err(BallisticsError::InvalidSolverParams(_))));

        let firing = test_firing().with_muzzle_velocity(0.0);
        let result = solve_trajectory(&G7_DRAG_TABLE, &firing, &test_environment(), &SolverParams::default());
        assert!(matches!(result, Err(BallisticsError::InvalidInput { .. })));
    }
}
