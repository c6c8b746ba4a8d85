use ballistics_zero::{
    height_at_distance, solve_trajectory, BulletData, DragModel, DragTable, EnvironmentData,
    FiringData, SolverParams, SolverScheme, TrajectorySolver, ZeroStatus, G1_DRAG_TABLE,
    G7_DRAG_TABLE,
};
use std::f64::consts::FRAC_PI_2;

const TOLERANCE: f64 = 0.04;

fn environment() -> EnvironmentData {
    EnvironmentData::new(292.0, 101325.0, -9.81)
}

fn bullet_308() -> BulletData {
    BulletData {
        mass_gr: 155.0,
        muzzle_velocity_ms: 871.42,
        g7_bc: 0.275,
        caliber_mm: 7.62,
        ..BulletData::default()
    }
}

fn zeroed_firing(table: &DragTable, zero_distance: f64, height: f64) -> FiringData {
    let mut firing = FiringData::new(bullet_308())
        .with_zero_distance(zero_distance)
        .with_height(height);
    let result = firing.zero_in(table, TOLERANCE, &environment()).unwrap();
    assert!(result.is_success(), "zero failed: {result:?}");
    firing
}

#[test]
fn test_time_is_monotonic_and_evenly_spaced() {
    let firing = zeroed_firing(&G7_DRAG_TABLE, 200.0, 1.0);
    let params = SolverParams::default().with_max_x(300.0);
    let points = solve_trajectory(&G7_DRAG_TABLE, &firing, &environment(), &params).unwrap();

    assert!((points[0].t - params.time_step).abs() < 1e-12, "first sample at {}", points[0].t);
    for pair in points.windows(2) {
        let dt = pair[1].t - pair[0].t;
        assert!(dt > 0.0);
        assert!((dt - params.time_step).abs() < 1e-9, "uneven step {dt}");
    }
}

#[test]
fn test_termination_bounds() {
    let firing = zeroed_firing(&G7_DRAG_TABLE, 200.0, 1.0);
    let params = SolverParams {
        time_step: 0.01,
        max_time: 10.0,
        max_x: 300.0,
        scheme: SolverScheme::HybridRk4,
    };
    let points = solve_trajectory(&G7_DRAG_TABLE, &firing, &environment(), &params).unwrap();

    let last = points.last().unwrap();
    assert!(
        last.distance() >= 300.0 || last.height() < 0.0 || last.t >= 10.0,
        "stopped early at {last:?}"
    );

    // Every sample before the last one was inside all three bounds
    for p in &points[..points.len() - 1] {
        assert!(p.distance() < 300.0);
        assert!(p.height() >= 0.0);
        assert!(p.t < 10.0);
    }

    // A 200 m zero from 1 m up is still well above ground at 300 m
    assert!(last.distance() >= 300.0);
    assert!(last.distance() < 300.0 + last.speed() * params.time_step);
    assert!(last.height() > 0.0 && last.height() < 1.0, "height at 300 m: {}", last.height());
}

#[test]
fn test_unbounded_solve_ends_on_ground_or_time() {
    let firing = FiringData::new(bullet_308()).with_height(1.0).with_zero_angle(0.01);
    let points =
        solve_trajectory(&G7_DRAG_TABLE, &firing, &environment(), &SolverParams::default()).unwrap();

    let last = points.last().unwrap();
    assert!(last.height() < 0.0 || last.t >= 10.0);
    assert!(points.iter().all(|p| p.t <= 10.0 + 1e-9));
}

#[test]
fn test_zero_angle_reproduces_zero_height() {
    for (model, table) in [(DragModel::G7, &G7_DRAG_TABLE), (DragModel::G1, &G1_DRAG_TABLE)] {
        let firing = zeroed_firing(table, 200.0, 10.0);
        assert!(firing.zero_angle_rad > 0.0 && firing.zero_angle_rad < FRAC_PI_2);

        // Re-run from the search baseline and stop where the search stops
        let replay = firing.clone().with_height(TOLERANCE);
        let params = SolverParams::zeroing().with_max_x(200.0 - TOLERANCE);
        let points = solve_trajectory(table, &replay, &environment(), &params).unwrap();

        let last = points.last().unwrap();
        assert!(last.height().abs() <= TOLERANCE, "{model}: height {}", last.height());
        assert!(last.distance() >= 200.0, "{model}: stopped at {}", last.distance());

        let at_200 = height_at_distance(&points, 200.0).unwrap();
        assert!(at_200.abs() <= TOLERANCE, "{model}: height at 200 m {at_200}");
    }
}

#[test]
fn test_g1_and_g7_zeros_differ() {
    let g7 = zeroed_firing(&G7_DRAG_TABLE, 200.0, 0.0);
    let g1 = zeroed_firing(&G1_DRAG_TABLE, 200.0, 0.0);
    assert_ne!(g7.zero_angle_rad, g1.zero_angle_rad);
}

#[test]
fn test_reset_reproduces_fresh_solver() {
    let firing = zeroed_firing(&G7_DRAG_TABLE, 200.0, 1.0);
    let env = environment();
    let params = SolverParams::default();

    let mut reused = TrajectorySolver::new(&G7_DRAG_TABLE, &firing, &env, &params);
    for _ in 0..75 {
        reused.advance();
    }
    reused.reset(&firing);
    let replayed: Vec<_> = (0..40)
        .map(|_| {
            reused.advance();
            *reused.state()
        })
        .collect();

    let mut fresh = TrajectorySolver::new(&G7_DRAG_TABLE, &firing, &env, &params);
    let expected: Vec<_> = (0..40)
        .map(|_| {
            fresh.advance();
            *fresh.state()
        })
        .collect();

    assert_eq!(replayed, expected);
}

#[test]
fn test_zero_in_never_changes_height() {
    let env = environment();
    for height in [0.0, 1.5, -0.3, 10.0] {
        for zero_distance in [0.0, 200.0, 20_000.0] {
            let mut firing = FiringData::new(bullet_308())
                .with_zero_distance(zero_distance)
                .with_height(height);
            let result = firing.zero_in(&G7_DRAG_TABLE, 0.5, &env).unwrap();

            assert_eq!(firing.height_m, height, "{zero_distance} m zero: {:?}", result.status);
            if zero_distance == 0.0 {
                assert_eq!(result.status, ZeroStatus::NotApplicable);
            }
        }
    }
}
