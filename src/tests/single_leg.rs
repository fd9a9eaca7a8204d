use std::sync::Arc;

use rstest::rstest;

use crate::{
    prelude::{
        ConstantCorrection, ConvergenceCriteria, Epoch, LightTimeSolver, StateProvider, Vector3,
        Vector6, SPEED_OF_LIGHT_M_S,
    },
    tests::{init_logger, stationary, UniformMotion},
};

#[rstest]
#[case(SPEED_OF_LIGHT_M_S)]
#[case(1.0E3)]
#[case(4.5E11)]
fn stationary_euclidean_light_time(#[case] distance_m: f64) {
    init_logger();

    let tx = stationary(0.0, 0.0, 0.0);
    let rx = stationary(distance_m, 0.0, 0.0);

    let solver = LightTimeSolver::new(tx, rx, vec![], ConvergenceCriteria::default());

    let reception = Epoch::from_gpst_seconds(3600.0);
    let solution = solver.solve(reception, true).unwrap();

    let expected_s = distance_m / SPEED_OF_LIGHT_M_S;

    assert!(
        (solution.light_time_s - expected_s).abs() < 1.0E-12,
        "light time {} s, expected {} s",
        solution.light_time_s,
        expected_s,
    );

    // one pass to satisfy the tolerance, one to verify the corrections
    assert_eq!(solution.iterations, 2);

    assert_eq!(solution.correction_s, 0.0);
    assert_eq!(solution.ideal_light_time_s, solution.light_time_s);
    assert_eq!(solution.rx_epoch, reception);
}

#[test]
fn one_light_second_end_to_end() {
    init_logger();

    let tx = stationary(0.0, 0.0, 0.0);
    let rx = stationary(SPEED_OF_LIGHT_M_S, 0.0, 0.0);

    let criteria = ConvergenceCriteria::default()
        .with_tolerance_s(1.0E-12)
        .with_max_iterations(50);

    let solver = LightTimeSolver::new(tx, rx, vec![], criteria);

    let solution = solver.solve(Epoch::from_gpst_seconds(0.0), true).unwrap();

    assert!((solution.light_time_s - 1.0).abs() < 1.0E-9);
    assert_eq!(solution.iterations, 2);
}

#[test]
fn moving_transmitter_fixed_point() {
    init_logger();

    let reception = Epoch::from_gpst_seconds(86400.0);

    // LEO-ish transmitter, receiving antenna at the origin
    let tx = Arc::new(UniformMotion {
        reference: reception,
        position_m: Vector3::new(7.0E6, 0.0, 0.0),
        velocity_m_s: Vector3::new(0.0, 7.5E3, 0.0),
    });

    let rx = stationary(0.0, 0.0, 0.0);

    let solver = LightTimeSolver::new(tx.clone(), rx, vec![], ConvergenceCriteria::default());

    let solution = solver.solve(reception, true).unwrap();

    // epochs are nanosecond quantized
    let elapsed_s = (solution.rx_epoch - solution.tx_epoch).to_seconds();
    assert!((elapsed_s - solution.light_time_s).abs() < 1.0E-9);

    // self consistency of the returned states
    let expected_s = solution.range_vector_m().norm() / SPEED_OF_LIGHT_M_S;
    assert!((solution.light_time_s - expected_s).abs() < 1.0E-12);

    // transmitter state matches its provider at the solved epoch
    assert_eq!(solution.tx_state, tx.state_at(solution.tx_epoch));
}

#[test]
fn reception_transmission_symmetry() {
    init_logger();

    let reception = Epoch::from_gpst_seconds(86400.0);

    let tx = Arc::new(UniformMotion {
        reference: reception,
        position_m: Vector3::new(42.164E6, 0.0, 0.0),
        velocity_m_s: Vector3::new(0.0, 3.07E3, 0.0),
    });

    let rx = stationary(6.371E6, 0.0, 0.0);

    let solver = LightTimeSolver::new(tx, rx, vec![], ConvergenceCriteria::default());

    let at_reception = solver.solve(reception, true).unwrap();

    // anchored the other way round, at the solved transmission epoch
    let at_transmission = solver.solve(at_reception.tx_epoch, false).unwrap();

    assert!((at_reception.light_time_s - at_transmission.light_time_s).abs() < 1.0E-9);
    assert!((at_transmission.rx_epoch - reception).to_seconds().abs() < 1.0E-9);

    let position_offset_m =
        (at_reception.tx_state.fixed_rows::<3>(0) - at_transmission.tx_state.fixed_rows::<3>(0))
            .norm();
    assert!(position_offset_m < 1.0E-3);
}

#[test]
fn warm_start_reproduces_cold_start() {
    init_logger();

    let reception = Epoch::from_gpst_seconds(3600.0);

    let tx = Arc::new(UniformMotion {
        reference: reception,
        position_m: Vector3::new(2.0E7, 1.0E7, 0.0),
        velocity_m_s: Vector3::new(-1.0E3, 3.0E3, 0.5E3),
    });

    let rx = stationary(6.371E6, 0.0, 0.0);

    let solver = LightTimeSolver::new(tx, rx, vec![], ConvergenceCriteria::default());

    let cold = solver.solve(reception, true).unwrap();

    let warm = solver
        .solve_with_guess(reception, true, Some(&cold.boundary_guess()))
        .unwrap();

    assert!((warm.light_time_s - cold.light_time_s).abs() < 1.0E-12);
    assert_eq!(warm.tx_epoch, cold.tx_epoch);
}

#[test]
fn constant_correction_is_added() {
    init_logger();

    let delay_s = 130.0E-9;

    let tx = stationary(0.0, 0.0, 0.0);
    let rx = stationary(SPEED_OF_LIGHT_M_S, 0.0, 0.0);

    let solver = LightTimeSolver::new(
        tx,
        rx,
        vec![Box::new(ConstantCorrection::new(delay_s))],
        ConvergenceCriteria::default(),
    );

    let solution = solver.solve(Epoch::from_gpst_seconds(0.0), true).unwrap();

    assert!((solution.light_time_s - (1.0 + delay_s)).abs() < 1.0E-12);
    assert_eq!(solution.correction_s, delay_s);
    assert!((solution.ideal_light_time_s - 1.0).abs() < 1.0E-12);
}

#[test]
fn function_correction_adapter() {
    init_logger();

    let tx = stationary(0.0, 0.0, 0.0);
    let rx = stationary(SPEED_OF_LIGHT_M_S, 0.0, 0.0);

    // signed, geometry dependent equation
    let solver = LightTimeSolver::from_functions(
        tx,
        rx,
        vec![|tx_state: &Vector6<f64>, rx_state: &Vector6<f64>, _t_tx, _t_rx| {
            -1.0E-12 * (rx_state - tx_state).fixed_rows::<3>(0).norm() / SPEED_OF_LIGHT_M_S
        }],
        ConvergenceCriteria::default(),
    );

    let solution = solver.solve(Epoch::from_gpst_seconds(0.0), true).unwrap();

    assert!(solution.correction_s < 0.0);
    assert!((solution.light_time_s - (1.0 - 1.0E-12)).abs() < 1.0E-12);
}

#[test]
fn random_stationary_geometries() {
    use rand::{rngs::SmallRng, Rng, SeedableRng};

    init_logger();

    let mut rng = SmallRng::seed_from_u64(0xDEFACED);
    let reception = Epoch::from_gpst_seconds(0.0);

    for _ in 0..50 {
        let tx_m: [f64; 3] = [
            rng.random_range(-1.0E9..1.0E9),
            rng.random_range(-1.0E9..1.0E9),
            rng.random_range(-1.0E9..1.0E9),
        ];
        let rx_m: [f64; 3] = [
            rng.random_range(-1.0E9..1.0E9),
            rng.random_range(-1.0E9..1.0E9),
            rng.random_range(-1.0E9..1.0E9),
        ];

        let distance_m = ((rx_m[0] - tx_m[0]).powi(2)
            + (rx_m[1] - tx_m[1]).powi(2)
            + (rx_m[2] - tx_m[2]).powi(2))
        .sqrt();

        let solver = LightTimeSolver::new(
            stationary(tx_m[0], tx_m[1], tx_m[2]),
            stationary(rx_m[0], rx_m[1], rx_m[2]),
            vec![],
            ConvergenceCriteria::default(),
        );

        let solution = solver.solve(reception, true).unwrap();
        let expected_s = distance_m / SPEED_OF_LIGHT_M_S;

        assert!(
            (solution.light_time_s - expected_s).abs() < 1.0E-12,
            "light time {} s, expected {} s",
            solution.light_time_s,
            expected_s,
        );
    }
}
