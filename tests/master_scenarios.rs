use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use u_colgen::convex::SolveStatus;
use u_colgen::fairness::{variance_penalty_gradient, variance_penalty_value};
use u_colgen::models::{Agent, Column, FairnessScope, MasterConfig};
use u_colgen::validation::ValidationErrorKind;
use u_colgen::{AllocationKpi, MasterError, MasterProblem};

const TOL: f64 = 1e-5;

fn single_column_agent(id: &str, claims: f64, reward: f64) -> Agent {
    Agent::new(id, 1).with_column(Column::new(vec![claims], vec![reward]))
}

#[test]
fn two_agents_share_enough_capacity() {
    let agents = vec![
        single_column_agent("A1", 1.0, 1.0),
        single_column_agent("A2", 1.0, 1.0),
    ];
    let config = MasterConfig::new()
        .with_capacity(2.0)
        .with_langrangian_weight(0.0);
    let mut master = MasterProblem::new(agents, config).unwrap();

    let solution = master.solve().unwrap();
    assert!(solution.has_solution());
    assert!((solution.objective_value.unwrap() - 2.0).abs() < TOL);
    assert_eq!(solution.distributions, vec![vec![1.0], vec![1.0]]);
    assert_eq!(solution.fairness_impact, 0.0);
    assert!(solution.max_constraint_violation.unwrap() < TOL);
}

#[test]
fn over_committed_capacity_is_reported_not_raised() {
    let agents = vec![
        single_column_agent("A1", 1.0, 1.0),
        single_column_agent("A2", 1.0, 1.0),
    ];
    let config = MasterConfig::new()
        .with_capacity(1.0)
        .with_langrangian_weight(0.0);
    let mut master = MasterProblem::new(agents, config).unwrap();

    let solution = master.solve().unwrap();
    assert_eq!(solution.status, SolveStatus::Infeasible);
    assert_eq!(solution.objective_value, None);
    assert_eq!(solution.max_constraint_violation, None);
    // no solved weights: uniform fallback over a single column
    assert_eq!(solution.distributions, vec![vec![1.0], vec![1.0]]);
    assert_eq!(master.get_dual_prices(), vec![0.0]);
}

#[test]
fn forced_unequal_claims_pay_the_variance_penalty() {
    let agents = vec![
        single_column_agent("A1", 1.0, 1.0),
        single_column_agent("A2", 0.0, 1.0),
    ];
    let config = MasterConfig::new()
        .with_capacity(1.0)
        .with_langrangian_weight(5.0);
    let mut master = MasterProblem::new(agents, config).unwrap();

    let solution = master.solve().unwrap();
    let penalty = variance_penalty_value(&[1.0, 0.0]);
    assert!(solution.has_solution());
    assert!((solution.objective_value.unwrap() - (2.0 - 5.0 * penalty)).abs() < TOL);
    assert!((solution.fairness_impact - 5.0 * penalty).abs() < TOL);
    assert!((master.compute_realized_fairness_penalty().unwrap() - penalty).abs() < TOL);
}

#[test]
fn agent_without_columns_is_rejected() {
    let agents = vec![single_column_agent("A1", 1.0, 1.0), Agent::new("A2", 1)];
    let mut master = MasterProblem::new(agents, MasterConfig::default()).unwrap();

    match master.solve() {
        Err(MasterError::InvalidInput(errors)) => {
            assert!(errors
                .iter()
                .any(|e| e.kind == ValidationErrorKind::EmptyColumnSet));
        }
        other => panic!("expected InvalidInput, got {other:?}"),
    }
    assert_eq!(master.status(), None);
}

#[test]
fn penalty_trades_reward_for_equal_claims() {
    // A1 may claim 1 unit for reward 1; A2 can only idle.
    // maximize p - w * p²/4  →  p = 2/w
    let agents = vec![
        Agent::new("A1", 1)
            .with_column(Column::new(vec![1.0], vec![1.0]))
            .with_column(Column::idle(1)),
        Agent::new("A2", 1).with_column(Column::idle(1)),
    ];

    for scope in [FairnessScope::Timestep, FairnessScope::Cumulative] {
        let config = MasterConfig::new()
            .with_capacity(2.0)
            .with_langrangian_weight(4.0)
            .with_fairness_scope(scope.clone());
        let mut master = MasterProblem::new(agents.clone(), config).unwrap();
        let solution = master.solve().unwrap();

        assert!(solution.has_solution(), "{scope}");
        assert!((solution.distributions[0][0] - 0.5).abs() < TOL, "{scope}");
        assert!((solution.objective_value.unwrap() - 0.25).abs() < TOL, "{scope}");
        assert!((solution.fairness_impact - 0.25).abs() < TOL, "{scope}");

        let gradients = master.compute_fairness_gradients().unwrap();
        assert!((gradients[0][0] - 0.25).abs() < TOL, "{scope}");
        assert!((gradients[1][0] + 0.25).abs() < TOL, "{scope}");
    }

    let config = MasterConfig::new()
        .with_capacity(2.0)
        .with_langrangian_weight(0.0);
    let mut master = MasterProblem::new(agents, config).unwrap();
    let solution = master.solve().unwrap();
    assert!((solution.distributions[0][0] - 1.0).abs() < TOL);
    assert!((solution.objective_value.unwrap() - 1.0).abs() < TOL);
}

#[test]
fn binding_capacity_has_positive_shadow_price() {
    let agents = vec![
        Agent::new("A1", 1)
            .with_column(Column::new(vec![1.0], vec![3.0]))
            .with_column(Column::idle(1)),
        Agent::new("A2", 1)
            .with_column(Column::new(vec![1.0], vec![2.0]))
            .with_column(Column::idle(1)),
    ];

    // A1 fills 1 unit, A2 takes the remaining half: the marginal unit is worth 2.
    let config = MasterConfig::new()
        .with_capacity(1.5)
        .with_langrangian_weight(0.0);
    let mut master = MasterProblem::new(agents.clone(), config).unwrap();
    master.solve().unwrap();
    let duals = master.get_dual_prices();
    assert_eq!(duals.len(), 1);
    assert!((duals[0] - 2.0).abs() < 1e-4, "dual = {}", duals[0]);

    let config = MasterConfig::new()
        .with_capacity(3.0)
        .with_langrangian_weight(0.0);
    let mut master = MasterProblem::new(agents, config).unwrap();
    master.solve().unwrap();
    assert!(master.get_dual_prices()[0].abs() < 1e-4);
}

fn three_period_agents() -> Vec<Agent> {
    vec![
        Agent::new("A1", 3)
            .with_fixed_costs(vec![0.1, 0.2, 0.1])
            .with_column(Column::new(vec![1.0, 0.0, 1.0], vec![2.0, 0.0, 2.0]))
            .with_column(Column::new(vec![0.0, 1.0, 0.5], vec![0.0, 1.5, 1.0]))
            .with_column(Column::idle(3)),
        Agent::new("A2", 3)
            .with_column(Column::new(vec![0.5, 0.5, 0.5], vec![1.0, 1.0, 1.0]))
            .with_column(Column::idle(3)),
        Agent::new("A3", 3)
            .with_fixed_costs(vec![0.0, 0.0, 0.5])
            .with_column(Column::new(vec![0.0, 2.0, 0.0], vec![0.0, 3.0, 0.0]))
            .with_column(Column::new(vec![1.0, 1.0, 1.0], vec![1.0, 1.0, 1.0])),
    ]
}

#[test]
fn timestep_gradient_matches_per_period_gradient() {
    let config = MasterConfig::new()
        .with_capacity(2.0)
        .with_langrangian_weight(0.5);
    let mut master = MasterProblem::new(three_period_agents(), config).unwrap();
    let solution = master.solve().unwrap();
    assert!(solution.has_solution());

    let kpi = AllocationKpi::calculate(&master).unwrap();
    let gradients = master.compute_fairness_gradients().unwrap();
    assert_eq!(gradients.len(), 3);

    for t in 0..3 {
        let claims_t: Vec<f64> = kpi.expected_claims.iter().map(|c| c[t]).collect();
        let direct = variance_penalty_gradient(&claims_t);
        for a in 0..3 {
            assert!((gradients[a][t] - direct[a]).abs() < 1e-9);
        }
    }
    assert_eq!(solution.fairness_gradients, gradients);
}

#[test]
fn cumulative_gradient_is_constant_across_periods() {
    let config = MasterConfig::new()
        .with_capacity(2.0)
        .with_langrangian_weight(0.5)
        .with_fairness_scope("cumulative");
    let mut master = MasterProblem::new(three_period_agents(), config).unwrap();
    master.solve().unwrap();

    let gradients = master.compute_fairness_gradients().unwrap();
    for agent_grad in &gradients {
        assert_eq!(agent_grad.len(), 3);
        assert!(agent_grad.iter().all(|&g| g == agent_grad[0]));
    }

    let kpi = AllocationKpi::calculate(&master).unwrap();
    let totals: Vec<f64> = kpi
        .expected_claims
        .iter()
        .map(|c| c.iter().sum())
        .collect();
    let direct = variance_penalty_gradient(&totals);
    for a in 0..3 {
        assert!((gradients[a][0] - direct[a]).abs() < 1e-9);
    }
    assert!((kpi.realized_fairness_penalty - variance_penalty_value(&totals)).abs() < 1e-9);
}

#[test]
fn unknown_scope_is_rejected_everywhere() {
    let config = MasterConfig::new().with_capacity(2.0);
    let mut master = MasterProblem::new(three_period_agents(), config).unwrap();
    master.solve().unwrap();

    master.config_mut().fairness_scope = FairnessScope::from("episode");
    assert!(matches!(
        master.compute_fairness_gradients(),
        Err(MasterError::UnknownFairnessScope(_))
    ));
    assert!(matches!(
        master.compute_realized_fairness_penalty(),
        Err(MasterError::UnknownFairnessScope(_))
    ));
    assert!(matches!(
        master.solve(),
        Err(MasterError::UnknownFairnessScope(_))
    ));
    // the rejected solve left the previous solution in place
    assert!(master.status().unwrap().has_solution());
}

#[test]
fn pricing_signals_combine_duals_and_gradients() {
    let config = MasterConfig::new()
        .with_capacity(1.5)
        .with_langrangian_weight(0.5);
    let mut master = MasterProblem::new(three_period_agents(), config).unwrap();
    master.solve().unwrap();

    let signals = master.pricing_signals().unwrap();
    let duals = master.get_dual_prices();
    let gradients = master.compute_fairness_gradients().unwrap();
    assert_eq!(signals.dual_prices, duals);
    assert_eq!(signals.convexity_duals.len(), 3);

    let prices = signals.for_agent(1).unwrap();
    for t in 0..3 {
        assert!((prices[t] - (duals[t] + 0.5 * gradients[1][t])).abs() < 1e-12);
    }
}

#[test]
fn repeated_solves_pick_up_new_columns() {
    let agents = vec![
        Agent::new("A1", 2).with_column(Column::idle(2)),
        Agent::new("A2", 2).with_column(Column::idle(2)),
    ];
    let config = MasterConfig::new()
        .with_capacity(1.0)
        .with_langrangian_weight(0.0);
    let mut master = MasterProblem::new(agents, config).unwrap();

    let first = master.solve().unwrap();
    assert!(first.objective_value.unwrap().abs() < TOL);

    master.agents_mut()[0].push_column(Column::new(vec![1.0, 1.0], vec![2.0, 2.0]));
    let second = master.solve().unwrap();
    assert!((second.objective_value.unwrap() - 4.0).abs() < TOL);
    assert_eq!(second.distributions[0].len(), 2);
    assert!((second.distributions[0][1] - 1.0).abs() < TOL);
}

#[test]
fn random_instances_keep_master_invariants() {
    let mut rng = StdRng::seed_from_u64(42);

    for round in 0..20 {
        let horizon = rng.random_range(1..=4);
        let num_agents = rng.random_range(2..=4);
        let agents: Vec<Agent> = (0..num_agents)
            .map(|a| {
                let mut agent = Agent::new(format!("A{a}"), horizon)
                    .with_fixed_costs((0..horizon).map(|_| rng.random_range(0.0..0.5)).collect())
                    .with_column(Column::idle(horizon));
                for _ in 0..rng.random_range(1..=3) {
                    agent.push_column(Column::new(
                        (0..horizon).map(|_| rng.random_range(0.0..2.0)).collect(),
                        (0..horizon).map(|_| rng.random_range(0.0..3.0)).collect(),
                    ));
                }
                agent
            })
            .collect();

        let config = MasterConfig::new()
            .with_capacity(rng.random_range(1.0..3.0))
            .with_langrangian_weight(rng.random_range(0.0..2.0))
            .with_fairness_scope(if rng.random_bool(0.5) { "timestep" } else { "cumulative" });
        let weight = config.langrangian_weight;
        let mut master = MasterProblem::new(agents, config).unwrap();
        let solution = master.solve().unwrap();
        assert!(solution.has_solution(), "round {round}: {:?}", solution.status);
        assert!(solution.max_constraint_violation.unwrap() < 1e-6, "round {round}");

        for dist in &solution.distributions {
            assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-6, "round {round}");
            assert!(dist.iter().all(|&w| w >= 0.0), "round {round}");
        }

        let duals = master.get_dual_prices();
        assert_eq!(duals.len(), horizon);
        assert!(duals.iter().all(|&d| d > -1e-6), "round {round}: {duals:?}");

        let kpi = AllocationKpi::calculate(&master).unwrap();
        assert!(kpi.respects_capacity(1e-6), "round {round}");
        assert!((solution.fairness_impact - weight * kpi.realized_fairness_penalty).abs() < 1e-12);

        let expected = kpi.total_expected_net_value - solution.fairness_impact;
        assert!(
            (solution.objective_value.unwrap() - expected).abs() < 1e-6,
            "round {round}"
        );
    }
}
