//! Behaviour of the learning agent against scripted environments

mod common;

use std::collections::HashSet;

use common::{FixedPlanner, ScriptedEnvironment};
use smartcab::{
    Error,
    app::AgentConfig,
    geometry::Location,
    ports::{Driver, RoutePlanner},
    q_learning::{DecayStrategy, DrivingState, LearningAgent, QTable, STATE_COUNT},
    types::{Action, Heading, Light},
};

fn forward_on_red() -> DrivingState {
    DrivingState::new(Heading::Forward, Light::Red, None, None, None)
}

fn agent(config: AgentConfig, waypoint: Option<Heading>) -> LearningAgent {
    LearningAgent::new(config, &Action::ALL, FixedPlanner::boxed(waypoint)).unwrap()
}

fn snapshot(table: &QTable) -> Vec<(DrivingState, Vec<(Action, f64)>)> {
    table
        .sorted_rows()
        .into_iter()
        .map(|(state, row)| (*state, row.iter().copied().collect()))
        .collect()
}

#[test]
fn single_update_blends_reward_into_zero_row() {
    let mut env = ScriptedEnvironment::red();
    let mut agent = agent(
        AgentConfig::new(true).with_alpha(0.5).with_seed(1),
        Some(Heading::Forward),
    );
    agent.reset(&mut env, Some(Location::new(4, 4)), false).unwrap();

    let state = forward_on_red();
    agent.learn(&state, Action::Forward, 2.0).unwrap();

    let table = agent.table();
    assert_eq!(table.value(&state, Action::Forward).unwrap(), 1.0);
    for action in [Action::None, Action::Left, Action::Right] {
        assert_eq!(table.value(&state, action).unwrap(), 0.0);
    }
}

#[test]
fn exponential_schedule_over_first_two_trials() {
    let mut env = ScriptedEnvironment::red();
    let mut agent = agent(
        AgentConfig::new(true)
            .with_alpha(0.005)
            .with_decay(DecayStrategy::Exponential)
            .with_seed(2),
        Some(Heading::Forward),
    );

    agent.reset(&mut env, None, false).unwrap();
    assert_eq!(agent.epsilon(), 1.0);
    assert_eq!(agent.alpha(), 0.005);

    agent.reset(&mut env, None, false).unwrap();
    assert!((agent.epsilon() - 0.995_012_479_192_682_4).abs() < 1e-12);
}

#[test]
fn same_seed_same_actions_and_table() {
    let run = || {
        let mut env = ScriptedEnvironment::red()
            .with_reward(Action::None, 2.0)
            .with_reward(Action::Forward, -10.0);
        let mut driver = agent(
            AgentConfig::new(true).with_alpha(0.3).with_seed(99),
            Some(Heading::Forward),
        );
        for _ in 0..5 {
            driver.reset(&mut env, None, false).unwrap();
            for _ in 0..10 {
                driver.update(&mut env).unwrap();
            }
        }
        (env.taken, snapshot(driver.table()))
    };

    let (first_actions, first_table) = run();
    let (second_actions, second_table) = run();
    assert_eq!(first_actions, second_actions);
    assert_eq!(first_table, second_table);
}

#[test]
fn testing_trial_freezes_table_and_exploits() {
    let mut env = ScriptedEnvironment::red()
        .with_reward(Action::None, 2.0)
        .with_reward(Action::Forward, -10.0)
        .with_reward(Action::Left, -10.0)
        .with_reward(Action::Right, 0.5);
    let mut driver = agent(
        AgentConfig::new(true).with_alpha(0.5).with_seed(5),
        Some(Heading::Forward),
    );

    driver.reset(&mut env, None, false).unwrap();
    for _ in 0..60 {
        driver.update(&mut env).unwrap();
    }
    let before = snapshot(driver.table());

    driver.reset(&mut env, None, true).unwrap();
    assert_eq!(driver.epsilon(), 0.0);
    assert_eq!(driver.alpha(), 0.0);

    env.taken.clear();
    for _ in 0..20 {
        let record = driver.update(&mut env).unwrap();
        assert!(!record.explored);
    }

    assert_eq!(snapshot(driver.table()), before);
    assert!(env.taken.iter().all(|&action| action == Action::None));
}

#[test]
fn testing_reset_keeps_training_episode_count() {
    let mut env = ScriptedEnvironment::red();
    let mut driver = agent(
        AgentConfig::new(true).with_alpha(0.1).with_seed(8),
        Some(Heading::Left),
    );
    driver.reset(&mut env, None, false).unwrap();
    driver.reset(&mut env, None, false).unwrap();
    driver.reset(&mut env, None, true).unwrap();
    assert_eq!(driver.exploration().episodes(), 2);

    driver.reset(&mut env, None, false).unwrap();
    let expected = (-0.1_f64 * 2.0).exp();
    assert!((driver.epsilon() - expected).abs() < 1e-12);
}

#[test]
fn non_learning_agent_acts_uniformly_and_never_learns() {
    let mut env = ScriptedEnvironment::red().with_reward(Action::None, 2.0);
    let mut driver = agent(AgentConfig::new(false).with_seed(3), Some(Heading::Right));
    assert_eq!(driver.name(), "Random");

    driver.reset(&mut env, None, false).unwrap();
    for _ in 0..200 {
        let record = driver.update(&mut env).unwrap();
        assert!(record.explored);
    }

    let seen: HashSet<Action> = env.taken.iter().copied().collect();
    assert_eq!(seen.len(), Action::ALL.len());
    for (_, row) in driver.table().sorted_rows() {
        assert!(row.iter().all(|&(_, value)| value == 0.0));
    }
}

#[test]
fn lazy_table_grows_on_visit() {
    let mut env = ScriptedEnvironment::red();
    let mut driver = agent(
        AgentConfig::new(true).with_eager_states(false).with_seed(4),
        Some(Heading::Forward),
    );
    assert_eq!(driver.table().len(), 0);

    driver.reset(&mut env, None, false).unwrap();
    let record = driver.update(&mut env).unwrap();
    assert_eq!(record.state, forward_on_red());
    assert_eq!(driver.table().len(), 1);
    assert!(driver.table().contains(&forward_on_red()));

    let eager = agent(AgentConfig::new(true), Some(Heading::Forward));
    assert_eq!(eager.table().len(), STATE_COUNT);
}

#[test]
fn non_learning_agent_never_grows_lazy_table() {
    let mut env = ScriptedEnvironment::red().with_reward(Action::Forward, 2.0);
    let mut driver = agent(
        AgentConfig::new(false).with_eager_states(false).with_seed(9),
        Some(Heading::Forward),
    );

    driver.reset(&mut env, None, false).unwrap();
    for _ in 0..10 {
        driver.update(&mut env).unwrap();
    }
    assert!(driver.table().is_empty());
    assert_eq!(env.taken.len(), 10);
}

#[test]
fn lazy_table_is_not_extended_during_testing() {
    let mut env = ScriptedEnvironment::red();
    let mut driver = agent(
        AgentConfig::new(true).with_eager_states(false).with_seed(6),
        Some(Heading::Forward),
    );

    driver.reset(&mut env, None, true).unwrap();
    for _ in 0..5 {
        driver.update(&mut env).unwrap();
    }
    assert!(driver.table().is_empty());
    assert_eq!(env.taken.len(), 5);
}

#[test]
fn reset_without_destination_draws_one() {
    let mut env = ScriptedEnvironment::red();
    let mut driver = agent(AgentConfig::new(true).with_seed(12), Some(Heading::Left));
    driver.reset(&mut env, None, false).unwrap();

    let destination = driver.planner().destination().unwrap();
    assert!((1..=8).contains(&destination.x));
    assert!((1..=6).contains(&destination.y));

    driver
        .reset(&mut env, Some(Location::new(2, 3)), false)
        .unwrap();
    assert_eq!(driver.planner().destination(), Some(Location::new(2, 3)));
}

#[test]
fn missing_waypoint_is_an_error() {
    let mut env = ScriptedEnvironment::red();
    let mut driver = agent(AgentConfig::new(true).with_seed(7), None);
    driver.reset(&mut env, None, false).unwrap();
    assert!(matches!(driver.update(&mut env), Err(Error::MissingWaypoint)));
    assert!(env.taken.is_empty());
}

#[test]
fn restricted_action_set_is_respected() {
    let allowed = [Action::None, Action::Right];
    let mut env = ScriptedEnvironment::red().with_valid(&allowed);
    let mut driver = LearningAgent::new(
        AgentConfig::new(true).with_seed(10),
        &allowed,
        FixedPlanner::boxed(Some(Heading::Forward)),
    )
    .unwrap();

    driver.reset(&mut env, None, false).unwrap();
    for _ in 0..50 {
        driver.update(&mut env).unwrap();
    }
    assert!(env.taken.iter().all(|action| allowed.contains(action)));
    assert!(driver.table().value(&forward_on_red(), Action::Left).is_err());
}
