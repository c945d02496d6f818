use pbo_core::ordering::assignment_labels;
use pbo_core::rng::RngHandle;
use pbo_core::{evaluate, EnergyModel, Label, PboError};
use pbo_infer::{
    Inference, InferenceConfig, InferenceTermination, InferenceVisitor, LocalSearchInference,
    SolverKind, TermCounts, TimingVisitor, VerboseVisitor,
};
use pbo_model::{gen_random_binary, TableModel};
use pbo_solve::LocalSearchConfig;
use proptest::prelude::*;

fn brute_force_minimum(model: &TableModel) -> f64 {
    let mut labels = vec![0; model.num_variables()];
    (0..(1usize << model.num_variables()))
        .map(|mask| {
            assignment_labels(mask, &mut labels);
            evaluate(model, &labels).expect("energy")
        })
        .fold(f64::INFINITY, f64::min)
}

fn exhaustive() -> InferenceConfig {
    InferenceConfig {
        solver: SolverKind::Exhaustive,
        ..InferenceConfig::default()
    }
}

fn descent_to_convergence(restarts: usize) -> InferenceConfig {
    InferenceConfig {
        local_search: LocalSearchConfig {
            max_sweeps: 0,
            restarts,
            ..LocalSearchConfig::default()
        },
        ..InferenceConfig::default()
    }
}

#[test]
fn unary_prefers_lower_energy() {
    let mut model = TableModel::binary(1);
    model.add_unary(0, 0.0, -1.0).expect("unary");
    let mut inference =
        LocalSearchInference::new(&model, InferenceConfig::default()).expect("construction");
    assert_eq!(inference.infer().expect("infer"), InferenceTermination::Normal);
    let mut out = Vec::new();
    inference.arg(&mut out, 1);
    assert_eq!(out, vec![1]);
}

#[test]
fn pairwise_table_picks_favoured_assignment() {
    let mut model = TableModel::binary(2);
    // First variable fastest: (0,0), (1,0), (0,1), (1,1).
    model
        .add_factor(vec![0, 1], vec![100.0, 100.0, 0.0, 100.0])
        .expect("pairwise");
    let mut inference =
        LocalSearchInference::new(&model, InferenceConfig::default()).expect("construction");
    inference.infer().expect("infer");
    assert_eq!(inference.labels(), &[0, 1]);
}

#[test]
fn reversed_factor_order_is_respected() {
    let mut model = TableModel::binary(3);
    // Favours variable 2 at 1 and variable 0 at 0.
    model
        .add_factor(vec![2, 0], vec![50.0, 0.0, 50.0, 50.0])
        .expect("pairwise");
    model.add_unary(1, -1.0, 0.0).expect("unary");
    let mut inference =
        LocalSearchInference::new(&model, InferenceConfig::default()).expect("construction");
    inference.infer().expect("infer");
    assert_eq!(inference.labels(), &[0, 0, 1]);
}

#[test]
fn higher_order_clique_reaches_its_minimum() {
    let mut model = TableModel::binary(4);
    let mut values = vec![10.0; 16];
    values[0b1011] = -3.0;
    model.add_factor(vec![0, 1, 2, 3], values).expect("clique");
    let mut inference = LocalSearchInference::new(&model, exhaustive()).expect("construction");
    inference.infer().expect("infer");
    assert_eq!(inference.labels(), &[1, 1, 0, 1]);
    assert_eq!(inference.energy().expect("energy"), -3.0);
}

#[test]
fn constant_factors_are_skipped() {
    let mut model = TableModel::binary(2);
    model.add_constant(42.0);
    model.add_unary(0, 1.0, 0.0).expect("unary");
    model
        .add_factor(vec![0, 1], vec![0.0, 1.0, 1.0, 0.0])
        .expect("pairwise");
    let mut inference = LocalSearchInference::new(&model, exhaustive()).expect("construction");
    assert_eq!(inference.last_counts(), None);
    inference.infer().expect("infer");
    assert_eq!(
        inference.last_counts(),
        Some(TermCounts {
            unary: 1,
            cliques: 1,
            skipped: 1,
        })
    );
    assert_eq!(inference.labels(), &[1, 1]);
}

#[test]
fn forbidden_pair_acts_as_hard_constraint() {
    let mut model = TableModel::binary(2);
    model
        .add_factor(vec![0, 1], vec![f64::INFINITY, 0.0, 0.0, f64::INFINITY])
        .expect("pairwise");
    model.add_unary(1, 0.0, 1.0).expect("unary");
    for config in [InferenceConfig::default(), exhaustive()] {
        let mut inference = LocalSearchInference::new(&model, config).expect("construction");
        inference.infer().expect("infer");
        assert_eq!(inference.labels(), &[1, 0]);
        assert_eq!(inference.energy().expect("energy"), 0.0);
    }
}

#[test]
fn forbidden_clique_configuration_is_avoided() {
    let mut model = TableModel::binary(3);
    let mut values = vec![0.0; 8];
    values[0] = f64::INFINITY;
    model.add_factor(vec![0, 1, 2], values).expect("clique");
    for variable in 0..3 {
        model.add_unary(variable, 0.0, 1.0).expect("unary");
    }
    let mut inference = LocalSearchInference::new(&model, exhaustive()).expect("construction");
    inference.infer().expect("infer");
    assert_eq!(inference.labels(), &[1, 0, 0]);
    assert_eq!(inference.energy().expect("energy"), 1.0);
}

#[test]
fn huge_unary_energies_saturate() {
    let mut model = TableModel::binary(1);
    model.add_unary(0, 1e15, -1e15).expect("unary");
    let mut inference =
        LocalSearchInference::new(&model, InferenceConfig::default()).expect("construction");
    inference.infer().expect("infer");
    assert_eq!(inference.labels(), &[1]);
    assert_eq!(inference.energy().expect("energy"), -1e15);
}

#[test]
fn saturated_high_order_cliques_report_overflow() {
    let mut model = TableModel::binary(10);
    // Alternating +inf/-inf by parity of the assignment.
    let values: Vec<f64> = (0u32..1024)
        .map(|index| {
            if index.count_ones() % 2 == 1 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            }
        })
        .collect();
    for _ in 0..16 {
        model
            .add_factor((0..10).collect(), values.clone())
            .expect("clique");
    }
    let mut inference = LocalSearchInference::new(&model, exhaustive()).expect("construction");
    let err = inference.infer().expect_err("overflow accepted");
    assert!(matches!(err, PboError::Reduction(_)));
    assert_eq!(err.code(), "energy-overflow");
    assert_eq!(inference.labels(), &[0; 10]);
    assert_eq!(inference.last_counts(), None);
}

#[test]
fn single_label_variables_stay_at_zero() {
    let mut model = TableModel::new(vec![1, 2]);
    model.add_factor(vec![0], vec![-5.0]).expect("unary");
    model
        .add_factor(vec![0, 1], vec![3.0, 0.0])
        .expect("pairwise");
    let mut inference =
        LocalSearchInference::new(&model, InferenceConfig::default()).expect("construction");
    inference.infer().expect("infer");
    assert_eq!(inference.labels(), &[0, 1]);
}

#[test]
fn repeated_runs_agree() {
    let mut rng = RngHandle::from_seed(7);
    let model = gen_random_binary(14, 30, 4, &mut rng).expect("model");
    let config = descent_to_convergence(3);
    let mut first = LocalSearchInference::new(&model, config.clone()).expect("construction");
    let mut second = LocalSearchInference::new(&model, config).expect("construction");
    first.infer().expect("infer");
    second.infer().expect("infer");
    assert_eq!(first.labels(), second.labels());
}

#[derive(Default)]
struct CountingVisitor {
    events: Vec<&'static str>,
    seen: Vec<Vec<Label>>,
}

impl<'m> InferenceVisitor<LocalSearchInference<'m, TableModel>> for CountingVisitor {
    fn begin(&mut self, _inference: &LocalSearchInference<'m, TableModel>) {
        self.events.push("begin");
    }

    fn visit(&mut self, inference: &LocalSearchInference<'m, TableModel>) {
        self.events.push("visit");
        self.seen.push(inference.labels().to_vec());
    }

    fn end(&mut self, _inference: &LocalSearchInference<'m, TableModel>) {
        self.events.push("end");
    }
}

#[test]
fn visitor_sees_each_stage_once() {
    let mut model = TableModel::binary(1);
    model.add_unary(0, 0.0, -1.0).expect("unary");
    let mut inference =
        LocalSearchInference::new(&model, InferenceConfig::default()).expect("construction");

    let mut visitor = CountingVisitor::default();
    inference.infer_with(&mut visitor).expect("infer");
    assert_eq!(visitor.events, vec!["begin", "visit", "end"]);
    assert_eq!(visitor.seen, vec![vec![1]]);

    let mut timing = TimingVisitor::default();
    inference.infer_with(&mut timing).expect("infer");
    inference.infer_with(&mut timing).expect("infer");
    assert_eq!(timing.runs(), 2);
    assert!(timing.last().is_some());
    assert!(timing.total() >= timing.last().unwrap_or_default());

    inference
        .infer_with(&mut VerboseVisitor)
        .expect("verbose infer");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn exhaustive_backend_matches_brute_force(
        seed in any::<u64>(),
        num_variables in 1usize..9,
        num_factors in 1usize..14,
        max_arity in 1usize..6,
    ) {
        let mut rng = RngHandle::from_seed(seed);
        let model = gen_random_binary(num_variables, num_factors, max_arity, &mut rng)
            .expect("model");
        let mut inference = LocalSearchInference::new(&model, exhaustive())
            .expect("construction");
        inference.infer().expect("infer");
        prop_assert_eq!(inference.energy().expect("energy"), brute_force_minimum(&model));
    }

    #[test]
    fn local_search_ends_in_a_local_minimum(
        seed in any::<u64>(),
        num_variables in 1usize..16,
        num_factors in 1usize..24,
        max_arity in 1usize..6,
    ) {
        let mut rng = RngHandle::from_seed(seed);
        let model = gen_random_binary(num_variables, num_factors, max_arity, &mut rng)
            .expect("model");
        let mut inference = LocalSearchInference::new(&model, descent_to_convergence(0))
            .expect("construction");
        inference.infer().expect("infer");
        let best = inference.energy().expect("energy");
        let mut labels = inference.labels().to_vec();
        for variable in 0..labels.len() {
            labels[variable] ^= 1;
            prop_assert!(evaluate(&model, &labels).expect("energy") >= best);
            labels[variable] ^= 1;
        }
    }

    #[test]
    fn warm_start_never_gets_worse(
        seed in any::<u64>(),
        num_variables in 1usize..16,
        num_factors in 1usize..24,
        start in any::<u64>(),
    ) {
        let mut rng = RngHandle::from_seed(seed);
        let model = gen_random_binary(num_variables, num_factors, 4, &mut rng)
            .expect("model");
        let mut inference = LocalSearchInference::new(&model, descent_to_convergence(0))
            .expect("construction");
        let starting: Vec<Label> = (0..num_variables)
            .map(|i| ((start >> i) & 1) as Label)
            .collect();
        inference.set_starting_point(starting.iter().copied()).expect("starting point");
        let before = inference.energy().expect("energy");
        inference.infer().expect("infer");
        prop_assert!(inference.energy().expect("energy") <= before);
    }
}
