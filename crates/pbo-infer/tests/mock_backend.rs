use pbo_core::errors::{ErrorInfo, PboError};
use pbo_core::{Energy, Label, PseudoBooleanBackend, VariableIndex};
use pbo_infer::{Inference, InferenceConfig, LocalSearchInference};
use pbo_model::TableModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Reduce,
    Solve,
    Label,
}

/// Records every submission and replays canned labels.
#[derive(Debug, Default)]
struct RecordingBackend {
    begun: Vec<usize>,
    unary: Vec<(VariableIndex, Energy, Energy)>,
    cliques: Vec<(Vec<VariableIndex>, Vec<Energy>)>,
    reduced: usize,
    initial: Vec<Vec<Label>>,
    answer: Vec<Label>,
    fail_at: Option<Stage>,
}

impl RecordingBackend {
    fn answering(answer: Vec<Label>) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    fn check(&self, stage: Stage) -> Result<(), PboError> {
        if self.fail_at == Some(stage) {
            return Err(PboError::Solver(ErrorInfo::new(
                "mock-failure",
                format!("{stage:?} failed"),
            )));
        }
        Ok(())
    }
}

impl PseudoBooleanBackend for RecordingBackend {
    fn begin(&mut self, num_variables: usize) -> Result<(), PboError> {
        self.begun.push(num_variables);
        self.unary.clear();
        self.cliques.clear();
        Ok(())
    }

    fn add_unary_term(
        &mut self,
        variable: VariableIndex,
        e0: Energy,
        e1: Energy,
    ) -> Result<(), PboError> {
        self.unary.push((variable, e0, e1));
        Ok(())
    }

    fn add_clique(
        &mut self,
        variables: &[VariableIndex],
        table: &[Energy],
    ) -> Result<(), PboError> {
        self.cliques.push((variables.to_vec(), table.to_vec()));
        Ok(())
    }

    fn reduce(&mut self) -> Result<(), PboError> {
        self.check(Stage::Reduce)?;
        self.reduced += 1;
        Ok(())
    }

    fn solve(&mut self, initial: &[Label]) -> Result<(), PboError> {
        self.check(Stage::Solve)?;
        self.initial.push(initial.to_vec());
        Ok(())
    }

    fn label(&self, variable: VariableIndex) -> Result<Label, PboError> {
        if variable + 1 == self.answer.len() {
            self.check(Stage::Label)?;
        }
        Ok(self.answer[variable])
    }
}

#[test]
fn clique_table_follows_factor_ordering() {
    let mut model = TableModel::binary(3);
    // Index = label(2) + 2 * label(0) + 4 * label(1).
    let values: Vec<f64> = (0u8..8).map(|i| f64::from(i) * 0.5).collect();
    model.add_factor(vec![2, 0, 1], values).expect("clique");

    let backend = RecordingBackend::answering(vec![0, 0, 0]);
    let mut inference =
        LocalSearchInference::with_backend(&model, InferenceConfig::default(), backend)
            .expect("construction");
    inference.infer().expect("infer");

    let backend = inference.backend();
    assert_eq!(backend.begun, vec![3]);
    assert_eq!(backend.reduced, 1);
    assert!(backend.unary.is_empty());
    assert_eq!(backend.cliques.len(), 1);
    let (variables, table) = &backend.cliques[0];
    assert_eq!(variables, &vec![2, 0, 1]);
    let expected: Vec<Energy> = (0..8).map(|i| i * 5_000).collect();
    assert_eq!(table, &expected);
}

#[test]
fn energies_are_scaled_and_truncated() {
    let mut model = TableModel::binary(2);
    model.add_unary(1, 0.123_456_7, -2.000_09).expect("unary");
    model
        .add_factor(vec![0, 1], vec![1.5, -0.000_01, 0.0, 3.0])
        .expect("pairwise");

    let backend = RecordingBackend::answering(vec![0, 0]);
    let mut inference =
        LocalSearchInference::with_backend(&model, InferenceConfig::default(), backend)
            .expect("construction");
    inference.infer().expect("infer");
    assert_eq!(inference.backend().unary, vec![(1, 1_234, -20_000)]);
    assert_eq!(inference.backend().cliques[0].1, vec![15_000, 0, 0, 30_000]);

    let config = InferenceConfig {
        scale: 100.0,
        ..InferenceConfig::default()
    };
    let backend = RecordingBackend::answering(vec![0, 0]);
    let mut inference =
        LocalSearchInference::with_backend(&model, config, backend).expect("construction");
    inference.infer().expect("infer");
    assert_eq!(inference.backend().unary, vec![(1, 12, -200)]);
}

#[test]
fn labels_are_read_in_variable_order() {
    let mut model = TableModel::binary(4);
    model.add_unary(3, 0.0, 1.0).expect("unary");
    let backend = RecordingBackend::answering(vec![1, 0, 0, 1]);
    let mut inference =
        LocalSearchInference::with_backend(&model, InferenceConfig::default(), backend)
            .expect("construction");
    inference.set_state([0, 1, 1, 0]);
    inference.infer().expect("infer");
    assert_eq!(inference.labels(), &[1, 0, 0, 1]);
    assert_eq!(inference.backend().initial, vec![vec![0, 1, 1, 0]]);

    inference.infer().expect("infer");
    assert_eq!(inference.backend().begun, vec![4, 4]);
    assert_eq!(inference.backend().initial[1], vec![1, 0, 0, 1]);
}

#[test]
fn backend_failures_propagate_unchanged() {
    for stage in [Stage::Reduce, Stage::Solve, Stage::Label] {
        let mut model = TableModel::binary(3);
        model.add_unary(0, 0.0, -1.0).expect("unary");
        let backend = RecordingBackend {
            fail_at: Some(stage),
            ..RecordingBackend::answering(vec![1, 1, 1])
        };
        let mut inference =
            LocalSearchInference::with_backend(&model, InferenceConfig::default(), backend)
                .expect("construction");
        inference.set_state([0, 1, 0]);

        let err = inference.infer().expect_err("mock failure swallowed");
        assert!(matches!(err, PboError::Solver(_)));
        assert_eq!(err.code(), "mock-failure");
        assert_eq!(inference.labels(), &[0, 1, 0]);
        assert_eq!(inference.last_counts(), None);
    }
}

#[test]
fn invalid_models_never_reach_the_backend() {
    let model = TableModel::new(vec![2, 4]);
    let err = LocalSearchInference::with_backend(
        &model,
        InferenceConfig::default(),
        RecordingBackend::default(),
    )
    .expect_err("non-binary model accepted");
    assert!(matches!(err, PboError::NonBinaryModel(_)));
}
