//! Integration test: Training pipeline end-to-end

use credit_approval::error::CreditError;
use credit_approval::preprocessing::PreprocessingConfig;
use credit_approval::synthetic::CreditDataGenerator;
use credit_approval::training::{
    extract_target, ApprovalModel, ClassWeight, LogisticRegression, ModelConfig, Solver, StratifiedSplitter,
};
use ndarray::{Array1, Array2};
use polars::prelude::*;

fn classification_df() -> DataFrame {
    df!(
        "f1" => &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0,
                   1.5, 2.5, 3.5, 4.5, 5.5, 6.5, 7.5, 8.5, 9.5, 10.5],
        "f2" => &[10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0,
                   9.5, 8.5, 7.5, 6.5, 5.5, 4.5, 3.5, 2.5, 1.5, 0.5],
        "group" => &["a", "b", "a", "b", "a", "b", "a", "b", "a", "b",
                     "a", "b", "a", "b", "a", "b", "a", "b", "a", "b"],
        "target" => &[0, 0, 0, 0, 1, 0, 1, 1, 1, 1,
                      0, 0, 0, 1, 0, 1, 1, 1, 1, 1]
    )
    .unwrap()
}

#[test]
fn test_stratified_split_partitions_rows() {
    let df = classification_df();
    let y = extract_target(&df, "target").unwrap();
    let splitter = StratifiedSplitter::new().with_test_size(0.25).with_random_state(7);
    let idx = splitter.split_indices(&y).unwrap();

    assert_eq!(idx.test.len(), 5);
    assert_eq!(idx.train.len() + idx.test.len(), 20);

    let mut all: Vec<usize> = idx.train.iter().chain(idx.test.iter()).copied().collect();
    all.sort_unstable();
    assert_eq!(all, (0..20).collect::<Vec<_>>());

    // 11 positives of 20: the test side gets 2 or 3 of its 5 rows
    let test_pos = idx.test.iter().filter(|&&i| y[i] == 1.0).count();
    assert!((2..=3).contains(&test_pos));
}

#[test]
fn test_split_is_seeded() {
    let df = classification_df();
    let a = StratifiedSplitter::new().with_random_state(3).split(&df, "target").unwrap();
    let b = StratifiedSplitter::new().with_random_state(3).split(&df, "target").unwrap();

    assert_eq!(a.y_test, b.y_test);
    assert!(a.x_test.equals(&b.x_test));
    assert!(a.x_train.column("target").is_err());
}

#[test]
fn test_split_missing_target() {
    let err = StratifiedSplitter::new().split(&classification_df(), "approved").unwrap_err();
    assert!(matches!(err, CreditError::TargetNotFound(ref t) if t == "approved"));
}

#[test]
fn test_logistic_regression_separable_direction() {
    let x = Array2::from_shape_fn((40, 1), |(i, _)| i as f64 / 10.0 - 2.0);
    let y = Array1::from_iter((0..40).map(|i| if i >= 20 { 1.0 } else { 0.0 }));

    for solver in [Solver::Lbfgs, Solver::GradientDescent] {
        let mut model = LogisticRegression::new().with_solver(solver).with_max_iter(500);
        model.fit(&x, &y).unwrap();

        let coef = model.coefficients.as_ref().unwrap()[0];
        assert!(coef > 0.0, "{:?} coefficient {}", solver, coef);
        let pred = model.predict(&x, 0.5).unwrap();
        let correct = pred.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        assert!(correct as f64 / y.len() as f64 >= 0.9);
    }
}

#[test]
fn test_stronger_regularization_shrinks_weights() {
    let x = Array2::from_shape_fn((40, 1), |(i, _)| i as f64 / 10.0 - 2.0);
    let y = Array1::from_iter((0..40).map(|i| if i >= 20 { 1.0 } else { 0.0 }));

    let mut loose = LogisticRegression::new().with_c(10.0);
    let mut tight = LogisticRegression::new().with_c(0.01);
    loose.fit(&x, &y).unwrap();
    tight.fit(&x, &y).unwrap();

    let w_loose = loose.coefficients.as_ref().unwrap()[0].abs();
    let w_tight = tight.coefficients.as_ref().unwrap()[0].abs();
    assert!(w_tight < w_loose);
}

#[test]
fn test_single_class_rejected() {
    let x = Array2::zeros((5, 2));
    let y = Array1::ones(5);
    let mut model = LogisticRegression::new();
    let result = model.fit(&x, &y);
    assert!(matches!(result, Err(CreditError::TrainingError(_))));
}

#[test]
fn test_approval_model_on_synthetic_data() {
    let df = CreditDataGenerator::new(1000).with_seed(11).generate().unwrap();
    let split = StratifiedSplitter::new().split(&df, "approved").unwrap();

    let mut model = ApprovalModel::new(PreprocessingConfig::default(), ModelConfig::default());
    model.fit(&split.x_train, &split.y_train).unwrap();

    let proba = model.predict_proba(&split.x_test).unwrap();
    assert_eq!(proba.len(), split.y_test.len());
    assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));

    // 5 numeric columns + 4 employment + 4 home_ownership + 7 purpose + 4 region
    let odds = model.odds_table().unwrap();
    assert_eq!(odds.len(), model.feature_names().len());
    assert_eq!(odds.len(), 24);
    assert!(odds.windows(2).all(|w| w[0].odds_ratio >= w[1].odds_ratio));

    // Credit score raises approval odds in the generating process
    let credit = odds.iter().find(|r| r.feature == "credit_score").unwrap();
    assert!(credit.coef > 0.0);
}

#[test]
fn test_balanced_class_weight_raises_minority_recall() {
    let df = CreditDataGenerator::new(2000).with_seed(5).generate().unwrap();
    let split = StratifiedSplitter::new().split(&df, "approved").unwrap();

    let negatives_caught = |class_weight: ClassWeight| {
        let mut model = ApprovalModel::new(
            PreprocessingConfig::default(),
            ModelConfig::new().with_class_weight(class_weight),
        );
        model.fit(&split.x_train, &split.y_train).unwrap();
        let pred = model.predict(&split.x_train, 0.5).unwrap();
        pred.iter()
            .zip(split.y_train.iter())
            .filter(|(&p, &t)| t == 0.0 && p == 0.0)
            .count()
    };

    assert!(negatives_caught(ClassWeight::Balanced) >= negatives_caught(ClassWeight::Uniform));
}

#[test]
fn test_odds_table_requires_fit() {
    let model = ApprovalModel::new(PreprocessingConfig::default(), ModelConfig::default());
    assert!(matches!(model.odds_table(), Err(CreditError::ModelNotFitted)));
}
