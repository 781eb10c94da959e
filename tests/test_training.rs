// Tests for the epoch loop, progress reporting, evaluation and the training driver.

use std::path::PathBuf;
use std::sync::mpsc;

use approx::assert_relative_eq;
use digit_nn::data::sample::DIGIT_CLASSES;
use digit_nn::train::TrainingProgress;
use digit_nn::{
    evaluate, run_training, train_epoch, ActivationFunction, DatasetSource, Layer, LayerSpec,
    Matrix, Network, NetworkBuilder, NetworkError, NetworkTopology, Sample, TrainConfig,
    TrainingOptions,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("digit_nn_{}_{}", std::process::id(), name))
}

fn digit_samples(count: usize) -> Vec<Sample> {
    (0..count)
        .map(|i| {
            let label = i % 3;
            let mut inputs = vec![0.01; 4];
            inputs[label] = 1.0;
            Sample::from_label(inputs, label, DIGIT_CLASSES).unwrap()
        })
        .collect()
}

fn small_topology() -> NetworkTopology {
    NetworkTopology {
        learning_rate: 0.3,
        input_size: 4,
        hidden: vec![LayerSpec { size: 6, activation: ActivationFunction::Sigmoid }],
        output: LayerSpec { size: 10, activation: ActivationFunction::Sigmoid },
    }
}

fn write_csv(name: &str, samples: usize) -> PathBuf {
    let mut text = String::from("label,p0,p1,p2,p3\n");
    for i in 0..samples {
        let label = i % 3;
        let pixels: Vec<String> = (0..4)
            .map(|p| if p == label { "255".to_string() } else { "0".to_string() })
            .collect();
        text.push_str(&format!("{},{}\n", label, pixels.join(",")));
    }
    let path = temp_path(name);
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn progress_is_reported_every_n_samples_and_at_epoch_end() {
    let mut network = NetworkBuilder::new()
        .learning_rate(0.1)
        .input_layer(4)
        .output_layer(10, ActivationFunction::Sigmoid)
        .build_with_rng(&mut StdRng::seed_from_u64(2))
        .unwrap();
    let (tx, rx) = mpsc::channel();
    let config = TrainConfig::new(4).with_progress(tx);

    let summary = train_epoch(&mut network, &digit_samples(10), 3, &config).unwrap();
    drop(config);
    let reports: Vec<TrainingProgress> = rx.iter().collect();

    let processed: Vec<usize> = reports.iter().map(|p| p.processed).collect();
    assert_eq!(processed, vec![4, 8, 10]);
    assert!(reports.iter().all(|p| p.epoch == 3 && p.total == 10));
    assert_eq!(reports[2].fraction(), 1.0);

    assert_eq!(summary.epoch, 3);
    assert_eq!(summary.samples, 10);
    assert!(summary.mean_loss > 0.0);
}

#[test]
fn dropped_receiver_does_not_stop_training() {
    let mut network = NetworkBuilder::new()
        .learning_rate(0.1)
        .input_layer(4)
        .output_layer(10, ActivationFunction::Sigmoid)
        .build_with_rng(&mut StdRng::seed_from_u64(2))
        .unwrap();
    let (tx, rx) = mpsc::channel();
    drop(rx);

    let summary = train_epoch(&mut network, &digit_samples(5), 1, &TrainConfig::new(1).with_progress(tx)).unwrap();
    assert_eq!(summary.samples, 5);
}

#[test]
fn zero_report_interval_reports_every_sample() {
    let mut network = NetworkBuilder::new()
        .learning_rate(0.1)
        .input_layer(4)
        .output_layer(10, ActivationFunction::Sigmoid)
        .build_with_rng(&mut StdRng::seed_from_u64(2))
        .unwrap();
    let (tx, rx) = mpsc::channel();
    let config = TrainConfig {
        report_every: 0,
        progress_tx: Some(tx),
    };

    let summary = train_epoch(&mut network, &digit_samples(3), 1, &config).unwrap();
    drop(config);
    let processed: Vec<usize> = rx.iter().map(|p| p.processed).collect();

    assert_eq!(summary.samples, 3);
    assert_eq!(processed, vec![1, 2, 3]);
}

#[test]
fn bad_sample_aborts_the_epoch() {
    let mut network = NetworkBuilder::new()
        .learning_rate(0.1)
        .input_layer(3)
        .output_layer(10, ActivationFunction::Sigmoid)
        .build_with_rng(&mut StdRng::seed_from_u64(2))
        .unwrap();
    let err = train_epoch(&mut network, &digit_samples(2), 1, &TrainConfig::default()).unwrap_err();
    assert!(matches!(err, NetworkError::ShapeMismatch(_)));
}

#[test]
fn evaluate_counts_argmax_matches() {
    let identity = Matrix::from_data(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap();
    let network = Network::from_layers(
        vec![Layer::from_weights(identity, ActivationFunction::Sigmoid)],
        0.1,
    )
    .unwrap();
    let samples = vec![
        Sample::from_label(vec![0.9, 0.1], 0, 2).unwrap(),
        Sample::from_label(vec![0.1, 0.9], 1, 2).unwrap(),
        Sample::from_label(vec![0.8, 0.2], 1, 2).unwrap(),
    ];

    let eval = evaluate(&network, &samples).unwrap();
    assert_eq!(eval.samples, 3);
    assert_eq!(eval.correct, 2);
    assert_relative_eq!(eval.accuracy(), 2.0 / 3.0);
    assert!(eval.mean_loss > 0.0);

    assert_eq!(evaluate(&network, &[]).unwrap().accuracy(), 0.0);
}

#[test]
fn training_improves_accuracy_on_a_separable_set() {
    let mut network = small_topology()
        .builder()
        .build_with_rng(&mut StdRng::seed_from_u64(13))
        .unwrap();
    let samples = digit_samples(30);

    let before = evaluate(&network, &samples).unwrap();
    for epoch in 1..=100 {
        train_epoch(&mut network, &samples, epoch, &TrainConfig::new(1000)).unwrap();
    }
    let after = evaluate(&network, &samples).unwrap();

    assert!(after.mean_loss < before.mean_loss);
    assert_eq!(after.accuracy(), 1.0);
}

#[test]
fn run_training_trains_and_saves() {
    let csv = write_csv("driver.csv", 24);
    let model = temp_path("driver.nn");
    let mut options = TrainingOptions::new(
        small_topology(),
        DatasetSource::MnistCsv { path: csv.clone() },
        model.clone(),
    );
    options.epochs = 3;
    options.seed = Some(5);

    let (network, summaries) = run_training(&options, &TrainConfig::default()).unwrap();
    let saved = Network::load(&model).unwrap();
    std::fs::remove_file(&csv).ok();
    std::fs::remove_file(&model).ok();

    assert_eq!(summaries.len(), 3);
    assert_eq!(
        summaries.iter().map(|s| s.epoch).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
    assert!(summaries.iter().all(|s| s.samples == 24));
    assert_eq!(saved, network);
}

#[test]
fn run_training_is_deterministic_for_a_seed() {
    let csv = write_csv("seeded.csv", 12);
    let run = |name: &str| {
        let mut options = TrainingOptions::new(
            small_topology(),
            DatasetSource::MnistCsv { path: csv.clone() },
            temp_path(name),
        );
        options.seed = Some(77);
        options.epochs = 2;
        let (network, _) = run_training(&options, &TrainConfig::default()).unwrap();
        std::fs::remove_file(temp_path(name)).ok();
        network
    };
    let a = run("seeded_a.nn");
    let b = run("seeded_b.nn");
    std::fs::remove_file(&csv).ok();

    assert_eq!(a, b);
}

#[test]
fn run_training_rejects_zero_epochs_and_empty_data() {
    let mut options = TrainingOptions::new(
        small_topology(),
        DatasetSource::MnistCsv { path: temp_path("unused.csv") },
        temp_path("unused.nn"),
    );
    options.epochs = 0;
    let err = run_training(&options, &TrainConfig::default()).unwrap_err();
    assert!(matches!(err, NetworkError::Configuration(_)));

    let empty = temp_path("empty.csv");
    std::fs::write(&empty, "label,p0,p1,p2,p3\n").unwrap();
    options.epochs = 1;
    options.dataset = DatasetSource::MnistCsv { path: empty.clone() };
    let err = run_training(&options, &TrainConfig::default()).unwrap_err();
    std::fs::remove_file(&empty).ok();
    assert!(matches!(err, NetworkError::Format(_)));
}
