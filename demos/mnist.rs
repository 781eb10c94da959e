//! MNIST digit classification demo for digit-nn.
//!
//! Architecture: 784 → 150 (Sigmoid) → 100 (Sigmoid) → 10 (Sigmoid), no biases
//! Training:     per-sample SGD, lr = 0.035, one epoch
//!
//! Run with:
//!   cargo run --example mnist --release -- mnist_train.csv mnist_test.csv
//!
//! Both files use the `label,pixel0,...,pixel783` CSV layout.

use std::env;
use std::process;

use digit_nn::{
    evaluate, train_epoch, ActivationFunction, Dataset, NetworkBuilder, Result, TrainConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: {} <train.csv> <test.csv>", args[0]);
        process::exit(2);
    }

    if let Err(e) = run(&args[1], &args[2]) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(train_path: &str, test_path: &str) -> Result<()> {
    let mut rng = StdRng::seed_from_u64(42);

    let mut network = NetworkBuilder::new()
        .learning_rate(0.035)
        .input_layer(784)
        .hidden_layer(150, ActivationFunction::Sigmoid)
        .hidden_layer(100, ActivationFunction::Sigmoid)
        .output_layer(10, ActivationFunction::Sigmoid)
        .build_with_rng(&mut rng)?;

    let mut train = Dataset::from_mnist_csv(train_path, 784)?;
    let test = Dataset::from_mnist_csv(test_path, 784)?;
    train.shuffle(&mut rng);

    let before = evaluate(&network, test.samples())?;
    println!("Accuracy before training: {:.2}%", before.accuracy() * 100.0);

    let summary = train_epoch(&mut network, train.samples(), 1, &TrainConfig::new(5000))?;
    println!(
        "Trained on {} samples in {:.1}s, mean loss {:.6}",
        summary.samples,
        summary.elapsed_ms as f64 / 1000.0,
        summary.mean_loss
    );

    let after = evaluate(&network, test.samples())?;
    println!(
        "Accuracy after one epoch:  {:.2}% ({}/{})",
        after.accuracy() * 100.0,
        after.correct,
        after.samples
    );

    network.save("mnist_network.nn")?;
    println!("Saved to mnist_network.nn");
    Ok(())
}
