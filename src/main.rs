//! Command-line front end: train a digit network, evaluate it, classify
//! images with it and inspect saved models.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use log::{error, info};

use digit_nn::{
    data::sample::argmax,
    network::builder::describe,
    preprocess, run_training, evaluate, Dataset, DatasetSource, DigitClassifier, Network,
    NetworkError, NetworkTopology, Result, TrainConfig, TrainingOptions,
};

#[derive(Parser)]
#[command(name = "digit-nn")]
#[command(about = "Feed-forward neural network for handwritten digits", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Default log filter, overridden by RUST_LOG
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new network for one or more epochs and save it
    Train {
        /// Network topology JSON; the 784-150-100-10 sigmoid network if omitted
        #[arg(short, long)]
        topology: Option<PathBuf>,

        #[command(flatten)]
        dataset: DatasetArgs,

        /// Where to save the trained model
        #[arg(short, long, default_value = "trained_network.nn")]
        output: PathBuf,

        #[arg(short, long, default_value = "1")]
        epochs: usize,

        /// Seed for weight initialization and shuffling
        #[arg(long)]
        seed: Option<u64>,

        /// Samples between progress reports
        #[arg(long, default_value = "1000")]
        report_every: usize,
    },

    /// Report accuracy and loss of a saved model on a dataset
    Evaluate {
        #[arg(short, long)]
        model: PathBuf,

        #[command(flatten)]
        dataset: DatasetArgs,
    },

    /// Classify an image file with a saved model
    Classify {
        #[arg(short, long)]
        model: PathBuf,

        /// Image to classify (PNG, JPEG, BMP or GIF)
        image: PathBuf,

        /// Side length of the square input grid
        #[arg(long, default_value = "28")]
        size: u32,

        /// Treat the image as dark ink on a light background
        #[arg(long)]
        invert: bool,
    },

    /// Print the learning rate and layers of a saved model
    Inspect {
        #[arg(short, long)]
        model: PathBuf,
    },

    /// Convert a saved binary model to JSON
    ExportJson {
        #[arg(short, long)]
        model: PathBuf,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the default topology as JSON, as a starting point for editing
    WriteTopology {
        #[arg(short, long, default_value = "topology.json")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct DatasetArgs {
    /// MNIST CSV file (label,pixel...)
    #[arg(long, conflicts_with_all = ["images", "labels"])]
    csv: Option<PathBuf>,

    /// IDX3 image file
    #[arg(long, requires = "labels")]
    images: Option<PathBuf>,

    /// IDX1 label file
    #[arg(long, requires = "images")]
    labels: Option<PathBuf>,
}

impl DatasetArgs {
    fn source(&self) -> Result<DatasetSource> {
        match (&self.csv, &self.images, &self.labels) {
            (Some(path), _, _) => Ok(DatasetSource::MnistCsv { path: path.clone() }),
            (None, Some(images), Some(labels)) => Ok(DatasetSource::Idx {
                images: images.clone(),
                labels: labels.clone(),
            }),
            _ => Err(NetworkError::Configuration(
                "a dataset is required: pass --csv or --images with --labels".into(),
            )),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    if let Err(e) = run(cli.command) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Train {
            topology,
            dataset,
            output,
            epochs,
            seed,
            report_every,
        } => {
            let topology = match topology {
                Some(path) => NetworkTopology::load_json(path)?,
                None => NetworkTopology::default(),
            };
            let mut options = TrainingOptions::new(topology, dataset.source()?, output);
            options.epochs = epochs;
            options.seed = seed;

            let (_, summaries) = run_training(&options, &TrainConfig::new(report_every))?;
            if let Some(last) = summaries.last() {
                info!(
                    "done training ({} epochs, final mean loss {:.6}); saved to '{}'",
                    summaries.len(),
                    last.mean_loss,
                    options.model_path.display()
                );
            }
        }

        Commands::Evaluate { model, dataset } => {
            let network = Network::load(&model)?;
            let data = Dataset::load(&dataset.source()?, network.input_size())?;
            let eval = evaluate(&network, data.samples())?;
            println!(
                "accuracy {:.2}% ({}/{}), mean loss {:.6}",
                eval.accuracy() * 100.0,
                eval.correct,
                eval.samples,
                eval.mean_loss
            );
        }

        Commands::Classify {
            model,
            image,
            size,
            invert,
        } => {
            let classifier = DigitClassifier::load(&model)?;
            let mut pixels = preprocess::grayscale_input_from_file(&image, size, size)?;
            if invert {
                preprocess::invert(&mut pixels);
            }
            let scores = classifier.scores(&pixels)?;
            let digit = argmax(&scores);
            info!("scores: {:?}", scores);
            println!("{}", digit);
        }

        Commands::Inspect { model } => {
            let network = Network::load(&model)?;
            println!("learning rate: {}", network.learning_rate());
            println!("layers:        {}", network.layers().len());
            println!("topology:      {}", describe(&network));
        }

        Commands::ExportJson { model, output } => {
            let network = Network::load(&model)?;
            network.save_json(&output)?;
            info!("wrote {}", output.display());
        }

        Commands::WriteTopology { output } => {
            NetworkTopology::default().save_json(&output)?;
            info!("wrote {}", output.display());
        }
    }
    Ok(())
}
