use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;

use cwseg::evaluator::Evaluator;
use cwseg::extractor::Extractor;
use cwseg::feature::Templates;
use cwseg::get_version;
use cwseg::model::Model;
use cwseg::segmenter::Segmenter;
use cwseg::trainer::Trainer;

/// Number of input lines segmented together.
const BATCH_SIZE: usize = 1024;

#[derive(Debug, Args)]
#[clap(
    author,
    about = "Extract the training instances of a corpus",
    version = get_version(),
)]
struct ExtractArgs {
    corpus_file: PathBuf,
    features_file: PathBuf,
}

#[derive(Debug, Args)]
#[clap(author,
    about = "Train a segmenter",
    version = get_version(),
)]
struct TrainArgs {
    #[arg(short = 'e', long, default_value = "150")]
    num_epochs: usize,

    corpus_file: PathBuf,
    model_file: PathBuf,
}

#[derive(Debug, Args)]
#[clap(author,
    about = "Segment sentences read from stdin",
    version = get_version(),
)]
struct SegmentArgs {
    #[arg(short, long, default_value = " ")]
    delimiter: String,

    #[arg(short = 'n', long, default_value = "1")]
    num_threads: usize,

    model_file: PathBuf,
}

#[derive(Debug, Args)]
#[clap(author,
    about = "Evaluate a segmenter against a segmented corpus",
    version = get_version(),
)]
struct EvaluateArgs {
    model_file: PathBuf,
    gold_file: PathBuf,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Extract(ExtractArgs),
    Train(TrainArgs),
    Segment(SegmentArgs),
    Evaluate(EvaluateArgs),
}

#[derive(Debug, Parser)]
#[clap(
    name = "cwseg",
    author,
    about = "A Chinese word segmentation command line interface",
    version = get_version(),
)]
struct CommandArgs {
    #[clap(subcommand)]
    command: Commands,
}

fn extract(args: ExtractArgs) -> Result<(), Box<dyn Error>> {
    let extractor = Extractor::default();

    let count = extractor.extract(args.corpus_file.as_path(), args.features_file.as_path())?;

    eprintln!("Feature extraction completed successfully: {} instances.", count);
    Ok(())
}

fn train(args: TrainArgs) -> Result<(), Box<dyn Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        if r.load(Ordering::SeqCst) {
            r.store(false, Ordering::SeqCst);
        } else {
            std::process::exit(0);
        }
    })?;

    let trainer = Trainer::new(
        args.num_epochs,
        Templates::default(),
        args.corpus_file.as_path(),
    )?;

    let metrics = trainer.train_with_observer(running, args.model_file.as_path(), |report| {
        eprint!(
            "\rEpoch {} - wrong percentage: {:.6}",
            report.epoch, report.error_rate
        );
    })?;
    eprintln!();

    if metrics.interrupted() {
        eprintln!(
            "Training interrupted after {} of {} epochs.",
            metrics.epochs, metrics.num_epochs
        );
    }
    eprintln!("Result:");
    eprintln!("Epochs: {}", metrics.epochs);
    eprintln!(
        "Accuracy: {:.2}% ({} / {})",
        metrics.accuracy,
        metrics.true_positives + metrics.true_negatives,
        metrics.num_instances
    );
    eprintln!(
        "Precision: {:.2}% ({} / {})",
        metrics.precision,
        metrics.true_positives,
        metrics.true_positives + metrics.false_positives
    );
    eprintln!(
        "Recall: {:.2}% ({} / {})",
        metrics.recall,
        metrics.true_positives,
        metrics.true_positives + metrics.false_negatives
    );
    eprintln!(
        "Confusion Matrix: TP: {}, FP: {}, FN: {}, TN: {}",
        metrics.true_positives,
        metrics.false_positives,
        metrics.false_negatives,
        metrics.true_negatives
    );

    eprintln!("Training completed successfully.");
    Ok(())
}

fn segment(args: SegmentArgs) -> Result<(), Box<dyn Error>> {
    let segmenter = Segmenter::new(Model::load_model(args.model_file.as_path())?);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.num_threads)
        .build()?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut writer = io::BufWriter::new(stdout.lock());

    let mut lines = stdin.lock().lines();
    loop {
        let batch = lines
            .by_ref()
            .take(BATCH_SIZE)
            .collect::<io::Result<Vec<String>>>()?;
        if batch.is_empty() {
            break;
        }
        let results: Vec<String> = pool.install(|| {
            batch
                .par_iter()
                .map(|line| segmenter.segment_with_delimiter(line, &args.delimiter))
                .collect()
        });
        for result in results {
            writeln!(writer, "{}", result)?;
        }
    }
    writer.flush()?;

    Ok(())
}

fn evaluate(args: EvaluateArgs) -> Result<(), Box<dyn Error>> {
    let segmenter = Segmenter::new(Model::load_model(args.model_file.as_path())?);
    let evaluation = Evaluator::new(&segmenter).evaluate_path(args.gold_file.as_path())?;

    println!("Sentences: {}", evaluation.num_sentences);
    println!(
        "Precision: {:.2}% ({} / {})",
        evaluation.precision() * 100.0,
        evaluation.num_correct_words,
        evaluation.num_predicted_words
    );
    println!(
        "Recall: {:.2}% ({} / {})",
        evaluation.recall() * 100.0,
        evaluation.num_correct_words,
        evaluation.num_gold_words
    );
    println!("F1: {:.2}%", evaluation.f1() * 100.0);
    println!(
        "Boundary Accuracy: {:.2}% ({} / {})",
        evaluation.boundary_accuracy() * 100.0,
        evaluation.num_correct_boundaries,
        evaluation.num_boundaries
    );
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = CommandArgs::parse();

    match args.command {
        Commands::Extract(args) => extract(args),
        Commands::Train(args) => train(args),
        Commands::Segment(args) => segment(args),
        Commands::Evaluate(args) => evaluate(args),
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
