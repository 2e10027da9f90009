use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use fruit_classifier::dataset::{cache::FeatureCache, DatasetManifest};
use fruit_classifier::evaluation::{CrossValidation, KSweep, SplitSummary};
use fruit_classifier::pipeline::predict_clip;
use fruit_classifier::{
    AppConfig, BatchProcessor, ClassLabelMap, EvaluationReport, Evaluator, KnnClassifier,
    Preprocessor,
};
use serde::Serialize;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "fruit_cli",
    about = "Feature extraction and KNN evaluation for spoken fruit names"
)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log at DEBUG level
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract features for every labeled clip and write a feature cache
    Extract {
        /// JSON manifest of {path, class} entries
        #[arg(long, conflicts_with = "audio_dir")]
        manifest: Option<PathBuf>,
        /// Directory of audio files labeled by file name (only WAV is decoded)
        #[arg(long)]
        audio_dir: Option<PathBuf>,
        #[arg(long)]
        output: PathBuf,
        /// Override pipeline.workers
        #[arg(long)]
        workers: Option<usize>,
    },
    /// Sweep k, cross-validate and report final test metrics from a feature cache
    Evaluate {
        #[arg(long)]
        features: PathBuf,
        /// Candidate neighbor counts (defaults to evaluation.candidate_ks)
        #[arg(long, value_delimiter = ',')]
        k: Vec<usize>,
        /// Override evaluation.cv_folds
        #[arg(long)]
        folds: Option<usize>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Classify one clip with a model trained on a feature cache
    Predict {
        #[arg(long)]
        features: PathBuf,
        #[arg(long)]
        audio: PathBuf,
        /// Neighbor count (defaults to evaluation.cv_k)
        #[arg(long)]
        k: Option<usize>,
    },
    /// Print the configured classes and their codes
    ListClasses,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:?}");
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    // Ignore the error when a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::default(),
    };
    config
        .validate()
        .map_err(|reason| anyhow!("invalid configuration: {reason}"))?;

    match cli.command {
        Commands::Extract {
            manifest,
            audio_dir,
            output,
            workers,
        } => run_extract(&config, manifest, audio_dir, &output, workers),
        Commands::Evaluate {
            features,
            k,
            folds,
            output,
        } => run_evaluate(&config, &features, k, folds, output),
        Commands::Predict { features, audio, k } => run_predict(&config, &features, &audio, k),
        Commands::ListClasses => run_list_classes(&config),
    }
}

fn run_extract(
    config: &AppConfig,
    manifest: Option<PathBuf>,
    audio_dir: Option<PathBuf>,
    output: &Path,
    workers: Option<usize>,
) -> Result<ExitCode> {
    let classes = ClassLabelMap::new(config.classes.clone()).context("building class map")?;
    let preprocessor = Preprocessor::new(config).context("building preprocessor")?;
    let processor = BatchProcessor::new(&preprocessor, &classes)
        .with_workers(workers.unwrap_or(config.pipeline.workers));

    let outcome = match (manifest, audio_dir) {
        (Some(path), _) => {
            let manifest = DatasetManifest::load(&path)
                .with_context(|| format!("loading manifest {}", path.display()))?;
            processor.process_manifest(&manifest)?
        }
        (None, Some(dir)) => processor
            .process_directory(&dir)
            .with_context(|| format!("processing {}", dir.display()))?,
        (None, None) => bail!("either --manifest or --audio-dir is required"),
    };
    if outcome.dataset.is_empty() {
        bail!(
            "no clip could be processed ({} failures)",
            outcome.failures.len()
        );
    }

    FeatureCache::from_dataset(&outcome.dataset, &classes)
        .save(output)
        .with_context(|| format!("writing {}", output.display()))?;

    let summary = ExtractSummary {
        output: output.display().to_string(),
        samples: outcome.dataset.len(),
        feature_count: outcome.dataset.dimension().unwrap_or(0),
        class_counts: outcome.dataset.class_counts(),
        failures: outcome
            .failures
            .iter()
            .map(|(path, err)| FailurePayload {
                path: path.display().to_string(),
                error: err.to_string(),
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(ExitCode::from(0))
}

fn run_evaluate(
    config: &AppConfig,
    features: &Path,
    k: Vec<usize>,
    folds: Option<usize>,
    output: Option<PathBuf>,
) -> Result<ExitCode> {
    let (dataset, classes) = load_cache(features)?;
    let evaluator = Evaluator::new(&dataset, &config.evaluation)
        .context("building evaluation split")?
        .with_workers(config.pipeline.workers);

    let candidates = if k.is_empty() {
        config.evaluation.candidate_ks.clone()
    } else {
        k
    };
    let sweep = evaluator.sweep_k(&candidates).context("sweeping k")?;
    let cross_validation = evaluator
        .cross_validate(sweep.best_k, folds.unwrap_or(config.evaluation.cv_folds))
        .context("cross-validating")?;
    let classifier = evaluator.train_classifier(sweep.best_k)?;
    let report = evaluator
        .evaluate_final(&classifier)
        .context("evaluating on the test split")?;

    let payload = EvaluationPayload {
        class_names: classes.names(),
        split: evaluator.split_summary(),
        sweep: &sweep,
        cross_validation: &cross_validation,
        report: &report,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    if let Some(path) = output {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }
    Ok(ExitCode::from(0))
}

fn run_predict(
    config: &AppConfig,
    features: &Path,
    audio: &Path,
    k: Option<usize>,
) -> Result<ExitCode> {
    let (dataset, classes) = load_cache(features)?;
    let preprocessor = Preprocessor::new(config).context("building preprocessor")?;

    let mut classifier = KnnClassifier::new(k.unwrap_or(config.evaluation.cv_k))?;
    classifier.train_on(&dataset)?;

    let prediction = predict_clip(&preprocessor, &classifier, &classes, audio)?;
    println!("{}", serde_json::to_string_pretty(&prediction)?);
    Ok(ExitCode::from(0))
}

fn run_list_classes(config: &AppConfig) -> Result<ExitCode> {
    let classes = ClassLabelMap::new(config.classes.clone()).context("building class map")?;
    for (code, name) in classes.names().iter().enumerate() {
        println!("{code}\t{name}");
    }
    Ok(ExitCode::from(0))
}

fn load_cache(path: &Path) -> Result<(fruit_classifier::LabeledDataset, ClassLabelMap)> {
    let cache =
        FeatureCache::load(path).with_context(|| format!("loading {}", path.display()))?;
    Ok(cache.into_dataset()?)
}

#[derive(Serialize)]
struct ExtractSummary {
    output: String,
    samples: usize,
    feature_count: usize,
    class_counts: Vec<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<FailurePayload>,
}

#[derive(Serialize)]
struct FailurePayload {
    path: String,
    error: String,
}

#[derive(Serialize)]
struct EvaluationPayload<'a> {
    class_names: &'a [String],
    split: SplitSummary,
    sweep: &'a KSweep,
    cross_validation: &'a CrossValidation,
    report: &'a EvaluationReport,
}
