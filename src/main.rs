extern crate pretty_env_logger;

use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{arg, command, value_parser, ArgMatches, Command};

use optic_form::annotate::AnnotateOptions;
use optic_form::debug::ImageDebugWriter;
use optic_form::pipeline::{load_form_image, run_pipeline_with};
use optic_form::{compare, CaptureKind, OmrError, PipelineConfig, ResultStore, Strategy};

fn main() {
    pretty_env_logger::init_custom_env("LOG");

    let matches = cli().get_matches();
    let store = ResultStore::new(
        matches
            .get_one::<PathBuf>("store")
            .cloned()
            .unwrap_or_else(|| PathBuf::from(".")),
    );

    let result = match matches.subcommand() {
        Some(("scan", scan_matches)) => scan(scan_matches, &store),
        Some(("compare", _)) => score(&store),
        _ => unreachable!("subcommand is required"),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        exit(1);
    }
}

fn scan(matches: &ArgMatches, store: &ResultStore) -> Result<(), OmrError> {
    let image_path = matches
        .get_one::<PathBuf>("image")
        .expect("image path is required");
    let kind = matches
        .get_one::<String>("kind")
        .expect("capture kind is required")
        .parse::<CaptureKind>()?;

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => PipelineConfig::load(path)?,
        None => {
            let strategy = match matches.get_one::<String>("strategy") {
                Some(strategy) => strategy.parse::<Strategy>()?,
                None => Strategy::default(),
            };
            PipelineConfig::for_strategy(strategy)
        }
    };

    let annotate_options = match matches.get_one::<PathBuf>("font") {
        Some(path) => AnnotateOptions::with_font_file(path)?,
        None => AnnotateOptions::default(),
    };

    let debug = if matches.get_flag("debug") {
        ImageDebugWriter::new(image_path.clone())
    } else {
        ImageDebugWriter::disabled()
    };

    let img = load_form_image(image_path)?;
    let output = run_pipeline_with(&img, &config, &annotate_options, &debug)?;
    store.write_capture(kind, &output.answers)?;

    if let Some(annotated_path) = matches.get_one::<PathBuf>("annotated") {
        save_annotated(annotated_path, &output.annotated)?;
    }

    println!("Saved {} ({} questions)", kind, output.answers.len());
    for (i, answer) in output.answers.iter().enumerate() {
        println!("{:>3}: {}", i + 1, answer);
    }
    Ok(())
}

fn save_annotated(path: &Path, img: &image::RgbImage) -> Result<(), OmrError> {
    img.save(path).map_err(|e| match e {
        image::ImageError::IoError(source) => OmrError::StorageUnavailable {
            path: path.to_path_buf(),
            source,
        },
        other => OmrError::InvalidConfig(format!(
            "cannot write annotated image {}: {}",
            path.display(),
            other
        )),
    })
}

fn score(store: &ResultStore) -> Result<(), OmrError> {
    let key = store.read_capture(CaptureKind::AnswerKey)?;
    let submitted = store.read_capture(CaptureKind::Submission)?;
    let tally = compare(&key, &submitted);
    println!("Correct: {}", tally.correct);
    println!("Incorrect: {}", tally.incorrect);
    println!("Blank: {}", tally.blank);
    Ok(())
}

#[allow(clippy::cognitive_complexity)]
fn cli() -> Command {
    command!()
        .subcommand_required(true)
        .arg(
            arg!(-s --store <DIR> "Directory holding saved answers")
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .subcommand(
            Command::new("scan")
                .about("Read the answers marked on a form image and save them")
                .arg(
                    arg!(-k --kind <KIND> "What the form is: key or submission")
                        .required(true),
                )
                .arg(arg!(--strategy <STRATEGY> "Preset: bubble-threshold or box-edges"))
                .arg(
                    arg!(-c --config <PATH> "Path to a pipeline config JSON file")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    arg!(-a --annotated <PATH> "Write the annotated form to this path")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--font <PATH> "TTF font for numbering regions on the annotated form")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(arg!(-d --debug "Write intermediate images next to the input"))
                .arg(
                    arg!(image: <IMAGE> "Path to the form image")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("compare").about("Score the saved submission against the saved key"),
        )
}
