#[macro_use]
extern crate clap;

use std::process;

use clap::{App, Arg};

use vital_stats::{
    load_table, Analysis, CliReport, CliVerbosity, ModelSpec, OutlierPolicy, ThresholdMode,
};

fn app() -> App<'static, 'static> {
    App::new("vital-stats")
        .version(crate_version!())
        .about("Filters IQR outliers out of monthly registration records and fits OLS models")
        .arg(
            Arg::with_name("INPUT")
                .help("CSV file with one row per month")
                .required(true),
        )
        .arg(
            Arg::with_name("cascade")
                .long("cascade")
                .help("Recompute each column's bounds from the rows earlier rules left behind"),
        )
        .arg(
            Arg::with_name("fill-missing")
                .long("fill-missing")
                .help("Replace missing counts with zero before filtering"),
        )
        .arg(
            Arg::with_name("policy")
                .long("policy")
                .takes_value(true)
                .value_name("FILE")
                .help("JSON outlier policy to use instead of the default one"),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .takes_value(true)
                .value_name("FILE")
                .help("Write the results as JSON"),
        )
        .arg(
            Arg::with_name("filtered")
                .long("filtered")
                .takes_value(true)
                .value_name("FILE")
                .help("Write the filtered records as CSV"),
        )
        .arg(
            Arg::with_name("predict")
                .long("predict")
                .takes_value(true)
                .multiple(true)
                .value_name("VALUE")
                .default_value("69")
                .help("Marriage counts to predict births at"),
        )
        .arg(
            Arg::with_name("color")
                .long("color")
                .alias("colour")
                .takes_value(true)
                .possible_values(&["auto", "always", "never"])
                .default_value("auto")
                .help("Configure coloring of output"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Print the column summary and monthly totals too"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .conflicts_with("verbose")
                .help("Only print the fitted models"),
        )
}

fn run() -> vital_stats::Result<()> {
    let matches = app().get_matches();

    let enable_text_coloring = match matches.value_of("color") {
        Some("always") => true,
        Some("never") => false,
        _ => atty::is(atty::Stream::Stdout),
    };
    let verbosity = if matches.is_present("verbose") {
        CliVerbosity::Verbose
    } else if matches.is_present("quiet") {
        CliVerbosity::Quiet
    } else {
        CliVerbosity::Normal
    };
    let points = values_t!(matches, "predict", f64).unwrap_or_else(|e| e.exit());

    let mut analysis = Analysis::default()
        .fill_missing(matches.is_present("fill-missing"))
        .models(vec![
            points
                .into_iter()
                .fold(ModelSpec::new("births", &["marriages"]), |spec, x| {
                    spec.predict_at(vec![x])
                }),
            ModelSpec::new("births", &["divorces", "adoptions"]).predict_at(vec![100., 100.]),
        ]);
    if matches.is_present("cascade") {
        analysis = analysis.threshold_mode(ThresholdMode::Cascading);
    }
    if let Some(path) = matches.value_of("policy") {
        analysis = analysis.policy(OutlierPolicy::load(path)?);
    }
    if let Some(path) = matches.value_of("json") {
        analysis = analysis.json_output(path);
    }
    if let Some(path) = matches.value_of("filtered") {
        analysis = analysis.filtered_output(path);
    }

    let table = load_table(matches.value_of("INPUT").unwrap_or_default())?;
    let output = analysis.run(&table)?;

    CliReport::new(enable_text_coloring, verbosity).print(&output);

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("vital-stats ERROR: {}", e);
        process::exit(1);
    }
}
