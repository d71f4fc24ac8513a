use clap::{Arg, ArgAction, Command, ValueHint};
use std::path::PathBuf;

/// Command-line definition of the `kval` binary.
pub fn build_cli() -> Command {
    Command::new("kval")
        .version(clap::crate_version!())
        .about("kval - k-nearest-neighbor classification with k-fold cross-validation")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("validate")
                .about("Clean, scale and cross-validate a labelled table with a k-NN classifier")
                .arg(
                    Arg::new("config")
                        .help("Path to a JSON validation configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the input table (.csv, .xlsx, .tsv, .txt or .json). \
                             Overrides the data file specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("label_column")
                        .short('l')
                        .long("label-column")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Name of the column holding the class labels."),
                )
                .arg(
                    Arg::new("exclude")
                        .long("exclude")
                        .value_delimiter(',')
                        .action(ArgAction::Append)
                        .help("Comma-separated columns to drop before building features."),
                )
                .arg(
                    Arg::new("k")
                        .short('k')
                        .long("neighbors")
                        .value_parser(clap::value_parser!(usize))
                        .help("Number of neighbors voting on each prediction."),
                )
                .arg(
                    Arg::new("folds")
                        .short('f')
                        .long("folds")
                        .value_parser(clap::value_parser!(usize))
                        .help("Number of cross-validation folds (at least 2)."),
                )
                .arg(
                    Arg::new("metrics")
                        .short('m')
                        .long("metrics")
                        .value_delimiter(',')
                        .action(ArgAction::Append)
                        .help(
                            "Comma-separated metrics: accuracy, error_rate, sensitivity, \
                             specificity, geometric_mean, auc.",
                        ),
                )
                .arg(
                    Arg::new("seed")
                        .short('s')
                        .long("seed")
                        .value_parser(clap::value_parser!(u64))
                        .help("Seed for breaking voting ties reproducibly."),
                )
                .arg(
                    Arg::new("positive_label")
                        .short('p')
                        .long("positive-label")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Class treated as positive for scores and AUC."),
                )
                .arg(
                    Arg::new("missing")
                        .long("missing")
                        .value_parser(["remove", "mean", "median", "mode"])
                        .help("How to handle missing feature values."),
                )
                .arg(
                    Arg::new("normalization")
                        .short('n')
                        .long("normalization")
                        .value_parser(["none", "min-max", "standard"])
                        .help("Feature scaling applied before validation."),
                )
                .arg(
                    Arg::new("output_dir")
                        .short('o')
                        .long("output-dir")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Directory that results, predictions and the report are written to.")
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("save_scaled")
                        .long("save-scaled")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Also write the cleaned, scaled dataset under this file name."),
                )
                .arg(
                    Arg::new("no_report")
                        .long("no-report")
                        .help("Disable HTML report generation.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
}
