mod cli;

use clap::Parser;
use l3wrap_lib::Result;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let default_filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = cli::init_config(&cli)?;

    match cli.command {
        cli::Commands::Setup { data_dir } => {
            cli::setup::handle_setup_command(&config, data_dir, cli.quiet)
        }

        cli::Commands::Train {
            input,
            stem,
            min_support,
            min_confidence,
            rule_set,
            top_count,
            perc_count,
            names,
            columns,
            keep_data,
        } => cli::train::handle_train_command(
            &config,
            cli::train::TrainArgs {
                input,
                stem,
                min_support,
                min_confidence,
                rule_set,
                top_count,
                perc_count,
                names,
                columns,
                keep_data,
            },
            cli.quiet,
        ),

        cli::Commands::Predict {
            input,
            model_dir,
            columns,
            json,
        } => cli::predict::handle_predict_command(&config, input, model_dir, columns, json),

        cli::Commands::Filter {
            model_dir,
            stem,
            columns,
            filters,
            intervals,
            level,
            readable,
        } => cli::filter::handle_filter_command(
            &config,
            cli::filter::FilterArgs {
                model_dir,
                stem,
                columns,
                filters,
                intervals,
                level,
                readable,
            },
            cli.verbose,
            cli.quiet,
        ),

        cli::Commands::Rules {
            model_dir,
            stem,
            columns,
            intervals,
            level,
            limit,
            row,
        } => cli::rules::handle_rules_command(cli::rules::RulesArgs {
            model_dir,
            stem,
            columns,
            intervals,
            level,
            limit,
            row,
        }),
    }
}
