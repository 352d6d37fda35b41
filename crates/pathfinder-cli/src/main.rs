//! `pathfinder` command-line driver

mod app;
mod args;
mod logging;

use anyhow::Context;
use app::{run_step, App};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pathfinder_core::{
    FocusSelection, IdeasStep, PathfinderConfig, ReportStep, RoutePlanStep, SynthesisStep,
};
use pathfinder_profile::{Role, Typology, UserId};

fn user_arg() -> Arg {
    Arg::new("user")
        .long("user")
        .short('u')
        .required(true)
        .help("Profile owner id")
}

fn cli() -> Command {
    Command::new("pathfinder")
        .version(pathfinder_core::VERSION)
        .about("Personal-development profile enrichment")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("TOML configuration file"),
        )
        .subcommand(
            Command::new("init")
                .about("Create an empty profile")
                .arg(user_arg()),
        )
        .subcommand(
            Command::new("set-typology")
                .about("Set typology codes (omitted codes are kept)")
                .arg(user_arg())
                .arg(Arg::new("type").long("type").help("Enneagram type, e.g. 4"))
                .arg(Arg::new("wing").long("wing").help("Wing, e.g. 4w5"))
                .arg(Arg::new("subtype").long("subtype").help("Subtype, e.g. sx"))
                .arg(
                    Arg::new("stacking")
                        .long("stacking")
                        .help("Instinctual stacking, e.g. sx/sp"),
                )
                .arg(Arg::new("trifix").long("trifix").help("Tritype, e.g. 451")),
        )
        .subcommand(
            Command::new("set-planning")
                .about("Set route planner inputs")
                .arg(user_arg())
                .arg(
                    Arg::new("hours")
                        .long("hours")
                        .required(true)
                        .value_parser(value_parser!(f64))
                        .help("Hours available per week"),
                )
                .arg(
                    Arg::new("commitments")
                        .long("commitments")
                        .required(true)
                        .help("Existing commitments"),
                )
                .arg(
                    Arg::new("timeline")
                        .long("timeline")
                        .required(true)
                        .help("Target timeline"),
                ),
        )
        .subcommand(
            Command::new("add")
                .about("Append items to a list field")
                .arg(user_arg())
                .arg(
                    Arg::new("field")
                        .long("field")
                        .required(true)
                        .help("skills, passions, interests or career-ideas"),
                )
                .arg(
                    Arg::new("items")
                        .required(true)
                        .num_args(1..)
                        .action(ArgAction::Append)
                        .help("Items to add"),
                ),
        )
        .subcommand(
            Command::new("value")
                .about("Put a core value into a ranked slot")
                .arg(user_arg())
                .arg(
                    Arg::new("rank")
                        .long("rank")
                        .required(true)
                        .value_parser(value_parser!(u8).range(1..=5))
                        .help("Slot rank, 1 to 5"),
                )
                .arg(Arg::new("value").required(true).help("Core value")),
        )
        .subcommand(
            Command::new("quiz")
                .about("Score the role clarity quiz")
                .arg(user_arg())
                .arg(
                    Arg::new("ratings")
                        .long("ratings")
                        .required(true)
                        .help("Ten ratings from 0 to 10, comma separated"),
                ),
        )
        .subcommand(
            Command::new("role")
                .about("Add a past role")
                .arg(user_arg())
                .arg(Arg::new("title").long("title").required(true))
                .arg(Arg::new("organization").long("organization").required(true))
                .arg(Arg::new("duration").long("duration").required(true))
                .arg(
                    Arg::new("level")
                        .long("level")
                        .default_value("5")
                        .value_parser(value_parser!(u8))
                        .help("Enjoyment from 0 to 10"),
                ),
        )
        .subcommand(
            Command::new("purpose")
                .about("Set the purpose text")
                .arg(user_arg())
                .arg(Arg::new("text").required(true)),
        )
        .subcommand(
            Command::new("complete")
                .about("Mark a wizard stage complete")
                .arg(user_arg())
                .arg(
                    Arg::new("milestone")
                        .required(true)
                        .help("driver, destination or route"),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Generate the life-purpose report")
                .arg(user_arg()),
        )
        .subcommand(
            Command::new("ideas")
                .about("Generate career ideas")
                .arg(user_arg()),
        )
        .subcommand(
            Command::new("synthesize")
                .about("Generate text for a focus area")
                .arg(user_arg())
                .arg(
                    Arg::new("focus")
                        .long("focus")
                        .required(true)
                        .help("career, contribution or calling"),
                ),
        )
        .subcommand(
            Command::new("plan")
                .about("Generate the route plan")
                .arg(user_arg()),
        )
        .subcommand(
            Command::new("show")
                .about("Print the stored profile")
                .arg(user_arg())
                .arg(
                    Arg::new("report")
                        .long("report")
                        .action(ArgAction::SetTrue)
                        .help("Print the current report instead"),
                ),
        )
}

fn load_config(path: Option<&String>) -> anyhow::Result<PathfinderConfig> {
    let config = match path {
        Some(path) => PathfinderConfig::load(path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => PathfinderConfig::default(),
    };
    let config = config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn user(args: &ArgMatches) -> anyhow::Result<UserId> {
    let raw = args
        .get_one::<String>("user")
        .context("--user is required")?;
    Ok(UserId::new(raw.as_str())?)
}

fn opt(args: &ArgMatches, name: &str) -> Option<String> {
    args.get_one::<String>(name).cloned()
}

fn required(args: &ArgMatches, name: &str) -> anyhow::Result<String> {
    opt(args, name).with_context(|| format!("missing <{name}>"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let config = load_config(matches.get_one::<String>("config"))?;
    logging::init(&config.logging);

    let app = App::open(config).await?;
    let Some((name, args)) = matches.subcommand() else {
        return Ok(());
    };
    let user = user(args)?;
    let editor = app.editor();

    match name {
        "init" => {
            let profile = editor.ensure_profile(&user).await?;
            println!("Profile {} at {}", user, profile.revision);
        }
        "set-typology" => {
            let typology = Typology {
                enneagram_type: opt(args, "type"),
                wing: opt(args, "wing"),
                subtype: opt(args, "subtype"),
                instinctual_stacking: opt(args, "stacking"),
                trifix: opt(args, "trifix"),
            };
            editor.ensure_profile(&user).await?;
            editor.set_typology(&user, typology).await?;
            match editor.archetype_code(&user).await? {
                Some(code) => println!("{code}"),
                None => println!("Typology saved; some codes are still missing"),
            }
        }
        "set-planning" => {
            let hours = *args.get_one::<f64>("hours").context("missing --hours")?;
            editor.ensure_profile(&user).await?;
            editor
                .set_planning_inputs(
                    &user,
                    hours,
                    &required(args, "commitments")?,
                    &required(args, "timeline")?,
                )
                .await?;
            println!("Planning inputs saved");
        }
        "add" => {
            let field = args::parse_list_field(&required(args, "field")?)?;
            let items: Vec<String> = args
                .get_many::<String>("items")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            editor.ensure_profile(&user).await?;
            editor.add_list_items(&user, field, items).await?;
            let profile = app.store.get(&user).await?;
            println!("{}", profile.list(field).join("\n"));
        }
        "value" => {
            let rank = *args.get_one::<u8>("rank").context("missing --rank")?;
            editor.ensure_profile(&user).await?;
            editor
                .assign_core_value(&user, usize::from(rank - 1), &required(args, "value")?)
                .await?;
            let profile = app.store.get(&user).await?;
            for (i, value) in profile.core_values.values().enumerate() {
                println!("{}. {}", i + 1, value);
            }
        }
        "quiz" => {
            let ratings = args::parse_ratings(&required(args, "ratings")?)?;
            editor.ensure_profile(&user).await?;
            let score = editor.record_quiz(&user, &ratings).await?;
            println!("Role clarity: {score}%");
        }
        "role" => {
            let level = *args.get_one::<u8>("level").context("missing --level")?;
            let role = Role::new(
                required(args, "title")?,
                required(args, "organization")?,
                required(args, "duration")?,
                level,
            );
            let ids = editor.upsert_roles(&user, vec![role]).await?;
            for id in ids {
                println!("{id}");
            }
        }
        "purpose" => {
            editor.ensure_profile(&user).await?;
            editor
                .set_purpose_profile(&user, &required(args, "text")?)
                .await?;
            println!("Purpose saved");
        }
        "complete" => {
            let milestone = args::parse_milestone(&required(args, "milestone")?)?;
            editor.ensure_profile(&user).await?;
            editor.mark_completed(&user, milestone).await?;
            println!("Marked {milestone:?} complete");
        }
        "report" => {
            let pipeline = app.pipeline()?;
            match run_step(&pipeline, &ReportStep, &user, ()).await? {
                Some(generated) => println!("{}\n\n{}", generated.archetype, generated.report),
                None => println!("Report saved"),
            }
        }
        "ideas" => {
            let pipeline = app.pipeline()?;
            let step = IdeasStep::from_config(&app.config.pipeline);
            print_ideas(run_step(&pipeline, &step, &user, ()).await?);
        }
        "synthesize" => {
            let pipeline = app.pipeline()?;
            match FocusSelection::parse(&required(args, "focus")?)? {
                FocusSelection::Career => {
                    let step = IdeasStep::from_config(&app.config.pipeline);
                    print_ideas(run_step(&pipeline, &step, &user, ()).await?);
                }
                FocusSelection::Synthesis(area) => {
                    match run_step(&pipeline, &SynthesisStep, &user, area).await? {
                        Some(text) => println!("{}", text.text),
                        None => println!("{area} text saved"),
                    }
                }
            }
        }
        "plan" => {
            let pipeline = app.pipeline()?;
            match run_step(&pipeline, &RoutePlanStep, &user, ()).await? {
                Some(plan) => println!("{plan}"),
                None => println!("Route plan saved"),
            }
        }
        "show" => {
            let profile = app.store.get(&user).await?;
            if args.get_flag("report") {
                let id = profile
                    .life_purpose_report_id
                    .context("no report has been generated yet")?;
                let report = app.store.get_report(id).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            }
        }
        other => anyhow::bail!("unknown command {other}"),
    }

    Ok(())
}

fn print_ideas(ideas: Option<Vec<String>>) {
    match ideas {
        Some(ideas) => {
            for idea in ideas {
                println!("- {idea}");
            }
        }
        None => println!("Career ideas saved"),
    }
}
