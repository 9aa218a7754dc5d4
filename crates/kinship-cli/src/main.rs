use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use kinship_core::{ConnectionDraft, ConnectionSource, Person, PersonId};
use kinship_graph::{
    Canvas, ConnectionSummary, HierarchyNode, LayoutKind, RelationshipLabel, build_hierarchy,
    calculate_generations, describe_for_viewpoint, generation_layers, layouter_for,
    summarize_connections,
};
use kinship_project::{FamilyProject, Settings};
use serde::Serialize;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Family file, or a directory holding kinship_family.json
    #[arg(short, long, default_value = ".")]
    file: PathBuf,

    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check stored connections for broken, stale or duplicate entries
    Validate,
    /// Generation number and color for every person
    Generations,
    /// Rooted tree containing every person once
    Hierarchy,
    /// Node positions and link routes
    Layout {
        #[arg(short, long)]
        engine: Option<LayoutKind>,
        #[arg(long)]
        width: Option<f32>,
        #[arg(long)]
        height: Option<f32>,
    },
    /// Every connection of one person, read from their side
    Describe {
        #[arg(short, long)]
        person: String,
    },
    /// Add a person to the family file
    AddPerson {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },
    /// Validate and store a new connection
    Connect {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long = "type")]
        relationship_type: String,
        #[arg(long = "attribute")]
        attributes: Vec<String>,
    },
}

#[derive(Serialize)]
struct GenerationRow<'a> {
    person_id: &'a PersonId,
    name: &'a str,
    generation: i32,
    color: String,
}

#[derive(Serialize)]
struct Description {
    person: PersonId,
    connections: Vec<RelationshipLabel>,
    summary: ConnectionSummary,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn find_person<'a>(project: &'a FamilyProject, id: &str) -> Result<&'a Person> {
    project
        .person(&PersonId::new(id))
        .with_context(|| format!("no person with id {id}"))
}

fn run_generations(project: &FamilyProject, settings: &Settings) -> Result<()> {
    let generations = calculate_generations(project.people(), project.connections());
    let rows: Vec<GenerationRow<'_>> = generation_layers(project.people(), &generations)
        .into_iter()
        .flat_map(|(generation, people)| {
            people.into_iter().map(move |person| GenerationRow {
                person_id: &person.id,
                name: &person.name,
                generation,
                color: settings.generation_color(generation),
            })
        })
        .collect();
    print_json(&rows)
}

fn run_layout(
    project: &FamilyProject,
    settings: &Settings,
    engine: Option<LayoutKind>,
    width: Option<f32>,
    height: Option<f32>,
) -> Result<()> {
    let kind = engine.unwrap_or(settings.default_layout);
    let canvas = Canvas::new(
        width.unwrap_or(settings.canvas.width),
        height.unwrap_or(settings.canvas.height),
    );
    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        bail!("canvas must have a positive size, got {}x{}", canvas.width, canvas.height);
    }
    let layouter = layouter_for(kind, &settings.layout_settings());
    tracing::debug!("Laying out with {} on {}x{}", layouter.name(), canvas.width, canvas.height);
    let layout = layouter.layout(project.people(), project.connections(), canvas);
    print_json(&layout)
}

fn run_describe(project: &FamilyProject, person: &str) -> Result<()> {
    let viewpoint = find_person(project, person)?;
    let directed = project.directed_connections(&viewpoint.id)?;
    let connections = directed
        .iter()
        .map(|d| describe_for_viewpoint(viewpoint, d, project.people()))
        .collect();
    let summary = summarize_connections(viewpoint, &directed, project.people());
    print_json(&Description {
        person: viewpoint.id.clone(),
        connections,
        summary,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let settings = Settings::load_or_default(args.config.as_deref())?;
    let mut project = FamilyProject::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;

    match args.command {
        Command::Validate => {
            let report = project.validate();
            print_json(&report)?;
            if !report.is_clean() {
                bail!("{} has problems", project.path.display());
            }
        }
        Command::Generations => run_generations(&project, &settings)?,
        Command::Hierarchy => {
            let tree: Option<HierarchyNode> =
                build_hierarchy(project.people(), project.connections());
            print_json(&tree)?;
        }
        Command::Layout {
            engine,
            width,
            height,
        } => run_layout(&project, &settings, engine, width, height)?,
        Command::Describe { person } => run_describe(&project, &person)?,
        Command::AddPerson { id, name } => {
            project.add_person(Person::new(id, name))?;
            project.save()?;
        }
        Command::Connect {
            from,
            to,
            relationship_type,
            attributes,
        } => {
            let tags: Vec<&str> = attributes.iter().map(String::as_str).collect();
            let draft = ConnectionDraft::new(&from, &to, &relationship_type).with_attributes(&tags);
            let stored = project.add_connection(&draft)?;
            project.save()?;
            print_json(&stored)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_every_subcommand_has_help() {
        let command = Args::command();
        for sub in command.get_subcommands() {
            assert!(sub.get_about().is_some(), "{} has no help line", sub.get_name());
        }
    }

    #[test]
    fn test_layout_flags_parse() {
        let args = Args::parse_from([
            "kinship", "--file", "family.json", "layout", "--engine", "radial", "--width", "640",
        ]);
        match args.command {
            Command::Layout { engine, width, height } => {
                assert_eq!(engine, Some(LayoutKind::Radial));
                assert_eq!(width, Some(640.0));
                assert_eq!(height, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_connect_collects_attributes() {
        let args = Args::parse_from([
            "kinship", "connect", "--from", "a", "--to", "b", "--type", "sibling", "--attribute",
            "half", "--attribute", "donor_sibling",
        ]);
        match args.command {
            Command::Connect { attributes, .. } => assert_eq!(attributes, vec!["half", "donor_sibling"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_describe_unknown_person_fails() {
        let dir = tempfile::tempdir().unwrap();
        let project = FamilyProject::open(dir.path()).unwrap();
        assert!(run_describe(&project, "ghost").is_err());
    }
}
