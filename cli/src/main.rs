use clap::{Parser, Subcommand, ValueEnum};
use dynbody_cli::commands::{self, parse_form_id};
use dynbody_cli::{CliContext, logging, readline};
use dynbody_core::{FormId, ProfileKind, Sex};
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();
    let mut ctx = CliContext::new();

    // One-shot mode: `dynbody select --id 0x14`
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 {
        let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
        run(cli, &mut ctx).await?;
        return Ok(());
    }

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &mut ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "Inspect and exercise dynbody profile rules")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Texture,
    Slider,
}

impl From<KindArg> for ProfileKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Texture => ProfileKind::Texture,
            KindArg::Slider => ProfileKind::Slider,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SexArg {
    Male,
    Female,
}

impl From<SexArg> for Sex {
    fn from(sex: SexArg) -> Self {
        match sex {
            SexArg::Male => Sex::Male,
            SexArg::Female => Sex::Female,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    Exit,
    Config,
    SetDataRoot {
        #[arg(short, long)]
        path: String,
    },
    Reload,
    Profiles {
        #[arg(short, long)]
        kind: Option<KindArg>,
    },
    Rules,
    Characters {
        #[arg(short, long)]
        path: String,
    },
    Select {
        #[arg(short, long, value_parser = parse_form_id)]
        id: Option<FormId>,
    },
    Apply {
        #[arg(short, long, value_parser = parse_form_id)]
        id: Option<FormId>,
    },
    SetProfile {
        #[arg(short, long, value_parser = parse_form_id)]
        id: FormId,
        #[arg(short, long)]
        kind: KindArg,
        #[arg(short, long)]
        name: String,
    },
    Clear {
        #[arg(short, long, value_parser = parse_form_id)]
        id: FormId,
        #[arg(short, long)]
        exclude: bool,
    },
    ResetModel {
        #[arg(short, long, value_parser = parse_form_id)]
        id: FormId,
    },
    ModelLoaded {
        #[arg(short, long, value_parser = parse_form_id)]
        id: FormId,
    },
    CharacterCreation {
        #[arg(short, long)]
        sex: SexArg,
    },
    Save,
    Load,
}

async fn respond(line: &str, ctx: &mut CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "dynbody".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;
    run(cli, ctx).await
}

async fn run(cli: Cli, ctx: &mut CliContext) -> Result<bool, String> {
    match cli.command {
        Some(Commands::Config) => commands::show_config(ctx)?,
        Some(Commands::SetDataRoot { path }) => commands::set_data_root(ctx, &path)?,
        Some(Commands::Reload) => commands::reload(ctx)?,
        Some(Commands::Profiles { kind }) => commands::list_profiles(ctx, kind.map(Into::into))?,
        Some(Commands::Rules) => commands::list_rules(ctx)?,
        Some(Commands::Characters { path }) => commands::load_characters(ctx, &path)?,
        Some(Commands::Select { id }) => commands::select(ctx, id)?,
        Some(Commands::Apply { id }) => commands::apply(ctx, id)?,
        Some(Commands::SetProfile { id, kind, name }) => {
            commands::set_profile(ctx, id, kind.into(), &name)?
        }
        Some(Commands::Clear { id, exclude }) => commands::clear(ctx, id, exclude)?,
        Some(Commands::ResetModel { id }) => commands::reset_model(ctx, id)?,
        Some(Commands::ModelLoaded { id }) => commands::model_loaded(ctx, id).await?,
        Some(Commands::CharacterCreation { sex }) => commands::character_creation(ctx, sex.into())?,
        Some(Commands::Save) => commands::save(ctx)?,
        Some(Commands::Load) => commands::load(ctx)?,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
