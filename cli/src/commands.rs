use std::io::Write;
use std::path::{Path, PathBuf};

use dynbody_core::distribution::Distribution;
use dynbody_core::rules::ProfileList;
use dynbody_core::{
    AppConfigExt, Character, CharacterHost, FormId, ProfileKind, RecordingHost, Session, Sex,
};

use crate::CliContext;
use crate::scenario;

/// Parse `0x`-prefixed or bare hex form ids.
pub fn parse_form_id(s: &str) -> Result<FormId, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    FormId::from_str_radix(digits, 16).map_err(|e| format!("invalid form id '{s}': {e}"))
}

/// Split the context into the pieces most commands need at once.
fn parts(
    ctx: &mut CliContext,
) -> Result<(&mut Session, &[Character], &mut RecordingHost), String> {
    let CliContext {
        session,
        characters,
        host,
        ..
    } = ctx;
    let session = session
        .as_mut()
        .ok_or_else(|| "no session: set a data root first".to_string())?;
    Ok((session, characters.as_slice(), host))
}

/// Characters addressed by a command: one by id, or all loaded.
fn targets(characters: &[Character], id: Option<FormId>) -> Result<Vec<&Character>, String> {
    match id {
        Some(id) => characters
            .iter()
            .find(|c| c.form_id == id)
            .map(|c| vec![c])
            .ok_or_else(|| format!("no character {id:08X} loaded")),
        None if characters.is_empty() => Err("no characters loaded".to_string()),
        None => Ok(characters.iter().collect()),
    }
}

fn describe(distribution: &Distribution, actor: &Character, selected: &dynbody_core::ProfileArray) -> String {
    let slot = |kind| distribution.slot_name(selected, kind).unwrap_or("-");
    format!(
        "{:08X} {:<20} texture: {:<20} slider: {}",
        actor.form_id,
        actor.name,
        slot(ProfileKind::Texture),
        slot(ProfileKind::Slider)
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

pub fn show_config(ctx: &CliContext) -> Result<(), String> {
    let config = &ctx.config;
    if let Some(path) = dynbody_core::AppConfig::config_path() {
        println!("config file:  {}", path.display());
    }
    println!("data root:    {}", config.data_root.display());
    println!("textures:     {}", config.texture_dir().display());
    println!("sliders:      {}", config.slider_dir().display());
    println!("rules:        {}", config.rule_dir().display());
    println!("forms:        {}", config.forms_path().display());
    println!("cosave:       {}", config.cosave_file().display());
    println!("apply delay:  {}ms", config.apply_delay_ms);
    match config.rng_seed {
        Some(seed) => println!("rng seed:     {seed}"),
        None => println!("rng seed:     entropy"),
    }
    println!("session:      {}", if ctx.session.is_some() { "open" } else { "none" });
    Ok(())
}

pub fn set_data_root(ctx: &mut CliContext, path: &str) -> Result<(), String> {
    ctx.config.data_root = PathBuf::from(path);
    ctx.config.save().map_err(|e| e.to_string())?;
    ctx.reopen()?;
    println!("data root set to {path}");
    Ok(())
}

pub fn reload(ctx: &mut CliContext) -> Result<(), String> {
    ctx.reopen()?;
    let session = ctx.session_mut()?;
    let profiles = session.distribution.profiles();
    println!(
        "{} texture profiles, {} slider profiles, {} rules",
        profiles.len(ProfileKind::Texture),
        profiles.len(ProfileKind::Slider),
        session.distribution.rules().len()
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Inspection
// ─────────────────────────────────────────────────────────────────────────────

pub fn list_profiles(ctx: &mut CliContext, kind: Option<ProfileKind>) -> Result<(), String> {
    let session = ctx.session_mut()?;
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => ProfileKind::ALL.to_vec(),
    };
    for kind in kinds {
        println!("{kind} profiles:");
        session.distribution.for_each_profile(kind, |profile| {
            let marker = if profile.is_private() { " (private)" } else { "" };
            println!("  {}{}", profile.name(), marker);
        });
    }
    Ok(())
}

pub fn list_rules(ctx: &mut CliContext) -> Result<(), String> {
    let session = ctx.session_mut()?;
    let distribution = &session.distribution;
    if distribution.rules().is_empty() {
        println!("no rules loaded");
    }
    for rule in distribution.rules() {
        let c = &rule.conditions;
        println!(
            "{}: refs={} bases={} factions={} keywords={} races={}{}",
            rule.name,
            c.references.len(),
            c.actor_bases.len(),
            c.factions.len(),
            c.keywords.len(),
            c.races.len(),
            if c.wildcard { " wildcard" } else { "" }
        );
        for kind in ProfileKind::ALL {
            let list = match rule.profiles(kind) {
                ProfileList::Wildcard => "*".to_string(),
                ProfileList::Explicit(handles) => handles
                    .iter()
                    .filter_map(|&h| distribution.profiles().name_of(kind, h))
                    .collect::<Vec<_>>()
                    .join(", "),
            };
            println!("  {}: [{}]", kind.rule_key(), list);
        }
    }
    Ok(())
}

pub fn load_characters(ctx: &mut CliContext, path: &str) -> Result<(), String> {
    let session = ctx.session_mut()?;
    let characters = scenario::load_characters(Path::new(path), &session.forms)?;
    println!("loaded {} characters", characters.len());
    ctx.characters = characters;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Distribution
// ─────────────────────────────────────────────────────────────────────────────

pub fn select(ctx: &mut CliContext, id: Option<FormId>) -> Result<(), String> {
    let (session, characters, _) = parts(ctx)?;
    for actor in targets(characters, id)? {
        let selected = session.distribution.select_profiles(actor);
        println!("{}", describe(&session.distribution, actor, &selected));
    }
    Ok(())
}

pub fn apply(ctx: &mut CliContext, id: Option<FormId>) -> Result<(), String> {
    let (session, characters, host) = parts(ctx)?;
    for actor in targets(characters, id)? {
        host.clear();
        session.distribution.apply_profiles(actor, host);
        println!("{:08X}: {} host calls", actor.form_id, host.calls.len());
    }
    Ok(())
}

pub fn set_profile(
    ctx: &mut CliContext,
    id: FormId,
    kind: ProfileKind,
    name: &str,
) -> Result<(), String> {
    let (session, characters, host) = parts(ctx)?;
    let actor = targets(characters, Some(id))?[0];
    session
        .distribution
        .apply_profile_by_name(kind, actor, name, host)
        .map_err(|e| e.to_string())?;
    println!("{id:08X}: {kind} profile set to {name}");
    Ok(())
}

pub fn clear(ctx: &mut CliContext, id: FormId, exclude: bool) -> Result<(), String> {
    let session = ctx.session_mut()?;
    session.distribution.clear_profiles(id, exclude);
    if exclude {
        println!("{id:08X}: cleared and excluded");
    } else {
        println!("{id:08X}: cleared");
    }
    Ok(())
}

pub fn reset_model(ctx: &mut CliContext, id: FormId) -> Result<(), String> {
    let (_, characters, host) = parts(ctx)?;
    let actor = targets(characters, Some(id))?[0];
    host.reset_model(actor.form_id);
    println!("{id:08X}: model reset");
    Ok(())
}

pub fn character_creation(ctx: &mut CliContext, sex: Sex) -> Result<(), String> {
    let session = ctx.session_mut()?;
    session.distribution.observe_player_sex(sex);
    println!("character creation opened, player is {sex}");
    Ok(())
}

/// Simulate a model load: wait out the apply delay, then re-apply.
pub async fn model_loaded(ctx: &mut CliContext, id: FormId) -> Result<(), String> {
    ctx.character(id)?;
    if ctx.scheduler.on_model_loaded(id).is_none() {
        return Err("no async runtime".to_string());
    }
    println!("waiting {:?} for model to settle", ctx.scheduler.delay());
    let ready = ctx
        .scheduler
        .next_ready()
        .await
        .ok_or_else(|| "scheduler closed".to_string())?;
    apply(ctx, Some(ready))
}

// ─────────────────────────────────────────────────────────────────────────────
// Cosave
// ─────────────────────────────────────────────────────────────────────────────

pub fn save(ctx: &mut CliContext) -> Result<(), String> {
    let path = ctx.config.cosave_file();
    let session = ctx.session_mut()?;
    session.save_cosave().map_err(|e| e.to_string())?;
    println!(
        "saved {} selections to {}",
        session.distribution.cache_len(),
        path.display()
    );
    Ok(())
}

pub fn load(ctx: &mut CliContext) -> Result<(), String> {
    let session = ctx.session_mut()?;
    let found = session.load_cosave().map_err(|e| e.to_string())?;
    if found {
        println!("restored {} selections", session.distribution.cache_len());
    } else {
        println!("no cosave found");
    }
    Ok(())
}

pub fn exit() {
    // Best effort; we are quitting anyway.
    let _ = write!(std::io::stdout(), "quitting...");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_form_ids() {
        assert_eq!(parse_form_id("0x14"), Ok(0x14));
        assert_eq!(parse_form_id("0X0001A696"), Ok(0x1A696));
        assert_eq!(parse_form_id("ff000800"), Ok(0xFF00_0800));
        assert!(parse_form_id("0xZZ").is_err());
    }
}
