mod cli;
mod prompts;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::collections::BTreeMap;

use needs_core::{
    row_col_maker, status_sorter, Builder, Field, HtmlBuilder, LoadStatus, Need, NeedsConfig,
    NeedsList, RefMode,
};

use crate::cli::{Cli, Command};
use crate::prompts::NeedInput;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let mut needs = NeedsList::new(config, &cli.outdir);

    match &cli.command {
        Command::Show => {
            show_registry(&mut needs)?;
        }
        Command::Add {
            release,
            id,
            title,
            need_type,
            type_name,
            description,
            status,
            tags,
            links,
            interactive,
        } => {
            let mut input = NeedInput {
                id: id.clone(),
                title: title.clone(),
                need_type: need_type.clone(),
                type_name: type_name.clone(),
                description: description.clone(),
                status: status.clone(),
                tags: tags.clone(),
                links: links.clone(),
            };
            // Default to interactive mode if the required fields are missing
            if *interactive || input.id.is_none() || input.title.is_none() {
                prompts::prompt_missing_fields(&mut input)?;
            }
            add_need(&mut needs, release, input)?;
        }
        Command::Wipe { release } => {
            wipe_version(&mut needs, release)?;
        }
        Command::Table {
            release,
            fields,
            from,
            docname,
            html,
        } => {
            print_table(
                &mut needs,
                release.as_deref(),
                fields,
                from,
                docname.as_deref(),
                *html,
            )?;
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<NeedsConfig> {
    let mut config = match &cli.config {
        Some(path) => NeedsConfig::load(path)?,
        None => NeedsConfig::default(),
    };
    if let Some(project) = &cli.project {
        config.project = project.clone();
    }
    if let Some(version) = &cli.current_version {
        config.version = version.clone();
    }
    Ok(config)
}

/// Loads `<outdir>/needs.json` into `needs`; returns false when there is nothing to load
fn load_existing(needs: &mut NeedsList) -> bool {
    let path = needs.default_output_path();
    needs.load_json(Some(&path)) == LoadStatus::Loaded
}

/// Loads `<outdir>/needs.json` before it is rewritten.
///
/// A file that exists but cannot be loaded is never overwritten. Project and
/// current version fall back to the file's values when not configured.
fn load_for_update(needs: &mut NeedsList) -> Result<()> {
    let path = needs.default_output_path();
    match needs.load_json(Some(&path)) {
        LoadStatus::Loaded => needs.inherit_unset_identity(),
        LoadStatus::Missing => {}
        LoadStatus::Unreadable | LoadStatus::Invalid => {
            anyhow::bail!(
                "Refusing to overwrite {}: the existing file could not be loaded",
                path.display()
            );
        }
    }
    Ok(())
}

fn show_registry(needs: &mut NeedsList) -> Result<()> {
    if !load_existing(needs) {
        println!(
            "{}",
            format!("No needs registry found in {}", needs.outdir().display()).yellow()
        );
        return Ok(());
    }

    let registry = needs.registry();
    println!("{} {}", "Project:".bold(), registry.project);
    println!("{} {}", "Current version:".bold(), registry.current_version);
    println!("{} {}", "Created:".bold(), registry.created);
    println!("{} {}", "Total needs:".bold(), registry.total_needs());
    println!();

    if registry.versions.is_empty() {
        println!("{}", "No versions recorded.".yellow());
        return Ok(());
    }

    println!("{:<15} | {:<8} | {:<26}", "Version", "Needs", "Created");
    println!("{}", "-".repeat(55));
    for (label, bucket) in &registry.versions {
        let label = if *label == registry.current_version {
            label.green().to_string()
        } else {
            label.clone()
        };
        println!(
            "{:<15} | {:<8} | {:<26}",
            label, bucket.needs_amount, bucket.created
        );
    }

    Ok(())
}

fn add_need(needs: &mut NeedsList, version: &str, input: NeedInput) -> Result<()> {
    load_for_update(needs)?;

    let id = input.id.context("A need id is required")?;
    let title = input.title.context("A need title is required")?;
    let need_type = input.need_type.unwrap_or_else(|| "req".to_string());

    needs.add_need(
        version,
        &title,
        &id,
        &need_type,
        input.type_name.as_deref(),
        input.description.as_deref(),
        input.status.as_deref(),
        input.tags.as_deref().map(split_list),
        input.links.as_deref().map(split_list),
    );
    let path = needs.write_json(None)?;

    println!(
        "{} {} to version {} in {}",
        "Added".green(),
        id.bold(),
        version,
        path.display()
    );
    Ok(())
}

fn wipe_version(needs: &mut NeedsList, release: &str) -> Result<()> {
    load_for_update(needs)?;

    if needs.version(release).is_none() {
        println!("{}", format!("Version {} not found.", release).yellow());
        return Ok(());
    }

    needs.wipe_version(release);
    let path = needs.write_json(None)?;
    println!(
        "{} version {} from {}",
        "Wiped".green(),
        release.bold(),
        path.display()
    );
    Ok(())
}

fn print_table(
    needs: &mut NeedsList,
    release: Option<&str>,
    fields: &str,
    from: &str,
    docname: Option<&str>,
    html: bool,
) -> Result<()> {
    if !load_existing(needs) {
        println!(
            "{}",
            format!("No needs registry found in {}", needs.outdir().display()).yellow()
        );
        return Ok(());
    }

    let version = release
        .map(str::to_string)
        .unwrap_or_else(|| needs.registry().current_version.clone());
    let Some(version_needs) = needs.needs(&version) else {
        println!("{}", format!("Version {} not found.", version).yellow());
        return Ok(());
    };

    let fields = split_list(fields)
        .iter()
        .map(|name| name.parse::<Field>())
        .collect::<Result<Vec<_>, _>>()?;

    let all_needs: BTreeMap<String, Need> = version_needs
        .iter()
        .map(|(id, need)| {
            let mut need = need.clone();
            if need.docname.is_none() {
                need.docname = docname.map(str::to_string);
            }
            (id.clone(), need)
        })
        .collect();

    let builder = HtmlBuilder::new();
    if html {
        println!("{}", render_html_table(&builder, from, &all_needs, &fields));
    } else {
        print_plain_table(&builder, from, &all_needs, &fields);
    }
    Ok(())
}

/// Column rendering mode: ids link to their own anchor, links to the linked need
fn ref_mode(field: Field) -> RefMode {
    match field {
        Field::Id => RefMode::SelfReference,
        Field::Links => RefMode::LookupReference,
        _ => RefMode::PlainText,
    }
}

fn sorted_needs(all_needs: &BTreeMap<String, Need>) -> Vec<&Need> {
    let mut rows: Vec<&Need> = all_needs.values().collect();
    rows.sort_by(|a, b| status_sorter(a).cmp(status_sorter(b)));
    rows
}

fn render_html_table(
    builder: &dyn Builder,
    from: &str,
    all_needs: &BTreeMap<String, Need>,
    fields: &[Field],
) -> String {
    let mut html = String::from("<table class=\"needs_table\">\n<thead><tr>");
    for field in fields {
        html.push_str(&format!("<th>{}</th>", field));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for need in sorted_needs(all_needs) {
        html.push_str("<tr>");
        for field in fields {
            let cell = row_col_maker(builder, from, all_needs, need, *field, ref_mode(*field));
            html.push_str(&cell.to_html());
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>");
    html
}

fn print_plain_table(
    builder: &dyn Builder,
    from: &str,
    all_needs: &BTreeMap<String, Need>,
    fields: &[Field],
) {
    if all_needs.is_empty() {
        println!("{}", "No needs found.".yellow());
        return;
    }

    let header: Vec<String> = fields
        .iter()
        .map(|f| format!("{:<20}", f.as_str().to_uppercase()))
        .collect();
    println!("{}", header.join(" | ").bold());
    println!("{}", "-".repeat(23 * fields.len()));

    for need in sorted_needs(all_needs) {
        let cells: Vec<String> = fields
            .iter()
            .map(|field| {
                let cell = row_col_maker(builder, from, all_needs, need, *field, ref_mode(*field));
                format!("{:<20}", cell.to_plain_text())
            })
            .collect();
        println!("{}", cells.join(" | "));
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
