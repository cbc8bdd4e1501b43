use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use tracing::{info, info_span};

use carconf_catalog::Catalog;
use carconf_cli::session::replay;
use carconf_cli::summary::{batch_table, categories_table, configuration_table, explain_table};
use carconf_engine::{
    BatchDimensions, BatchItem, Configuration, Configurator, enumerate_batch, image_query,
};
use carconf_model::{Camera, EngineOptions};

use crate::cli::{BatchArgs, SelectionArgs};

/// What every command needs: the catalog, engine options and output mode.
pub struct Session {
    pub catalog: Catalog,
    pub options: EngineOptions,
    pub json: bool,
}

impl Session {
    fn configurator(&self) -> Configurator<'_> {
        Configurator::new(&self.catalog).with_options(self.options.clone())
    }

    fn replay(&self, args: &SelectionArgs) -> Result<Configuration> {
        let span = info_span!("replay", selections = args.set.len());
        let _guard = span.enter();
        replay(&self.configurator(), &args.set, &args.deselect, args.pick)
    }
}

pub fn run_defaults(session: &Session) -> Result<()> {
    let configuration = session.configurator().apply_defaults();
    print_configuration(session, &configuration)
}

pub fn run_select(session: &Session, args: &SelectionArgs) -> Result<()> {
    let configuration = session.replay(args)?;
    print_configuration(session, &configuration)
}

pub fn run_categories(session: &Session, args: &SelectionArgs) -> Result<()> {
    let configuration = session.replay(args)?;
    if session.json {
        let locked = configuration.tree.locked_categories(false);
        let value = json!({
            "options": configuration.options,
            "locked": locked,
            "hidden": configuration.hidden_codes(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    println!("{}", categories_table(&session.catalog, &configuration));
    Ok(())
}

pub fn run_explain(session: &Session, args: &SelectionArgs) -> Result<()> {
    let configuration = session.replay(args)?;
    let reverse = session.configurator().explain(&configuration);
    if session.json {
        println!("{}", serde_json::to_string_pretty(&reverse)?);
        return Ok(());
    }
    if reverse.activated.is_empty() && reverse.disabled.is_empty() {
        println!("Every value was selected directly.");
        return Ok(());
    }
    println!("{}", explain_table(&reverse));
    Ok(())
}

pub fn run_batch(session: &Session, args: &BatchArgs) -> Result<()> {
    let catalog = &session.catalog;
    let configuration = session.replay(&args.selection)?;
    let camera = start_camera(catalog, args.camera.as_deref())?;
    let dims = BatchDimensions {
        trims: args.all_trims,
        drivetrains: args.all_drivetrains,
        bodystyles: args.all_bodystyles,
        colors: args.all_colors,
        color_themes: args.all_themes,
        exterior_cameras: args.exterior,
        interior_cameras: args.interior,
    };

    let span = info_span!("batch", style = %configuration.options.style_key());
    let _guard = span.enter();

    let progress = if session.json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    progress.set_style(ProgressStyle::with_template("{spinner} {pos} items {wide_msg}")?);

    let items: Vec<BatchItem> = enumerate_batch(catalog, &configuration, &camera, dims)
        .take(args.limit.unwrap_or(usize::MAX))
        .inspect(|item| {
            progress.inc(1);
            progress.set_message(item.file_stem.clone());
        })
        .collect();
    progress.finish_and_clear();
    info!(items = items.len(), "batch enumerated");

    if session.json {
        let value: Vec<_> = items
            .iter()
            .map(|item| {
                json!({
                    "file": item.file_stem,
                    "query": image_query(&item.code_list, &item.camera, &args.settings),
                    "camera": item.camera,
                    "options": item.options,
                    "standardParts": item.standard_parts,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    println!("{}", batch_table(&items, &args.settings));
    Ok(())
}

fn start_camera(catalog: &Catalog, code: Option<&str>) -> Result<Camera> {
    let camera = match code {
        Some(code) => catalog
            .cameras()
            .iter()
            .find(|camera| camera.code == code)
            .with_context(|| format!("camera {code} not found in catalog"))?,
        None => catalog
            .cameras()
            .first()
            .context("catalog defines no cameras")?,
    };
    Ok(camera.clone())
}

fn print_configuration(session: &Session, configuration: &Configuration) -> Result<()> {
    if session.json {
        println!("{}", serde_json::to_string_pretty(configuration)?);
        return Ok(());
    }
    println!("Style: {}", configuration.options.style_key());
    println!("{}", configuration_table(configuration));
    if !configuration.hidden_accessories.is_empty() {
        println!("Hidden: {}", configuration.hidden_accessories.join(", "));
    }
    Ok(())
}
