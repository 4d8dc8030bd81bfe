use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ifc_qto::export::{export_csv, export_json, write_table};
use ifc_qto::model::{Selection, SelectionArg, SelectionIds};
use ifc_qto::parser::load_ifc_file;
use ifc_qto::qto::{QtoEngine, Strategy};
use ifc_qto::ui::App;

#[derive(Parser, Debug)]
#[command(name = "ifc-qto")]
#[command(about = "IFC QTO - sum element quantities of IFC models over a selection")]
#[command(version)]
struct Args {
    /// Paths to IFC files; each becomes a model keyed by its file stem
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Elements to sum, as MODEL:ID[,ID...] or MODEL:* (repeatable)
    #[arg(long = "select", value_name = "MODEL:IDS")]
    selections: Vec<SelectionArg>,

    /// Aggregation strategy
    #[arg(long, value_enum, default_value_t = Strategy::Index)]
    strategy: Strategy,

    /// Export to CSV (optional output path)
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Export to JSON (optional output path)
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let interactive = args.selections.is_empty() && args.csv.is_none() && args.json.is_none();
    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    let mut engine = QtoEngine::new(args.strategy);
    for path in &args.files {
        let mut model = load_ifc_file(path)?;
        model.key = engine.unique_key(&model.key);
        engine.add_model(model);
    }

    if interactive {
        let terminal = ratatui::init();
        let result = App::new(engine).run(terminal);
        ratatui::restore();
        return result;
    }

    let selection = build_selection(&engine, &args.selections)?;
    let result = engine.on_highlight(&selection).clone();

    write_table(&result, engine.quantity_kinds(), std::io::stdout().lock())?;

    if let Some(csv_path) = &args.csv {
        export_csv(&result, engine.quantity_kinds(), csv_path)?;
        println!("Exported to CSV: {}", csv_path.display());
    }

    if let Some(json_path) = &args.json {
        export_json(&result, json_path)?;
        println!("Exported to JSON: {}", json_path.display());
    }

    Ok(())
}

/// Resolves `--select` arguments against the loaded models. Without any,
/// every element of every model is selected.
fn build_selection(engine: &QtoEngine, args: &[SelectionArg]) -> Result<Selection> {
    let mut selection = Selection::new();

    if args.is_empty() {
        for model in engine.models() {
            selection.extend(&model.key, model.element_ids());
        }
        return Ok(selection);
    }

    for arg in args {
        let model = engine
            .model(&arg.model)
            .ok_or_else(|| eyre!("no model named '{}' was loaded", arg.model))?;
        match &arg.ids {
            SelectionIds::All => selection.extend(&model.key, model.element_ids()),
            SelectionIds::Ids(ids) => selection.extend(&model.key, ids.iter().copied()),
        }
    }

    Ok(selection)
}
