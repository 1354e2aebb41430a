// Grid Debug Binary - runs a schema and a record page through a GridView
// Run with: cargo run --bin grid_debug -- fields.json page.json [options]

use anyhow::{anyhow, bail, Context, Result};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use tracker_grid::config::Config;
use tracker_grid::grid::events::GridEvent;
use tracker_grid::persistence::LayoutStore;
use tracker_grid::utils::logging;
use tracker_grid::{Column, FilterDirective, GridView, Record, RecordPage, SortDirection, SortDirective};

const USAGE: &str = "\
Usage: grid_debug <fields.json> <page.json> [options]

Options:
  --view NAME            View name for saved layouts (default: debug)
  --load-layout          Restore the saved layout for the view
  --save-layout          Save the resulting layout for the view
  --sort FIELD[:desc]    Sort by a column
  --equals FIELD=VALUE   Exact filter (repeatable)
  --contains FIELD=TEXT  Substring filter (repeatable)
  --hide KEY             Hide a column (repeatable)
  --move FROM:TO         Move a visible column (repeatable)
  --logs                 Print captured log lines";

#[derive(Default)]
struct Args {
    fields: PathBuf,
    page: PathBuf,
    view: Option<String>,
    load_layout: bool,
    save_layout: bool,
    sort: Option<SortDirective>,
    filters: Vec<FilterDirective>,
    hide: Vec<String>,
    moves: Vec<(usize, usize)>,
    logs: bool,
}

fn split_pair(value: &str, sep: char) -> Result<(&str, &str)> {
    value
        .split_once(sep)
        .ok_or_else(|| anyhow!("expected '{}' in '{}'", sep, value))
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut positional = Vec::new();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .ok_or_else(|| anyhow!("{} needs a value", name))
        };
        match arg.as_str() {
            "--view" => args.view = Some(value("--view")?),
            "--load-layout" => args.load_layout = true,
            "--save-layout" => args.save_layout = true,
            "--logs" => args.logs = true,
            "--sort" => {
                let spec = value("--sort")?;
                args.sort = Some(match spec.split_once(':') {
                    Some((field, "desc")) => SortDirective::new(field, SortDirection::Desc),
                    Some((field, _)) => SortDirective::new(field, SortDirection::Asc),
                    None => SortDirective::asc(spec.as_str()),
                });
            }
            "--equals" => {
                let spec = value("--equals")?;
                let (field, text) = split_pair(&spec, '=')?;
                args.filters.push(FilterDirective::equals(field, text));
            }
            "--contains" => {
                let spec = value("--contains")?;
                let (field, text) = split_pair(&spec, '=')?;
                args.filters.push(FilterDirective::contains(field, text));
            }
            "--hide" => args.hide.push(value("--hide")?),
            "--move" => {
                let spec = value("--move")?;
                let (from, to) = split_pair(&spec, ':')?;
                args.moves.push((from.parse()?, to.parse()?));
            }
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            other if other.starts_with("--") => bail!("unknown option {}\n\n{}", other, USAGE),
            _ => positional.push(PathBuf::from(&arg)),
        }
    }

    match positional.as_slice() {
        [fields, page] => {
            args.fields = fields.clone();
            args.page = page.clone();
            Ok(args)
        }
        _ => bail!("{}", USAGE),
    }
}

/// Accept either a full page object or a bare array of records
fn read_page(path: &Path) -> Result<RecordPage> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)?;
    match value {
        Value::Array(items) => {
            let items: Vec<Record> = items.into_iter().filter_map(Record::from_value).collect();
            Ok(RecordPage {
                page_index: 1,
                page_size: items.len().max(1),
                total_count: items.len(),
                items,
            })
        }
        other => Ok(serde_json::from_value(other)?),
    }
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Using default config: {:#}", e);
        Config::default()
    });
    let log_buffer = logging::init_tracing(&config.logging.filter);

    let view_name = args.view.clone().unwrap_or_else(|| "debug".to_string());
    let store = LayoutStore::default_location()?;

    let mut view = GridView::new(&view_name, vec![Column::new("actions", "Actions")], &config);
    let persist = config.columns.persist_layout;
    if (args.load_layout || args.save_layout) && !persist {
        eprintln!("persist_layout is off in config, ignoring layout options");
    }

    if args.load_layout && persist {
        if let Some(layout) = store.load(&view_name)? {
            view = view.with_layout(&layout);
        }
    }

    let fields_raw = fs::read_to_string(&args.fields)
        .with_context(|| format!("reading {}", args.fields.display()));
    view.apply_schema_result(fields_raw.and_then(|raw| Ok(serde_json::from_str(&raw)?)));

    for key in &args.hide {
        view.set_column_selected(key, false);
    }
    for &(from, to) in &args.moves {
        view.reorder_columns(from, to);
    }
    view.set_sort(args.sort.clone());
    for filter in args.filters.iter().cloned() {
        view.set_filter(filter);
    }

    let page = read_page(&args.page)?;
    view.change_page_size(page.page_size);
    let state = view.apply_page(page);

    let headers = view.headers();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|c| Cell::new(&c.title).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    let rows = view.rendered_rows();
    for row in &rows {
        table.add_row(row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>());
    }

    println!("{table}");
    println!(
        "{} rows shown | page {}/{} | {} total",
        rows.len(),
        state.current_page,
        state.total_pages,
        state.total_count
    );
    let sizes: Vec<String> = view.page_size_options().iter().map(|s| s.to_string()).collect();
    println!("page sizes: {}", sizes.join(" | "));

    for event in view.events().history() {
        if let GridEvent::Degraded(warning) = event {
            println!("warning: {}", warning);
        }
    }

    if args.save_layout && persist {
        store.save(&view_name, &view.layout())?;
    }

    if args.logs {
        for entry in log_buffer.get_recent(50) {
            println!("{}", entry.format_for_display());
        }
    }

    Ok(())
}
