use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::json_store::JsonStore;
use crate::io::store::Tables;
use crate::io::workspace_io;
use crate::model::item::EntityKind;
use crate::ops::taxonomy;

const GUIDE_TOML_TEMPLATE: &str = r##"[guide]
name = {name}

[store]
# Table file, relative to this directory
data_file = "data.json"

[interaction]
# "fine" (mouse) waits long_press_ms before a held handle starts dragging;
# "coarse" (touch) starts at once
pointer = "fine"
long_press_ms = 200
# Cells the pointer may wander before a pending press counts as a scroll
move_threshold = 6

[log]
# tracing filter for the console log (guide/guide.log); GUIDE_LOG overrides
level = "info"

# --- UI Customization ---
# Uncomment and edit to override defaults.
#
# [ui.colors]
# background = "#0C001B"
# text = "#B0AAFF"
# text_bright = "#FFFFFF"
# highlight = "#FB4196"
# dim = "#7D78BF"
# red = "#FF4444"
# yellow = "#FFD700"
# green = "#44FF88"
# selection_bg = "#3D1438"
# drop_bg = "#14303D"
"##;

/// Sample taxonomy: (category, subcategories)
const SAMPLE: &[(&str, &[&str])] = &[
    ("Restaurantes", &["Pizzarias", "Cafeterias"]),
    ("Pousadas", &[]),
    ("Passeios", &[]),
    ("Lojas", &["Livrarias"]),
];

const SAMPLE_LOCATIONS: &[&str] = &["Centro", "Praia"];

/// Infer a guide name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// guide.toml for `name`, written as a TOML string so quotes and backslashes
/// survive.
fn render_guide_toml(name: &str) -> String {
    let quoted = toml::Value::String(name.to_string()).to_string();
    GUIDE_TOML_TEMPLATE.replace("{name}", &quoted)
}

fn seed_sample(store: &mut JsonStore) -> Result<(), taxonomy::TaxonomyError> {
    for (category, subcategories) in SAMPLE {
        let category = taxonomy::add(store, EntityKind::Category, category, None)?;
        for name in *subcategories {
            taxonomy::add(store, EntityKind::Subcategory, name, Some(&category.id))?;
        }
    }
    for name in SAMPLE_LOCATIONS {
        taxonomy::add(store, EntityKind::Location, name, None)?;
    }
    Ok(())
}

/// Create `guide/` in `dir` (or the working directory).
pub fn cmd_init(args: InitArgs, dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let guide_dir = root.join("guide");

    if guide_dir.is_dir() && !args.force {
        return Err("guide already exists in ./guide/ (use --force to rewrite guide.toml)".into());
    }

    if let Some(parent) = root.parent()
        && let Ok(parent_root) = workspace_io::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent guide found at {}/",
            parent_root.join("guide").display()
        );
        eprintln!("Creating new guide in ./guide/");
    }

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string())
    });

    fs::create_dir_all(&guide_dir)?;
    fs::write(guide_dir.join("guide.toml"), render_guide_toml(&name))?;

    let data_path = guide_dir.join("data.json");
    if data_path.exists() {
        if args.sample {
            eprintln!("Note: data.json already exists, not adding sample data");
        }
    } else {
        let mut store = JsonStore::create(&data_path, Tables::empty())?;
        if args.sample {
            seed_sample(&mut store)?;
        }
    }

    println!("Initialized guide: {}", name);
    Ok(())
}
