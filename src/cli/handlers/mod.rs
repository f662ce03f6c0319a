mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::json_store::JsonStore;
use crate::io::lock::FileLock;
use crate::io::state::{read_undo, write_undo};
use crate::io::workspace_io;
use crate::model::item::{EntityKind, OrderedItem, Scope};
use crate::model::workspace::Workspace;
use crate::ops::reorder::{self, Applied, Direction, Extreme, ReorderError};
use crate::ops::undo::UndoBuffer;
use crate::ops::{scope, taxonomy, undo};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Where the command runs and how it prints
struct Ctx {
    start: Option<PathBuf>,
    json: bool,
}

/// A write session: the guide lock is held until this is dropped.
struct Session {
    workspace: Workspace,
    store: JsonStore,
    _lock: FileLock,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let start = match cli.guide_dir {
        Some(dir) => Some(
            std::fs::canonicalize(&dir)
                .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        ),
        None => None,
    };
    let ctx = Ctx {
        start,
        json: cli.json,
    };

    match cli.command {
        None => Err("no subcommand (try `gd --help`)".into()),
        Some(cmd) => match cmd {
            // Init is handled in main.rs before workspace discovery
            Commands::Init(args) => cmd_init(args, ctx.start.as_deref()),

            Commands::List(args) => cmd_list(&ctx, args),

            Commands::Add(args) => cmd_add(&ctx, args),
            Commands::Rename(args) => cmd_rename(&ctx, args),
            Commands::Hide(args) => cmd_set_hidden(&ctx, args, true),
            Commands::Show(args) => cmd_set_hidden(&ctx, args, false),
            Commands::Delete(args) => cmd_delete(&ctx, args),

            Commands::Reorder(args) => cmd_reorder(&ctx, args),
            Commands::Top(args) => cmd_extreme(&ctx, args, Extreme::Top),
            Commands::Bottom(args) => cmd_extreme(&ctx, args, Extreme::Bottom),
            Commands::Up(args) => cmd_swap(&ctx, args, Direction::Up),
            Commands::Down(args) => cmd_swap(&ctx, args, Direction::Down),
            Commands::Normalize(args) => cmd_normalize(&ctx, args),
            Commands::Undo(args) => cmd_undo(&ctx, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_workspace(ctx: &Ctx) -> Result<Workspace, Box<dyn std::error::Error>> {
    let start = match &ctx.start {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let root = workspace_io::discover_workspace(&start)?;
    Ok(workspace_io::load_workspace(&root)?)
}

fn open_store(workspace: &Workspace) -> Result<JsonStore, Box<dyn std::error::Error>> {
    Ok(JsonStore::open(&workspace.data_path())?)
}

/// Load the workspace and take the guide lock before reading the data file,
/// so the write starts from the latest contents.
fn begin_write(ctx: &Ctx) -> Result<Session, Box<dyn std::error::Error>> {
    let workspace = load_workspace(ctx)?;
    let lock = FileLock::acquire_default(&workspace.guide_dir)?;
    let store = open_store(&workspace)?;
    Ok(Session {
        workspace,
        store,
        _lock: lock,
    })
}

fn print_json<T: Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_applied(ctx: &Ctx, kind: EntityKind, applied: &Applied) -> CmdResult {
    if ctx.json {
        return print_json(&applied_to_json(kind, applied));
    }
    for line in format_applied(applied) {
        println!("{}", line);
    }
    Ok(())
}

/// Run a reorder with the persisted undo slot, saving the slot back even when
/// a write fails partway (the snapshot is taken before the first write). A
/// partial failure prints the order the store now holds to stderr.
fn with_undo<T>(
    guide_dir: &Path,
    f: impl FnOnce(&mut UndoBuffer) -> Result<T, ReorderError>,
) -> Result<T, Box<dyn std::error::Error>> {
    let mut buffer = read_undo(guide_dir);
    let result = f(&mut buffer);
    write_undo(guide_dir, &buffer)?;
    if let Err(e) = &result {
        for line in format_partial(e) {
            eprintln!("{}", line);
        }
    }
    Ok(result?)
}

/// The scope `id` lives in, or `None` when there is no such item.
fn scope_of(
    store: &JsonStore,
    kind: EntityKind,
    id: &str,
) -> Result<Option<Scope>, Box<dyn std::error::Error>> {
    Ok(scope::find_item(store, kind, id)?.map(|item| Scope::of(kind, &item)))
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Ctx, args: ListArgs) -> CmdResult {
    let workspace = load_workspace(ctx)?;
    let store = open_store(&workspace)?;

    let visible = |items: Vec<OrderedItem>| -> Vec<OrderedItem> {
        items
            .into_iter()
            .filter(|item| args.all || !item.hidden)
            .collect()
    };

    // (header, items) per scope, in display order
    let mut groups: Vec<(Option<String>, Vec<OrderedItem>)> = Vec::new();
    match (&args.category, args.kind) {
        (Some(category), EntityKind::Subcategory) => {
            groups.push((None, visible(scope::fetch_scope(&store, &Scope::within(category))?)));
        }
        (_, EntityKind::Subcategory) => {
            let categories = scope::fetch_kind(&store, EntityKind::Category)?;
            let mut by_scope =
                scope::group_by_scope(EntityKind::Subcategory, scope::fetch_kind(&store, args.kind)?);
            for category in &categories {
                if let Some(items) = by_scope.shift_remove(&Some(category.id.clone())) {
                    let header = format_scope_header(Some(category), &category.id);
                    groups.push((Some(header), visible(items)));
                }
            }
            for (key, items) in by_scope {
                let key = key.unwrap_or_default();
                groups.push((Some(format_scope_header(None, &key)), visible(items)));
            }
        }
        (_, kind) => {
            groups.push((None, visible(scope::fetch_scope(&store, &Scope::global(kind))?)));
        }
    }

    if ctx.json {
        let mut items = Vec::new();
        for (_, group) in &groups {
            for item in group {
                let usage = taxonomy::usage(&store, args.kind, &item.id)?;
                items.push(item_to_json(item, Some(usage)));
            }
        }
        return print_json(&ListJson {
            kind: args.kind,
            items,
        });
    }

    for (i, (header, items)) in groups.iter().enumerate() {
        if let Some(header) = header {
            if i > 0 {
                println!();
            }
            println!("{}", header);
        }
        for item in items {
            println!("{}", format_item_line(item));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Ctx, args: AddArgs) -> CmdResult {
    let mut session = begin_write(ctx)?;
    let item = taxonomy::add(
        &mut session.store,
        args.kind,
        &args.name,
        args.category.as_deref(),
    )?;
    if ctx.json {
        return print_json(&item_to_json(&item, None));
    }
    println!("{}", item.id);
    Ok(())
}

fn cmd_rename(ctx: &Ctx, args: RenameArgs) -> CmdResult {
    let mut session = begin_write(ctx)?;
    taxonomy::rename(&mut session.store, args.kind, &args.id, &args.name)?;
    Ok(())
}

fn cmd_set_hidden(ctx: &Ctx, args: ItemArgs, hidden: bool) -> CmdResult {
    let mut session = begin_write(ctx)?;
    taxonomy::set_hidden(&mut session.store, args.kind, &args.id, hidden)?;
    Ok(())
}

fn cmd_delete(ctx: &Ctx, args: ItemArgs) -> CmdResult {
    let mut session = begin_write(ctx)?;
    taxonomy::delete(&mut session.store, args.kind, &args.id)?;
    Ok(())
}

fn cmd_reorder(ctx: &Ctx, args: ReorderArgs) -> CmdResult {
    let mut session = begin_write(ctx)?;
    let store = &mut session.store;
    let applied = with_undo(&session.workspace.guide_dir, |buffer| {
        reorder::reorder_by_id(store, buffer, args.kind, &args.source, &args.target)
    })?;
    match applied {
        Some(applied) => print_applied(ctx, args.kind, &applied),
        None => Ok(()),
    }
}

fn cmd_extreme(ctx: &Ctx, args: ItemArgs, extreme: Extreme) -> CmdResult {
    let mut session = begin_write(ctx)?;
    let Some(scope) = scope_of(&session.store, args.kind, &args.id)? else {
        return Ok(());
    };
    match reorder::move_to_extreme(&mut session.store, &scope, &args.id, extreme)? {
        Some(applied) => print_applied(ctx, args.kind, &applied),
        None => Ok(()),
    }
}

fn cmd_swap(ctx: &Ctx, args: ItemArgs, direction: Direction) -> CmdResult {
    let mut session = begin_write(ctx)?;
    let Some(scope) = scope_of(&session.store, args.kind, &args.id)? else {
        return Ok(());
    };
    match reorder::swap_with_neighbor(&mut session.store, &scope, &args.id, direction)? {
        Some(applied) => print_applied(ctx, args.kind, &applied),
        None => Ok(()),
    }
}

fn cmd_normalize(ctx: &Ctx, args: KindArgs) -> CmdResult {
    let mut session = begin_write(ctx)?;
    let writes = reorder::normalize_kind(&mut session.store, args.kind)?;
    if ctx.json {
        return print_json(&serde_json::json!({ "kind": args.kind, "writes": writes }));
    }
    println!("renumbered {} {}", writes, if writes == 1 { "row" } else { "rows" });
    Ok(())
}

fn cmd_undo(ctx: &Ctx, args: KindArgs) -> CmdResult {
    let mut session = begin_write(ctx)?;
    let store = &mut session.store;
    let applied = with_undo(&session.workspace.guide_dir, |buffer| {
        undo::undo(store, buffer, args.kind)
    })?;
    match applied {
        Some(applied) => print_applied(ctx, args.kind, &applied),
        None => {
            if !ctx.json {
                println!("nothing to undo for {}", args.kind.plural());
            }
            Ok(())
        }
    }
}
