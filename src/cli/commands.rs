use clap::{Args, Parser, Subcommand};

use crate::model::item::EntityKind;

#[derive(Parser)]
#[command(name = "gd", about = concat!("[≡] guide v", env!("CARGO_PKG_VERSION"), " - keep the directory in order"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different guide directory
    #[arg(short = 'C', long = "guide-dir", global = true)]
    pub guide_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new guide in the current directory
    Init(InitArgs),
    /// List one kind in display order
    List(ListArgs),
    /// Add an item at the bottom of its list
    Add(AddArgs),
    /// Rename an item
    Rename(RenameArgs),
    /// Hide an item from the public guide
    Hide(ItemArgs),
    /// Show a hidden item again
    Show(ItemArgs),
    /// Delete an item (fails while anything still references it)
    Delete(ItemArgs),
    /// Move SOURCE into TARGET's position within their shared list
    Reorder(ReorderArgs),
    /// Move an item to the top of its list
    Top(ItemArgs),
    /// Move an item to the bottom of its list
    Bottom(ItemArgs),
    /// Swap an item with the one above it
    Up(ItemArgs),
    /// Swap an item with the one below it
    Down(ItemArgs),
    /// Renumber every list of a kind to 0..n-1
    Normalize(KindArgs),
    /// Restore the order from before the last reorder of a kind
    Undo(KindArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Guide name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Seed a few categories and subcategories to try things out
    #[arg(long)]
    pub sample: bool,
    /// Reinitialize even if guide/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// category, subcategory or location
    pub kind: EntityKind,
    /// Only the subcategories of this category
    #[arg(long)]
    pub category: Option<String>,
    /// Include hidden items
    #[arg(long)]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct KindArgs {
    /// category, subcategory or location
    pub kind: EntityKind,
}

#[derive(Args)]
pub struct ItemArgs {
    /// category, subcategory or location
    pub kind: EntityKind,
    /// Item ID
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// category, subcategory or location
    pub kind: EntityKind,
    /// Display name
    pub name: String,
    /// Owning category (required for subcategories)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct RenameArgs {
    /// category, subcategory or location
    pub kind: EntityKind,
    /// Item ID
    pub id: String,
    /// New display name
    pub name: String,
}

#[derive(Args)]
pub struct ReorderArgs {
    /// category, subcategory or location
    pub kind: EntityKind,
    /// Item to move
    pub source: String,
    /// Item whose position it takes
    pub target: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn kind_aliases_parse() {
        let cli = Cli::try_parse_from(["gd", "reorder", "sub", "s2", "s1"]).unwrap();
        let Some(Commands::Reorder(args)) = cli.command else {
            panic!("expected reorder");
        };
        assert_eq!(args.kind, EntityKind::Subcategory);
        assert_eq!(args.source, "s2");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(Cli::try_parse_from(["gd", "list", "business"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gd", "list", "category", "--json", "-C", "/tmp/g"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.guide_dir.as_deref(), Some("/tmp/g"));
    }
}
