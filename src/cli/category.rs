//! Category CLI commands

use clap::Subcommand;

use crate::cli::AppContext;
use crate::display::{format_category_details, format_category_list};
use crate::error::HearthResult;
use crate::services::CategoryChanges;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Create a new category
    Add {
        /// Category name
        name: String,
        /// Hex color such as #4CAF50
        #[arg(short, long)]
        color: Option<String>,
        /// Icon name
        #[arg(short, long)]
        icon: Option<String>,
    },

    /// List categories
    List {
        /// Include archived categories
        #[arg(short, long)]
        all: bool,
    },

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
    },

    /// Rename or restyle a category
    Edit {
        /// Category name or ID
        category: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New color
        #[arg(short, long)]
        color: Option<String>,
        /// New icon
        #[arg(short, long)]
        icon: Option<String>,
    },

    /// Hide a category from active listings
    Archive {
        /// Category name or ID
        category: String,
    },

    /// Restore an archived category
    Unarchive {
        /// Category name or ID
        category: String,
    },
}

/// Handle a category command
pub fn handle_category_command(ctx: &AppContext, cmd: CategoryCommands) -> HearthResult<()> {
    let service = ctx.categories();

    match cmd {
        CategoryCommands::Add { name, color, icon } => {
            let category = service.create(&name, color.as_deref(), icon.as_deref())?;
            println!("Created category: {}", category.name);
            println!("  ID: {}", category.id.key());
        }

        CategoryCommands::List { all } => {
            let categories = if all {
                service.list_all()?
            } else {
                service.list_active()?
            };
            println!("{}", format_category_list(&categories));
        }

        CategoryCommands::Show { category } => {
            let category = service.resolve(&category)?;
            print!("{}", format_category_details(&category));
        }

        CategoryCommands::Edit {
            category,
            name,
            color,
            icon,
        } => {
            let category = service.resolve(&category)?;

            if name.is_none() && color.is_none() && icon.is_none() {
                println!("No changes specified. Use --name, --color or --icon.");
                return Ok(());
            }

            let updated = service.update(
                category.id,
                CategoryChanges {
                    name: name.as_deref(),
                    color: color.as_deref(),
                    icon: icon.as_deref(),
                },
            )?;
            println!("Updated category: {}", updated.name);
        }

        CategoryCommands::Archive { category } => {
            let category = service.resolve(&category)?;
            let archived = service.archive(category.id)?;
            println!("Archived category: {}", archived.name);
        }

        CategoryCommands::Unarchive { category } => {
            let category = service.resolve(&category)?;
            let restored = service.unarchive(category.id)?;
            println!("Restored category: {}", restored.name);
        }
    }

    Ok(())
}
