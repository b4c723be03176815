//! CLI parser and dispatch.
//!
//! Every mutating command runs the same lifecycle: load the hierarchy from
//! the store, mutate it in memory, save it back. The registry in memory is
//! the source of truth for exactly the span of one command.

mod commands;
mod helpers;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::Settings;
use crate::registry::FolderPath;

#[derive(Parser)]
#[command(name = "docreg")]
#[command(about = "Organizational document registry")]
#[command(version)]
pub struct Cli {
    /// Data directory (overrides the default location)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Manage folders
    Folder {
        #[command(subcommand)]
        command: FolderCommands,
    },

    /// Manage documents
    Doc {
        #[command(subcommand)]
        command: DocCommands,
    },

    /// Manage file attachments
    Attach {
        #[command(subcommand)]
        command: AttachCommands,
    },

    /// Search documents by text or date range
    Search {
        /// Field to search
        #[arg(short, long, value_enum, default_value_t = SearchFieldArg::All)]
        field: SearchFieldArg,
        /// Text to look for (text fields)
        #[arg(short, long)]
        text: Option<String>,
        /// Range start, dd.mm.yyyy (date fields; open when omitted)
        #[arg(long)]
        from: Option<String>,
        /// Range end, dd.mm.yyyy (date fields; open when omitted)
        #[arg(long)]
        to: Option<String>,
    },

    /// List contracts expiring within a threshold
    Expiring {
        /// Threshold in days (defaults to the configured value)
        #[arg(short, long)]
        days: Option<i64>,
    },

    /// Export a folder's documents to a CSV file
    Export {
        /// Folder path (FOLDER or FOLDER/SUBFOLDER)
        path: FolderPath,
        /// Output file
        output: PathBuf,
    },

    /// Delete attachment files no document references
    Sweep,

    /// Show document counts per folder
    Status,
}

#[derive(Subcommand)]
enum FolderCommands {
    /// Create a folder, or a subfolder with --parent
    Add {
        name: String,
        /// Parent folder for a subfolder
        #[arg(short, long)]
        parent: Option<String>,
    },
    /// Delete an empty folder or subfolder
    Rm {
        /// Folder path (FOLDER or FOLDER/SUBFOLDER)
        path: FolderPath,
    },
    /// List folders with document counts
    List,
}

#[derive(Subcommand)]
enum DocCommands {
    /// Register a document in a folder
    Add {
        /// Target folder path
        path: FolderPath,
        #[arg(long, default_value = "")]
        number: String,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        counterparty: String,
        /// Start date, dd.mm.yyyy (today when omitted)
        #[arg(long)]
        start: Option<String>,
        /// End date, dd.mm.yyyy (open-ended when omitted)
        #[arg(long)]
        end: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Edit fields of a document by id
    Edit {
        id: i64,
        #[arg(long)]
        number: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        counterparty: Option<String>,
        /// New start date, dd.mm.yyyy (empty resets to today)
        #[arg(long)]
        start: Option<String>,
        /// New end date, dd.mm.yyyy (empty clears it)
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete a document and its attachment files
    Rm { id: i64 },
    /// Show a document's full record
    Show { id: i64 },
    /// List documents at a folder path
    List {
        /// Folder path (FOLDER or FOLDER/SUBFOLDER)
        path: FolderPath,
    },
}

#[derive(Subcommand)]
enum AttachCommands {
    /// Copy a file into the store and reference it from a document
    Add { id: i64, file: PathBuf },
    /// Drop a stored file from a document and delete it
    Rm { id: i64, filename: String },
    /// List a document's attachments
    List { id: i64 },
}

/// Searchable field selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum SearchFieldArg {
    All,
    Number,
    Name,
    Counterparty,
    Description,
    StartDate,
    EndDate,
}

/// Parse arguments and run the selected command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.data_dir.as_deref())?;

    match cli.command {
        Commands::Init => commands::init::cmd_init(&settings),
        Commands::Folder { command } => match command {
            FolderCommands::Add { name, parent } => {
                commands::folder::cmd_folder_add(&settings, &name, parent.as_deref())
            }
            FolderCommands::Rm { path } => commands::folder::cmd_folder_rm(&settings, &path),
            FolderCommands::List => commands::folder::cmd_folder_list(&settings),
        },
        Commands::Doc { command } => match command {
            DocCommands::Add {
                path,
                number,
                name,
                counterparty,
                start,
                end,
                description,
            } => commands::document::cmd_doc_add(
                &settings,
                &path,
                commands::document::DocFields {
                    number,
                    name,
                    counterparty,
                    start,
                    end,
                    description,
                },
            ),
            DocCommands::Edit {
                id,
                number,
                name,
                counterparty,
                start,
                end,
                description,
            } => commands::document::cmd_doc_edit(
                &settings,
                id,
                commands::document::DocEdits {
                    number,
                    name,
                    counterparty,
                    start,
                    end,
                    description,
                },
            ),
            DocCommands::Rm { id } => commands::document::cmd_doc_rm(&settings, id),
            DocCommands::Show { id } => commands::document::cmd_doc_show(&settings, id),
            DocCommands::List { path } => commands::document::cmd_doc_list(&settings, &path),
        },
        Commands::Attach { command } => match command {
            AttachCommands::Add { id, file } => {
                commands::attach::cmd_attach_add(&settings, id, &file)
            }
            AttachCommands::Rm { id, filename } => {
                commands::attach::cmd_attach_rm(&settings, id, &filename)
            }
            AttachCommands::List { id } => commands::attach::cmd_attach_list(&settings, id),
        },
        Commands::Search {
            field,
            text,
            from,
            to,
        } => commands::report::cmd_search(
            &settings,
            field.into(),
            text.as_deref(),
            from.as_deref(),
            to.as_deref(),
        ),
        Commands::Expiring { days } => commands::report::cmd_expiring(&settings, days),
        Commands::Export { path, output } => {
            commands::report::cmd_export(&settings, &path, &output)
        }
        Commands::Sweep => commands::report::cmd_sweep(&settings),
        Commands::Status => commands::report::cmd_status(&settings),
    }
}

/// Internal selector passed to the report commands.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FieldSelector {
    All,
    Text(crate::search::TextField),
    Date(crate::search::DateField),
}

impl From<SearchFieldArg> for FieldSelector {
    fn from(arg: SearchFieldArg) -> Self {
        use crate::search::{DateField, TextField};
        match arg {
            SearchFieldArg::All => Self::All,
            SearchFieldArg::Number => Self::Text(TextField::Number),
            SearchFieldArg::Name => Self::Text(TextField::Name),
            SearchFieldArg::Counterparty => Self::Text(TextField::Counterparty),
            SearchFieldArg::Description => Self::Text(TextField::Description),
            SearchFieldArg::StartDate => Self::Date(DateField::Start),
            SearchFieldArg::EndDate => Self::Date(DateField::End),
        }
    }
}
