use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Inspect and edit needs.json registries")]
pub struct Cli {
    /// Build output directory holding needs.json
    #[clap(long, short = 'o', default_value = ".")]
    pub outdir: PathBuf,

    /// YAML configuration file (project, version, needs_file)
    #[clap(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Project name, overrides the configuration
    #[clap(long, short = 'p')]
    pub project: Option<String>,

    /// Current version, overrides the configuration
    #[clap(long = "current-version")]
    pub current_version: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a summary of the registry
    Show,

    /// Add a need, replacing any need with the same id
    Add {
        /// Version to add the need to
        #[clap(long, short = 'r')]
        release: String,

        /// Need id
        #[clap(long)]
        id: Option<String>,

        /// Title of the need
        #[clap(long)]
        title: Option<String>,

        /// Need type (req, spec, test, ...)
        #[clap(long = "type")]
        need_type: Option<String>,

        /// Display label of the type
        #[clap(long)]
        type_name: Option<String>,

        #[clap(long)]
        description: Option<String>,

        #[clap(long)]
        status: Option<String>,

        /// Comma-separated tags
        #[clap(long)]
        tags: Option<String>,

        /// Comma-separated ids of linked needs
        #[clap(long)]
        links: Option<String>,

        /// Use interactive mode (prompts)
        #[clap(long, short = 'i')]
        interactive: bool,
    },

    /// Remove all needs of a version
    Wipe {
        /// Version to remove
        #[clap(long, short = 'r')]
        release: String,
    },

    /// Print the needs of a version as a table, sorted by status
    Table {
        /// Version to print (defaults to the current version)
        #[clap(long, short = 'r')]
        release: Option<String>,

        /// Comma-separated columns
        #[clap(long, default_value = "id,title,status,links")]
        fields: String,

        /// Document the table is rendered into
        #[clap(long, default_value = "index")]
        from: String,

        /// Document assumed for needs that do not record one
        #[clap(long)]
        docname: Option<String>,

        /// Print an HTML table instead of plain text
        #[clap(long)]
        html: bool,
    },
}
