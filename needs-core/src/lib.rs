pub mod builder;
pub mod config;
pub mod error;
pub mod formatter;
pub mod models;
pub mod nodes;
pub mod storage;
pub mod template;

// Re-export commonly used types
pub use builder::{relative_uri, Builder, HtmlBuilder, OutputFormat, TemplateRenderer};
pub use config::{NeedsConfig, DEFAULT_NEEDS_FILE};
pub use error::NeedsError;
pub use formatter::{row_col_maker, status_sorter, RefMode, ITEM_SEPARATOR};
pub use models::{timestamp, Field, FieldValue, Need, NeedsRegistry, VersionBucket};
pub use nodes::{Entry, Inline, Paragraph};
pub use storage::{LoadStatus, NeedsList, DOCTREES_DIR};
pub use template::render_source_template;
