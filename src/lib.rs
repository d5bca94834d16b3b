pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod process;
pub mod schema;
pub mod sheets;

pub use config::SheetConfig;
pub use error::SheetError;
pub use process::RawRow;
pub use schema::NormalizedRecord;
pub use sheets::{NoopPresenter, Presenter, Sheets};
