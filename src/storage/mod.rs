//! Persistence: the SQLite text store, snapshot report output and CSV export

pub mod export;
pub mod report;
pub mod repository;

pub use export::{export_articles, write_articles_csv, EXPORT_LIMIT};
pub use report::{text_chart, JsonReportWriter, ReportSink};
pub use repository::{
    create_mock_store, create_sqlite_store, MockTextStore, SharedTextStore, SqliteTextStore,
    TextStore,
};
