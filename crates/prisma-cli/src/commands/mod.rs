//! Command implementations.

pub mod browse;
pub mod ingest;
pub mod init;
pub mod reports;
pub mod review;
pub mod settings;

pub use self::browse::{execute_list, execute_next};
pub use self::ingest::execute_ingest;
pub use self::init::execute_init;
pub use self::reports::{execute_counts, execute_export, execute_prisma, execute_report};
pub use self::review::{
    execute_dedup, execute_eligibility, execute_extract, execute_remove_incomplete, execute_screen,
};
pub use self::settings::execute_config;
