//! Database repositories.

pub mod application_log;
pub mod site_setting;
pub mod suggestion;
pub mod term;
pub mod term_history;
pub mod user;

pub use application_log::ApplicationLogRepository;
pub use site_setting::SiteSettingRepository;
pub use suggestion::SuggestionRepository;
pub use term::{TermPage, TermRepository, TermSearch};
pub use term_history::TermHistoryRepository;
pub use user::UserRepository;
