//! Database entities.

pub mod site_setting;
pub mod suggestion;
pub mod suggestion_application_log;
pub mod suggestion_image;
pub mod suggestion_link;
pub mod suggestion_video;
pub mod term;
pub mod term_history;
pub mod term_image;
pub mod term_link;
pub mod term_synonym;
pub mod term_video;
pub mod user;

pub use site_setting::Entity as SiteSetting;
pub use suggestion::Entity as Suggestion;
pub use suggestion_application_log::Entity as SuggestionApplicationLog;
pub use suggestion_image::Entity as SuggestionImage;
pub use suggestion_link::Entity as SuggestionLink;
pub use suggestion_video::Entity as SuggestionVideo;
pub use term::Entity as Term;
pub use term_history::Entity as TermHistory;
pub use term_image::Entity as TermImage;
pub use term_link::Entity as TermLink;
pub use term_synonym::Entity as TermSynonym;
pub use term_video::Entity as TermVideo;
pub use user::Entity as User;
