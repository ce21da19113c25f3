//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod csv_io;
pub mod history;
pub mod media;
pub mod merge;
pub mod search;
pub mod site_settings;
pub mod stats;
pub mod suggestion;
pub mod term;

pub use account::{AccountService, SignupInput, UpdateProfileInput};
pub use csv_io::{CsvService, ImportReport};
pub use history::{FieldDiff, HistoryDiff, HistoryService, inline_diff};
pub use media::{ImageUpload, MediaService, SUGGESTION_IMAGE_WIDTHS, TERM_IMAGE_WIDTHS};
pub use merge::{ApplyOutcome, ApplyReport, MergeService};
pub use search::{AutocompleteItem, SearchService};
pub use site_settings::{
    BrandingImage, PublicSiteSettings, SiteSettingsService, UpdateSiteSettingsInput,
};
pub use stats::{DashboardStats, StatsService};
pub use suggestion::{SubmitSuggestionInput, SuggestionDetail, SuggestionService};
pub use term::{CreateTermInput, ImageMeta, TermDetail, TermImageView, TermService, UpdateTermInput};
