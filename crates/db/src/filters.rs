//! Admin list filters for terms.

use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{ColumnTrait, QueryFilter, Select};
use serde::Serialize;

use crate::entities::{Term, TermImage, term, term_image};

/// One selectable value of a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

/// A narrowing applied to an admin term listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermFilter {
    /// Titles starting with an ASCII letter, case-insensitive.
    StartingLetter(char),
    /// Terms with (or without) at least one image.
    HasImages(bool),
}

impl TermFilter {
    /// Query-string parameter that selects this filter.
    #[must_use]
    pub const fn parameter(&self) -> &'static str {
        match self {
            Self::StartingLetter(_) => "letter",
            Self::HasImages(_) => "hasImages",
        }
    }

    /// Build a filter from a query parameter. Unknown parameters and values
    /// outside the filter's options yield `None`.
    #[must_use]
    pub fn parse(parameter: &str, value: &str) -> Option<Self> {
        let value = value.trim();
        match parameter {
            "letter" => {
                let mut chars = value.chars();
                let c = chars.next()?;
                (chars.next().is_none() && c.is_ascii_alphabetic())
                    .then(|| Self::StartingLetter(c.to_ascii_uppercase()))
            }
            "hasImages" => match value {
                "yes" | "true" | "1" => Some(Self::HasImages(true)),
                "no" | "false" | "0" => Some(Self::HasImages(false)),
                _ => None,
            },
            _ => None,
        }
    }

    /// Every value this filter's parameter accepts.
    #[must_use]
    pub fn options(&self) -> Vec<FilterOption> {
        match self {
            Self::StartingLetter(_) => ('A'..='Z')
                .map(|c| FilterOption {
                    value: c.to_string(),
                    label: c.to_string(),
                })
                .collect(),
            Self::HasImages(_) => vec![
                FilterOption {
                    value: "yes".to_string(),
                    label: "With images".to_string(),
                },
                FilterOption {
                    value: "no".to_string(),
                    label: "Without images".to_string(),
                },
            ],
        }
    }

    /// Narrow a term query.
    #[must_use]
    pub fn apply(&self, query: Select<Term>) -> Select<Term> {
        match *self {
            Self::StartingLetter(letter) => query.filter(
                Expr::expr(Func::upper(Expr::col((Term, term::Column::Title))))
                    .like(format!("{}%", letter.to_ascii_uppercase())),
            ),
            Self::HasImages(has_images) => {
                let with_images = Query::select()
                    .column(term_image::Column::TermId)
                    .from(TermImage)
                    .to_owned();
                if has_images {
                    query.filter(term::Column::Id.in_subquery(with_images))
                } else {
                    query.filter(term::Column::Id.not_in_subquery(with_images))
                }
            }
        }
    }
}
