//! CLI enum types.

use clap::ValueEnum;

use crate::styles::StyleCategory;

/// Style category filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Category {
    #[default]
    All,
    Classical,
    Neural,
    Anime,
}

impl From<Category> for StyleCategory {
    fn from(c: Category) -> Self {
        match c {
            Category::All => StyleCategory::All,
            Category::Classical => StyleCategory::ClassicalFilter,
            Category::Neural => StyleCategory::NeuralTransfer,
            Category::Anime => StyleCategory::Anime,
        }
    }
}
