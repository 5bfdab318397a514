//! Style catalogue: client-side categories, display names and icons.
//!
//! The backend only lists identifiers. Category membership is a fixed
//! partition maintained here and used purely for filtering.

/// Classical image filters.
pub const CLASSICAL_FILTER_STYLES: &[&str] = &[
    "pencil_sketch",
    "charcoal_sketch",
    "watercolor",
    "oil_painting",
    "crayon_color",
    "rough_paper",
    "sepia",
    "vintage",
    "hdr_effect",
    "pop_art",
    "emboss",
    "cartoon",
];

/// Fast neural style transfer models.
pub const NEURAL_TRANSFER_STYLES: &[&str] = &["candy", "mosaic", "rain_princess", "udnie"];

/// Anime-style generators.
pub const ANIME_STYLES: &[&str] = &["shinkai", "hayao", "hosoda", "paprika"];

const DEFAULT_ICON: &str = "🎨";

/// Filter applied to the style list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleCategory {
    #[default]
    All,
    ClassicalFilter,
    NeuralTransfer,
    Anime,
}

impl StyleCategory {
    /// Whether `style` belongs to this category.
    pub fn contains(self, style: &str) -> bool {
        match self {
            StyleCategory::All => true,
            StyleCategory::ClassicalFilter => CLASSICAL_FILTER_STYLES.contains(&style),
            StyleCategory::NeuralTransfer => NEURAL_TRANSFER_STYLES.contains(&style),
            StyleCategory::Anime => ANIME_STYLES.contains(&style),
        }
    }

    /// The category a style belongs to, if any.
    pub fn of(style: &str) -> Option<StyleCategory> {
        [
            StyleCategory::ClassicalFilter,
            StyleCategory::NeuralTransfer,
            StyleCategory::Anime,
        ]
        .into_iter()
        .find(|c| c.contains(style))
    }

    pub fn label(self) -> &'static str {
        match self {
            StyleCategory::All => "All",
            StyleCategory::ClassicalFilter => "Classical",
            StyleCategory::NeuralTransfer => "Neural",
            StyleCategory::Anime => "Anime",
        }
    }
}

/// Keep the styles of `styles` that belong to `category`, preserving order.
pub fn filter_styles(styles: &[String], category: StyleCategory) -> Vec<String> {
    styles
        .iter()
        .filter(|s| category.contains(s))
        .cloned()
        .collect()
}

/// Human-readable name: `rain_princess` becomes `Rain Princess`.
pub fn display_name(style: &str) -> String {
    style
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Icon shown next to a style.
pub fn icon(style: &str) -> &'static str {
    match style {
        "pencil_sketch" => "✏️",
        "charcoal_sketch" => "🖊️",
        "watercolor" => "🎨",
        "oil_painting" => "🖌️",
        "crayon_color" => "🖍️",
        "rough_paper" => "📄",
        "sepia" => "🌅",
        "vintage" => "📷",
        "hdr_effect" => "✨",
        "pop_art" => "🎭",
        "emboss" => "🔨",
        "cartoon" => "🎪",
        "candy" => "🍬",
        "mosaic" => "🔲",
        "rain_princess" => "🌧️",
        "udnie" => "🎨",
        "shinkai" => "⛅",
        "hayao" => "🌿",
        "hosoda" => "🌸",
        "paprika" => "🎪",
        _ => DEFAULT_ICON,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogue() -> Vec<String> {
        ["sepia", "candy", "hayao", "glitch", "udnie"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_all_keeps_backend_order_and_unknown_styles() {
        assert_eq!(filter_styles(&catalogue(), StyleCategory::All), catalogue());
    }

    #[test]
    fn test_category_filters() {
        assert_eq!(
            filter_styles(&catalogue(), StyleCategory::NeuralTransfer),
            vec!["candy".to_string(), "udnie".to_string()]
        );
        assert_eq!(
            filter_styles(&catalogue(), StyleCategory::Anime),
            vec!["hayao".to_string()]
        );
        assert_eq!(
            filter_styles(&catalogue(), StyleCategory::ClassicalFilter),
            vec!["sepia".to_string()]
        );
    }

    #[test]
    fn test_categories_are_disjoint() {
        for style in CLASSICAL_FILTER_STYLES
            .iter()
            .chain(NEURAL_TRANSFER_STYLES)
            .chain(ANIME_STYLES)
        {
            let hits = [
                StyleCategory::ClassicalFilter,
                StyleCategory::NeuralTransfer,
                StyleCategory::Anime,
            ]
            .iter()
            .filter(|c| c.contains(style))
            .count();
            assert_eq!(hits, 1, "{} should be in exactly one category", style);
        }
    }

    #[test]
    fn test_category_of() {
        assert_eq!(StyleCategory::of("emboss"), Some(StyleCategory::ClassicalFilter));
        assert_eq!(StyleCategory::of("glitch"), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("rain_princess"), "Rain Princess");
        assert_eq!(display_name("hdr_effect"), "Hdr Effect");
        assert_eq!(display_name("sepia"), "Sepia");
    }

    #[test]
    fn test_icon_default() {
        assert_eq!(icon("sepia"), "🌅");
        assert_eq!(icon("unknown"), "🎨");
    }
}
