//! Image catalog behind the image-picker widget
//!
//! The API serves a fixed set of artwork under `/public/<category>/`. Image
//! fields declare which category they pick from.

use serde::{Deserialize, Serialize};

/// A group of images served by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageCategory {
    Letters,
    Animals,
    Numbers,
    HandNumbers,
    Fruits,
    Avatars,
    Badges,
    Exercises,
    ShortWords,
    General,
}

/// One selectable image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageOption {
    pub url: String,
    pub name: String,
    pub category: ImageCategory,
}

const ANIMALS: &[&str] = &[
    "cat", "dog", "elephant", "fish", "fox", "frog", "horse", "lion", "monkey", "octopus", "panda",
    "pig", "snake", "turtle",
];

const FRUITS: &[&str] = &[
    "apple_green",
    "banana_yellow",
    "grape_black",
    "grape_purple",
    "kiwi_brown",
    "orange_orange",
    "peach_pink",
    "pineapple_yellow",
    "raspberry_red",
];

const AVATARS: &[&str] = &["pumpkin", "reader"];

const EXERCISE_THUMBNAILS: &[&str] = &[
    "animals_1",
    "colors_1",
    "flags",
    "numbers_1",
    "questioning",
    "reading_1",
    "reading_2",
    "reading_3",
    "reading_4",
    "reading_5",
    "writing_1",
];

const SHORT_WORDS: &[&str] = &["bus", "cat", "dad", "dog", "fan", "hot", "mom", "pen", "sun", "wet"];

impl ImageCategory {
    /// Categories offered as tabs in the picker, in display order
    pub const BROWSABLE: [ImageCategory; 9] = [
        ImageCategory::Letters,
        ImageCategory::Animals,
        ImageCategory::Numbers,
        ImageCategory::HandNumbers,
        ImageCategory::Fruits,
        ImageCategory::Avatars,
        ImageCategory::Badges,
        ImageCategory::Exercises,
        ImageCategory::ShortWords,
    ];

    /// Directory name under `/public`
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageCategory::Letters => "letters",
            ImageCategory::Animals => "animals",
            ImageCategory::Numbers => "numbers",
            ImageCategory::HandNumbers => "hand_numbers",
            ImageCategory::Fruits => "fruits",
            ImageCategory::Avatars => "avatars",
            ImageCategory::Badges => "badges",
            ImageCategory::Exercises => "exercises",
            ImageCategory::ShortWords => "short_words",
            ImageCategory::General => "general",
        }
    }

    /// Tab label
    pub fn label(&self) -> &'static str {
        match self {
            ImageCategory::Letters => "Letters",
            ImageCategory::Animals => "Animals",
            ImageCategory::Numbers => "Numbers",
            ImageCategory::HandNumbers => "Hand Numbers",
            ImageCategory::Fruits => "Fruits",
            ImageCategory::Avatars => "Avatars",
            ImageCategory::Badges => "Badges",
            ImageCategory::Exercises => "Exercise Thumbnails",
            ImageCategory::ShortWords => "Short Words",
            ImageCategory::General => "General",
        }
    }

    /// Every image of this category, with URLs rooted at `api_url`
    pub fn options(&self, api_url: &str) -> Vec<ImageOption> {
        let base = api_url.trim_end_matches('/');
        let category = *self;
        let public = |file: &str, name: String| ImageOption {
            url: format!("{}/public/{}/{}.png", base, category.as_str(), file),
            name,
            category,
        };

        match self {
            ImageCategory::Letters => ('a'..='z')
                .map(|c| public(&c.to_string(), format!("Letter {}", c.to_ascii_uppercase())))
                .collect(),
            ImageCategory::Animals => ANIMALS.iter().map(|a| public(*a, capitalize(a))).collect(),
            ImageCategory::Numbers => (0..10)
                .map(|n| public(&n.to_string(), format!("Number {}", n)))
                .collect(),
            ImageCategory::HandNumbers => (0..=10)
                .map(|n| public(&format!("hand_{}", n), format!("Hand {}", n)))
                .collect(),
            ImageCategory::Fruits => FRUITS
                .iter()
                .map(|f| {
                    let (fruit, color) = f.split_once('_').unwrap_or((*f, ""));
                    public(*f, format!("{} ({})", capitalize(fruit), color))
                })
                .collect(),
            ImageCategory::Avatars => AVATARS.iter().map(|a| public(*a, capitalize(a))).collect(),
            ImageCategory::Badges => (1..=10)
                .map(|n| public(&format!("badge_{}", n), format!("Badge {}", n)))
                .chain(std::iter::once(public("badge_lock", "Badge Lock".to_string())))
                .collect(),
            ImageCategory::Exercises => EXERCISE_THUMBNAILS
                .iter()
                .map(|e| public(*e, e.split('_').map(capitalize).collect::<Vec<_>>().join(" ")))
                .collect(),
            ImageCategory::ShortWords => SHORT_WORDS.iter().map(|w| public(*w, capitalize(w))).collect(),
            ImageCategory::General => vec![
                ImageOption {
                    url: "https://example.com/thumbnail.png".to_string(),
                    name: "Example Thumbnail".to_string(),
                    category,
                },
                ImageOption {
                    url: "https://example.com/image.jpg".to_string(),
                    name: "Example Image".to_string(),
                    category,
                },
            ],
        }
    }

    /// Images whose name contains `term`, case-insensitively
    pub fn search(&self, api_url: &str, term: &str) -> Vec<ImageOption> {
        let term = term.to_lowercase();
        self.options(api_url)
            .into_iter()
            .filter(|image| image.name.to_lowercase().contains(&term))
            .collect()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_cover_the_alphabet() {
        let letters = ImageCategory::Letters.options("http://api.test/");
        assert_eq!(letters.len(), 26);
        assert_eq!(letters[0].url, "http://api.test/public/letters/a.png");
        assert_eq!(letters[25].name, "Letter Z");
    }

    #[test]
    fn hand_numbers_include_ten() {
        let hands = ImageCategory::HandNumbers.options("http://api.test");
        assert_eq!(hands.len(), 11);
        assert_eq!(hands[10].url, "http://api.test/public/hand_numbers/hand_10.png");
    }

    #[test]
    fn fruit_names_carry_their_color() {
        let fruits = ImageCategory::Fruits.options("http://api.test");
        assert_eq!(fruits[0].name, "Apple (green)");
    }

    #[test]
    fn exercise_thumbnails_are_title_cased() {
        let thumbs = ImageCategory::Exercises.options("http://api.test");
        assert_eq!(thumbs[0].name, "Animals 1");
    }

    #[test]
    fn search_is_case_insensitive() {
        let found = ImageCategory::Animals.search("http://api.test", "PAN");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Panda");
    }
}
