//! Trait catalog: the hint vocabulary visitors use and the tile codes each
//! hint paints onto a grave.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// One independent axis of grave flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraitCategory {
    Headstone,
    Body,
    Worn,
    Marker,
}

impl TraitCategory {
    pub const ALL: [Self; 4] = [Self::Headstone, Self::Body, Self::Worn, Self::Marker];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Headstone => 0,
            Self::Body => 1,
            Self::Worn => 2,
            Self::Marker => 3,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Headstone => "headstone",
            Self::Body => "body",
            Self::Worn => "worn",
            Self::Marker => "marker",
        }
    }
}

impl fmt::Display for TraitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single hint a visitor can give about the deceased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trait {
    Cats,
    Dogs,
    Crosses,
    Wood,
    Words,
    Tall,
    Short,
    Glasses,
    Hat,
    Beard,
    NoFlowers,
    Flowers,
}

impl Trait {
    pub const ALL: [Self; 12] = [
        Self::Cats,
        Self::Dogs,
        Self::Crosses,
        Self::Wood,
        Self::Words,
        Self::Tall,
        Self::Short,
        Self::Glasses,
        Self::Hat,
        Self::Beard,
        Self::NoFlowers,
        Self::Flowers,
    ];

    #[must_use]
    pub const fn category(self) -> TraitCategory {
        match self {
            Self::Cats | Self::Dogs | Self::Crosses | Self::Wood | Self::Words => {
                TraitCategory::Headstone
            }
            Self::Tall | Self::Short => TraitCategory::Body,
            Self::Glasses | Self::Hat | Self::Beard => TraitCategory::Worn,
            Self::NoFlowers | Self::Flowers => TraitCategory::Marker,
        }
    }

    /// The line a visitor says when describing this trait.
    #[must_use]
    pub const fn hint(self) -> &'static str {
        match self {
            Self::Cats => "They left their money to cats.",
            Self::Dogs => "They left their money to dogs.",
            Self::Crosses => "They really liked big crosses.",
            Self::Wood => "They really liked wood.",
            Self::Words => "They really liked words.",
            Self::Tall => "They were tall.",
            Self::Short => "They were short.",
            Self::Glasses => "They wore stylish glasses.",
            Self::Hat => "They famously wore a hat.",
            Self::Beard => "They were bearded.",
            Self::NoFlowers => "They hated flowers.",
            Self::Flowers => "They loved flowers.",
        }
    }

    /// Tile code(s) this trait selects; exactly one variant per category.
    #[must_use]
    pub const fn presentation(self) -> Presentation {
        match self {
            Self::Cats => Presentation::Headstone(5 * 4),
            Self::Dogs => Presentation::Headstone(6 * 4),
            // Crosses and wood share a sheet slot.
            Self::Crosses | Self::Wood => Presentation::Headstone(3 * 4),
            Self::Words => Presentation::Headstone(7 * 4),
            Self::Tall => Presentation::Body(&TALL_BODIES),
            Self::Short => Presentation::Body(&SHORT_BODIES),
            Self::Glasses => Presentation::Worn([6 * 4, 2 * 4]),
            Self::Hat => Presentation::Worn([7 * 4, 2 * 4]),
            // beard sits one sheet row lower than the other accessories
            Self::Beard => Presentation::Worn([6 * 4, 3 * 4]),
            Self::Flowers => Presentation::Marker(&FLOWER_MARKERS),
            Self::NoFlowers => Presentation::Marker(&BARE_MARKERS),
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hint())
    }
}

const TALL_BODIES: [u8; 2] = [2 * 4, 4 * 4];
const SHORT_BODIES: [u8; 2] = [3 * 4, 5 * 4];
const FLOWER_MARKERS: [u8; 2] = [6 * 4, 7 * 4];
const BARE_MARKERS: [u8; 1] = [33];

pub const DEFAULT_HEADSTONE: u8 = 4 * 4;
/// Bodies are always drawn; without a body hint any tall body will do.
pub const DEFAULT_BODIES: &[u8] = &TALL_BODIES;
pub const DEFAULT_WORN: [u8; 2] = [32, 32];
pub const DEFAULT_MARKER: u8 = 32;

/// Sprite-sheet tile offsets selected by a trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Headstone(u8),
    /// Equally valid body columns; one is picked at random per grave.
    Body(&'static [u8]),
    Worn([u8; 2]),
    Marker(&'static [u8]),
}

/// Errors raised when a custom catalog violates category invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("trait category {0} has no candidates")]
    EmptyCategory(TraitCategory),
    #[error("trait {trait_:?} belongs to {actual}, not {listed}")]
    MisplacedTrait {
        trait_: Trait,
        listed: TraitCategory,
        actual: TraitCategory,
    },
    #[error("trait {0:?} is listed more than once")]
    DuplicateTrait(Trait),
}

/// Ordered candidate traits per category.
///
/// Deserialized catalogs go through [`TraitCatalog::new`], so an invalid
/// snapshot fails to load instead of producing short-handed graves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct TraitCatalog {
    candidates: [Vec<Trait>; 4],
}

#[derive(Deserialize)]
struct RawCatalog {
    candidates: [Vec<Trait>; 4],
}

impl TryFrom<RawCatalog> for TraitCatalog {
    type Error = CatalogError;

    fn try_from(raw: RawCatalog) -> Result<Self, Self::Error> {
        Self::new(raw.candidates)
    }
}

impl TraitCatalog {
    /// Build a catalog from explicit candidate lists, validating that every
    /// category is non-empty and every trait sits in its own category once.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] describing the first violated invariant.
    pub fn new(candidates: [Vec<Trait>; 4]) -> Result<Self, CatalogError> {
        let catalog = Self { candidates };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Re-check the category invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] describing the first violated invariant.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = Vec::with_capacity(Trait::ALL.len());
        for category in TraitCategory::ALL {
            let list = &self.candidates[category.index()];
            if list.is_empty() {
                return Err(CatalogError::EmptyCategory(category));
            }
            for &candidate in list {
                if candidate.category() != category {
                    return Err(CatalogError::MisplacedTrait {
                        trait_: candidate,
                        listed: category,
                        actual: candidate.category(),
                    });
                }
                if seen.contains(&candidate) {
                    return Err(CatalogError::DuplicateTrait(candidate));
                }
                seen.push(candidate);
            }
        }
        Ok(())
    }

    /// The full catalog shipped with the game.
    #[must_use]
    pub fn standard() -> &'static Self {
        static CATALOG: OnceLock<TraitCatalog> = OnceLock::new();
        CATALOG.get_or_init(|| {
            let mut candidates: [Vec<Trait>; 4] = Default::default();
            for candidate in Trait::ALL {
                candidates[candidate.category().index()].push(candidate);
            }
            Self { candidates }
        })
    }

    #[must_use]
    pub fn candidates(&self, category: TraitCategory) -> &[Trait] {
        &self.candidates[category.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_orders_candidates() {
        let catalog = TraitCatalog::standard();
        assert_eq!(
            catalog.candidates(TraitCategory::Headstone),
            &[Trait::Cats, Trait::Dogs, Trait::Crosses, Trait::Wood, Trait::Words]
        );
        assert_eq!(
            catalog.candidates(TraitCategory::Body),
            &[Trait::Tall, Trait::Short]
        );
        assert_eq!(
            catalog.candidates(TraitCategory::Worn),
            &[Trait::Glasses, Trait::Hat, Trait::Beard]
        );
        assert_eq!(
            catalog.candidates(TraitCategory::Marker),
            &[Trait::NoFlowers, Trait::Flowers]
        );
    }

    #[test]
    fn presentation_variant_matches_category() {
        for candidate in Trait::ALL {
            let matches = matches!(
                (candidate.category(), candidate.presentation()),
                (TraitCategory::Headstone, Presentation::Headstone(_))
                    | (TraitCategory::Body, Presentation::Body(_))
                    | (TraitCategory::Worn, Presentation::Worn(_))
                    | (TraitCategory::Marker, Presentation::Marker(_))
            );
            assert!(matches, "{candidate:?} maps outside its category");
        }
    }

    #[test]
    fn custom_catalog_rejects_empty_category() {
        let err = TraitCatalog::new([
            vec![Trait::Cats],
            vec![],
            vec![Trait::Hat],
            vec![Trait::Flowers],
        ])
        .unwrap_err();
        assert_eq!(err, CatalogError::EmptyCategory(TraitCategory::Body));
    }

    #[test]
    fn custom_catalog_rejects_misplaced_and_duplicate_traits() {
        let misplaced = TraitCatalog::new([
            vec![Trait::Cats, Trait::Tall],
            vec![Trait::Short],
            vec![Trait::Hat],
            vec![Trait::Flowers],
        ]);
        assert!(matches!(
            misplaced,
            Err(CatalogError::MisplacedTrait { trait_: Trait::Tall, .. })
        ));

        let duplicate = TraitCatalog::new([
            vec![Trait::Cats, Trait::Cats],
            vec![Trait::Short],
            vec![Trait::Hat],
            vec![Trait::Flowers],
        ]);
        assert_eq!(duplicate, Err(CatalogError::DuplicateTrait(Trait::Cats)));
    }

    #[test]
    fn deserialized_catalog_is_validated() {
        let err = serde_json::from_str::<TraitCatalog>(
            r#"{"candidates":[["cats"],[],["hat"],["flowers"]]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("has no candidates"), "{err}");

        let json = serde_json::to_string(TraitCatalog::standard()).unwrap();
        let loaded: TraitCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(&loaded, TraitCatalog::standard());
        assert_eq!(loaded.validate(), Ok(()));
    }

    #[test]
    fn hints_render_through_display() {
        assert_eq!(Trait::Beard.to_string(), "They were bearded.");
        assert_eq!(TraitCategory::Worn.to_string(), "worn");
    }
}
