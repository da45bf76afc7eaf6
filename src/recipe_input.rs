// Copyright 2023 Remi Bernotavicius

use crate::database::models::NewIngredient;
use std::fmt;

#[derive(Debug)]
pub enum RecipeInputError {
    TotalTimeOutOfRange(u32),
}

impl fmt::Display for RecipeInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotalTimeOutOfRange(minutes) => {
                write!(f, "recipe input error: total time of {minutes} minutes is too long")
            }
        }
    }
}

impl std::error::Error for RecipeInputError {}

/// Parses ingredients written one per line as `quantity:name`, e.g. `200g:farine`. Only the first
/// `:` separates the two, so names may contain colons. Lines without a `:` are skipped.
pub fn parse_ingredient_lines(text: &str) -> Vec<NewIngredient> {
    text.trim()
        .lines()
        .filter_map(|line| {
            let Some((quantity, name)) = line.split_once(':') else {
                if !line.trim().is_empty() {
                    log::warn!("skipping ingredient line without a quantity: {line:?}");
                }
                return None;
            };
            Some(NewIngredient {
                name: name.trim().into(),
                quantity: quantity.trim().into(),
            })
        })
        .collect()
}

#[test]
fn parse_ingredient_lines_splits_on_first_colon() {
    let parsed = parse_ingredient_lines("200g : Farine\n 1/2:lait: entier \r\n");
    assert_eq!(
        parsed,
        vec![
            NewIngredient {
                name: "Farine".into(),
                quantity: "200g".into(),
            },
            NewIngredient {
                name: "lait: entier".into(),
                quantity: "1/2".into(),
            },
        ]
    );
}

#[test]
fn parse_ingredient_lines_skips_lines_without_colon() {
    let parsed = parse_ingredient_lines("\nune pincée de sel\n\n:Poivre\n");
    assert_eq!(
        parsed,
        vec![NewIngredient {
            name: "Poivre".into(),
            quantity: "".into(),
        }]
    );
    assert!(parse_ingredient_lines("").is_empty());
}
