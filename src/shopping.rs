// Copyright 2023 Remi Bernotavicius

use crate::database;
use crate::database::models::PlannedMeal;
use crate::week::MealWeek;
use std::collections::HashMap;
use std::fmt;

/// Anything that can produce the meals planned between two dates, both inclusive, with every
/// recipe's ingredients already loaded.
pub trait MealPlanSource {
    fn fetch(
        &mut self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> crate::Result<Vec<PlannedMeal>>;
}

impl MealPlanSource for database::Connection {
    fn fetch(
        &mut self,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> crate::Result<Vec<PlannedMeal>> {
        Ok(crate::query::get_meal_plans(self, start, end)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListItem {
    pub name: String,
    /// Every distinct quantity asked for, comma separated. Quantities are free text so they are
    /// listed rather than added up.
    pub quantities: String,
}

impl ShoppingListItem {
    fn new(key: &str, quantities: &[&str]) -> Self {
        Self {
            name: capitalize(key),
            quantities: quantities.join(", "),
        }
    }
}

impl fmt::Display for ShoppingListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quantities.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}: {}", self.name, self.quantities)
        }
    }
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Quantity buckets keyed by lower-cased ingredient name. Each bucket keeps the quantities in the
/// order they were first seen, without repeats.
#[derive(Default)]
struct QuantityBuckets<'a> {
    keys: HashMap<String, usize>,
    buckets: Vec<(String, Vec<&'a str>)>,
}

impl<'a> QuantityBuckets<'a> {
    fn add(&mut self, name: &str, quantity: &'a str) {
        let key = name.to_lowercase();
        let index = match self.keys.get(&key) {
            Some(index) => *index,
            None => {
                self.keys.insert(key.clone(), self.buckets.len());
                self.buckets.push((key, vec![]));
                self.buckets.len() - 1
            }
        };
        let quantities = &mut self.buckets[index].1;
        if !quantities.contains(&quantity) {
            quantities.push(quantity);
        }
    }
}

/// Collapses the ingredients of all the given meals into one item per ingredient name, compared
/// case-insensitively. A recipe planned twice contributes its ingredients twice, but identical
/// quantity text only appears once per item. Items come back sorted by name.
pub fn aggregate(meal_plans: &[PlannedMeal]) -> Vec<ShoppingListItem> {
    let mut buckets = QuantityBuckets::default();
    for planned in meal_plans {
        for ingredient in &planned.recipe.ingredients {
            buckets.add(&ingredient.name, &ingredient.quantity);
        }
    }

    let mut items: Vec<_> = buckets
        .buckets
        .iter()
        .map(|(key, quantities)| ShoppingListItem::new(key, quantities))
        .collect();
    items.sort_by(|a, b| a.name.cmp(&b.name));
    items
}

/// The aggregated shopping list for everything planned during `week`.
pub fn shopping_list_for_week(
    source: &mut impl MealPlanSource,
    week: MealWeek,
) -> crate::Result<Vec<ShoppingListItem>> {
    let meal_plans = source.fetch(week.first_day(), week.last_day())?;
    let items = aggregate(&meal_plans);
    log::info!(
        "{} ingredient(s) needed for {} meal(s) in the {week}",
        items.len(),
        meal_plans.len()
    );
    Ok(items)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::database::models::{
        Ingredient, IngredientId, MealPlan, MealPlanId, PlannedMeal, Recipe, RecipeId,
        RecipeWithIngredients,
    };

    pub fn planned_meal(date: &str, ingredients: &[(&str, &str)]) -> PlannedMeal {
        let recipe_id = RecipeId::INITIAL;
        let mut ingredient_id = IngredientId::INITIAL;
        PlannedMeal {
            meal_plan: MealPlan {
                id: MealPlanId::INITIAL,
                date: date.parse().unwrap(),
                meal_type: "Soir".into(),
                recipe_id,
            },
            recipe: RecipeWithIngredients {
                recipe: Recipe {
                    id: recipe_id,
                    title: "Test".into(),
                    instructions: String::new(),
                    total_time: 10,
                    category: "Dinner".into(),
                },
                ingredients: ingredients
                    .iter()
                    .map(|(name, quantity)| {
                        let ingredient = Ingredient {
                            id: ingredient_id,
                            name: (*name).into(),
                            quantity: (*quantity).into(),
                            recipe_id,
                        };
                        ingredient_id = ingredient_id.next();
                        ingredient
                    })
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
use test_support::planned_meal;

#[cfg(test)]
fn item(name: &str, quantities: &str) -> ShoppingListItem {
    ShoppingListItem {
        name: name.into(),
        quantities: quantities.into(),
    }
}

#[test]
fn aggregate_merges_names_case_insensitively() {
    let meals = [
        planned_meal("2024-03-04", &[("Flour", "200g")]),
        planned_meal("2024-03-05", &[("flour", "1/2 cup")]),
    ];
    assert_eq!(aggregate(&meals), vec![item("Flour", "200g, 1/2 cup")]);
}

#[test]
fn aggregate_collapses_identical_quantities() {
    let crepes = planned_meal("2024-03-04", &[("Flour", "200g"), ("Milk", "50cl")]);
    let meals = [crepes.clone(), crepes];
    assert_eq!(
        aggregate(&meals),
        vec![item("Flour", "200g"), item("Milk", "50cl")]
    );
}

#[test]
fn aggregate_keeps_first_seen_quantity_order() {
    let meals = [
        planned_meal("2024-03-04", &[("Sugar", "a pinch"), ("sugar", "10g")]),
        planned_meal("2024-03-06", &[("SUGAR", "a pinch"), ("Sugar", "1 tbsp")]),
    ];
    assert_eq!(aggregate(&meals), vec![item("Sugar", "a pinch, 10g, 1 tbsp")]);
}

#[test]
fn aggregate_sorts_by_name() {
    let meals = [planned_meal(
        "2024-03-04",
        &[("Zucchini", "1"), ("apple", "2"), ("Banana", "3")],
    )];
    let names: Vec<_> = aggregate(&meals).into_iter().map(|i| i.name).collect();
    assert_eq!(names, ["Apple", "Banana", "Zucchini"]);
}

#[test]
fn aggregate_capitalizes_cosmetically() {
    let meals = [planned_meal(
        "2024-03-04",
        &[("crème FRAÎCHE", "20cl"), ("Pont-l'Évêque", "1"), ("", "?")],
    )];
    let names: Vec<_> = aggregate(&meals).into_iter().map(|i| i.name).collect();
    assert_eq!(names, ["", "Crème fraîche", "Pont-l'évêque"]);
}

#[test]
fn aggregate_does_not_trim_names() {
    let meals = [planned_meal("2024-03-04", &[("Salt", "1"), ("Salt ", "2")])];
    assert_eq!(
        aggregate(&meals),
        vec![item("Salt", "1"), item("Salt ", "2")]
    );
}

#[test]
fn aggregate_empty() {
    assert!(aggregate(&[]).is_empty());
    assert!(aggregate(&[planned_meal("2024-03-04", &[])]).is_empty());
}

#[test]
fn aggregate_is_deterministic() {
    let meals = [
        planned_meal("2024-03-04", &[("Oeufs", "4"), ("Lait", "1L"), ("oeufs", "2")]),
        planned_meal("2024-03-05", &[("lait", "1L"), ("Beurre", "50g")]),
    ];
    let first = aggregate(&meals);
    for _ in 0..10 {
        assert_eq!(aggregate(&meals), first);
    }
    assert_eq!(
        first,
        vec![item("Beurre", "50g"), item("Lait", "1L"), item("Oeufs", "4, 2")]
    );
}

#[test]
fn aggregate_contents_ignore_meal_order() {
    use maplit::btreemap;
    use std::collections::BTreeMap;

    let mut meals = vec![
        planned_meal("2024-03-04", &[("Oignons", "2"), ("Carottes", "500g")]),
        planned_meal("2024-03-05", &[("oignons", "2"), ("Céleri", "1 branche")]),
        planned_meal("2024-03-07", &[("Carottes", "3")]),
    ];
    let expected = btreemap! {
        "Carottes".to_owned() => vec!["500g", "3"],
        "Céleri".to_owned() => vec!["1 branche"],
        "Oignons".to_owned() => vec!["2"],
    };

    for _ in 0..meals.len() {
        let aggregated = aggregate(&meals);
        let rows: BTreeMap<String, Vec<&str>> = aggregated
            .iter()
            .map(|i| {
                let mut quantities: Vec<_> = i.quantities.split(", ").collect();
                quantities.sort();
                (i.name.clone(), quantities)
            })
            .collect();
        let mut expected = expected.clone();
        expected.values_mut().for_each(|q| q.sort());
        assert_eq!(rows, expected);
        meals.rotate_left(1);
    }
}

#[test]
fn shopping_list_for_week_fetches_whole_week() {
    struct Recorded {
        meals: Vec<PlannedMeal>,
        requested: Vec<(chrono::NaiveDate, chrono::NaiveDate)>,
    }

    impl MealPlanSource for Recorded {
        fn fetch(
            &mut self,
            start: chrono::NaiveDate,
            end: chrono::NaiveDate,
        ) -> crate::Result<Vec<PlannedMeal>> {
            self.requested.push((start, end));
            Ok(self
                .meals
                .iter()
                .filter(|m| (start..=end).contains(&m.meal_plan.date))
                .cloned()
                .collect())
        }
    }

    let mut source = Recorded {
        meals: vec![
            planned_meal("2024-03-03", &[("Riz", "100g")]),
            planned_meal("2024-03-04", &[("Riz", "200g")]),
            planned_meal("2024-03-10", &[("riz", "300g")]),
        ],
        requested: vec![],
    };
    let week = MealWeek::containing("2024-03-07".parse().unwrap());
    let items = shopping_list_for_week(&mut source, week).unwrap();

    assert_eq!(items, vec![item("Riz", "200g, 300g")]);
    assert_eq!(
        source.requested,
        vec![(week.first_day(), week.last_day())]
    );
}

#[test]
fn shopping_list_from_database() {
    use crate::database::models::NewMealPlan;
    use crate::query::{assign_meal, create_recipe, test_recipe};

    let mut conn = database::establish_in_memory_connection();
    let pates = create_recipe(
        &mut conn,
        test_recipe("Pâtes", &[("Pâtes", "500g"), ("Parmesan", "50g")]),
    )
    .unwrap();
    let pizza = create_recipe(
        &mut conn,
        test_recipe("Pizza", &[("parmesan", "30g"), ("Tomates", "3")]),
    )
    .unwrap();
    for (day, meal_type, recipe) in [
        ("2024-03-04", "Midi", &pates),
        ("2024-03-06", "Soir", &pizza),
        ("2024-03-08", "Midi", &pates),
        ("2024-03-11", "Midi", &pizza),
    ] {
        assign_meal(
            &mut conn,
            NewMealPlan {
                date: day.parse().unwrap(),
                meal_type: meal_type.into(),
                recipe_id: recipe.id,
            },
        )
        .unwrap();
    }

    let week = MealWeek::containing("2024-03-04".parse().unwrap());
    let items = shopping_list_for_week(&mut conn, week).unwrap();
    assert_eq!(
        items,
        vec![
            item("Parmesan", "50g, 30g"),
            item("Pâtes", "500g"),
            item("Tomates", "3"),
        ]
    );
}
