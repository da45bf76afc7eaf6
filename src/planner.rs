// Copyright 2023 Remi Bernotavicius

use crate::database::models::{MealType, PlannedMeal, RecipeHandle};
use crate::shopping::MealPlanSource;
use crate::week::{full_day_name, MealWeek};
use chrono::Datelike as _;
use std::collections::HashMap;
use std::fmt;

/// What is planned for each meal slot of each day of a week.
pub struct WeekPlan {
    week: MealWeek,
    meals: HashMap<(chrono::NaiveDate, String), RecipeHandle>,
    extra_slots: Vec<String>,
}

impl WeekPlan {
    pub fn load(source: &mut impl MealPlanSource, week: MealWeek) -> crate::Result<Self> {
        let meals = source.fetch(week.first_day(), week.last_day())?;
        Ok(Self::new(week, meals))
    }

    pub fn new(week: MealWeek, planned: Vec<PlannedMeal>) -> Self {
        let mut meals = HashMap::new();
        let mut extra_slots = vec![];
        for PlannedMeal { meal_plan, recipe } in planned {
            if !week.contains(meal_plan.date) {
                continue;
            }
            let conventional = MealType::iter().any(|m| m.to_string() == meal_plan.meal_type);
            if !conventional && !extra_slots.contains(&meal_plan.meal_type) {
                extra_slots.push(meal_plan.meal_type.clone());
            }
            let handle = RecipeHandle {
                id: recipe.recipe.id,
                title: recipe.recipe.title,
            };
            meals.insert((meal_plan.date, meal_plan.meal_type), handle);
        }
        extra_slots.sort();
        Self {
            week,
            meals,
            extra_slots,
        }
    }

    pub fn week(&self) -> MealWeek {
        self.week
    }

    /// Matin, Midi and Soir, followed by any other meal type used this week.
    pub fn slots(&self) -> Vec<String> {
        MealType::iter()
            .map(|m| m.to_string())
            .chain(self.extra_slots.iter().cloned())
            .collect()
    }

    pub fn recipe(&self, date: chrono::NaiveDate, meal_type: &str) -> Option<&RecipeHandle> {
        self.meals.get(&(date, meal_type.to_owned()))
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }
}

impl fmt::Display for WeekPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Menu for the {}", self.week)?;
        let slots = self.slots();
        for day in self.week.days() {
            writeln!(f)?;
            writeln!(f, "{} {}", full_day_name(day.weekday()), day.format("%d/%m"))?;
            for slot in &slots {
                match self.recipe(day, slot) {
                    Some(recipe) => writeln!(f, "  {slot:<8}{} (#{})", recipe.title, recipe.id)?,
                    None => writeln!(f, "  {slot:<8}-")?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
fn meal(date: &str, meal_type: &str, title: &str) -> PlannedMeal {
    let mut meal = crate::shopping::test_support::planned_meal(date, &[]);
    meal.meal_plan.meal_type = meal_type.into();
    meal.recipe.recipe.title = title.into();
    meal
}

#[test]
fn week_plan_places_meals() {
    let week = MealWeek::containing("2024-03-06".parse().unwrap());
    let plan = WeekPlan::new(
        week,
        vec![
            meal("2024-03-04", "Matin", "Porridge"),
            meal("2024-03-04", "Soir", "Soupe"),
            meal("2024-03-10", "Goûter", "Crêpes"),
            meal("2024-03-11", "Midi", "Hors semaine"),
        ],
    );

    let monday = week.first_day();
    assert_eq!(plan.recipe(monday, "Matin").unwrap().title, "Porridge");
    assert_eq!(plan.recipe(monday, "Soir").unwrap().title, "Soupe");
    assert!(plan.recipe(monday, "Midi").is_none());
    assert_eq!(
        plan.recipe(week.last_day(), "Goûter").unwrap().title,
        "Crêpes"
    );
    assert!(plan
        .recipe("2024-03-11".parse().unwrap(), "Midi")
        .is_none());
    assert_eq!(plan.slots(), ["Matin", "Midi", "Soir", "Goûter"]);
}

#[test]
fn week_plan_display() {
    let week = MealWeek::containing("2024-03-06".parse().unwrap());
    let plan = WeekPlan::new(week, vec![meal("2024-03-05", "Midi", "Quiche")]);
    let text = plan.to_string();

    assert!(text.starts_with("Menu for the week of  4 March 2024\n"));
    assert!(text.contains("Mardi 05/03\n  Matin   -\n  Midi    Quiche (#1)\n  Soir    -\n"));
    assert_eq!(text.matches("Dimanche").count(), 1);
}

#[test]
fn empty_week_plan() {
    let plan = WeekPlan::new(MealWeek::containing("2024-03-06".parse().unwrap()), vec![]);
    assert!(plan.is_empty());
    assert_eq!(plan.slots(), ["Matin", "Midi", "Soir"]);
}
