// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use diesel::associations::{Associations, Identifiable};
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel::prelude::Insertable;
use diesel_derive_newtype::DieselNewType;
use strum::EnumIter;

#[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct RecipeId(i32);

impl RecipeId {
    pub const INITIAL: Self = Self(1);

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<i32> for RecipeId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

#[derive(Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq, Eq, Clone)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub instructions: String,
    /// Minutes, never negative.
    pub total_time: i32,
    pub category: String,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct RecipeHandle {
    pub id: RecipeId,
    pub title: String,
}

#[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct IngredientId(i32);

impl IngredientId {
    pub const INITIAL: Self = Self(1);

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

/// One line of a recipe. The quantity is free text ("200g", "1/2", "a pinch") and is never
/// parsed.
#[derive(
    Associations, Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq, Eq, Clone,
)]
#[diesel(belongs_to(Recipe))]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub quantity: String,
    pub recipe_id: RecipeId,
}

#[derive(DieselNewType, Debug, Display, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct MealPlanId(i32);

impl MealPlanId {
    pub const INITIAL: Self = Self(1);

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(
    Associations, Queryable, Selectable, Identifiable, Insertable, Debug, PartialEq, Eq, Clone,
)]
#[diesel(belongs_to(Recipe))]
#[diesel(table_name = crate::database::schema::meal_plans)]
pub struct MealPlan {
    pub id: MealPlanId,
    pub date: chrono::NaiveDate,
    pub meal_type: String,
    pub recipe_id: RecipeId,
}

/// The conventional meal slots of a day. Meal types are stored as free text, so a meal plan may
/// use a slot outside of this set.
#[derive(Debug, Display, EnumIter, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum MealType {
    #[display("Matin")]
    Morning,
    #[display("Midi")]
    Midday,
    #[display("Soir")]
    Evening,
}

impl MealType {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub quantity: String,
}

/// A recipe together with its complete ingredient list, as it is created.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub instructions: String,
    pub total_time: u32,
    pub category: String,
    pub ingredients: Vec<NewIngredient>,
}

#[derive(Debug, Clone)]
pub struct NewMealPlan {
    pub date: chrono::NaiveDate,
    pub meal_type: String,
    pub recipe_id: RecipeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeWithIngredients {
    pub recipe: Recipe,
    pub ingredients: Vec<Ingredient>,
}

/// A meal plan with its recipe and the recipe's ingredients all loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMeal {
    pub meal_plan: MealPlan,
    pub recipe: RecipeWithIngredients,
}

#[test]
fn meal_type_names() {
    let names: Vec<_> = MealType::iter().map(|m| m.to_string()).collect();
    assert_eq!(names, ["Matin", "Midi", "Soir"]);
}
