// Copyright 2023 Remi Bernotavicius

use crate::database;
use crate::database::models::{
    Ingredient, IngredientId, MealPlan, MealPlanId, NewMealPlan, NewRecipe, PlannedMeal, Recipe,
    RecipeId, RecipeWithIngredients,
};
use crate::recipe_input::RecipeInputError;
use diesel::prelude::Connection as _;
use diesel::prelude::OptionalExtension as _;
use diesel::BelongingToDsl as _;
use diesel::BoolExpressionMethods as _;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::QueryResult;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use std::collections::HashMap;

pub const DEFAULT_RECIPE_LIMIT: i64 = 100;

fn next_recipe_id(conn: &mut database::Connection) -> QueryResult<RecipeId> {
    use database::schema::recipes::dsl::*;
    use diesel::dsl::max;

    let last: Option<RecipeId> = recipes.select(max(id)).first(conn)?;
    Ok(last.map_or(RecipeId::INITIAL, |last| last.next()))
}

fn next_ingredient_id(conn: &mut database::Connection) -> QueryResult<IngredientId> {
    use database::schema::ingredients::dsl::*;
    use diesel::dsl::max;

    let last: Option<IngredientId> = ingredients.select(max(id)).first(conn)?;
    Ok(last.map_or(IngredientId::INITIAL, |last| last.next()))
}

fn next_meal_plan_id(conn: &mut database::Connection) -> QueryResult<MealPlanId> {
    use database::schema::meal_plans::dsl::*;
    use diesel::dsl::max;

    let last: Option<MealPlanId> = meal_plans.select(max(id)).first(conn)?;
    Ok(last.map_or(MealPlanId::INITIAL, |last| last.next()))
}

/// Inserts a recipe along with its full ingredient list.
pub fn create_recipe(
    conn: &mut database::Connection,
    new_recipe: NewRecipe,
) -> crate::Result<Recipe> {
    let total_time = i32::try_from(new_recipe.total_time)
        .map_err(|_| RecipeInputError::TotalTimeOutOfRange(new_recipe.total_time))?;

    let recipe = conn.transaction(|conn| {
        let recipe = Recipe {
            id: next_recipe_id(conn)?,
            title: new_recipe.title,
            instructions: new_recipe.instructions,
            total_time,
            category: new_recipe.category,
        };
        diesel::insert_into(database::schema::recipes::table)
            .values(&recipe)
            .execute(conn)?;

        let mut ingredient_id = next_ingredient_id(conn)?;
        let ingredients: Vec<_> = new_recipe
            .ingredients
            .into_iter()
            .map(|i| {
                let ingredient = Ingredient {
                    id: ingredient_id,
                    name: i.name,
                    quantity: i.quantity,
                    recipe_id: recipe.id,
                };
                ingredient_id = ingredient_id.next();
                ingredient
            })
            .collect();
        if !ingredients.is_empty() {
            diesel::insert_into(database::schema::ingredients::table)
                .values(&ingredients)
                .execute(conn)?;
        }

        QueryResult::Ok(recipe)
    })?;

    log::info!("created recipe {} {:?}", recipe.id, recipe.title);
    Ok(recipe)
}

pub fn get_recipe(
    conn: &mut database::Connection,
    recipe_id: RecipeId,
) -> QueryResult<Option<RecipeWithIngredients>> {
    use database::schema::recipes::dsl::*;

    let Some(recipe) = recipes
        .select(Recipe::as_select())
        .filter(id.eq(recipe_id))
        .first(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let ingredients = Ingredient::belonging_to(&recipe)
        .select(Ingredient::as_select())
        .order(database::schema::ingredients::id)
        .load(conn)?;
    Ok(Some(RecipeWithIngredients {
        recipe,
        ingredients,
    }))
}

pub fn get_recipes(
    conn: &mut database::Connection,
    skip: i64,
    limit: i64,
) -> QueryResult<Vec<Recipe>> {
    use database::schema::recipes::dsl::*;

    recipes
        .select(Recipe::as_select())
        .order(id)
        .offset(skip)
        .limit(limit)
        .load(conn)
}

/// Deletes the recipe, its ingredients and every meal plan that uses it. Returns `None` when
/// there was no such recipe.
pub fn delete_recipe(
    conn: &mut database::Connection,
    delete_id: RecipeId,
) -> QueryResult<Option<Recipe>> {
    let deleted = conn.transaction(|conn| {
        use database::schema::{ingredients, meal_plans, recipes};
        use diesel::delete;

        let Some(recipe) = recipes::table
            .select(Recipe::as_select())
            .filter(recipes::id.eq(delete_id))
            .first(conn)
            .optional()?
        else {
            return Ok(None);
        };

        let unscheduled = delete(meal_plans::table.filter(meal_plans::recipe_id.eq(delete_id)))
            .execute(conn)?;
        delete(ingredients::table.filter(ingredients::recipe_id.eq(delete_id))).execute(conn)?;
        delete(recipes::table.filter(recipes::id.eq(delete_id))).execute(conn)?;

        if unscheduled > 0 {
            log::info!("removed {unscheduled} meal plan(s) using recipe {delete_id}");
        }
        QueryResult::Ok(Some(recipe))
    })?;

    if deleted.is_some() {
        log::info!("deleted recipe {delete_id}");
    }
    Ok(deleted)
}

/// Assigns a recipe to a day and meal slot. Whatever was assigned to that slot before is
/// replaced.
pub fn assign_meal(
    conn: &mut database::Connection,
    new_meal_plan: NewMealPlan,
) -> QueryResult<MealPlan> {
    use database::schema::meal_plans::dsl::*;
    use diesel::{delete, insert_into};

    conn.transaction(|conn| {
        let replaced = delete(
            meal_plans.filter(
                date.eq(new_meal_plan.date)
                    .and(meal_type.eq(&new_meal_plan.meal_type)),
            ),
        )
        .execute(conn)?;
        if replaced > 0 {
            log::debug!(
                "replacing {} on {}",
                new_meal_plan.meal_type,
                new_meal_plan.date
            );
        }

        let meal_plan = MealPlan {
            id: next_meal_plan_id(conn)?,
            date: new_meal_plan.date,
            meal_type: new_meal_plan.meal_type,
            recipe_id: new_meal_plan.recipe_id,
        };
        insert_into(meal_plans).values(&meal_plan).execute(conn)?;
        Ok(meal_plan)
    })
}

/// All meal plans dated between `start` and `end` (both inclusive), each with its recipe and the
/// recipe's ingredients.
pub fn get_meal_plans(
    conn: &mut database::Connection,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
) -> QueryResult<Vec<PlannedMeal>> {
    use database::schema::{ingredients, meal_plans, recipes};

    let planned: Vec<(MealPlan, Recipe)> = meal_plans::table
        .inner_join(recipes::table)
        .select((MealPlan::as_select(), Recipe::as_select()))
        .filter(meal_plans::date.ge(start).and(meal_plans::date.le(end)))
        .order((meal_plans::date, meal_plans::meal_type))
        .load(conn)?;

    let planned_recipes: Vec<Recipe> = planned.iter().map(|(_, r)| r.clone()).collect();
    let mut ingredients_by_recipe: HashMap<RecipeId, Vec<Ingredient>> = HashMap::new();
    for ingredient in Ingredient::belonging_to(&planned_recipes)
        .select(Ingredient::as_select())
        .order(ingredients::id)
        .load(conn)?
    {
        ingredients_by_recipe
            .entry(ingredient.recipe_id)
            .or_default()
            .push(ingredient);
    }

    log::debug!(
        "loaded {} meal plan(s) between {start} and {end}",
        planned.len()
    );
    Ok(planned
        .into_iter()
        .map(|(meal_plan, recipe)| PlannedMeal {
            meal_plan,
            recipe: RecipeWithIngredients {
                ingredients: ingredients_by_recipe
                    .get(&recipe.id)
                    .cloned()
                    .unwrap_or_default(),
                recipe,
            },
        })
        .collect())
}

#[cfg(test)]
pub(crate) fn test_recipe(title: &str, ingredients: &[(&str, &str)]) -> NewRecipe {
    use crate::database::models::NewIngredient;

    NewRecipe {
        title: title.into(),
        instructions: "Mix everything.".into(),
        total_time: 30,
        category: "Dinner".into(),
        ingredients: ingredients
            .iter()
            .map(|(name, quantity)| NewIngredient {
                name: (*name).into(),
                quantity: (*quantity).into(),
            })
            .collect(),
    }
}

#[cfg(test)]
fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

#[test]
fn create_and_get_recipe() {
    let mut conn = database::establish_in_memory_connection();
    let crepes = create_recipe(
        &mut conn,
        test_recipe("Crêpes", &[("Farine", "250g"), ("Oeufs", "4"), ("Lait", "50cl")]),
    )
    .unwrap();
    let soup = create_recipe(&mut conn, test_recipe("Soupe", &[("Poireaux", "3")])).unwrap();

    assert_eq!(crepes.id, RecipeId::INITIAL);
    assert_eq!(soup.id, RecipeId::INITIAL.next());

    let loaded = get_recipe(&mut conn, crepes.id).unwrap().unwrap();
    assert_eq!(loaded.recipe, crepes);
    let names: Vec<_> = loaded.ingredients.iter().map(|i| &i.name[..]).collect();
    assert_eq!(names, ["Farine", "Oeufs", "Lait"]);
    assert!(loaded.ingredients.iter().all(|i| i.recipe_id == crepes.id));

    assert!(get_recipe(&mut conn, RecipeId::from(42)).unwrap().is_none());
}

#[test]
fn create_recipe_rejects_huge_total_time() {
    let mut conn = database::establish_in_memory_connection();
    let mut recipe = test_recipe("Cassoulet", &[]);
    recipe.total_time = u32::MAX;
    assert!(create_recipe(&mut conn, recipe).is_err());
    assert!(get_recipes(&mut conn, 0, DEFAULT_RECIPE_LIMIT)
        .unwrap()
        .is_empty());
}

#[test]
fn list_recipes_paginates() {
    let mut conn = database::establish_in_memory_connection();
    for title in ["A", "B", "C", "D"] {
        create_recipe(&mut conn, test_recipe(title, &[])).unwrap();
    }

    let titles = |recipes: Vec<Recipe>| -> Vec<String> {
        recipes.into_iter().map(|r| r.title).collect()
    };
    assert_eq!(titles(get_recipes(&mut conn, 0, 100).unwrap()), ["A", "B", "C", "D"]);
    assert_eq!(titles(get_recipes(&mut conn, 1, 2).unwrap()), ["B", "C"]);
    assert!(get_recipes(&mut conn, 4, 100).unwrap().is_empty());
}

#[test]
fn delete_recipe_removes_ingredients_and_meal_plans() {
    let mut conn = database::establish_in_memory_connection();
    let kept = create_recipe(&mut conn, test_recipe("Salade", &[("Laitue", "1")])).unwrap();
    let doomed = create_recipe(&mut conn, test_recipe("Gratin", &[("Pommes de terre", "1kg")]))
        .unwrap();
    for (recipe, meal_type) in [(&kept, "Midi"), (&doomed, "Soir")] {
        assign_meal(
            &mut conn,
            NewMealPlan {
                date: date("2024-03-04"),
                meal_type: meal_type.into(),
                recipe_id: recipe.id,
            },
        )
        .unwrap();
    }

    let deleted = delete_recipe(&mut conn, doomed.id).unwrap();
    assert_eq!(deleted, Some(doomed.clone()));
    assert!(get_recipe(&mut conn, doomed.id).unwrap().is_none());

    let ingredient_count: i64 = database::schema::ingredients::table
        .count()
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(ingredient_count, 1);

    let plans = get_meal_plans(&mut conn, date("2024-03-04"), date("2024-03-04")).unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].recipe.recipe, kept);

    assert_eq!(delete_recipe(&mut conn, doomed.id).unwrap(), None);
}

#[test]
fn assign_meal_replaces_same_slot() {
    let mut conn = database::establish_in_memory_connection();
    let first = create_recipe(&mut conn, test_recipe("Omelette", &[("Oeufs", "3")])).unwrap();
    let second = create_recipe(&mut conn, test_recipe("Tartines", &[("Pain", "1")])).unwrap();

    let assign = |conn: &mut database::Connection, meal_type: &str, recipe_id| {
        assign_meal(
            conn,
            NewMealPlan {
                date: date("2024-03-05"),
                meal_type: meal_type.into(),
                recipe_id,
            },
        )
        .unwrap()
    };
    assign(&mut conn, "Matin", first.id);
    assign(&mut conn, "Soir", first.id);
    let replacement = assign(&mut conn, "Matin", second.id);

    let plans = get_meal_plans(&mut conn, date("2024-03-05"), date("2024-03-05")).unwrap();
    assert_eq!(plans.len(), 2);

    let morning: Vec<_> = plans
        .iter()
        .filter(|p| p.meal_plan.meal_type == "Matin")
        .collect();
    assert_eq!(morning.len(), 1);
    assert_eq!(morning[0].meal_plan, replacement);
    assert_eq!(morning[0].recipe.recipe, second);
}

#[test]
fn meal_plans_range_is_inclusive() {
    let mut conn = database::establish_in_memory_connection();
    let recipe = create_recipe(
        &mut conn,
        test_recipe("Ratatouille", &[("Courgette", "2"), ("Aubergine", "1")]),
    )
    .unwrap();
    for day in ["2024-03-03", "2024-03-04", "2024-03-10", "2024-03-11"] {
        assign_meal(
            &mut conn,
            NewMealPlan {
                date: date(day),
                meal_type: "Soir".into(),
                recipe_id: recipe.id,
            },
        )
        .unwrap();
    }

    let plans = get_meal_plans(&mut conn, date("2024-03-04"), date("2024-03-10")).unwrap();
    let days: Vec<_> = plans.iter().map(|p| p.meal_plan.date).collect();
    assert_eq!(days, [date("2024-03-04"), date("2024-03-10")]);
    for plan in &plans {
        assert_eq!(plan.recipe.ingredients.len(), 2);
    }

    assert!(
        get_meal_plans(&mut conn, date("2024-04-01"), date("2024-04-07"))
            .unwrap()
            .is_empty()
    );
}
