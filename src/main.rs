// Copyright 2023 Remi Bernotavicius

use clap::Parser;
use clap::Subcommand;
use database::models::{NewMealPlan, NewRecipe, RecipeId};
use export::ExportFormat;
use std::path::PathBuf;
use week::MealWeek;

mod database;
mod export;
mod planner;
mod query;
mod recipe_input;
mod shopping;
mod week;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
type Result<T> = std::result::Result<T, Error>;

#[derive(Parser, Debug)]
#[command(about = "Plan the week's meals and build the shopping list")]
struct Args {
    /// Where the database and exported lists live. Defaults to the user's data directory.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    AddRecipe {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        instructions: String,
        /// Minutes
        #[arg(long)]
        total_time: u32,
        #[arg(long)]
        category: String,
        /// An ingredient as `quantity:name`, e.g. `200g:farine`. May be repeated.
        #[arg(long = "ingredient")]
        ingredients: Vec<String>,
        /// A file with one `quantity:name` ingredient per line.
        #[arg(long)]
        ingredients_file: Option<PathBuf>,
    },
    Recipes {
        #[arg(long, default_value_t = 0)]
        skip: i64,
        #[arg(long, default_value_t = query::DEFAULT_RECIPE_LIMIT)]
        limit: i64,
    },
    Recipe {
        id: i32,
    },
    DeleteRecipe {
        id: i32,
    },
    /// Assigns a recipe to a meal, replacing whatever was planned for it.
    Assign {
        date: chrono::NaiveDate,
        meal_type: String,
        recipe_id: i32,
    },
    Planner {
        /// Any day of the week to show. Defaults to today.
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
    ShoppingList {
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
    Export {
        format: ExportFormat,
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
        /// Directory to write to. Defaults to `shopping-lists` in the data directory.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Open the file once it is written.
        #[arg(long)]
        open: bool,
    },
}

/// This is where the database and other user-data lives on-disk. On Linux it should be like:
/// `~/.local/share/meal_planner/`
fn data_path(data_dir: Option<PathBuf>) -> Result<PathBuf> {
    let path = match data_dir {
        Some(path) => path,
        None => directories::BaseDirs::new()
            .ok_or("failed to get user home directory")?
            .data_dir()
            .join("meal_planner"),
    };
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

fn week_of(date: Option<chrono::NaiveDate>) -> MealWeek {
    date.map_or_else(MealWeek::this_week, MealWeek::containing)
}

fn add_recipe(
    conn: &mut database::Connection,
    mut recipe: NewRecipe,
    ingredient_lines: Vec<String>,
    ingredients_file: Option<PathBuf>,
) -> Result<()> {
    let mut text = ingredient_lines.join("\n");
    if let Some(path) = ingredients_file {
        text.push('\n');
        text += &std::fs::read_to_string(path)?;
    }
    recipe.ingredients = recipe_input::parse_ingredient_lines(&text);

    let recipe = query::create_recipe(conn, recipe)?;
    println!("created recipe #{} {}", recipe.id, recipe.title);
    Ok(())
}

fn list_recipes(conn: &mut database::Connection, skip: i64, limit: i64) -> Result<()> {
    for recipe in query::get_recipes(conn, skip, limit)? {
        println!(
            "#{:<4} {} ({}, {} min)",
            recipe.id, recipe.title, recipe.category, recipe.total_time
        );
    }
    Ok(())
}

fn show_recipe(conn: &mut database::Connection, id: RecipeId) -> Result<()> {
    let details = query::get_recipe(conn, id)?.ok_or_else(|| format!("no recipe #{id}"))?;
    let recipe = details.recipe;
    println!("#{} {}", recipe.id, recipe.title);
    println!("{}, {} min", recipe.category, recipe.total_time);
    println!();
    for ingredient in details.ingredients {
        println!("  {:<10} {}", ingredient.quantity, ingredient.name);
    }
    if !recipe.instructions.is_empty() {
        println!();
        println!("{}", recipe.instructions);
    }
    Ok(())
}

fn print_shopping_list(conn: &mut database::Connection, week: MealWeek) -> Result<()> {
    let items = shopping::shopping_list_for_week(conn, week)?;
    println!("Liste de Courses, {week}");
    for item in &items {
        println!("  {item}");
    }
    Ok(())
}

fn export_shopping_list(
    conn: &mut database::Connection,
    dir: PathBuf,
    format: ExportFormat,
    week: MealWeek,
    open_file: bool,
) -> Result<()> {
    let items = shopping::shopping_list_for_week(conn, week)?;
    let path = export::save_shopping_list(&dir, format, week, &items)?;
    println!("{}", path.display());
    if open_file {
        open::that(path)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    simple_logger::SimpleLogger::new()
        .with_level(level)
        .env()
        .init()?;

    let data_path = data_path(args.data_dir)?;
    let mut conn = database::establish_connection(data_path.join("data.sqlite"))?;
    match args.commands {
        Commands::AddRecipe {
            title,
            instructions,
            total_time,
            category,
            ingredients,
            ingredients_file,
        } => {
            let recipe = NewRecipe {
                title,
                instructions,
                total_time,
                category,
                ingredients: vec![],
            };
            add_recipe(&mut conn, recipe, ingredients, ingredients_file)?
        }
        Commands::Recipes { skip, limit } => list_recipes(&mut conn, skip, limit)?,
        Commands::Recipe { id } => show_recipe(&mut conn, id.into())?,
        Commands::DeleteRecipe { id } => match query::delete_recipe(&mut conn, id.into())? {
            Some(recipe) => println!("deleted recipe #{} {}", recipe.id, recipe.title),
            None => println!("no recipe #{id}"),
        },
        Commands::Assign {
            date,
            meal_type,
            recipe_id,
        } => {
            let recipe_id = RecipeId::from(recipe_id);
            query::get_recipe(&mut conn, recipe_id)?
                .ok_or_else(|| format!("no recipe #{recipe_id}"))?;
            let meal_plan = query::assign_meal(
                &mut conn,
                NewMealPlan {
                    date,
                    meal_type,
                    recipe_id,
                },
            )?;
            println!(
                "{} {}: recipe #{}",
                meal_plan.date, meal_plan.meal_type, meal_plan.recipe_id
            );
        }
        Commands::Planner { date } => {
            let plan = planner::WeekPlan::load(&mut conn, week_of(date))?;
            if plan.is_empty() {
                log::info!("nothing planned for the {}", plan.week());
            }
            print!("{plan}");
        }
        Commands::ShoppingList { date } => print_shopping_list(&mut conn, week_of(date))?,
        Commands::Export {
            format,
            date,
            output,
            open,
        } => {
            let dir = output.unwrap_or_else(|| data_path.join("shopping-lists"));
            export_shopping_list(&mut conn, dir, format, week_of(date), open)?
        }
    }
    Ok(())
}
