//! meals command

use crate::context::Context;
use anyhow::Result;
use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::json;
use vitaltrack_api_client::endpoints::meals::{Meal, NutritionTotals};
use vitaltrack_cli::{output, print_json, Status};

#[derive(Subcommand)]
pub enum MealsAction {
    /// List logged meals
    List {
        /// Only meals on this day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Delete a meal
    Delete {
        /// Meal ID
        id: String,
    },
}

pub async fn run(ctx: &Context, action: MealsAction) -> Result<()> {
    let client = ctx.client()?;

    match action {
        MealsAction::List { date } => {
            let meals = client.meals().list(date).await?;
            if ctx.format.is_json() {
                print_json(&meals)?;
            } else {
                print_meals(&meals, date);
            }
        }
        MealsAction::Delete { id } => {
            client.meals().delete(&id).await?;
            if ctx.format.is_json() {
                print_json(&json!({ "deleted": id }))?;
            } else {
                Status::success(&format!("Deleted meal {id}"));
            }
        }
    }
    Ok(())
}

fn print_meals(meals: &[Meal], date: Option<NaiveDate>) {
    let title = match date {
        Some(day) => format!("Meals on {day}"),
        None => "Meals".to_string(),
    };
    Status::header(&title);

    if meals.is_empty() {
        Status::info("Nothing logged");
        return;
    }

    let mut day_total = NutritionTotals::default();
    for meal in meals {
        let totals = meal.nutrition();
        day_total.calories += totals.calories;
        day_total.protein += totals.protein;
        day_total.carbs += totals.carbs;
        day_total.fat += totals.fat;

        let label = format!("{:?}", meal.meal_type).to_lowercase();
        Status::field(
            &label,
            &format!(
                "{}  {}",
                output::format_macros(totals.calories, totals.protein, totals.carbs, totals.fat),
                meal.id
            ),
        );
    }

    println!();
    Status::field(
        &output::format_count(meals.len(), "meal", "meals"),
        &output::format_macros(
            day_total.calories,
            day_total.protein,
            day_total.carbs,
            day_total.fat,
        ),
    );
}
