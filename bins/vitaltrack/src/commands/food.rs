//! food command

use crate::context::Context;
use anyhow::Result;
use clap::Subcommand;
use vitaltrack_api_client::lookup::DEFAULT_PAGE_SIZE;
use vitaltrack_cli::output::{format_amount, format_count};
use vitaltrack_cli::{print_json, Status};
use vitaltrack_telemetry::Timer;

#[derive(Subcommand)]
pub enum FoodAction {
    /// Search the food database
    Search {
        /// Free-text query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE)]
        limit: u32,
    },

    /// Show one food record
    Show {
        /// Food database ID
        id: u64,
    },
}

pub async fn run(ctx: &Context, action: FoodAction) -> Result<()> {
    let lookup = ctx.lookup()?;

    match action {
        FoodAction::Search { query, limit } => {
            let timer = Timer::start("food_search");
            let result = lookup.search(&query, limit).await?;
            let elapsed = timer.stop();

            if ctx.format.is_json() {
                print_json(&result)?;
                return Ok(());
            }

            Status::header(&format!("Foods matching \"{query}\""));
            for food in &result.foods {
                let source = food
                    .brand_owner
                    .as_deref()
                    .or(food.data_type.as_deref())
                    .unwrap_or("");
                Status::field(&food.fdc_id.to_string(), &format!("{}  {}", food.description, source));
            }
            println!();
            Status::info(&format!(
                "{} of {} in {}",
                format_count(result.foods.len(), "result", "results"),
                result.total_hits,
                vitaltrack_cli::output::format_duration(elapsed)
            ));
        }
        FoodAction::Show { id } => {
            let food = lookup.food(id).await?;

            if ctx.format.is_json() {
                print_json(&food)?;
                return Ok(());
            }

            Status::header(&food.description);
            if let Some(data_type) = &food.data_type {
                Status::field("Type", data_type);
            }
            if let Some(size) = food.serving_size {
                let unit = food.serving_size_unit.as_deref().unwrap_or("");
                Status::field("Serving", &format_amount(size, unit));
            }
            for (label, name, unit) in [
                ("Calories", "Energy", "kcal"),
                ("Protein", "Protein", "g"),
                ("Carbs", "Carbohydrate, by difference", "g"),
                ("Fat", "Total lipid (fat)", "g"),
            ] {
                if let Some(amount) = food.nutrient(name) {
                    Status::field(label, &format_amount(amount, unit));
                }
            }
        }
    }
    Ok(())
}
