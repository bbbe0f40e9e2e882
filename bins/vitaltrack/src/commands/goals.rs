//! goals command

use crate::context::Context;
use anyhow::Result;
use vitaltrack_cli::output::format_amount;
use vitaltrack_cli::{print_json, Status};

pub async fn run(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let goals = client.goals().get().await?;

    if ctx.format.is_json() {
        let mut value = serde_json::to_value(&goals)?;
        if let Some(object) = value.as_object_mut() {
            object.insert("fromDefaults".into(), goals.from_defaults.into());
        }
        print_json(&value)?;
        return Ok(());
    }

    Status::header("Daily nutritional goals");
    Status::field("Calories", &format_amount(goals.calories, "kcal"));
    Status::field("Protein", &format_amount(goals.protein, "g"));
    Status::field("Carbs", &format_amount(goals.carbs, "g"));
    Status::field("Fat", &format_amount(goals.fat, "g"));
    Status::field("Fiber", &format_amount(goals.fiber, "g"));
    Status::field("Sugar", &format_amount(goals.sugar, "g"));
    Status::field("Sodium", &format_amount(goals.sodium, "mg"));
    Status::field("Water", &format_amount(goals.water, "ml"));

    if goals.from_defaults {
        println!();
        Status::warning("Goals service unavailable; showing standard targets");
    }
    Ok(())
}
