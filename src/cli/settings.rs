use ansi_term::Colour;
use anyhow::Result;

use crate::stats::analysis::effective_goal;
use crate::storage::data_access::DataAccess;
use crate::storage::entities::ThemeMode;
use crate::storage::validation::validate_monthly_goal;

pub async fn process_goal_command(data: &impl DataAccess, value: Option<u32>) -> Result<()> {
    match value {
        None => {
            let stored = data.monthly_goal().await;
            let goal = effective_goal(stored);
            if stored == 0 {
                println!("Monthly goal: {goal} (default)");
            } else {
                println!("Monthly goal: {goal}");
            }
        }
        Some(goal) => {
            if let Err(e) = validate_monthly_goal(goal) {
                println!("{}", Colour::Red.paint(e.to_string()));
                return Ok(());
            }
            data.save_monthly_goal(goal).await?;
            println!("Monthly goal set to {goal}.");
        }
    }
    Ok(())
}

pub async fn process_theme_command(data: &impl DataAccess, mode: Option<ThemeMode>) -> Result<()> {
    match mode {
        None => println!("Theme: {}", data.theme_mode().await),
        Some(mode) => {
            data.save_theme_mode(mode).await?;
            println!("Theme set to {mode}.");
        }
    }
    Ok(())
}
