use std::collections::HashMap;

use ansi_term::Colour;
use anyhow::Result;
use clap::Subcommand;

use crate::storage::data_access::DataAccess;
use crate::triggers::{self, TriggerError};

#[derive(Subcommand, Debug)]
pub enum TriggersCommand {
    #[command(about = "List all triggers with usage counts")]
    List,
    #[command(about = "Add a custom trigger")]
    Add {
        name: String,
        #[arg(long, default_value = "star", help = "Symbolic icon key")]
        icon: String,
    },
    #[command(about = "Rename a custom trigger or change its icon")]
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    #[command(about = "Remove a custom trigger. Logged events keep its label")]
    Remove { id: String },
}

pub async fn process_triggers_command(
    data: &impl DataAccess,
    command: TriggersCommand,
) -> Result<()> {
    match command {
        TriggersCommand::List => {
            let counts: HashMap<String, usize> =
                triggers::usage_stats(data).await.into_iter().collect();
            let all = triggers::list_all(data).await;
            let widest = all.iter().map(|t| t.name.len()).max().unwrap_or(0);

            for trigger in all {
                let count = counts.get(&trigger.name).copied().unwrap_or(0);
                let kind = if trigger.is_custom { "custom" } else { "built-in" };
                println!(
                    "{:widest$}  {:>4}  {kind:8}  {}",
                    trigger.name, count, trigger.id
                );
            }
        }
        TriggersCommand::Add { name, icon } => match triggers::add_custom(data, &name, &icon).await
        {
            Ok(trigger) => println!("Added trigger {} ({})", trigger.name, trigger.id),
            Err(e) => return report(e),
        },
        TriggersCommand::Edit { id, name, icon } => {
            match triggers::update_custom(data, &id, name.as_deref(), icon.as_deref()).await {
                Ok(trigger) => println!("Updated trigger {} ({})", trigger.name, trigger.id),
                Err(e) => return report(e),
            }
        }
        TriggersCommand::Remove { id } => match triggers::delete_custom(data, &id).await {
            Ok(()) => println!("Removed trigger {id}"),
            Err(e) => return report(e),
        },
    }
    Ok(())
}

/// Constraint violations are messages for the user; anything storage-related
/// bubbles up as a real failure.
fn report(error: TriggerError) -> Result<()> {
    match error {
        TriggerError::Storage(e) => Err(e.into()),
        rejection => {
            println!("{}", Colour::Red.paint(rejection.to_string()));
            Ok(())
        }
    }
}
