use std::path::PathBuf;

use ansi_term::Colour;
use anyhow::{Context, Result};

use crate::storage::backup::{
    self, csv_export_filename, json_export_filename, ImportError,
};
use crate::storage::data_access::DataAccess;
use crate::utils::clock::Clock;

pub async fn process_export_command(
    data: &impl DataAccess,
    clock: &impl Clock,
    csv: bool,
    out: Option<PathBuf>,
) -> Result<()> {
    let today = clock.now().date_naive();
    let (contents, default_name) = if csv {
        let logs = data.logs().await;
        (backup::export_csv(&logs), csv_export_filename(today))
    } else {
        (backup::export_json(data).await?, json_export_filename(today))
    };

    let path = out.unwrap_or_else(|| PathBuf::from(default_name));
    tokio::fs::write(&path, contents)
        .await
        .with_context(|| format!("Failed to write export to {path:?}"))?;
    println!("Exported to {}", path.display());
    Ok(())
}

pub async fn process_import_command(data: &impl DataAccess, file: PathBuf) -> Result<()> {
    let contents = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("Failed to read {file:?}"))?;

    match backup::import_json(data, &contents).await {
        Ok(summary) => println!("Imported {} records.", summary.accepted),
        Err(ImportError::Parse(message)) => {
            println!("{}", Colour::Red.paint(format!("Import failed: {message}")));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn process_clear_command(data: &impl DataAccess, yes: bool) -> Result<()> {
    if !yes {
        println!("This removes every log entry, custom trigger and setting.");
        println!("Re-run with --yes to confirm.");
        return Ok(());
    }

    data.clear_all().await?;
    println!("All data cleared.");
    Ok(())
}
