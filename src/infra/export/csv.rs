use std::path::Path;

use anyhow::{Context, Result};

use crate::usecase::services::export_service::ExportTable;

pub fn write_csv(path: &Path, table: &ExportTable) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create csv: {}", path.display()))?;

    writer
        .write_record(&table.headers)
        .context("failed to write csv header")?;
    for row in &table.rows {
        writer
            .write_record(row)
            .context("failed to write csv record")?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush csv: {}", path.display()))?;

    Ok(table.rows.len())
}
