//! Export command handler

use crate::config::Config;
use crate::services::ExportFormat;
use crate::state::SharedState;

use super::parse_id;

pub async fn cmd_export(config: Config, id_str: &str, format: ExportFormat) -> anyhow::Result<()> {
    let id = parse_id(id_str)?;
    let state = SharedState::new(config).await?;

    let file = state.export_service.export(id, format).await?;
    print!("{}", file.body);

    Ok(())
}
