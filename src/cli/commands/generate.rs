//! Generate keywords command handler

use crate::config::Config;
use crate::state::SharedState;

use super::parse_id;

pub async fn cmd_generate(config: Config, id_str: &str, save: bool) -> anyhow::Result<()> {
    let id = parse_id(id_str)?;
    let state = SharedState::new(config).await?;

    let keywords = if save {
        state.keyword_service.generate(id).await?
    } else {
        let facility = state.facility_service.get(id).await?;
        state.generator.generate(&facility).await
    };

    println!("{}", serde_json::to_string_pretty(&keywords)?);

    if save {
        eprintln!("✓ Saved {} keywords for facility {id}", keywords.len());
    }

    Ok(())
}
