mod export;
mod facilities;
mod generate;

pub use export::cmd_export;
pub use facilities::cmd_list_facilities;
pub use generate::cmd_generate;

use anyhow::Context;

use crate::domain::FacilityId;

fn parse_id(raw: &str) -> anyhow::Result<FacilityId> {
    raw.parse()
        .with_context(|| format!("Invalid facility ID: {raw}"))
}
