//! List facilities command handler

use crate::config::Config;
use crate::models::FacilityFilter;
use crate::state::SharedState;

pub async fn cmd_list_facilities(
    config: Config,
    search: Option<String>,
    business_type: Option<String>,
    limit: u64,
) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    let page = state
        .facility_service
        .list(FacilityFilter {
            business_type,
            search,
            limit: limit.max(1),
            offset: 0,
        })
        .await?;

    if page.items.is_empty() {
        println!("No facilities found.");
        return Ok(());
    }

    println!("Facilities ({} of {} shown)", page.items.len(), page.total);
    println!("{:-<70}", "");

    for facility in page.items {
        let keywords = state
            .keyword_service
            .get(facility.id)
            .await
            .map(|k| k.len())
            .unwrap_or(0);

        println!("[{}] {}", facility.id, facility.facility_name);
        println!(
            "  Type: {} | Address: {} | Keywords: {keywords}",
            facility.business_type.as_deref().unwrap_or("-"),
            facility.address.as_deref().unwrap_or("-"),
        );
    }

    Ok(())
}
