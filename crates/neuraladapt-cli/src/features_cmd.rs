//! CLI handlers for `neuraladapt features`.

use anyhow::Result;
use sqlx::SqlitePool;

use neuraladapt_db::models::{Feature, FeatureSelectionRecord, FeatureSelectionUpdate};
use neuraladapt_db::queries::feature_selections;

use crate::FeatureCommands;

pub async fn run_features_command(
    command: FeatureCommands,
    pool: &SqlitePool,
    user_id: &str,
) -> Result<()> {
    let record = match command {
        FeatureCommands::Show => feature_selections::get_feature_selections(pool, user_id).await?,
        FeatureCommands::Set { feature, enabled } => {
            let update = FeatureSelectionUpdate::set(feature, enabled);
            let record =
                feature_selections::update_feature_selections(pool, user_id, &update).await?;
            println!("{feature} {}.", if enabled { "enabled" } else { "disabled" });
            record
        }
    };
    print!("{}", format_selections(&record));
    Ok(())
}

fn format_selections(record: &FeatureSelectionRecord) -> String {
    let mut out = String::new();
    for feature in Feature::ALL {
        let mark = if record.is_enabled(feature) { "on" } else { "off" };
        out.push_str(&format!("  {:<20} {mark}\n", feature.to_string()));
    }
    out
}
