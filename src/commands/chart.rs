//! Chart command: bucketed series for the selected granularity

use chrono::Local;

use crate::aggregate::{compute_series, ExcludedCounts};
use crate::baserow::BaserowClient;
use crate::config::Config;
use crate::error::Result;
use crate::models::TimeFilter;

pub async fn run(
    config: &Config,
    filter: TimeFilter,
    completed_only: bool,
    json: bool,
) -> Result<()> {
    let client = BaserowClient::new(config)?;
    let data = client.load_dashboard(&config.tables).await.into_data()?;
    let now = Local::now().naive_local();

    let series = compute_series(
        &data.clients,
        &data.interactions,
        &data.conversions,
        filter,
        completed_only,
        now,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&series)?);
        return Ok(());
    }

    let clients_header = if completed_only {
        "Concluídos"
    } else {
        "Cadastros"
    };
    println!(
        "{:<6} {:>10} {:>11} {:>10}",
        "", clients_header, "Interações", "Conversões"
    );
    for (i, label) in series.labels.iter().enumerate() {
        println!(
            "{:<6} {:>10} {:>11} {:>10}",
            label, series.clients[i], series.interactions[i], series.conversions[i]
        );
    }

    if series.excluded != ExcludedCounts::default() {
        println!(
            "\nRegistros sem data válida (ignorados): cadastros {}, interações {}, conversões {}",
            series.excluded.clients, series.excluded.interactions, series.excluded.conversions
        );
    }

    Ok(())
}
