//! Overview command: metric cards with previous-period deltas

use chrono::Local;
use serde::Serialize;

use crate::aggregate::{current_period_counts, percent_change, previous_period_counts};
use crate::baserow::BaserowClient;
use crate::config::Config;
use crate::error::Result;
use crate::models::TimeFilter;

#[derive(Debug, Serialize)]
pub struct MetricCard {
    pub title: String,
    pub current: u32,
    pub previous: u32,
    pub change_percent: f64,
}

pub async fn run(
    config: &Config,
    filter: TimeFilter,
    completed_only: bool,
    json: bool,
) -> Result<()> {
    let client = BaserowClient::new(config)?;
    let data = client.load_dashboard(&config.tables).await.into_data()?;
    let now = Local::now().naive_local();

    let current = current_period_counts(
        &data.clients,
        &data.interactions,
        &data.conversions,
        filter,
        completed_only,
        now,
    );
    let previous = previous_period_counts(
        &data.clients,
        &data.interactions,
        &data.conversions,
        filter,
        completed_only,
        now,
    );

    let clients_title = if completed_only {
        "Cadastros Concluídos"
    } else {
        "Total Cadastros"
    };
    let cards = vec![
        MetricCard {
            title: clients_title.to_string(),
            current: current.clients,
            previous: previous.clients,
            change_percent: percent_change(current.clients, previous.clients),
        },
        MetricCard {
            title: "Total Interações".to_string(),
            current: current.interactions,
            previous: previous.interactions,
            change_percent: percent_change(current.interactions, previous.interactions),
        },
        MetricCard {
            title: "Total Conversões".to_string(),
            current: current.conversions,
            previous: previous.conversions,
            change_percent: percent_change(current.conversions, previous.conversions),
        },
    ];

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }

    let period = match filter {
        TimeFilter::Year => "ano",
        TimeFilter::Month => "mês",
        TimeFilter::Day => "dia",
    };

    for card in &cards {
        println!("{}: {}", card.title, card.current);
        if card.change_percent == 0.0 {
            println!("   Sem alteração em relação ao {} anterior", period);
        } else {
            let arrow = if card.change_percent > 0.0 { "↑" } else { "↓" };
            println!(
                "   {} {:.1}% em relação ao {} anterior ({} no período anterior)",
                arrow,
                card.change_percent.abs(),
                period,
                card.previous
            );
        }
        println!();
    }

    Ok(())
}
