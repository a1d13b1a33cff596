//! Tables command: current-period record listing with search, pagination
//! and CSV export

use chrono::{Local, NaiveDateTime};
use std::path::Path;
use std::str::FromStr;

use crate::aggregate::in_current_period;
use crate::baserow::BaserowClient;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{
    parse_created_on, ClientRecord, ConversionRecord, InteractionRecord, TimeFilter, Timestamped,
};

/// Which record collection to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Clients,
    Interactions,
    Conversions,
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "clients" | "clientes" => Ok(Collection::Clients),
            "interactions" | "interacoes" => Ok(Collection::Interactions),
            "conversions" | "conversoes" => Ok(Collection::Conversions),
            other => Err(Error::InvalidArgument(format!(
                "unknown collection: {} (expected clients, interactions or conversions)",
                other
            ))),
        }
    }
}

/// Listing options shared by the three collections.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub filter: TimeFilter,
    pub completed_only: bool,
    pub search: Option<String>,
    pub page: usize,
    pub page_size: usize,
}

pub async fn run(
    config: &Config,
    collection: Collection,
    options: &ListOptions,
    output: Option<&Path>,
) -> Result<()> {
    let client = BaserowClient::new(config)?;
    let now = Local::now().naive_local();

    match collection {
        Collection::Clients => {
            let rows = client
                .fetch_all_rows::<ClientRecord>(config.tables.clients)
                .await?;
            list_clients(&rows, options, now, output)
        }
        Collection::Interactions => {
            let rows = client
                .fetch_all_rows::<InteractionRecord>(config.tables.interactions)
                .await?;
            list_interactions(&rows, options, now, output)
        }
        Collection::Conversions => {
            let rows = client
                .fetch_all_rows::<ConversionRecord>(config.tables.conversions)
                .await?;
            list_conversions(&rows, options, now, output)
        }
    }
}

fn list_clients(
    rows: &[ClientRecord],
    options: &ListOptions,
    now: NaiveDateTime,
    output: Option<&Path>,
) -> Result<()> {
    let filtered: Vec<&ClientRecord> = rows
        .iter()
        .filter(|r| !options.completed_only || r.completed())
        .filter(|r| in_period(*r, options.filter, now))
        .filter(|r| {
            matches_search(
                options.search.as_deref(),
                &[r.nome.as_deref(), r.email.as_deref(), r.telefone.as_deref()],
            )
        })
        .collect();

    if let Some(path) = output {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["id", "nome", "email", "telefone", "registro", "criado"])?;
        for r in &filtered {
            writer.write_record([
                r.id.to_string(),
                field(&r.nome),
                field(&r.email),
                field(&r.telefone),
                if r.completed() { "concluído" } else { "pendente" }.to_string(),
                format_date(r.created_on.as_deref()),
            ])?;
        }
        writer.flush()?;
        println!("Exportado: {} registros -> {}", filtered.len(), path.display());
        return Ok(());
    }

    let (start, end, total_pages) = page_bounds(filtered.len(), options);
    for (i, r) in filtered[start..end].iter().enumerate() {
        println!("{}. {}", start + i + 1, r.nome.as_deref().unwrap_or("(sem nome)"));
        println!(
            "   ID: {} | Email: {} | Telefone: {}",
            r.id,
            r.email.as_deref().unwrap_or("-"),
            r.telefone.as_deref().unwrap_or("-")
        );
        println!(
            "   Registro: {} | Criado: {}",
            if r.completed() { "concluído" } else { "pendente" },
            format_date(r.created_on.as_deref())
        );
        println!();
    }
    print_footer(filtered.len(), options.page, total_pages);
    Ok(())
}

fn list_interactions(
    rows: &[InteractionRecord],
    options: &ListOptions,
    now: NaiveDateTime,
    output: Option<&Path>,
) -> Result<()> {
    let filtered: Vec<&InteractionRecord> = rows
        .iter()
        .filter(|r| in_period(*r, options.filter, now))
        .filter(|r| {
            matches_search(
                options.search.as_deref(),
                &[
                    r.session_id.as_deref(),
                    r.action.as_deref(),
                    r.chat_input.as_deref(),
                ],
            )
        })
        .collect();

    if let Some(path) = output {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["id", "sessao", "acao", "mensagem", "criado"])?;
        for r in &filtered {
            writer.write_record([
                r.id.to_string(),
                field(&r.session_id),
                field(&r.action),
                field(&r.chat_input),
                format_date(r.created_on.as_deref()),
            ])?;
        }
        writer.flush()?;
        println!("Exportado: {} registros -> {}", filtered.len(), path.display());
        return Ok(());
    }

    let (start, end, total_pages) = page_bounds(filtered.len(), options);
    for (i, r) in filtered[start..end].iter().enumerate() {
        println!(
            "{}. Sessão {} | Ação: {}",
            start + i + 1,
            r.session_id.as_deref().unwrap_or("-"),
            r.action.as_deref().unwrap_or("-")
        );
        if let Some(input) = r.chat_input.as_deref() {
            println!("   Mensagem: {}", input);
        }
        println!("   ID: {} | Criado: {}", r.id, format_date(r.created_on.as_deref()));
        println!();
    }
    print_footer(filtered.len(), options.page, total_pages);
    Ok(())
}

fn list_conversions(
    rows: &[ConversionRecord],
    options: &ListOptions,
    now: NaiveDateTime,
    output: Option<&Path>,
) -> Result<()> {
    let filtered: Vec<&ConversionRecord> = rows
        .iter()
        .filter(|r| in_period(*r, options.filter, now))
        .filter(|r| {
            matches_search(
                options.search.as_deref(),
                &[r.session_id.as_deref(), r.conversion_type.as_deref()],
            )
        })
        .collect();

    if let Some(path) = output {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["id", "sessao", "tipo", "valor", "criado"])?;
        for r in &filtered {
            writer.write_record([
                r.id.to_string(),
                field(&r.session_id),
                field(&r.conversion_type),
                r.conversion_value.map(|v| v.to_string()).unwrap_or_default(),
                format_date(r.created_on.as_deref()),
            ])?;
        }
        writer.flush()?;
        println!("Exportado: {} registros -> {}", filtered.len(), path.display());
        return Ok(());
    }

    let (start, end, total_pages) = page_bounds(filtered.len(), options);
    for (i, r) in filtered[start..end].iter().enumerate() {
        println!(
            "{}. {} | Valor: {}",
            start + i + 1,
            r.conversion_type.as_deref().unwrap_or("(sem tipo)"),
            r.conversion_value
                .map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| "-".to_string())
        );
        println!(
            "   ID: {} | Sessão: {} | Criado: {}",
            r.id,
            r.session_id.as_deref().unwrap_or("-"),
            format_date(r.created_on.as_deref())
        );
        println!();
    }
    print_footer(filtered.len(), options.page, total_pages);
    Ok(())
}

/// Records with an invalid date never show in time-filtered listings.
fn in_period<T: Timestamped>(record: &T, filter: TimeFilter, now: NaiveDateTime) -> bool {
    record
        .created_at()
        .map_or(false, |ts| in_current_period(filter, ts, now))
}

fn matches_search(search: Option<&str>, fields: &[Option<&str>]) -> bool {
    let Some(term) = search else {
        return true;
    };
    let term = term.to_lowercase();
    if term.is_empty() {
        return true;
    }
    fields
        .iter()
        .copied()
        .flatten()
        .any(|value| value.to_lowercase().contains(&term))
}

fn page_bounds(total: usize, options: &ListOptions) -> (usize, usize, usize) {
    let page_size = options.page_size.max(1);
    let total_pages = total.div_ceil(page_size).max(1);
    let page = options.page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    (start, end, total_pages)
}

fn print_footer(total: usize, page: usize, total_pages: usize) {
    println!("Página {} de {} ({} registros)", page.min(total_pages), total_pages, total);
}

fn format_date(raw: Option<&str>) -> String {
    match raw.and_then(parse_created_on) {
        Some(ts) => ts.format("%d/%m/%Y %H:%M").to_string(),
        None => "Data inválida".to_string(),
    }
}

fn field(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_from_str() {
        assert_eq!("clients".parse::<Collection>().unwrap(), Collection::Clients);
        assert_eq!(
            "Interactions".parse::<Collection>().unwrap(),
            Collection::Interactions
        );
        assert_eq!(
            "conversoes".parse::<Collection>().unwrap(),
            Collection::Conversions
        );
        assert!("users".parse::<Collection>().is_err());
    }

    #[test]
    fn test_matches_search_case_insensitive() {
        let fields = [Some("Maria Silva"), Some("maria@example.com"), None];
        assert!(matches_search(Some("MARIA"), &fields));
        assert!(matches_search(Some("silva"), &fields));
        assert!(!matches_search(Some("joão"), &fields));
        assert!(matches_search(None, &fields));
        assert!(matches_search(Some(""), &fields));
    }

    #[test]
    fn test_page_bounds() {
        let options = ListOptions {
            filter: TimeFilter::Month,
            completed_only: false,
            search: None,
            page: 2,
            page_size: 10,
        };
        assert_eq!(page_bounds(25, &options), (10, 20, 3));

        // Page past the end clamps to the last page
        let options = ListOptions { page: 9, ..options };
        assert_eq!(page_bounds(25, &options), (20, 25, 3));
    }

    #[test]
    fn test_page_bounds_empty() {
        let options = ListOptions {
            filter: TimeFilter::Month,
            completed_only: false,
            search: None,
            page: 1,
            page_size: 10,
        };
        assert_eq!(page_bounds(0, &options), (0, 0, 1));
    }

    #[test]
    fn test_format_date() {
        assert_eq!(
            format_date(Some("2024-03-15T10:30:00Z")),
            "15/03/2024 10:30"
        );
        assert_eq!(format_date(Some("garbage")), "Data inválida");
        assert_eq!(format_date(None), "Data inválida");
    }
}
