use anyhow::Result;
use gamecheck_lib::{Lookup, PriceRow, ScoreRecord, TimesRecord};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug, PartialEq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    /// Unknown names fall back to a table.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "csv" => Self::Csv,
            "markdown" | "md" => Self::Markdown,
            _ => Self::Table,
        }
    }
}

#[derive(Tabled, Serialize)]
struct TimesRow {
    #[tabled(rename = "Game")]
    #[serde(rename = "Game")]
    game: String,
    #[tabled(rename = "Main")]
    #[serde(rename = "Main")]
    main: String,
    #[tabled(rename = "Main + Extra")]
    #[serde(rename = "Main + Extra")]
    extra: String,
    #[tabled(rename = "Completionist")]
    #[serde(rename = "Completionist")]
    completionist: String,
}

#[derive(Tabled, Serialize)]
struct ScoreRow {
    #[tabled(rename = "Game")]
    #[serde(rename = "Game")]
    game: String,
    #[tabled(rename = "Metascore")]
    #[serde(rename = "Metascore")]
    metascore: String,
}

#[derive(Tabled, Serialize)]
struct PriceTableRow {
    #[tabled(rename = "Game")]
    #[serde(rename = "Game")]
    game: String,
    #[tabled(rename = "Steam")]
    #[serde(rename = "Steam")]
    steam: String,
    #[tabled(rename = "PlayStation")]
    #[serde(rename = "PlayStation")]
    playstation: String,
    #[tabled(rename = "Amazon")]
    #[serde(rename = "Amazon")]
    amazon: String,
    #[tabled(rename = "Metacritic")]
    #[serde(rename = "Metacritic")]
    metacritic: String,
}

#[derive(Tabled, Serialize)]
struct LookupRow {
    #[tabled(rename = "Source")]
    #[serde(rename = "Source")]
    source: String,
    #[tabled(rename = "Field")]
    #[serde(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    #[serde(rename = "Value")]
    value: String,
    #[tabled(rename = "Matched")]
    #[serde(rename = "Matched")]
    matched: String,
    #[tabled(rename = "Similarity")]
    #[serde(rename = "Similarity")]
    similarity: String,
}

// -- Row builders --

fn build_times_rows(records: &[TimesRecord]) -> Vec<TimesRow> {
    records
        .iter()
        .map(|r| TimesRow {
            game: r.name.clone(),
            main: r.main.clone(),
            extra: r.extra.clone(),
            completionist: r.completionist.clone(),
        })
        .collect()
}

fn build_score_rows(records: &[ScoreRecord]) -> Vec<ScoreRow> {
    records
        .iter()
        .map(|r| ScoreRow {
            game: r.name.clone(),
            metascore: r.score.clone(),
        })
        .collect()
}

fn build_price_rows(rows: &[PriceRow]) -> Vec<PriceTableRow> {
    rows.iter()
        .map(|r| PriceTableRow {
            game: r.name.clone(),
            steam: r.steam.clone(),
            playstation: r.playstation.clone(),
            amazon: r.amazon.clone(),
            metacritic: r.metacritic.clone(),
        })
        .collect()
}

/// One row per extracted field.
fn build_lookup_rows(lookups: &[Lookup]) -> Vec<LookupRow> {
    lookups
        .iter()
        .flat_map(|lookup| {
            let (matched, similarity) = match &lookup.matched {
                Some(m) => (m.label.clone(), format!("{:.2}", m.score)),
                None => ("-".to_string(), "-".to_string()),
            };
            lookup.fields.iter().map(move |field| LookupRow {
                source: lookup.source.display_name().to_string(),
                field: field.name.clone(),
                value: field.render(),
                matched: matched.clone(),
                similarity: similarity.clone(),
            })
        })
        .collect()
}

// -- Rendering --

fn render_rows<R: Tabled + Serialize>(rows: Vec<R>, format: &OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Table => Table::new(rows).to_string(),
        OutputFormat::Markdown => {
            let mut table = Table::new(rows);
            table.with(Style::markdown());
            table.to_string()
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(Vec::new());
            for row in rows {
                wtr.serialize(row)?;
            }
            let bytes = wtr
                .into_inner()
                .map_err(|e| anyhow::anyhow!("failed to flush CSV: {}", e.error()))?;
            String::from_utf8(bytes)?
        }
        OutputFormat::Json => serde_json::to_string_pretty(&rows)?,
    })
}

fn print_rendered(rendered: String) {
    let rendered = rendered.trim_end();
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}

pub fn print_times(records: &[TimesRecord], format: &OutputFormat) -> Result<()> {
    print_rendered(render_rows(build_times_rows(records), format)?);
    Ok(())
}

pub fn print_scores(records: &[ScoreRecord], format: &OutputFormat) -> Result<()> {
    print_rendered(render_rows(build_score_rows(records), format)?);
    Ok(())
}

pub fn print_prices(rows: &[PriceRow], format: &OutputFormat) -> Result<()> {
    print_rendered(render_rows(build_price_rows(rows), format)?);
    Ok(())
}

/// JSON keeps the full lookups, including URLs and typed values.
pub fn print_lookups(lookups: &[Lookup], format: &OutputFormat) -> Result<()> {
    if *format == OutputFormat::Json {
        print_json(&lookups);
        return Ok(());
    }
    print_rendered(render_rows(build_lookup_rows(lookups), format)?);
    Ok(())
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamecheck_lib::engine::{
        Extraction, FieldValue, MatchResult, NormalizedValue, Playtime, ValueKind,
    };
    use gamecheck_lib::Source;

    fn times() -> Vec<TimesRecord> {
        vec![
            TimesRecord {
                name: "Celeste".to_string(),
                main: "8h".to_string(),
                extra: "14h 30m".to_string(),
                completionist: "38h".to_string(),
            },
            TimesRecord::unavailable("Unknown Game"),
        ]
    }

    fn prices() -> Vec<PriceRow> {
        vec![PriceRow {
            name: "Hades".to_string(),
            steam: "24.99 USD".to_string(),
            playstation: "$24.99".to_string(),
            amazon: "N/A".to_string(),
            metacritic: "93".to_string(),
        }]
    }

    fn lookup() -> Lookup {
        Lookup {
            source: Source::HowLongToBeat,
            query: "celeste".to_string(),
            matched: Some(MatchResult {
                identifier: "https://howlongtobeat.com/game/42818".to_string(),
                label: "Celeste".to_string(),
                score: 1.0,
            }),
            url: Some("https://howlongtobeat.com/game/42818".to_string()),
            fields: vec![
                FieldValue {
                    name: "Main".to_string(),
                    kind: ValueKind::Duration,
                    value: NormalizedValue::Duration(Playtime::new(8, 0)),
                },
                FieldValue {
                    name: "Extra".to_string(),
                    kind: ValueKind::Duration,
                    value: NormalizedValue::Unavailable,
                },
            ]
            .into_iter()
            .collect::<Extraction>(),
        }
    }

    #[test]
    fn format_names() {
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("md"), OutputFormat::Markdown);
        assert_eq!(OutputFormat::parse("csv"), OutputFormat::Csv);
        assert_eq!(OutputFormat::parse("xml"), OutputFormat::Table);
    }

    #[test]
    fn times_table_has_headers_and_placeholders() {
        let out = render_rows(build_times_rows(&times()), &OutputFormat::Table).unwrap();
        assert!(out.contains("Main + Extra"));
        assert!(out.contains("14h 30m"));
        assert!(out.contains("--"));
    }

    #[test]
    fn times_markdown() {
        let out = render_rows(build_times_rows(&times()), &OutputFormat::Markdown).unwrap();
        let first = out.lines().next().unwrap();
        assert!(first.starts_with('|'));
        assert!(first.contains("Completionist"));
    }

    #[test]
    fn prices_csv() {
        let out = render_rows(build_price_rows(&prices()), &OutputFormat::Csv).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("Game,Steam,PlayStation,Amazon,Metacritic")
        );
        assert_eq!(lines.next(), Some("Hades,24.99 USD,$24.99,N/A,93"));
    }

    #[test]
    fn scores_json() {
        let records = vec![ScoreRecord {
            name: "Starfield".to_string(),
            score: "tbd".to_string(),
        }];
        let out = render_rows(build_score_rows(&records), &OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["Game"], "Starfield");
        assert_eq!(value[0]["Metascore"], "tbd");
    }

    #[test]
    fn lookup_rows_per_field() {
        let rows = build_lookup_rows(&[lookup()]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source, "HowLongToBeat");
        assert_eq!(rows[0].value, "8h");
        assert_eq!(rows[0].similarity, "1.00");
        assert_eq!(rows[1].value, "--");
    }

    #[test]
    fn lookup_without_match() {
        let mut unmatched = lookup();
        unmatched.matched = None;
        let rows = build_lookup_rows(&[unmatched]);
        assert_eq!(rows[0].matched, "-");
    }

    #[test]
    fn empty_rows_render() {
        let out = render_rows(build_price_rows(&[]), &OutputFormat::Json).unwrap();
        assert_eq!(out.trim(), "[]");
    }
}
