//! `roster import` command - Import employees from CSV files
//!
//! Expected header (case and separators in names are ignored):
//!
//! ```text
//! firstName,lastName,street,postcode,city,phone,skills
//! Anna,Bella,Hauptstraße 1,10115,Berlin,+49 30 123456,Java;SQL
//! ```
//!
//! Skills are qualification names separated by `;`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

use console::style;
use csv::{ReaderBuilder, StringRecord};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{connect, load_config};
use crate::cli::GlobalOpts;
use crate::core::reconcile::prepare_employee_payload;
use crate::entities::{Employee, SkillReference};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import
    pub file: PathBuf,

    /// Resolve skills against the catalog without creating anything
    #[arg(long)]
    pub dry_run: bool,

    /// Continue importing after errors (default: stop on first error)
    #[arg(long)]
    pub skip_errors: bool,
}

/// Import statistics
#[derive(Debug, Default)]
struct ImportStats {
    rows_processed: usize,
    created: usize,
    errors: usize,
}

/// A row that passed parsing and validation
#[derive(Debug)]
struct ImportRow {
    row_num: usize,
    employee: Employee,
}

/// Normalize a header: lower case, no spaces, underscores or dashes
fn normalize_header(header: &str) -> String {
    header
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Build a map from normalized header name to column index
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (normalize_header(h), i))
        .collect()
}

/// Get a trimmed, non-empty field value from a CSV record
fn get_field(record: &StringRecord, header_map: &HashMap<String, usize>, field: &str) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn employee_from_record(record: &StringRecord, header_map: &HashMap<String, usize>) -> Employee {
    let mut employee = Employee::new(
        get_field(record, header_map, "firstname").unwrap_or_default(),
        get_field(record, header_map, "lastname").unwrap_or_default(),
    );
    employee.street = get_field(record, header_map, "street");
    employee.postcode = get_field(record, header_map, "postcode");
    employee.city = get_field(record, header_map, "city");
    employee.phone = get_field(record, header_map, "phone");

    if let Some(skills) = get_field(record, header_map, "skills") {
        for name in skills.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            if !employee.has_skill(name) {
                employee.skill_set.push(SkillReference::by_name(name));
            }
        }
    }
    employee
}

/// Parse and validate every row; bad rows abort unless `skip_errors`
fn read_rows<R: Read>(reader: R, skip_errors: bool, stats: &mut ImportStats) -> Result<Vec<ImportRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);
    for required in ["firstname", "lastname"] {
        if !header_map.contains_key(required) {
            return Err(miette::miette!(
                "CSV header is missing required column '{}'",
                required
            ));
        }
    }

    let mut rows = Vec::new();
    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        stats.rows_processed += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                eprintln!("{} Row {}: CSV parse error: {}", style("✗").red(), row_num, e);
                stats.errors += 1;
                if !skip_errors {
                    return Err(miette::miette!("CSV parse error at row {}: {}", row_num, e));
                }
                continue;
            }
        };

        let employee = employee_from_record(&record, &header_map);
        if let Err(e) = employee.validate() {
            eprintln!("{} Row {}: {}", style("✗").red(), row_num, e);
            stats.errors += 1;
            if !skip_errors {
                return Err(miette::miette!("Invalid employee at row {}: {}", row_num, e));
            }
            continue;
        }

        rows.push(ImportRow { row_num, employee });
    }
    Ok(rows)
}

pub async fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut stats = ImportStats::default();

    let file = File::open(&args.file)
        .map_err(|e| miette::miette!("Cannot open {}: {}", args.file.display(), e))?;
    let rows = read_rows(BufReader::new(file), args.skip_errors, &mut stats)?;

    if rows.is_empty() {
        println!("{} No importable rows in {}", style("!").yellow(), args.file.display());
        return Ok(());
    }

    let config = load_config(global);
    let coordinator = connect(global, &config, false)?;

    if args.dry_run {
        let catalog = coordinator.catalog(false).await?;
        for row in &rows {
            let prepared = prepare_employee_payload(&row.employee, &catalog);
            let line = format!(
                "Row {}: {} ({} skill(s))",
                row.row_num,
                row.employee.full_name(),
                prepared.payload.skill_set.len()
            );
            if prepared.unresolved.is_empty() {
                println!("{} {}", style("✓").green(), line);
            } else {
                println!(
                    "{} {}, unknown: {}",
                    style("!").yellow(),
                    line,
                    prepared.unresolved.join(", ")
                );
            }
        }
        println!();
        println!(
            "{} Dry run: {} row(s) would be imported, {} error(s)",
            style("→").blue(),
            rows.len(),
            stats.errors
        );
        return Ok(());
    }

    let drafts: Vec<Employee> = rows.iter().map(|r| r.employee.clone()).collect();
    let outcome = coordinator.create_employees(&drafts).await?;
    stats.created = outcome.created;
    stats.errors += outcome.failures.len();

    for failure in &outcome.failures {
        let row_num = rows.get(failure.index).map(|r| r.row_num).unwrap_or_default();
        eprintln!(
            "{} Row {}: {}: {}",
            style("✗").red(),
            row_num,
            failure.label,
            failure.error
        );
    }

    println!();
    println!(
        "{} Import complete: {} row(s) processed, {} created, {} error(s)",
        style("✓").green(),
        stats.rows_processed,
        stats.created,
        stats.errors
    );

    if stats.created == 0 {
        return Err(miette::miette!("No employees were imported"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "firstName,lastName,street,postcode,city,phone,skills\n\
Anna,Bella,Hauptstraße 1,10115,Berlin,+49 30 123456,Java; SQL ;Java\n\
Max,Muster,,,,,\n";

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("firstName"), "firstname");
        assert_eq!(normalize_header(" first_name "), "firstname");
        assert_eq!(normalize_header("Last-Name"), "lastname");
    }

    #[test]
    fn test_read_rows() {
        let mut stats = ImportStats::default();
        let rows = read_rows(CSV.as_bytes(), false, &mut stats).unwrap();

        assert_eq!(stats.rows_processed, 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_num, 2);

        let anna = &rows[0].employee;
        assert_eq!(anna.city.as_deref(), Some("Berlin"));
        assert_eq!(
            anna.skill_set,
            vec![SkillReference::by_name("Java"), SkillReference::by_name("SQL")]
        );

        let max = &rows[1].employee;
        assert_eq!(max.street, None);
        assert!(max.skill_set.is_empty());
    }

    #[test]
    fn test_blank_name_aborts() {
        let csv = "firstName,lastName\nAnna,\nMax,Muster\n";
        let mut stats = ImportStats::default();
        assert!(read_rows(csv.as_bytes(), false, &mut stats).is_err());
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_blank_name_skipped() {
        let csv = "firstName,lastName\nAnna,\nMax,Muster\n";
        let mut stats = ImportStats::default();
        let rows = read_rows(csv.as_bytes(), true, &mut stats).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row_num, 3);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_missing_name_column() {
        let csv = "name,city\nAnna,Berlin\n";
        let mut stats = ImportStats::default();
        assert!(read_rows(csv.as_bytes(), false, &mut stats).is_err());
    }
}
