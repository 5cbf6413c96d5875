//! `roster qual` command - Qualification catalog management

use clap::Subcommand;
use console::style;
use miette::Result;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{connect, load_config, output_format, page_size, print_serialized};
use crate::cli::table::{CellValue, ColumnDef, PageInfo, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::query::{holder_count, QueryView};
use crate::core::DeleteOutcome;
use crate::entities::{Employee, Qualification, QualificationDetails};

#[derive(Subcommand, Debug)]
pub enum QualCommands {
    /// List qualifications with search and paging
    List(ListArgs),

    /// Show a qualification and the employees holding it
    Show(ShowArgs),

    /// Add a qualification to the catalog
    New(NewArgs),

    /// Rename a qualification
    Edit(EditArgs),

    /// Delete a qualification (asks for confirmation)
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Match qualification names (case-insensitive substring)
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Page to show (1-based)
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: usize,

    /// Rows per page (default from config)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Print every match instead of one page
    #[arg(long)]
    pub all: bool,

    /// Include the number of employees holding each qualification
    #[arg(long)]
    pub holders: bool,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Qualification id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Qualification name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Qualification id
    pub id: i64,

    /// New name
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Qualification id
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("skill", "SKILL", 40),
    ColumnDef::new("holders", "HOLDERS", 9),
];

/// Run a qualification subcommand
pub async fn run(cmd: QualCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        QualCommands::List(args) => run_list(args, global).await,
        QualCommands::Show(args) => run_show(args, global).await,
        QualCommands::New(args) => run_new(args, global).await,
        QualCommands::Edit(args) => run_edit(args, global).await,
        QualCommands::Delete(args) => run_delete(args, global).await,
    }
}

async fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let coordinator = connect(global, &config, false)?;

    coordinator.load_qualifications().await?;
    let qualifications = coordinator.qualifications();
    let employees = if args.holders {
        coordinator.load_employees().await?;
        coordinator.employees()
    } else {
        Vec::new()
    };

    let mut view = QueryView::new(page_size(args.page_size, &config));
    view.set_search_term(args.search.clone().unwrap_or_default(), &qualifications);

    if args.count {
        println!("{}", view.total_items());
        return Ok(());
    }
    if args.page != 1 && !view.go_to_page(args.page) {
        return Err(miette::miette!(
            "Page {} is out of range (1..={})",
            args.page,
            view.total_pages().max(1)
        ));
    }

    let visible = if args.all { view.filtered() } else { view.visible_slice() };
    let format = output_format(global, &config);

    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(&visible, format),
        _ => {
            let term = view.search_term();
            let holders = args.holders.then_some(employees.as_slice());
            let rows: Vec<TableRow> = visible
                .iter()
                .map(|q| qualification_row(q, term, holders))
                .collect();

            let columns: Vec<ColumnDef> = COLUMNS
                .iter()
                .filter(|c| args.holders || c.key != "holders")
                .cloned()
                .collect();
            let mut formatter = TableFormatter::new(&columns, "qualifications");
            if !args.all && !global.quiet {
                formatter = formatter.with_page(PageInfo::from_view(&view));
            }
            formatter.output(&rows, format);
            Ok(())
        }
    }
}

fn qualification_row(qualification: &Qualification, term: &str, employees: Option<&[Employee]>) -> TableRow {
    let mut row = TableRow::new(qualification.id)
        .cell(
            "id",
            qualification.id.map(CellValue::Id).unwrap_or(CellValue::Empty),
        )
        .cell("skill", CellValue::searched(qualification.skill.clone(), term));
    if let Some(employees) = employees {
        row = row.cell("holders", CellValue::Count(holder_count(qualification, employees)));
    }
    row
}

async fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let coordinator = connect(global, &config, false)?;

    let details = coordinator.qualification_details(args.id).await?;

    match output_format(global, &config) {
        format @ (OutputFormat::Json | OutputFormat::Yaml) => print_serialized(&details, format),
        OutputFormat::Id => {
            for employee in &details.employees {
                println!("{}", employee.id);
            }
            Ok(())
        }
        OutputFormat::Md => {
            println!("{}", holders_table(&details).with(Style::markdown()));
            Ok(())
        }
        _ => {
            print_details(&details);
            Ok(())
        }
    }
}

fn holders_table(details: &QualificationDetails) -> tabled::Table {
    let mut builder = Builder::default();
    builder.push_record(["ID", "First name", "Last name"]);
    for employee in &details.employees {
        builder.push_record([
            employee.id.to_string(),
            employee.first_name.clone(),
            employee.last_name.clone(),
        ]);
    }
    builder.build()
}

fn print_details(details: &QualificationDetails) {
    let qualification = &details.qualification;

    println!("{}", style("─".repeat(60)).dim());
    if let Some(id) = qualification.id {
        println!("{}: {}", style("ID").bold(), style(id).cyan());
    }
    println!("{}: {}", style("Skill").bold(), style(&qualification.skill).yellow());
    println!("{}", style("─".repeat(60)).dim());

    if details.employees.is_empty() {
        println!("{}", style("No employees hold this qualification").dim());
    } else {
        println!("{} ({}):", style("Holders").bold(), details.employees.len());
        println!("{}", holders_table(details).with(Style::rounded()));
    }
}

async fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let coordinator = connect(global, &config, false)?;

    let outcome = coordinator
        .create_qualification(&Qualification::new(args.name))
        .await?;
    print_saved(&outcome.record, output_format(global, &config), global.quiet)
}

async fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let coordinator = connect(global, &config, false)?;

    let outcome = coordinator
        .update_qualification(args.id, &Qualification::with_id(args.id, args.name))
        .await?;
    print_saved(&outcome.record, output_format(global, &config), global.quiet)
}

async fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let coordinator = connect(global, &config, args.yes)?;

    coordinator.load_qualifications().await?;
    if let DeleteOutcome::Deleted { refreshed: false } = coordinator.delete_qualification(args.id).await? {
        return Err(miette::miette!(
            "Qualification deleted, but the catalog could not be reloaded"
        ));
    }
    Ok(())
}

fn print_saved(qualification: &Qualification, format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(qualification, format),
        OutputFormat::Id => {
            if let Some(id) = qualification.id {
                println!("{id}");
            }
            Ok(())
        }
        _ => {
            if let (false, Some(id)) = (quiet, qualification.id) {
                println!("   {}: {}", style("ID").dim(), style(id).cyan());
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{EmployeeBasic, SkillReference};

    #[test]
    fn test_row_with_holders() {
        let java = Qualification::with_id(1, "Java");
        let mut anna = Employee::new("Anna", "Bella");
        anna.skill_set = vec![SkillReference::by_id(1, "Java")];
        let employees = vec![anna, Employee::new("Max", "Muster")];

        let row = qualification_row(&java, "", Some(&employees));
        assert_eq!(row.get("holders").map(CellValue::raw).as_deref(), Some("1"));

        let row = qualification_row(&java, "", None);
        assert!(row.get("holders").is_none());
    }

    #[test]
    fn test_holders_table_lists_employees() {
        let details = QualificationDetails {
            qualification: Qualification::with_id(1, "Java"),
            employees: vec![EmployeeBasic {
                id: 4,
                first_name: "Anna".into(),
                last_name: "Bella".into(),
            }],
        };
        let rendered = holders_table(&details).with(Style::markdown()).to_string();
        assert!(rendered.contains("Anna"));
        assert!(rendered.contains("| 4"));
    }
}
