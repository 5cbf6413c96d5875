//! `roster emp` command - Employee management

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{connect, load_config, output_format, page_size, print_serialized};
use crate::cli::table::{CellValue, ColumnDef, PageInfo, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::query::QueryView;
use crate::core::reconcile::canonicalize_skill_set;
use crate::core::DeleteOutcome;
use crate::entities::{Employee, SkillReference};

#[derive(Subcommand, Debug)]
pub enum EmpCommands {
    /// List employees with search and paging
    List(ListArgs),

    /// Show an employee's details
    Show(ShowArgs),

    /// Create a new employee
    New(NewArgs),

    /// Replace an employee's fields
    Edit(EditArgs),

    /// Delete an employee (asks for confirmation)
    Delete(DeleteArgs),

    /// Give an employee a qualification from the catalog
    AddSkill(SkillArgs),

    /// Take a qualification away from an employee
    RemoveSkill(SkillArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Match name (either order), city or skill names
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

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Employee id
    pub id: i64,
}

/// Field values shared by `new` and `edit`
#[derive(clap::Args, Debug, Default)]
pub struct EmployeeFields {
    /// First name
    #[arg(long)]
    pub first: Option<String>,

    /// Last name
    #[arg(long)]
    pub last: Option<String>,

    #[arg(long)]
    pub street: Option<String>,

    #[arg(long)]
    pub postcode: Option<String>,

    #[arg(long)]
    pub city: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Qualification names (comma-separated or repeated)
    #[arg(long = "skill", value_delimiter = ',')]
    pub skills: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: EmployeeFields,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Employee id
    pub id: i64,

    #[command(flatten)]
    pub fields: EmployeeFields,

    /// Drop all skills (combine with --skill to start over)
    #[arg(long)]
    pub clear_skills: bool,

    /// Interactive mode (prompt with current values)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Employee id
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct SkillArgs {
    /// Employee id
    pub id: i64,

    /// Qualification name (exact, case-sensitive)
    pub name: String,
}

const COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("name", "NAME", 30),
    ColumnDef::new("city", "CITY", 20),
    ColumnDef::new("phone", "PHONE", 18),
    ColumnDef::new("skills", "SKILLS", 50),
];

/// Run an employee subcommand
pub async fn run(cmd: EmpCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        EmpCommands::List(args) => run_list(args, global).await,
        EmpCommands::Show(args) => run_show(args, global).await,
        EmpCommands::New(args) => run_new(args, global).await,
        EmpCommands::Edit(args) => run_edit(args, global).await,
        EmpCommands::Delete(args) => run_delete(args, global).await,
        EmpCommands::AddSkill(args) => run_add_skill(args, global).await,
        EmpCommands::RemoveSkill(args) => run_remove_skill(args, global).await,
    }
}

async fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let coordinator = connect(global, &config, false)?;

    coordinator.load_employees().await?;
    let employees = coordinator.employees();

    let mut view = QueryView::new(page_size(args.page_size, &config));
    view.set_search_term(args.search.clone().unwrap_or_default(), &employees);

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
            let rows: Vec<TableRow> = visible.iter().map(|e| employee_row(e, term)).collect();
            let mut formatter = TableFormatter::new(COLUMNS, "employees");
            if !args.all && !global.quiet {
                formatter = formatter.with_page(PageInfo::from_view(&view));
            }
            formatter.output(&rows, format);
            Ok(())
        }
    }
}

fn employee_row(employee: &Employee, term: &str) -> TableRow {
    let skills: Vec<String> = employee.skill_set.iter().map(|s| s.name().to_string()).collect();
    let optional = |value: &Option<String>, searched: bool| match value.as_deref() {
        Some(v) if !v.is_empty() && searched => CellValue::searched(v, term),
        Some(v) if !v.is_empty() => CellValue::Text(v.to_string()),
        _ => CellValue::Empty,
    };

    TableRow::new(employee.id)
        .cell("id", employee.id.map(CellValue::Id).unwrap_or(CellValue::Empty))
        .cell("name", CellValue::searched(employee.full_name(), term))
        .cell("city", optional(&employee.city, true))
        .cell("phone", optional(&employee.phone, false))
        .cell(
            "skills",
            if skills.is_empty() {
                CellValue::Empty
            } else {
                CellValue::searched(skills.join(", "), term)
            },
        )
}

async fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let coordinator = connect(global, &config, false)?;

    let mut employee = coordinator.employee(args.id).await?;
    if !employee.skill_set.is_empty() {
        let catalog = coordinator.catalog(false).await?;
        employee.skill_set = canonicalize_skill_set(&employee.skill_set, &catalog);
    }

    match output_format(global, &config) {
        format @ (OutputFormat::Json | OutputFormat::Yaml) => print_serialized(&employee, format),
        OutputFormat::Id => {
            println!("{}", args.id);
            Ok(())
        }
        _ => {
            print_employee(&employee);
            Ok(())
        }
    }
}

fn print_employee(employee: &Employee) {
    let dash = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| style("-").dim().to_string())
    };

    println!("{}", style("─".repeat(60)).dim());
    if let Some(id) = employee.id {
        println!("{}: {}", style("ID").bold(), style(id).cyan());
    }
    println!(
        "{}: {} ({})",
        style("Name").bold(),
        style(employee.full_name()).yellow(),
        employee.initials()
    );
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("Street").bold(), dash(&employee.street));
    println!("{}: {}", style("Postcode").bold(), dash(&employee.postcode));
    println!("{}: {}", style("City").bold(), dash(&employee.city));
    println!("{}: {}", style("Phone").bold(), dash(&employee.phone));

    println!();
    if employee.skill_set.is_empty() {
        println!("{}: {}", style("Skills").bold(), style("none").dim());
    } else {
        println!("{} ({}):", style("Skills").bold(), employee.skill_set.len());
        for skill in &employee.skill_set {
            match skill.id() {
                Some(id) => println!("  • {} {}", skill.name(), style(format!("#{id}")).dim()),
                None => println!("  • {} {}", skill.name(), style("(not in catalog)").yellow()),
            }
        }
    }
    println!("{}", style("─".repeat(60)).dim());
}

async fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let mut draft = Employee::default();
    apply_fields(&mut draft, args.fields);
    if args.interactive {
        prompt_fields(&mut draft)?;
    }

    let coordinator = connect(global, &config, false)?;
    let outcome = coordinator.create_employee(&draft).await?;
    print_saved(&outcome.record, output_format(global, &config), global.quiet)
}

async fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let coordinator = connect(global, &config, false)?;

    let mut draft = coordinator.employee(args.id).await?;
    let changes_skills = args.clear_skills || !args.fields.skills.is_empty();
    if args.clear_skills {
        draft.skill_set.clear();
    }
    let touched = changes_skills || has_field_changes(&args.fields);
    apply_fields(&mut draft, args.fields);

    if args.interactive {
        prompt_fields(&mut draft)?;
    } else if !touched {
        return Err(miette::miette!(
            "Nothing to change. Pass field flags (e.g. --city) or use --interactive"
        ));
    }

    let outcome = coordinator.update_employee(args.id, &draft).await?;
    print_saved(&outcome.record, output_format(global, &config), global.quiet)
}

async fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let coordinator = connect(global, &config, args.yes)?;

    coordinator.load_employees().await?;
    if let DeleteOutcome::Deleted { refreshed: false } = coordinator.delete_employee(args.id).await? {
        return Err(miette::miette!("Employee deleted, but the list could not be reloaded"));
    }
    Ok(())
}

async fn run_add_skill(args: SkillArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let coordinator = connect(global, &config, false)?;

    let outcome = coordinator.add_skill(args.id, &args.name).await?;
    print_skills(&outcome.record, global.quiet);
    Ok(())
}

async fn run_remove_skill(args: SkillArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global);
    let coordinator = connect(global, &config, false)?;

    let outcome = coordinator.remove_skill(args.id, &args.name).await?;
    print_skills(&outcome.record, global.quiet);
    Ok(())
}

fn has_field_changes(fields: &EmployeeFields) -> bool {
    [
        &fields.first,
        &fields.last,
        &fields.street,
        &fields.postcode,
        &fields.city,
        &fields.phone,
    ]
    .iter()
    .any(|f| f.is_some())
}

/// Copy given flags onto the draft; `--skill` names are appended
fn apply_fields(draft: &mut Employee, fields: EmployeeFields) {
    if let Some(first) = fields.first {
        draft.first_name = first;
    }
    if let Some(last) = fields.last {
        draft.last_name = last;
    }
    for (target, value) in [
        (&mut draft.street, fields.street),
        (&mut draft.postcode, fields.postcode),
        (&mut draft.city, fields.city),
        (&mut draft.phone, fields.phone),
    ] {
        if let Some(value) = value {
            *target = Some(value);
        }
    }
    for name in fields.skills {
        let name = name.trim();
        if !name.is_empty() && !draft.has_skill(name) {
            draft.skill_set.push(SkillReference::by_name(name));
        }
    }
}

fn prompt(label: &str, current: &str, required: bool) -> Result<String> {
    Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(label)
        .with_initial_text(current)
        .allow_empty(!required)
        .interact_text()
        .into_diagnostic()
}

fn prompt_fields(draft: &mut Employee) -> Result<()> {
    draft.first_name = prompt("First name", &draft.first_name, true)?;
    draft.last_name = prompt("Last name", &draft.last_name, true)?;
    for (label, target) in [
        ("Street", &mut draft.street),
        ("Postcode", &mut draft.postcode),
        ("City", &mut draft.city),
        ("Phone", &mut draft.phone),
    ] {
        let value = prompt(label, target.as_deref().unwrap_or_default(), false)?;
        *target = Some(value).filter(|v| !v.trim().is_empty());
    }
    Ok(())
}

fn print_saved(employee: &Employee, format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(employee, format),
        OutputFormat::Id => {
            if let Some(id) = employee.id {
                println!("{id}");
            }
            Ok(())
        }
        _ => {
            if !quiet {
                if let Some(id) = employee.id {
                    println!("   {}: {}", style("ID").dim(), style(id).cyan());
                }
            }
            Ok(())
        }
    }
}

fn print_skills(employee: &Employee, quiet: bool) {
    if quiet {
        return;
    }
    let names: Vec<&str> = employee.skill_set.iter().map(SkillReference::name).collect();
    if names.is_empty() {
        println!("   {}: {}", style("Skills").dim(), style("none").dim());
    } else {
        println!("   {}: {}", style("Skills").dim(), names.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_fields_appends_unique_skills() {
        let mut draft = Employee::new("Anna", "Bella");
        draft.skill_set.push(SkillReference::by_id(1, "Java"));

        apply_fields(
            &mut draft,
            EmployeeFields {
                city: Some("Berlin".into()),
                skills: vec!["Java".into(), " Go ".into(), String::new()],
                ..EmployeeFields::default()
            },
        );

        assert_eq!(draft.city.as_deref(), Some("Berlin"));
        assert_eq!(
            draft.skill_set,
            vec![SkillReference::by_id(1, "Java"), SkillReference::by_name("Go")]
        );
    }

    #[test]
    fn test_has_field_changes() {
        assert!(!has_field_changes(&EmployeeFields::default()));
        assert!(has_field_changes(&EmployeeFields {
            phone: Some("+49 30 123456".into()),
            ..EmployeeFields::default()
        }));
    }

    #[test]
    fn test_employee_row_cells() {
        let mut emp = Employee::new("Anna", "Bella");
        emp.id = Some(3);
        emp.city = Some("Berlin".into());
        let row = employee_row(&emp, "");
        assert_eq!(row.get("name").map(CellValue::raw).as_deref(), Some("Anna Bella"));
        assert!(matches!(row.get("phone"), Some(CellValue::Empty)));
        assert!(matches!(row.get("skills"), Some(CellValue::Empty)));
    }
}
