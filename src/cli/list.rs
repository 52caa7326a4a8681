use clap::{Args, Parser, ValueEnum};
use reqdash::{
    Category, Complexity, Facet, FilterSelection, PaginationInfo, Priority, QueryState,
    Requirement, RequirementsApi, StatsSnapshot, Status, export,
};
use serde::Serialize;
use tracing::instrument;

use super::{
    Context,
    terminal::{Colorize, is_narrow, spinner, status_label, terminal_width},
};

/// Width of the text column when the terminal width is unknown.
const DEFAULT_TEXT_WIDTH: usize = 60;

/// The search, filters and page shared by commands that fetch a page.
#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Case-insensitive text to search for.
    #[arg(short, long, default_value = "")]
    search: String,

    /// Filter by category (comma-separated, case-insensitive).
    #[arg(long = "type", value_delimiter = ',', value_name = "TYPE")]
    types: Vec<Category>,

    /// Filter by status (comma-separated, case-insensitive).
    #[arg(long, value_delimiter = ',')]
    status: Vec<Status>,

    /// Filter by complexity (comma-separated, case-insensitive).
    #[arg(long, value_delimiter = ',')]
    complexity: Vec<Complexity>,

    /// Filter by priority (comma-separated, case-insensitive).
    #[arg(long, value_delimiter = ',')]
    priority: Vec<Priority>,

    /// Page to fetch (1-based).
    #[arg(long, default_value_t = 1)]
    page: u32,
}

impl QueryArgs {
    pub fn query(&self) -> QueryState {
        let filters: FilterSelection = self
            .types
            .iter()
            .copied()
            .map(Facet::Type)
            .chain(self.status.iter().copied().map(Facet::Status))
            .chain(self.complexity.iter().copied().map(Facet::Complexity))
            .chain(self.priority.iter().copied().map(Facet::Priority))
            .collect();

        QueryState::new(self.search.clone(), filters, self.page)
    }
}

/// Command arguments for `reqdash list`.
#[derive(Debug, Parser)]
pub struct List {
    #[command(flatten)]
    query: QueryArgs,

    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting.
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
struct JsonPage<'a> {
    requirements: &'a [Requirement],
    stats: StatsSnapshot,
    pagination: &'a PaginationInfo,
}

impl List {
    #[instrument(level = "debug", skip(self, context))]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        let client = context.client()?;
        let query = self.query.query();

        let progress = spinner(
            "Fetching requirements",
            self.quiet || !matches!(self.output, OutputFormat::Table),
        );
        let page = client.fetch_page(&query).await;
        progress.finish_and_clear();
        let page = page?;

        match self.output {
            OutputFormat::Json => {
                let output = JsonPage {
                    requirements: &page.requirements,
                    stats: page.stats,
                    pagination: &page.pagination,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Csv => print!("{}", export::to_csv(&page.requirements)),
            OutputFormat::Table if self.quiet => {
                for requirement in &page.requirements {
                    println!(
                        "{}\t{}\t{}",
                        requirement.id(),
                        requirement.status(),
                        requirement.text()
                    );
                }
            }
            OutputFormat::Table => {
                print_requirements(&page.requirements);
                println!();
                print_pagination(&page.pagination);
                println!();
                print_stats("Matching", page.stats);
            }
        }

        Ok(())
    }
}

/// Print requirements as a table sized to the terminal.
pub fn print_requirements(requirements: &[Requirement]) {
    if requirements.is_empty() {
        println!("{}", "No requirements match the current search.".dim());
        return;
    }

    if is_narrow() {
        for requirement in requirements {
            println!(
                "{} [{}] {}",
                requirement.id(),
                status_label(requirement.status(), 0),
                requirement.text()
            );
        }
        return;
    }

    let text_width = terminal_width().map_or(DEFAULT_TEXT_WIDTH, |width| {
        usize::from(width).saturating_sub(40).max(20)
    });

    println!(
        "{:<6} {:<12} {:<8} {:<10} Requirement",
        "ID", "Status", "Priority", "Complexity"
    );
    println!("{}", "─".repeat(40 + text_width.min(40)).dim());
    for requirement in requirements {
        println!(
            "{:<6} {} {:<8} {:<10} {}",
            requirement.id().as_str(),
            status_label(requirement.status(), 12),
            requirement.priority().as_str(),
            requirement.complexity().as_str(),
            truncate(requirement.text(), text_width),
        );
    }
}

/// Print the page position.
pub fn print_pagination(pagination: &PaginationInfo) {
    println!(
        "Page {} of {} {}",
        pagination.page(),
        pagination.total_pages(),
        format!("({} requirements)", pagination.total_items()).dim()
    );
}

/// Print one statistics snapshot on a single line.
pub fn print_stats(label: &str, stats: StatsSnapshot) {
    println!(
        "{label:<9} total {:<5} approved {:<5} in review {:<5} disapproved {}",
        stats.total,
        stats.approved.to_string().success(),
        stats.in_review.to_string().info(),
        stats.disapproved.to_string().error(),
    );
}

/// Shorten `text` to at most `width` characters, marking the cut with `…`.
fn truncate(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= width && !text.contains('\n') {
        return line.to_string();
    }
    let kept: String = line.chars().take(width.saturating_sub(1)).collect();
    format!("{kept}…")
}
