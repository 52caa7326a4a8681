//! The interactive dashboard.
//!
//! Reads one command per line from stdin and redraws whenever the
//! coordinator settles on a new view.

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use reqdash::{
    DashboardView, Facet, FilterCategory, QueryCoordinator, RequirementId, RequirementsApi,
    Status, UploadFile, export,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::instrument;

use super::{
    Context,
    list::{print_pagination, print_requirements, print_stats},
    terminal::Colorize,
};

const HELP: &str = "\
Commands:
  search <text>          search requirement text (empty clears)
  filter <category>=<v>  toggle a filter, e.g. filter status=approved
  clear                  remove all filters
  next | prev | page <n> move between pages
  export [file]          write the loaded page as CSV
  status <id> <status>   change the status of a requirement
  upload <file>          extract requirements from a document
  refresh | retry        reload everything (retry also clears the error)
  help | quit";

/// Command arguments for `reqdash dashboard`.
#[derive(Debug, Parser)]
pub struct Dashboard {
    /// Initial search text.
    #[arg(short, long)]
    search: Option<String>,
}

/// One line of dashboard input.
#[derive(Debug, Clone, PartialEq)]
enum Action {
    Search(String),
    Toggle(Facet),
    ClearFilters,
    Next,
    Previous,
    Page(u32),
    Export(Option<PathBuf>),
    SetStatus(RequirementId, Status),
    Upload(PathBuf),
    Refresh,
    Retry,
    Help,
    Quit,
}

impl Action {
    /// Parse a line of input. Blank lines parse to `None`.
    fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (command, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(command, rest)| (command, rest.trim()));

        let action = match command.to_ascii_lowercase().as_str() {
            "search" | "s" => Self::Search(rest.to_string()),
            "filter" | "f" => Self::Toggle(rest.parse().map_err(|e| format!("{e}"))?),
            "clear" => Self::ClearFilters,
            "next" | "n" => Self::Next,
            "prev" | "previous" | "p" => Self::Previous,
            "page" => Self::Page(
                rest.parse()
                    .map_err(|_| format!("'{rest}' is not a page number"))?,
            ),
            "export" | "e" => Self::Export((!rest.is_empty()).then(|| PathBuf::from(rest))),
            "status" => {
                let (id, status) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| "usage: status <id> <status>".to_string())?;
                Self::SetStatus(id.into(), status.parse().map_err(|e| format!("{e}"))?)
            }
            "upload" if !rest.is_empty() => Self::Upload(PathBuf::from(rest)),
            "upload" => return Err("usage: upload <file>".to_string()),
            "refresh" | "r" => Self::Refresh,
            "retry" => Self::Retry,
            "help" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}', type 'help'")),
        };
        Ok(Some(action))
    }
}

impl Dashboard {
    #[instrument(level = "debug", skip_all)]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        let api: Arc<dyn RequirementsApi> = Arc::new(context.client()?);
        let mut coordinator = QueryCoordinator::from_config(api, context.config());
        if let Some(search) = self.search {
            coordinator.set_search_text(search);
        }
        coordinator.start();

        print_help();
        let mut views = coordinator.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = views.borrow_and_update().clone();
                    if view.is_settled() {
                        render(&view);
                    }
                }
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    match Action::parse(&line) {
                        Ok(None) => {}
                        Ok(Some(Action::Quit)) => break,
                        Ok(Some(action)) => perform(action, &mut coordinator).await,
                        Err(message) => eprintln!("{}", message.warning()),
                    }
                }
            }
        }

        Ok(())
    }
}

async fn perform(action: Action, coordinator: &mut QueryCoordinator) {
    match action {
        Action::Search(text) => coordinator.set_search_text(text),
        Action::Toggle(facet) => coordinator.toggle_filter(facet),
        Action::ClearFilters => coordinator.clear_filters(),
        Action::Next => {
            if !coordinator.next_page() {
                refused_page(coordinator, "Already on the last page");
            }
        }
        Action::Previous => {
            if !coordinator.previous_page() {
                refused_page(coordinator, "Already on the first page");
            }
        }
        Action::Page(page) => {
            if !coordinator.request_page(page) {
                let pages = coordinator.snapshot().pagination().total_pages();
                refused_page(coordinator, &format!("Page must be between 1 and {pages}"));
            }
        }
        Action::Export(path) => {
            let path = path.unwrap_or_else(|| PathBuf::from(export::EXPORT_FILE_NAME));
            let view = coordinator.snapshot();
            match export::write_csv(&path, view.requirements()) {
                Ok(()) => println!(
                    "{}",
                    format!(
                        "Exported {} requirements to {}",
                        view.requirements().len(),
                        path.display()
                    )
                    .success()
                ),
                Err(e) => eprintln!("{}", format!("Failed to write {}: {e}", path.display()).error()),
            }
        }
        Action::SetStatus(id, status) => {
            let result = coordinator.api().update_status(&id, status).await;
            match result {
                Ok(()) => coordinator.invalidate(),
                Err(e) => eprintln!("{}", e.user_message("Failed to update status").error()),
            }
        }
        Action::Upload(path) => {
            let file = match UploadFile::from_path(&path) {
                Ok(file) => file,
                Err(e) => {
                    eprintln!("{}", e.to_string().error());
                    return;
                }
            };
            println!("{}", "Analyzing document...".dim());
            let result = coordinator.api().analyze(file).await;
            match result {
                Ok(()) => coordinator.invalidate(),
                Err(e) => eprintln!("{}", e.user_message("Failed to analyze document").error()),
            }
        }
        Action::Refresh => coordinator.invalidate(),
        Action::Retry => coordinator.retry(),
        Action::Help => print_help(),
        Action::Quit => {}
    }
}

fn print_help() {
    println!("{}", HELP.dim());
    println!("{}", "Filter values:".dim());
    for category in FilterCategory::ALL {
        let line = format!("  {:<12}{}", category.param(), category.options().join(", "));
        println!("{}", line.dim());
    }
}

fn refused_page(coordinator: &QueryCoordinator, reason: &str) {
    if coordinator.snapshot().navigation().is_some() {
        eprintln!("{}", reason.warning());
    } else {
        eprintln!("{}", "Wait for the results to load before changing page".warning());
    }
}

fn render(view: &DashboardView) {
    let query = view.query();
    let filters: Vec<String> = query
        .filters()
        .facets()
        .map(|facet| facet.to_string())
        .collect();

    println!();
    println!(
        "Search: {}  Filters: {}",
        if query.search_text().is_empty() {
            "–".dim()
        } else {
            format!("\"{}\"", query.search_text())
        },
        if filters.is_empty() {
            "none".dim()
        } else {
            filters.join(", ")
        }
    );

    if let Some(error) = view.error() {
        println!("{}", error.error());
        println!("{}", "Type 'retry' to try again.".dim());
    }

    if view.error().is_none() || !view.requirements().is_empty() {
        print_requirements(view.requirements());
    }
    print_pagination(view.pagination());
    print_stats("Overall", view.overall_stats());
    print_stats("Matching", view.filtered_stats());
}
