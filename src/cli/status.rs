use clap::Parser;
use reqdash::{RequirementsApi, StatsSnapshot};
use tracing::instrument;

use super::{
    Context,
    terminal::{Colorize, is_narrow, spinner},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show requirement counts by status")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self, context))]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        let client = context.client()?;

        let progress = spinner(
            "Loading statistics",
            self.quiet || matches!(self.output, OutputFormat::Json),
        );
        let stats = client.fetch_overall_stats().await;
        progress.finish_and_clear();
        let stats = stats?;

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
            OutputFormat::Table if self.quiet => Self::output_quiet(stats),
            OutputFormat::Table => Self::output_table(stats, client.base_url()),
        }

        Ok(())
    }

    fn output_quiet(stats: StatsSnapshot) {
        println!(
            "total={} approved={} review={} disapproved={} draft={}",
            stats.total,
            stats.approved,
            stats.in_review,
            stats.disapproved,
            stats.draft()
        );
    }

    fn output_table(stats: StatsSnapshot, base_url: &str) {
        if stats.total == 0 {
            println!("No requirements found yet. Create one with 'reqdash create'.");
            return;
        }

        println!("Requirement counts {}", base_url.dim());
        println!("{}", "──────────────────".dim());

        let rows = [
            ("Approved", stats.approved.to_string().success()),
            ("In review", stats.in_review.to_string().info()),
            ("Disapproved", stats.disapproved.to_string().error()),
            ("Draft", stats.draft().to_string().dim()),
        ];

        if is_narrow() {
            for (label, count) in rows {
                println!("{label}: {count}");
            }
        } else {
            for (label, count) in rows {
                println!("{label:<12} {count}");
            }
        }
        println!("{:<12} {}", "Total", stats.total);
    }
}
