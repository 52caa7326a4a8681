use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use reqdash::{RequirementsApi, export};
use tracing::instrument;

use super::{
    Context,
    list::QueryArgs,
    terminal::{Colorize, spinner},
};

/// Command arguments for `reqdash export`.
///
/// Exports the requested page only, matching what the dashboard displays.
#[derive(Debug, Parser)]
pub struct Export {
    #[command(flatten)]
    query: QueryArgs,

    /// File to write.
    #[arg(short, long, default_value = export::EXPORT_FILE_NAME)]
    output: PathBuf,
}

impl Export {
    #[instrument(level = "debug", skip(self, context), fields(output = %self.output.display()))]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        let client = context.client()?;

        let progress = spinner("Fetching requirements", false);
        let page = client.fetch_page(&self.query.query()).await;
        progress.finish_and_clear();
        let page = page?;

        export::write_csv(&self.output, &page.requirements)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        println!(
            "{}",
            format!(
                "Exported {} requirements to {}",
                page.requirements.len(),
                self.output.display()
            )
            .success()
        );
        Ok(())
    }
}
