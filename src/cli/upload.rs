use std::path::PathBuf;

use clap::Parser;
use reqdash::{RequirementsApi, UploadFile};
use tracing::instrument;

use super::{
    Context,
    terminal::{Colorize, spinner},
};

/// Command arguments for `reqdash upload`.
#[derive(Debug, Parser)]
pub struct Upload {
    /// The document to analyse (.pdf, .txt or .md, at most 10 MB).
    path: PathBuf,
}

impl Upload {
    #[instrument(level = "debug", skip(context))]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        // validated locally so a bad file never reaches the service
        let file = UploadFile::from_path(&self.path)?;
        let client = context.client()?;

        let progress = spinner("Analyzing document", false);
        let result = client.analyze(file).await;
        progress.finish_and_clear();
        result?;

        println!(
            "{}",
            format!("Extracted requirements from {}", self.path.display()).success()
        );
        println!("{}", "Run 'reqdash list --status draft' to review them.".dim());
        Ok(())
    }
}
