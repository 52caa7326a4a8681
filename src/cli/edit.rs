//! Commands that change requirements on the service.

use clap::{Args, Parser};
use dialoguer::Confirm;
use reqdash::{
    Category, Complexity, Priority, RequirementDraft, RequirementId, RequirementsApi, Status,
};
use tracing::instrument;

use super::{Context, terminal::Colorize};

/// Optional fields of a requirement, shared by create and edit.
#[derive(Debug, Args)]
struct DraftArgs {
    /// Author of the requirement.
    #[arg(long)]
    author: Option<String>,

    /// Priority (low, medium, high).
    #[arg(long)]
    priority: Option<Priority>,

    /// Complexity (low, moderate, high).
    #[arg(long)]
    complexity: Option<Complexity>,

    /// Estimated effort in hours.
    #[arg(long, value_name = "HOURS")]
    estimate: Option<f64>,

    /// Categories (comma-separated, case-insensitive).
    #[arg(long = "category", value_delimiter = ',', value_name = "CATEGORY")]
    categories: Option<Vec<Category>>,
}

impl DraftArgs {
    fn apply(self, draft: &mut RequirementDraft) -> anyhow::Result<()> {
        if let Some(author) = self.author {
            draft.set_author(author);
        }
        if let Some(priority) = self.priority {
            draft.set_priority(priority);
        }
        if let Some(complexity) = self.complexity {
            draft.set_complexity(complexity);
        }
        if let Some(hours) = self.estimate {
            draft.set_estimated_time(hours)?;
        }
        if let Some(categories) = self.categories {
            draft.set_categories(categories);
        }
        Ok(())
    }
}

/// Command arguments for `reqdash create`.
#[derive(Debug, Parser)]
pub struct Create {
    /// The requirement text.
    text: String,

    #[command(flatten)]
    fields: DraftArgs,
}

impl Create {
    #[instrument(level = "debug", skip_all)]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        let mut draft = RequirementDraft::new(self.text)?;
        self.fields.apply(&mut draft)?;

        context.client()?.create(&draft).await?;
        println!("{}", "Requirement created".success());
        Ok(())
    }
}

/// Command arguments for `reqdash edit`.
///
/// Fields not given keep their current values.
#[derive(Debug, Parser)]
pub struct Edit {
    /// Id of the requirement to edit.
    id: RequirementId,

    /// New requirement text.
    #[arg(long)]
    text: Option<String>,

    /// New status.
    #[arg(long)]
    status: Option<Status>,

    #[command(flatten)]
    fields: DraftArgs,
}

impl Edit {
    #[instrument(level = "debug", skip_all, fields(id = %self.id))]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        let client = context.client()?;
        let existing = client
            .fetch_requirement(&self.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Requirement {} not found", self.id))?;

        let mut draft = RequirementDraft::from(&existing);
        if let Some(text) = self.text {
            draft.set_text(text)?;
        }
        if let Some(status) = self.status {
            draft.set_status(status);
        }
        self.fields.apply(&mut draft)?;

        client.update(&self.id, &draft).await?;
        println!("{}", format!("Requirement {} updated", self.id).success());
        Ok(())
    }
}

/// Command arguments for `reqdash set-status`.
#[derive(Debug, Parser)]
pub struct SetStatus {
    /// Id of the requirement.
    id: RequirementId,

    /// New status (draft, review, approved, disapproved).
    status: Status,
}

impl SetStatus {
    #[instrument(level = "debug", skip(context))]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        context
            .client()?
            .update_status(&self.id, self.status)
            .await?;
        println!(
            "{}",
            format!("Requirement {} is now {}", self.id, self.status).success()
        );
        Ok(())
    }
}

/// Command arguments for `reqdash delete`.
#[derive(Debug, Parser)]
pub struct Delete {
    /// Id of the requirement to delete.
    id: RequirementId,

    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}

impl Delete {
    #[instrument(level = "debug", skip(context))]
    pub async fn run(self, context: &Context) -> anyhow::Result<()> {
        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!("Delete requirement {}?", self.id))
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }
        }

        context.client()?.delete(&self.id).await?;
        println!("{}", format!("Requirement {} deleted", self.id).success());
        Ok(())
    }
}
