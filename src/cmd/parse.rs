use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::Args;

use crate::context::AppContext;
use crate::credentials::CredentialChain;
use crate::error::AppResult;
use crate::identity::Session;
use crate::views::{render_drafts, render_outcome};
use crate::workflow::extract::WorkItemExtractor;
use crate::workflow::record::record_drafts;

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// File with the work description; stdin when omitted.
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    /// Show the extracted items without recording them.
    #[arg(long)]
    pub dry_run: bool,
    #[arg(short, long)]
    pub team: Option<String>,
}

pub fn read_input(file: Option<&PathBuf>) -> AppResult<String> {
    match file {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

pub async fn run(
    ctx: &AppContext,
    session: &Session,
    credentials: CredentialChain,
    text: &str,
    args: &ParseArgs,
) -> AppResult<String> {
    // resolve the team before spending a model call on the text
    let team = ctx.config.team_or(args.team.clone())?;

    let extractor = WorkItemExtractor::new(
        ctx.language_model.clone(),
        credentials,
        ctx.config.extraction_model.clone(),
    );
    let drafts = extractor.extract(text).await?;

    let mut out = render_drafts(&drafts);
    if args.dry_run || drafts.is_empty() {
        return Ok(out);
    }

    let outcome = record_drafts(ctx, session, &team, text, drafts).await;
    out.push('\n');
    out.push_str(&render_outcome(&outcome));
    Ok(out)
}
