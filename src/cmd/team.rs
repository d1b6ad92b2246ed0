use std::fmt::Write as _;

use clap::{Args, Subcommand};

use crate::context::AppContext;
use crate::domain::team::{MemberUpdate, NewMember, NewTeam, Team, TeamMember, TeamUpdate};
use crate::error::AppResult;

#[derive(Subcommand, Debug, Clone)]
pub enum TeamCommand {
    /// List all teams.
    List,
    /// Show a team and its members.
    Show { name: String },
    /// Create a team.
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Change a team's description.
    Update {
        name: String,
        #[arg(short, long)]
        description: String,
    },
    /// Delete a team.
    Delete { name: String },
}

#[derive(Args, Debug, Clone)]
pub struct MemberArgs {
    #[arg(short, long, global = true)]
    pub team: Option<String>,
    #[command(subcommand)]
    pub command: MemberCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum MemberCommand {
    /// List the team's members.
    List,
    /// Add a member to the team.
    Add {
        username: String,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long, default_value = "member")]
        role: String,
    },
    /// Change a member's email, role or active flag.
    Update {
        username: String,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        role: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Remove a member from the team.
    Remove { username: String },
}

pub async fn run_team(ctx: &AppContext, command: TeamCommand) -> AppResult<String> {
    match command {
        TeamCommand::List => {
            let teams = ctx.work_api.list_teams().await?;
            if teams.is_empty() {
                return Ok("No teams.\n".to_string());
            }
            let mut out = String::new();
            for team in &teams {
                let _ = writeln!(out, "{}", team_line(team));
            }
            Ok(out)
        }
        TeamCommand::Show { name } => {
            let team = ctx.work_api.get_team(&name).await?;
            let members = match team.members.clone() {
                Some(members) => members,
                None => ctx.work_api.list_members(&name).await?,
            };
            let mut out = format!("{}\n", team_line(&team));
            for member in &members {
                let _ = writeln!(out, "  {}", member_line(member));
            }
            Ok(out)
        }
        TeamCommand::Create { name, description } => {
            let team = ctx
                .work_api
                .create_team(&NewTeam {
                    name: name.trim().to_string(),
                    description,
                })
                .await?;
            Ok(format!("Created team {}.\n", team.name))
        }
        TeamCommand::Update { name, description } => {
            let team = ctx
                .work_api
                .update_team(
                    &name,
                    &TeamUpdate {
                        description: Some(description),
                    },
                )
                .await?;
            Ok(format!("Updated team {}.\n", team_line(&team)))
        }
        TeamCommand::Delete { name } => {
            ctx.work_api.delete_team(&name).await?;
            Ok(format!("Deleted team {name}.\n"))
        }
    }
}

pub async fn run_member(ctx: &AppContext, args: MemberArgs) -> AppResult<String> {
    let team = ctx.config.team_or(args.team)?;
    match args.command {
        MemberCommand::List => {
            let members = ctx.work_api.list_members(&team).await?;
            let mut out = String::new();
            for member in &members {
                let _ = writeln!(out, "{}", member_line(member));
            }
            Ok(out)
        }
        MemberCommand::Add {
            username,
            email,
            role,
        } => {
            let member = ctx
                .work_api
                .add_member(
                    &team,
                    &NewMember {
                        username: username.trim().to_string(),
                        email,
                        role,
                        is_active: true,
                    },
                )
                .await?;
            Ok(format!("Added {} to {team}.\n", member.username))
        }
        MemberCommand::Update {
            username,
            email,
            role,
            active,
        } => {
            let member = ctx
                .work_api
                .update_member(
                    &team,
                    &username,
                    &MemberUpdate {
                        email,
                        role,
                        is_active: active,
                    },
                )
                .await?;
            Ok(format!("Updated {}.\n", member_line(&member)))
        }
        MemberCommand::Remove { username } => {
            ctx.work_api.remove_member(&team, &username).await?;
            Ok(format!("Removed {username} from {team}.\n"))
        }
    }
}

fn team_line(team: &Team) -> String {
    match team.description.as_deref().filter(|d| !d.is_empty()) {
        Some(description) => format!("{}: {description}", team.name),
        None => team.name.clone(),
    }
}

fn member_line(member: &TeamMember) -> String {
    let mut line = format!("{} ({})", member.username, member.role);
    if let Some(email) = &member.email {
        let _ = write!(line, " <{email}>");
    }
    if !member.is_active {
        line.push_str(" [inactive]");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_members() {
        let member = TeamMember {
            id: Some(3),
            username: "차성욱".to_string(),
            email: Some("cha@example.com".to_string()),
            role: "lead".to_string(),
            is_active: false,
            joined_at: "2025-01-01T00:00:00".to_string(),
        };
        assert_eq!(
            member_line(&member),
            "차성욱 (lead) <cha@example.com> [inactive]"
        );
    }
}
