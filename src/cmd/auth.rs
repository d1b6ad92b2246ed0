use clap::Args;

use crate::error::{AppError, AppResult};
use crate::identity::{IdentityStore, User};

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    /// Name to record work under.
    pub username: String,
    #[arg(short, long)]
    pub email: Option<String>,
}

pub fn login(store: &mut IdentityStore, args: LoginArgs) -> AppResult<User> {
    let user = User::from_login(&args.username, args.email.as_deref())?;
    store.set_current_user(user.clone())?;
    Ok(user)
}

pub fn switch(store: &mut IdentityStore, username: &str) -> AppResult<()> {
    if store.switch_user(username.trim())? {
        Ok(())
    } else {
        Err(AppError::Identity(format!(
            "'{username}' has not logged in on this machine; use `worklog login` instead"
        )))
    }
}

pub fn describe_user(user: &User) -> String {
    match &user.email {
        Some(email) => format!("{} <{email}>", user.username),
        None => user.username.clone(),
    }
}

pub fn roster(store: &IdentityStore) -> AppResult<Vec<String>> {
    let current = store.current_user()?.map(|user| user.username);
    Ok(store
        .team_members()?
        .iter()
        .map(|member| {
            let marker = if current.as_deref() == Some(member.username.as_str()) {
                "*"
            } else {
                " "
            };
            format!("{marker} {}", describe_user(member))
        })
        .collect())
}
