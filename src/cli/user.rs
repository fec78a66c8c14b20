use crate::{services::auth, Config, Database};
use anyhow::Result;
use std::path::Path;

use super::UserCommand;

pub async fn run(config_path: &Path, command: UserCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open(&config.database.path)?;
    db.migrate()?;

    match command {
        UserCommand::Add {
            email,
            full_name,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => {
                    let p = rpassword::prompt_password("Password: ")?;
                    let p_confirm = rpassword::prompt_password("Confirm password: ")?;
                    if p != p_confirm {
                        anyhow::bail!("Passwords do not match");
                    }
                    p
                }
            };

            auth::create_user(&db, &email, &full_name, &password)?;
            tracing::info!("User '{}' created", email);
        }
        UserCommand::List => {
            let users = auth::list_users(&db)?;

            println!("{:<30} {:<25} {:<8}", "EMAIL", "NAME", "ACTIVE");
            println!("{}", "-".repeat(63));
            for user in users {
                println!(
                    "{:<30} {:<25} {:<8}",
                    user.email,
                    user.full_name,
                    if user.is_active { "yes" } else { "no" }
                );
            }
        }
        UserCommand::Remove { email } => {
            if auth::remove_user(&db, &email)? {
                tracing::info!("User '{}' removed", email);
            } else {
                tracing::warn!("User '{}' not found", email);
            }
        }
        UserCommand::Passwd { email } => {
            let password = rpassword::prompt_password("New password: ")?;
            let password_confirm = rpassword::prompt_password("Confirm password: ")?;

            if password != password_confirm {
                anyhow::bail!("Passwords do not match");
            }

            auth::update_password(&db, &email, &password)?;
            tracing::info!("Password updated for '{}'", email);
        }
    }

    Ok(())
}
