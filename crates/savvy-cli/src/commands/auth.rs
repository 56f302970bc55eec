//! Auth commands: login, register, logout, password reset, whoami

use anyhow::Result;
use savvy_core::Store;

use crate::output::Output;
use crate::prompt;

pub async fn login(store: &mut Store, email: Option<String>, output: &Output) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt::prompt_required("Email")?,
    };
    let password = prompt::prompt_required("Password")?;

    let session = store.sign_in(&email, &password).await?;
    output.success(&format!("Signed in as {}", session.user.email));

    // First sign-in on a fresh machine has no snapshot yet
    if let Err(e) = store.refresh().await {
        if !output.is_quiet() {
            eprintln!("⚠ Initial sync failed: {}", e);
        }
    }
    Ok(())
}

pub async fn register(
    store: &mut Store,
    email: Option<String>,
    name: Option<String>,
    output: &Output,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt::prompt_required("Email")?,
    };
    let password = prompt::prompt_required("Password")?;

    match store.sign_up(&email, &password, name.as_deref()).await? {
        Some(session) => {
            output.success(&format!("Account created, signed in as {}", session.user.email));
            if let Err(e) = store.refresh().await {
                if !output.is_quiet() {
                    eprintln!("⚠ Initial sync failed: {}", e);
                }
            }
        }
        None => {
            output.message("Account created. Check your email to confirm, then run `savvy auth login`.");
        }
    }
    Ok(())
}

pub async fn logout(store: &mut Store, output: &Output) -> Result<()> {
    store.sign_out().await?;
    output.success("Signed out");
    Ok(())
}

pub async fn reset_password(store: &mut Store, email: String, output: &Output) -> Result<()> {
    store.reset_password(&email).await?;
    output.success(&format!("Password reset email sent to {}", email));
    Ok(())
}

pub fn whoami(store: &Store, output: &Output) -> Result<()> {
    match store.session() {
        Some(session) => {
            if output.is_json() {
                println!("{}", serde_json::to_string_pretty(&session.user)?);
            } else {
                output.message(&format!("{} ({})", session.user.email, session.user.id));
                if let Some(ref name) = session.user.full_name {
                    output.message(name);
                }
            }
        }
        None => output.message("Not signed in."),
    }
    Ok(())
}
