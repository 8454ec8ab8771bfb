//! Authentication commands.

use crate::output::{self, OutputFormat};
use anyhow::Result;
use shopfront_api::{ApiClient, LoginPayload, RegisterPayload};
use std::io::{self, Write};

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

/// Create a new account.
pub async fn register(client: &ApiClient, format: &OutputFormat) -> Result<()> {
    if client.session().initialize().await {
        if let Some(user) = client.session().current_user() {
            output::print_success(&format!("Already logged in as {}", user.username), format);
            return Ok(());
        }
    }

    let email = prompt("Email")?;
    if email.is_empty() {
        output::print_error("Email is required", format);
        return Ok(());
    }

    let username = prompt("Username (optional)")?;
    let username = if username.is_empty() {
        None
    } else {
        Some(username)
    };

    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        output::print_error("Password is required", format);
        return Ok(());
    }

    println!("Creating account...");

    match client
        .register(&RegisterPayload {
            email,
            password,
            username,
        })
        .await
    {
        Ok(auth) => {
            output::print_success(&format!("Logged in as {}", auth.user.username), format);
        }
        Err(e) => {
            output::print_error(&format!("Registration failed: {}", e), format);
        }
    }

    Ok(())
}

/// Login with email and password.
pub async fn login(client: &ApiClient, format: &OutputFormat) -> Result<()> {
    if client.session().initialize().await {
        if let Some(user) = client.session().current_user() {
            output::print_success(&format!("Already logged in as {}", user.username), format);
            return Ok(());
        }
    }

    let email = prompt("Email")?;
    if email.is_empty() {
        output::print_error("Email is required", format);
        return Ok(());
    }

    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        output::print_error("Password is required", format);
        return Ok(());
    }

    println!("Logging in...");

    match client.login(&LoginPayload { email, password }).await {
        Ok(auth) => {
            output::print_success(&format!("Logged in as {}", auth.user.username), format);
        }
        Err(e) => {
            output::print_error(&format!("Login failed: {}", e), format);
        }
    }

    Ok(())
}

/// Login with Google.
pub async fn login_with_google(client: &ApiClient, format: &OutputFormat) -> Result<()> {
    println!("Signing in with Google...");

    match client.sign_in_with_google().await {
        Ok(auth) => {
            client.sign_in_with_oauth(&auth.token, &auth.user).await?;
            output::print_success(&format!("Logged in as {}", auth.user.username), format);
        }
        Err(e) => {
            output::print_error(&format!("Google sign-in failed: {}", e), format);
        }
    }

    Ok(())
}

/// Login with WeChat.
pub async fn login_with_wechat(client: &ApiClient, format: &OutputFormat) -> Result<()> {
    println!("Signing in with WeChat...");

    match client.sign_in_with_wechat().await {
        Ok(auth) => {
            client.sign_in_with_oauth(&auth.token, &auth.user).await?;
            output::print_success(&format!("Logged in as {}", auth.user.username), format);
        }
        Err(e) => {
            output::print_error(&format!("WeChat sign-in failed: {}", e), format);
        }
    }

    Ok(())
}

/// Check authentication status.
pub async fn status(client: &ApiClient, format: &OutputFormat) -> Result<()> {
    let restored = client.session().initialize().await;
    let user = client.session().current_user();

    match format {
        OutputFormat::Text => match &user {
            Some(user) => {
                println!("Logged in");
                output::print_row("Username", &user.username);
                if let Some(email) = &user.email {
                    output::print_row("Email", email);
                }
                if let Some(provider) = &user.oauth_provider {
                    output::print_row("Provider", provider.as_str());
                }
            }
            None => println!("Not logged in"),
        },
        OutputFormat::Json => {
            let body = serde_json::json!({
                "logged_in": restored,
                "user": user,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

/// Logout and clear the stored session.
pub async fn logout(client: &ApiClient, format: &OutputFormat) -> Result<()> {
    client.session().initialize().await;
    client.logout().await;
    output::print_success("Logged out", format);
    Ok(())
}
