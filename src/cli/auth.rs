//! Account CLI commands

use clap::Subcommand;

use crate::auth::AuthProvider;
use crate::error::{HearthError, HearthResult};

/// Auth subcommands
#[derive(Subcommand)]
pub enum AuthCommands {
    /// Create a local account and sign in
    Signup {
        /// Email address
        email: String,
        /// Name shown in listings
        #[arg(short, long, default_value = "")]
        name: String,
        /// Password (prompted for when omitted)
        #[arg(long, env = "HEARTH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign in to an existing account
    Login {
        /// Email address
        email: String,
        /// Password (prompted for when omitted)
        #[arg(long, env = "HEARTH_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,
}

fn read_password(given: Option<String>, confirm: bool) -> HearthResult<String> {
    if let Some(password) = given {
        return Ok(password);
    }

    let password = rpassword::prompt_password("Password: ")?;
    if confirm {
        let again = rpassword::prompt_password("Confirm password: ")?;
        if again != password {
            return Err(HearthError::Validation("Passwords do not match".into()));
        }
    }
    Ok(password)
}

/// Handle an auth command
pub fn handle_auth_command(auth: &dyn AuthProvider, cmd: AuthCommands) -> HearthResult<()> {
    match cmd {
        AuthCommands::Signup {
            email,
            name,
            password,
        } => {
            let password = read_password(password, true)?;
            let user = auth.sign_up(&email, &password, &name)?;
            println!("Created account: {}", user);
            println!("  User ID: {}", user.id.key());
        }

        AuthCommands::Login { email, password } => {
            let password = read_password(password, false)?;
            let user = auth.sign_in(&email, &password)?;
            println!("Signed in as {}", user);
        }

        AuthCommands::Logout => match auth.current_user() {
            Some(user) => {
                auth.sign_out()?;
                println!("Signed out {}", user.email);
            }
            None => println!("Not signed in."),
        },

        AuthCommands::Whoami => {
            let user = auth.require_user()?;
            println!("{}", user);
            println!("  User ID: {}", user.id.key());
        }
    }

    Ok(())
}
