use anyhow::Context;
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use clientauth_config::{GatewayConfig, Profile};
use clientauth_gateway::UserGateway;
use clientauth_models::{Credentials, User};

#[derive(Parser)]
#[command(name = "clientauth-cli")]
#[command(about = "clientauth CLI - talk to the remote user service", long_about = None)]
struct Cli {
    /// Base URL of the user service (defaults to GATEWAY_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Deployment profile: standard or registration (defaults to AUTH_PROFILE)
    #[arg(long, global = true)]
    profile: Option<Profile>,

    /// Session token from an earlier login (defaults to CLIENTAUTH_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request a one-time registration code
    RegisterCode {
        #[arg(short = 'n', long)]
        phone_number: Option<String>,
    },
    /// Register (or log in) with a phone number and code
    Register {
        #[arg(short = 'n', long)]
        phone_number: Option<String>,

        #[arg(short = 'c', long)]
        code: Option<String>,

        /// Initial username, sent with the registration profile
        #[arg(short = 'u', long)]
        username: Option<String>,
    },
    /// Log in and print the session token
    Login {
        #[arg(short = 'n', long)]
        phone_number: Option<String>,

        /// One-time code (will be prompted if neither code nor username is given)
        #[arg(short = 'c', long)]
        code: Option<String>,

        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Password (will be prompted securely if a username is given)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Log out the user owning the phone number
    Logout {
        #[arg(short = 'n', long)]
        phone_number: Option<String>,
    },
    /// Exchange the current token for a new one
    Refresh,
    /// Look a user up by id or phone number
    GetUser {
        #[arg(long, conflicts_with = "phone_number")]
        id: Option<String>,

        #[arg(short = 'n', long)]
        phone_number: Option<String>,
    },
    /// Update a user's username or password
    UpdateUser {
        #[arg(long)]
        id: String,

        #[arg(short = 'u', long)]
        username: Option<String>,

        /// Prompt for a new password
        #[arg(long)]
        password: bool,
    },
    /// Delete a user
    DeleteUser {
        #[arg(long)]
        id: String,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clientauth_gateway=warn".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("\n❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let gateway = build_gateway(&cli)?;

    match cli.command {
        Commands::RegisterCode { phone_number } => {
            let phone_number = phone_number_or_prompt(phone_number)?;
            let code = gateway.get_register_code(&phone_number).await?;
            println!("{}", code);
        }
        Commands::Register {
            phone_number,
            code,
            username,
        } => {
            let phone_number = phone_number_or_prompt(phone_number)?;
            let code = prompt_unless("Code", code)?;
            let user = match (gateway.profile(), username) {
                (Profile::Registration, Some(username)) => {
                    let draft = User {
                        username,
                        ..User::with_phone_number(phone_number.as_str())
                    };
                    gateway.register_user(&phone_number, &code, &draft).await?
                }
                _ => gateway.register_or_login(&phone_number, &code).await?,
            };
            print_user(&user)?;
        }
        Commands::Login {
            phone_number,
            code,
            username,
            password,
        } => {
            let credentials = match username {
                Some(username) => {
                    let password = match password {
                        Some(password) => password,
                        None => Password::new().with_prompt("Password").interact()?,
                    };
                    Credentials {
                        phone_number: phone_number.unwrap_or_default(),
                        ..Credentials::username_and_password(username, password)
                    }
                }
                None => Credentials::phone_and_code(
                    phone_number_or_prompt(phone_number)?,
                    prompt_unless("Code", code)?,
                ),
            };
            let token = gateway.login(&credentials).await?;
            println!("{}", token);
        }
        Commands::Logout { phone_number } => {
            let user = User::with_phone_number(phone_number_or_prompt(phone_number)?);
            gateway.logout(&user).await?;
            println!("✅ Logged out");
        }
        Commands::Refresh => {
            let token = gateway
                .refresh_current()
                .await
                .context("pass --token or set CLIENTAUTH_TOKEN")?;
            println!("{}", token);
        }
        Commands::GetUser { id, phone_number } => {
            let user = match id {
                Some(id) => gateway.get_user_by_id(&id).await?,
                None => {
                    gateway
                        .get_user_by_phone_number(&phone_number_or_prompt(phone_number)?)
                        .await?
                }
            };
            print_user(&user)?;
        }
        Commands::UpdateUser {
            id,
            username,
            password,
        } => {
            let mut patch = gateway.get_user_by_id(&id).await?;
            if let Some(username) = username {
                patch.username = username;
            }
            if password {
                patch.password = Password::new()
                    .with_prompt("New password")
                    .with_confirmation("Confirm password", "Passwords don't match")
                    .interact()?;
            }
            gateway.update_user_by_id(&id, &patch).await?;
            println!("✅ User {} updated", id);
        }
        Commands::DeleteUser { id } => {
            gateway.delete_user_by_id(&id).await?;
            println!("✅ User {} deleted", id);
        }
    }

    Ok(())
}

fn build_gateway(cli: &Cli) -> anyhow::Result<UserGateway> {
    let mut config = match &cli.endpoint {
        Some(endpoint) => GatewayConfig::new(endpoint.as_str()),
        None => GatewayConfig::from_env()?,
    };
    if let Some(profile) = cli.profile {
        config = config.with_profile(profile);
    }
    config.validate()?;

    let gateway = UserGateway::new(&config)?;
    if let Some(token) = cli
        .token
        .clone()
        .or_else(|| std::env::var("CLIENTAUTH_TOKEN").ok())
    {
        gateway.set_token(token);
    }
    Ok(gateway)
}

fn phone_number_or_prompt(phone_number: Option<String>) -> anyhow::Result<String> {
    prompt_unless("Phone number", phone_number)
}

fn prompt_unless(prompt: &str, value: Option<String>) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => Ok(Input::new().with_prompt(prompt).interact_text()?),
    }
}

fn print_user(user: &User) -> anyhow::Result<()> {
    let redacted = User {
        password: String::new(),
        ..user.clone()
    };
    println!("{}", serde_json::to_string_pretty(&redacted)?);
    Ok(())
}
