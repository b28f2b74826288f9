//! EkVastu CLI
//!
//! Command-line front end for the EkVastu API client. Tokens persist in the
//! configured token file so a sign-in carries over to later invocations.

mod config;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use config::CliConfig;
use ekvastu_client::{ApiError, CloudinaryError, VastuClient, extract_user_message};
use ekvastu_core::auth::{GoogleSignUpForm, SignUpForm};
use ekvastu_core::evaluation::RoomAnswerItem;
use ekvastu_core::profile::CreateProfileRequest;
use ekvastu_core::property::{CreatePhotoRequest, CreatePropertyRequest, CreateRoomRequest};
use ekvastu_core::remedy::RemedyFilter;
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "ekvastu")]
#[command(about = "EkVastu - property evaluation API client", long_about = None)]
struct Cli {
    /// Path to configuration file (YAML or TOML)
    #[arg(short, long, value_name = "FILE", env = "EKVASTU_CONFIG", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Tenant name to resolve
    #[arg(long, value_name = "NAME", global = true)]
    tenant: Option<String>,

    /// Token file path
    #[arg(long, value_name = "FILE", global = true)]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the tenant configuration
    Ping,
    /// Sign in with email and password
    SignIn {
        email: String,
        #[arg(long, env = "EKVASTU_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Sign in through the email login endpoint
    EmailLogin {
        email: String,
        #[arg(long, env = "EKVASTU_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account with email
    SignUp {
        name: String,
        email: String,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign in with a Google ID token
    GoogleLogin {
        #[arg(long, env = "EKVASTU_GOOGLE_ID_TOKEN", hide_env_values = true)]
        id_token: String,
    },
    /// Create an account from a Google ID token
    GoogleSignUp {
        #[arg(long, env = "EKVASTU_GOOGLE_ID_TOKEN", hide_env_values = true)]
        id_token: String,
        /// Display name from the Google profile ("First Last")
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Forget the stored tokens
    Logout,
    /// Show the stored session
    Status,
    /// Manage the birth profile
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Manage properties
    Properties {
        #[command(subcommand)]
        action: PropertyCommands,
    },
    /// Manage rooms
    Rooms {
        #[command(subcommand)]
        action: RoomCommands,
    },
    /// Manage room photos
    Photos {
        #[command(subcommand)]
        action: PhotoCommands,
    },
    /// Show the evaluation questions for a room
    Questions { room_id: String },
    /// Submit answers for a room (QUESTION_ID=ANSWER)
    Answer {
        room_id: String,
        #[arg(required = true, value_parser = parse_answer)]
        answers: Vec<RoomAnswerItem>,
    },
    /// Show the score of a room
    Score { room_id: String },
    /// List remedies, optionally filtered
    Remedies {
        /// Show a single remedy
        #[arg(long, conflicts_with_all = ["room_type", "issue_type"])]
        id: Option<String>,
        #[arg(long, conflicts_with = "issue_type")]
        room_type: Option<String>,
        #[arg(long)]
        issue_type: Option<String>,
    },
    /// Inspect or fetch media assets
    Media {
        #[command(subcommand)]
        action: MediaCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Check whether a profile exists
    Check,
    /// Create the profile
    Create {
        #[arg(long)]
        dob: String,
        #[arg(long)]
        place_of_birth: String,
        #[arg(long)]
        time_of_birth: String,
    },
}

#[derive(Subcommand)]
enum PropertyCommands {
    List,
    Get {
        id: String,
    },
    Create {
        name: String,
        #[arg(long, default_value = "home")]
        property_type: String,
        #[arg(long, default_value = "")]
        street: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        state: String,
        #[arg(long, default_value = "")]
        zip: String,
        #[arg(long, default_value = "")]
        country: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum RoomCommands {
    List {
        property_id: String,
    },
    Get {
        room_id: String,
    },
    Create {
        property_id: String,
        name: String,
        /// Room type (kitchen, bedroom, ...)
        #[arg(long = "type")]
        kind: String,
    },
}

#[derive(Subcommand)]
enum PhotoCommands {
    List {
        room_id: String,
    },
    /// Upload an image file and attach it to a room
    Upload {
        room_id: String,
        file: PathBuf,
    },
    Delete {
        photo_id: String,
        /// Also delete the hosted image
        #[arg(long)]
        image_url: Option<String>,
    },
}

#[derive(Subcommand)]
enum MediaCommands {
    /// Show asset details
    Info {
        #[arg(long, conflicts_with = "public_id", required_unless_present = "public_id")]
        asset_id: Option<String>,
        #[arg(long)]
        public_id: Option<String>,
    },
    /// Download an image to a file
    Download { url: String, output: PathBuf },
}

fn parse_answer(value: &str) -> std::result::Result<RoomAnswerItem, String> {
    match value.split_once('=') {
        Some((question_id, answer)) if !question_id.is_empty() => Ok(RoomAnswerItem {
            question_id: question_id.to_string(),
            answer: answer.to_string(),
        }),
        _ => Err(format!("expected QUESTION_ID=ANSWER, got '{}'", value)),
    }
}

fn init_logging(level: &str) -> Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    let filter = EnvFilter::new(format!("{}", log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_config(cli: &Cli) -> Result<CliConfig> {
    let mut config = if let Some(path) = &cli.config {
        CliConfig::from_file(path)?
    } else {
        CliConfig::default()
    };

    config.merge_env();

    // CLI arguments override file and environment
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(tenant) = &cli.tenant {
        config.client.tenant_name = tenant.clone();
    }
    if let Some(path) = &cli.token_file {
        config.client.token_file = Some(path.clone());
    }

    Ok(config)
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to serialize output")
}

/// Message shown when a command fails
fn failure_message(client: &VastuClient, err: &anyhow::Error) -> String {
    // A failed auth pipeline already published its user-facing message
    if let Some(message) = client.auth.status().error_message {
        return message;
    }
    if let Some(api) = err.downcast_ref::<ApiError>() {
        return extract_user_message(api);
    }
    if let Some(CloudinaryError::Api(api)) = err.downcast_ref::<CloudinaryError>() {
        return extract_user_message(api);
    }
    format!("{:#}", err)
}

fn session_summary(client: &VastuClient, email: &str, role: &str) -> Value {
    json!({
        "authenticated": client.tokens.has_valid_token(),
        "email": email,
        "role": role,
        "tenant": client.tenant.snapshot().name,
    })
}

async fn run(client: &VastuClient, command: Commands) -> Result<Value> {
    match command {
        Commands::Ping => {
            let context = client.resolver.resolve_tenant().await?;
            to_json(&context)
        }
        Commands::SignIn { email, password } => {
            let response = client.auth.sign_in(&email, &password).await?;
            Ok(session_summary(client, &response.email, &response.role))
        }
        Commands::EmailLogin { email, password } => {
            let response = client.auth.email_login(&email, &password).await?;
            Ok(session_summary(client, &response.email, &response.role))
        }
        Commands::SignUp {
            name,
            email,
            last_name,
            phone,
        } => {
            let mut form = SignUpForm::new(name, email);
            form.last_name = last_name;
            form.phone = phone;
            let response = client.auth.sign_up(form).await?;
            Ok(json!({
                "success": response.success,
                "message": response.message,
                "data": response.data,
                "authenticated": client.tokens.has_valid_token(),
            }))
        }
        Commands::GoogleLogin { id_token } => {
            let response = client.auth.google_login(&id_token).await?;
            Ok(session_summary(client, &response.email, &response.role))
        }
        Commands::GoogleSignUp {
            id_token,
            display_name,
            phone,
        } => {
            let form = GoogleSignUpForm::from_display_name(id_token, display_name.as_deref(), phone);
            let response = client.auth.google_sign_up(form).await?;
            Ok(json!({
                "success": response.success,
                "message": response.message,
                "data": response.data,
                "authenticated": client.tokens.has_valid_token(),
            }))
        }
        Commands::Logout => {
            client.auth.logout().await;
            Ok(json!({ "authenticated": false }))
        }
        Commands::Status => {
            let tokens = client.tokens.snapshot();
            Ok(json!({
                "authenticated": client.tokens.has_valid_token(),
                "issued_at": tokens.map(|pair| pair.issued_at),
                "token_file": client.tokens.path().map(|path| path.display().to_string()),
            }))
        }
        Commands::Profile { action } => match action {
            ProfileCommands::Check => to_json(&client.profile.check().await?),
            ProfileCommands::Create {
                dob,
                place_of_birth,
                time_of_birth,
            } => {
                let request = CreateProfileRequest {
                    dob,
                    place_of_birth,
                    time_of_birth,
                };
                to_json(&client.profile.create(&request).await?)
            }
        },
        Commands::Properties { action } => match action {
            PropertyCommands::List => to_json(&client.properties.list().await?),
            PropertyCommands::Get { id } => to_json(&client.properties.get(&id).await?),
            PropertyCommands::Create {
                name,
                property_type,
                street,
                city,
                state,
                zip,
                country,
            } => {
                let request = CreatePropertyRequest {
                    name,
                    property_type,
                    street,
                    city,
                    state,
                    zip,
                    country,
                };
                to_json(&client.properties.create(&request).await?)
            }
            PropertyCommands::Delete { id } => to_json(&client.properties.delete(&id).await?),
        },
        Commands::Rooms { action } => match action {
            RoomCommands::List { property_id } => to_json(&client.rooms.list(&property_id).await?),
            RoomCommands::Get { room_id } => to_json(&client.rooms.get(&room_id).await?),
            RoomCommands::Create {
                property_id,
                name,
                kind,
            } => {
                let request = CreateRoomRequest { name, kind };
                to_json(&client.rooms.create(&property_id, &request).await?)
            }
        },
        Commands::Photos { action } => match action {
            PhotoCommands::List { room_id } => to_json(&client.photos.list(&room_id).await?),
            PhotoCommands::Upload { room_id, file } => {
                let image = tokio::fs::read(&file)
                    .await
                    .with_context(|| format!("Failed to read image {}", file.display()))?;
                debug!("Read {} bytes from {}", image.len(), file.display());

                let uploaded = client.cloudinary.upload_image(image).await?;
                info!("Uploaded image {}", uploaded.public_id);

                let request = CreatePhotoRequest {
                    cloud_name: client.cloudinary.cloud_name(),
                    uri: uploaded.secure_url,
                };
                to_json(&client.photos.add_by_url(&room_id, &request).await?)
            }
            PhotoCommands::Delete {
                photo_id,
                image_url,
            } => {
                let response = client.photos.delete(&photo_id).await?;
                let media = match image_url {
                    Some(url) => Some(client.cloudinary.delete_by_url(&url).await?),
                    None => None,
                };
                Ok(json!({ "photo": to_json(&response)?, "media": media }))
            }
        },
        Commands::Questions { room_id } => to_json(&client.evaluation.questions(&room_id).await?),
        Commands::Answer { room_id, answers } => {
            to_json(&client.evaluation.submit_answers(&room_id, answers).await?)
        }
        Commands::Score { room_id } => {
            let response = client.evaluation.room_score(&room_id).await?;
            let percentage = response.data.display_percentage();
            Ok(json!({ "score": to_json(&response)?, "percentage": percentage }))
        }
        Commands::Remedies {
            id,
            room_type,
            issue_type,
        } => {
            if let Some(id) = id {
                return to_json(&client.remedies.get(&id).await?);
            }
            let filter = match (room_type, issue_type) {
                (Some(room_type), _) => RemedyFilter::RoomType(room_type),
                (None, Some(issue_type)) => RemedyFilter::IssueType(issue_type),
                (None, None) => RemedyFilter::All,
            };
            to_json(&client.remedies.list(filter).await?)
        }
        Commands::Media { action } => match action {
            MediaCommands::Info {
                asset_id,
                public_id,
            } => {
                let info = match (asset_id, public_id) {
                    (Some(asset_id), _) => client.cloudinary.image_info_by_asset_id(&asset_id).await?,
                    (None, Some(public_id)) => {
                        client.cloudinary.image_info_by_public_id(&public_id).await?
                    }
                    (None, None) => bail!("Either --asset-id or --public-id is required"),
                };
                to_json(&info)
            }
            MediaCommands::Download { url, output } => {
                let bytes = client.cloudinary.download(&url).await?;
                tokio::fs::write(&output, &bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", output.display()))?;
                Ok(json!({ "path": output.display().to_string(), "bytes": bytes.len() }))
            }
        },
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_logging(&config.logging.level)?;
    debug!("Tenant: {}", config.client.tenant_name);

    let client = VastuClient::new(&config.client_config())
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", extract_user_message(&e)))?;

    match run(&client, cli.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            eprintln!("Error: {}", failure_message(&client, &err));
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_answer() {
        let item = parse_answer("q1=north-east").unwrap();
        assert_eq!(item.question_id, "q1");
        assert_eq!(item.answer, "north-east");

        let item = parse_answer("q2=a=b").unwrap();
        assert_eq!(item.answer, "a=b");

        assert!(parse_answer("no-separator").is_err());
        assert!(parse_answer("=answer").is_err());
    }

    #[test]
    fn test_cli_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "ekvastu",
            "--tenant",
            "other",
            "rooms",
            "create",
            "p1",
            "Kitchen",
            "--type",
            "kitchen",
        ])
        .unwrap();
        assert_eq!(cli.tenant.as_deref(), Some("other"));
        match cli.command {
            Commands::Rooms {
                action:
                    RoomCommands::Create {
                        property_id,
                        name,
                        kind,
                    },
            } => {
                assert_eq!(property_id, "p1");
                assert_eq!(name, "Kitchen");
                assert_eq!(kind, "kitchen");
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn test_remedy_filters_conflict() {
        let result = Cli::try_parse_from([
            "ekvastu",
            "remedies",
            "--room-type",
            "kitchen",
            "--issue-type",
            "clutter",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_answer_requires_values() {
        assert!(Cli::try_parse_from(["ekvastu", "answer", "r1"]).is_err());
        let cli = Cli::try_parse_from(["ekvastu", "answer", "r1", "q1=yes", "q2=no"]).unwrap();
        match cli.command {
            Commands::Answer { answers, .. } => assert_eq!(answers.len(), 2),
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "ekvastu",
            "--log-level",
            "debug",
            "--token-file",
            "/tmp/tokens.json",
            "status",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.client.token_file,
            Some(PathBuf::from("/tmp/tokens.json"))
        );
    }
}
