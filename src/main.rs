mod activity;
mod aggregation;
mod api;
mod cli_messages;
mod commands;
mod config;
mod consts;
mod environment;
mod error_classifier;
mod export;
mod fetch;
mod logging;
mod models;
mod session;
mod table;
mod ui;
mod validation;

use crate::api::{AdminApi, ApiClient};
use crate::commands::{CmdResult, ExportArgs, TableArgs};
use crate::config::{Config, get_config_path};
use crate::consts::cli_consts::{DEFAULT_PAGE_SIZE, FEATURED_MARKER};
use crate::environment::Environment;
use crate::models::Role;
use crate::session::{AuthGuard, Session, run_headless_mode, run_tui_mode};
use crate::ui::UIConfig;
use crate::validation::{JoinTeamForm, LoginForm, NewTeamForm};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Administration console for the event platform
struct Args {
    /// Base URL of the backend API [default: from config, else local]
    #[arg(long, global = true, env = "EVENT_ADMIN_API_URL", value_name = "URL")]
    api_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in as an administrator and store the session
    Login {
        #[arg(long, value_name = "EMAIL")]
        email: String,

        #[arg(long, env = "EVENT_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Open the dashboard
    Dashboard {
        /// Print refreshed totals to the console instead of the terminal UI
        #[arg(long)]
        headless: bool,

        /// Disable background colour
        #[arg(long)]
        no_background: bool,
    },
    /// Manage events
    #[command(subcommand)]
    Events(EventsCommand),
    /// Manage teams
    #[command(subcommand)]
    Teams(TeamsCommand),
    /// Manage users
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Subcommand)]
enum EventsCommand {
    /// List events that are not deleted
    List(TableArgs),
    /// Show one event with its prizes and FAQ
    Show { slug: String },
    /// Create an event from a JSON file
    Create {
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },
    /// Update an event with the fields of a JSON file
    Update {
        slug: String,
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },
    /// Mark an event as deleted
    Delete { slug: String },
    /// Export events to CSV or XLSX
    Export(ExportArgs),
}

#[derive(Subcommand)]
enum TeamsCommand {
    /// List teams of every event
    List {
        #[command(flatten)]
        table: TableArgs,

        /// Only teams of this event (id or slug)
        #[arg(long, value_name = "EVENT")]
        event: Option<String>,
    },
    /// Export teams to CSV or XLSX
    Export {
        #[command(flatten)]
        export: ExportArgs,

        /// Only teams of this event (id or slug)
        #[arg(long, value_name = "EVENT")]
        event: Option<String>,
    },
    /// Mark the team with this join code as verified
    Verify { team_code: String },
    /// Set the verification flag of a team given by id or code
    SetVerification {
        team: String,
        #[arg(long, action = clap::ArgAction::Set)]
        verified: bool,
    },
    /// Register a new team
    Create {
        #[arg(long)]
        name: String,

        /// Event id or slug
        #[arg(long)]
        event: String,

        /// User id of the team leader
        #[arg(long)]
        leader: String,

        #[arg(long)]
        verified: bool,
    },
    /// Add a user to a team
    AddMember {
        #[arg(long, value_name = "USER_ID")]
        user: String,

        #[arg(long, value_name = "TEAM_CODE")]
        code: String,
    },
    /// Show the members of a team given by id or code
    Members { team: String },
}

#[derive(Subcommand)]
enum UsersCommand {
    /// List users, super-admins first
    List {
        #[command(flatten)]
        table: TableArgs,

        /// Only users with this role: user, admin or superadmin
        #[arg(long)]
        role: Option<Role>,
    },
    /// Export users to CSV or XLSX
    Export {
        #[command(flatten)]
        export: ExportArgs,

        #[arg(long)]
        role: Option<Role>,
    },
    /// Change the role of a user (super-admins only)
    SetRole { user_id: String, role: Role },
}

/// Settings resolved from the config file and the command line.
struct Context {
    config: Config,
    config_path: PathBuf,
    environment: Environment,
    page_size: usize,
    featured_marker: String,
}

impl Context {
    fn load(api_url: Option<String>) -> Result<Self, Box<dyn Error>> {
        let config_path = get_config_path()?;
        let config = Config::load_or_default(&config_path).map_err(|e| {
            format!(
                "Failed to read {}: {}. Run `event-admin logout` to reset it.",
                config_path.display(),
                e
            )
        })?;
        let environment = match api_url {
            Some(url) => Environment::resolve(Some(&url)),
            None => config.environment(),
        };
        Ok(Self {
            page_size: config.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            featured_marker: config
                .featured_marker
                .clone()
                .unwrap_or_else(|| FEATURED_MARKER.to_string()),
            config,
            config_path,
            environment,
        })
    }

    /// The stored session, or an error telling the user to log in.
    fn session(&self) -> Result<Session, Box<dyn Error>> {
        AuthGuard::admit(self.config.session.as_ref())
            .cloned()
            .map_err(|e| {
                print_cmd_error!(&e.to_string());
                e.into()
            })
    }

    fn client(&self, session: Option<&Session>) -> Result<ApiClient, Box<dyn Error>> {
        let client = ApiClient::new(self.environment.clone())?;
        Ok(match session {
            Some(session) => client.with_session(session),
            None => client,
        })
    }
}

/// Cancelled on Ctrl+C so in-flight requests stop cleanly.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    token
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    if let Command::Logout = args.command {
        // Works even when the config file no longer parses.
        return commands::auth::logout(&get_config_path()?);
    }
    let ctx = Context::load(args.api_url)?;

    match args.command {
        Command::Dashboard {
            headless: false,
            no_background,
        } => {
            // Without a session the UI itself shows the login notice.
            let session = ctx.config.session.clone();
            let api: Arc<dyn AdminApi> = Arc::new(ctx.client(session.as_ref())?);
            let ui_config = UIConfig::new(!no_background, ctx.page_size, ctx.featured_marker);
            run_tui_mode(session, api, ui_config).await
        }
        command => {
            logging::init_cli_logging();
            run_command(command, &ctx).await
        }
    }
}

async fn run_command(command: Command, ctx: &Context) -> CmdResult {
    let cancel = shutdown_token();
    match command {
        Command::Login { email, password } => {
            let api = ctx.client(None)?;
            commands::auth::login(LoginForm { email, password }, &ctx.config_path, &api).await?;
            Ok(())
        }
        Command::Logout => commands::auth::logout(&ctx.config_path),
        Command::Dashboard { .. } => {
            let session = ctx.session()?;
            let api = ctx.client(Some(&session))?;
            run_headless_mode(&session, &api, &ctx.featured_marker, cancel).await
        }
        Command::Events(command) => {
            let session = ctx.session()?;
            let api = ctx.client(Some(&session))?;
            run_events(command, &api, ctx, &cancel).await
        }
        Command::Teams(command) => {
            let session = ctx.session()?;
            let api = ctx.client(Some(&session))?;
            run_teams(command, &api, ctx, &cancel).await
        }
        Command::Users(command) => {
            let session = ctx.session()?;
            let api = ctx.client(Some(&session))?;
            run_users(command, &api, &session, ctx, &cancel).await
        }
    }
}

async fn run_events(
    command: EventsCommand,
    api: &dyn AdminApi,
    ctx: &Context,
    cancel: &CancellationToken,
) -> CmdResult {
    use commands::events;
    match command {
        EventsCommand::List(table) => events::list(api, &table, ctx.page_size, cancel).await,
        EventsCommand::Show { slug } => events::show(api, &slug, cancel).await,
        EventsCommand::Create { file } => events::create(api, &file).await,
        EventsCommand::Update { slug, file } => events::update(api, &slug, &file, cancel).await,
        EventsCommand::Delete { slug } => events::delete(api, &slug).await,
        EventsCommand::Export(export) => events::export(api, &export, cancel).await.map(|_| ()),
    }
}

async fn run_teams(
    command: TeamsCommand,
    api: &dyn AdminApi,
    ctx: &Context,
    cancel: &CancellationToken,
) -> CmdResult {
    use commands::teams;
    match command {
        TeamsCommand::List { table, event } => {
            teams::list(api, &table, event.as_deref(), ctx.page_size, cancel).await
        }
        TeamsCommand::Export { export, event } => teams::export(api, &export, event.as_deref(), cancel)
            .await
            .map(|_| ()),
        TeamsCommand::Verify { team_code } => teams::verify(api, &team_code).await,
        TeamsCommand::SetVerification { team, verified } => {
            teams::set_verification(api, &team, verified, cancel).await
        }
        TeamsCommand::Create {
            name,
            event,
            leader,
            verified,
        } => {
            let form = NewTeamForm {
                team_name: name,
                event_id: event,
                event_slug: String::new(),
                leader_id: leader,
                is_verified: verified,
            };
            teams::create(api, form, cancel).await
        }
        TeamsCommand::AddMember { user, code } => {
            let form = JoinTeamForm {
                user_id: user,
                team_code: code,
            };
            teams::add_member(api, form).await
        }
        TeamsCommand::Members { team } => teams::members(api, &team, cancel).await,
    }
}

async fn run_users(
    command: UsersCommand,
    api: &dyn AdminApi,
    session: &Session,
    ctx: &Context,
    cancel: &CancellationToken,
) -> CmdResult {
    use commands::users;
    match command {
        UsersCommand::List { table, role } => {
            users::list(api, &table, role, ctx.page_size, cancel).await
        }
        UsersCommand::Export { export, role } => {
            users::export(api, &export, role, cancel).await.map(|_| ())
        }
        UsersCommand::SetRole { user_id, role } => {
            users::set_role(api, session, &user_id, role).await
        }
    }
}
