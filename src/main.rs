use clap::{Parser, Subcommand};
use std::sync::Arc;
use taskboard_client::{
    handlers, spawn_navigator, BoardApi, Config, Dashboard, Feedback, HttpBoardApi, LogNavigator,
    TaskDraft,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Client for a shared task board")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (without extension)
    #[arg(short, long, default_value = "config/default")]
    config: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show who the current session belongs to
    Status,

    /// Sign in and keep the session for later runs
    Signin {
        email: String,
        #[arg(long, env = "TASKBOARD_PASSWORD")]
        password: String,
    },

    /// Create an account and sign in
    Signup {
        email: String,
        username: String,
        #[arg(long, env = "TASKBOARD_PASSWORD")]
        password: String,
    },

    /// End the session
    Logout,

    /// List the board
    Tasks,

    /// List users tasks can be assigned to
    Users,

    /// Create a task
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Due date, e.g. 2024-05-01 or 2024-05-01T17:00
        #[arg(long, default_value = "")]
        due: String,
        /// Username of the assignee
        #[arg(short, long, default_value = "")]
        assign: String,
    },

    /// Toggle a task between complete and incomplete
    Toggle {
        /// Task number from `tasks`, or a task id
        task: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load_from(&cli.config)?;
    let api: Arc<dyn BoardApi> = Arc::new(HttpBoardApi::connect(&config).await?);

    let dashboard = Dashboard::assemble(api);
    let navigator = spawn_navigator(dashboard.session().subscribe(), LogNavigator);

    let outcome = match cli.command {
        Commands::Status => handlers::handle_status(&dashboard).await,
        Commands::Signin { email, password } => {
            handlers::handle_login(&dashboard, &email, &password).await
        }
        Commands::Signup { email, username, password } => {
            handlers::handle_register(&dashboard, &email, &username, &password).await
        }
        Commands::Logout => handlers::handle_logout(&dashboard).await,
        Commands::Tasks => handlers::handle_list(&dashboard).await,
        Commands::Users => handlers::handle_users(&dashboard).await,
        Commands::Create { name, description, due, assign } => {
            let draft = TaskDraft {
                name,
                description,
                due_date: due,
                assigned_to: assign,
            };
            handlers::handle_create(&dashboard, draft).await
        }
        Commands::Toggle { task } => handlers::handle_toggle(&dashboard, &task).await,
    };

    // Dropping the dashboard closes the session channel so the navigator
    // drains its last transition and exits.
    drop(dashboard);
    navigator.await?;

    match outcome {
        Ok(output) => println!("{}", output),
        Err(Feedback::RedirectToLogin) => {
            println!("Not signed in. Run `taskboard signin <email>` first.");
        }
        Err(Feedback::FieldErrors(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field, message);
            }
            std::process::exit(2);
        }
        Err(Feedback::Banner(message)) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    }

    Ok(())
}
